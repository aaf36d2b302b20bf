use std::fs;
use std::io;
use std::path::PathBuf;
use crate::testdata::{TestCase, TestProvider};
use crate::uploader::Payload;

const EXAMPLE_MARKER: &str = "\\exmp{";

/// Sample tests written as `\exmp{input}{answer}` in a TeX statement.
#[derive(Debug, Clone)]
pub struct TexExamples {
    statement: PathBuf,
}

impl TexExamples {
    pub fn new(statement: impl Into<PathBuf>) -> Self {
        Self { statement: statement.into() }
    }
}

impl TestProvider for TexExamples {
    fn collect(&self) -> io::Result<Vec<TestCase>> {
        let source = fs::read_to_string(&self.statement)?;
        Ok(parse_examples(&source)
            .into_iter()
            .enumerate()
            .map(|(i, (input, answer))| TestCase {
                index: i as u32 + 1,
                input: Payload::Inline(input.into_bytes()),
                answer: Payload::Inline(answer.into_bytes()),
                example: true,
                score: 0,
            })
            .collect())
    }
}

fn strip_blanks(s: &str) -> &str {
    s.trim_matches(|c| c == ' ' || c == '\n')
}

/// Extracts `(input, answer)` pairs from every `\exmp{..}{..}` block.
pub fn parse_examples(source: &str) -> Vec<(String, String)> {
    let mut examples = Vec::new();
    for (n, block) in source.split(EXAMPLE_MARKER).enumerate().skip(1) {
        let Some((input, rest)) = block.split_once('}') else {
            tracing::warn!("skipping unterminated example #{}", n);
            continue;
        };
        let answer = rest
            .split_once('{')
            .and_then(|(_, tail)| tail.split_once('}'))
            .map(|(answer, _)| answer);
        match answer {
            Some(answer) => examples.push((strip_blanks(input).to_string(), strip_blanks(answer).to_string())),
            None => tracing::warn!("skipping example #{} without an answer", n),
        }
    }
    examples
}
