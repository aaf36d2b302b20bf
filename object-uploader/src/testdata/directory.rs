use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::PathBuf;
use crate::testdata::{distribute_points, TestCase, TestProvider};
use crate::uploader::Payload;

const INPUT_EXTENSIONS: &[&str] = &["", ".in", ".dat"];
const ANSWER_EXTENSIONS: &[&str] = &[".a", ".out", ".sol", ".ans"];

/// Tests stored as `<name>[.in|.dat]` / `<name>.a|.out|.sol|.ans` pairs in one directory.
#[derive(Debug, Clone)]
pub struct DirectoryTests {
    path: PathBuf,
    examples: bool,
}

impl DirectoryTests {
    pub fn new(path: impl Into<PathBuf>, examples: bool) -> Self {
        Self { path: path.into(), examples }
    }
}

/// Splits `name` at its last dot, keeping the dot with the extension.
fn split_extension(name: &str) -> (&str, &str) {
    match name.rfind('.') {
        Some(pos) => name.split_at(pos),
        None => (name, ""),
    }
}

impl TestProvider for DirectoryTests {
    fn collect(&self) -> io::Result<Vec<TestCase>> {
        let mut inputs = BTreeMap::new();
        let mut answers = BTreeMap::new();

        for entry in fs::read_dir(&self.path)? {
            let entry = entry?;
            let is_file = match fs::metadata(entry.path()) {
                Ok(metadata) => metadata.is_file(),
                Err(e) => {
                    tracing::warn!("skipping {:?}: {}", entry.path(), e);
                    false
                }
            };
            if !is_file {
                continue;
            }
            let name = entry.file_name().to_string_lossy().into_owned();
            let (stem, extension) = split_extension(&name);
            if INPUT_EXTENSIONS.contains(&extension) {
                inputs.insert(stem.to_string(), entry.path());
            } else if ANSWER_EXTENSIONS.contains(&extension) {
                answers.insert(stem.to_string(), entry.path());
            } else {
                inputs.insert(name.clone(), entry.path());
            }
        }

        let pairs: Vec<_> = inputs
            .into_iter()
            .filter_map(|(stem, input)| answers.remove(&stem).map(|answer| (input, answer)))
            .collect();
        tracing::debug!("found {} tests in {:?}", pairs.len(), self.path);

        let scores = if self.examples {
            vec![0; pairs.len()]
        } else {
            distribute_points(pairs.len())
        };

        Ok(pairs
            .into_iter()
            .zip(scores)
            .enumerate()
            .map(|(i, ((input, answer), score))| TestCase {
                index: i as u32 + 1,
                input: Payload::File(input),
                answer: Payload::File(answer),
                example: self.examples,
                score,
            })
            .collect())
    }
}
