//! Test cases gathered from problem packages and pushed through the uploader.

use std::io;
use std::path::PathBuf;
use blob_store::ObjectStore;
use crate::error::UploadError;
use crate::uploader::{ObjectUploader, Payload};

pub mod directory;
pub mod tex;

pub use directory::DirectoryTests;
pub use tex::TexExamples;

/// One test before upload: where its input and answer come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestCase {
    pub index: u32,
    pub input: Payload,
    pub answer: Payload,
    pub example: bool,
    pub score: u32,
}

/// One test after upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedTest {
    pub index: u32,
    pub input_key: String,
    pub answer_key: String,
    pub example: bool,
    pub score: u32,
}

/// Something that can list the tests of a problem.
pub trait TestProvider {
    fn collect(&self) -> io::Result<Vec<TestCase>>;
}

#[derive(Debug, Clone)]
pub enum TestSource {
    Directory(DirectoryTests),
    TexExamples(TexExamples),
}

impl TestSource {
    pub fn directory(path: impl Into<PathBuf>, examples: bool) -> Self {
        TestSource::Directory(DirectoryTests::new(path, examples))
    }

    pub fn tex_examples(statement: impl Into<PathBuf>) -> Self {
        TestSource::TexExamples(TexExamples::new(statement))
    }

    /// Returns a reference to the inner value as a trait object.
    pub fn as_trait(&self) -> &dyn TestProvider {
        match self {
            TestSource::Directory(a) => a,
            TestSource::TexExamples(b) => b,
        }
    }
}

/// Splits 100 points over `count` tests; the last `100 % count` tests get one extra point.
pub fn distribute_points(count: usize) -> Vec<u32> {
    if count == 0 {
        return Vec::new();
    }
    let base = (100 / count) as u32;
    let bonus = 100 % count;
    (0..count)
        .map(|i| if count - i <= bonus { base + 1 } else { base })
        .collect()
}

/// Uploads input and answer of every case, stopping at the first failure.
pub async fn upload_tests<S: ObjectStore>(
    uploader: &mut ObjectUploader<S>,
    cases: &[TestCase],
) -> Result<Vec<UploadedTest>, UploadError> {
    let mut uploaded = Vec::with_capacity(cases.len());
    for case in cases {
        let input_key = uploader.upload_payload(&case.input).await.map_err(|e| {
            tracing::error!("Unable to upload input of test {}: {}", case.index, e);
            e
        })?;
        let answer_key = uploader.upload_payload(&case.answer).await.map_err(|e| {
            tracing::error!("Unable to upload answer of test {}: {}", case.index, e);
            e
        })?;
        tracing::info!("Uploaded test {}", case.index);
        uploaded.push(UploadedTest {
            index: case.index,
            input_key,
            answer_key,
            example: case.example,
            score: case.score,
        });
    }
    Ok(uploaded)
}
