use std::io::Write;
use std::path::{Path, PathBuf};
use blob_store::ObjectStore;
use object_uploader::testdata::{upload_tests, TestSource, UploadedTest};
use object_uploader::{ContentHash, DedupCache, ObjectUploader};
use crate::errors::CliErr;

/// Uploads each file and writes `<path>\t<key>` lines.
pub async fn upload_files<S: ObjectStore>(
    uploader: &mut ObjectUploader<S>,
    files: &[PathBuf],
    out: &mut impl Write,
) -> Result<(), CliErr> {
    for file in files {
        let key = uploader.upload_file(file).await?;
        writeln!(out, "{}\t{}", file.display(), key)?;
    }
    Ok(())
}

/// Collects tests from `source`, uploads them and writes one line per test.
pub async fn upload_source<S: ObjectStore>(
    uploader: &mut ObjectUploader<S>,
    source: &TestSource,
    origin: &Path,
    out: &mut impl Write,
) -> Result<Vec<UploadedTest>, CliErr> {
    let cases = source
        .as_trait()
        .collect()
        .map_err(|source| CliErr::Collect { path: origin.to_path_buf(), source })?;
    if cases.is_empty() {
        tracing::warn!("no tests found in {:?}", origin);
    }

    let uploaded = upload_tests(uploader, &cases).await?;
    for test in &uploaded {
        writeln!(
            out,
            "{}\t{}\t{}\t{}{}",
            test.index,
            test.input_key,
            test.answer_key,
            test.score,
            if test.example { "\texample" } else { "" }
        )?;
    }
    Ok(uploaded)
}

/// Writes `<path>\t<hash>\t<cached key or ->` without touching the store.
pub async fn hash_files(cache: &DedupCache, files: &[PathBuf], out: &mut impl Write) -> Result<(), CliErr> {
    for file in files {
        let data = tokio::fs::read(file).await.map_err(|source| CliErr::Collect {
            path: file.clone(),
            source,
        })?;
        let hash = ContentHash::of(&data);
        writeln!(out, "{}\t{}\t{}", file.display(), hash, cache.get(&hash).unwrap_or("-"))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;
    use std::time::Duration;
    use blob_store::LocalFileBlobStore;
    use object_uploader::{Backoff, RetryPolicy, UploadConfig, UploadError};
    use tempfile::{tempdir, TempDir};

    async fn local_uploader(dir: &TempDir) -> ObjectUploader<LocalFileBlobStore> {
        let cache = DedupCache::load(dir.path().join("cache.json")).await.unwrap();
        let config = UploadConfig {
            chunk_size: 4,
            multipart_threshold: 4,
            retry: RetryPolicy::new(1, Backoff::Fixed(Duration::ZERO)),
        };
        ObjectUploader::new(LocalFileBlobStore::new(dir.path().join("objects")), cache, config)
    }

    #[tokio::test]
    async fn upload_prints_path_and_key() {
        let dir = tempdir().unwrap();
        let file = dir.path().join("a.in");
        std::fs::write(&file, "1 2 3 4 5\n").unwrap();
        let mut uploader = local_uploader(&dir).await;

        let mut out = Vec::new();
        upload_files(&mut uploader, &[file.clone()], &mut out).await.unwrap();

        let line = String::from_utf8(out).unwrap();
        let (path, key) = line.trim_end().split_once('\t').unwrap();
        assert_eq!(path, file.display().to_string());
        assert_eq!(uploader.store().read_object(key).await.unwrap(), b"1 2 3 4 5\n");
    }

    struct ClosedPipe;

    impl Write for ClosedPipe {
        fn write(&mut self, _: &[u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "closed"))
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn write_failure_is_reported() {
        let dir = tempdir().unwrap();
        let file = dir.path().join("a.in");
        std::fs::write(&file, "abc").unwrap();
        let mut uploader = local_uploader(&dir).await;

        let err = upload_files(&mut uploader, &[file.clone()], &mut ClosedPipe).await.unwrap_err();
        assert!(matches!(&err, CliErr::Output(e) if e.kind() == io::ErrorKind::BrokenPipe), "{}", err);

        let err = hash_files(uploader.cache(), &[file], &mut ClosedPipe).await.unwrap_err();
        assert!(matches!(err, CliErr::Output(_)));
    }

    #[test]
    fn upload_error_names_its_stage_once() {
        let err = CliErr::from(UploadError::Read {
            path: PathBuf::from("a.in"),
            source: io::Error::new(io::ErrorKind::NotFound, "gone"),
        });
        let message = err.to_string();
        assert!(message.starts_with("upload failed: "), "{}", message);
        assert_eq!(message.matches("read").count(), 1, "{}", message);
    }

    #[tokio::test]
    async fn directory_tests_are_listed_with_scores() {
        let dir = tempdir().unwrap();
        let tests = dir.path().join("tests");
        std::fs::create_dir(&tests).unwrap();
        std::fs::write(tests.join("01"), "1\n").unwrap();
        std::fs::write(tests.join("01.a"), "1\n").unwrap();
        std::fs::write(tests.join("02"), "2\n").unwrap();
        std::fs::write(tests.join("02.a"), "4\n").unwrap();
        let mut uploader = local_uploader(&dir).await;

        let mut out = Vec::new();
        let source = TestSource::directory(&tests, false);
        let uploaded = upload_source(&mut uploader, &source, &tests, &mut out).await.unwrap();

        assert_eq!(uploaded.len(), 2);
        assert_eq!(uploaded[0].input_key, uploaded[0].answer_key);
        let text = String::from_utf8(out).unwrap();
        let scores: Vec<&str> = text.lines().map(|l| l.split('\t').nth(3).unwrap()).collect();
        assert_eq!(scores, vec!["50", "50"]);
    }

    #[tokio::test]
    async fn hash_reports_cached_keys() {
        let dir = tempdir().unwrap();
        let file = dir.path().join("a.in");
        std::fs::write(&file, "abc").unwrap();
        let mut uploader = local_uploader(&dir).await;
        let key = uploader.upload_file(&file).await.unwrap();

        let mut out = Vec::new();
        hash_files(uploader.cache(), &[file], &mut out).await.unwrap();

        let text = String::from_utf8(out).unwrap();
        let fields: Vec<&str> = text.trim_end().split('\t').collect();
        assert_eq!(fields[1], "a9993e364706816aba3e25717850c26c9cd0d89d");
        assert_eq!(fields[2], key);
    }
}
