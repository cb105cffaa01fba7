//! Zip container rule: extract to a request-scoped scratch directory,
//! find the single CSV inside, and answer from it.

use std::io::Cursor;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use super::{csv_answer::first_answer, InterpretError, RuleResult};

/// Extract `data` under a fresh directory in `scratch_root` and answer from its CSV.
///
/// Archives whose entries declare more than `max_extracted` bytes in total are
/// rejected before anything is written. The scratch directory is removed before
/// returning, whatever the outcome.
pub fn answer_from_archive(data: &[u8], scratch_root: &Path, max_extracted: u64) -> RuleResult {
    std::fs::create_dir_all(scratch_root)?;
    let scratch = tempfile::Builder::new()
        .prefix("solver-")
        .tempdir_in(scratch_root)?;

    tracing::debug!("Extracting archive into {}", scratch.path().display());
    let result = extract_and_answer(data, scratch.path(), max_extracted);

    let path = scratch.path().to_path_buf();
    if let Err(e) = scratch.close() {
        tracing::warn!("Failed to remove scratch dir {}: {}", path.display(), e);
    }

    result
}

fn extract_and_answer(data: &[u8], dir: &Path, max_extracted: u64) -> RuleResult {
    let mut archive = zip::ZipArchive::new(Cursor::new(data))?;

    let mut declared = 0u64;
    for index in 0..archive.len() {
        declared = declared.saturating_add(archive.by_index(index)?.size());
    }
    if declared > max_extracted {
        return Err(InterpretError::unsupported(format!(
            "archive expands to {} bytes, over the {} byte limit",
            declared, max_extracted
        )));
    }

    archive.extract(dir)?;

    let tables = tabular_files(dir);
    match tables.as_slice() {
        [single] => {
            tracing::debug!("Answering from {}", single.display());
            let bytes = std::fs::read(single)?;
            first_answer(&bytes)
        }
        [] => Err(InterpretError::unsupported("archive contains no CSV file")),
        many => Err(InterpretError::unsupported(format!(
            "archive contains {} CSV files; expected exactly one",
            many.len()
        ))),
    }
}

fn tabular_files(dir: &Path) -> Vec<PathBuf> {
    WalkDir::new(dir)
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_file())
        // macOS resource forks
        .filter(|entry| !entry.path().components().any(|c| c.as_os_str() == "__MACOSX"))
        .filter(|entry| {
            entry
                .path()
                .extension()
                .and_then(|ext| ext.to_str())
                .map(|ext| ext.eq_ignore_ascii_case("csv"))
                .unwrap_or(false)
        })
        .map(|entry| entry.into_path())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const LIMIT: u64 = 1024 * 1024;

    fn zip_with(files: &[(&str, &str)]) -> Vec<u8> {
        let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
        let options = zip::write::SimpleFileOptions::default();
        for (name, body) in files {
            writer.start_file(*name, options).unwrap();
            writer.write_all(body.as_bytes()).unwrap();
        }
        writer.finish().unwrap().into_inner()
    }

    fn is_empty_dir(path: &Path) -> bool {
        std::fs::read_dir(path).unwrap().next().is_none()
    }

    #[test]
    fn test_single_csv_answer() {
        let root = tempfile::tempdir().unwrap();
        let data = zip_with(&[("extract.csv", "answer\n42\n")]);

        assert_eq!(answer_from_archive(&data, root.path(), LIMIT).unwrap(), "42");
        assert!(is_empty_dir(root.path()));
    }

    #[test]
    fn test_nested_csv_and_resource_forks() {
        let root = tempfile::tempdir().unwrap();
        let data = zip_with(&[
            ("bundle/data/extract.csv", "id,answer\n1,abc\n"),
            ("__MACOSX/bundle/data/._extract.csv", "junk"),
            ("bundle/README.txt", "not a table"),
        ]);

        assert_eq!(answer_from_archive(&data, root.path(), LIMIT).unwrap(), "abc");
        assert!(is_empty_dir(root.path()));
    }

    #[test]
    fn test_multiple_csvs_unsupported_and_cleaned_up() {
        let root = tempfile::tempdir().unwrap();
        let data = zip_with(&[("a.csv", "answer\n1\n"), ("b.csv", "answer\n2\n")]);

        let err = answer_from_archive(&data, root.path(), LIMIT).unwrap_err();
        assert!(matches!(err, InterpretError::UnsupportedFile(_)));
        assert!(is_empty_dir(root.path()));
    }

    #[test]
    fn test_no_csv_unsupported() {
        let root = tempfile::tempdir().unwrap();
        let data = zip_with(&[("notes.txt", "hello")]);

        let err = answer_from_archive(&data, root.path(), LIMIT).unwrap_err();
        assert!(err.to_string().contains("no CSV"));
        assert!(is_empty_dir(root.path()));
    }

    #[test]
    fn test_oversized_expansion_rejected_before_extract() {
        let root = tempfile::tempdir().unwrap();
        // Compresses to a few hundred bytes, expands to 64 KiB
        let big = "0".repeat(64 * 1024);
        let data = zip_with(&[("extract.csv", big.as_str())]);
        assert!(data.len() < 4096);

        let err = answer_from_archive(&data, root.path(), 16 * 1024).unwrap_err();
        assert!(matches!(err, InterpretError::UnsupportedFile(_)));
        assert!(err.to_string().contains("limit"));
        assert!(is_empty_dir(root.path()));
    }

    #[test]
    fn test_corrupt_archive_cleaned_up() {
        let root = tempfile::tempdir().unwrap();

        let err = answer_from_archive(b"definitely not a zip", root.path(), LIMIT).unwrap_err();
        assert!(matches!(err, InterpretError::UnsupportedFile(_)));
        assert!(is_empty_dir(root.path()));
    }

    #[test]
    fn test_concurrent_requests_use_distinct_scratch_dirs() {
        let root = tempfile::tempdir().unwrap();
        let data = zip_with(&[("extract.csv", "answer\n42\n")]);

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let data = data.clone();
                let root = root.path().to_path_buf();
                std::thread::spawn(move || answer_from_archive(&data, &root, LIMIT))
            })
            .collect();

        for handle in handles {
            assert_eq!(handle.join().unwrap().unwrap(), "42");
        }
        assert!(is_empty_dir(root.path()));
    }
}
