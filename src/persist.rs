//! Dataset persistence: the structured JSON snapshot and the flat IP list.

use std::fs;
use std::path::Path;

use log::info;

use crate::error_handling::PipelineError;
use crate::models::{Dataset, ResolverRecord};

fn io_error(path: &Path, source: std::io::Error) -> PipelineError {
    PipelineError::Io {
        path: path.display().to_string(),
        source,
    }
}

/// Loads the previously persisted dataset, if any.
///
/// # Errors
///
/// Returns an error if the file exists but cannot be read or decoded. A
/// missing file is `Ok(None)`.
pub fn load_dataset(path: &Path) -> Result<Option<Dataset>, PipelineError> {
    if !path.exists() {
        return Ok(None);
    }
    let raw = fs::read_to_string(path).map_err(|e| io_error(path, e))?;
    let dataset = serde_json::from_str(&raw).map_err(|source| PipelineError::CorruptDataset {
        path: path.display().to_string(),
        source,
    })?;
    Ok(Some(dataset))
}

/// Writes the dataset as indentation-formatted JSON with a trailing newline.
///
/// Serialization order is fixed by the struct definitions, so identical
/// inputs produce byte-identical files.
///
/// # Errors
///
/// Returns an error if the file cannot be written.
pub fn write_dataset(path: &Path, dataset: &Dataset) -> Result<(), PipelineError> {
    info!("writing JSON results to {} ...", path.display());
    // Serialization of these shapes cannot fail; any error here is an I/O
    // problem surfaced through the write below.
    let mut body = serde_json::to_string_pretty(dataset).unwrap_or_default();
    body.push('\n');
    fs::write(path, body).map_err(|e| io_error(path, e))
}

/// Writes the flat resolver list, one IP per line.
///
/// # Errors
///
/// Returns an error if the file cannot be written.
pub fn write_flat_list(path: &Path, records: &[ResolverRecord]) -> Result<(), PipelineError> {
    info!("writing flat IP file ({}) to disk...", path.display());
    let mut body = String::new();
    for record in records {
        body.push_str(&record.ip);
        body.push('\n');
    }
    fs::write(path, body).map_err(|e| io_error(path, e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::RunMetadata;
    use tempfile::tempdir;

    fn sample_dataset() -> Dataset {
        Dataset {
            meta: RunMetadata::default(),
            nameservers: vec![
                ResolverRecord::flat_entry("8.8.8.8", "flat-source"),
                ResolverRecord::flat_entry("9.9.9.9", "flat-source"),
            ],
        }
    }

    #[test]
    fn test_load_missing_dataset_is_none() {
        let dir = tempdir().unwrap();
        let loaded = load_dataset(&dir.path().join("absent.json")).unwrap();
        assert!(loaded.is_none());
    }

    #[test]
    fn test_write_then_load_round_trip() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("resolvers.json");
        let dataset = sample_dataset();

        write_dataset(&path, &dataset).unwrap();
        let loaded = load_dataset(&path).unwrap().unwrap();
        assert_eq!(loaded, dataset);

        // The file is newline-terminated.
        let raw = std::fs::read(&path).unwrap();
        assert_eq!(raw.last(), Some(&b'\n'));
    }

    #[test]
    fn test_identical_datasets_write_identical_bytes() {
        let dir = tempdir().unwrap();
        let first = dir.path().join("a.json");
        let second = dir.path().join("b.json");

        write_dataset(&first, &sample_dataset()).unwrap();
        write_dataset(&second, &sample_dataset()).unwrap();
        assert_eq!(
            std::fs::read(&first).unwrap(),
            std::fs::read(&second).unwrap()
        );
    }

    #[test]
    fn test_corrupt_dataset_is_an_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("resolvers.json");
        std::fs::write(&path, "{ not json").unwrap();
        let err = load_dataset(&path).unwrap_err();
        assert!(matches!(err, PipelineError::CorruptDataset { .. }));
    }

    #[test]
    fn test_write_flat_list() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("resolvers.txt");
        let records = sample_dataset().nameservers;
        write_flat_list(&path, &records).unwrap();
        assert_eq!(
            std::fs::read_to_string(&path).unwrap(),
            "8.8.8.8\n9.9.9.9\n"
        );
    }
}
