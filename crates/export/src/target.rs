//! Export destinations.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::PathBuf;

use gazelog_common::error::{GazelogError, GazelogResult};

/// An opaque export destination.
///
/// Each export request opens a fresh sink; the document is written once
/// per request. Opening may fail (document pickers get cancelled, volumes
/// unmount) and the failure is the caller's to report.
pub trait ExportTarget: Send {
    /// Open a byte sink for one export document.
    fn create(&mut self) -> GazelogResult<Box<dyn Write + Send>>;

    /// Destination name for logging.
    fn name(&self) -> &str;
}

/// Export target writing to a fixed filesystem path.
pub struct FileExportTarget {
    path: PathBuf,
}

impl FileExportTarget {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &PathBuf {
        &self.path
    }
}

impl ExportTarget for FileExportTarget {
    fn create(&mut self) -> GazelogResult<Box<dyn Write + Send>> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let file = File::create(&self.path)
            .map_err(|e| GazelogError::export(format!("Failed to create {:?}: {e}", self.path)))?;
        Ok(Box::new(BufWriter::new(file)))
    }

    fn name(&self) -> &str {
        "file"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::csv::write_samples;
    use gazelog_session_model::GazeSample;

    #[test]
    fn test_file_target_roundtrip() {
        let dir = std::env::temp_dir().join("gazelog_test_export");
        let _ = std::fs::remove_dir_all(&dir);

        let path = dir.join("track_results.csv");
        let mut target = FileExportTarget::new(path.clone());

        let samples = vec![GazeSample {
            time_secs: 0.0,
            x: 0.5,
            y: 0.5,
        }];
        let mut sink = target.create().unwrap();
        write_samples(&samples, &mut sink).unwrap();
        drop(sink);

        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content, "Sec,X,Y\n0,0.5,0.5\n");

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_each_request_rewrites_the_document() {
        let dir = std::env::temp_dir().join("gazelog_test_export_rewrite");
        let _ = std::fs::remove_dir_all(&dir);

        let path = dir.join("track_results.csv");
        let mut target = FileExportTarget::new(path.clone());

        for _ in 0..2 {
            let mut sink = target.create().unwrap();
            write_samples(&[], &mut sink).unwrap();
        }

        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content, "Sec,X,Y\n");

        std::fs::remove_dir_all(&dir).ok();
    }
}
