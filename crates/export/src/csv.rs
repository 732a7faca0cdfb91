//! CSV serialization of recorded gaze samples.
//!
//! The persisted artifact is the one bit-exact external contract: header
//! `Sec,X,Y`, then one comma-separated row per sample terminated by a
//! line break. Values are written in their source type's natural
//! representation, with no extra rounding.

use std::fmt::Write as _;
use std::io::Write;

use gazelog_common::error::{GazelogError, GazelogResult};
use gazelog_session_model::GazeSample;

/// Header row of the export document.
pub const CSV_HEADER: &str = "Sec,X,Y";

/// Serialize samples to a complete CSV document.
///
/// Serializing the same buffer twice yields byte-identical output.
pub fn serialize_samples(samples: &[GazeSample]) -> String {
    let mut document = String::with_capacity(CSV_HEADER.len() + 1 + samples.len() * 24);
    document.push_str(CSV_HEADER);
    document.push('\n');
    for sample in samples {
        // Infallible: writing to a String cannot fail.
        let _ = writeln!(document, "{},{},{}", sample.time_secs, sample.x, sample.y);
    }
    document
}

/// Write the CSV document for `samples` into `writer`.
///
/// Returns the number of data rows written. A write failure surfaces to
/// the caller without touching the sample buffer.
pub fn write_samples<W: Write>(samples: &[GazeSample], writer: &mut W) -> GazelogResult<u64> {
    let document = serialize_samples(samples);
    writer
        .write_all(document.as_bytes())
        .map_err(|e| GazelogError::export(format!("Failed to write samples: {e}")))?;
    writer
        .flush()
        .map_err(|e| GazelogError::export(format!("Failed to flush export sink: {e}")))?;

    let rows = samples.len() as u64;
    tracing::debug!(rows, bytes = document.len(), "Export document written");
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(time_secs: f64, x: f32, y: f32) -> GazeSample {
        GazeSample { time_secs, x, y }
    }

    #[test]
    fn test_empty_buffer_is_header_only() {
        assert_eq!(serialize_samples(&[]), "Sec,X,Y\n");
    }

    #[test]
    fn test_row_per_sample() {
        let samples = vec![sample(0.0, 0.5, 0.5), sample(0.05, 0.5, 0.5)];
        assert_eq!(
            serialize_samples(&samples),
            "Sec,X,Y\n0,0.5,0.5\n0.05,0.5,0.5\n"
        );
    }

    #[test]
    fn test_serialization_is_idempotent() {
        let samples = vec![
            sample(0.0, 0.123, 0.456),
            sample(1.5, 0.789, 0.012),
            sample(2.25, 0.5, 0.5),
        ];
        assert_eq!(serialize_samples(&samples), serialize_samples(&samples));
    }

    #[test]
    fn test_write_reports_rows_and_matches_serialization() {
        let samples = vec![sample(0.0, 0.1, 0.2), sample(0.5, 0.3, 0.4)];
        let mut sink = Vec::new();
        let rows = write_samples(&samples, &mut sink).unwrap();
        assert_eq!(rows, 2);
        assert_eq!(sink, serialize_samples(&samples).into_bytes());
    }

    #[test]
    fn test_write_failure_surfaces() {
        struct BrokenSink;
        impl Write for BrokenSink {
            fn write(&mut self, _buf: &[u8]) -> std::io::Result<usize> {
                Err(std::io::Error::other("destination unavailable"))
            }
            fn flush(&mut self) -> std::io::Result<()> {
                Ok(())
            }
        }

        let samples = vec![sample(0.0, 0.1, 0.2)];
        let err = write_samples(&samples, &mut BrokenSink).unwrap_err();
        assert!(err.to_string().contains("Failed to write samples"));
    }
}
