//! GazeLog Export
//!
//! Serializes a recorded sample buffer to the `Sec,X,Y` CSV contract and
//! streams it into an opaque destination sink. Serialization never
//! mutates the buffer, so a failed write leaves the recorded data intact
//! and exportable again.

pub mod csv;
pub mod target;

pub use csv::{serialize_samples, write_samples, CSV_HEADER};
pub use target::{ExportTarget, FileExportTarget};
