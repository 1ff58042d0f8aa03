//! Measure test-case packaging in the MADiE import layout.
//!
//! Takes registered test-case templates, re-identifies each one under a
//! fresh patient identity, appends its MeasureReport, and writes the
//! import-ready directory tree:
//!
//! ```text
//! <Measure>-v<version>-FHIR-TestCases/
//! ├── <patient-uuid>/
//! │   └── <Measure>-v<version>-<SeriesTitle>.json
//! ├── .madie          # test-case metadata records
//! └── README.txt      # uuid -> test-case name mapping
//! ```
//!
//! The patient uuid doubles as the per-case directory name, which is how
//! the importer associates folders with test cases.

mod exporter;

pub use exporter::{MadieExporter, TestCase};

/// Errors returned by the export layer.
#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("failed to remove previous output: {0}")]
    Cleanup(std::io::Error),

    #[error("failed to create output directory: {0}")]
    DirCreation(std::io::Error),

    #[error("failed to write export file: {0}")]
    FileWrite(std::io::Error),

    #[error("failed to serialize test-case metadata: {0}")]
    MetadataSerialization(#[from] serde_json::Error),

    #[error(transparent)]
    Bundle(#[from] bundle::BundleError),
}

/// Type alias for Results that can fail with an [`ExportError`].
pub type ExportResult<T> = Result<T, ExportError>;
