//! FHIR R4 transaction-bundle assembly for measure test cases.
//!
//! This crate owns the document graph a test case is made of: an ordered,
//! append-only collection of resource entries anchored by one Patient. It
//! provides:
//! - [`BundleBuilder`]: the graph assembler. Factory methods (one per
//!   clinical resource type or profile variant) build a resource, attach
//!   its QICore/US Core profile URL, create any auxiliary resources that
//!   type conventionally requires, and append everything as transaction
//!   entries.
//! - re-identification ([`BundleBuilder::reidentify`]): a deep clone of the
//!   finished graph under a fresh Patient identity, with every
//!   subject/beneficiary/patient reference rewritten.
//! - MeasureReport synthesis ([`BundleBuilder::add_measure_report`]): the
//!   summary resource inventorying every entry, appended last.
//!
//! Resource payloads are open-shaped JSON documents (`serde_json::Value`);
//! the bundle skeleton (entry, fullUrl, request) is typed. The crate does
//! not validate resources against FHIR schemas and does not interpret
//! clinical values: timestamps, codes, quantities and units are passed
//! through verbatim from the caller.

mod builder;
mod condition;
mod coverage;
mod device;
mod diagnostic_report;
mod encounter;
mod location;
mod measure_report;
mod medication;
mod observation;
mod patient;
mod procedure;
mod reidentify;
mod service_request;
mod support;

pub use builder::{Bundle, BundleBuilder, BundleEntry, BundleRequest, Period, MADIE_BASE_URL};
pub use condition::ConditionOptions;
pub use diagnostic_report::DiagnosticReportOptions;
pub use encounter::{EncounterLocation, EncounterOptions, EncounterWithCcOptions, PhysicalType};
pub use observation::{ObservationDataAbsentOptions, ObservationOptions, SimpleObservationOptions};
pub use patient::PatientOptions;

use std::fmt;

use uuid::Uuid;

/// Errors returned by bundle assembly and re-identification.
#[derive(Debug, thiserror::Error)]
pub enum BundleError {
    #[error("failed to serialize bundle: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("failed to write bundle file: {0}")]
    FileWrite(std::io::Error),

    /// The graph handed to re-identification has no Patient entry. This is
    /// a construction-sequence bug in the caller, not a runtime condition.
    #[error("bundle has no Patient entry to re-identify")]
    PatientEntryMissing,
}

/// Type alias for Results that can fail with a [`BundleError`].
pub type BundleResult<T> = Result<T, BundleError>;

/// Identifier of one resource within a bundle.
///
/// Freshly minted ids are hyphenated v4 UUIDs; caller-supplied ids are kept
/// verbatim. Ids are opaque to callers and only meaningful for building
/// `{resourceType}/{id}` local references.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ResourceId(String);

impl ResourceId {
    /// Wrap a caller-supplied identifier.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Mint a fresh random identifier.
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Leading eight characters, used to derive display-only sibling
    /// references (for example `Condition/cond-1a2b3c4d`).
    pub(crate) fn short(&self) -> &str {
        let cut = self.0.len().min(8);
        &self.0[..cut]
    }
}

impl fmt::Display for ResourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for ResourceId {
    fn from(id: &str) -> Self {
        Self(id.to_owned())
    }
}

impl From<String> for ResourceId {
    fn from(id: String) -> Self {
        Self(id)
    }
}
