//! Terminology catalogs for QICore test-case generation.
//!
//! This crate holds the closed, process-wide lookup tables the bundle
//! factory draws from:
//! - standard code-system URLs ([`code_systems`])
//! - canonical profile URLs for QICore 6.0.0, US Core and CQF Measures
//!   ([`profiles`])
//! - FHIR extension URLs ([`extensions`])
//!
//! plus the [`Coding`] value type and the CodeableConcept JSON helpers used
//! to assemble coded fields.
//!
//! Everything here is immutable constant data. Profile lookup is a closed
//! enum rather than a string-keyed map: an unsupported profile token is
//! unrepresentable instead of being a runtime failure.

pub mod code_systems;
pub mod extensions;
pub mod profiles;

pub use profiles::Profile;

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// A FHIR Coding: a reference to a code defined by a terminology system.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Coding {
    /// Identity of the terminology system.
    pub system: String,

    /// Symbol in syntax defined by the system.
    pub code: String,

    /// Representation defined by the system.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display: Option<String>,
}

impl Coding {
    /// Build a coding with a display text.
    pub fn new(
        system: impl Into<String>,
        code: impl Into<String>,
        display: impl Into<String>,
    ) -> Self {
        Self {
            system: system.into(),
            code: code.into(),
            display: Some(display.into()),
        }
    }

    /// Build a coding without a display text.
    pub fn bare(system: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            system: system.into(),
            code: code.into(),
            display: None,
        }
    }

    /// Render as a JSON value.
    pub fn to_value(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }

    /// Wrap this coding in the `{"coding": [...]}` CodeableConcept shape.
    pub fn concept(&self) -> Value {
        json!({ "coding": [self.to_value()] })
    }

    /// Wrap this coding in a CodeableConcept carrying an additional `text`.
    pub fn concept_with_text(&self, text: impl Into<String>) -> Value {
        json!({ "coding": [self.to_value()], "text": text.into() })
    }
}

/// Build a CodeableConcept from several codings.
pub fn concept_from(codings: &[Coding]) -> Value {
    let coded: Vec<Value> = codings.iter().map(Coding::to_value).collect();
    json!({ "coding": coded })
}
