//! Transaction-bundle wire types and the graph assembler core.
//!
//! The bundle skeleton is a closed wire shape: `{resourceType: "Bundle",
//! id, type: "transaction", entry: [{fullUrl, resource, request}]}` with
//! `request = {method: "PUT", url: "{resourceType}/{id}"}`. Entries are
//! append-only; nothing removes or reorders them once added. Resource
//! payloads inside entries stay as open JSON documents.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::{BundleError, BundleResult, ResourceId};

/// Base URL used to derive entry `fullUrl`s, matching the downstream
/// measure-authoring environment.
pub const MADIE_BASE_URL: &str = "https://madie.cms.gov";

/// A FHIR period with optional bounds. Timestamps are opaque strings.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Period {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end: Option<String>,
}

impl Period {
    pub fn new(start: impl Into<String>, end: impl Into<String>) -> Self {
        Self {
            start: Some(start.into()),
            end: Some(end.into()),
        }
    }
}

/// Upsert descriptor for one entry.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BundleRequest {
    pub method: String,
    pub url: String,
}

/// One entry wrapping exactly one resource.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BundleEntry {
    #[serde(rename = "fullUrl")]
    pub full_url: String,
    pub resource: Value,
    pub request: BundleRequest,
}

/// The transaction bundle: an ordered sequence of entries plus a
/// bundle-level identity.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Bundle {
    #[serde(rename = "resourceType")]
    resource_type: String,
    pub id: String,
    #[serde(rename = "type")]
    kind: String,
    pub entry: Vec<BundleEntry>,
}

impl Bundle {
    fn new() -> Self {
        Self {
            resource_type: "Bundle".to_owned(),
            id: short_hex_id(),
            kind: "transaction".to_owned(),
            entry: Vec::new(),
        }
    }
}

/// 24 hex characters from an unhyphenated v4 UUID, the shape the
/// downstream importer uses for bundle and test-case identities.
pub(crate) fn short_hex_id() -> String {
    let mut simple = Uuid::new_v4().simple().to_string();
    simple.truncate(24);
    simple
}

/// The ordered output of one factory operation: auxiliary resources the
/// operation had to synthesize, then exactly one primary resource.
///
/// Committing a set appends the auxiliaries first so that a resource's
/// dependencies precede it in entry order. That ordering is a debugging
/// convenience only; consumers must not rely on it.
pub(crate) struct ResourceSet {
    auxiliaries: Vec<Value>,
    primary: Value,
}

impl ResourceSet {
    pub(crate) fn new(primary: Value) -> Self {
        Self {
            auxiliaries: Vec::new(),
            primary,
        }
    }

    pub(crate) fn with_auxiliaries(primary: Value, auxiliaries: Vec<Value>) -> Self {
        Self {
            auxiliaries,
            primary,
        }
    }
}

/// Assembles one test case's document graph.
///
/// Factory methods (defined across the resource modules of this crate)
/// append entries and hand back the primary resource's id for
/// cross-referencing. One Patient anchors the graph; its id is chosen at
/// construction and referenced by every clinically-scoped resource.
#[derive(Clone, Debug)]
pub struct BundleBuilder {
    pub(crate) test_case_name: String,
    pub(crate) patient_id: ResourceId,
    pub(crate) bundle: Bundle,
}

impl BundleBuilder {
    /// Start an empty bundle; the patient id is minted here and used by
    /// every subsequent factory call.
    pub fn new(test_case_name: impl Into<String>) -> Self {
        Self::with_patient_id(test_case_name, ResourceId::generate())
    }

    /// Start an empty bundle under a caller-chosen patient id.
    pub fn with_patient_id(test_case_name: impl Into<String>, patient_id: ResourceId) -> Self {
        Self {
            test_case_name: test_case_name.into(),
            patient_id,
            bundle: Bundle::new(),
        }
    }

    pub fn test_case_name(&self) -> &str {
        &self.test_case_name
    }

    pub fn patient_id(&self) -> &ResourceId {
        &self.patient_id
    }

    pub fn bundle(&self) -> &Bundle {
        &self.bundle
    }

    /// Number of entries currently in the graph.
    pub fn len(&self) -> usize {
        self.bundle.entry.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bundle.entry.is_empty()
    }

    /// Append one resource as a transaction entry, assigning a fresh id if
    /// the resource does not already carry one. Returns the entry's id.
    pub(crate) fn push_resource(&mut self, mut resource: Value) -> ResourceId {
        let id = match resource.get("id").and_then(Value::as_str) {
            Some(id) if !id.is_empty() => ResourceId::new(id),
            _ => {
                let fresh = ResourceId::generate();
                if let Value::Object(fields) = &mut resource {
                    fields.insert("id".to_owned(), Value::String(fresh.to_string()));
                }
                fresh
            }
        };

        let resource_type = resource
            .get("resourceType")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_owned();

        self.bundle.entry.push(BundleEntry {
            full_url: format!("{MADIE_BASE_URL}/{resource_type}/{id}"),
            resource,
            request: BundleRequest {
                method: "PUT".to_owned(),
                url: format!("{resource_type}/{id}"),
            },
        });
        id
    }

    /// Commit a factory operation's output: auxiliaries first, primary
    /// last. Returns the primary's id.
    pub(crate) fn commit(&mut self, set: ResourceSet) -> ResourceId {
        for auxiliary in set.auxiliaries {
            self.push_resource(auxiliary);
        }
        self.push_resource(set.primary)
    }

    /// Serialize the bundle as two-space-indented JSON with LF endings,
    /// the exact on-disk shape the downstream importer consumes.
    pub fn to_json(&self) -> BundleResult<String> {
        Ok(serde_json::to_string_pretty(&self.bundle)?)
    }

    /// Write the serialized bundle to `path`.
    pub fn save(&self, path: impl AsRef<Path>) -> BundleResult<()> {
        let json = self.to_json()?;
        fs::write(path, json).map_err(BundleError::FileWrite)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn empty_bundle_has_transaction_skeleton() {
        let builder = BundleBuilder::new("Skeleton");
        let value = serde_json::to_value(builder.bundle()).expect("serialize bundle");
        assert_eq!(value["resourceType"], "Bundle");
        assert_eq!(value["type"], "transaction");
        assert_eq!(value["id"].as_str().expect("bundle id").len(), 24);
        assert!(value["entry"].as_array().expect("entry array").is_empty());
    }

    #[test]
    fn push_keeps_preassigned_ids() {
        let mut builder = BundleBuilder::new("Push");
        let id = builder.push_resource(json!({
            "resourceType": "Practitioner",
            "id": "gp-001"
        }));
        assert_eq!(id.as_str(), "gp-001");
        let entry = &builder.bundle().entry[0];
        assert_eq!(entry.full_url, "https://madie.cms.gov/Practitioner/gp-001");
        assert_eq!(entry.request.method, "PUT");
        assert_eq!(entry.request.url, "Practitioner/gp-001");
    }

    #[test]
    fn push_mints_missing_ids_into_the_resource() {
        let mut builder = BundleBuilder::new("Mint");
        let id = builder.push_resource(json!({ "resourceType": "Observation" }));
        let entry = &builder.bundle().entry[0];
        assert_eq!(entry.resource["id"], id.as_str());
        assert_eq!(entry.request.url, format!("Observation/{id}"));
    }

    #[test]
    fn commit_appends_auxiliaries_before_primary() {
        let mut builder = BundleBuilder::new("Order");
        let primary_id = builder.commit(ResourceSet::with_auxiliaries(
            json!({ "resourceType": "Observation", "id": "obs-1" }),
            vec![
                json!({ "resourceType": "Specimen", "id": "spec-1" }),
                json!({ "resourceType": "Device", "id": "dev-1" }),
            ],
        ));
        assert_eq!(primary_id.as_str(), "obs-1");
        let types: Vec<&str> = builder
            .bundle()
            .entry
            .iter()
            .map(|entry| entry.resource["resourceType"].as_str().unwrap_or_default())
            .collect();
        assert_eq!(types, ["Specimen", "Device", "Observation"]);
    }

    #[test]
    fn entries_are_never_reordered_by_later_pushes() {
        let mut builder = BundleBuilder::new("Stable");
        let first = builder.push_resource(json!({ "resourceType": "Location" }));
        builder.push_resource(json!({ "resourceType": "Device" }));
        builder.push_resource(json!({ "resourceType": "Condition" }));
        assert_eq!(builder.len(), 3);
        assert_eq!(builder.bundle().entry[0].resource["id"], first.as_str());
    }

    #[test]
    fn ids_are_pairwise_distinct_across_factory_sequences() {
        use crate::{ConditionOptions, EncounterOptions, ObservationOptions, PatientOptions};
        use std::collections::HashSet;

        let mut builder = BundleBuilder::new("Unique");
        builder.add_patient(PatientOptions::default());
        let encounter_id = builder.add_encounter(
            "2022-01-05T08:00:00.000Z",
            "2022-01-10T12:00:00.000Z",
            EncounterOptions::default(),
        );
        builder.add_condition(&encounter_id, ConditionOptions::default());
        builder.add_observation(&encounter_id, ObservationOptions::default());
        builder.add_observation(&encounter_id, ObservationOptions::default());
        builder.add_medication_request(&encounter_id, "2022-01-06T09:00:00.000Z", None);
        builder.add_coverage("2022-01-01", "2022-12-31");
        builder.add_device(None);

        let ids: Vec<&str> = builder
            .bundle()
            .entry
            .iter()
            .map(|entry| entry.resource["id"].as_str().expect("id"))
            .collect();
        let distinct: HashSet<&str> = ids.iter().copied().collect();
        assert_eq!(distinct.len(), ids.len());
    }

    #[test]
    fn serialization_is_pretty_json_with_lf() {
        let mut builder = BundleBuilder::new("Serial");
        builder.push_resource(json!({ "resourceType": "Device", "id": "d1" }));
        let json = builder.to_json().expect("serialize");
        assert!(json.contains("  \"entry\""));
        assert!(!json.contains('\r'));
    }
}
