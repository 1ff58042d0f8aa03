//! Condition factory operations.
//!
//! Two profile variants: problem-list conditions
//! (problems-health-concerns) and encounter diagnoses. They are separate
//! operations because the category coding and the attached profile URL
//! both change.

use serde_json::{json, Value};
use terminology::{code_systems, Coding, Profile};

use crate::builder::ResourceSet;
use crate::support::insert_field;
use crate::{BundleBuilder, ResourceId};

/// Parameters shared by the Condition operations.
#[derive(Clone, Debug)]
pub struct ConditionOptions {
    pub code: Option<Coding>,
    pub clinical_status: String,
    pub verification_status: String,
    pub onset_datetime: String,
    /// Only used by the encounter-diagnosis variant.
    pub abatement_datetime: Option<String>,
}

impl Default for ConditionOptions {
    fn default() -> Self {
        Self {
            code: None,
            clinical_status: "active".to_owned(),
            verification_status: "confirmed".to_owned(),
            onset_datetime: "2022-01-05T10:00:00.000Z".to_owned(),
            abatement_datetime: None,
        }
    }
}

fn default_condition_code() -> Coding {
    Coding::new(
        code_systems::SNOMED,
        "44054006",
        "Diabetes mellitus type 2 (disorder)",
    )
}

fn condition_body(
    builder: &BundleBuilder,
    condition_id: &ResourceId,
    encounter_id: &ResourceId,
    profile: Profile,
    category: Value,
    note: &str,
    options: &ConditionOptions,
) -> Value {
    let code = options.code.clone().unwrap_or_else(default_condition_code);
    json!({
        "resourceType": "Condition",
        "id": condition_id.as_str(),
        "meta": { "profile": [profile.url()] },
        "clinicalStatus": {
            "coding": [{
                "system": code_systems::CONDITION_CLINICAL_STATUS,
                "code": options.clinical_status
            }]
        },
        "verificationStatus": {
            "coding": [{
                "system": code_systems::CONDITION_VERIFICATION_STATUS,
                "code": options.verification_status
            }]
        },
        "category": [category],
        "severity": {
            "coding": [{
                "system": code_systems::SNOMED,
                "code": "24484000",
                "display": "Severe"
            }]
        },
        "code": code.concept(),
        "bodySite": [
            {
                "coding": [{
                    "system": code_systems::SNOMED,
                    "code": "38266002",
                    "display": "Entire body as a whole"
                }]
            }
        ],
        "subject": { "reference": format!("Patient/{}", builder.patient_id()) },
        "encounter": { "reference": format!("Encounter/{encounter_id}") },
        "onsetDateTime": options.onset_datetime,
        "stage": [
            {
                "summary": {
                    "coding": [{
                        "system": code_systems::SNOMED,
                        "code": "786005",
                        "display": "Clinical stage I"
                    }]
                }
            }
        ],
        "evidence": [
            {
                "code": [
                    {
                        "coding": [{
                            "system": code_systems::SNOMED,
                            "code": "169876006",
                            "display": "Blood test evidence"
                        }]
                    }
                ]
            }
        ],
        "note": [{ "text": note }]
    })
}

impl BundleBuilder {
    /// Add a problem-list Condition scoped to `encounter_id`. Returns the
    /// condition id.
    pub fn add_condition(
        &mut self,
        encounter_id: &ResourceId,
        options: ConditionOptions,
    ) -> ResourceId {
        let condition_id = ResourceId::generate();
        let condition = condition_body(
            self,
            &condition_id,
            encounter_id,
            Profile::ConditionProblemsHealthConcerns,
            json!({
                "coding": [{
                    "system": code_systems::CONDITION_CATEGORY,
                    "code": "problem-list-item",
                    "display": "Problem List Item"
                }]
            }),
            "Patient condition documented during encounter",
            &options,
        );
        self.commit(ResourceSet::new(condition))
    }

    /// Add an encounter-diagnosis Condition. An abatement timestamp is
    /// emitted only when supplied. Returns the condition id.
    pub fn add_condition_encounter_diagnosis(
        &mut self,
        encounter_id: &ResourceId,
        options: ConditionOptions,
    ) -> ResourceId {
        let condition_id = ResourceId::generate();
        let mut condition = condition_body(
            self,
            &condition_id,
            encounter_id,
            Profile::ConditionEncounterDiagnosis,
            json!({
                "coding": [{
                    "system": code_systems::CONDITION_CATEGORY,
                    "code": "encounter-diagnosis",
                    "display": "Encounter Diagnosis"
                }]
            }),
            "Encounter diagnosis documented during admission",
            &options,
        );
        if let Some(abatement) = &options.abatement_datetime {
            insert_field(&mut condition, "abatementDateTime", json!(abatement));
        }
        self.commit(ResourceSet::new(condition))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn problem_list_condition_defaults() {
        let mut builder = BundleBuilder::new("Cond");
        let encounter_id = ResourceId::new("enc-1");
        let id = builder.add_condition(&encounter_id, ConditionOptions::default());
        let condition = &builder.bundle().entry[0].resource;
        assert_eq!(condition["id"], id.as_str());
        assert_eq!(
            condition["meta"]["profile"][0],
            Profile::ConditionProblemsHealthConcerns.url()
        );
        assert_eq!(condition["category"][0]["coding"][0]["code"], "problem-list-item");
        assert_eq!(condition["code"]["coding"][0]["code"], "44054006");
        assert_eq!(condition["encounter"]["reference"], "Encounter/enc-1");
        assert_eq!(condition["onsetDateTime"], "2022-01-05T10:00:00.000Z");
        assert!(condition.get("abatementDateTime").is_none());
    }

    #[test]
    fn encounter_diagnosis_variant_swaps_profile_and_category() {
        let mut builder = BundleBuilder::new("CondDx");
        let encounter_id = ResourceId::new("enc-1");
        builder.add_condition_encounter_diagnosis(
            &encounter_id,
            ConditionOptions {
                abatement_datetime: Some("2022-01-09T10:00:00.000Z".to_owned()),
                ..ConditionOptions::default()
            },
        );
        let condition = &builder.bundle().entry[0].resource;
        assert_eq!(
            condition["meta"]["profile"][0],
            Profile::ConditionEncounterDiagnosis.url()
        );
        assert_eq!(
            condition["category"][0]["coding"][0]["code"],
            "encounter-diagnosis"
        );
        assert_eq!(condition["abatementDateTime"], "2022-01-09T10:00:00.000Z");
    }
}
