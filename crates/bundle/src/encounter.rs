//! Encounter factory operations.

use serde_json::{json, Value};
use terminology::{code_systems, concept_from, Coding, Profile};

use crate::builder::{Period, ResourceSet, MADIE_BASE_URL};
use crate::{BundleBuilder, ResourceId};

/// Physical type of an encounter location (for example room, bed, ward).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PhysicalType {
    pub code: String,
    pub display: String,
}

/// One entry of an encounter's location list.
#[derive(Clone, Debug)]
pub struct EncounterLocation {
    pub location_id: ResourceId,
    pub display: Option<String>,
    pub period: Option<Period>,
    pub physical_type: Option<PhysicalType>,
    /// Defaults to "active".
    pub status: Option<String>,
}

impl EncounterLocation {
    pub fn new(location_id: ResourceId) -> Self {
        Self {
            location_id,
            display: None,
            period: None,
            physical_type: None,
            status: None,
        }
    }
}

/// Parameters for [`BundleBuilder::add_encounter`].
#[derive(Clone, Debug)]
pub struct EncounterOptions {
    pub status: String,
    pub class_code: String,
    /// Looked up from the class-code display map when absent.
    pub class_display: Option<String>,
    pub type_coding: Option<Vec<Coding>>,
    /// Simple single-location reference.
    pub location_id: Option<ResourceId>,
    /// Multi-location list with per-location periods; wins over
    /// `location_id` when present.
    pub locations: Option<Vec<EncounterLocation>>,
    /// Full discharge-disposition CodeableConcept, passed through verbatim.
    pub discharge_disposition: Option<Value>,
}

impl Default for EncounterOptions {
    fn default() -> Self {
        Self {
            status: "finished".to_owned(),
            class_code: "AMB".to_owned(),
            class_display: None,
            type_coding: None,
            location_id: None,
            locations: None,
            discharge_disposition: None,
        }
    }
}

/// Parameters for [`BundleBuilder::add_encounter_with_cc`].
#[derive(Clone, Debug)]
pub struct EncounterWithCcOptions {
    pub status: String,
    pub class_code: String,
    pub class_display: Option<String>,
    pub type_coding: Option<Vec<Coding>>,
    pub location_id: Option<ResourceId>,
}

impl Default for EncounterWithCcOptions {
    fn default() -> Self {
        Self {
            status: "finished".to_owned(),
            class_code: "IMP".to_owned(),
            class_display: None,
            type_coding: None,
            location_id: None,
        }
    }
}

/// Display text for an encounter class code. Unknown codes fall back to
/// the ambulatory display.
fn class_display(code: &str) -> &'static str {
    match code {
        "IMP" => "inpatient encounter",
        "ACUTE" => "inpatient acute",
        "NONAC" => "inpatient non-acute",
        "SS" => "short stay",
        "EMER" => "emergency",
        "OBSENC" => "observation encounter",
        _ => "ambulatory",
    }
}

/// Build the Encounter.location array. A `locations` list wins; otherwise
/// a single location entry is built from `location_id` (or a synthetic
/// default reference derived from the encounter id).
fn encounter_locations(
    location_id: Option<&ResourceId>,
    locations: Option<&[EncounterLocation]>,
    encounter_id: &ResourceId,
    default_start: &str,
    default_end: &str,
) -> Value {
    if let Some(locations) = locations {
        let built: Vec<Value> = locations
            .iter()
            .map(|loc| {
                let mut entry = json!({
                    "location": { "reference": format!("Location/{}", loc.location_id) },
                    "status": loc.status.as_deref().unwrap_or("active")
                });
                if let Some(display) = &loc.display {
                    entry["location"]["display"] = json!(display);
                }
                if let Some(period) = &loc.period {
                    entry["period"] = json!(period);
                }
                if let Some(physical) = &loc.physical_type {
                    entry["physicalType"] = json!({
                        "coding": [{
                            "system": code_systems::LOCATION_PHYSICAL_TYPE,
                            "code": physical.code,
                            "display": physical.display
                        }],
                        "text": physical.display
                    });
                }
                entry
            })
            .collect();
        return Value::Array(built);
    }

    let reference = match location_id {
        Some(id) => format!("Location/{id}"),
        None => format!("Location/default-loc-{}", encounter_id.short()),
    };
    json!([
        {
            "location": { "reference": reference },
            "status": "active",
            "physicalType": {
                "coding": [{
                    "system": code_systems::LOCATION_PHYSICAL_TYPE,
                    "code": "ro",
                    "display": "Room"
                }]
            },
            "period": { "start": default_start, "end": default_end }
        }
    ])
}

impl BundleBuilder {
    /// Add an Encounter spanning `start`..`end`. Returns the encounter id.
    pub fn add_encounter(
        &mut self,
        start: &str,
        end: &str,
        options: EncounterOptions,
    ) -> ResourceId {
        let encounter_id = ResourceId::generate();

        let type_coding = options.type_coding.unwrap_or_else(|| {
            vec![Coding::new(
                code_systems::SNOMED,
                "281036007",
                "Follow-up consultation (procedure)",
            )]
        });

        let display = options
            .class_display
            .unwrap_or_else(|| class_display(&options.class_code).to_owned());

        let discharge = options.discharge_disposition.unwrap_or_else(|| {
            json!({
                "coding": [{
                    "system": code_systems::DISCHARGE_DISPOSITION,
                    "code": "home",
                    "display": "Home"
                }]
            })
        });

        let location = encounter_locations(
            options.location_id.as_ref(),
            options.locations.as_deref(),
            &encounter_id,
            start,
            end,
        );

        let encounter = json!({
            "resourceType": "Encounter",
            "id": encounter_id.as_str(),
            "meta": { "profile": [Profile::Encounter.url()] },
            "identifier": [
                { "system": format!("{MADIE_BASE_URL}/encounter-id"), "value": encounter_id.as_str() }
            ],
            "status": options.status,
            "statusHistory": [
                { "status": "arrived", "period": { "start": start, "end": start } }
            ],
            "class": {
                "system": code_systems::ACT_CODE,
                "code": options.class_code,
                "display": display
            },
            "classHistory": [
                {
                    "class": {
                        "system": code_systems::ACT_CODE,
                        "code": options.class_code,
                        "display": display
                    },
                    "period": { "start": start, "end": end }
                }
            ],
            "type": [concept_from(&type_coding)],
            "serviceType": {
                "coding": [{
                    "system": code_systems::SNOMED,
                    "code": "394802001",
                    "display": "General medicine"
                }]
            },
            "priority": {
                "coding": [{
                    "system": code_systems::ACT_PRIORITY,
                    "code": "R",
                    "display": "routine"
                }]
            },
            "subject": { "reference": format!("Patient/{}", self.patient_id()) },
            "period": { "start": start, "end": end },
            "length": {
                "value": 5,
                "unit": "days",
                "system": code_systems::UCUM,
                "code": "d"
            },
            "reasonCode": [
                {
                    "coding": [{
                        "system": code_systems::SNOMED,
                        "code": "44054006",
                        "display": "Diabetes mellitus type 2"
                    }]
                }
            ],
            "reasonReference": [{ "reference": format!("Condition/cond-{}", encounter_id.short()) }],
            "diagnosis": [
                {
                    "condition": { "reference": format!("Condition/diag-{}", encounter_id.short()) },
                    "use": {
                        "coding": [{
                            "system": code_systems::DIAGNOSIS_ROLE,
                            "code": "AD",
                            "display": "Admission diagnosis"
                        }]
                    },
                    "rank": 1
                }
            ],
            "account": [{ "reference": format!("Account/acct-{}", encounter_id.short()) }],
            "hospitalization": { "dischargeDisposition": discharge },
            "partOf": { "reference": format!("Encounter/parent-{}", encounter_id.short()) },
            "location": location
        });

        self.commit(ResourceSet::new(encounter))
    }

    /// Add an Encounter whose diagnosis list carries a Chief Complaint
    /// Condition, synthesized alongside it. Returns the encounter id.
    pub fn add_encounter_with_cc(
        &mut self,
        start: &str,
        end: &str,
        options: EncounterWithCcOptions,
    ) -> ResourceId {
        let encounter_id = ResourceId::generate();
        let condition_id = ResourceId::generate();

        let type_coding = options.type_coding.unwrap_or_else(|| {
            vec![Coding::new(
                code_systems::SNOMED,
                "32485007",
                "Hospital admission (procedure)",
            )]
        });

        let display = options
            .class_display
            .unwrap_or_else(|| class_display(&options.class_code).to_owned());

        let condition = json!({
            "resourceType": "Condition",
            "id": condition_id.as_str(),
            "meta": { "profile": [Profile::ConditionProblemsHealthConcerns.url()] },
            "clinicalStatus": {
                "coding": [{
                    "system": code_systems::CONDITION_CLINICAL_STATUS,
                    "code": "active"
                }]
            },
            "verificationStatus": {
                "coding": [{
                    "system": code_systems::CONDITION_VERIFICATION_STATUS,
                    "code": "confirmed"
                }]
            },
            "category": [
                {
                    "coding": [{
                        "system": code_systems::CONDITION_CATEGORY,
                        "code": "encounter-diagnosis",
                        "display": "Encounter Diagnosis"
                    }]
                },
                {
                    "coding": [{
                        "system": code_systems::US_CORE_CONDITION_CATEGORY,
                        "code": "health-concern",
                        "display": "Health Concern"
                    }]
                }
            ],
            "code": {
                "coding": [{
                    "system": code_systems::SNOMED,
                    "code": "44054006",
                    "display": "Diabetes mellitus type 2"
                }]
            },
            "subject": { "reference": format!("Patient/{}", self.patient_id()) },
            "onsetDateTime": start
        });

        let mut encounter = json!({
            "resourceType": "Encounter",
            "id": encounter_id.as_str(),
            "meta": { "profile": [Profile::Encounter.url()] },
            "identifier": [
                { "system": format!("{MADIE_BASE_URL}/encounter-id"), "value": encounter_id.as_str() }
            ],
            "status": options.status,
            "statusHistory": [
                { "status": "arrived", "period": { "start": start, "end": start } }
            ],
            "class": {
                "system": code_systems::ACT_CODE,
                "code": options.class_code,
                "display": display
            },
            "classHistory": [
                {
                    "class": {
                        "system": code_systems::ACT_CODE,
                        "code": options.class_code,
                        "display": display
                    },
                    "period": { "start": start, "end": end }
                }
            ],
            "type": [concept_from(&type_coding)],
            "serviceType": {
                "coding": [{
                    "system": code_systems::SNOMED,
                    "code": "394802001",
                    "display": "General medicine"
                }]
            },
            "priority": {
                "coding": [{
                    "system": code_systems::ACT_PRIORITY,
                    "code": "R",
                    "display": "routine"
                }]
            },
            "subject": { "reference": format!("Patient/{}", self.patient_id()) },
            "period": { "start": start, "end": end },
            "length": {
                "value": 5,
                "unit": "days",
                "system": code_systems::UCUM,
                "code": "d"
            },
            "reasonCode": [
                {
                    "coding": [{
                        "system": code_systems::SNOMED,
                        "code": "44054006",
                        "display": "Diabetes mellitus type 2"
                    }]
                }
            ],
            "diagnosis": [
                {
                    "condition": { "reference": format!("Condition/{condition_id}") },
                    "use": {
                        "coding": [{
                            "system": code_systems::DIAGNOSIS_ROLE,
                            "code": "CC",
                            "display": "Chief Complaint"
                        }]
                    },
                    "rank": 1
                }
            ],
            "hospitalization": {
                "dischargeDisposition": {
                    "coding": [{
                        "system": code_systems::DISCHARGE_DISPOSITION,
                        "code": "home",
                        "display": "Home"
                    }]
                }
            }
        });

        if let Some(location_id) = &options.location_id {
            encounter["location"] = json!([
                {
                    "location": { "reference": format!("Location/{location_id}") },
                    "status": "active",
                    "physicalType": {
                        "coding": [{
                            "system": code_systems::LOCATION_PHYSICAL_TYPE,
                            "code": "ro",
                            "display": "Room"
                        }]
                    },
                    "period": { "start": start, "end": end }
                }
            ]);
        }

        self.commit(ResourceSet::with_auxiliaries(encounter, vec![condition]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const START: &str = "2022-01-05T08:00:00.000Z";
    const END: &str = "2022-01-10T12:00:00.000Z";

    #[test]
    fn default_class_is_ambulatory() {
        let mut builder = BundleBuilder::new("EncDefaults");
        let id = builder.add_encounter(START, END, EncounterOptions::default());
        let encounter = &builder.bundle().entry[0].resource;
        assert_eq!(encounter["id"], id.as_str());
        assert_eq!(encounter["class"]["code"], "AMB");
        assert_eq!(encounter["class"]["display"], "ambulatory");
        assert_eq!(encounter["period"]["start"], START);
        assert_eq!(encounter["period"]["end"], END);
    }

    #[test]
    fn class_display_map_covers_inpatient_codes() {
        for (code, display) in [
            ("IMP", "inpatient encounter"),
            ("ACUTE", "inpatient acute"),
            ("NONAC", "inpatient non-acute"),
            ("SS", "short stay"),
            ("EMER", "emergency"),
            ("OBSENC", "observation encounter"),
            ("XXX", "ambulatory"),
        ] {
            assert_eq!(class_display(code), display, "{code}");
        }
    }

    #[test]
    fn subject_references_builder_patient() {
        let mut builder = BundleBuilder::with_patient_id("Enc", ResourceId::new("pat-9"));
        builder.add_encounter(START, END, EncounterOptions::default());
        let encounter = &builder.bundle().entry[0].resource;
        assert_eq!(encounter["subject"]["reference"], "Patient/pat-9");
    }

    #[test]
    fn multi_location_list_wins_over_single_location() {
        let mut builder = BundleBuilder::new("EncLoc");
        builder.add_encounter(
            START,
            END,
            EncounterOptions {
                location_id: Some(ResourceId::new("ignored")),
                locations: Some(vec![
                    EncounterLocation {
                        location_id: ResourceId::new("icu-1"),
                        display: Some("Trauma ICU".to_owned()),
                        period: Some(Period::new(START, END)),
                        physical_type: Some(PhysicalType {
                            code: "wa".to_owned(),
                            display: "Ward".to_owned(),
                        }),
                        status: None,
                    },
                    EncounterLocation::new(ResourceId::new("ward-2")),
                ]),
                ..EncounterOptions::default()
            },
        );
        let location = &builder.bundle().entry[0].resource["location"];
        let list = location.as_array().expect("location array");
        assert_eq!(list.len(), 2);
        assert_eq!(list[0]["location"]["reference"], "Location/icu-1");
        assert_eq!(list[0]["location"]["display"], "Trauma ICU");
        assert_eq!(list[0]["physicalType"]["coding"][0]["code"], "wa");
        assert_eq!(list[1]["location"]["reference"], "Location/ward-2");
        assert_eq!(list[1]["status"], "active");
        assert!(list[1].get("period").is_none());
    }

    #[test]
    fn single_location_defaults_to_room_physical_type() {
        let mut builder = BundleBuilder::new("EncRoom");
        builder.add_encounter(
            START,
            END,
            EncounterOptions {
                location_id: Some(ResourceId::new("loc-5")),
                ..EncounterOptions::default()
            },
        );
        let location = &builder.bundle().entry[0].resource["location"][0];
        assert_eq!(location["location"]["reference"], "Location/loc-5");
        assert_eq!(location["physicalType"]["coding"][0]["code"], "ro");
        assert_eq!(location["period"]["start"], START);
    }

    #[test]
    fn chief_complaint_variant_synthesizes_condition_first() {
        let mut builder = BundleBuilder::new("EncCc");
        let encounter_id =
            builder.add_encounter_with_cc(START, END, EncounterWithCcOptions::default());
        assert_eq!(builder.len(), 2);

        let condition = &builder.bundle().entry[0].resource;
        assert_eq!(condition["resourceType"], "Condition");
        let encounter = &builder.bundle().entry[1].resource;
        assert_eq!(encounter["id"], encounter_id.as_str());
        assert_eq!(encounter["class"]["code"], "IMP");
        assert_eq!(
            encounter["diagnosis"][0]["condition"]["reference"],
            format!("Condition/{}", condition["id"].as_str().expect("id"))
        );
        assert_eq!(encounter["diagnosis"][0]["use"]["coding"][0]["code"], "CC");
    }
}
