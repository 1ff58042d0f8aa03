//! Observation factory operations.
//!
//! The attached profile follows the category: "laboratory" maps to the lab
//! profile, "vital-signs" to the clinical-result profile, anything else to
//! the simple-observation profile. The negation shape (dataAbsentReason,
//! no value) is a separate operation, not a flag.

use serde_json::{json, Value};
use terminology::{code_systems, extensions, Coding, Profile};

use crate::builder::ResourceSet;
use crate::support::{blood_specimen, insert_field, patient_device, practitioner};
use crate::{BundleBuilder, ResourceId};

const DEFAULT_EFFECTIVE: &str = "2022-01-06T10:00:00.000Z";

/// Parameters for [`BundleBuilder::add_observation`] and
/// [`BundleBuilder::add_observation_full`].
#[derive(Clone, Debug)]
pub struct ObservationOptions {
    pub category: String,
    pub code: Option<Coding>,
    pub value: f64,
    pub unit: String,
    pub effective_datetime: Option<String>,
}

impl Default for ObservationOptions {
    fn default() -> Self {
        Self {
            category: "laboratory".to_owned(),
            code: None,
            value: 100.0,
            unit: "mg/dL".to_owned(),
            effective_datetime: None,
        }
    }
}

/// Parameters for [`BundleBuilder::add_observation_data_absent`].
#[derive(Clone, Debug)]
pub struct ObservationDataAbsentOptions {
    pub category: String,
    pub code: Option<Coding>,
    pub effective_datetime: Option<String>,
}

impl Default for ObservationDataAbsentOptions {
    fn default() -> Self {
        Self {
            category: "laboratory".to_owned(),
            code: None,
            effective_datetime: None,
        }
    }
}

/// Parameters for [`BundleBuilder::add_simple_observation`].
///
/// The value channels are mutually exclusive and chosen in priority order:
/// `data_absent_reason`, then numeric `value`, then `value_string`, then
/// `value_concept`; with none supplied a category-appropriate default is
/// emitted. `effective_period_start` switches the resource from
/// `effectiveDateTime` to `effectivePeriod`.
#[derive(Clone, Debug)]
pub struct SimpleObservationOptions {
    pub category: String,
    pub code: Option<Coding>,
    pub value: Option<f64>,
    pub value_string: Option<String>,
    pub value_concept: Option<Coding>,
    pub unit: Option<String>,
    pub effective_datetime: Option<String>,
    pub effective_period_start: Option<String>,
    pub effective_period_end: Option<String>,
    pub data_absent_reason: Option<String>,
    pub include_specimen: bool,
}

impl Default for SimpleObservationOptions {
    fn default() -> Self {
        Self {
            category: "social-history".to_owned(),
            code: None,
            value: None,
            value_string: None,
            value_concept: None,
            unit: None,
            effective_datetime: None,
            effective_period_start: None,
            effective_period_end: None,
            data_absent_reason: None,
            include_specimen: true,
        }
    }
}

/// Profile variant for an observation category.
fn observation_profile(category: &str) -> Profile {
    match category {
        "laboratory" => Profile::ObservationLab,
        "vital-signs" => Profile::ObservationClinicalResult,
        _ => Profile::SimpleObservation,
    }
}

/// Default code: glucose for laboratory observations, heart rate otherwise.
fn default_observation_code(category: &str) -> Coding {
    if category == "laboratory" {
        Coding::new(
            code_systems::LOINC,
            "2339-0",
            "Glucose [Mass/volume] in Blood",
        )
    } else {
        Coding::new(code_systems::LOINC, "8867-4", "Heart rate")
    }
}

/// "social-history" -> "Social History", matching the display convention of
/// the category code system.
fn category_display(category: &str) -> String {
    category
        .split('-')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn category_concept(category: &str) -> Value {
    json!({
        "coding": [{
            "system": code_systems::OBSERVATION_CATEGORY,
            "code": category,
            "display": category_display(category)
        }]
    })
}

impl BundleBuilder {
    /// Add a quantitative Observation plus its blood Specimen. Returns the
    /// observation id.
    pub fn add_observation(
        &mut self,
        encounter_id: &ResourceId,
        options: ObservationOptions,
    ) -> ResourceId {
        let observation_id = ResourceId::generate();
        let specimen_id = ResourceId::generate();

        let code = options
            .code
            .unwrap_or_else(|| default_observation_code(&options.category));
        let effective = options
            .effective_datetime
            .unwrap_or_else(|| DEFAULT_EFFECTIVE.to_owned());
        let profile = observation_profile(&options.category);

        let specimen = blood_specimen(&specimen_id, self.patient_id(), &effective);

        let observation = json!({
            "resourceType": "Observation",
            "id": observation_id.as_str(),
            "meta": { "profile": [profile.url()] },
            "extension": [
                {
                    "url": extensions::OBSERVATION_BODY_POSITION,
                    "valueCodeableConcept": {
                        "coding": [{
                            "system": code_systems::SNOMED,
                            "code": "33586001",
                            "display": "Sitting position"
                        }]
                    }
                }
            ],
            "partOf": [{ "reference": format!("Procedure/proc-{}", observation_id.short()) }],
            "status": "final",
            "category": [category_concept(&options.category)],
            "code": code.concept(),
            "subject": { "reference": format!("Patient/{}", self.patient_id()) },
            "encounter": { "reference": format!("Encounter/{encounter_id}") },
            "effectiveDateTime": effective,
            "issued": effective,
            "valueQuantity": {
                "value": options.value,
                "unit": options.unit,
                "system": code_systems::UCUM,
                "code": options.unit
            },
            "interpretation": [
                {
                    "coding": [{
                        "system": code_systems::OBSERVATION_INTERPRETATION,
                        "code": "N",
                        "display": "Normal"
                    }]
                }
            ],
            "bodySite": {
                "coding": [{
                    "system": code_systems::SNOMED,
                    "code": "368209003",
                    "display": "Right upper arm structure"
                }]
            },
            "method": {
                "coding": [{
                    "system": code_systems::SNOMED,
                    "code": "129300006",
                    "display": "Measurement - action"
                }]
            },
            "specimen": { "reference": format!("Specimen/{specimen_id}") },
            "referenceRange": [
                {
                    "low": { "value": 70, "unit": options.unit, "system": code_systems::UCUM, "code": options.unit },
                    "high": { "value": 140, "unit": options.unit, "system": code_systems::UCUM, "code": options.unit },
                    "type": {
                        "coding": [{
                            "system": code_systems::REFERENCE_RANGE_MEANING,
                            "code": "normal",
                            "display": "Normal Range"
                        }]
                    }
                }
            ],
            "hasMember": [{ "reference": format!("Observation/member-{}", observation_id.short()) }],
            "derivedFrom": [{ "reference": format!("Observation/derived-{}", observation_id.short()) }],
            "component": [
                {
                    "code": {
                        "coding": [{
                            "system": code_systems::LOINC,
                            "code": "8480-6",
                            "display": "Systolic blood pressure"
                        }]
                    },
                    "valueQuantity": {
                        "value": 120,
                        "unit": "mmHg",
                        "system": code_systems::UCUM,
                        "code": "mm[Hg]"
                    }
                }
            ]
        });

        self.commit(ResourceSet::with_auxiliaries(observation, vec![specimen]))
    }

    /// Add an Observation whose result was not obtained: no value, a
    /// not-performed dataAbsentReason. Returns the observation id.
    pub fn add_observation_data_absent(
        &mut self,
        encounter_id: &ResourceId,
        options: ObservationDataAbsentOptions,
    ) -> ResourceId {
        let observation_id = ResourceId::generate();

        let code = options
            .code
            .unwrap_or_else(|| default_observation_code(&options.category));
        let effective = options
            .effective_datetime
            .unwrap_or_else(|| DEFAULT_EFFECTIVE.to_owned());
        let profile = observation_profile(&options.category);

        let observation = json!({
            "resourceType": "Observation",
            "id": observation_id.as_str(),
            "meta": { "profile": [profile.url()] },
            "status": "final",
            "category": [category_concept(&options.category)],
            "code": code.concept(),
            "subject": { "reference": format!("Patient/{}", self.patient_id()) },
            "encounter": { "reference": format!("Encounter/{encounter_id}") },
            "effectiveDateTime": effective,
            "dataAbsentReason": {
                "coding": [{
                    "system": code_systems::DATA_ABSENT_REASON,
                    "code": "not-performed",
                    "display": "Not Performed"
                }]
            }
        });

        self.commit(ResourceSet::new(observation))
    }

    /// Add a blood-pressure panel observation (US Core vital signs) with
    /// systolic and diastolic components. Returns the observation id.
    pub fn add_blood_pressure(
        &mut self,
        encounter_id: &ResourceId,
        systolic: f64,
        diastolic: f64,
        effective_datetime: &str,
    ) -> ResourceId {
        let observation_id = ResourceId::generate();

        let observation = json!({
            "resourceType": "Observation",
            "id": observation_id.as_str(),
            "meta": { "profile": [Profile::VitalSigns.url()] },
            "status": "final",
            "category": [
                {
                    "coding": [{
                        "system": code_systems::OBSERVATION_CATEGORY,
                        "code": "vital-signs",
                        "display": "Vital Signs"
                    }],
                    "text": "Vital Signs"
                }
            ],
            "code": {
                "coding": [{
                    "system": code_systems::LOINC,
                    "code": "85354-9",
                    "display": "Blood pressure panel with all children optional"
                }],
                "text": "Blood pressure systolic and diastolic"
            },
            "subject": { "reference": format!("Patient/{}", self.patient_id()) },
            "encounter": { "reference": format!("Encounter/{encounter_id}") },
            "effectiveDateTime": effective_datetime,
            "component": [
                {
                    "code": {
                        "coding": [{
                            "system": code_systems::LOINC,
                            "code": "8480-6",
                            "display": "Systolic blood pressure"
                        }],
                        "text": "Systolic blood pressure"
                    },
                    "valueQuantity": {
                        "value": systolic,
                        "unit": "mmHg",
                        "system": code_systems::UCUM,
                        "code": "mm[Hg]"
                    }
                },
                {
                    "code": {
                        "coding": [{
                            "system": code_systems::LOINC,
                            "code": "8462-4",
                            "display": "Diastolic blood pressure"
                        }],
                        "text": "Diastolic blood pressure"
                    },
                    "valueQuantity": {
                        "value": diastolic,
                        "unit": "mmHg",
                        "system": code_systems::UCUM,
                        "code": "mm[Hg]"
                    }
                }
            ]
        });

        self.commit(ResourceSet::new(observation))
    }

    /// Add a blood-culture observation with an organism result plus its
    /// Specimen. Returns `(observation_id, specimen_id)`.
    pub fn add_blood_culture(
        &mut self,
        encounter_id: &ResourceId,
        organism_code: &str,
        organism_display: &str,
        collected_datetime: &str,
        specimen_id: Option<ResourceId>,
    ) -> (ResourceId, ResourceId) {
        let observation_id = ResourceId::generate();
        let specimen_id = specimen_id.unwrap_or_else(ResourceId::generate);

        let specimen = blood_specimen(&specimen_id, self.patient_id(), collected_datetime);

        let observation = json!({
            "resourceType": "Observation",
            "id": observation_id.as_str(),
            "meta": { "profile": [Profile::ObservationLab.url()] },
            "status": "final",
            "category": [
                {
                    "coding": [{
                        "system": code_systems::OBSERVATION_CATEGORY,
                        "code": "laboratory",
                        "display": "Laboratory"
                    }]
                }
            ],
            "code": {
                "coding": [{
                    "system": code_systems::LOINC,
                    "code": "600-7",
                    "display": "Bacteria identified in Blood by Culture"
                }]
            },
            "subject": { "reference": format!("Patient/{}", self.patient_id()) },
            "encounter": { "reference": format!("Encounter/{encounter_id}") },
            "effectiveDateTime": collected_datetime,
            "issued": collected_datetime,
            "valueCodeableConcept": {
                "coding": [{
                    "system": code_systems::SNOMED,
                    "code": organism_code,
                    "display": organism_display
                }]
            },
            "specimen": { "reference": format!("Specimen/{specimen_id}") },
            "interpretation": [
                {
                    "coding": [{
                        "system": code_systems::OBSERVATION_INTERPRETATION,
                        "code": "POS",
                        "display": "Positive"
                    }]
                }
            ]
        });

        let id = self.commit(ResourceSet::with_auxiliaries(observation, vec![specimen]));
        (id, specimen_id)
    }

    /// Add a simple Observation for categories like social-history, survey,
    /// imaging or procedure. Returns the observation id.
    pub fn add_simple_observation(
        &mut self,
        encounter_id: &ResourceId,
        options: SimpleObservationOptions,
    ) -> ResourceId {
        let observation_id = ResourceId::generate();
        let specimen_id = ResourceId::generate();

        let code = options.code.clone().unwrap_or_else(|| match options.category.as_str() {
            "social-history" => {
                Coding::new(code_systems::LOINC, "72166-2", "Tobacco smoking status")
            }
            "survey" => Coding::new(
                code_systems::LOINC,
                "44249-1",
                "PHQ-9 quick depression assessment panel",
            ),
            "imaging" => Coding::new(code_systems::LOINC, "30746-2", "CT Chest"),
            "procedure" => Coding::new(code_systems::LOINC, "29463-7", "Body weight"),
            _ => Coding::new(code_systems::LOINC, "8302-2", "Body height"),
        });

        let effective_datetime =
            if options.effective_datetime.is_none() && options.effective_period_start.is_none() {
                Some(DEFAULT_EFFECTIVE.to_owned())
            } else {
                options.effective_datetime.clone()
            };
        let issued = effective_datetime
            .clone()
            .or_else(|| options.effective_period_start.clone());

        let display = match options.category.as_str() {
            "social-history" => "Social History".to_owned(),
            "survey" => "Survey".to_owned(),
            "imaging" => "Imaging".to_owned(),
            "procedure" => "Procedure".to_owned(),
            other => category_display(other),
        };

        let mut observation = json!({
            "resourceType": "Observation",
            "id": observation_id.as_str(),
            "meta": { "profile": [Profile::SimpleObservation.url()] },
            "extension": [
                {
                    "url": extensions::OBSERVATION_BODY_POSITION,
                    "valueCodeableConcept": {
                        "coding": [{
                            "system": code_systems::SNOMED,
                            "code": "33586001",
                            "display": "Sitting position"
                        }]
                    }
                }
            ],
            "partOf": [{ "reference": format!("Procedure/proc-{}", observation_id.short()) }],
            "status": "final",
            "category": [
                {
                    "coding": [{
                        "system": code_systems::OBSERVATION_CATEGORY,
                        "code": options.category,
                        "display": display
                    }]
                }
            ],
            "code": code.concept(),
            "subject": { "reference": format!("Patient/{}", self.patient_id()) },
            "encounter": { "reference": format!("Encounter/{encounter_id}") },
            "issued": issued,
            "interpretation": [
                {
                    "coding": [{
                        "system": code_systems::OBSERVATION_INTERPRETATION,
                        "code": "N",
                        "display": "Normal"
                    }]
                }
            ],
            "bodySite": {
                "coding": [{
                    "system": code_systems::SNOMED,
                    "code": "368209003",
                    "display": "Right upper arm structure"
                }]
            },
            "method": {
                "coding": [{
                    "system": code_systems::SNOMED,
                    "code": "129300006",
                    "display": "Measurement - action"
                }]
            },
            "referenceRange": [
                { "text": "Normal range" }
            ],
            "hasMember": [{ "reference": format!("Observation/member-{}", observation_id.short()) }],
            "derivedFrom": [{ "reference": format!("Observation/derived-{}", observation_id.short()) }],
            "component": [
                {
                    "code": {
                        "coding": [{
                            "system": code_systems::LOINC,
                            "code": "8480-6",
                            "display": "Systolic blood pressure"
                        }]
                    },
                    "valueQuantity": {
                        "value": 120,
                        "unit": "mmHg",
                        "system": code_systems::UCUM,
                        "code": "mm[Hg]"
                    }
                }
            ]
        });

        if options.include_specimen {
            insert_field(
                &mut observation,
                "specimen",
                json!({ "reference": format!("Specimen/{specimen_id}") }),
            );
        }

        // effective[x]: period wins when a period start is supplied.
        if let Some(period_start) = &options.effective_period_start {
            let mut period = json!({ "start": period_start });
            if let Some(period_end) = &options.effective_period_end {
                period["end"] = json!(period_end);
            }
            insert_field(&mut observation, "effectivePeriod", period);
        } else if let Some(effective) = &effective_datetime {
            insert_field(&mut observation, "effectiveDateTime", json!(effective));
        }

        // value[x] or dataAbsentReason, in priority order.
        if let Some(reason) = &options.data_absent_reason {
            insert_field(
                &mut observation,
                "dataAbsentReason",
                json!({
                    "coding": [{
                        "system": code_systems::DATA_ABSENT_REASON,
                        "code": reason,
                        "display": category_display(reason)
                    }]
                }),
            );
        } else if let Some(value) = options.value {
            let unit = options.unit.as_deref().unwrap_or("1");
            insert_field(
                &mut observation,
                "valueQuantity",
                json!({
                    "value": value,
                    "unit": unit,
                    "system": code_systems::UCUM,
                    "code": unit
                }),
            );
        } else if let Some(text) = &options.value_string {
            insert_field(&mut observation, "valueString", json!(text));
        } else if let Some(concept) = &options.value_concept {
            insert_field(
                &mut observation,
                "valueCodeableConcept",
                concept.concept(),
            );
        } else if options.category == "social-history" {
            insert_field(
                &mut observation,
                "valueCodeableConcept",
                json!({
                    "coding": [{
                        "system": code_systems::SNOMED,
                        "code": "8517006",
                        "display": "Ex-smoker"
                    }]
                }),
            );
        } else {
            insert_field(&mut observation, "valueString", json!("Test result"));
        }

        if options.include_specimen {
            let specimen = blood_specimen(
                &specimen_id,
                self.patient_id(),
                issued.as_deref().unwrap_or(DEFAULT_EFFECTIVE),
            );
            self.commit(ResourceSet::with_auxiliaries(observation, vec![specimen]))
        } else {
            self.commit(ResourceSet::new(observation))
        }
    }

    /// Add an Observation exercising the full optional surface: narrative
    /// text, basedOn ServiceRequest, performer Practitioner, measuring
    /// Device and Specimen are all synthesized. Returns the observation id.
    pub fn add_observation_full(
        &mut self,
        encounter_id: &ResourceId,
        options: ObservationOptions,
    ) -> ResourceId {
        let observation_id = ResourceId::generate();
        let specimen_id = ResourceId::generate();
        let device_id = ResourceId::generate();
        let performer_id = ResourceId::generate();
        let service_request_id = ResourceId::generate();

        let code = options.code.unwrap_or_else(|| {
            Coding::new(
                code_systems::LOINC,
                "2339-0",
                "Glucose [Mass/volume] in Blood",
            )
        });
        let effective = options
            .effective_datetime
            .unwrap_or_else(|| DEFAULT_EFFECTIVE.to_owned());
        let profile = if options.category == "laboratory" {
            Profile::ObservationLab
        } else {
            Profile::SimpleObservation
        };

        let specimen = blood_specimen(&specimen_id, self.patient_id(), &effective);
        let device = patient_device(
            &device_id,
            self.patient_id(),
            &Coding::new(code_systems::SNOMED, "706177008", "Glucometer"),
        );
        let performer = practitioner(&performer_id, "LabTech", "Sally");
        let service_request = json!({
            "resourceType": "ServiceRequest",
            "id": service_request_id.as_str(),
            "meta": { "profile": [Profile::ServiceRequest.url()] },
            "status": "completed",
            "intent": "order",
            "code": code.concept(),
            "subject": { "reference": format!("Patient/{}", self.patient_id()) },
            "encounter": { "reference": format!("Encounter/{encounter_id}") },
            "authoredOn": effective
        });

        let observation = json!({
            "resourceType": "Observation",
            "id": observation_id.as_str(),
            "meta": { "profile": [profile.url()] },
            "text": {
                "status": "generated",
                "div": "<div xmlns=\"http://www.w3.org/1999/xhtml\">Blood Glucose Test Result</div>"
            },
            "extension": [
                {
                    "url": extensions::OBSERVATION_BODY_POSITION,
                    "valueCodeableConcept": {
                        "coding": [{
                            "system": code_systems::SNOMED,
                            "code": "33586001",
                            "display": "Sitting position"
                        }]
                    }
                }
            ],
            "basedOn": [{ "reference": format!("ServiceRequest/{service_request_id}") }],
            "status": "final",
            "category": [category_concept(&options.category)],
            "code": code.concept(),
            "subject": { "reference": format!("Patient/{}", self.patient_id()) },
            "encounter": { "reference": format!("Encounter/{encounter_id}") },
            "effectiveDateTime": effective,
            "issued": effective,
            "performer": [{ "reference": format!("Practitioner/{performer_id}") }],
            "valueQuantity": {
                "value": options.value,
                "unit": options.unit,
                "system": code_systems::UCUM,
                "code": options.unit
            },
            "interpretation": [
                {
                    "coding": [{
                        "system": code_systems::OBSERVATION_INTERPRETATION,
                        "code": "N",
                        "display": "Normal"
                    }]
                }
            ],
            "note": [
                {
                    "authorString": "Lab Technician",
                    "time": effective,
                    "text": "Patient was fasting for 8 hours before test"
                }
            ],
            "bodySite": {
                "coding": [{
                    "system": code_systems::SNOMED,
                    "code": "368209003",
                    "display": "Right upper arm structure"
                }]
            },
            "method": {
                "coding": [{
                    "system": code_systems::SNOMED,
                    "code": "129300006",
                    "display": "Measurement - action"
                }]
            },
            "specimen": { "reference": format!("Specimen/{specimen_id}") },
            "device": { "reference": format!("Device/{device_id}") },
            "referenceRange": [
                {
                    "low": { "value": 70, "unit": options.unit, "system": code_systems::UCUM, "code": options.unit },
                    "high": { "value": 140, "unit": options.unit, "system": code_systems::UCUM, "code": options.unit },
                    "type": {
                        "coding": [{
                            "system": code_systems::REFERENCE_RANGE_MEANING,
                            "code": "normal",
                            "display": "Normal Range"
                        }]
                    }
                }
            ],
            "component": [
                {
                    "code": {
                        "coding": [{
                            "system": code_systems::LOINC,
                            "code": "8480-6",
                            "display": "Systolic blood pressure"
                        }]
                    },
                    "valueQuantity": {
                        "value": 120,
                        "unit": "mmHg",
                        "system": code_systems::UCUM,
                        "code": "mm[Hg]"
                    }
                }
            ]
        });

        self.commit(ResourceSet::with_auxiliaries(
            observation,
            vec![specimen, device, performer, service_request],
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encounter() -> ResourceId {
        ResourceId::new("enc-1")
    }

    #[test]
    fn category_selects_profile_deterministically() {
        for (category, profile) in [
            ("laboratory", Profile::ObservationLab),
            ("vital-signs", Profile::ObservationClinicalResult),
            ("social-history", Profile::SimpleObservation),
            ("imaging", Profile::SimpleObservation),
        ] {
            let mut builder = BundleBuilder::new("ObsProfile");
            builder.add_observation(
                &encounter(),
                ObservationOptions {
                    category: category.to_owned(),
                    ..ObservationOptions::default()
                },
            );
            let observation = &builder.bundle().entry[1].resource;
            let profiles = observation["meta"]["profile"].as_array().expect("profile");
            assert_eq!(profiles.len(), 1, "{category}");
            assert_eq!(profiles[0], profile.url(), "{category}");
        }
    }

    #[test]
    fn observation_appends_specimen_then_observation() {
        let mut builder = BundleBuilder::new("ObsOrder");
        let id = builder.add_observation(&encounter(), ObservationOptions::default());
        assert_eq!(builder.len(), 2);
        assert_eq!(builder.bundle().entry[0].resource["resourceType"], "Specimen");
        let observation = &builder.bundle().entry[1].resource;
        assert_eq!(observation["id"], id.as_str());
        assert_eq!(
            observation["specimen"]["reference"],
            format!(
                "Specimen/{}",
                builder.bundle().entry[0].resource["id"]
                    .as_str()
                    .expect("specimen id")
            )
        );
    }

    #[test]
    fn value_and_unit_pass_through_verbatim() {
        let mut builder = BundleBuilder::new("ObsValue");
        builder.add_observation(
            &encounter(),
            ObservationOptions {
                value: 63.5,
                unit: "mmol/L".to_owned(),
                ..ObservationOptions::default()
            },
        );
        let quantity = &builder.bundle().entry[1].resource["valueQuantity"];
        assert_eq!(quantity["value"], 63.5);
        assert_eq!(quantity["unit"], "mmol/L");
        assert_eq!(quantity["code"], "mmol/L");
    }

    #[test]
    fn data_absent_variant_has_reason_and_no_value() {
        let mut builder = BundleBuilder::new("ObsAbsent");
        builder.add_observation_data_absent(&encounter(), ObservationDataAbsentOptions::default());
        assert_eq!(builder.len(), 1);
        let observation = &builder.bundle().entry[0].resource;
        assert_eq!(
            observation["dataAbsentReason"]["coding"][0]["code"],
            "not-performed"
        );
        assert!(observation.get("valueQuantity").is_none());
    }

    #[test]
    fn blood_pressure_uses_panel_code_with_components() {
        let mut builder = BundleBuilder::new("Bp");
        builder.add_blood_pressure(&encounter(), 142.0, 91.0, "2022-01-06T10:00:00.000Z");
        let observation = &builder.bundle().entry[0].resource;
        assert_eq!(observation["meta"]["profile"][0], Profile::VitalSigns.url());
        assert_eq!(observation["code"]["coding"][0]["code"], "85354-9");
        assert_eq!(observation["component"][0]["valueQuantity"]["value"], 142.0);
        assert_eq!(observation["component"][1]["valueQuantity"]["value"], 91.0);
    }

    #[test]
    fn blood_culture_returns_both_ids() {
        let mut builder = BundleBuilder::new("Culture");
        let (observation_id, specimen_id) = builder.add_blood_culture(
            &encounter(),
            "3092008",
            "Staphylococcus aureus",
            "2022-01-06T10:00:00.000Z",
            None,
        );
        let specimen = &builder.bundle().entry[0].resource;
        assert_eq!(specimen["id"], specimen_id.as_str());
        let observation = &builder.bundle().entry[1].resource;
        assert_eq!(observation["id"], observation_id.as_str());
        assert_eq!(
            observation["valueCodeableConcept"]["coding"][0]["code"],
            "3092008"
        );
        assert_eq!(
            observation["specimen"]["reference"],
            format!("Specimen/{specimen_id}")
        );
    }

    #[test]
    fn simple_observation_defaults_to_ex_smoker_concept() {
        let mut builder = BundleBuilder::new("Simple");
        builder.add_simple_observation(&encounter(), SimpleObservationOptions::default());
        let observation = &builder.bundle().entry[1].resource;
        assert_eq!(
            observation["valueCodeableConcept"]["coding"][0]["code"],
            "8517006"
        );
        assert_eq!(observation["effectiveDateTime"], DEFAULT_EFFECTIVE);
        assert_eq!(observation["category"][0]["coding"][0]["display"], "Social History");
    }

    #[test]
    fn simple_observation_period_wins_over_datetime_default() {
        let mut builder = BundleBuilder::new("SimplePeriod");
        builder.add_simple_observation(
            &encounter(),
            SimpleObservationOptions {
                effective_period_start: Some("2022-01-05T00:00:00.000Z".to_owned()),
                effective_period_end: Some("2022-01-06T00:00:00.000Z".to_owned()),
                include_specimen: false,
                ..SimpleObservationOptions::default()
            },
        );
        assert_eq!(builder.len(), 1);
        let observation = &builder.bundle().entry[0].resource;
        assert!(observation.get("effectiveDateTime").is_none());
        assert_eq!(
            observation["effectivePeriod"]["start"],
            "2022-01-05T00:00:00.000Z"
        );
        assert_eq!(
            observation["effectivePeriod"]["end"],
            "2022-01-06T00:00:00.000Z"
        );
        assert!(observation.get("specimen").is_none());
    }

    #[test]
    fn simple_observation_data_absent_reason_beats_values() {
        let mut builder = BundleBuilder::new("SimpleAbsent");
        builder.add_simple_observation(
            &encounter(),
            SimpleObservationOptions {
                value: Some(5.0),
                data_absent_reason: Some("not-asked".to_owned()),
                ..SimpleObservationOptions::default()
            },
        );
        let observation = &builder.bundle().entry[1].resource;
        assert_eq!(
            observation["dataAbsentReason"]["coding"][0]["code"],
            "not-asked"
        );
        assert_eq!(
            observation["dataAbsentReason"]["coding"][0]["display"],
            "Not Asked"
        );
        assert!(observation.get("valueQuantity").is_none());
    }

    #[test]
    fn full_observation_synthesizes_four_auxiliaries() {
        let mut builder = BundleBuilder::new("Full");
        let id = builder.add_observation_full(&encounter(), ObservationOptions::default());
        assert_eq!(builder.len(), 5);
        let types: Vec<&str> = builder
            .bundle()
            .entry
            .iter()
            .map(|entry| entry.resource["resourceType"].as_str().unwrap_or_default())
            .collect();
        assert_eq!(
            types,
            ["Specimen", "Device", "Practitioner", "ServiceRequest", "Observation"]
        );
        let observation = &builder.bundle().entry[4].resource;
        assert_eq!(observation["id"], id.as_str());
        assert_eq!(
            observation["basedOn"][0]["reference"],
            format!(
                "ServiceRequest/{}",
                builder.bundle().entry[3].resource["id"]
                    .as_str()
                    .expect("sr id")
            )
        );
    }
}
