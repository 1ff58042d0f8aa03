//! Patient factory operations.
//!
//! All three variants anchor the graph on the builder's configured patient
//! id and synthesize the shared general-practitioner Practitioner
//! (`gp-001`) the Patient references. They differ only in the extension
//! block: standard OMB race/ethnicity, detailed ethnicity, or an added
//! administrative-sex code.

use serde_json::{json, Value};
use terminology::{code_systems, extensions, Profile};

use crate::builder::{ResourceSet, MADIE_BASE_URL};
use crate::support::{insert_field, practitioner};
use crate::{BundleBuilder, ResourceId};

/// Parameters for the Patient operations. Every field has a default that
/// yields a structurally complete, profile-conformant resource.
#[derive(Clone, Debug)]
pub struct PatientOptions {
    /// Defaults to the builder's test-case name.
    pub given_name: Option<String>,
    pub family_name: Option<String>,
    pub gender: String,
    pub birth_date: String,
    pub race_code: String,
    pub race_display: String,
    pub ethnicity_code: String,
    pub ethnicity_display: String,
    /// Only emitted when the patient is actually deceased.
    pub deceased_datetime: Option<String>,
}

impl Default for PatientOptions {
    fn default() -> Self {
        Self {
            given_name: None,
            family_name: None,
            gender: "male".to_owned(),
            birth_date: "1980-01-01".to_owned(),
            race_code: "2028-9".to_owned(),
            race_display: "Asian".to_owned(),
            ethnicity_code: "2186-5".to_owned(),
            ethnicity_display: "Not Hispanic or Latino".to_owned(),
            deceased_datetime: None,
        }
    }
}

/// Id of the general practitioner synthesized alongside every Patient.
const GP_ID: &str = "gp-001";

fn race_extension(code: &str, display: &str) -> Value {
    json!({
        "url": extensions::US_CORE_RACE,
        "extension": [
            {
                "url": "ombCategory",
                "valueCoding": {
                    "system": code_systems::RACE_ETHNICITY,
                    "code": code,
                    "display": display,
                    "userSelected": true
                }
            },
            { "url": "text", "valueString": display }
        ]
    })
}

fn ethnicity_extension(code: &str, display: &str) -> Value {
    json!({
        "url": extensions::US_CORE_ETHNICITY,
        "extension": [
            {
                "url": "ombCategory",
                "valueCoding": {
                    "system": code_systems::RACE_ETHNICITY,
                    "code": code,
                    "display": display,
                    "userSelected": true
                }
            },
            { "url": "text", "valueString": display }
        ]
    })
}

impl BundleBuilder {
    /// Add the anchoring Patient with US Core race/ethnicity extensions
    /// and a full demographic complement. Returns the patient id.
    pub fn add_patient(&mut self, options: PatientOptions) -> ResourceId {
        let given = options
            .given_name
            .unwrap_or_else(|| self.test_case_name().to_owned());
        let family = options
            .family_name
            .unwrap_or_else(|| "TestPatient".to_owned());

        let mut patient = self.patient_core(
            &given,
            &family,
            &options.gender,
            &options.birth_date,
            vec![
                race_extension(&options.race_code, &options.race_display),
                ethnicity_extension(&options.ethnicity_code, &options.ethnicity_display),
            ],
        );

        insert_field(&mut patient, "multipleBirthInteger", json!(2));
        insert_field(
            &mut patient,
            "contact",
            json!([
                {
                    "relationship": [{
                        "coding": [{
                            "system": code_systems::CONTACT_RELATIONSHIP,
                            "code": "N",
                            "display": "Next-of-Kin"
                        }]
                    }],
                    "name": { "family": "Contact", "given": ["Emergency"] },
                    "telecom": [{ "system": "phone", "value": "555-987-6543", "use": "home" }]
                }
            ]),
        );
        insert_field(
            &mut patient,
            "photo",
            json!([
                {
                    "contentType": "image/png",
                    "data": "iVBORw0KGgoAAAANSUhEUgAAAAEAAAABCAYAAAAfFcSJAAAADUlEQVR42mNk+M9QDwADhgGAWjR9awAAAABJRU5ErkJggg=="
                }
            ]),
        );
        insert_field(
            &mut patient,
            "managingOrganization",
            json!({ "reference": "Organization/managing-org-001" }),
        );
        insert_field(
            &mut patient,
            "link",
            json!([
                { "other": { "reference": "Patient/related-patient-001" }, "type": "seealso" }
            ]),
        );
        if let Some(deceased) = options.deceased_datetime {
            insert_field(&mut patient, "deceasedDateTime", json!(deceased));
        }

        self.commit(ResourceSet::with_auxiliaries(
            patient,
            vec![practitioner(&ResourceId::new(GP_ID), "GeneralPractitioner", "Dr")],
        ))
    }

    /// Patient variant carrying a detailed (non-OMB) ethnicity coding in
    /// addition to the OMB category.
    pub fn add_patient_with_detailed_ethnicity(&mut self, options: PatientOptions) -> ResourceId {
        let given = options
            .given_name
            .unwrap_or_else(|| self.test_case_name().to_owned());
        let family = options
            .family_name
            .unwrap_or_else(|| "TestPatient".to_owned());

        let ethnicity = json!({
            "url": extensions::US_CORE_ETHNICITY,
            "extension": [
                {
                    "url": "ombCategory",
                    "valueCoding": {
                        "system": code_systems::RACE_ETHNICITY,
                        "code": "2135-2",
                        "display": "Hispanic or Latino",
                        "userSelected": true
                    }
                },
                {
                    "url": "detailed",
                    "valueCoding": {
                        "system": code_systems::RACE_ETHNICITY,
                        "code": "2148-5",
                        "display": "Mexican",
                        "userSelected": true
                    }
                },
                { "url": "text", "valueString": "Hispanic or Latino - Mexican" }
            ]
        });

        let patient = self.patient_core(
            &given,
            &family,
            &options.gender,
            &options.birth_date,
            vec![race_extension("2028-9", "Asian"), ethnicity],
        );

        self.commit(ResourceSet::with_auxiliaries(
            patient,
            vec![practitioner(&ResourceId::new(GP_ID), "GeneralPractitioner", "Dr")],
        ))
    }

    /// Patient variant carrying the US Core administrative-sex extension.
    /// The sex code is derived from the gender parameter (male stays male,
    /// anything else maps to female).
    pub fn add_patient_with_sex(&mut self, options: PatientOptions) -> ResourceId {
        let given = options
            .given_name
            .unwrap_or_else(|| self.test_case_name().to_owned());
        let family = options
            .family_name
            .unwrap_or_else(|| "TestPatient".to_owned());

        let sex_code = if options.gender == "male" { "male" } else { "female" };

        let patient = self.patient_core(
            &given,
            &family,
            &options.gender,
            &options.birth_date,
            vec![
                race_extension("2028-9", "Asian"),
                ethnicity_extension("2186-5", "Not Hispanic or Latino"),
                json!({ "url": extensions::US_CORE_SEX, "valueCode": sex_code }),
            ],
        );

        self.commit(ResourceSet::with_auxiliaries(
            patient,
            vec![practitioner(&ResourceId::new(GP_ID), "GeneralPractitioner", "Dr")],
        ))
    }

    /// The demographic body shared by all Patient variants.
    fn patient_core(
        &self,
        given: &str,
        family: &str,
        gender: &str,
        birth_date: &str,
        extension: Vec<Value>,
    ) -> Value {
        let patient_id = self.patient_id();
        json!({
            "resourceType": "Patient",
            "id": patient_id.as_str(),
            "meta": { "profile": [Profile::Patient.url()] },
            "extension": extension,
            "identifier": [
                {
                    "type": {
                        "coding": [{ "system": code_systems::IDENTIFIER_TYPE, "code": "MR" }]
                    },
                    "system": format!("{MADIE_BASE_URL}/"),
                    "value": patient_id.as_str()
                }
            ],
            "active": true,
            "name": [{ "use": "official", "family": family, "given": [given] }],
            "telecom": [
                { "system": "phone", "value": "555-123-4567", "use": "home" },
                { "system": "email", "value": "patient@example.com", "use": "home" }
            ],
            "gender": gender,
            "birthDate": birth_date,
            "address": [
                {
                    "use": "home",
                    "type": "physical",
                    "line": ["123 Main Street"],
                    "city": "Boston",
                    "state": "MA",
                    "postalCode": "02101",
                    "country": "USA"
                }
            ],
            "maritalStatus": {
                "coding": [{
                    "system": code_systems::MARITAL_STATUS,
                    "code": "M",
                    "display": "Married"
                }]
            },
            "communication": [
                {
                    "language": {
                        "coding": [{
                            "system": code_systems::LANGUAGE,
                            "code": "en",
                            "display": "English"
                        }]
                    },
                    "preferred": true
                }
            ],
            "generalPractitioner": [{ "reference": format!("Practitioner/{GP_ID}") }]
        })
    }
}
