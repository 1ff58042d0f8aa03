//! Shared builders for auxiliary resources and small coded fragments.
//!
//! Several factory operations synthesize the same supporting cast: a
//! performing or requesting Practitioner, a blood Specimen, an infusion
//! device. They live here so every operation produces the identical shape.

use serde_json::{json, Value};
use terminology::{code_systems, Coding, Profile};

use crate::ResourceId;

/// A Practitioner with the fixed NPI identifier used across test cases.
pub(crate) fn practitioner(id: &ResourceId, family: &str, given: &str) -> Value {
    json!({
        "resourceType": "Practitioner",
        "id": id.as_str(),
        "meta": { "profile": [Profile::Practitioner.url()] },
        "identifier": [{ "system": code_systems::NPI, "value": "1234567893" }],
        "name": [{ "family": family, "given": [given] }]
    })
}

/// A blood Specimen collected at `collected`, owned by the patient.
pub(crate) fn blood_specimen(id: &ResourceId, patient_id: &ResourceId, collected: &str) -> Value {
    json!({
        "resourceType": "Specimen",
        "id": id.as_str(),
        "meta": { "profile": [Profile::Specimen.url()] },
        "type": {
            "coding": [{
                "system": code_systems::SNOMED,
                "code": "119297000",
                "display": "Blood specimen"
            }]
        },
        "subject": { "reference": format!("Patient/{patient_id}") },
        "receivedTime": collected,
        "collection": { "collectedDateTime": collected }
    })
}

/// A patient-scoped Device of the given type.
pub(crate) fn patient_device(id: &ResourceId, patient_id: &ResourceId, kind: &Coding) -> Value {
    json!({
        "resourceType": "Device",
        "id": id.as_str(),
        "meta": { "profile": [Profile::Device.url()] },
        "type": kind.concept(),
        "patient": { "reference": format!("Patient/{patient_id}") }
    })
}

/// The infusion pump device synthesized by medication administrations.
pub(crate) fn infusion_pump(id: &ResourceId, patient_id: &ResourceId) -> Value {
    patient_device(
        id,
        patient_id,
        &Coding::new(code_systems::SNOMED, "468063009", "Infusion pump"),
    )
}

/// Insert a field into an already-built resource object.
pub(crate) fn insert_field(resource: &mut Value, key: &str, value: Value) {
    if let Value::Object(fields) = resource {
        fields.insert(key.to_owned(), value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn practitioner_carries_npi_identifier() {
        let value = practitioner(&ResourceId::new("gp-001"), "GeneralPractitioner", "Dr");
        assert_eq!(value["identifier"][0]["system"], code_systems::NPI);
        assert_eq!(value["identifier"][0]["value"], "1234567893");
        assert_eq!(value["meta"]["profile"][0], Profile::Practitioner.url());
    }

    #[test]
    fn blood_specimen_points_at_patient() {
        let patient = ResourceId::new("pat-1");
        let value = blood_specimen(
            &ResourceId::new("spec-1"),
            &patient,
            "2022-01-06T10:00:00.000Z",
        );
        assert_eq!(value["subject"]["reference"], "Patient/pat-1");
        assert_eq!(value["collection"]["collectedDateTime"], "2022-01-06T10:00:00.000Z");
    }
}
