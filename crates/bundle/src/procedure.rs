//! Procedure factory operation.

use serde_json::json;
use terminology::{code_systems, extensions, Coding, Profile};

use crate::builder::ResourceSet;
use crate::{BundleBuilder, ResourceId};

impl BundleBuilder {
    /// Add a completed Procedure performed over the given period, plus the
    /// operating-room Location it happened in. Returns the procedure id.
    pub fn add_procedure(
        &mut self,
        encounter_id: &ResourceId,
        performed_start: &str,
        performed_end: &str,
        procedure_code: Option<Coding>,
    ) -> ResourceId {
        let procedure_id = ResourceId::generate();
        let location_id = ResourceId::generate();

        let code = procedure_code.unwrap_or_else(|| {
            Coding::new(code_systems::SNOMED, "80146002", "Appendectomy (procedure)")
        });

        let location = json!({
            "resourceType": "Location",
            "id": location_id.as_str(),
            "meta": { "profile": [Profile::Location.url()] },
            "status": "active",
            "name": "Operating Room 1",
            "type": [{
                "coding": [{
                    "system": code_systems::ROLE_CODE,
                    "code": "OR",
                    "display": "Operating Room"
                }]
            }]
        });

        let procedure = json!({
            "resourceType": "Procedure",
            "id": procedure_id.as_str(),
            "meta": { "profile": [Profile::Procedure.url()] },
            "extension": [
                {
                    "url": extensions::PROCEDURE_APPROACH_BODY_STRUCTURE,
                    "valueReference": { "display": "Laparoscopic approach" }
                }
            ],
            "basedOn": [{ "reference": format!("ServiceRequest/sr-{}", procedure_id.short()) }],
            "partOf": [{ "reference": format!("Procedure/parent-{}", procedure_id.short()) }],
            "status": "completed",
            "category": {
                "coding": [{
                    "system": code_systems::SNOMED,
                    "code": "387713003",
                    "display": "Surgical procedure"
                }]
            },
            "code": code.concept(),
            "subject": { "reference": format!("Patient/{}", self.patient_id()) },
            "encounter": { "reference": format!("Encounter/{encounter_id}") },
            "performedPeriod": { "start": performed_start, "end": performed_end },
            "location": { "reference": format!("Location/{location_id}") },
            "reasonCode": [
                {
                    "coding": [{
                        "system": code_systems::SNOMED,
                        "code": "74400008",
                        "display": "Appendicitis"
                    }]
                }
            ],
            "reasonReference": [{ "reference": format!("Condition/cond-{}", procedure_id.short()) }],
            "bodySite": [
                {
                    "coding": [{
                        "system": code_systems::SNOMED,
                        "code": "66754008",
                        "display": "Appendix structure"
                    }]
                }
            ]
        });

        self.commit(ResourceSet::with_auxiliaries(procedure, vec![location]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn procedure_references_its_synthesized_location() {
        let mut builder = BundleBuilder::new("Proc");
        let encounter_id = ResourceId::new("enc-1");
        let id = builder.add_procedure(
            &encounter_id,
            "2022-01-06T08:00:00.000Z",
            "2022-01-06T09:30:00.000Z",
            None,
        );
        assert_eq!(builder.len(), 2);
        let location = &builder.bundle().entry[0].resource;
        assert_eq!(location["resourceType"], "Location");
        assert_eq!(location["name"], "Operating Room 1");

        let procedure = &builder.bundle().entry[1].resource;
        assert_eq!(procedure["id"], id.as_str());
        assert_eq!(procedure["code"]["coding"][0]["code"], "80146002");
        assert_eq!(
            procedure["location"]["reference"],
            format!("Location/{}", location["id"].as_str().expect("location id"))
        );
        assert_eq!(
            procedure["performedPeriod"]["start"],
            "2022-01-06T08:00:00.000Z"
        );
    }
}
