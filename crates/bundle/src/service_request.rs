//! ServiceRequest factory operations.
//!
//! The positive form orders a laboratory service; the negation form is a
//! separate operation carrying the servicenotrequested profile,
//! `doNotPerform`, and the do-not-perform-reason extension.

use serde_json::json;
use terminology::{code_systems, extensions, Coding, Profile};

use crate::builder::ResourceSet;
use crate::support::practitioner;
use crate::{BundleBuilder, ResourceId};

fn default_service_code() -> Coding {
    Coding::new(
        code_systems::LOINC,
        "24323-8",
        "Comprehensive metabolic 2000 panel - Serum or Plasma",
    )
}

impl BundleBuilder {
    /// Add an active ServiceRequest plus its requester and performer
    /// Practitioners. Returns the service request id.
    pub fn add_service_request(
        &mut self,
        encounter_id: &ResourceId,
        authored_on: &str,
        service_code: Option<Coding>,
    ) -> ResourceId {
        let service_request_id = ResourceId::generate();
        let requester_id = ResourceId::generate();
        let performer_id = ResourceId::generate();

        let code = service_code.unwrap_or_else(default_service_code);
        let requester = practitioner(&requester_id, "Requester", "Dr");
        let performer = practitioner(&performer_id, "Performer", "Lab");

        let service_request = json!({
            "resourceType": "ServiceRequest",
            "id": service_request_id.as_str(),
            "meta": { "profile": [Profile::ServiceRequest.url()] },
            "instantiatesCanonical": ["http://example.org/fhir/PlanDefinition/lab-protocol"],
            "instantiatesUri": ["http://example.org/protocols/lab"],
            "basedOn": [{ "reference": format!("CarePlan/cp-{}", service_request_id.short()) }],
            "replaces": [{ "reference": format!("ServiceRequest/sr-old-{}", service_request_id.short()) }],
            "requisition": {
                "system": "http://example.org/requisition",
                "value": format!("REQ-{}", service_request_id.short())
            },
            "status": "active",
            "intent": "order",
            "category": [
                {
                    "coding": [{
                        "system": code_systems::SNOMED,
                        "code": "108252007",
                        "display": "Laboratory procedure"
                    }]
                }
            ],
            "priority": "routine",
            "code": code.concept(),
            "orderDetail": [
                {
                    "coding": [{
                        "system": code_systems::SNOMED,
                        "code": "373066001",
                        "display": "Yes"
                    }]
                }
            ],
            "quantityQuantity": {
                "value": 1,
                "unit": "test",
                "system": code_systems::UCUM,
                "code": "{test}"
            },
            "subject": { "reference": format!("Patient/{}", self.patient_id()) },
            "encounter": { "reference": format!("Encounter/{encounter_id}") },
            "occurrenceDateTime": authored_on,
            "asNeededBoolean": true,
            "authoredOn": authored_on,
            "requester": { "reference": format!("Practitioner/{requester_id}") },
            "performerType": {
                "coding": [{
                    "system": code_systems::SNOMED,
                    "code": "61246008",
                    "display": "Laboratory medicine specialist"
                }]
            },
            "performer": [{ "reference": format!("Practitioner/{performer_id}") }],
            "locationCode": [
                {
                    "coding": [{
                        "system": code_systems::ROLE_CODE,
                        "code": "HOSP",
                        "display": "Hospital"
                    }]
                }
            ],
            "reasonCode": [
                {
                    "coding": [{
                        "system": code_systems::SNOMED,
                        "code": "44054006",
                        "display": "Diabetes mellitus type 2"
                    }]
                }
            ],
            "reasonReference": [{ "reference": format!("Condition/cond-{}", service_request_id.short()) }],
            "insurance": [{ "reference": format!("Coverage/cov-{}", service_request_id.short()) }],
            "bodySite": [
                {
                    "coding": [{
                        "system": code_systems::SNOMED,
                        "code": "368209003",
                        "display": "Right upper arm structure"
                    }]
                }
            ],
            "note": [
                {
                    "authorString": "Dr Requester",
                    "time": authored_on,
                    "text": "Please perform fasting lab test"
                }
            ],
            "patientInstruction": "Fast for 8 hours before the test"
        });

        self.commit(ResourceSet::with_auxiliaries(
            service_request,
            vec![requester, performer],
        ))
    }

    /// Add the negation form: a ServiceRequest that was declined
    /// (`doNotPerform`), profiled as servicenotrequested with the
    /// do-not-perform-reason extension. Returns the service request id.
    pub fn add_service_not_requested(
        &mut self,
        encounter_id: &ResourceId,
        authored_on: &str,
        service_code: Option<Coding>,
    ) -> ResourceId {
        let service_request_id = ResourceId::generate();
        let requester_id = ResourceId::generate();
        let performer_id = ResourceId::generate();

        let code = service_code.unwrap_or_else(default_service_code);
        let requester = practitioner(&requester_id, "Requester", "Dr");
        let performer = practitioner(&performer_id, "Performer", "NotReq");

        let service_not_requested = json!({
            "resourceType": "ServiceRequest",
            "id": service_request_id.as_str(),
            "meta": { "profile": [Profile::ServiceNotRequested.url()] },
            "extension": [
                {
                    "url": extensions::QICORE_DO_NOT_PERFORM_REASON,
                    "valueCodeableConcept": {
                        "coding": [{
                            "system": code_systems::SNOMED,
                            "code": "105480006",
                            "display": "Procedure declined by patient (situation)"
                        }],
                        "text": "Patient declined procedure after discussion of risks"
                    }
                }
            ],
            "instantiatesCanonical": ["http://example.org/fhir/PlanDefinition/negation-protocol"],
            "instantiatesUri": ["http://example.org/protocols/negation"],
            "basedOn": [{ "reference": format!("CarePlan/cp-notreq-{}", service_request_id.short()) }],
            "replaces": [{ "reference": format!("ServiceRequest/sr-old-notreq-{}", service_request_id.short()) }],
            "requisition": {
                "system": "http://example.org/requisition",
                "value": format!("REQ-NOTREQ-{}", service_request_id.short())
            },
            "status": "completed",
            "intent": "order",
            "category": [
                {
                    "coding": [{
                        "system": code_systems::SNOMED,
                        "code": "108252007",
                        "display": "Laboratory procedure"
                    }]
                }
            ],
            "priority": "routine",
            "doNotPerform": true,
            "code": code.concept(),
            "orderDetail": [
                {
                    "coding": [{
                        "system": code_systems::SNOMED,
                        "code": "373067005",
                        "display": "No"
                    }]
                }
            ],
            "quantityQuantity": {
                "value": 0,
                "unit": "test",
                "system": code_systems::UCUM,
                "code": "{test}"
            },
            "subject": { "reference": format!("Patient/{}", self.patient_id()) },
            "encounter": { "reference": format!("Encounter/{encounter_id}") },
            "occurrenceDateTime": authored_on,
            "asNeededBoolean": true,
            "authoredOn": authored_on,
            "requester": { "reference": format!("Practitioner/{requester_id}") },
            "performerType": {
                "coding": [{
                    "system": code_systems::SNOMED,
                    "code": "61246008",
                    "display": "Laboratory medicine specialist"
                }]
            },
            "performer": [{ "reference": format!("Practitioner/{performer_id}") }],
            "locationCode": [
                {
                    "coding": [{
                        "system": code_systems::ROLE_CODE,
                        "code": "HOSP",
                        "display": "Hospital"
                    }]
                }
            ],
            "reasonCode": [
                {
                    "coding": [{
                        "system": code_systems::SNOMED,
                        "code": "105480006",
                        "display": "Procedure declined by patient (situation)"
                    }]
                }
            ],
            "reasonReference": [{ "reference": format!("Condition/cond-notreq-{}", service_request_id.short()) }],
            "insurance": [{ "reference": format!("Coverage/cov-notreq-{}", service_request_id.short()) }],
            "bodySite": [
                {
                    "coding": [{
                        "system": code_systems::SNOMED,
                        "code": "368209003",
                        "display": "Right upper arm structure"
                    }]
                }
            ],
            "note": [
                {
                    "authorString": "Dr Requester",
                    "time": authored_on,
                    "text": "Service not requested - patient declined"
                }
            ],
            "patientInstruction": "Patient declined this procedure"
        });

        self.commit(ResourceSet::with_auxiliaries(
            service_not_requested,
            vec![requester, performer],
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const AUTHORED: &str = "2022-01-06T09:00:00.000Z";

    #[test]
    fn service_request_synthesizes_two_practitioners() {
        let mut builder = BundleBuilder::new("Sr");
        let encounter_id = ResourceId::new("enc-1");
        let id = builder.add_service_request(&encounter_id, AUTHORED, None);
        assert_eq!(builder.len(), 3);
        let request = &builder.bundle().entry[2].resource;
        assert_eq!(request["id"], id.as_str());
        assert_eq!(request["meta"]["profile"][0], Profile::ServiceRequest.url());
        assert_eq!(request["code"]["coding"][0]["code"], "24323-8");
        assert_eq!(request["status"], "active");
        assert_eq!(
            request["requester"]["reference"],
            format!(
                "Practitioner/{}",
                builder.bundle().entry[0].resource["id"]
                    .as_str()
                    .expect("requester id")
            )
        );
    }

    #[test]
    fn not_requested_carries_do_not_perform_reason_extension() {
        let mut builder = BundleBuilder::new("SrNeg");
        let encounter_id = ResourceId::new("enc-1");
        builder.add_service_not_requested(&encounter_id, AUTHORED, None);
        let request = &builder.bundle().entry[2].resource;
        assert_eq!(
            request["meta"]["profile"][0],
            Profile::ServiceNotRequested.url()
        );
        assert_eq!(request["doNotPerform"], true);
        assert_eq!(
            request["extension"][0]["url"],
            extensions::QICORE_DO_NOT_PERFORM_REASON
        );
        assert_eq!(
            request["extension"][0]["valueCodeableConcept"]["coding"][0]["code"],
            "105480006"
        );
        assert_eq!(request["quantityQuantity"]["value"], 0);
    }
}
