//! Medication, MedicationRequest and MedicationAdministration factory
//! operations.
//!
//! Request and administration each come in two positive forms (inline
//! medication coding, or a reference to a Medication resource already in
//! the graph) plus, for requests, the negation form: a distinct operation
//! attaching the medicationnotrequested profile with `doNotPerform` and a
//! contraindication reason.

use serde_json::{json, Value};
use terminology::{code_systems, Coding, Profile};

use crate::builder::ResourceSet;
use crate::support::{infusion_pump, insert_field, practitioner};
use crate::{BundleBuilder, ResourceId};

/// medication[x]: either an inline coding or a reference to a Medication
/// entry.
enum MedicationField {
    Concept(Coding),
    Reference(ResourceId),
}

impl MedicationField {
    fn apply(&self, resource: &mut Value) {
        match self {
            MedicationField::Concept(coding) => {
                insert_field(resource, "medicationCodeableConcept", coding.concept())
            }
            MedicationField::Reference(id) => insert_field(
                resource,
                "medicationReference",
                json!({ "reference": format!("Medication/{id}") }),
            ),
        }
    }
}

fn default_medication_code() -> Coding {
    Coding::new(
        code_systems::RXNORM,
        "860975",
        "insulin human, isophane 70 UNT/ML / insulin human, regular 30 UNT/ML Injectable Suspension",
    )
}

impl BundleBuilder {
    /// Add a standalone Medication resource (metformin tablet by default
    /// composition, caller-supplied code). Returns the medication id.
    pub fn add_medication(&mut self, medication_code: Option<Coding>) -> ResourceId {
        let medication_id = ResourceId::generate();
        let code = medication_code.unwrap_or_else(default_medication_code);

        let medication = json!({
            "resourceType": "Medication",
            "id": medication_id.as_str(),
            "meta": { "profile": [Profile::Medication.url()] },
            "code": code.concept(),
            "status": "active",
            "manufacturer": { "reference": "Organization/pharma-org-123" },
            "form": {
                "coding": [{
                    "system": code_systems::SNOMED,
                    "code": "385055001",
                    "display": "Tablet"
                }]
            },
            "amount": {
                "numerator": {
                    "value": 500,
                    "unit": "mg",
                    "system": code_systems::UCUM,
                    "code": "mg"
                },
                "denominator": {
                    "value": 1,
                    "unit": "{tbl}",
                    "system": code_systems::UCUM,
                    "code": "{tbl}"
                }
            },
            "ingredient": [
                {
                    "itemCodeableConcept": {
                        "coding": [{
                            "system": code_systems::RXNORM,
                            "code": "6809",
                            "display": "Metformin"
                        }]
                    },
                    "isActive": true,
                    "strength": {
                        "numerator": {
                            "value": 500,
                            "unit": "mg",
                            "system": code_systems::UCUM,
                            "code": "mg"
                        },
                        "denominator": {
                            "value": 1,
                            "unit": "{tbl}",
                            "system": code_systems::UCUM,
                            "code": "{tbl}"
                        }
                    }
                }
            ],
            "batch": {
                "lotNumber": "MED-LOT-2022-001",
                "expirationDate": "2025-12-31"
            }
        });

        self.commit(ResourceSet::new(medication))
    }

    /// Add an active MedicationRequest with an inline medication coding.
    /// Returns the request id.
    pub fn add_medication_request(
        &mut self,
        encounter_id: &ResourceId,
        authored_on: &str,
        medication_code: Option<Coding>,
    ) -> ResourceId {
        let code = medication_code.unwrap_or_else(default_medication_code);
        self.medication_request(encounter_id, authored_on, MedicationField::Concept(code))
    }

    /// Add an active MedicationRequest referencing a Medication resource
    /// already in the graph. Returns the request id.
    pub fn add_medication_request_with_reference(
        &mut self,
        encounter_id: &ResourceId,
        authored_on: &str,
        medication_id: &ResourceId,
    ) -> ResourceId {
        self.medication_request(
            encounter_id,
            authored_on,
            MedicationField::Reference(medication_id.clone()),
        )
    }

    fn medication_request(
        &mut self,
        encounter_id: &ResourceId,
        authored_on: &str,
        medication: MedicationField,
    ) -> ResourceId {
        let med_request_id = ResourceId::generate();
        let practitioner_id = ResourceId::generate();
        let recorder_id = ResourceId::generate();

        let requester = practitioner(&practitioner_id, "Smith", "John");
        let recorder = practitioner(&recorder_id, "Recorder", "Jane");

        let mut medication_request = json!({
            "resourceType": "MedicationRequest",
            "id": med_request_id.as_str(),
            "meta": { "profile": [Profile::MedicationRequest.url()] },
            "status": "active",
            "statusReason": {
                "coding": [{
                    "system": code_systems::SNOMED,
                    "code": "373066001",
                    "display": "Yes"
                }]
            },
            "intent": "order",
            "category": [
                {
                    "coding": [{
                        "system": code_systems::MEDICATION_REQUEST_CATEGORY,
                        "code": "inpatient",
                        "display": "Inpatient"
                    }]
                }
            ],
            "priority": "routine",
            "reportedReference": { "reference": format!("Practitioner/{practitioner_id}") },
            "subject": { "reference": format!("Patient/{}", self.patient_id()) },
            "encounter": { "reference": format!("Encounter/{encounter_id}") },
            "authoredOn": authored_on,
            "requester": { "reference": format!("Practitioner/{practitioner_id}") },
            "recorder": { "reference": format!("Practitioner/{recorder_id}") },
            "reasonCode": [
                {
                    "coding": [{
                        "system": code_systems::SNOMED,
                        "code": "44054006",
                        "display": "Diabetes mellitus type 2"
                    }]
                }
            ],
            "reasonReference": [{ "reference": format!("Condition/cond-{}", med_request_id.short()) }],
            "instantiatesCanonical": ["http://example.org/fhir/PlanDefinition/insulin-protocol"],
            "instantiatesUri": ["http://example.org/protocols/insulin"],
            "courseOfTherapyType": {
                "coding": [{
                    "system": code_systems::MEDICATION_REQUEST_COURSE_OF_THERAPY,
                    "code": "continuous",
                    "display": "Continuous long term therapy"
                }]
            },
            "dosageInstruction": [
                {
                    "sequence": 1,
                    "text": "10 units subcutaneously before breakfast",
                    "timing": {
                        "repeat": {
                            "frequency": 1,
                            "period": 1,
                            "periodUnit": "d",
                            "when": ["ACM"]
                        }
                    },
                    "route": {
                        "coding": [{
                            "system": code_systems::SNOMED,
                            "code": "34206005",
                            "display": "Subcutaneous route"
                        }]
                    },
                    "doseAndRate": [
                        {
                            "type": {
                                "coding": [{
                                    "system": code_systems::DOSE_RATE_TYPE,
                                    "code": "ordered",
                                    "display": "Ordered"
                                }]
                            },
                            "doseQuantity": {
                                "value": 10,
                                "unit": "U",
                                "system": code_systems::UCUM,
                                "code": "U"
                            }
                        }
                    ]
                }
            ]
        });
        medication.apply(&mut medication_request);

        self.commit(ResourceSet::with_auxiliaries(
            medication_request,
            vec![requester, recorder],
        ))
    }

    /// Add the negation form: a MedicationRequest that must not be acted
    /// on (`doNotPerform`), profiled as medicationnotrequested with a
    /// contraindication reason. Returns the request id.
    pub fn add_medication_not_requested(
        &mut self,
        encounter_id: &ResourceId,
        authored_on: &str,
        medication_code: Option<Coding>,
    ) -> ResourceId {
        let med_request_id = ResourceId::generate();
        let practitioner_id = ResourceId::generate();
        let recorder_id = ResourceId::generate();

        let code = medication_code.unwrap_or_else(default_medication_code);
        let requester = practitioner(&practitioner_id, "Smith", "John");
        let recorder = practitioner(&recorder_id, "Recorder", "NotReq");

        let medication_not_requested = json!({
            "resourceType": "MedicationRequest",
            "id": med_request_id.as_str(),
            "meta": { "profile": [Profile::MedicationNotRequested.url()] },
            "status": "completed",
            "statusReason": {
                "coding": [{
                    "system": code_systems::SNOMED,
                    "code": "183932001",
                    "display": "Procedure contraindicated (situation)"
                }]
            },
            "intent": "order",
            "category": [
                {
                    "coding": [{
                        "system": code_systems::MEDICATION_REQUEST_CATEGORY,
                        "code": "inpatient",
                        "display": "Inpatient"
                    }]
                }
            ],
            "priority": "routine",
            "doNotPerform": true,
            "reportedReference": { "reference": format!("Practitioner/{practitioner_id}") },
            "medicationCodeableConcept": code.concept(),
            "subject": { "reference": format!("Patient/{}", self.patient_id()) },
            "encounter": { "reference": format!("Encounter/{encounter_id}") },
            "authoredOn": authored_on,
            "requester": { "reference": format!("Practitioner/{practitioner_id}") },
            "recorder": { "reference": format!("Practitioner/{recorder_id}") },
            "reasonCode": [
                {
                    "coding": [{
                        "system": code_systems::SNOMED,
                        "code": "183932001",
                        "display": "Procedure contraindicated (situation)"
                    }],
                    "text": "Medication not requested due to contraindication"
                }
            ],
            "reasonReference": [{ "reference": format!("Condition/cond-notreq-{}", med_request_id.short()) }],
            "instantiatesCanonical": ["http://example.org/fhir/PlanDefinition/negation-protocol"],
            "instantiatesUri": ["http://example.org/protocols/negation"],
            "courseOfTherapyType": {
                "coding": [{
                    "system": code_systems::MEDICATION_REQUEST_COURSE_OF_THERAPY,
                    "code": "acute",
                    "display": "Short course (acute) therapy"
                }]
            },
            "dosageInstruction": [
                {
                    "sequence": 1,
                    "text": "Medication not to be given - contraindicated",
                    "timing": { "repeat": { "frequency": 1, "period": 1, "periodUnit": "d" } }
                }
            ]
        });

        self.commit(ResourceSet::with_auxiliaries(
            medication_not_requested,
            vec![requester, recorder],
        ))
    }

    /// Add a completed MedicationAdministration with an inline medication
    /// coding. Returns the administration id.
    pub fn add_medication_administration(
        &mut self,
        encounter_id: &ResourceId,
        effective_start: &str,
        effective_end: &str,
        medication_code: Option<Coding>,
    ) -> ResourceId {
        let code = medication_code.unwrap_or_else(default_medication_code);
        self.medication_administration(
            encounter_id,
            effective_start,
            effective_end,
            MedicationField::Concept(code),
        )
    }

    /// Add a completed MedicationAdministration referencing a Medication
    /// resource already in the graph. Returns the administration id.
    pub fn add_medication_administration_with_reference(
        &mut self,
        encounter_id: &ResourceId,
        effective_start: &str,
        effective_end: &str,
        medication_id: &ResourceId,
    ) -> ResourceId {
        self.medication_administration(
            encounter_id,
            effective_start,
            effective_end,
            MedicationField::Reference(medication_id.clone()),
        )
    }

    fn medication_administration(
        &mut self,
        encounter_id: &ResourceId,
        effective_start: &str,
        effective_end: &str,
        medication: MedicationField,
    ) -> ResourceId {
        let med_admin_id = ResourceId::generate();
        let practitioner_id = ResourceId::generate();
        let device_id = ResourceId::generate();

        let performer = practitioner(&practitioner_id, "Nurse", "Admin");
        let device = infusion_pump(&device_id, self.patient_id());

        let mut medication_admin = json!({
            "resourceType": "MedicationAdministration",
            "id": med_admin_id.as_str(),
            "meta": { "profile": [Profile::MedicationAdministration.url()] },
            "instantiates": ["http://example.org/fhir/PlanDefinition/insulin-protocol"],
            "partOf": [{ "reference": format!("Procedure/proc-{}", med_admin_id.short()) }],
            "status": "completed",
            "statusReason": [
                {
                    "coding": [{
                        "system": code_systems::SNOMED,
                        "code": "373066001",
                        "display": "Yes"
                    }]
                }
            ],
            "category": {
                "coding": [{
                    "system": code_systems::MEDICATION_ADMIN_CATEGORY,
                    "code": "inpatient",
                    "display": "Inpatient"
                }]
            },
            "subject": { "reference": format!("Patient/{}", self.patient_id()) },
            "context": { "reference": format!("Encounter/{encounter_id}") },
            "supportingInformation": [{ "reference": format!("Observation/obs-{}", med_admin_id.short()) }],
            "effectivePeriod": { "start": effective_start, "end": effective_end },
            "performer": [
                {
                    "actor": { "reference": format!("Practitioner/{practitioner_id}") },
                    "function": {
                        "coding": [{
                            "system": code_systems::MEDICATION_ADMIN_PERFORM_FUNCTION,
                            "code": "performer",
                            "display": "Performer"
                        }]
                    }
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
            "reasonReference": [{ "reference": format!("Condition/cond-{}", med_admin_id.short()) }],
            "request": { "reference": format!("MedicationRequest/req-{}", med_admin_id.short()) },
            "device": [{ "reference": format!("Device/{device_id}") }],
            "note": [
                {
                    "authorString": "Nurse Admin",
                    "time": effective_start,
                    "text": "Patient tolerated medication well"
                }
            ],
            "dosage": {
                "text": "10 units subcutaneously",
                "site": {
                    "coding": [{
                        "system": code_systems::SNOMED,
                        "code": "368209003",
                        "display": "Right upper arm structure"
                    }]
                },
                "route": {
                    "coding": [{
                        "system": code_systems::SNOMED,
                        "code": "34206005",
                        "display": "Subcutaneous route"
                    }]
                },
                "method": {
                    "coding": [{
                        "system": code_systems::SNOMED,
                        "code": "422145002",
                        "display": "Inject"
                    }]
                },
                "dose": {
                    "value": 10,
                    "unit": "U",
                    "system": code_systems::UCUM,
                    "code": "U"
                },
                "rateQuantity": {
                    "value": 1,
                    "unit": "mL/hour",
                    "system": code_systems::UCUM,
                    "code": "mL/h"
                }
            }
        });
        medication.apply(&mut medication_admin);

        self.commit(ResourceSet::with_auxiliaries(
            medication_admin,
            vec![performer, device],
        ))
    }
}
