//! DiagnosticReport factory operations.
//!
//! Lab reports use the diagnosticreport-lab profile. Narrative reports
//! (radiology, pathology, cardiology, other) use diagnosticreport-note.

use serde_json::{json, Value};
use terminology::{code_systems, extensions, Coding, Profile};

use crate::builder::ResourceSet;
use crate::{BundleBuilder, ResourceId};

/// Parameters for [`BundleBuilder::add_diagnostic_report`].
#[derive(Clone, Debug, Default)]
pub struct DiagnosticReportOptions {
    pub effective_datetime: Option<String>,
    pub report_code: Option<Coding>,
}

const DEFAULT_EFFECTIVE: &str = "2022-01-06T10:00:00.000Z";

impl BundleBuilder {
    /// Add a laboratory DiagnosticReport. Returns the report id.
    pub fn add_diagnostic_report(
        &mut self,
        encounter_id: &ResourceId,
        options: DiagnosticReportOptions,
    ) -> ResourceId {
        let report_id = ResourceId::generate();

        let effective = options
            .effective_datetime
            .unwrap_or_else(|| DEFAULT_EFFECTIVE.to_owned());
        let code = options.report_code.unwrap_or_else(|| {
            Coding::new(
                code_systems::LOINC,
                "58410-2",
                "CBC panel - Blood by Automated count",
            )
        });

        let report = json!({
            "resourceType": "DiagnosticReport",
            "id": report_id.as_str(),
            "meta": { "profile": [Profile::DiagnosticReportLab.url()] },
            "status": "final",
            "category": [
                {
                    "coding": [{
                        "system": code_systems::DIAGNOSTIC_SERVICE_SECTION,
                        "code": "LAB",
                        "display": "Laboratory"
                    }]
                }
            ],
            "code": code.concept(),
            "subject": { "reference": format!("Patient/{}", self.patient_id()) },
            "encounter": { "reference": format!("Encounter/{encounter_id}") },
            "effectiveDateTime": effective,
            "issued": effective
        });

        self.commit(ResourceSet::new(report))
    }

    /// Add a narrative DiagnosticReport for the RAD, PATH or CARD service
    /// section. Returns the report id.
    pub fn add_diagnostic_report_note(
        &mut self,
        encounter_id: &ResourceId,
        category: &str,
        effective_datetime: Option<String>,
    ) -> ResourceId {
        let category_coding: Vec<Value> = match category {
            "RAD" => vec![
                Coding::new(code_systems::LOINC, "LP29684-5", "Radiology").to_value(),
            ],
            "PATH" => vec![
                Coding::new(code_systems::LOINC, "LP7839-6", "Pathology").to_value(),
            ],
            "CARD" => vec![
                Coding::new(code_systems::LOINC, "LP29708-2", "Cardiology").to_value(),
            ],
            _ => Vec::new(),
        };

        self.diagnostic_report_note(
            encounter_id,
            json!([{ "coding": category_coding }]),
            Coding::new(code_systems::LOINC, "18748-4", "Diagnostic imaging study"),
            "Radiology Department",
            "No acute abnormality identified.",
            effective_datetime,
        )
    }

    /// Add a narrative DiagnosticReport outside the RAD/PATH/CARD
    /// sections (service section OTH). Returns the report id.
    pub fn add_diagnostic_report_others(
        &mut self,
        encounter_id: &ResourceId,
        effective_datetime: Option<String>,
    ) -> ResourceId {
        self.diagnostic_report_note(
            encounter_id,
            json!([
                {
                    "coding": [{
                        "system": code_systems::DIAGNOSTIC_SERVICE_SECTION,
                        "code": "OTH",
                        "display": "Other"
                    }]
                }
            ]),
            Coding::new(code_systems::LOINC, "11488-4", "Consult note"),
            "General Medicine Department",
            "General consultation completed.",
            effective_datetime,
        )
    }

    fn diagnostic_report_note(
        &mut self,
        encounter_id: &ResourceId,
        category: Value,
        code: Coding,
        performed_at: &str,
        conclusion: &str,
        effective_datetime: Option<String>,
    ) -> ResourceId {
        let report_id = ResourceId::generate();
        let effective = effective_datetime.unwrap_or_else(|| DEFAULT_EFFECTIVE.to_owned());

        let report = json!({
            "resourceType": "DiagnosticReport",
            "id": report_id.as_str(),
            "meta": { "profile": [Profile::DiagnosticReportNote.url()] },
            "extension": [
                {
                    "url": extensions::DIAGNOSTIC_REPORT_LOCATION_PERFORMED,
                    "valueReference": { "display": performed_at }
                }
            ],
            "basedOn": [{ "reference": format!("ServiceRequest/sr-{}", report_id.short()) }],
            "status": "final",
            "category": category,
            "code": code.concept(),
            "subject": { "reference": format!("Patient/{}", self.patient_id()) },
            "encounter": { "reference": format!("Encounter/{encounter_id}") },
            "effectiveDateTime": effective,
            "issued": effective,
            "specimen": [{ "reference": format!("Specimen/spec-{}", report_id.short()) }],
            "result": [{ "reference": format!("Observation/obs-{}", report_id.short()) }],
            "conclusion": conclusion,
            "conclusionCode": [
                {
                    "coding": [{
                        "system": code_systems::SNOMED,
                        "code": "17621005",
                        "display": "Normal"
                    }]
                }
            ]
        });

        self.commit(ResourceSet::new(report))
    }
}
