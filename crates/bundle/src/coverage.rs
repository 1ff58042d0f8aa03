//! Coverage factory operations.

use serde_json::{json, Value};
use terminology::{code_systems, Profile};

use crate::builder::ResourceSet;
use crate::{BundleBuilder, ResourceId};

fn coverage_body(
    builder: &BundleBuilder,
    coverage_id: &ResourceId,
    start: &str,
    end: &str,
    kind: Value,
    plan_name: &str,
    network: &str,
    subrogation: bool,
) -> Value {
    let patient = format!("Patient/{}", builder.patient_id());
    json!({
        "resourceType": "Coverage",
        "id": coverage_id.as_str(),
        "meta": { "profile": [Profile::Coverage.url()] },
        "status": "active",
        "type": kind,
        "policyHolder": { "reference": patient },
        "subscriber": { "reference": patient },
        "subscriberId": "MBR-12345",
        "beneficiary": { "reference": patient },
        "dependent": "01",
        "relationship": {
            "coding": [{
                "system": code_systems::SUBSCRIBER_RELATIONSHIP,
                "code": "self",
                "display": "Self"
            }]
        },
        "period": { "start": start, "end": end },
        "payor": [{ "reference": "Organization/payor-org-123" }],
        "class": [
            {
                "type": {
                    "coding": [{
                        "system": code_systems::COVERAGE_CLASS,
                        "code": "plan",
                        "display": "Plan"
                    }]
                },
                "value": "PLAN-001",
                "name": plan_name
            }
        ],
        "order": 1,
        "network": network,
        "subrogation": subrogation,
        "contract": [{ "reference": "Contract/contract-123" }]
    })
}

impl BundleBuilder {
    /// Add a Coverage active over `start`..`end`, typed as a health
    /// insurance plan policy. Returns the coverage id.
    pub fn add_coverage(&mut self, start: &str, end: &str) -> ResourceId {
        let coverage_id = ResourceId::generate();
        let coverage = coverage_body(
            self,
            &coverage_id,
            start,
            end,
            json!({
                "coding": [{
                    "system": code_systems::ACT_CODE,
                    "code": "HIP",
                    "display": "health insurance plan policy"
                }]
            }),
            "Premium Health Plan",
            "Preferred Provider Network",
            true,
        );
        self.commit(ResourceSet::new(coverage))
    }

    /// Coverage variant typed with a Source of Payment Typology code
    /// (Medicare). Returns the coverage id.
    pub fn add_coverage_payer_type(&mut self, start: &str, end: &str) -> ResourceId {
        let coverage_id = ResourceId::generate();
        let coverage = coverage_body(
            self,
            &coverage_id,
            start,
            end,
            json!({
                "coding": [{
                    "system": code_systems::SOPT,
                    "code": "1",
                    "display": "MEDICARE"
                }]
            }),
            "Medicare Plan A",
            "Medicare Network",
            false,
        );
        self.commit(ResourceSet::new(coverage))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn coverage_beneficiary_is_the_patient() {
        let mut builder = BundleBuilder::with_patient_id("Cov", ResourceId::new("pat-3"));
        builder.add_coverage("2022-01-01", "2022-12-31");
        let coverage = &builder.bundle().entry[0].resource;
        assert_eq!(coverage["beneficiary"]["reference"], "Patient/pat-3");
        assert_eq!(coverage["policyHolder"]["reference"], "Patient/pat-3");
        assert_eq!(coverage["type"]["coding"][0]["code"], "HIP");
        assert_eq!(coverage["period"]["start"], "2022-01-01");
        assert_eq!(coverage["subrogation"], true);
    }

    #[test]
    fn payer_type_variant_uses_sopt_coding() {
        let mut builder = BundleBuilder::new("CovSopt");
        builder.add_coverage_payer_type("2022-01-01", "2022-12-31");
        let coverage = &builder.bundle().entry[0].resource;
        assert_eq!(coverage["type"]["coding"][0]["system"], code_systems::SOPT);
        assert_eq!(coverage["type"]["coding"][0]["code"], "1");
        assert_eq!(coverage["subrogation"], false);
    }
}
