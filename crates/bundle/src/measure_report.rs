//! MeasureReport synthesis.
//!
//! The MeasureReport inventories every entry already in the graph, so it
//! must be the last resource appended before the bundle is persisted;
//! anything added afterwards would be missing from `evaluatedResource`.

use serde_json::{json, Value};
use terminology::{code_systems, extensions, Profile};
use tracing::debug;

use crate::builder::ResourceSet;
use crate::{BundleBuilder, ResourceId};

/// Population-bucket name -> measure-population code and display. The
/// bucket vocabulary is closed; names outside it are dropped.
fn population_code(key: &str) -> Option<(&'static str, &'static str)> {
    match key {
        "initialPopulation" => Some(("initial-population", "Initial Population")),
        "denominator" => Some(("denominator", "Denominator")),
        "numerator" => Some(("numerator", "Numerator")),
        "denominatorExclusion" => Some(("denominator-exclusion", "Denominator Exclusion")),
        "denominatorException" => Some(("denominator-exception", "Denominator Exception")),
        "numeratorExclusion" => Some(("numerator-exclusion", "Numerator Exclusion")),
        "measurePopulation" => Some(("measure-population", "Measure Population")),
        "measurePopulationExclusion" => {
            Some(("measure-population-exclusion", "Measure Population Exclusion"))
        }
        _ => None,
    }
}

impl BundleBuilder {
    /// Append the test-case MeasureReport: expected population counts plus
    /// one `evaluatedResource` reference per entry currently in the graph.
    ///
    /// Population-bucket names outside the closed vocabulary are silently
    /// dropped (a debug log line is the only trace), so a misspelled
    /// bucket produces a report with fewer populations rather than an
    /// error. Returns the measure report id.
    pub fn add_measure_report(
        &mut self,
        description: &str,
        measure_url: &str,
        measurement_period_start: &str,
        measurement_period_end: &str,
        expected_populations: &[(&str, u32)],
    ) -> ResourceId {
        let measure_report_id = ResourceId::generate();
        let parameters_id = format!("{}-parameters", ResourceId::generate());

        let evaluated_resources: Vec<Value> = self
            .bundle()
            .entry
            .iter()
            .map(|entry| {
                let resource_type = entry.resource["resourceType"].as_str().unwrap_or_default();
                let resource_id = entry.resource["id"].as_str().unwrap_or_default();
                json!({ "reference": format!("{resource_type}/{resource_id}") })
            })
            .collect();

        let mut populations: Vec<Value> = Vec::new();
        for (key, count) in expected_populations {
            match population_code(key) {
                Some((code, display)) => populations.push(json!({
                    "id": format!("{key}_1"),
                    "code": {
                        "coding": [{
                            "system": code_systems::MEASURE_POPULATION,
                            "code": code,
                            "display": display
                        }]
                    },
                    "count": count
                })),
                None => debug!(bucket = %key, "dropping unrecognized population bucket"),
            }
        }

        let measure_report = json!({
            "resourceType": "MeasureReport",
            "id": measure_report_id.as_str(),
            "meta": { "profile": [Profile::TestCaseMeasureReport.url()] },
            "contained": [
                {
                    "resourceType": "Parameters",
                    "id": parameters_id,
                    "parameter": [{ "name": "subject", "valueString": self.patient_id().as_str() }]
                }
            ],
            "extension": [
                {
                    "url": extensions::CQF_INPUT_PARAMETERS,
                    "valueReference": { "reference": format!("#{parameters_id}") }
                },
                {
                    "url": extensions::CQFM_TEST_CASE_DESCRIPTION,
                    "valueMarkdown": description
                }
            ],
            "modifierExtension": [
                {
                    "url": extensions::CQFM_IS_TEST_CASE,
                    "valueBoolean": true
                }
            ],
            "status": "complete",
            "type": "individual",
            "measure": measure_url,
            "period": { "start": measurement_period_start, "end": measurement_period_end },
            "group": [
                {
                    "id": "Group_1",
                    "population": populations,
                    "measureScore": { "value": 0.0 }
                }
            ],
            "evaluatedResource": evaluated_resources
        });

        self.commit(ResourceSet::new(measure_report))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{EncounterOptions, PatientOptions};

    const MEASURE_URL: &str = "https://madie.cms.gov/Measure/TestMeasure";

    #[test]
    fn evaluated_resources_cover_every_prior_entry_exactly() {
        let mut builder = BundleBuilder::new("Mr");
        builder.add_patient(PatientOptions::default());
        builder.add_encounter(
            "2022-01-05T08:00:00.000Z",
            "2022-01-10T12:00:00.000Z",
            EncounterOptions::default(),
        );
        let before = builder.len();

        builder.add_measure_report(
            "desc",
            MEASURE_URL,
            "2022-01-01",
            "2022-01-31",
            &[("initialPopulation", 1)],
        );

        let report = &builder.bundle().entry[before].resource;
        let evaluated = report["evaluatedResource"].as_array().expect("evaluated");
        assert_eq!(evaluated.len(), before);
        // One reference per prior entry, and no self-reference.
        for (entry, reference) in builder.bundle().entry.iter().zip(evaluated) {
            let expected = format!(
                "{}/{}",
                entry.resource["resourceType"].as_str().expect("type"),
                entry.resource["id"].as_str().expect("id")
            );
            assert_eq!(reference["reference"], expected);
        }
        let self_reference = format!(
            "MeasureReport/{}",
            report["id"].as_str().expect("report id")
        );
        assert!(evaluated
            .iter()
            .all(|reference| reference["reference"] != self_reference));
    }

    #[test]
    fn unknown_population_buckets_are_dropped_silently() {
        let mut builder = BundleBuilder::new("MrBogus");
        builder.add_patient(PatientOptions::default());
        builder.add_measure_report(
            "desc",
            MEASURE_URL,
            "2022-01-01",
            "2022-01-31",
            &[("initialPopulation", 1), ("bogusKey", 5)],
        );

        let report = &builder.bundle().entry[2].resource;
        let populations = report["group"][0]["population"]
            .as_array()
            .expect("populations");
        assert_eq!(populations.len(), 1);
        assert_eq!(
            populations[0]["code"]["coding"][0]["code"],
            "initial-population"
        );
        assert_eq!(populations[0]["id"], "initialPopulation_1");
        assert_eq!(populations[0]["count"], 1);
    }

    #[test]
    fn all_eight_buckets_are_recognized() {
        let buckets = [
            ("initialPopulation", "initial-population"),
            ("denominator", "denominator"),
            ("numerator", "numerator"),
            ("denominatorExclusion", "denominator-exclusion"),
            ("denominatorException", "denominator-exception"),
            ("numeratorExclusion", "numerator-exclusion"),
            ("measurePopulation", "measure-population"),
            ("measurePopulationExclusion", "measure-population-exclusion"),
        ];
        for (key, code) in buckets {
            assert_eq!(population_code(key).map(|(c, _)| c), Some(code), "{key}");
        }
        assert!(population_code("numeratorexclusion").is_none());
    }

    #[test]
    fn contained_parameters_carry_the_subject() {
        let mut builder = BundleBuilder::with_patient_id("MrSubject", ResourceId::new("pat-7"));
        builder.add_measure_report("desc", MEASURE_URL, "2022-01-01", "2022-01-31", &[]);
        let report = &builder.bundle().entry[0].resource;
        assert_eq!(
            report["contained"][0]["parameter"][0]["valueString"],
            "pat-7"
        );
        let contained_id = report["contained"][0]["id"].as_str().expect("contained id");
        assert_eq!(
            report["extension"][0]["valueReference"]["reference"],
            format!("#{contained_id}")
        );
        assert_eq!(report["modifierExtension"][0]["valueBoolean"], true);
    }
}
