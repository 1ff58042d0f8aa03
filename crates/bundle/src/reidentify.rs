//! Re-identification: cloning a finished graph under a new Patient
//! identity.
//!
//! Exporting N test cases from one template builds the graph once and
//! clones it once per case, so each exported bundle gets its own subject.
//! The clone is deep; the source builder is left untouched.
//!
//! Only the three conventional "who is this about" reference fields
//! (`subject`, `beneficiary` and `patient`) are rewritten. Any other
//! reference shape that happens to point at the old Patient (for example a
//! nested `performer.actor`) keeps the stale identity. That narrow field
//! list is a deliberate contract boundary, kept in sync with what the
//! generated resource set actually uses, and pinned by a test below.

use serde_json::{json, Value};

use crate::builder::MADIE_BASE_URL;
use crate::{BundleBuilder, BundleError, BundleResult, ResourceId};

impl BundleBuilder {
    /// Produce a deep clone of this graph under `new_patient_id`.
    ///
    /// The Patient entry is rewritten wholesale: id, fullUrl, request URL,
    /// identifier values, and its name becomes `{family: series, given:
    /// [title]}` so exported test cases are labeled by series and title.
    /// Every other entry has its subject/beneficiary/patient references
    /// repointed at the new identity.
    ///
    /// # Errors
    ///
    /// [`BundleError::PatientEntryMissing`] if the graph contains no
    /// Patient entry; that means the construction sequence never called a
    /// patient operation and the graph cannot anchor a test case.
    pub fn reidentify(
        &self,
        new_patient_id: ResourceId,
        series: &str,
        title: &str,
    ) -> BundleResult<BundleBuilder> {
        let mut clone = BundleBuilder {
            test_case_name: format!("{series}_{title}"),
            patient_id: new_patient_id.clone(),
            bundle: self.bundle().clone(),
        };

        let mut patient_seen = false;
        for entry in &mut clone.bundle.entry {
            let resource_type = entry
                .resource
                .get("resourceType")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_owned();

            if resource_type == "Patient" {
                patient_seen = true;
                rewrite_patient(entry, &new_patient_id, series, title);
            } else if let Some(subject) = entry.resource.get_mut("subject") {
                set_reference(subject, &new_patient_id);
            }

            // Coverage's beneficiary and Device's patient live outside the
            // subject convention but carry the same identity.
            if let Some(beneficiary) = entry.resource.get_mut("beneficiary") {
                set_reference(beneficiary, &new_patient_id);
            }
            if let Some(patient) = entry.resource.get_mut("patient") {
                if patient.is_object() {
                    set_reference(patient, &new_patient_id);
                }
            }
        }

        if !patient_seen {
            return Err(BundleError::PatientEntryMissing);
        }
        Ok(clone)
    }
}

fn set_reference(field: &mut Value, new_patient_id: &ResourceId) {
    if let Value::Object(fields) = field {
        fields.insert(
            "reference".to_owned(),
            Value::String(format!("Patient/{new_patient_id}")),
        );
    }
}

fn rewrite_patient(
    entry: &mut crate::BundleEntry,
    new_patient_id: &ResourceId,
    series: &str,
    title: &str,
) {
    entry.full_url = format!("{MADIE_BASE_URL}/Patient/{new_patient_id}");
    entry.request.url = format!("Patient/{new_patient_id}");

    let resource = &mut entry.resource;
    if let Value::Object(fields) = resource {
        fields.insert(
            "id".to_owned(),
            Value::String(new_patient_id.to_string()),
        );
        fields.insert(
            "name".to_owned(),
            json!([{ "family": series, "given": [title] }]),
        );
    }
    if let Some(identifiers) = resource.get_mut("identifier").and_then(Value::as_array_mut) {
        for identifier in identifiers {
            if let Value::Object(fields) = identifier {
                fields.insert(
                    "value".to_owned(),
                    Value::String(new_patient_id.to_string()),
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        ConditionOptions, EncounterOptions, ObservationOptions, PatientOptions,
        SimpleObservationOptions,
    };

    const START: &str = "2022-01-05T08:00:00.000Z";
    const END: &str = "2022-01-10T12:00:00.000Z";

    fn populated_builder() -> BundleBuilder {
        let mut builder = BundleBuilder::new("Rekey");
        builder.add_patient(PatientOptions::default());
        let encounter_id = builder.add_encounter(START, END, EncounterOptions::default());
        builder.add_condition(&encounter_id, ConditionOptions::default());
        builder.add_coverage("2022-01-01", "2022-12-31");
        builder.add_observation(&encounter_id, ObservationOptions::default());
        builder.add_device(None);
        builder
    }

    #[test]
    fn rekey_replaces_every_subject_scoped_reference() {
        let builder = populated_builder();
        let old_id = builder.patient_id().clone();

        let clone = builder
            .reidentify(ResourceId::new("NEW123"), "SeriesA", "Title1")
            .expect("reidentify");

        let old_reference = format!("Patient/{old_id}");
        let mut patients = 0;
        for entry in &clone.bundle().entry {
            let resource = &entry.resource;
            if resource["resourceType"] == "Patient" {
                patients += 1;
                assert_eq!(resource["id"], "NEW123");
                assert_eq!(resource["identifier"][0]["value"], "NEW123");
                assert_eq!(resource["name"][0]["family"], "SeriesA");
                assert_eq!(resource["name"][0]["given"][0], "Title1");
                assert_eq!(entry.full_url, "https://madie.cms.gov/Patient/NEW123");
                assert_eq!(entry.request.url, "Patient/NEW123");
                continue;
            }
            for field in ["subject", "beneficiary", "patient"] {
                if let Some(reference) = resource.get(field) {
                    assert_ne!(
                        reference["reference"], old_reference,
                        "{field} still references the old identity"
                    );
                    assert_eq!(reference["reference"], "Patient/NEW123", "{field}");
                }
            }
        }
        assert_eq!(patients, 1);
        assert_eq!(clone.len(), builder.len());
        assert_eq!(clone.patient_id().as_str(), "NEW123");
        assert_eq!(clone.test_case_name(), "SeriesA_Title1");
    }

    #[test]
    fn rekey_does_not_mutate_the_source() {
        let builder = populated_builder();
        let before = builder.to_json().expect("serialize before");

        let _clone = builder
            .reidentify(ResourceId::generate(), "SeriesB", "Title2")
            .expect("reidentify");

        let after = builder.to_json().expect("serialize after");
        assert_eq!(before, after);
    }

    #[test]
    fn rekey_and_source_graphs_do_not_alias() {
        let builder = populated_builder();
        let mut clone = builder
            .reidentify(ResourceId::new("NEW456"), "SeriesC", "Title3")
            .expect("reidentify");

        // Mutating the clone must leave the source untouched.
        clone.add_location(None);
        assert_eq!(clone.len(), builder.len() + 1);
    }

    #[test]
    fn rekey_without_patient_entry_is_an_error() {
        let mut builder = BundleBuilder::new("NoPatient");
        let encounter_id = builder.add_encounter(START, END, EncounterOptions::default());
        builder.add_condition(&encounter_id, ConditionOptions::default());

        let result = builder.reidentify(ResourceId::generate(), "SeriesD", "Title4");
        assert!(matches!(result, Err(BundleError::PatientEntryMissing)));
    }

    #[test]
    fn rekey_leaves_non_enumerated_reference_shapes_alone() {
        // Nested actor references (for example MedicationAdministration's
        // performer.actor) are outside the rewritten field list; a stale
        // identity there survives rekey by design.
        let mut builder = BundleBuilder::new("Boundary");
        builder.add_patient(PatientOptions::default());
        let old_id = builder.patient_id().to_string();
        builder.push_resource(serde_json::json!({
            "resourceType": "Observation",
            "id": "obs-performer",
            "subject": { "reference": format!("Patient/{old_id}") },
            "performer": [{ "reference": format!("Patient/{old_id}") }]
        }));

        let clone = builder
            .reidentify(ResourceId::new("NEW789"), "SeriesE", "Title5")
            .expect("reidentify");

        let observation = &clone.bundle().entry[2].resource;
        assert_eq!(observation["subject"]["reference"], "Patient/NEW789");
        assert_eq!(
            observation["performer"][0]["reference"],
            format!("Patient/{old_id}")
        );
    }

    #[test]
    fn measure_report_after_rekey_counts_the_clone_entries() {
        let builder = populated_builder();
        let mut clone = builder
            .reidentify(ResourceId::new("NEWMR1"), "SeriesF", "Title6")
            .expect("reidentify");
        let before = clone.len();
        clone.add_measure_report(
            "rekeyed case",
            "https://madie.cms.gov/Measure/TestMeasure",
            "2022-01-01",
            "2022-01-31",
            &[("initialPopulation", 1)],
        );
        assert_eq!(clone.len(), before + 1);
        let report = &clone.bundle().entry[before].resource;
        assert_eq!(
            report["evaluatedResource"]
                .as_array()
                .expect("evaluated")
                .len(),
            before
        );
        assert_eq!(report["contained"][0]["parameter"][0]["valueString"], "NEWMR1");
    }

    #[test]
    fn simple_observation_rekey_round_trip() {
        let mut builder = BundleBuilder::new("RekeySimple");
        builder.add_patient(PatientOptions::default());
        let encounter_id = builder.add_encounter(START, END, EncounterOptions::default());
        builder.add_simple_observation(&encounter_id, SimpleObservationOptions::default());
        let old_reference = format!("Patient/{}", builder.patient_id());

        let clone = builder
            .reidentify(ResourceId::new("NEWSIMPLE"), "SeriesG", "Title7")
            .expect("reidentify");
        let serialized = clone.to_json().expect("serialize clone");
        assert!(!serialized.contains(&old_reference));
    }
}
