//! Test-case registration and MADiE-compatible export.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use bundle::{BundleBuilder, ResourceId};

use crate::{ExportError, ExportResult};

/// A registered test case: series/title labels, the expected population
/// counts, and the template function producing its bundle.
pub struct TestCase {
    series: String,
    title: String,
    description: String,
    expected_populations: Vec<(String, u32)>,
    build: Box<dyn Fn() -> BundleBuilder>,
}

/// One record of the `.madie` metadata file.
#[derive(Clone, Debug, Serialize, Deserialize)]
struct CaseRecord {
    #[serde(rename = "testCaseId")]
    test_case_id: String,
    #[serde(rename = "patientId")]
    patient_id: String,
    title: String,
    /// Left empty to match the import format; the series is folded into
    /// the title.
    series: String,
    description: String,
}

/// Exports registered test cases into the MADiE import directory layout.
pub struct MadieExporter {
    measure_name: String,
    version: String,
    measure_url: String,
    measurement_period_start: String,
    measurement_period_end: String,
    test_cases: Vec<TestCase>,
}

impl MadieExporter {
    /// Create an exporter for `measure_name`/`version`. The measure URL
    /// and measurement period get defaults that
    /// [`with_measure_url`](Self::with_measure_url) and
    /// [`with_measurement_period`](Self::with_measurement_period) can
    /// override.
    pub fn new(measure_name: impl Into<String>, version: impl Into<String>) -> Self {
        let measure_name = measure_name.into();
        let measure_url = format!("https://madie.cms.gov/Measure/{measure_name}");
        Self {
            measure_name,
            version: version.into(),
            measure_url,
            measurement_period_start: "2022-01-01".to_owned(),
            measurement_period_end: "2022-01-31".to_owned(),
            test_cases: Vec::new(),
        }
    }

    pub fn with_measure_url(mut self, measure_url: impl Into<String>) -> Self {
        self.measure_url = measure_url.into();
        self
    }

    pub fn with_measurement_period(
        mut self,
        start: impl Into<String>,
        end: impl Into<String>,
    ) -> Self {
        self.measurement_period_start = start.into();
        self.measurement_period_end = end.into();
        self
    }

    /// Register a test case. When `expected_populations` is empty the
    /// counts are inferred from the series name: a series containing
    /// "Fail" expects an initial population of 0, anything else 1.
    pub fn add_test_case(
        &mut self,
        series: impl Into<String>,
        title: impl Into<String>,
        description: impl Into<String>,
        expected_populations: Vec<(String, u32)>,
        build: impl Fn() -> BundleBuilder + 'static,
    ) {
        let series = series.into();
        let expected_populations = if expected_populations.is_empty() {
            let count = u32::from(!series.contains("Fail"));
            vec![("initialPopulation".to_owned(), count)]
        } else {
            expected_populations
        };
        self.test_cases.push(TestCase {
            series,
            title: title.into(),
            description: description.into(),
            expected_populations,
            build: Box::new(build),
        });
    }

    pub fn len(&self) -> usize {
        self.test_cases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.test_cases.is_empty()
    }

    /// Directory name the export lands in when no explicit path is given.
    pub fn default_output_dir(&self) -> String {
        format!(
            "{}-v{}-FHIR-TestCases",
            self.measure_name, self.version
        )
    }

    /// Export every registered test case under `output_dir`, replacing any
    /// previous export at that path. Returns the output directory.
    pub fn export(&self, output_dir: impl AsRef<Path>) -> ExportResult<PathBuf> {
        let output_dir = output_dir.as_ref();
        if output_dir.exists() {
            fs::remove_dir_all(output_dir).map_err(ExportError::Cleanup)?;
        }
        fs::create_dir_all(output_dir).map_err(ExportError::DirCreation)?;

        info!(
            measure = %self.measure_name,
            version = %self.version,
            cases = self.test_cases.len(),
            period_start = %self.measurement_period_start,
            period_end = %self.measurement_period_end,
            "exporting test cases"
        );

        let mut records: Vec<CaseRecord> = Vec::with_capacity(self.test_cases.len());

        for (index, case) in self.test_cases.iter().enumerate() {
            info!(
                case = index + 1,
                series = %case.series,
                title = %case.title,
                "generating test case"
            );

            // The fresh patient uuid is also the case directory name.
            let patient_id = Uuid::new_v4().to_string();
            let case_dir = output_dir.join(&patient_id);
            fs::create_dir_all(&case_dir).map_err(ExportError::DirCreation)?;

            let template = (case.build)();
            let mut rekeyed = template.reidentify(
                ResourceId::new(patient_id.clone()),
                &case.series,
                &case.title,
            )?;

            let populations: Vec<(&str, u32)> = case
                .expected_populations
                .iter()
                .map(|(key, count)| (key.as_str(), *count))
                .collect();
            rekeyed.add_measure_report(
                &case.description,
                &self.measure_url,
                &self.measurement_period_start,
                &self.measurement_period_end,
                &populations,
            );

            let filename = format!(
                "{}-v{}-{}{}.json",
                self.measure_name, self.version, case.series, case.title
            );
            rekeyed.save(case_dir.join(filename))?;

            records.push(CaseRecord {
                test_case_id: test_case_id(),
                patient_id,
                title: format!("{}{}", case.series, case.title),
                series: String::new(),
                description: case.description.clone(),
            });
        }

        self.write_readme(&output_dir.join("README.txt"), &records)?;

        let metadata = serde_json::to_string(&records)?;
        fs::write(output_dir.join(".madie"), metadata).map_err(ExportError::FileWrite)?;

        info!(path = %output_dir.display(), "export complete");
        Ok(output_dir.to_path_buf())
    }

    fn write_readme(&self, path: &Path, records: &[CaseRecord]) -> ExportResult<()> {
        let mut readme = String::from(
            "The purpose of this file is to allow users to view the mapping of test case names to their test case UUIDs.\n\
             In order to find a specific test case file in the export, first locate the test case name in this document\n\
             and then use the associated UUID to find the name of the folder in the export.\n\n",
        );
        for (index, record) in records.iter().enumerate() {
            readme.push_str(&format!(
                "Case # {} - {} = {}-{}\n",
                index + 1,
                record.patient_id,
                record.series,
                record.title
            ));
        }
        fs::write(path, readme).map_err(ExportError::FileWrite)
    }
}

/// 24-hex test-case id, the shape the importer assigns to cases it
/// creates itself.
fn test_case_id() -> String {
    let mut simple = Uuid::new_v4().simple().to_string();
    simple.truncate(24);
    simple
}

#[cfg(test)]
mod tests {
    use super::*;
    use bundle::{EncounterOptions, PatientOptions};
    use serde_json::Value;

    fn encounter_template() -> BundleBuilder {
        let mut builder = BundleBuilder::new("Template");
        builder.add_patient(PatientOptions::default());
        builder.add_encounter(
            "2022-01-05T08:00:00.000Z",
            "2022-01-10T12:00:00.000Z",
            EncounterOptions::default(),
        );
        builder
    }

    fn exporter_with_two_cases() -> MadieExporter {
        let mut exporter = MadieExporter::new("TestMeasure", "0.0.000");
        exporter.add_test_case(
            "QualEncPass",
            "EncAmbulatory",
            "Ambulatory encounter qualifies",
            Vec::new(),
            encounter_template,
        );
        exporter.add_test_case(
            "QualEncFail",
            "NoEncounter",
            "Missing encounter does not qualify",
            Vec::new(),
            || {
                let mut builder = BundleBuilder::new("Template");
                builder.add_patient(PatientOptions::default());
                builder
            },
        );
        exporter
    }

    #[test]
    fn export_writes_one_directory_per_case_plus_metadata() {
        let exporter = exporter_with_two_cases();
        let tmp = tempfile::tempdir().expect("tempdir");
        let out = exporter
            .export(tmp.path().join(exporter.default_output_dir()))
            .expect("export");

        assert!(out.join("README.txt").is_file());
        assert!(out.join(".madie").is_file());

        let case_dirs: Vec<_> = fs::read_dir(&out)
            .expect("read output dir")
            .filter_map(Result::ok)
            .filter(|entry| entry.path().is_dir())
            .collect();
        assert_eq!(case_dirs.len(), 2);
    }

    #[test]
    fn exported_bundle_is_rekeyed_to_its_directory_uuid() {
        let exporter = exporter_with_two_cases();
        let tmp = tempfile::tempdir().expect("tempdir");
        let out = exporter.export(tmp.path().join("out")).expect("export");

        let metadata: Vec<Value> = serde_json::from_str(
            &fs::read_to_string(out.join(".madie")).expect("read .madie"),
        )
        .expect("parse .madie");
        assert_eq!(metadata.len(), 2);

        for record in &metadata {
            let patient_id = record["patientId"].as_str().expect("patientId");
            assert_eq!(record["series"], "");
            assert_eq!(record["testCaseId"].as_str().expect("testCaseId").len(), 24);

            let case_dir = out.join(patient_id);
            let bundle_file = fs::read_dir(&case_dir)
                .expect("read case dir")
                .filter_map(Result::ok)
                .find(|entry| entry.path().extension().map_or(false, |ext| ext == "json"))
                .expect("bundle file");
            let name = bundle_file.file_name();
            let name = name.to_string_lossy();
            assert!(name.starts_with("TestMeasure-v0.0.000-"), "{name}");

            let parsed: Value = serde_json::from_str(
                &fs::read_to_string(bundle_file.path()).expect("read bundle"),
            )
            .expect("parse bundle");
            let entries = parsed["entry"].as_array().expect("entries");
            let patient = entries
                .iter()
                .find(|entry| entry["resource"]["resourceType"] == "Patient")
                .expect("patient entry");
            assert_eq!(patient["resource"]["id"], patient_id);

            // MeasureReport is appended last and inventories the rest.
            let last = entries.last().expect("last entry");
            assert_eq!(last["resource"]["resourceType"], "MeasureReport");
            assert_eq!(
                last["resource"]["evaluatedResource"]
                    .as_array()
                    .expect("evaluated")
                    .len(),
                entries.len() - 1
            );
        }
    }

    #[test]
    fn fail_series_infers_zero_initial_population() {
        let exporter = exporter_with_two_cases();
        let tmp = tempfile::tempdir().expect("tempdir");
        let out = exporter.export(tmp.path().join("out")).expect("export");

        let metadata: Vec<Value> = serde_json::from_str(
            &fs::read_to_string(out.join(".madie")).expect("read .madie"),
        )
        .expect("parse .madie");

        for record in &metadata {
            let title = record["title"].as_str().expect("title");
            let expected = if title.contains("Fail") { 0 } else { 1 };

            let patient_id = record["patientId"].as_str().expect("patientId");
            let case_dir = out.join(patient_id);
            let bundle_file = fs::read_dir(&case_dir)
                .expect("read case dir")
                .filter_map(Result::ok)
                .next()
                .expect("bundle file");
            let parsed: Value = serde_json::from_str(
                &fs::read_to_string(bundle_file.path()).expect("read bundle"),
            )
            .expect("parse bundle");
            let report = parsed["entry"]
                .as_array()
                .expect("entries")
                .last()
                .expect("last entry");
            assert_eq!(
                report["resource"]["group"][0]["population"][0]["count"], expected,
                "{title}"
            );
        }
    }

    #[test]
    fn export_replaces_a_previous_run() {
        let exporter = exporter_with_two_cases();
        let tmp = tempfile::tempdir().expect("tempdir");
        let target = tmp.path().join("out");
        exporter.export(&target).expect("first export");
        let out = exporter.export(&target).expect("second export");

        let case_dirs: Vec<_> = fs::read_dir(&out)
            .expect("read output dir")
            .filter_map(Result::ok)
            .filter(|entry| entry.path().is_dir())
            .collect();
        // Old case directories from the first run are gone.
        assert_eq!(case_dirs.len(), 2);
    }

    #[test]
    fn readme_lists_every_case() {
        let exporter = exporter_with_two_cases();
        let tmp = tempfile::tempdir().expect("tempdir");
        let out = exporter.export(tmp.path().join("out")).expect("export");

        let readme = fs::read_to_string(out.join("README.txt")).expect("read README");
        assert!(readme.contains("Case # 1 - "));
        assert!(readme.contains("Case # 2 - "));
        assert!(readme.contains("-QualEncPassEncAmbulatory"));
        assert!(readme.contains("-QualEncFailNoEncounter"));
    }
}
