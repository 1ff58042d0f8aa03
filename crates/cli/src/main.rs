//! Command-line front end for generating a measure test-case export.
//!
//! The `generate` command builds a small demonstration suite (a qualifying
//! encounter, a non-qualifying case and a negation case) and writes the
//! import-ready directory tree. Protocol-specific suites register their
//! own cases against the same library surface.

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use bundle::{
    BundleBuilder, ConditionOptions, EncounterOptions, ObservationOptions, PatientOptions,
};
use export::MadieExporter;
use terminology::{code_systems, Coding};

#[derive(Parser)]
#[command(name = "testgen")]
#[command(about = "QICore measure test-case generator")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate the demonstration test-case export
    Generate {
        /// Measure name used in file and directory names
        #[arg(long, default_value = "DemoMeasure")]
        measure_name: String,
        /// Measure version string
        #[arg(long, default_value = "0.0.000")]
        version: String,
        /// Output directory (defaults to <measure>-v<version>-FHIR-TestCases)
        #[arg(long)]
        output_dir: Option<String>,
        /// Measurement period start (YYYY-MM-DD)
        #[arg(long, default_value = "2022-01-01")]
        period_start: String,
        /// Measurement period end (YYYY-MM-DD)
        #[arg(long, default_value = "2022-01-31")]
        period_end: String,
    },
}

const ENCOUNTER_START: &str = "2022-01-05T08:00:00.000Z";
const ENCOUNTER_END: &str = "2022-01-10T12:00:00.000Z";

/// Qualifying case: an inpatient encounter with a documented condition,
/// a glucose observation and coverage for the period.
fn qualifying_encounter() -> BundleBuilder {
    let mut builder = BundleBuilder::new("QualifyingEncounter");
    builder.add_patient(PatientOptions::default());
    let encounter_id = builder.add_encounter(
        ENCOUNTER_START,
        ENCOUNTER_END,
        EncounterOptions {
            class_code: "IMP".to_owned(),
            ..EncounterOptions::default()
        },
    );
    builder.add_condition(&encounter_id, ConditionOptions::default());
    builder.add_observation(&encounter_id, ObservationOptions::default());
    builder.add_coverage("2022-01-01", "2022-12-31");
    builder
}

/// Non-qualifying case: the encounter ends before the measurement period.
fn encounter_outside_period() -> BundleBuilder {
    let mut builder = BundleBuilder::new("EncounterOutsidePeriod");
    builder.add_patient(PatientOptions::default());
    builder.add_encounter(
        "2021-11-05T08:00:00.000Z",
        "2021-11-10T12:00:00.000Z",
        EncounterOptions {
            class_code: "IMP".to_owned(),
            ..EncounterOptions::default()
        },
    );
    builder
}

/// Negation case: insulin was contraindicated and the lab panel declined.
fn negation_documented() -> BundleBuilder {
    let mut builder = BundleBuilder::new("NegationDocumented");
    builder.add_patient(PatientOptions::default());
    let encounter_id = builder.add_encounter(
        ENCOUNTER_START,
        ENCOUNTER_END,
        EncounterOptions {
            class_code: "IMP".to_owned(),
            ..EncounterOptions::default()
        },
    );
    builder.add_medication_not_requested(&encounter_id, "2022-01-06T09:00:00.000Z", None);
    builder.add_service_not_requested(
        &encounter_id,
        "2022-01-06T09:00:00.000Z",
        Some(Coding::new(
            code_systems::LOINC,
            "24323-8",
            "Comprehensive metabolic 2000 panel - Serum or Plasma",
        )),
    );
    builder
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Generate {
            measure_name,
            version,
            output_dir,
            period_start,
            period_end,
        } => {
            let mut exporter = MadieExporter::new(&measure_name, &version)
                .with_measurement_period(period_start, period_end);

            exporter.add_test_case(
                "QualEncPass",
                "Inpatient",
                "Inpatient encounter inside the measurement period qualifies",
                Vec::new(),
                qualifying_encounter,
            );
            exporter.add_test_case(
                "QualEncFail",
                "OutsidePeriod",
                "Encounter outside the measurement period does not qualify",
                Vec::new(),
                encounter_outside_period,
            );
            exporter.add_test_case(
                "NegationPass",
                "MedAndServiceDeclined",
                "Documented medication and service negation qualifies",
                Vec::new(),
                negation_documented,
            );

            let output_dir = output_dir.unwrap_or_else(|| exporter.default_output_dir());
            let path = exporter
                .export(&output_dir)
                .context("failed to export test cases")?;
            println!(
                "Exported {} test cases to {}",
                exporter.len(),
                path.display()
            );
        }
    }

    Ok(())
}
