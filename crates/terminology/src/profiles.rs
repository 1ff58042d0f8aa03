//! Canonical profile URLs attached to generated resources.
//!
//! Covers the QICore 6.0.0 profile family plus the US Core and CQF Measures
//! profiles the generator needs for resources QICore does not profile
//! itself. Each generated resource carries exactly one of these URLs in
//! `meta.profile`.

/// Base URL for QICore 6.0.0 structure definitions.
pub const QICORE_BASE: &str = "http://hl7.org/fhir/us/qicore/StructureDefinition";

/// Base URL for US Core structure definitions.
pub const USCORE_BASE: &str = "http://hl7.org/fhir/us/core/StructureDefinition";

/// Base URL for CQF Measures structure definitions.
pub const CQFM_BASE: &str = "http://hl7.org/fhir/us/cqfmeasures/StructureDefinition";

/// The closed set of profiles the resource factory can attach.
///
/// Observation and the "not done"/"not requested" shapes are distinct
/// variants here because they are distinct canonical URLs, not parameters
/// of one profile.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Profile {
    Patient,
    Encounter,
    ConditionProblemsHealthConcerns,
    ConditionEncounterDiagnosis,
    Coverage,
    Location,
    ObservationLab,
    ObservationClinicalResult,
    SimpleObservation,
    Medication,
    MedicationRequest,
    MedicationNotRequested,
    MedicationAdministration,
    Procedure,
    DiagnosticReportLab,
    DiagnosticReportNote,
    ServiceRequest,
    ServiceNotRequested,
    Device,
    Practitioner,
    /// US Core profile; QICore has no Specimen profile of its own.
    Specimen,
    /// US Core vital signs panel profile (blood pressure and friends).
    VitalSigns,
    /// CQF Measures test-case MeasureReport profile.
    TestCaseMeasureReport,
}

impl Profile {
    /// The canonical URL for this profile.
    pub fn url(self) -> &'static str {
        match self {
            Profile::Patient => "http://hl7.org/fhir/us/qicore/StructureDefinition/qicore-patient",
            Profile::Encounter => {
                "http://hl7.org/fhir/us/qicore/StructureDefinition/qicore-encounter"
            }
            Profile::ConditionProblemsHealthConcerns => {
                "http://hl7.org/fhir/us/qicore/StructureDefinition/qicore-condition-problems-health-concerns"
            }
            Profile::ConditionEncounterDiagnosis => {
                "http://hl7.org/fhir/us/qicore/StructureDefinition/qicore-condition-encounter-diagnosis"
            }
            Profile::Coverage => {
                "http://hl7.org/fhir/us/qicore/StructureDefinition/qicore-coverage"
            }
            Profile::Location => {
                "http://hl7.org/fhir/us/qicore/StructureDefinition/qicore-location"
            }
            Profile::ObservationLab => {
                "http://hl7.org/fhir/us/qicore/StructureDefinition/qicore-observation-lab"
            }
            Profile::ObservationClinicalResult => {
                "http://hl7.org/fhir/us/qicore/StructureDefinition/qicore-observation-clinical-result"
            }
            Profile::SimpleObservation => {
                "http://hl7.org/fhir/us/qicore/StructureDefinition/qicore-simple-observation"
            }
            Profile::Medication => {
                "http://hl7.org/fhir/us/qicore/StructureDefinition/qicore-medication"
            }
            Profile::MedicationRequest => {
                "http://hl7.org/fhir/us/qicore/StructureDefinition/qicore-medicationrequest"
            }
            Profile::MedicationNotRequested => {
                "http://hl7.org/fhir/us/qicore/StructureDefinition/qicore-medicationnotrequested"
            }
            Profile::MedicationAdministration => {
                "http://hl7.org/fhir/us/qicore/StructureDefinition/qicore-medicationadministration"
            }
            Profile::Procedure => {
                "http://hl7.org/fhir/us/qicore/StructureDefinition/qicore-procedure"
            }
            Profile::DiagnosticReportLab => {
                "http://hl7.org/fhir/us/qicore/StructureDefinition/qicore-diagnosticreport-lab"
            }
            Profile::DiagnosticReportNote => {
                "http://hl7.org/fhir/us/qicore/StructureDefinition/qicore-diagnosticreport-note"
            }
            Profile::ServiceRequest => {
                "http://hl7.org/fhir/us/qicore/StructureDefinition/qicore-servicerequest"
            }
            Profile::ServiceNotRequested => {
                "http://hl7.org/fhir/us/qicore/StructureDefinition/qicore-servicenotrequested"
            }
            Profile::Device => "http://hl7.org/fhir/us/qicore/StructureDefinition/qicore-device",
            Profile::Practitioner => {
                "http://hl7.org/fhir/us/qicore/StructureDefinition/qicore-practitioner"
            }
            Profile::Specimen => {
                "http://hl7.org/fhir/us/core/StructureDefinition/us-core-specimen"
            }
            Profile::VitalSigns => {
                "http://hl7.org/fhir/us/core/StructureDefinition/us-core-vital-signs"
            }
            Profile::TestCaseMeasureReport => {
                "http://hl7.org/fhir/us/cqfmeasures/StructureDefinition/test-case-cqfm"
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn qicore_urls_share_the_qicore_base() {
        for profile in [
            Profile::Patient,
            Profile::Encounter,
            Profile::ObservationLab,
            Profile::MedicationNotRequested,
            Profile::ServiceNotRequested,
        ] {
            assert!(profile.url().starts_with(QICORE_BASE), "{:?}", profile);
        }
    }

    #[test]
    fn non_qicore_profiles_use_their_own_base() {
        assert!(Profile::Specimen.url().starts_with(USCORE_BASE));
        assert!(Profile::VitalSigns.url().starts_with(USCORE_BASE));
        assert!(Profile::TestCaseMeasureReport.url().starts_with(CQFM_BASE));
    }

    #[test]
    fn negation_variants_have_distinct_urls() {
        assert_ne!(
            Profile::MedicationRequest.url(),
            Profile::MedicationNotRequested.url()
        );
        assert_ne!(
            Profile::ServiceRequest.url(),
            Profile::ServiceNotRequested.url()
        );
    }
}
