//! Standard healthcare code-system URLs.
//!
//! URL values here are load-bearing: they appear verbatim in generated
//! resources and are matched verbatim by the downstream measure engine.

// Clinical terminologies
pub const SNOMED: &str = "http://snomed.info/sct";
pub const LOINC: &str = "http://loinc.org";
pub const RXNORM: &str = "http://www.nlm.nih.gov/research/umls/rxnorm";
pub const ICD10CM: &str = "http://hl7.org/fhir/sid/icd-10-cm";
pub const CVX: &str = "http://hl7.org/fhir/sid/cvx";
pub const NDC: &str = "http://hl7.org/fhir/sid/ndc";

// CDC/NHSN
pub const HSLOC: &str = "https://www.cdc.gov/nhsn/cdaportal/terminology/codesystem/hsloc.html";
pub const CDCNHSN: &str = "http://cdc.gov/nhsn/cdaportal/terminology/codesystem/cdcnhsn.html";

// HL7 v3 code systems
pub const ACT_CODE: &str = "http://terminology.hl7.org/CodeSystem/v3-ActCode";
pub const ACT_PRIORITY: &str = "http://terminology.hl7.org/CodeSystem/v3-ActPriority";
pub const ROLE_CODE: &str = "http://terminology.hl7.org/CodeSystem/v3-RoleCode";
pub const MARITAL_STATUS: &str = "http://terminology.hl7.org/CodeSystem/v3-MaritalStatus";

/// Observation category codes (laboratory, vital-signs, social-history, ...).
pub const OBSERVATION_CATEGORY: &str =
    "http://terminology.hl7.org/CodeSystem/observation-category";
pub const OBSERVATION_INTERPRETATION: &str =
    "http://terminology.hl7.org/CodeSystem/v3-ObservationInterpretation";

// Condition
pub const CONDITION_CATEGORY: &str = "http://terminology.hl7.org/CodeSystem/condition-category";
pub const US_CORE_CONDITION_CATEGORY: &str =
    "http://hl7.org/fhir/us/core/CodeSystem/condition-category";
pub const CONDITION_CLINICAL_STATUS: &str =
    "http://terminology.hl7.org/CodeSystem/condition-clinical";
pub const CONDITION_VERIFICATION_STATUS: &str =
    "http://terminology.hl7.org/CodeSystem/condition-ver-status";

// Medication
pub const MEDICATION_REQUEST_CATEGORY: &str =
    "http://terminology.hl7.org/CodeSystem/medicationrequest-category";
pub const MEDICATION_ADMIN_CATEGORY: &str =
    "http://terminology.hl7.org/CodeSystem/medication-admin-category";
pub const MEDICATION_ADMIN_PERFORM_FUNCTION: &str =
    "http://terminology.hl7.org/CodeSystem/med-admin-perform-function";
pub const MEDICATION_REQUEST_COURSE_OF_THERAPY: &str =
    "http://terminology.hl7.org/CodeSystem/medicationrequest-course-of-therapy";

// Encounter
pub const DISCHARGE_DISPOSITION: &str =
    "http://terminology.hl7.org/CodeSystem/discharge-disposition";
pub const DIAGNOSIS_ROLE: &str = "http://terminology.hl7.org/CodeSystem/diagnosis-role";

// Coverage
pub const COVERAGE_CLASS: &str = "http://terminology.hl7.org/CodeSystem/coverage-class";
pub const SUBSCRIBER_RELATIONSHIP: &str =
    "http://terminology.hl7.org/CodeSystem/subscriber-relationship";

/// Source of Payment Typology, used by payer-type Coverage codings.
pub const SOPT: &str = "https://nahdo.org/sopt";

// Diagnostic reports
pub const DIAGNOSTIC_SERVICE_SECTION: &str = "http://terminology.hl7.org/CodeSystem/v2-0074";

// Location
pub const LOCATION_PHYSICAL_TYPE: &str =
    "http://terminology.hl7.org/CodeSystem/location-physical-type";
pub const LOCATION_OPERATIONAL_STATUS: &str = "http://terminology.hl7.org/CodeSystem/v2-0116";

// Identifiers
pub const IDENTIFIER_TYPE: &str = "http://terminology.hl7.org/CodeSystem/v2-0203";
pub const NPI: &str = "http://hl7.org/fhir/sid/us-npi";

pub const REFERENCE_RANGE_MEANING: &str =
    "http://terminology.hl7.org/CodeSystem/referencerange-meaning";
pub const DATA_ABSENT_REASON: &str = "http://terminology.hl7.org/CodeSystem/data-absent-reason";
pub const DOSE_RATE_TYPE: &str = "http://terminology.hl7.org/CodeSystem/dose-rate-type";
pub const CONTACT_RELATIONSHIP: &str = "http://terminology.hl7.org/CodeSystem/v2-0131";

/// Unified Code for Units of Measure.
pub const UCUM: &str = "http://unitsofmeasure.org";

/// CDC race and ethnicity code system (US Core race/ethnicity extensions).
pub const RACE_ETHNICITY: &str = "urn:oid:2.16.840.1.113883.6.238";

/// BCP-47 language tags.
pub const LANGUAGE: &str = "urn:ietf:bcp:47";

/// Measure population type codes for MeasureReport groups.
pub const MEASURE_POPULATION: &str = "http://terminology.hl7.org/CodeSystem/measure-population";
