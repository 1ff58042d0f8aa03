//! FHIR extension URLs used by generated resources.

// US Core
pub const US_CORE_RACE: &str = "http://hl7.org/fhir/us/core/StructureDefinition/us-core-race";
pub const US_CORE_ETHNICITY: &str =
    "http://hl7.org/fhir/us/core/StructureDefinition/us-core-ethnicity";
pub const US_CORE_SEX: &str = "http://hl7.org/fhir/us/core/StructureDefinition/us-core-sex";

// QICore
pub const QICORE_DO_NOT_PERFORM_REASON: &str =
    "http://hl7.org/fhir/us/qicore/StructureDefinition/qicore-doNotPerformReason";

// FHIR core
pub const OBSERVATION_BODY_POSITION: &str =
    "http://hl7.org/fhir/StructureDefinition/observation-bodyPosition";
pub const PROCEDURE_APPROACH_BODY_STRUCTURE: &str =
    "http://hl7.org/fhir/StructureDefinition/procedure-approachBodyStructure";
pub const DIAGNOSTIC_REPORT_LOCATION_PERFORMED: &str =
    "http://hl7.org/fhir/StructureDefinition/diagnosticReport-locationPerformed";
pub const LOCATION_BOUNDARY_GEOJSON: &str =
    "http://hl7.org/fhir/StructureDefinition/location-boundary-geojson";
pub const DEVICE_NOTE: &str = "http://hl7.org/fhir/StructureDefinition/device-note";

// CQF Measures
pub const CQF_INPUT_PARAMETERS: &str =
    "http://hl7.org/fhir/StructureDefinition/cqf-inputParameters";
pub const CQFM_TEST_CASE_DESCRIPTION: &str =
    "http://hl7.org/fhir/us/cqfmeasures/StructureDefinition/cqfm-testCaseDescription";
pub const CQFM_IS_TEST_CASE: &str =
    "http://hl7.org/fhir/us/cqfmeasures/StructureDefinition/cqfm-isTestCase";
