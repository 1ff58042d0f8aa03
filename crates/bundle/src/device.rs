//! Device factory operation.

use serde_json::json;
use terminology::{code_systems, extensions, Coding, Profile};

use crate::builder::ResourceSet;
use crate::{BundleBuilder, ResourceId};

impl BundleBuilder {
    /// Add a patient-scoped Device (ventilator by default). Returns the
    /// device id.
    pub fn add_device(&mut self, device_type: Option<Coding>) -> ResourceId {
        let device_id = ResourceId::generate();

        let device_type = device_type
            .unwrap_or_else(|| Coding::new(code_systems::SNOMED, "706172005", "Ventilator"));

        let device = json!({
            "resourceType": "Device",
            "id": device_id.as_str(),
            "meta": { "profile": [Profile::Device.url()] },
            "extension": [
                {
                    "url": extensions::DEVICE_NOTE,
                    "valueAnnotation": { "text": "Device in good working condition" }
                }
            ],
            "status": "active",
            "expirationDate": "2025-12-31",
            "lotNumber": "LOT-2022-001",
            "serialNumber": "SN-12345678",
            "modelNumber": "MODEL-V2000",
            "partNumber": "PART-001",
            "type": device_type.concept(),
            "patient": { "reference": format!("Patient/{}", self.patient_id()) },
            "parent": { "reference": "Device/parent-device-001" }
        });

        self.commit(ResourceSet::new(device))
    }
}
