//! Location factory operation.

use serde_json::json;
use terminology::{code_systems, extensions, Coding, Profile};

use crate::builder::ResourceSet;
use crate::{BundleBuilder, ResourceId};

impl BundleBuilder {
    /// Add a Location resource. Defaults to a trauma critical care unit
    /// (HSLOC 1025-6). Returns the location id.
    pub fn add_location(&mut self, location_type: Option<Coding>) -> ResourceId {
        let location_id = ResourceId::generate();

        let location_type = location_type.unwrap_or_else(|| {
            Coding::new(code_systems::HSLOC, "1025-6", "Trauma Critical Care")
        });
        let name = location_type
            .display
            .clone()
            .unwrap_or_else(|| "Hospital Location".to_owned());

        let location = json!({
            "resourceType": "Location",
            "id": location_id.as_str(),
            "meta": { "profile": [Profile::Location.url()] },
            "extension": [
                {
                    "url": extensions::LOCATION_BOUNDARY_GEOJSON,
                    "valueAttachment": { "contentType": "application/geo+json" }
                }
            ],
            "status": "active",
            "operationalStatus": {
                "system": code_systems::LOCATION_OPERATIONAL_STATUS,
                "code": "O",
                "display": "Occupied"
            },
            "name": name,
            "alias": ["Main Unit", "Primary Care Unit"],
            "description": "Hospital location for patient care",
            "mode": "instance",
            "type": [location_type.concept()],
            "telecom": [{ "system": "phone", "value": "555-123-4567", "use": "work" }],
            "address": {
                "use": "work",
                "type": "physical",
                "line": ["123 Hospital Drive"],
                "city": "Boston",
                "state": "MA",
                "postalCode": "02101",
                "country": "USA"
            },
            "physicalType": {
                "coding": [{
                    "system": code_systems::LOCATION_PHYSICAL_TYPE,
                    "code": "ro",
                    "display": "Room"
                }]
            },
            "position": { "longitude": -71.0589, "latitude": 42.3601 },
            "managingOrganization": { "reference": "Organization/hospital-org-123" },
            "partOf": { "reference": "Location/parent-location-001" },
            "hoursOfOperation": [
                { "daysOfWeek": ["mon", "tue", "wed", "thu", "fri"], "allDay": true }
            ],
            "availabilityExceptions": "Closed on holidays",
            "endpoint": [{ "reference": "Endpoint/location-endpoint-001" }]
        });

        self.commit(ResourceSet::new(location))
    }
}
