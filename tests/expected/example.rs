// Code generated by familiar-structgen. DO NOT EDIT.
// Source paths: tests/fixtures/example/geo.json:tests/fixtures/example/product.json

#[allow(non_camel_case_types, non_snake_case, unused_imports, unused_mut, unused_variables, dead_code, clippy::all)]
pub mod models {
    use serde::{Deserialize, Serialize};
    use serde::ser::SerializeMap;
    use serde::de::Error as _;
    use std::collections::BTreeMap;

    /// A required field was absent from the decoded payload
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub struct FieldRequired {
        pub field: &'static str,
    }

    impl std::fmt::Display for FieldRequired {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            write!(f, "\"{}\" is required but was not present: field required validation failed", self.field)
        }
    }

    impl std::error::Error for FieldRequired {}

    /// Dimensions
    #[derive(Debug, Clone, Default, PartialEq)]
    pub struct Dimensions {
        // json: "height"
        pub height: f64,
        // json: "length"
        pub length: f64,
        // json: "width"
        pub width: f64,
        height_required_fault: Option<FieldRequired>,
        length_required_fault: Option<FieldRequired>,
        width_required_fault: Option<FieldRequired>,
    }

    /// Location
    ///
    /// A geographical coordinate
    #[derive(Debug, Clone, Default, PartialEq)]
    pub struct Location {
        // json: "latitude"
        pub latitude: f64,
        // json: "longitude"
        pub longitude: f64,
        latitude_required_fault: Option<FieldRequired>,
        longitude_required_fault: Option<FieldRequired>,
    }

    /// Product
    ///
    /// A product from Acme's catalog
    #[derive(Debug, Clone, Default, PartialEq)]
    pub struct Product {
        // json: "dimensions,omitempty"
        pub dimensions: Option<Box<Dimensions>>,
        /// The unique identifier for a product
        // json: "id"
        pub id: i64,
        /// Name of the product
        // json: "name"
        pub name: String,
        // json: "price"
        pub price: f64,
        // json: "tags,omitempty"
        pub tags: Option<Vec<String>>,
        /// Coordinates of the warehouse where the product is located
        // json: "warehouseLocation,omitempty"
        pub warehouse_location: Option<Box<Location>>,
        id_required_fault: Option<FieldRequired>,
        name_required_fault: Option<FieldRequired>,
        price_required_fault: Option<FieldRequired>,
    }

    impl Serialize for Dimensions {
        fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
        where
            S: serde::Serializer,
        {
            let mut map = serializer.serialize_map(None)?;
            map.serialize_entry("height", &self.height)?;
            map.serialize_entry("length", &self.length)?;
            map.serialize_entry("width", &self.width)?;
            map.end()
        }
    }

    impl<'de> Deserialize<'de> for Dimensions {
        fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
        where
            D: serde::Deserializer<'de>,
        {
            let raw = BTreeMap::<String, serde_json::Value>::deserialize(deserializer)?;
            let mut record = Dimensions::default();
            let mut height_received = false;
            let mut length_received = false;
            let mut width_received = false;
            for (key, value) in raw {
                match key.as_str() {
                    "height" => {
                        height_received = true;
                        record.height = serde_json::from_value(value).map_err(D::Error::custom)?;
                    }
                    "length" => {
                        length_received = true;
                        record.length = serde_json::from_value(value).map_err(D::Error::custom)?;
                    }
                    "width" => {
                        width_received = true;
                        record.width = serde_json::from_value(value).map_err(D::Error::custom)?;
                    }
                    _ => {
                        return Err(D::Error::custom(format!("additional property not allowed: \"{}\"", key)));
                    }
                }
            }
            if !height_received {
                record.height_required_fault = Some(FieldRequired { field: "height" });
            }
            if !length_received {
                record.length_required_fault = Some(FieldRequired { field: "length" });
            }
            if !width_received {
                record.width_required_fault = Some(FieldRequired { field: "width" });
            }
            Ok(record)
        }
    }

    impl Dimensions {
        /// Required fields missing from the decoded payload
        pub fn validate(&self) -> Vec<FieldRequired> {
            let mut faults = Vec::new();
            if let Some(fault) = &self.height_required_fault {
                faults.push(fault.clone());
            }
            if let Some(fault) = &self.length_required_fault {
                faults.push(fault.clone());
            }
            if let Some(fault) = &self.width_required_fault {
                faults.push(fault.clone());
            }
            faults
        }
    }

    impl Serialize for Location {
        fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
        where
            S: serde::Serializer,
        {
            let mut map = serializer.serialize_map(None)?;
            map.serialize_entry("latitude", &self.latitude)?;
            map.serialize_entry("longitude", &self.longitude)?;
            map.end()
        }
    }

    impl<'de> Deserialize<'de> for Location {
        fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
        where
            D: serde::Deserializer<'de>,
        {
            let raw = BTreeMap::<String, serde_json::Value>::deserialize(deserializer)?;
            let mut record = Location::default();
            let mut latitude_received = false;
            let mut longitude_received = false;
            for (key, value) in raw {
                match key.as_str() {
                    "latitude" => {
                        latitude_received = true;
                        record.latitude = serde_json::from_value(value).map_err(D::Error::custom)?;
                    }
                    "longitude" => {
                        longitude_received = true;
                        record.longitude = serde_json::from_value(value).map_err(D::Error::custom)?;
                    }
                    _ => {}
                }
            }
            if !latitude_received {
                record.latitude_required_fault = Some(FieldRequired { field: "latitude" });
            }
            if !longitude_received {
                record.longitude_required_fault = Some(FieldRequired { field: "longitude" });
            }
            Ok(record)
        }
    }

    impl Location {
        /// Required fields missing from the decoded payload
        pub fn validate(&self) -> Vec<FieldRequired> {
            let mut faults = Vec::new();
            if let Some(fault) = &self.latitude_required_fault {
                faults.push(fault.clone());
            }
            if let Some(fault) = &self.longitude_required_fault {
                faults.push(fault.clone());
            }
            faults
        }
    }

    impl Serialize for Product {
        fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
        where
            S: serde::Serializer,
        {
            let mut map = serializer.serialize_map(None)?;
            if let Some(value) = &self.dimensions {
                map.serialize_entry("dimensions", value)?;
            }
            map.serialize_entry("id", &self.id)?;
            map.serialize_entry("name", &self.name)?;
            map.serialize_entry("price", &self.price)?;
            if let Some(value) = &self.tags {
                map.serialize_entry("tags", value)?;
            }
            if let Some(value) = &self.warehouse_location {
                map.serialize_entry("warehouseLocation", value)?;
            }
            map.end()
        }
    }

    impl<'de> Deserialize<'de> for Product {
        fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
        where
            D: serde::Deserializer<'de>,
        {
            let raw = BTreeMap::<String, serde_json::Value>::deserialize(deserializer)?;
            let mut record = Product::default();
            let mut id_received = false;
            let mut name_received = false;
            let mut price_received = false;
            for (key, value) in raw {
                match key.as_str() {
                    "dimensions" => {
                        record.dimensions = serde_json::from_value(value).map_err(D::Error::custom)?;
                    }
                    "id" => {
                        id_received = true;
                        record.id = serde_json::from_value(value).map_err(D::Error::custom)?;
                    }
                    "name" => {
                        name_received = true;
                        record.name = serde_json::from_value(value).map_err(D::Error::custom)?;
                    }
                    "price" => {
                        price_received = true;
                        record.price = serde_json::from_value(value).map_err(D::Error::custom)?;
                    }
                    "tags" => {
                        record.tags = serde_json::from_value(value).map_err(D::Error::custom)?;
                    }
                    "warehouseLocation" => {
                        record.warehouse_location = serde_json::from_value(value).map_err(D::Error::custom)?;
                    }
                    _ => {}
                }
            }
            if !id_received {
                record.id_required_fault = Some(FieldRequired { field: "id" });
            }
            if !name_received {
                record.name_required_fault = Some(FieldRequired { field: "name" });
            }
            if !price_received {
                record.price_required_fault = Some(FieldRequired { field: "price" });
            }
            Ok(record)
        }
    }

    impl Product {
        /// Required fields missing from the decoded payload
        pub fn validate(&self) -> Vec<FieldRequired> {
            let mut faults = Vec::new();
            if let Some(fault) = &self.id_required_fault {
                faults.push(fault.clone());
            }
            if let Some(fault) = &self.name_required_fault {
                faults.push(fault.clone());
            }
            if let Some(fault) = &self.price_required_fault {
                faults.push(fault.clone());
            }
            faults
        }
    }
}
