// Code generated by familiar-structgen. DO NOT EDIT.
// Source paths: tests/fixtures/marshal/example.json:tests/fixtures/marshal/home.json

#[allow(non_camel_case_types, non_snake_case, unused_imports, unused_mut, unused_variables, dead_code, clippy::all)]
pub mod models {
    use serde::{Deserialize, Serialize};
    use serde::ser::SerializeMap;
    use serde::ser::Error as _;
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

    /// Address_002a36a5
    #[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
    pub struct Address_002a36a5 {
        #[serde(rename = "county", default, skip_serializing_if = "Option::is_none")]
        pub county: Option<String>,
    }

    /// Address_c620f3c4
    #[derive(Debug, Clone, Default, PartialEq)]
    pub struct Address_c620f3c4 {
        // json: "line1"
        pub line1: String,
        // json: "line2,omitempty"
        pub line2: Option<String>,
        // json: "line3"
        pub line3: String,
        line1_required_fault: Option<FieldRequired>,
        line3_required_fault: Option<FieldRequired>,
    }

    /// Example
    #[derive(Debug, Clone, Default, PartialEq)]
    pub struct Example {
        // json: "address"
        pub address: Option<Box<Address_002a36a5>>,
        // json: "name"
        pub name: String,
        // json: "ownerID,omitempty"
        pub owner_id: Option<String>,
        // json: "ownerId,omitempty"
        pub owner_id_2: Option<String>,
        address_required_fault: Option<FieldRequired>,
        name_required_fault: Option<FieldRequired>,
    }

    /// Home
    #[derive(Debug, Clone, Default, PartialEq)]
    pub struct Home {
        // json: "address,omitempty"
        pub address: Option<Box<Address_c620f3c4>>,
        // json: "name,omitempty"
        pub name: Option<String>,
        pub additional_properties: BTreeMap<String, String>,
    }

    impl Serialize for Address_c620f3c4 {
        fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
        where
            S: serde::Serializer,
        {
            let mut map = serializer.serialize_map(None)?;
            map.serialize_entry("line1", &self.line1)?;
            if let Some(value) = &self.line2 {
                map.serialize_entry("line2", value)?;
            }
            map.serialize_entry("line3", &self.line3)?;
            map.end()
        }
    }

    impl<'de> Deserialize<'de> for Address_c620f3c4 {
        fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
        where
            D: serde::Deserializer<'de>,
        {
            let raw = BTreeMap::<String, serde_json::Value>::deserialize(deserializer)?;
            let mut record = Address_c620f3c4::default();
            let mut line1_received = false;
            let mut line3_received = false;
            for (key, value) in raw {
                match key.as_str() {
                    "line1" => {
                        line1_received = true;
                        record.line1 = serde_json::from_value(value).map_err(D::Error::custom)?;
                    }
                    "line2" => {
                        record.line2 = serde_json::from_value(value).map_err(D::Error::custom)?;
                    }
                    "line3" => {
                        line3_received = true;
                        record.line3 = serde_json::from_value(value).map_err(D::Error::custom)?;
                    }
                    _ => {}
                }
            }
            if !line1_received {
                record.line1_required_fault = Some(FieldRequired { field: "line1" });
            }
            if !line3_received {
                record.line3_required_fault = Some(FieldRequired { field: "line3" });
            }
            Ok(record)
        }
    }

    impl Address_c620f3c4 {
        /// Required fields missing from the decoded payload
        pub fn validate(&self) -> Vec<FieldRequired> {
            let mut faults = Vec::new();
            if let Some(fault) = &self.line1_required_fault {
                faults.push(fault.clone());
            }
            if let Some(fault) = &self.line3_required_fault {
                faults.push(fault.clone());
            }
            faults
        }
    }

    impl Serialize for Example {
        fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
        where
            S: serde::Serializer,
        {
            let mut map = serializer.serialize_map(None)?;
            match &self.address {
                Some(value) => map.serialize_entry("address", value)?,
                None => return Err(S::Error::custom("address is a required field")),
            }
            map.serialize_entry("name", &self.name)?;
            if let Some(value) = &self.owner_id {
                map.serialize_entry("ownerID", value)?;
            }
            if let Some(value) = &self.owner_id_2 {
                map.serialize_entry("ownerId", value)?;
            }
            map.end()
        }
    }

    impl<'de> Deserialize<'de> for Example {
        fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
        where
            D: serde::Deserializer<'de>,
        {
            let raw = BTreeMap::<String, serde_json::Value>::deserialize(deserializer)?;
            let mut record = Example::default();
            let mut address_received = false;
            let mut name_received = false;
            for (key, value) in raw {
                match key.as_str() {
                    "address" => {
                        address_received = true;
                        record.address = serde_json::from_value(value).map_err(D::Error::custom)?;
                    }
                    "name" => {
                        name_received = true;
                        record.name = serde_json::from_value(value).map_err(D::Error::custom)?;
                    }
                    "ownerID" => {
                        record.owner_id = serde_json::from_value(value).map_err(D::Error::custom)?;
                    }
                    "ownerId" => {
                        record.owner_id_2 = serde_json::from_value(value).map_err(D::Error::custom)?;
                    }
                    _ => {}
                }
            }
            if !address_received {
                record.address_required_fault = Some(FieldRequired { field: "address" });
            }
            if !name_received {
                record.name_required_fault = Some(FieldRequired { field: "name" });
            }
            Ok(record)
        }
    }

    impl Example {
        /// Required fields missing from the decoded payload
        pub fn validate(&self) -> Vec<FieldRequired> {
            let mut faults = Vec::new();
            if let Some(fault) = &self.address_required_fault {
                faults.push(fault.clone());
            }
            if let Some(fault) = &self.name_required_fault {
                faults.push(fault.clone());
            }
            faults
        }
    }

    impl Serialize for Home {
        fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
        where
            S: serde::Serializer,
        {
            let mut map = serializer.serialize_map(None)?;
            if let Some(value) = &self.address {
                map.serialize_entry("address", value)?;
            }
            if let Some(value) = &self.name {
                map.serialize_entry("name", value)?;
            }
            for (key, value) in &self.additional_properties {
                map.serialize_entry(key, value)?;
            }
            map.end()
        }
    }

    impl<'de> Deserialize<'de> for Home {
        fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
        where
            D: serde::Deserializer<'de>,
        {
            let raw = BTreeMap::<String, serde_json::Value>::deserialize(deserializer)?;
            let mut record = Home::default();
            for (key, value) in raw {
                match key.as_str() {
                    "address" => {
                        record.address = serde_json::from_value(value).map_err(D::Error::custom)?;
                    }
                    "name" => {
                        record.name = serde_json::from_value(value).map_err(D::Error::custom)?;
                    }
                    _ => {
                        let value = serde_json::from_value(value).map_err(D::Error::custom)?;
                        record.additional_properties.insert(key, value);
                    }
                }
            }
            Ok(record)
        }
    }

    impl Home {
        /// Required fields missing from the decoded payload
        pub fn validate(&self) -> Vec<FieldRequired> {
            Vec::new()
        }
    }
}
