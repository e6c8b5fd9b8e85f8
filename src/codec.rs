//! Reference Codec
//!
//! Applies the rules of the generated writer, reader and validator directly
//! to `serde_json::Value` data, driven by the consolidated record set. The
//! `validate` subcommand uses it to check instance documents without
//! compiling the generated code.
//!
//! Reader rules:
//! - declared keys decode into their field; `null` leaves optional and record fields unset
//! - a required non-record field that is absent takes its type's default
//! - every absent required field leaves a [`RequiredFieldFault`]; decoding still succeeds
//! - unknown keys are collected, rejected or dropped per the record's policy
//!
//! Writer rules: declared fields in field-name order, unset optional fields
//! skipped, then collected extra keys. An unset required record field fails.

use std::collections::{BTreeMap, HashMap};

use serde_json::{Map, Value};
use thiserror::Error;

use crate::graph::{Consolidated, ExtraKeys, Field, Primitive, StructId, TypeId, TypeKind};
use crate::schema::escape_pointer;

/// Errors while decoding an instance document
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DecodeError {
    #[error("No record or alias named '{name}'")]
    UnknownRecord { name: String },

    #[error("Expected {expected} at \"{path}\"")]
    TypeMismatch { path: String, expected: String },

    #[error("additional property not allowed: \"{key}\" in {record}")]
    AdditionalPropertyNotAllowed { record: String, key: String },

    #[error("Record {record} has a field without a type")]
    Detached { record: String },
}

/// Errors while encoding a decoded instance
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EncodeError {
    #[error("{field} is a required field")]
    RequiredField { record: String, field: String },

    #[error("Record {record} has a field without a type")]
    Detached { record: String },
}

/// A required field absent from the decoded payload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequiredFieldFault {
    pub record: String,
    pub field: String,
}

impl std::fmt::Display for RequiredFieldFault {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "\"{}\" is required but was not present: field required validation failed",
            self.field
        )
    }
}

/// A decoded value, shaped by the type it was decoded as
#[derive(Debug, Clone, PartialEq)]
pub enum Decoded {
    Record(RecordInstance),
    Array(Vec<Decoded>),
    Map(BTreeMap<String, Decoded>),
    Value(Value),
}

impl Decoded {
    pub fn as_record(&self) -> Option<&RecordInstance> {
        match self {
            Self::Record(record) => Some(record),
            _ => None,
        }
    }
}

/// One decoded record
#[derive(Debug, Clone, PartialEq)]
pub struct RecordInstance {
    pub record: StructId,
    /// Emitted record name
    pub name: String,
    /// Set fields keyed by wire name
    pub fields: BTreeMap<String, Decoded>,
    /// Collected extra keys
    pub additional: BTreeMap<String, Decoded>,
    faults: Vec<RequiredFieldFault>,
}

impl RecordInstance {
    pub fn get(&self, key: &str) -> Option<&Decoded> {
        self.fields.get(key)
    }

    /// Required fields missing from the decoded payload
    pub fn validate(&self) -> Vec<RequiredFieldFault> {
        self.faults.clone()
    }
}

pub struct Codec<'c> {
    consolidated: &'c Consolidated,
}

impl<'c> Codec<'c> {
    pub fn new(consolidated: &'c Consolidated) -> Self {
        Self { consolidated }
    }

    /// Decode `value` as the record or alias called `name`
    pub fn decode(&self, name: &str, value: &Value) -> Result<Decoded, DecodeError> {
        let ty = self.lookup(name).ok_or_else(|| DecodeError::UnknownRecord {
            name: name.to_string(),
        })?;
        self.decode_type(ty, value, "")
    }

    fn lookup(&self, name: &str) -> Option<TypeId> {
        let consolidated = self.consolidated;
        if let Some(record) = consolidated.records.get(name) {
            return Some(consolidated.graph.strukt(*record).type_id);
        }
        let alias = consolidated.aliases.get(name)?;
        consolidated.graph.field(*alias).ty()
    }

    fn decode_type(&self, ty: TypeId, value: &Value, path: &str) -> Result<Decoded, DecodeError> {
        let graph = &self.consolidated.graph;
        let info = graph.ty(ty);
        let mismatch = |expected: &str| DecodeError::TypeMismatch {
            path: path.to_string(),
            expected: expected.to_string(),
        };

        match info.kind {
            TypeKind::Primitive(primitive) => decode_primitive(primitive, value).ok_or_else(|| mismatch(primitive.keyword())),
            TypeKind::Interface => Ok(Decoded::Value(value.clone())),
            TypeKind::Array => {
                let sub = info.sub_type.ok_or_else(|| mismatch("typed array"))?;
                let items = value.as_array().ok_or_else(|| mismatch("array"))?;
                items
                    .iter()
                    .enumerate()
                    .map(|(index, item)| self.decode_type(sub, item, &format!("{}/{}", path, index)))
                    .collect::<Result<Vec<_>, _>>()
                    .map(Decoded::Array)
            }
            TypeKind::Map => {
                let sub = info.sub_type.ok_or_else(|| mismatch("typed map"))?;
                let entries = value.as_object().ok_or_else(|| mismatch("object"))?;
                let mut map = BTreeMap::new();
                for (key, item) in entries {
                    let child = format!("{}/{}", path, escape_pointer(key));
                    map.insert(key.clone(), self.decode_type(sub, item, &child)?);
                }
                Ok(Decoded::Map(map))
            }
            TypeKind::Object => {
                let record = info.record.ok_or_else(|| mismatch(&info.name))?;
                self.decode_record(record, value, path).map(Decoded::Record)
            }
        }
    }

    fn decode_record(&self, id: StructId, value: &Value, path: &str) -> Result<RecordInstance, DecodeError> {
        let graph = &self.consolidated.graph;
        let record = graph.strukt(id);
        let name = graph.ty(record.type_id).display_name();
        let detached = || DecodeError::Detached { record: name.clone() };

        let object = value.as_object().ok_or_else(|| DecodeError::TypeMismatch {
            path: path.to_string(),
            expected: name.clone(),
        })?;

        let fields: Vec<&Field> = record.fields.values().map(|f| graph.field(*f)).collect();
        let by_key: HashMap<&str, &Field> = fields
            .iter()
            .filter(|f| f.is_wire_field())
            .map(|f| (f.json_name.as_str(), *f))
            .collect();
        let carrier = fields.iter().find(|f| !f.is_wire_field());

        let mut instance = RecordInstance {
            record: id,
            name: name.clone(),
            fields: BTreeMap::new(),
            additional: BTreeMap::new(),
            faults: Vec::new(),
        };

        // Same key order as the generated reader
        let mut entries: Vec<(&String, &Value)> = object.iter().collect();
        entries.sort_by(|a, b| a.0.cmp(b.0));

        for (key, item) in entries {
            let child = format!("{}/{}", path, escape_pointer(key));
            if let Some(field) = by_key.get(key.as_str()) {
                let ty = field.ty().ok_or_else(detached)?;
                if item.is_null() && (!field.required || self.is_record(ty)) {
                    continue;
                }
                instance.fields.insert(key.clone(), self.decode_type(ty, item, &child)?);
                continue;
            }

            match (record.extra_keys, carrier) {
                (ExtraKeys::Collected, Some(carrier)) => {
                    let map = carrier.ty().ok_or_else(detached)?;
                    let element = graph.ty(map).sub_type.ok_or_else(detached)?;
                    instance.additional.insert(key.clone(), self.decode_type(element, item, &child)?);
                }
                (ExtraKeys::Rejected, _) => {
                    return Err(DecodeError::AdditionalPropertyNotAllowed {
                        record: name.clone(),
                        key: key.clone(),
                    });
                }
                _ => {}
            }
        }

        for field in fields.iter().filter(|f| f.is_wire_field() && f.required) {
            if object.contains_key(&field.json_name) {
                continue;
            }
            instance.faults.push(RequiredFieldFault {
                record: name.clone(),
                field: field.json_name.clone(),
            });
            let ty = field.ty().ok_or_else(detached)?;
            if !self.is_record(ty) {
                instance.fields.insert(field.json_name.clone(), self.default_value(ty));
            }
        }

        Ok(instance)
    }

    fn is_record(&self, ty: TypeId) -> bool {
        let info = self.consolidated.graph.ty(ty);
        info.kind == TypeKind::Object && info.is_pointer
    }

    fn default_value(&self, ty: TypeId) -> Decoded {
        match self.consolidated.graph.ty(ty).kind {
            TypeKind::Primitive(Primitive::String) => Decoded::Value(Value::String(String::new())),
            TypeKind::Primitive(Primitive::Integer) => Decoded::Value(Value::from(0i64)),
            TypeKind::Primitive(Primitive::Number) => Decoded::Value(Value::from(0.0f64)),
            TypeKind::Primitive(Primitive::Boolean) => Decoded::Value(Value::Bool(false)),
            TypeKind::Array => Decoded::Array(Vec::new()),
            TypeKind::Map => Decoded::Map(BTreeMap::new()),
            TypeKind::Primitive(Primitive::Null) | TypeKind::Interface | TypeKind::Object => Decoded::Value(Value::Null),
        }
    }

    /// Encode a decoded value back to JSON
    pub fn encode(&self, decoded: &Decoded) -> Result<Value, EncodeError> {
        match decoded {
            Decoded::Value(value) => Ok(value.clone()),
            Decoded::Array(items) => items
                .iter()
                .map(|item| self.encode(item))
                .collect::<Result<Vec<_>, _>>()
                .map(Value::Array),
            Decoded::Map(entries) => {
                let mut map = Map::new();
                for (key, item) in entries {
                    map.insert(key.clone(), self.encode(item)?);
                }
                Ok(Value::Object(map))
            }
            Decoded::Record(instance) => self.encode_record(instance),
        }
    }

    fn encode_record(&self, instance: &RecordInstance) -> Result<Value, EncodeError> {
        let graph = &self.consolidated.graph;
        let record = graph.strukt(instance.record);

        let mut map = Map::new();
        for id in record.fields.values() {
            let field = graph.field(*id);
            if !field.is_wire_field() {
                continue;
            }
            match instance.fields.get(&field.json_name) {
                Some(value) => {
                    map.insert(field.json_name.clone(), self.encode(value)?);
                }
                None if field.required => {
                    let ty = field.ty().ok_or_else(|| EncodeError::Detached {
                        record: instance.name.clone(),
                    })?;
                    if self.is_record(ty) {
                        return Err(EncodeError::RequiredField {
                            record: instance.name.clone(),
                            field: field.json_name.clone(),
                        });
                    }
                }
                None => {}
            }
        }
        for (key, item) in &instance.additional {
            map.insert(key.clone(), self.encode(item)?);
        }
        Ok(Value::Object(map))
    }
}

fn decode_primitive(primitive: Primitive, value: &Value) -> Option<Decoded> {
    let decoded = match primitive {
        Primitive::String => Value::String(value.as_str()?.to_string()),
        Primitive::Integer => Value::from(value.as_i64()?),
        Primitive::Number => Value::from(value.as_f64()?),
        Primitive::Boolean => Value::Bool(value.as_bool()?),
        Primitive::Null => {
            if !value.is_null() {
                return None;
            }
            Value::Null
        }
    };
    Some(Decoded::Value(decoded))
}
