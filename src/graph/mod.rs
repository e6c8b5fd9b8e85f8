//! Type Graph
//!
//! Arena of [`TypeInfo`] nodes, [`Field`]s and [`Struct`]s produced by lowering.
//!
//! Every type knows who points at it: fields typed by it and container types
//! (arrays, maps) using it as element type. When unification replaces one type
//! with another, [`TypeGraph::replace`] drains the old referrer set into the
//! survivor so nothing is left pointing at a discarded node.
//!
//! Invariant: for every field `f`, `f.ty == Some(t)` iff `Referrer::Field(f)`
//! is in `t`'s referrer set; likewise for container element types.

pub mod lower;
pub mod resolver;
pub mod unify;

pub use lower::{Lowered, Lowerer};
pub use resolver::RefResolver;
pub use unify::{consolidate, Consolidated};

use std::collections::{BTreeMap, BTreeSet};

use sha2::{Digest, Sha256};

use crate::error::{Result, StructgenError};

// =============================================================================
// Identifiers
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TypeId(usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FieldId(usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StructId(usize);

impl std::fmt::Display for TypeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "t{}", self.0)
    }
}

// =============================================================================
// Type Info
// =============================================================================

/// JSON scalar types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Primitive {
    String,
    Integer,
    Number,
    Boolean,
    Null,
}

impl Primitive {
    pub fn from_keyword(keyword: &str) -> Option<Self> {
        match keyword {
            "string" => Some(Self::String),
            "integer" => Some(Self::Integer),
            "number" => Some(Self::Number),
            "boolean" => Some(Self::Boolean),
            "null" => Some(Self::Null),
            _ => None,
        }
    }

    pub fn keyword(&self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Integer => "integer",
            Self::Number => "number",
            Self::Boolean => "boolean",
            Self::Null => "null",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeKind {
    Primitive(Primitive),
    /// Untyped: anything goes
    Interface,
    Array,
    /// String-keyed map, element type in `sub_type`
    Map,
    /// A record, always referenced through indirection
    Object,
}

/// Something holding a reference to a type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Referrer {
    Field(FieldId),
    /// A container type using the type as its element
    Element(TypeId),
}

#[derive(Debug, Clone)]
pub struct TypeInfo {
    pub id: TypeId,
    pub name: String,
    pub kind: TypeKind,
    pub sub_type: Option<TypeId>,
    pub is_pointer: bool,
    pub has_name_collision: bool,
    pub is_root: bool,
    pub is_alias: bool,
    /// The record this type names, for object types
    pub record: Option<StructId>,
    /// Short identifier appended to the name on collision
    pub suffix: String,
    referrers: BTreeSet<Referrer>,
}

impl TypeInfo {
    pub fn short_name(&self) -> &str {
        &self.name
    }

    pub fn long_name(&self) -> String {
        format!("{}_{}", self.name, self.suffix)
    }

    /// The name the type is emitted under
    pub fn display_name(&self) -> String {
        if self.has_name_collision {
            self.long_name()
        } else {
            self.name.clone()
        }
    }

    pub fn referrers(&self) -> impl Iterator<Item = &Referrer> {
        self.referrers.iter()
    }

    pub fn referrer_count(&self) -> usize {
        self.referrers.len()
    }
}

// =============================================================================
// Fields and Structs
// =============================================================================

#[derive(Debug, Clone)]
pub struct Field {
    pub id: FieldId,
    /// Generated name, e.g. `Address1`
    pub name: String,
    /// Wire name, e.g. `address1`
    pub json_name: String,
    pub required: bool,
    pub descriptions: Vec<String>,
    /// Holds the record's additional properties instead of one wire key
    pub is_carrier: bool,
    ty: Option<TypeId>,
}

impl Field {
    /// The type currently owning this field, `None` once detached
    pub fn ty(&self) -> Option<TypeId> {
        self.ty
    }

    pub fn is_wire_field(&self) -> bool {
        !self.is_carrier
    }
}

/// How a record treats keys it does not declare
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtraKeys {
    /// No `additionalProperties` keyword: unknown keys are dropped
    Ignored,
    /// Collected into the `AdditionalProperties` map field
    Collected,
    /// `additionalProperties: false`: unknown keys are rejected
    Rejected,
}

#[derive(Debug, Clone)]
pub struct Struct {
    pub id: StructId,
    /// Schema location this record was lowered from
    pub source: String,
    pub type_id: TypeId,
    pub description: String,
    pub fields: BTreeMap<String, FieldId>,
    /// Whether custom writer/reader/validator routines are needed
    pub generate_code: bool,
    pub extra_keys: ExtraKeys,
}

/// Name of the synthetic additional-properties field
pub const ADDITIONAL_PROPERTIES: &str = "AdditionalProperties";

// =============================================================================
// Type Graph
// =============================================================================

#[derive(Debug, Default)]
pub struct TypeGraph {
    types: Vec<TypeInfo>,
    fields: Vec<Field>,
    structs: Vec<Struct>,
}

impl TypeGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a type; `sub_type` is registered as an element reference
    pub fn new_type(&mut self, name: impl Into<String>, kind: TypeKind, is_pointer: bool, sub_type: Option<TypeId>) -> TypeId {
        let id = TypeId(self.types.len());
        self.types.push(TypeInfo {
            id,
            name: name.into(),
            kind,
            sub_type: None,
            is_pointer,
            has_name_collision: false,
            is_root: false,
            is_alias: false,
            record: None,
            suffix: format!("{:x}", id.0),
            referrers: BTreeSet::new(),
        });
        if let Some(sub) = sub_type {
            self.set_sub_type(id, sub);
        }
        id
    }

    pub fn primitive(&mut self, primitive: Primitive) -> TypeId {
        self.new_type(primitive.keyword(), TypeKind::Primitive(primitive), false, None)
    }

    pub fn interface(&mut self) -> TypeId {
        self.new_type("interface", TypeKind::Interface, false, None)
    }

    pub fn array_of(&mut self, element: Option<TypeId>) -> TypeId {
        self.new_type("", TypeKind::Array, false, element)
    }

    pub fn map_of(&mut self, element: TypeId) -> TypeId {
        self.new_type("string", TypeKind::Map, false, Some(element))
    }

    /// Point a container at its element type, detaching it from any previous one
    pub fn set_sub_type(&mut self, container: TypeId, sub: TypeId) {
        if let Some(old) = self.types[container.0].sub_type.take() {
            self.types[old.0].referrers.remove(&Referrer::Element(container));
        }
        self.types[container.0].sub_type = Some(sub);
        self.types[sub.0].referrers.insert(Referrer::Element(container));
    }

    /// Create a field attached to `ty`
    pub fn new_field(
        &mut self,
        name: impl Into<String>,
        json_name: impl Into<String>,
        ty: TypeId,
        required: bool,
        descriptions: Vec<String>,
    ) -> FieldId {
        let id = FieldId(self.fields.len());
        self.fields.push(Field {
            id,
            name: name.into(),
            json_name: json_name.into(),
            required,
            descriptions: descriptions.into_iter().filter(|d| !d.is_empty()).collect(),
            is_carrier: false,
            ty: None,
        });
        self.add_field_reference(ty, id);
        id
    }

    /// Create the additional-properties field for a record, typed by `map`
    pub fn new_carrier_field(&mut self, map: TypeId) -> FieldId {
        let id = self.new_field(ADDITIONAL_PROPERTIES, "", map, false, Vec::new());
        self.fields[id.0].is_carrier = true;
        id
    }

    /// Make `ty` the owner of `field`, deregistering it from its previous type first
    pub fn add_field_reference(&mut self, ty: TypeId, field: FieldId) {
        if let Some(old) = self.fields[field.0].ty {
            self.remove_field_reference(old, field);
        }
        self.fields[field.0].ty = Some(ty);
        self.types[ty.0].referrers.insert(Referrer::Field(field));
    }

    /// Detach `field` from `ty`; returns whether it was attached
    pub fn remove_field_reference(&mut self, ty: TypeId, field: FieldId) -> bool {
        if self.types[ty.0].referrers.remove(&Referrer::Field(field)) {
            self.fields[field.0].ty = None;
            true
        } else {
            false
        }
    }

    /// Move every reference to `old` over to `survivor`
    pub fn replace(&mut self, survivor: TypeId, old: TypeId) {
        if survivor == old {
            return;
        }
        let referrers = std::mem::take(&mut self.types[old.0].referrers);
        for referrer in referrers {
            match referrer {
                Referrer::Field(field) => {
                    self.fields[field.0].ty = Some(survivor);
                    self.types[survivor.0].referrers.insert(referrer);
                }
                Referrer::Element(container) => {
                    self.types[container.0].sub_type = Some(survivor);
                    self.types[survivor.0].referrers.insert(referrer);
                }
            }
        }
        tracing::debug!(old = %old, survivor = %survivor, "replaced type");
    }

    pub fn new_struct(&mut self, source: String, type_id: TypeId, description: String) -> StructId {
        let id = StructId(self.structs.len());
        self.structs.push(Struct {
            id,
            source,
            type_id,
            description,
            fields: BTreeMap::new(),
            generate_code: false,
            extra_keys: ExtraKeys::Ignored,
        });
        self.types[type_id.0].record = Some(id);
        id
    }

    /// Detach every field of a discarded struct from the types it references
    pub fn detach_struct(&mut self, id: StructId) {
        let fields: Vec<FieldId> = self.structs[id.0].fields.values().copied().collect();
        for field in fields {
            if let Some(ty) = self.fields[field.0].ty {
                self.remove_field_reference(ty, field);
            }
        }
        let type_id = self.structs[id.0].type_id;
        if self.types[type_id.0].record == Some(id) {
            self.types[type_id.0].record = None;
        }
    }

    /// Give a record type a collision suffix derived from its schema location
    pub fn assign_suffix(&mut self, ty: TypeId, source: &str) {
        self.types[ty.0].suffix = collision_suffix(source);
    }

    pub fn ty(&self, id: TypeId) -> &TypeInfo {
        &self.types[id.0]
    }

    pub fn ty_mut(&mut self, id: TypeId) -> &mut TypeInfo {
        &mut self.types[id.0]
    }

    pub fn field(&self, id: FieldId) -> &Field {
        &self.fields[id.0]
    }

    pub fn field_mut(&mut self, id: FieldId) -> &mut Field {
        &mut self.fields[id.0]
    }

    pub fn strukt(&self, id: StructId) -> &Struct {
        &self.structs[id.0]
    }

    pub fn strukt_mut(&mut self, id: StructId) -> &mut Struct {
        &mut self.structs[id.0]
    }

    pub fn types(&self) -> impl Iterator<Item = &TypeInfo> {
        self.types.iter()
    }

    pub fn fields(&self) -> impl Iterator<Item = &Field> {
        self.fields.iter()
    }

    /// The record a type names, if it is an attached object type
    pub fn record_of(&self, ty: TypeId) -> Option<&Struct> {
        self.ty(ty).record.map(|s| self.strukt(s))
    }

    /// Schema-level signature of a type, e.g. `[]string` or `map[string]*Address`.
    ///
    /// Fails with a shape error on malformed containers.
    pub fn signature(&self, id: TypeId) -> Result<String> {
        let ty = self.ty(id);
        match ty.kind {
            TypeKind::Primitive(p) => Ok(p.keyword().to_string()),
            TypeKind::Interface => Ok("interface".to_string()),
            TypeKind::Array => {
                let sub = ty.sub_type.ok_or_else(|| shape_error(ty, "array type requires a subtype"))?;
                Ok(format!("[]{}", self.signature(sub)?))
            }
            TypeKind::Map => {
                let sub = match ty.sub_type {
                    Some(sub) if !ty.name.is_empty() => sub,
                    _ => return Err(shape_error(ty, "map type requires both a name and a subtype")),
                };
                Ok(format!("map[{}]{}", ty.name, self.signature(sub)?))
            }
            TypeKind::Object => {
                if ty.sub_type.is_some() {
                    return Err(shape_error(ty, "object cannot contain subtype"));
                }
                if ty.is_pointer {
                    Ok(format!("*{}", ty.display_name()))
                } else {
                    Ok(ty.display_name())
                }
            }
        }
    }
}

fn shape_error(ty: &TypeInfo, message: &str) -> StructgenError {
    StructgenError::Shape {
        type_name: format!("{} ({})", if ty.name.is_empty() { "<unnamed>" } else { &ty.name }, ty.id),
        message: message.to_string(),
    }
}

/// Eight hex digits of SHA-256 over a schema location (`path#pointer`)
pub fn collision_suffix(source: &str) -> String {
    let digest = Sha256::digest(source.as_bytes());
    digest.iter().take(4).map(|b| format!("{:02x}", b)).collect()
}
