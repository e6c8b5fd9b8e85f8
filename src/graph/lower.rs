//! Type Lowering
//!
//! Walks schema documents and builds the [`TypeGraph`]. Every object schema
//! becomes a candidate [`Struct`](super::Struct) filed under its short name;
//! unification later decides which candidates survive.
//!
//! Naming precedence for a sub-schema:
//! 1. its `title`
//! 2. the name supplied by the caller (the property's field name)
//! 3. the configured root name, for document roots
//! 4. the key it was declared under
//! 5. the parent's key with an `Item` suffix
//! 6. `AnonymousN`

use std::collections::{BTreeMap, HashMap, HashSet};

use crate::codegen::names::record_name;
use crate::error::{Result, Stage, StructgenError};
use crate::schema::{AdditionalProperties, NodeId, SchemaSet};

use super::{
    collision_suffix, ExtraKeys, FieldId, Primitive, RefResolver, StructId, TypeGraph, TypeId,
    TypeKind, ADDITIONAL_PROPERTIES,
};

/// Output of lowering, the input of unification
#[derive(Debug)]
pub struct Lowered {
    pub graph: TypeGraph,
    /// Candidate records keyed by short name
    pub candidates: BTreeMap<String, Vec<StructId>>,
    /// Free-standing alias fields keyed by alias name
    pub aliases: BTreeMap<String, FieldId>,
}

pub struct Lowerer<'a> {
    schemas: &'a SchemaSet,
    resolver: RefResolver<'a>,
    graph: TypeGraph,
    root_name: String,
    anonymous: usize,
    /// Resolved-type slot of every lowered node
    resolved: HashMap<NodeId, TypeId>,
    /// Nodes currently being lowered, to stop pure `$ref` cycles
    in_progress: HashSet<NodeId>,
    candidates: BTreeMap<String, Vec<StructId>>,
    aliases: BTreeMap<String, FieldId>,
    /// Schema location each alias was registered from
    alias_sources: HashMap<String, String>,
    /// Alias names claimed by more than one type; every claimant is suffixed
    contested_aliases: HashSet<String>,
}

impl<'a> Lowerer<'a> {
    pub fn new(schemas: &'a SchemaSet, root_name: impl Into<String>) -> Self {
        Self {
            schemas,
            resolver: RefResolver::new(schemas),
            graph: TypeGraph::new(),
            root_name: root_name.into(),
            anonymous: 0,
            resolved: HashMap::new(),
            in_progress: HashSet::new(),
            candidates: BTreeMap::new(),
            aliases: BTreeMap::new(),
            alias_sources: HashMap::new(),
            contested_aliases: HashSet::new(),
        }
    }

    /// Lower every document root, in document order
    pub fn lower_all(mut self) -> Result<Lowered> {
        let schemas = self.schemas;
        self.resolver.init().map_err(|e| {
            let document = match &e {
                StructgenError::UnresolvedReference { path, .. } => {
                    path.split('#').next().unwrap_or_default().to_string()
                }
                _ => String::new(),
            };
            e.in_stage(Stage::Resolve, document)
        })?;

        for (_, document) in schemas.documents() {
            let root = document.root;
            let path = document.path.display().to_string();
            let name = self.schema_name("", root);

            let ty = self.lower(&name, root).map_err(|e| e.in_stage(Stage::Lower, &path))?;
            self.graph.ty_mut(ty).is_root = true;

            // A root object named after the document needs no alias
            let own_record = {
                let info = self.graph.ty(ty);
                info.kind == TypeKind::Object && info.is_pointer && info.name == name
            };
            if !own_record {
                self.add_alias(&name, ty, &schemas.node(root).description, schemas.path_of(root));
            }
            tracing::debug!(document = %path, root = %name, "lowered document");
        }

        tracing::info!(
            candidates = self.candidates.values().map(Vec::len).sum::<usize>(),
            names = self.candidates.len(),
            aliases = self.aliases.len(),
            "types lowered"
        );
        Ok(Lowered {
            graph: self.graph,
            candidates: self.candidates,
            aliases: self.aliases,
        })
    }

    /// Lower a single node under `name`, reusing its resolved type if it has one
    pub fn lower(&mut self, name: &str, node: NodeId) -> Result<TypeId> {
        if let Some(ty) = self.resolved.get(&node) {
            return Ok(*ty);
        }
        if !self.in_progress.insert(node) {
            tracing::warn!(path = %self.schemas.path_of(node), "reference cycle without a record, using an untyped value");
            return Ok(self.graph.interface());
        }
        let result = self.lower_node(name, node);
        self.in_progress.remove(&node);

        let ty = result?;
        self.resolved.insert(node, ty);
        Ok(ty)
    }

    fn lower_node(&mut self, name: &str, node: NodeId) -> Result<TypeId> {
        let schemas = self.schemas;
        let schema = schemas.node(node);
        self.lower_definitions(node)?;

        let types = schema.effective_types();
        match types.as_slice() {
            [] => match schema.reference {
                Some(_) => self.lower_reference(node),
                None => Ok(self.graph.interface()),
            },
            [keyword] => self.lower_keyword(name, node, keyword),
            many => {
                // Each branch still gets its records; the field itself stays untyped
                for keyword in many {
                    self.lower_keyword(&format!("{}_{}", name, keyword), node, keyword)?;
                }
                Ok(self.graph.interface())
            }
        }
    }

    fn lower_definitions(&mut self, node: NodeId) -> Result<()> {
        let schemas = self.schemas;
        for (key, definition) in &schemas.node(node).definitions {
            if self.resolved.contains_key(definition) {
                continue;
            }
            let name = self.schema_name(&record_name(key), *definition);
            self.lower(&name, *definition)?;
        }
        Ok(())
    }

    fn lower_keyword(&mut self, name: &str, node: NodeId, keyword: &str) -> Result<TypeId> {
        match keyword {
            "object" => self.lower_object(name, node),
            "array" => self.lower_array(name, node),
            other => match Primitive::from_keyword(other) {
                Some(primitive) => Ok(self.graph.primitive(primitive)),
                None => Err(StructgenError::UnsupportedType {
                    keyword: other.to_string(),
                    path: self.schemas.path_of(node),
                }),
            },
        }
    }

    fn lower_reference(&mut self, node: NodeId) -> Result<TypeId> {
        let target = self.resolver.resolve(node)?;
        if let Some(ty) = self.resolved.get(&target) {
            return Ok(*ty);
        }
        let name = self.schema_name("", target);
        self.lower(&name, target)
    }

    fn lower_object(&mut self, name: &str, node: NodeId) -> Result<TypeId> {
        let schemas = self.schemas;
        let schema = schemas.node(node);

        let ty = self.graph.new_type(name, TypeKind::Object, true, None);
        let record = self.graph.new_struct(schemas.path_of(node), ty, schema.description.clone());
        // Recursive references to this schema land on the record being built
        self.resolved.insert(node, ty);

        let mut generate_code = false;
        for (key, property) in &schema.properties {
            let mut field_name = record_name(key);
            if field_name.is_empty() {
                field_name = self.next_anonymous();
            }
            let sub_name = self.schema_name(&field_name, *property);
            let field_ty = self.lower(&sub_name, *property)?;

            let required = schema.is_required(key);
            let field = self.graph.new_field(
                &field_name,
                key,
                field_ty,
                required,
                vec![schemas.node(*property).description.clone()],
            );
            generate_code |= required;
            self.insert_field(record, field_name, field);
        }

        let mut extra_keys = ExtraKeys::Ignored;
        match schema.additional_properties {
            Some(AdditionalProperties::Schema(extra)) => {
                let extra_name = self.schema_name("", extra);
                let element = self.lower(&extra_name, extra)?;
                let map = self.graph.map_of(element);

                // Nothing but extra keys: a bare map does the job, unless the record
                // is a named definition or something already points at it
                if schema.properties.is_empty()
                    && !schema.is_definition
                    && self.graph.ty(ty).referrer_count() == 0
                {
                    self.graph.detach_struct(record);
                    self.resolved.insert(node, map);
                    tracing::debug!(name = %name, "collapsed record to map");
                    return Ok(map);
                }

                let field = self.graph.new_carrier_field(map);
                self.insert_field(record, ADDITIONAL_PROPERTIES.to_string(), field);
                generate_code = true;
                extra_keys = ExtraKeys::Collected;
            }
            Some(AdditionalProperties::Allowed(true)) => {
                let any = self.graph.interface();
                let map = self.graph.map_of(any);
                let field = self.graph.new_carrier_field(map);
                self.insert_field(record, ADDITIONAL_PROPERTIES.to_string(), field);
                generate_code = true;
                extra_keys = ExtraKeys::Collected;
            }
            Some(AdditionalProperties::Allowed(false)) => {
                generate_code = true;
                extra_keys = ExtraKeys::Rejected;
            }
            None => {}
        }

        let strukt = self.graph.strukt_mut(record);
        strukt.generate_code = generate_code;
        strukt.extra_keys = extra_keys;

        tracing::debug!(name = %name, source = %schemas.path_of(node), "registered record candidate");
        self.candidates.entry(name.to_string()).or_default().push(record);
        Ok(ty)
    }

    fn insert_field(&mut self, record: StructId, name: String, field: FieldId) {
        if let Some(previous) = self.graph.strukt_mut(record).fields.insert(name.clone(), field) {
            let json_name = self.graph.field(previous).json_name.clone();
            if let Some(ty) = self.graph.field(previous).ty() {
                self.graph.remove_field_reference(ty, previous);
            }
            tracing::warn!(field = %name, dropped = %json_name, "two properties map to the same field name");
        }
    }

    fn lower_array(&mut self, name: &str, node: NodeId) -> Result<TypeId> {
        let schemas = self.schemas;
        let schema = schemas.node(node);

        let Some(items) = schema.items else {
            let any = self.graph.interface();
            return Ok(self.graph.array_of(Some(any)));
        };

        let array = self.graph.array_of(None);
        self.resolved.insert(node, array);

        let items_name = if name.ends_with("Items") {
            name.to_string()
        } else {
            format!("{}Items", name)
        };
        let sub_name = self.schema_name(&items_name, items);
        let mut element = self.lower(&sub_name, items)?;
        if element == array {
            tracing::warn!(path = %schemas.path_of(node), "array contains itself, using untyped elements");
            element = self.graph.interface();
        }
        self.graph.set_sub_type(array, element);

        if schema.is_root() {
            self.add_alias(name, array, &schema.description, schemas.path_of(node));
        }
        Ok(array)
    }

    fn add_alias(&mut self, name: &str, ty: TypeId, description: &str, source: String) {
        if let Some(existing) = self.aliases.get(name).copied() {
            if self.graph.field(existing).ty() == Some(ty) {
                return;
            }
            // Another type holds the plain name: it moves to its suffixed name too
            self.aliases.remove(name);
            let existing_source = self.alias_sources.remove(name).unwrap_or_default();
            let renamed = format!("{}_{}", name, collision_suffix(&existing_source));
            tracing::warn!(alias = %name, renamed = %renamed, "alias name claimed by two types");
            self.graph.field_mut(existing).name = renamed.clone();
            self.aliases.insert(renamed.clone(), existing);
            self.alias_sources.insert(renamed, existing_source);
            self.contested_aliases.insert(name.to_string());
        }

        let name = if self.contested_aliases.contains(name) {
            let suffixed = format!("{}_{}", name, collision_suffix(&source));
            // One alias per schema location
            if self.aliases.contains_key(&suffixed) {
                return;
            }
            suffixed
        } else {
            name.to_string()
        };

        let field = self.graph.new_field(&name, "", ty, false, vec![description.to_string()]);
        tracing::debug!(alias = %name, source = %source, "registered alias");
        self.aliases.insert(name.clone(), field);
        self.alias_sources.insert(name, source);
    }

    /// Name for a (sub-)schema, see the module docs for precedence
    fn schema_name(&mut self, key_name: &str, node: NodeId) -> String {
        let schemas = self.schemas;
        let schema = schemas.node(node);

        let from_title = record_name(&schema.title);
        if !from_title.is_empty() {
            return from_title;
        }
        let from_key = record_name(key_name);
        if !from_key.is_empty() {
            return from_key;
        }
        if schema.is_root() {
            return self.root_name.clone();
        }
        if let Some(key) = &schema.json_key {
            let name = record_name(key);
            if !name.is_empty() {
                return name;
            }
        }
        let parent_key = schema
            .parent
            .and_then(|parent| schemas.node(parent).json_key.as_deref());
        if let Some(key) = parent_key {
            let name = record_name(&format!("{}Item", key));
            if !name.is_empty() {
                return name;
            }
        }
        self.next_anonymous()
    }

    fn next_anonymous(&mut self) -> String {
        self.anonymous += 1;
        format!("Anonymous{}", self.anonymous)
    }
}
