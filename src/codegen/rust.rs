//! Rust Code Emitter
//!
//! Renders aliases, records and their writer/reader/validator routines from
//! the consolidated type graph.
//!
//! Records without custom routines derive serde traits and carry `#[serde]`
//! attributes. Records that need routines implement the traits by hand; their
//! wire names are noted in `// json:` comments instead.

use std::collections::HashSet;

use crate::error::{Result, StructgenError};
use crate::graph::{ExtraKeys, Field, Primitive, Struct, TypeGraph, TypeId, TypeKind};

use super::names::{field_ident, type_ident};

/// Deepest container nesting rendered before giving up on a cyclic type
const MAX_NESTING: usize = 64;

/// Which imports and helpers the emitted code relies on
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Usage {
    pub serde: bool,
    pub serialize_map: bool,
    pub ser_error: bool,
    pub de_error: bool,
    pub btree_map: bool,
    pub field_required: bool,
}

/// How a field is represented in the record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Slot {
    /// A record reference, always `Option<Box<T>>`
    Pointer,
    /// Required non-record value, defaulted when absent
    Required,
    /// `Option<T>`
    Optional,
    /// The additional-properties map
    Carrier,
}

struct RenderedField<'g> {
    field: &'g Field,
    ident: String,
    ty: String,
    slot: Slot,
    /// Hidden `Option<FieldRequired>` member, required fields only
    fault_ident: String,
    /// Reader-local "seen" flag, required fields only
    received_ident: String,
}

pub struct RustEmitter<'g> {
    graph: &'g TypeGraph,
    usage: Usage,
}

impl<'g> RustEmitter<'g> {
    pub fn new(graph: &'g TypeGraph) -> Self {
        Self {
            graph,
            usage: Usage::default(),
        }
    }

    pub fn usage(&self) -> Usage {
        self.usage
    }

    /// Render a type as Rust source
    pub fn render_type(&mut self, ty: TypeId) -> Result<String> {
        self.render_nested(ty, 0)
    }

    fn render_nested(&mut self, id: TypeId, depth: usize) -> Result<String> {
        let ty = self.graph.ty(id);
        if depth > MAX_NESTING {
            return Err(shape_error(&ty.name, "container types nest into themselves"));
        }
        match ty.kind {
            TypeKind::Primitive(primitive) => Ok(match primitive {
                Primitive::String => "String",
                Primitive::Integer => "i64",
                Primitive::Number => "f64",
                Primitive::Boolean => "bool",
                Primitive::Null => "()",
            }
            .to_string()),
            TypeKind::Interface => Ok("serde_json::Value".to_string()),
            TypeKind::Array => {
                let sub = ty
                    .sub_type
                    .ok_or_else(|| shape_error(&ty.name, "array type requires a subtype"))?;
                Ok(format!("Vec<{}>", self.render_nested(sub, depth + 1)?))
            }
            TypeKind::Map => {
                let sub = match ty.sub_type {
                    Some(sub) if !ty.name.is_empty() => sub,
                    _ => return Err(shape_error(&ty.name, "map type requires both a name and a subtype")),
                };
                self.usage.btree_map = true;
                Ok(format!("BTreeMap<String, {}>", self.render_nested(sub, depth + 1)?))
            }
            TypeKind::Object => {
                if ty.sub_type.is_some() {
                    return Err(shape_error(&ty.name, "object cannot contain subtype"));
                }
                Ok(type_ident(&ty.display_name()))
            }
        }
    }

    fn render_field(&mut self, field: &'g Field) -> Result<RenderedField<'g>> {
        let id = field
            .ty()
            .ok_or_else(|| shape_error(&field.name, "field is not attached to a type"))?;
        let inner = self.render_type(id)?;
        let info = self.graph.ty(id);

        let (ty, slot) = if !field.is_wire_field() {
            (inner, Slot::Carrier)
        } else if info.kind == TypeKind::Object && info.is_pointer {
            (format!("Option<Box<{}>>", inner), Slot::Pointer)
        } else if field.required {
            (inner, Slot::Required)
        } else {
            (format!("Option<{}>", inner), Slot::Optional)
        };

        Ok(RenderedField {
            field,
            ident: field_ident(&field.name),
            ty,
            slot,
            fault_ident: String::new(),
            received_ident: String::new(),
        })
    }

    fn render_fields(&mut self, record: &'g Struct) -> Result<Vec<RenderedField<'g>>> {
        // Wire fields by generated name, carrier last
        let graph = self.graph;
        let mut fields = Vec::with_capacity(record.fields.len());
        for id in record.fields.values() {
            let field = graph.field(*id);
            if field.is_wire_field() {
                fields.push(self.render_field(field)?);
            }
        }
        for id in record.fields.values() {
            let field = graph.field(*id);
            if !field.is_wire_field() {
                fields.push(self.render_field(field)?);
            }
        }

        // Distinct generated names can still share a snake_case form (`UserID`, `UserId`)
        let mut taken = HashSet::new();
        for rendered in &mut fields {
            let ident = unique_ident(&rendered.ident, &mut taken);
            if ident != rendered.ident {
                tracing::warn!(field = %rendered.field.name, ident = %ident, "field identifier taken, added a suffix");
                rendered.ident = ident;
            }
        }
        for rendered in fields.iter_mut().filter(|f| f.field.required && f.slot != Slot::Carrier) {
            let base = rendered.ident.trim_start_matches("r#");
            rendered.received_ident = format!("{}_received", base);
            rendered.fault_ident = unique_ident(&format!("{}_required_fault", base), &mut taken);
        }
        Ok(fields)
    }

    // =========================================================================
    // Declarations
    // =========================================================================

    /// `pub type Name = Target;`
    pub fn emit_alias(&mut self, output: &mut String, name: &str, alias: &Field) -> Result<()> {
        let target = alias
            .ty()
            .ok_or_else(|| shape_error(name, "alias is not attached to a type"))?;
        let rendered = self.render_type(target)?;
        push_doc(output, "", &alias.descriptions);
        output.push_str(&format!("pub type {} = {};\n", type_ident(name), rendered));
        Ok(())
    }

    pub fn emit_record(&mut self, output: &mut String, record: &'g Struct) -> Result<()> {
        let name = type_ident(&self.graph.ty(record.type_id).display_name());
        let fields = self.render_fields(record)?;
        self.usage.serde = true;

        output.push_str(&format!("/// {}\n", name));
        if !record.description.is_empty() {
            output.push_str("///\n");
            push_doc(output, "", &[record.description.clone()]);
        }

        if record.generate_code {
            output.push_str("#[derive(Debug, Clone, Default, PartialEq)]\n");
        } else {
            output.push_str("#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]\n");
        }
        output.push_str(&format!("pub struct {} {{\n", name));

        for rendered in &fields {
            push_doc(output, "    ", &rendered.field.descriptions);
            let key = &rendered.field.json_name;
            match (record.generate_code, rendered.slot) {
                (_, Slot::Carrier) => {
                    if !record.generate_code {
                        output.push_str("    #[serde(skip)]\n");
                    }
                }
                (true, _) if rendered.field.required => output.push_str(&format!("    // json: {:?}\n", key)),
                (true, _) => output.push_str(&format!("    // json: {:?}\n", format!("{},omitempty", key))),
                (false, Slot::Required) => output.push_str(&format!("    #[serde(rename = {:?})]\n", key)),
                (false, _) => output.push_str(&format!(
                    "    #[serde(rename = {:?}, default, skip_serializing_if = \"Option::is_none\")]\n",
                    key
                )),
            }
            output.push_str(&format!("    pub {}: {},\n", rendered.ident, rendered.ty));
        }

        if record.generate_code {
            for rendered in fields.iter().filter(|f| f.field.required && f.slot != Slot::Carrier) {
                self.usage.field_required = true;
                output.push_str(&format!("    {}: Option<FieldRequired>,\n", rendered.fault_ident));
            }
        }
        output.push_str("}\n");
        Ok(())
    }

    // =========================================================================
    // Routines
    // =========================================================================

    /// Writer, reader and validator for a record with custom routines
    pub fn emit_routines(&mut self, output: &mut String, record: &'g Struct) -> Result<()> {
        let name = type_ident(&self.graph.ty(record.type_id).display_name());
        let fields = self.render_fields(record)?;
        self.emit_writer(output, &name, &fields);
        output.push('\n');
        self.emit_reader(output, &name, record.extra_keys, &fields);
        output.push('\n');
        self.emit_validator(output, &name, &fields);
        Ok(())
    }

    fn emit_writer(&mut self, output: &mut String, name: &str, fields: &[RenderedField<'_>]) {
        self.usage.serialize_map = true;

        output.push_str(&format!("impl Serialize for {} {{\n", name));
        output.push_str("    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>\n");
        output.push_str("    where\n");
        output.push_str("        S: serde::Serializer,\n");
        output.push_str("    {\n");
        output.push_str("        let mut map = serializer.serialize_map(None)?;\n");

        for rendered in fields {
            let key = format!("{:?}", rendered.field.json_name);
            let ident = &rendered.ident;
            match rendered.slot {
                Slot::Pointer if rendered.field.required => {
                    self.usage.ser_error = true;
                    output.push_str(&format!("        match &self.{} {{\n", ident));
                    output.push_str(&format!("            Some(value) => map.serialize_entry({}, value)?,\n", key));
                    output.push_str(&format!(
                        "            None => return Err(S::Error::custom({:?})),\n",
                        format!("{} is a required field", rendered.field.json_name)
                    ));
                    output.push_str("        }\n");
                }
                Slot::Pointer | Slot::Optional => {
                    output.push_str(&format!("        if let Some(value) = &self.{} {{\n", ident));
                    output.push_str(&format!("            map.serialize_entry({}, value)?;\n", key));
                    output.push_str("        }\n");
                }
                Slot::Required => {
                    output.push_str(&format!("        map.serialize_entry({}, &self.{})?;\n", key, ident));
                }
                Slot::Carrier => {
                    output.push_str(&format!("        for (key, value) in &self.{} {{\n", ident));
                    output.push_str("            map.serialize_entry(key, value)?;\n");
                    output.push_str("        }\n");
                }
            }
        }

        output.push_str("        map.end()\n");
        output.push_str("    }\n");
        output.push_str("}\n");
    }

    fn emit_reader(&mut self, output: &mut String, name: &str, extra_keys: ExtraKeys, fields: &[RenderedField<'_>]) {
        self.usage.de_error = true;
        self.usage.btree_map = true;

        output.push_str(&format!("impl<'de> Deserialize<'de> for {} {{\n", name));
        output.push_str("    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>\n");
        output.push_str("    where\n");
        output.push_str("        D: serde::Deserializer<'de>,\n");
        output.push_str("    {\n");
        output.push_str("        let raw = BTreeMap::<String, serde_json::Value>::deserialize(deserializer)?;\n");
        output.push_str(&format!("        let mut record = {}::default();\n", name));

        let required: Vec<&RenderedField<'_>> = fields
            .iter()
            .filter(|f| f.field.required && f.slot != Slot::Carrier)
            .collect();
        for rendered in &required {
            output.push_str(&format!("        let mut {} = false;\n", rendered.received_ident));
        }

        output.push_str("        for (key, value) in raw {\n");
        output.push_str("            match key.as_str() {\n");
        for rendered in fields.iter().filter(|f| f.slot != Slot::Carrier) {
            output.push_str(&format!("                {:?} => {{\n", rendered.field.json_name));
            if rendered.field.required {
                output.push_str(&format!("                    {} = true;\n", rendered.received_ident));
            }
            output.push_str(&format!(
                "                    record.{} = serde_json::from_value(value).map_err(D::Error::custom)?;\n",
                rendered.ident
            ));
            output.push_str("                }\n");
        }

        let carrier = fields.iter().find(|f| f.slot == Slot::Carrier);
        match (extra_keys, carrier) {
            (ExtraKeys::Collected, Some(carrier)) => {
                output.push_str("                _ => {\n");
                output.push_str("                    let value = serde_json::from_value(value).map_err(D::Error::custom)?;\n");
                output.push_str(&format!("                    record.{}.insert(key, value);\n", carrier.ident));
                output.push_str("                }\n");
            }
            (ExtraKeys::Rejected, _) => {
                output.push_str("                _ => {\n");
                output.push_str(
                    "                    return Err(D::Error::custom(format!(\"additional property not allowed: \\\"{}\\\"\", key)));\n",
                );
                output.push_str("                }\n");
            }
            _ => output.push_str("                _ => {}\n"),
        }
        output.push_str("            }\n");
        output.push_str("        }\n");

        for rendered in &required {
            output.push_str(&format!("        if !{} {{\n", rendered.received_ident));
            output.push_str(&format!(
                "            record.{} = Some(FieldRequired {{ field: {:?} }});\n",
                rendered.fault_ident,
                rendered.field.json_name
            ));
            output.push_str("        }\n");
        }

        output.push_str("        Ok(record)\n");
        output.push_str("    }\n");
        output.push_str("}\n");
    }

    fn emit_validator(&mut self, output: &mut String, name: &str, fields: &[RenderedField<'_>]) {
        self.usage.field_required = true;

        let required: Vec<&RenderedField<'_>> = fields
            .iter()
            .filter(|f| f.field.required && f.slot != Slot::Carrier)
            .collect();

        output.push_str(&format!("impl {} {{\n", name));
        output.push_str("    /// Required fields missing from the decoded payload\n");
        output.push_str("    pub fn validate(&self) -> Vec<FieldRequired> {\n");
        if required.is_empty() {
            output.push_str("        Vec::new()\n");
        } else {
            output.push_str("        let mut faults = Vec::new();\n");
            for rendered in &required {
                output.push_str(&format!("        if let Some(fault) = &self.{} {{\n", rendered.fault_ident));
                output.push_str("            faults.push(fault.clone());\n");
                output.push_str("        }\n");
            }
            output.push_str("        faults\n");
        }
        output.push_str("    }\n");
        output.push_str("}\n");
    }
}

/// `ident`, or `ident_N` for the first free `N` from 2
fn unique_ident(ident: &str, taken: &mut HashSet<String>) -> String {
    if taken.insert(ident.to_string()) {
        return ident.to_string();
    }
    let base = ident.trim_start_matches("r#");
    (2..)
        .map(|n| format!("{}_{}", base, n))
        .find(|candidate| taken.insert(candidate.clone()))
        .unwrap_or_else(|| base.to_string())
}

/// Doc comment lines, one per description line
fn push_doc(output: &mut String, indent: &str, descriptions: &[String]) {
    for (index, description) in descriptions.iter().filter(|d| !d.trim().is_empty()).enumerate() {
        if index > 0 {
            output.push_str(&format!("{}///\n", indent));
        }
        for line in description.trim().lines() {
            let line = line.trim_end();
            if line.is_empty() {
                output.push_str(&format!("{}///\n", indent));
            } else {
                output.push_str(&format!("{}/// {}\n", indent, line));
            }
        }
    }
}

fn shape_error(name: &str, message: &str) -> StructgenError {
    StructgenError::Shape {
        type_name: if name.is_empty() { "<unnamed>".to_string() } else { name.to_string() },
        message: message.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::TypeGraph;

    #[test]
    fn test_render_types() {
        let mut graph = TypeGraph::new();
        let person = graph.new_type("Person", TypeKind::Object, true, None);
        let map = graph.map_of(person);
        let list = graph.array_of(Some(map));
        let any = graph.interface();
        let any_list = graph.array_of(Some(any));
        let number = graph.primitive(Primitive::Number);

        let mut emitter = RustEmitter::new(&graph);
        assert_eq!(emitter.render_type(list).unwrap(), "Vec<BTreeMap<String, Person>>");
        assert_eq!(emitter.render_type(any_list).unwrap(), "Vec<serde_json::Value>");
        assert_eq!(emitter.render_type(number).unwrap(), "f64");
        assert!(emitter.usage().btree_map);
    }

    #[test]
    fn test_malformed_types_are_shape_errors() {
        let mut graph = TypeGraph::new();
        let broken_array = graph.array_of(None);
        let string = graph.primitive(Primitive::String);
        let nameless_map = graph.new_type("", TypeKind::Map, false, Some(string));
        let object_with_sub = graph.new_type("Odd", TypeKind::Object, true, Some(string));

        let mut emitter = RustEmitter::new(&graph);
        for ty in [broken_array, nameless_map, object_with_sub] {
            assert!(matches!(emitter.render_type(ty), Err(StructgenError::Shape { .. })));
        }
    }

    #[test]
    fn test_cyclic_containers_are_rejected() {
        let mut graph = TypeGraph::new();
        let outer = graph.array_of(None);
        let inner = graph.array_of(Some(outer));
        graph.set_sub_type(outer, inner);
        let mut emitter = RustEmitter::new(&graph);
        assert!(matches!(emitter.render_type(outer), Err(StructgenError::Shape { .. })));
    }

    #[test]
    fn test_doc_lines() {
        let mut output = String::new();
        push_doc(&mut output, "    ", &["first line\nsecond".to_string(), "".to_string(), "other".to_string()]);
        assert_eq!(output, "    /// first line\n    /// second\n    ///\n    /// other\n");
    }
}
