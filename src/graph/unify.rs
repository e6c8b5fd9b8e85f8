//! Record Unification
//!
//! Consolidates the per-name candidate buckets produced by lowering into the
//! final record set.
//!
//! Two records unify when every field of the one with fewer fields exists in
//! the other under the same name, wire name and type. The record with more
//! fields survives and takes over every reference to the other.

use std::collections::{BTreeMap, HashSet, VecDeque};

use crate::error::{Result, Stage, StructgenError};

use super::{FieldId, Lowered, StructId, TypeGraph, TypeId, TypeKind};

/// The final record set
#[derive(Debug)]
pub struct Consolidated {
    pub graph: TypeGraph,
    /// Surviving records keyed by emitted name
    pub records: BTreeMap<String, StructId>,
    /// Alias fields keyed by alias name
    pub aliases: BTreeMap<String, FieldId>,
}

impl Consolidated {
    /// Look up a record by emitted name or through an alias
    pub fn find_record(&self, name: &str) -> Option<StructId> {
        if let Some(record) = self.records.get(name) {
            return Some(*record);
        }
        let alias = self.aliases.get(name)?;
        let ty = self.graph.field(*alias).ty()?;
        self.graph.ty(ty).record
    }
}

/// Merge structurally identical candidates and assign final names
pub fn consolidate(lowered: Lowered) -> Result<Consolidated> {
    let Lowered {
        mut graph,
        candidates,
        mut aliases,
    } = lowered;

    let mut survivors = Vec::new();
    for (short_name, bucket) in &candidates {
        for record in bucket {
            let strukt = graph.strukt(*record);
            let (ty, source) = (strukt.type_id, strukt.source.clone());
            graph.assign_suffix(ty, &source);
        }

        let kept = consolidate_bucket(&mut graph, bucket);
        let collides = aliases.contains_key(short_name) || kept.len() > 1;
        if collides {
            tracing::warn!(name = %short_name, records = kept.len(), "name collision, disambiguating with suffixes");
        }
        for record in &kept {
            let ty = graph.strukt(*record).type_id;
            graph.ty_mut(ty).has_name_collision = collides;
        }
        survivors.extend(kept);
    }

    let mut records = BTreeMap::new();
    for record in survivors {
        add_record(&mut graph, &mut records, &mut aliases, record).map_err(|e| {
            let source = graph.strukt(record).source.clone();
            let document = source.split('#').next().unwrap_or_default().to_string();
            e.in_stage(Stage::Unify, document)
        })?;
    }

    if let Some(name) = aliases.keys().find(|name| records.contains_key(*name)) {
        return Err(StructgenError::DuplicateName { name: name.clone() }.in_stage(Stage::Unify, name.clone()));
    }

    tracing::info!(records = records.len(), aliases = aliases.len(), "records consolidated");
    Ok(Consolidated {
        graph,
        records,
        aliases,
    })
}

/// Pairwise merge within one bucket; returns the survivors in bucket order
fn consolidate_bucket(graph: &mut TypeGraph, bucket: &[StructId]) -> Vec<StructId> {
    let mut pending: VecDeque<StructId> = bucket.iter().copied().collect();
    let mut kept = Vec::new();

    while let Some(candidate) = pending.pop_front() {
        match pending.iter().position(|other| unifiable(graph, candidate, *other)) {
            Some(index) => {
                let other = pending[index];
                pending[index] = merge(graph, candidate, other);
            }
            None => kept.push(candidate),
        }
    }
    kept
}

/// Add a surviving record, folding root records into an existing compatible root
fn add_record(
    graph: &mut TypeGraph,
    records: &mut BTreeMap<String, StructId>,
    aliases: &mut BTreeMap<String, FieldId>,
    item: StructId,
) -> Result<()> {
    let item_ty = graph.strukt(item).type_id;
    if graph.ty(item_ty).is_root {
        let existing = records.iter().find_map(|(key, record)| {
            let ty = graph.strukt(*record).type_id;
            (graph.ty(ty).is_root && unifiable(graph, *record, item)).then(|| (key.clone(), *record))
        });

        if let Some((key, existing)) = existing {
            let existing_ty = graph.strukt(existing).type_id;
            let existing_was_alias = graph.ty(existing_ty).is_alias;
            let first = graph.ty(existing_ty).display_name();
            let second = graph.ty(item_ty).display_name();
            let first_description = graph.strukt(existing).description.clone();
            let second_description = graph.strukt(item).description.clone();

            let merged = merge(graph, existing, item);
            let merged_ty = graph.strukt(merged).type_id;
            let name = format!("{}_{}", first, second);
            {
                let info = graph.ty_mut(merged_ty);
                info.name = name.clone();
                info.has_name_collision = false;
                info.is_alias = true;
            }
            graph.strukt_mut(merged).description = format!("Aliased for: {}", name);

            records.remove(&key);
            if records.contains_key(&name) {
                return Err(StructgenError::DuplicateName { name });
            }
            tracing::debug!(first = %first, second = %second, merged = %name, "aliased root records");
            records.insert(name, merged);

            if !existing_was_alias {
                set_alias(graph, aliases, &first, merged_ty, first_description);
            }
            set_alias(graph, aliases, &second, merged_ty, second_description);
            return Ok(());
        }
    }

    let name = graph.ty(item_ty).display_name();
    if records.contains_key(&name) {
        return Err(StructgenError::DuplicateName { name });
    }
    records.insert(name, item);
    Ok(())
}

fn set_alias(
    graph: &mut TypeGraph,
    aliases: &mut BTreeMap<String, FieldId>,
    name: &str,
    ty: TypeId,
    description: String,
) {
    if let Some(previous) = aliases.get(name).copied() {
        if let Some(old) = graph.field(previous).ty() {
            graph.remove_field_reference(old, previous);
        }
    }
    let field = graph.new_field(name, "", ty, false, vec![description]);
    aliases.insert(name.to_string(), field);
    tracing::debug!(alias = %name, "registered alias");
}

/// Order a pair as (fewer fields, more fields); ties keep argument order
fn least_most(graph: &TypeGraph, a: StructId, b: StructId) -> (StructId, StructId) {
    if graph.strukt(a).fields.len() > graph.strukt(b).fields.len() {
        (b, a)
    } else {
        (a, b)
    }
}

/// Whether `a` and `b` can be merged into one record
pub fn unifiable(graph: &TypeGraph, a: StructId, b: StructId) -> bool {
    if a == b {
        return false;
    }
    let (least, most) = least_most(graph, a, b);
    let (least, most) = (graph.strukt(least), graph.strukt(most));
    if least.extra_keys != most.extra_keys {
        return false;
    }

    let mut visited = HashSet::new();
    least.fields.iter().all(|(name, field)| {
        let Some(other) = most.fields.get(name) else {
            return false;
        };
        let (field, other) = (graph.field(*field), graph.field(*other));
        field.json_name == other.json_name
            && match (field.ty(), other.ty()) {
                (Some(x), Some(y)) => same_type(graph, x, y, &mut visited),
                _ => false,
            }
    })
}

/// Structural type equality; nested records must match field for field
fn same_type(graph: &TypeGraph, a: TypeId, b: TypeId, visited: &mut HashSet<(TypeId, TypeId)>) -> bool {
    if a == b || !visited.insert((a, b)) {
        return true;
    }
    let (x, y) = (graph.ty(a), graph.ty(b));
    match (x.kind, y.kind) {
        (TypeKind::Primitive(p), TypeKind::Primitive(q)) => p == q,
        (TypeKind::Interface, TypeKind::Interface) => true,
        (TypeKind::Array, TypeKind::Array) | (TypeKind::Map, TypeKind::Map) => {
            x.name == y.name
                && match (x.sub_type, y.sub_type) {
                    (Some(s), Some(t)) => same_type(graph, s, t, visited),
                    (None, None) => true,
                    _ => false,
                }
        }
        (TypeKind::Object, TypeKind::Object) => {
            if x.name != y.name {
                return false;
            }
            match (x.record, y.record) {
                (Some(r), Some(s)) => {
                    let (r, s) = (graph.strukt(r), graph.strukt(s));
                    r.extra_keys == s.extra_keys
                        && r.fields.len() == s.fields.len()
                        && r.fields.iter().all(|(name, field)| {
                            s.fields.get(name).is_some_and(|other| {
                                let (field, other) = (graph.field(*field), graph.field(*other));
                                field.json_name == other.json_name
                                    && match (field.ty(), other.ty()) {
                                        (Some(f), Some(g)) => same_type(graph, f, g, visited),
                                        _ => false,
                                    }
                            })
                        })
                }
                _ => false,
            }
        }
        _ => false,
    }
}

/// Merge two unifiable records; returns the survivor
fn merge(graph: &mut TypeGraph, a: StructId, b: StructId) -> StructId {
    let (least, most) = least_most(graph, a, b);

    let absorbed: Vec<(String, Vec<String>)> = graph
        .strukt(least)
        .fields
        .iter()
        .map(|(name, field)| (name.clone(), graph.field(*field).descriptions.clone()))
        .collect();
    for (name, descriptions) in absorbed {
        if let Some(kept) = graph.strukt(most).fields.get(&name).copied() {
            let kept = graph.field_mut(kept);
            for description in descriptions {
                if !kept.descriptions.contains(&description) {
                    kept.descriptions.push(description);
                }
            }
        }
    }

    let (least_ty, most_ty) = (graph.strukt(least).type_id, graph.strukt(most).type_id);
    if graph.ty(least_ty).is_root {
        graph.ty_mut(most_ty).is_root = true;
    }
    graph.replace(most_ty, least_ty);
    graph.detach_struct(least);
    tracing::debug!(
        survivor = %graph.strukt(most).source,
        discarded = %graph.strukt(least).source,
        "unified records"
    );
    most
}
