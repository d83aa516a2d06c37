//! Graph helpers shared by the entity builders
//!
//! Reference handling on JSON-LD nodes, first-wins deduplication of the flat
//! `@graph`, and a structural audit of a finished graph.

use serde_json::{json, Map, Value};
use std::collections::{BTreeMap, BTreeSet, VecDeque};
use std::fmt;

use crate::id::{classify_id, IdKind};
use crate::vocab::{DATA_REUSE_LICENSE, ROOT_ENTITY_ID};

/// Extract @id from an entity
pub fn extract_id(entity: &Value) -> Option<&str> {
    entity.get("@id").and_then(|v| v.as_str())
}

/// Extract @type as a list of type names
pub fn extract_types(entity: &Value) -> Vec<String> {
    match entity.get("@type") {
        Some(Value::String(t)) => vec![t.clone()],
        Some(Value::Array(arr)) => arr
            .iter()
            .filter_map(|v| v.as_str().map(String::from))
            .collect(),
        _ => vec![],
    }
}

/// Check if an entity has a specific @type
pub fn has_type(entity: &Value, type_name: &str) -> bool {
    extract_types(entity).iter().any(|t| t == type_name)
}

/// `{"@id": id}`
pub fn reference(id: &str) -> Value {
    json!({ "@id": id })
}

/// The ids referenced by a property value (a single reference or an array of them)
pub fn reference_ids(value: &Value) -> Vec<&str> {
    match value {
        Value::Object(obj) => obj.get("@id").and_then(Value::as_str).into_iter().collect(),
        Value::Array(arr) => arr
            .iter()
            .filter_map(|v| v.get("@id").and_then(Value::as_str))
            .collect(),
        _ => vec![],
    }
}

/// Ids referenced by `entity[key]`
pub fn property_ids<'a>(entity: &'a Value, key: &str) -> Vec<&'a str> {
    entity.get(key).map(reference_ids).unwrap_or_default()
}

fn object_mut(entity: &mut Value) -> Option<&mut Map<String, Value>> {
    entity.as_object_mut()
}

/// Set `entity[key]`, ignoring non-object values
pub fn set_property(entity: &mut Value, key: &str, value: Value) {
    if let Some(obj) = object_mut(entity) {
        obj.insert(key.to_string(), value);
    }
}

/// Set `entity[key]` only when it is not present yet
pub fn set_default(entity: &mut Value, key: &str, value: Value) {
    if let Some(obj) = object_mut(entity) {
        obj.entry(key.to_string()).or_insert(value);
    }
}

pub fn has_property(entity: &Value, key: &str) -> bool {
    entity.get(key).is_some()
}

/// Add a reference under `key`, keeping a lone reference bare
///
/// The first reference is stored as `{"@id"}`; a second distinct one turns the
/// value into an array. Repeated ids are ignored.
pub fn append_reference(entity: &mut Value, key: &str, id: &str) {
    let Some(obj) = object_mut(entity) else {
        return;
    };
    let new_ref = reference(id);
    match obj.get_mut(key) {
        None => {
            obj.insert(key.to_string(), new_ref);
        }
        Some(Value::Array(arr)) => {
            if !arr.contains(&new_ref) {
                arr.push(new_ref);
            }
        }
        Some(current) => {
            if *current != new_ref {
                let existing = current.take();
                *current = json!([existing, new_ref]);
            }
        }
    }
}

/// Add a reference under `key`, always storing an array
pub fn push_reference(entity: &mut Value, key: &str, id: &str) {
    let Some(obj) = object_mut(entity) else {
        return;
    };
    let new_ref = reference(id);
    let mut refs: Vec<Value> = match obj.remove(key) {
        Some(Value::Array(arr)) => arr,
        Some(v) => vec![v],
        None => vec![],
    };
    if !refs.contains(&new_ref) {
        refs.push(new_ref);
    }
    obj.insert(key.to_string(), Value::Array(refs));
}

/// A bare reference for one id, an array of references for several
pub fn references_value(ids: &[String]) -> Value {
    match ids {
        [single] => reference(single),
        many => Value::Array(many.iter().map(|id| reference(id)).collect()),
    }
}

/// Wire `parent hasPart child` together with `child isPartOf parent`
pub fn link_containment(parent: &mut Value, child: &mut Value) {
    let (Some(parent_id), Some(child_id)) = (
        extract_id(parent).map(String::from),
        extract_id(child).map(String::from),
    ) else {
        return;
    };
    push_reference(parent, "hasPart", &child_id);
    if let Some(obj) = object_mut(child) {
        obj.insert("isPartOf".to_string(), reference(&parent_id));
    }
}

/// Drop later entities whose @id was already seen
pub fn unique_entries(entries: Vec<Value>) -> Vec<Value> {
    let mut seen = BTreeSet::new();
    entries
        .into_iter()
        .filter(|entry| match extract_id(entry) {
            Some(id) => seen.insert(id.to_string()),
            None => true,
        })
        .collect()
}

/// First File or Dataset id emitted twice with different content
///
/// Identical repeats are left to `unique_entries`.
pub fn find_structural_collision(entries: &[Value]) -> Option<String> {
    let mut seen: BTreeMap<&str, &Value> = BTreeMap::new();
    for entry in entries {
        if !(has_type(entry, "File") || has_type(entry, "Dataset")) {
            continue;
        }
        let Some(id) = extract_id(entry) else {
            continue;
        };
        match seen.get(id) {
            Some(first) if *first != entry => return Some(id.to_string()),
            Some(_) => {}
            None => {
                seen.insert(id, entry);
            }
        }
    }
    None
}

/// Remove repeated references from every `hasPart` array
pub fn dedupe_has_part(graph: &mut [Value]) {
    for entity in graph.iter_mut() {
        if let Some(Value::Array(parts)) = entity.get_mut("hasPart") {
            let mut seen = BTreeSet::new();
            parts.retain(|part| match part.get("@id").and_then(Value::as_str) {
                Some(id) => seen.insert(id.to_string()),
                None => true,
            });
        }
    }
}

/// Get all @id values referenced within an entity's properties
pub fn get_referenced_ids(entity: &Value) -> BTreeSet<String> {
    let mut ids = BTreeSet::new();
    collect_referenced_ids(entity, &mut ids);
    ids
}

fn collect_referenced_ids(value: &Value, ids: &mut BTreeSet<String>) {
    match value {
        Value::Object(obj) => {
            if let Some(Value::String(id)) = obj.get("@id") {
                if obj.len() == 1 {
                    ids.insert(id.clone());
                }
            }
            for (key, v) in obj {
                if key != "@id" && key != "@type" {
                    collect_referenced_ids(v, ids);
                }
            }
        }
        Value::Array(arr) => {
            for item in arr {
                collect_referenced_ids(item, ids);
            }
        }
        _ => {}
    }
}

/// A structural law broken by a graph
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Violation {
    DuplicateId(String),
    /// `parent hasPart child` without `child isPartOf parent`
    MissingIsPartOf { parent: String, child: String },
    /// `subject subjectOf|image object` without `object about subject`
    MissingAbout { subject: String, object: String },
    /// Language, term or license node nothing refers to
    Orphan(String),
    /// `hasPart` on a Person or a session event
    HasPartOnNonContainer(String),
    /// `pcdm:hasMember` used below the root
    NestedHasMember(String),
    /// File not reachable from the root
    Unreachable(String),
    /// Reference to a local id that no entity in the graph carries
    Dangling { subject: String, target: String },
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Violation::DuplicateId(id) => write!(f, "duplicate @id '{}'", id),
            Violation::MissingIsPartOf { parent, child } => {
                write!(f, "'{}' hasPart '{}' but the child has no matching isPartOf", parent, child)
            }
            Violation::MissingAbout { subject, object } => {
                write!(f, "'{}' links to '{}' but the target has no matching about", subject, object)
            }
            Violation::Orphan(id) => write!(f, "'{}' is never referenced", id),
            Violation::HasPartOnNonContainer(id) => {
                write!(f, "'{}' carries hasPart but is not a container", id)
            }
            Violation::NestedHasMember(id) => {
                write!(f, "'{}' uses pcdm:hasMember below the root", id)
            }
            Violation::Unreachable(id) => write!(f, "'{}' is not reachable from the root", id),
            Violation::Dangling { subject, target } => {
                write!(f, "'{}' refers to '{}' which is not in the graph", subject, target)
            }
        }
    }
}

fn is_contextual_vocabulary(entity: &Value) -> bool {
    ["Language", "DefinedTerm", "DefinedTermSet", DATA_REUSE_LICENSE]
        .iter()
        .any(|t| has_type(entity, t))
}

/// Ids that must resolve inside the graph; vocabulary terms and web IRIs need not
fn is_local_id(id: &str) -> bool {
    !matches!(classify_id(id), IdKind::Compact | IdKind::Absolute)
}

/// Check a finished graph against the structural laws of the export
pub fn audit(graph: &[Value]) -> Vec<Violation> {
    let mut violations = Vec::new();
    let mut index: BTreeMap<&str, &Value> = BTreeMap::new();

    for entity in graph {
        if let Some(id) = extract_id(entity) {
            if index.insert(id, entity).is_some() {
                violations.push(Violation::DuplicateId(id.to_string()));
            }
        }
    }

    let mut referenced: BTreeSet<String> = BTreeSet::new();
    for entity in graph {
        let own = extract_id(entity).unwrap_or_default();
        for target in get_referenced_ids(entity) {
            if is_local_id(&target) && !index.contains_key(target.as_str()) {
                violations.push(Violation::Dangling {
                    subject: own.to_string(),
                    target: target.clone(),
                });
            }
            if target != own {
                referenced.insert(target);
            }
        }
    }

    for entity in graph {
        let Some(id) = extract_id(entity) else {
            continue;
        };

        for child in property_ids(entity, "hasPart") {
            if let Some(target) = index.get(child) {
                if !property_ids(target, "isPartOf").contains(&id) {
                    violations.push(Violation::MissingIsPartOf {
                        parent: id.to_string(),
                        child: child.to_string(),
                    });
                }
            }
        }

        for key in ["subjectOf", "image"] {
            for object in property_ids(entity, key) {
                if let Some(target) = index.get(object) {
                    if !property_ids(target, "about").contains(&id) {
                        violations.push(Violation::MissingAbout {
                            subject: id.to_string(),
                            object: object.to_string(),
                        });
                    }
                }
            }
        }

        let is_event = has_type(entity, "CollectionEvent") && id != ROOT_ENTITY_ID;
        if entity.get("hasPart").is_some() && (has_type(entity, "Person") || is_event) {
            violations.push(Violation::HasPartOnNonContainer(id.to_string()));
        }

        if id != ROOT_ENTITY_ID && entity.get("pcdm:hasMember").is_some() {
            violations.push(Violation::NestedHasMember(id.to_string()));
        }

        if is_contextual_vocabulary(entity) && !referenced.contains(id) {
            violations.push(Violation::Orphan(id.to_string()));
        }
    }

    let reachable = reachable_from_root(&index);
    for entity in graph {
        if let Some(id) = extract_id(entity) {
            if has_type(entity, "File") && !reachable.contains(id) {
                violations.push(Violation::Unreachable(id.to_string()));
            }
        }
    }

    violations
}

/// Ids reachable from the root by one `pcdm:hasMember` hop, then `hasPart` only
pub fn reachable_from_root<'a>(index: &BTreeMap<&'a str, &'a Value>) -> BTreeSet<&'a str> {
    let mut reached = BTreeSet::new();
    let Some(root) = index.get(ROOT_ENTITY_ID) else {
        return reached;
    };
    reached.insert(ROOT_ENTITY_ID);

    let mut queue: VecDeque<&Value> = VecDeque::new();
    for member in property_ids(root, "pcdm:hasMember") {
        if let Some((key, node)) = index.get_key_value(member) {
            if reached.insert(*key) {
                queue.push_back(*node);
            }
        }
    }
    queue.push_back(*root);

    while let Some(node) = queue.pop_front() {
        for part in property_ids(node, "hasPart") {
            if let Some((key, child)) = index.get_key_value(part) {
                if reached.insert(*key) {
                    queue.push_back(*child);
                }
            }
        }
    }

    reached
}

/// Index a graph by @id (first occurrence wins)
pub fn index_by_id(graph: &[Value]) -> BTreeMap<&str, &Value> {
    let mut index = BTreeMap::new();
    for entity in graph {
        if let Some(id) = extract_id(entity) {
            index.entry(id).or_insert(entity);
        }
    }
    index
}
