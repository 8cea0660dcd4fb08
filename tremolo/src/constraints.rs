//! Event-type ontology used to constrain gold construction and decoding.

use std::io::{BufRead, BufReader, Read};

use hashbrown::{HashMap, HashSet};

use crate::errors::{Result, TremoloError};

/// Immutable lookup tables describing the event-type ontology.
///
/// Constructed once per run, then shared read-only by gold construction,
/// feature templates, and the decoders. Queries fall back to permissive
/// defaults, so an incomplete ontology degrades to unconstrained search
/// rather than failing.
#[derive(Debug, Clone, Default)]
pub struct TypeConstraints {
    super_types: HashMap<String, String>,
    supertype_exceptions: HashSet<String>,
    compatible_entities: HashMap<String, HashSet<String>>,
    roles: HashMap<String, Vec<String>>,
    independent_roles: HashSet<String>,
}

impl TypeConstraints {
    /// Creates an empty, fully permissive ontology.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers an event type under its supertype.
    pub fn add_event_type(&mut self, event_type: &str, super_type: &str) {
        self.super_types
            .insert(event_type.to_string(), super_type.to_string());
    }

    /// Registers a role for an event type. Roles keep insertion order so
    /// decoding enumerates them deterministically.
    pub fn add_role(&mut self, event_type: &str, role: &str) {
        let roles = self.roles.entry(event_type.to_string()).or_default();
        if !roles.iter().any(|r| r == role) {
            roles.push(role.to_string());
        }
    }

    /// Registers an entity/value/time mention type as a legal argument
    /// filler for an event type.
    pub fn add_compatible_entity(&mut self, event_type: &str, entity_type: &str) {
        self.compatible_entities
            .entry(event_type.to_string())
            .or_default()
            .insert(entity_type.to_string());
    }

    /// Marks a role whose features do not condition on the event type
    /// (for example locations and time expressions).
    pub fn mark_independent_role(&mut self, role: &str) {
        self.independent_roles.insert(role.to_string());
    }

    /// Excludes an event type from the supertype backoff feature.
    ///
    /// Intended for types whose supertype carries no extra information,
    /// such as the sole member of its supertype.
    pub fn mark_supertype_exception(&mut self, event_type: &str) {
        self.supertype_exceptions.insert(event_type.to_string());
    }

    /// Returns the supertype of `event_type` if registered.
    pub fn super_type(&self, event_type: &str) -> Option<&str> {
        self.super_types.get(event_type).map(String::as_str)
    }

    /// Checks if the supertype backoff feature applies to `event_type`.
    pub fn has_supertype_backoff(&self, event_type: &str) -> bool {
        self.super_types.contains_key(event_type)
            && !self.supertype_exceptions.contains(event_type)
    }

    /// Checks if a mention of `entity_type` may fill an argument slot of
    /// `event_type`. Event types without a registered entity set accept
    /// every mention type.
    pub fn is_entity_compatible(&self, event_type: &str, entity_type: &str) -> bool {
        match self.compatible_entities.get(event_type) {
            Some(entities) => entities.contains(entity_type),
            None => true,
        }
    }

    /// Returns the registered roles of `event_type`, empty when unknown.
    pub fn roles_for(&self, event_type: &str) -> &[String] {
        self.roles
            .get(event_type)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Checks if `role` is independent of the event type.
    pub fn is_independent_role(&self, role: &str) -> bool {
        self.independent_roles.contains(role)
    }

    /// Reads an ontology from a tagged-line definition.
    ///
    /// Recognized lines, tab-separated; empty lines and lines starting with
    /// `#` are skipped:
    ///
    /// ```text
    /// event<TAB>Attack<TAB>Conflict
    /// role<TAB>Attack<TAB>Attacker
    /// entity<TAB>Attack<TAB>PER
    /// independent<TAB>Place
    /// exception<TAB>Transport
    /// ```
    ///
    /// # Errors
    ///
    /// [`TremoloError`] is returned when a line has an unknown tag or too
    /// few fields.
    pub fn from_reader<R>(rdr: R) -> Result<Self>
    where
        R: Read,
    {
        let reader = BufReader::new(rdr);
        let mut constraints = Self::new();
        for (line_no, line) in reader.lines().enumerate() {
            let line = line?;
            let line = line.trim_end();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let cols: Vec<&str> = line.split('\t').collect();
            let too_few = || {
                TremoloError::invalid_format(
                    "ontology",
                    format!("line {}: too few fields: {line}", line_no + 1),
                )
            };
            match cols[0] {
                "event" => match cols.as_slice() {
                    [_, event, sup] => constraints.add_event_type(event, sup),
                    _ => return Err(too_few()),
                },
                "role" => match cols.as_slice() {
                    [_, event, role] => constraints.add_role(event, role),
                    _ => return Err(too_few()),
                },
                "entity" => match cols.as_slice() {
                    [_, event, entity] => constraints.add_compatible_entity(event, entity),
                    _ => return Err(too_few()),
                },
                "independent" => match cols.as_slice() {
                    [_, role] => constraints.mark_independent_role(role),
                    _ => return Err(too_few()),
                },
                "exception" => match cols.as_slice() {
                    [_, event] => constraints.mark_supertype_exception(event),
                    _ => return Err(too_few()),
                },
                tag => {
                    return Err(TremoloError::invalid_format(
                        "ontology",
                        format!("line {}: unknown tag: {tag}", line_no + 1),
                    ));
                }
            }
        }
        Ok(constraints)
    }
}
