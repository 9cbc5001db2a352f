use crate::model::Model;
use crate::schema::Schema;
use log::debug;
use std::collections::{BTreeMap, HashMap, HashSet, VecDeque};

/// The flat definitions table produced by a generation run
pub type Definitions = BTreeMap<String, Schema>;

/// Deduplication table mapping model identity to a stable reference name.
///
/// Registering a model assigns it a definition name and queues it for
/// synthesis; re-registering an equal identity returns the previously
/// assigned name without re-synthesizing. Describers re-enter the registry
/// while resolving nested fields, so registration never synthesizes
/// in place; a driver loop drains the pending queue instead.
#[derive(Debug, Default)]
pub struct ModelRegistry {
    /// Model identity key -> assigned definition name
    names: HashMap<String, String>,
    /// Names already taken, for collision suffixing
    taken: HashSet<String>,
    /// Registered models awaiting synthesis
    pending: VecDeque<(Model, String)>,
    /// Completed definitions, frozen once stored
    definitions: Definitions,
}

impl ModelRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a model and return its `$ref` path.
    pub fn register(&mut self, model: Model) -> String {
        let key = model.identity_key();
        if let Some(name) = self.names.get(&key) {
            debug!("model '{}' already registered as '{}'", model.type_name(), name);
            return Self::ref_path(name);
        }

        let name = self.unique_name(model.short_name());
        debug!("registering model '{}' as definition '{}'", model.type_name(), name);
        self.names.insert(key, name.clone());
        self.taken.insert(name.clone());
        let reference = Self::ref_path(&name);
        self.pending.push_back((model, name));
        reference
    }

    /// Next model still awaiting synthesis, with its assigned name
    pub(crate) fn next_pending(&mut self) -> Option<(Model, String)> {
        self.pending.pop_front()
    }

    /// Store the finished definition for `name`. The definition is frozen
    /// from this point on.
    pub(crate) fn complete(&mut self, name: &str, schema: Schema) {
        debug!("definition '{}' completed", name);
        self.definitions.insert(name.to_string(), schema);
    }

    pub fn has_pending(&self) -> bool {
        !self.pending.is_empty()
    }

    pub fn definitions(&self) -> &Definitions {
        &self.definitions
    }

    pub fn into_definitions(self) -> Definitions {
        self.definitions
    }

    /// Distinct identities colliding on the short name get a numeric suffix
    fn unique_name(&self, base: &str) -> String {
        if !self.taken.contains(base) {
            return base.to_string();
        }
        let mut counter = 2;
        loop {
            let candidate = format!("{}{}", base, counter);
            if !self.taken.contains(&candidate) {
                return candidate;
            }
            counter += 1;
        }
    }

    fn ref_path(name: &str) -> String {
        format!("#/definitions/{}", name)
    }
}
