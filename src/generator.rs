use crate::describer::ModelDescriber;
use crate::error::{Error, Result};
use crate::model::Model;
use crate::registry::{Definitions, ModelRegistry};
use crate::schema::Schema;
use log::debug;

/// Drives the model registry work queue.
///
/// Models registered here (or transitively by a describer while resolving
/// nested fields) are synthesized one by one: each pending model is handed
/// to the first describer whose `supports` returns true, and the finished
/// definition is frozen in the registry. Recursive registrations during a
/// `describe` call simply extend the queue, so arbitrarily nested type
/// graphs flatten into one definitions table.
pub struct DefinitionGenerator {
    describers: Vec<Box<dyn ModelDescriber>>,
    registry: ModelRegistry,
}

impl DefinitionGenerator {
    pub fn new(describers: Vec<Box<dyn ModelDescriber>>) -> Self {
        debug!("initializing DefinitionGenerator with {} describers", describers.len());
        Self {
            describers,
            registry: ModelRegistry::new(),
        }
    }

    /// Register a root model and return its `$ref` path
    pub fn register(&mut self, model: Model) -> String {
        self.registry.register(model)
    }

    /// Synthesize definitions until no model is pending.
    ///
    /// Fails with [`Error::UnsupportedModel`] when no describer claims a
    /// pending model, and propagates describer errors.
    pub fn generate(&mut self) -> Result<()> {
        while let Some((model, name)) = self.registry.next_pending() {
            debug!("resolving model '{}' as definition '{}'", model.type_name(), name);
            let describer = self
                .describers
                .iter()
                .find(|describer| describer.supports(&model))
                .ok_or_else(|| Error::UnsupportedModel(model.type_name().to_string()))?;

            let mut schema = Schema::new();
            describer.describe(&model, &mut schema, &mut self.registry)?;
            self.registry.complete(&name, schema);
        }
        Ok(())
    }

    pub fn definitions(&self) -> &Definitions {
        self.registry.definitions()
    }

    pub fn into_definitions(self) -> Definitions {
        self.registry.into_definitions()
    }
}
