use std::collections::HashMap;

use grid_model::{LinearMapping, Mapping};

use crate::GridXmlError;

type MappingFactory = Box<dyn Fn() -> Box<dyn Mapping>>;

/// Name-to-factory table resolving a `mapping` element's declared `type`
/// attribute to a concrete [`Mapping`] instance.
///
/// The registry must be fully populated before a parse begins and is only
/// borrowed immutably while one is running; registering additional types lets
/// documents reference new transformation kinds without touching the reader's
/// control flow.
#[derive(Default)]
pub struct MappingRegistry {
    factories: HashMap<String, MappingFactory>,
}

impl MappingRegistry {
    /// An empty registry with no types registered.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry with the built-in [`LinearMapping`] registered.
    #[must_use]
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        registry.register(LinearMapping::TYPE_NAME, || {
            Box::new(LinearMapping::default())
        });
        registry
    }

    /// Register `factory` under `name`. The last registration for a name
    /// wins.
    pub fn register(
        &mut self,
        name: impl Into<String>,
        factory: impl Fn() -> Box<dyn Mapping> + 'static,
    ) {
        self.factories.insert(name.into(), Box::new(factory));
    }

    /// Produce a fresh mapping for `name`, or
    /// [`GridXmlError::UnknownMappingType`] if nothing is registered under
    /// it.
    pub fn create(&self, name: &str) -> Result<Box<dyn Mapping>, GridXmlError> {
        match self.factories.get(name) {
            Some(factory) => Ok(factory()),
            None => Err(GridXmlError::UnknownMappingType(name.to_owned())),
        }
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.factories.contains_key(name)
    }
}
