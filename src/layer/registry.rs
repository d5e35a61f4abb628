use std::collections::BTreeMap;
use std::fmt;

use crate::foundation::error::{LayersError, LayersResult};
use crate::layer::behavior::{Layer, LayerType};

type Factory = fn() -> Box<dyn Layer>;

fn make<L: LayerType>() -> Box<dyn Layer> {
    Box::new(L::default())
}

/// Maps stable layer type tags to factories.
///
/// Persisted stack entries carry only the tag, so every type that may appear in saved state
/// must be registered before the stack is restored.
#[derive(Clone, Default)]
pub struct LayerRegistry {
    factories: BTreeMap<&'static str, Factory>,
}

impl LayerRegistry {
    /// Empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `L` under [`LayerType::TAG`].
    pub fn register<L: LayerType>(&mut self) -> &mut Self {
        if self.factories.insert(L::TAG, make::<L>).is_some() {
            tracing::warn!(tag = L::TAG, "layer factory registered twice");
        }
        self
    }

    /// Builder form of [`LayerRegistry::register`].
    pub fn with<L: LayerType>(mut self) -> Self {
        self.register::<L>();
        self
    }

    /// Whether a factory exists for `tag`.
    pub fn contains(&self, tag: &str) -> bool {
        self.factories.contains_key(tag)
    }

    /// Registered tags in sorted order.
    pub fn tags(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.factories.keys().copied()
    }

    pub(crate) fn create(&self, tag: &str) -> LayersResult<Box<dyn Layer>> {
        let factory = self
            .factories
            .get(tag)
            .ok_or_else(|| LayersError::instantiation(tag))?;
        Ok(factory())
    }
}

impl fmt::Debug for LayerRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.factories.keys()).finish()
    }
}
