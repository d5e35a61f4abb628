use std::any::{Any, TypeId};
use std::collections::HashMap;

/// Long-lived presentation state owned by a layer.
///
/// Models survive view teardown and in-memory state restoration. They are cleared when their
/// layer is removed for good.
pub trait ViewModel: Any {
    /// Called once when the owning store is cleared.
    fn on_cleared(&mut self) {}
}

/// Typed container of [`ViewModel`]s, one per concrete type.
#[derive(Default)]
pub struct ViewModelStore {
    models: HashMap<TypeId, Box<dyn ViewModel>>,
}

impl ViewModelStore {
    /// Empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Borrow the model of type `T`, creating it with `init` on first access.
    pub fn get_or_insert_with<T: ViewModel>(&mut self, init: impl FnOnce() -> T) -> &mut T {
        let slot = self
            .models
            .entry(TypeId::of::<T>())
            .or_insert_with(|| Box::new(init()));
        match (slot.as_mut() as &mut dyn Any).downcast_mut::<T>() {
            Some(model) => model,
            None => unreachable!("view model slot is keyed by its own TypeId"),
        }
    }

    /// Borrow the model of type `T` when present.
    pub fn get<T: ViewModel>(&self) -> Option<&T> {
        self.models
            .get(&TypeId::of::<T>())
            .and_then(|m| (m.as_ref() as &dyn Any).downcast_ref::<T>())
    }

    /// Number of live models.
    pub fn len(&self) -> usize {
        self.models.len()
    }

    /// Whether no model was created yet.
    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }

    /// Drop every model, notifying each one first.
    pub fn clear(&mut self) {
        for (_, mut model) in self.models.drain() {
            model.on_cleared();
        }
    }
}

impl std::fmt::Debug for ViewModelStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ViewModelStore")
            .field("models", &self.models.len())
            .finish()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/state/view_model.rs"]
mod tests;
