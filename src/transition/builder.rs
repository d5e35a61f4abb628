use crate::animation::spec::{AnimationSet, AnimationType};
use crate::foundation::error::{LayersError, LayersResult};
use crate::foundation::ids::{AnimRes, LayoutRes};
use crate::layer::behavior::{Layer, LayerType};
use crate::stack::entry::{EntryRecord, Visibility};
use crate::state::bundle::Bundle;

/// Which stack mutation a transition performs.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TransitionKind {
    /// Insert a new layer.
    Add,
    /// Take an existing layer off the stack.
    Remove,
    /// Insert a new layer above an existing one, then remove the existing one.
    Replace,
}

pub(crate) type Configurator = Box<dyn FnOnce(&mut dyn Layer) -> LayersResult<()>>;

/// Options of one stack mutation, filled in by the closure passed to
/// [`Layers::add`](crate::Layers::add) and friends.
///
/// Options that make no sense for the kind at hand (for example a name on a removal) are
/// recorded as misuse and reported when the transition is enqueued.
pub struct TransitionBuilder {
    kind: TransitionKind,
    pub(crate) name: Option<String>,
    pub(crate) arguments: Option<Bundle>,
    pub(crate) visibility: Option<Visibility>,
    pub(crate) layout: Option<LayoutRes>,
    pub(crate) animations: Option<AnimationSet>,
    pub(crate) index: Option<usize>,
    pub(crate) animation_enabled: bool,
    pub(crate) configure: Option<Configurator>,
    pub(crate) expected_tag: Option<&'static str>,
    pub(crate) errors: Vec<String>,
}

impl TransitionBuilder {
    pub(crate) fn new(kind: TransitionKind) -> Self {
        Self {
            kind,
            name: None,
            arguments: None,
            visibility: None,
            layout: None,
            animations: None,
            index: None,
            animation_enabled: true,
            configure: None,
            expected_tag: None,
            errors: Vec::new(),
        }
    }

    /// Kind of mutation being configured.
    pub fn kind(&self) -> TransitionKind {
        self.kind
    }

    fn reject_on_remove(&mut self, what: &str) -> bool {
        if self.kind == TransitionKind::Remove {
            self.errors
                .push(format!("Unable to set {what} when removing layer"));
            return true;
        }
        false
    }

    /// Entry name, used by lookups and [`Layers::pop_layers_to`](crate::Layers::pop_layers_to).
    pub fn name(&mut self, name: impl Into<String>) -> &mut Self {
        if !self.reject_on_remove("name") {
            self.name = Some(name.into());
        }
        self
    }

    /// Arguments handed to the layer.
    pub fn arguments(&mut self, arguments: Bundle) -> &mut Self {
        if !self.reject_on_remove("arguments") {
            self.arguments = Some(arguments);
        }
        self
    }

    /// Whether the layer hides everything below it.
    pub fn opaque(&mut self, opaque: bool) -> &mut Self {
        self.visibility = Some(if opaque {
            Visibility::Opaque
        } else {
            Visibility::Transparent
        });
        self
    }

    /// Layout override for the layer's view.
    pub fn layout(&mut self, layout: LayoutRes) -> &mut Self {
        self.layout = Some(layout);
        self
    }

    /// Animations used when this layer comes in: `out_anim` for layers below, `in_anim` for
    /// this one.
    pub fn in_animation(&mut self, out_anim: AnimRes, in_anim: AnimRes) -> &mut Self {
        if !self.reject_on_remove("intro animation") {
            let set = self.animations.get_or_insert_with(AnimationSet::default);
            set.set(AnimationType::LowerOut, Some(out_anim));
            set.set(AnimationType::UpperIn, Some(in_anim));
        }
        self
    }

    /// Animations used when this layer leaves: `out_anim` for this one, `in_anim` for layers
    /// coming back from below.
    pub fn out_animation(&mut self, out_anim: AnimRes, in_anim: AnimRes) -> &mut Self {
        let set = self.animations.get_or_insert_with(AnimationSet::default);
        set.set(AnimationType::UpperOut, Some(out_anim));
        set.set(AnimationType::LowerIn, Some(in_anim));
        self
    }

    /// Stack position: insertion point for adds, replaced entry for replaces.
    pub fn index(&mut self, index: usize) -> &mut Self {
        if !self.reject_on_remove("index") {
            self.index = Some(index);
        }
        self
    }

    /// Per-transition animation switch.
    pub fn animation_enabled(&mut self, enabled: bool) -> &mut Self {
        self.animation_enabled = enabled;
        self
    }

    /// Configure the layer instance right after it is instantiated, before `on_create`.
    pub fn with_layer<L: LayerType>(&mut self, f: impl FnOnce(&mut L) + 'static) -> &mut Self {
        if let Some(expected) = self.expected_tag
            && expected != L::TAG
        {
            self.errors.push(format!(
                "with_layer expects '{}' but the transition targets '{expected}'",
                L::TAG
            ));
            return self;
        }
        self.expected_tag = Some(L::TAG);
        self.configure = Some(Box::new(move |layer: &mut dyn Layer| {
            let layer = layer.downcast_mut::<L>().ok_or_else(|| {
                LayersError::argument(format!("layer is not a '{}'", L::TAG))
            })?;
            f(layer);
            Ok(())
        }));
        self
    }

    pub(crate) fn with_expected_tag(mut self, tag: &'static str) -> Self {
        self.expected_tag = Some(tag);
        self
    }

    /// Persisted record for a new entry.
    pub(crate) fn record(&mut self, tag: &str, default_visibility: Visibility) -> EntryRecord {
        let mut record = EntryRecord::new(tag, self.visibility.unwrap_or(default_visibility));
        record.name = self.name.take();
        record.arguments = self.arguments.take();
        record.layout = self.layout;
        record.animations = self.animations;
        record
    }

    /// Apply overrides allowed on a removal to the existing entry.
    pub(crate) fn apply_to(&self, record: &mut EntryRecord) {
        if let Some(visibility) = self.visibility {
            record.visibility = visibility;
        }
        if let Some(layout) = self.layout {
            record.layout = Some(layout);
        }
        if let Some(set) = self.animations {
            let merged = record.animations.get_or_insert_with(AnimationSet::default);
            for kind in AnimationType::ALL {
                if let Some(res) = set.get(kind) {
                    merged.set(kind, Some(res));
                }
            }
        }
    }
}

impl std::fmt::Debug for TransitionBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TransitionBuilder")
            .field("kind", &self.kind)
            .field("name", &self.name)
            .field("index", &self.index)
            .field("errors", &self.errors)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/transition/builder.rs"]
mod tests;
