use std::rc::Rc;

use crate::animation::spec::AnimationSet;
use crate::foundation::error::{LayersError, LayersResult};
use crate::foundation::ids::{EntryId, LayoutRes, raw_to_res, res_to_raw};
use crate::host::context::HostContext;
use crate::layer::live::LiveLayer;
use crate::state::bundle::{Bundle, SparseArray};
use crate::state::parcel::{Parcel, ParcelReader, Parcelable};
use crate::state::value::Value;

const VIEW_STATE: &str = "STACK_ENTRY.VIEW_STATE";

/// Whether layers below an entry stay visible.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Visibility {
    /// Layers below remain visible.
    Transparent,
    /// Hides everything below.
    #[default]
    Opaque,
}

impl Visibility {
    pub(crate) fn to_raw(self) -> i32 {
        match self {
            Self::Transparent => 0,
            Self::Opaque => 1,
        }
    }

    pub(crate) fn from_raw(raw: i32) -> LayersResult<Self> {
        match raw {
            0 => Ok(Self::Transparent),
            1 => Ok(Self::Opaque),
            other => Err(LayersError::serde(format!("unknown visibility {other}"))),
        }
    }
}

/// How far an entry has been brought up.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub(crate) enum LayerState {
    Empty,
    Created,
    ViewCreated,
}

/// Requested target of [`LayerStack::move_to_state`](crate::stack::layer_stack::LayerStack).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum TargetState {
    Created,
    ViewCreated,
    ViewDestroyed,
    Destroyed,
}

impl TargetState {
    pub(crate) fn resolve(self) -> LayerState {
        match self {
            Self::Created | Self::ViewDestroyed => LayerState::Created,
            Self::ViewCreated => LayerState::ViewCreated,
            Self::Destroyed => LayerState::Empty,
        }
    }

    pub(crate) fn is_upward(self) -> bool {
        matches!(self, Self::Created | Self::ViewCreated)
    }
}

/// The persisted half of a stack entry.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct EntryRecord {
    pub(crate) layer_type: String,
    pub(crate) name: Option<String>,
    pub(crate) arguments: Option<Bundle>,
    pub(crate) layer_state: Option<Bundle>,
    pub(crate) view_state: Option<SparseArray<Value>>,
    pub(crate) visibility: Visibility,
    pub(crate) layout: Option<LayoutRes>,
    pub(crate) animations: Option<AnimationSet>,
}

impl EntryRecord {
    pub(crate) fn new(layer_type: impl Into<String>, visibility: Visibility) -> Self {
        Self {
            layer_type: layer_type.into(),
            name: None,
            arguments: None,
            layer_state: None,
            view_state: None,
            visibility,
            layout: None,
            animations: None,
        }
    }
}

impl Parcelable for EntryRecord {
    const PARCEL_TAG: &'static str = "layers.StackEntry";

    fn write_to_parcel(&self, out: &mut Parcel) {
        out.write_string(Some(&self.layer_type));
        out.write_string(self.name.as_deref());
        out.write_bundle(self.arguments.as_ref());
        out.write_bundle(self.layer_state.as_ref());
        let mut view_bundle = Bundle::new();
        if let Some(view_state) = &self.view_state {
            view_bundle.put(VIEW_STATE, view_state.clone());
        }
        out.write_bundle(Some(&view_bundle));
        out.write_int(self.visibility.to_raw());
        out.write_int(res_to_raw(self.layout.map(|l| l.0)));
        match self.animations {
            None => out.write_int(0),
            Some(set) => {
                out.write_int(1);
                out.write_int_array(&set.to_raw());
            }
        }
    }

    fn read_from_parcel(input: &mut ParcelReader<'_>) -> LayersResult<Self> {
        let layer_type = input
            .read_string()?
            .ok_or_else(|| LayersError::serde("stack entry without layer type"))?;
        let name = input.read_string()?;
        let arguments = input.read_bundle()?;
        let layer_state = input.read_bundle()?;
        let view_state = input
            .read_bundle()?
            .and_then(|b| b.get::<SparseArray<Value>>(VIEW_STATE));
        let visibility = Visibility::from_raw(input.read_int()?)?;
        let layout = raw_to_res(input.read_int()?).map(LayoutRes);
        let animations = if input.read_int()? > 0 {
            Some(AnimationSet::from_raw(&input.read_int_array()?)?)
        } else {
            None
        };
        Ok(Self {
            layer_type,
            name,
            arguments,
            layer_state,
            view_state,
            visibility,
            layout,
            animations,
        })
    }
}

/// One slot of a stack: the persisted record plus runtime state.
#[derive(Debug)]
pub(crate) struct StackEntry {
    pub(crate) id: EntryId,
    pub(crate) record: EntryRecord,
    pub(crate) live: Option<LiveLayer>,
    pub(crate) state: LayerState,
    pub(crate) valid: bool,
    pub(crate) in_transition: bool,
}

impl StackEntry {
    pub(crate) fn new(id: EntryId, record: EntryRecord) -> Self {
        Self {
            id,
            record,
            live: None,
            state: LayerState::Empty,
            valid: true,
            in_transition: false,
        }
    }

    pub(crate) fn is_opaque(&self) -> bool {
        self.record.visibility == Visibility::Opaque
    }

    pub(crate) fn has_view(&self) -> bool {
        self.live.as_ref().is_some_and(|l| l.view().is_some())
    }

    /// Live instance, created from the registry on first call.
    pub(crate) fn instantiate(&mut self, host: &Rc<HostContext>) -> LayersResult<&mut LiveLayer> {
        if self.live.is_none() {
            let behavior = host.registry().create(&self.record.layer_type)?;
            self.live = Some(LiveLayer::new(
                self.id,
                &self.record.layer_type,
                behavior,
                host,
            ));
        }
        self.live
            .as_mut()
            .ok_or_else(|| LayersError::consistency("layer instance must exist"))
    }

    pub(crate) fn live_mut(&mut self) -> LayersResult<&mut LiveLayer> {
        self.live
            .as_mut()
            .ok_or_else(|| LayersError::consistency("layer instance must exist"))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/stack/entry.rs"]
mod tests;
