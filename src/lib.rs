#![forbid(unsafe_code)]
//! Stack-based manager for nested, animated UI layers.
//!
//! A [`Layers`] keeps an ordered stack of [`Layer`]s in a view container. Opaque layers hide
//! whatever is below them, so only layers at or above the topmost opaque entry own views.
//! Stack mutations are queued transitions that may animate, and the whole stack, nested
//! stacks included, can be saved into a [`Bundle`] and restored later.
//!
//! Views live behind the [`ViewBackend`] trait; [`HeadlessBackend`] is an in-memory
//! implementation for tests and tools.

mod animation;
mod backend;
mod foundation;
mod host;
mod layer;
mod manager;
mod stack;
mod state;
mod transition;

pub use animation::ease::Ease;
pub use animation::spec::{
    AnimFrame, AnimationSet, AnimationSpec, AnimationType, Lerp, SlideDir,
};
pub use backend::headless::{ContainerOp, HeadlessBackend};
pub use backend::view::ViewBackend;
pub use foundation::error::{LayersError, LayersResult};
pub use foundation::ids::{AnimRes, ContainerId, EntryId, LayoutRes, ViewId};
pub use host::context::{HostContext, HostEvent, LayersConfig, LifecycleState};
pub use host::root::RootHost;
pub use layer::behavior::{Layer, LayerType};
pub use layer::core::LayerCx;
pub use layer::delegate::{LayerDelegate, LayerDelegates};
pub use layer::dialog::{DialogDelegate, DialogStyle, PANEL_THEME};
pub use layer::live::LiveLayer;
pub use layer::registry::LayerRegistry;
pub use manager::layers::{LayerHandle, Layers};
pub use stack::entry::Visibility;
pub use state::bundle::{Bundle, SparseArray};
pub use state::codec::{Parcelled, Serialized, StateValue};
pub use state::parcel::{Parcel, ParcelReader, Parcelable};
pub use state::value::{Retained, Value};
pub use state::view_model::{ViewModel, ViewModelStore};
pub use transition::builder::{TransitionBuilder, TransitionKind};
