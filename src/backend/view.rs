use crate::animation::spec::{AnimFrame, AnimationSpec};
use crate::foundation::error::LayersResult;
use crate::foundation::ids::{AnimRes, ContainerId, LayoutRes, ViewId};
use crate::state::bundle::SparseArray;
use crate::state::value::Value;

/// The UI substrate a stack drives: view containers, layout inflation, view state and
/// animation frames.
///
/// Everything runs on one thread. Implementations own every view; the engine only holds
/// [`ViewId`] handles.
pub trait ViewBackend {
    /// The host's default content container.
    fn default_container(&mut self) -> LayersResult<ViewId>;

    /// Find a container by id inside `parent`, or anywhere in the window when `None`.
    fn find_view(&mut self, parent: Option<ViewId>, id: ContainerId) -> Option<ViewId>;

    /// Build the view tree for `layout`, returning its root.
    fn inflate(&mut self, layout: LayoutRes) -> LayersResult<ViewId>;

    /// Number of children currently inside `container`.
    fn child_count(&self, container: ViewId) -> usize;

    /// Insert `child` into `container` at `index`.
    fn add_child(&mut self, container: ViewId, child: ViewId, index: usize) -> LayersResult<()>;

    /// Remove `child` from `container`.
    fn remove_child(&mut self, container: ViewId, child: ViewId) -> LayersResult<()>;

    /// Toggle whether `view` takes part in its parent's hierarchy state saving.
    fn set_save_from_parent_enabled(&mut self, view: ViewId, enabled: bool);

    /// Capture hierarchy state (scroll offsets, focus, input) below `view` into `out`.
    fn save_hierarchy_state(&mut self, view: ViewId, out: &mut SparseArray<Value>);

    /// Replay state captured by [`ViewBackend::save_hierarchy_state`].
    fn restore_hierarchy_state(&mut self, view: ViewId, state: &SparseArray<Value>);

    /// Resolve an animation resource.
    fn load_animation(&self, res: AnimRes) -> Option<AnimationSpec>;

    /// Write an animation frame onto `view`.
    fn apply_frame(&mut self, view: ViewId, frame: &AnimFrame);

    /// Show a view outside of any container, as a dialog window.
    fn present_detached(&mut self, view: ViewId, cancelable: bool) -> LayersResult<()> {
        let _ = (view, cancelable);
        Ok(())
    }

    /// Hide a view shown by [`ViewBackend::present_detached`].
    fn dismiss_detached(&mut self, view: ViewId) {
        let _ = view;
    }

    /// Whether the user closed a detached view since the last call. Resets the flag.
    fn take_dismissed(&mut self, view: ViewId) -> bool {
        let _ = view;
        false
    }

    /// The engine no longer references `view`.
    fn release_view(&mut self, view: ViewId) {
        let _ = view;
    }
}
