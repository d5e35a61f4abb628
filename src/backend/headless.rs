use std::collections::BTreeMap;

use anyhow::anyhow;

use crate::animation::spec::{AnimFrame, AnimationSpec};
use crate::backend::view::ViewBackend;
use crate::foundation::error::LayersResult;
use crate::foundation::ids::{AnimRes, ContainerId, LayoutRes, ViewId};
use crate::state::bundle::SparseArray;
use crate::state::value::Value;

/// A structural change applied to a container.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize)]
pub enum ContainerOp {
    /// `view` inserted into `container` at `index`.
    Add {
        /// Target container.
        container: ViewId,
        /// Inserted view.
        view: ViewId,
        /// Insertion position.
        index: usize,
    },
    /// `view` removed from `container`.
    Remove {
        /// Source container.
        container: ViewId,
        /// Removed view.
        view: ViewId,
    },
}

#[derive(Debug)]
struct Node {
    key: i32,
    container: Option<ContainerId>,
    parent: Option<ViewId>,
    children: Vec<ViewId>,
    save_from_parent: bool,
    content: Option<Value>,
    frame: AnimFrame,
    presented: bool,
    dismissed: bool,
}

impl Node {
    fn new(key: i32, container: Option<ContainerId>) -> Self {
        Self {
            key,
            container,
            parent: None,
            children: Vec::new(),
            save_from_parent: true,
            content: None,
            frame: AnimFrame::IDENTITY,
            presented: false,
            dismissed: false,
        }
    }
}

/// Deterministic in-memory [`ViewBackend`].
///
/// Views form a plain tree rooted at a default container. Layouts are registered up front
/// with the container ids they declare; unregistered layouts inflate to a single view. Each
/// view can carry one "content" value standing in for scroll offsets or text input, which
/// hierarchy save/restore captures by view key.
#[derive(Debug)]
pub struct HeadlessBackend {
    next_id: u64,
    root: ViewId,
    nodes: BTreeMap<ViewId, Node>,
    layouts: BTreeMap<LayoutRes, Vec<ContainerId>>,
    animations: BTreeMap<AnimRes, AnimationSpec>,
    ops: Vec<ContainerOp>,
    released: usize,
}

impl Default for HeadlessBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl HeadlessBackend {
    /// Backend with an empty default container.
    pub fn new() -> Self {
        let root = ViewId(0);
        let mut nodes = BTreeMap::new();
        nodes.insert(root, Node::new(ContainerId::DEFAULT.0, None));
        Self {
            next_id: 1,
            root,
            nodes,
            layouts: BTreeMap::new(),
            animations: BTreeMap::new(),
            ops: Vec::new(),
            released: 0,
        }
    }

    /// Declare a layout and the container ids it contains.
    pub fn register_layout(&mut self, layout: LayoutRes, containers: &[ContainerId]) {
        self.layouts.insert(layout, containers.to_vec());
    }

    /// Declare an animation resource.
    pub fn register_animation(&mut self, res: AnimRes, spec: AnimationSpec) {
        self.animations.insert(res, spec);
    }

    /// Create a detached view identified by `key` in hierarchy state.
    pub fn create_view(&mut self, key: i32) -> ViewId {
        self.alloc(Node::new(key, None))
    }

    /// Create a detached view that can be found as container `id`.
    pub fn create_container(&mut self, id: ContainerId) -> ViewId {
        self.alloc(Node::new(id.0, Some(id)))
    }

    /// Attach a view under `parent` without recording a container op.
    pub fn attach(&mut self, parent: ViewId, child: ViewId) -> LayersResult<()> {
        self.link(parent, child, None)
    }

    /// The default container.
    pub fn root(&self) -> ViewId {
        self.root
    }

    /// Every container op recorded so far.
    pub fn ops(&self) -> &[ContainerOp] {
        &self.ops
    }

    /// Number of recorded insertions.
    pub fn added(&self) -> usize {
        self.ops
            .iter()
            .filter(|op| matches!(op, ContainerOp::Add { .. }))
            .count()
    }

    /// Number of recorded removals.
    pub fn removed(&self) -> usize {
        self.ops
            .iter()
            .filter(|op| matches!(op, ContainerOp::Remove { .. }))
            .count()
    }

    /// Insertion indices, in order.
    pub fn insert_positions(&self) -> Vec<usize> {
        self.ops
            .iter()
            .filter_map(|op| match op {
                ContainerOp::Add { index, .. } => Some(*index),
                ContainerOp::Remove { .. } => None,
            })
            .collect()
    }

    /// Forget recorded ops.
    pub fn clear_ops(&mut self) {
        self.ops.clear();
    }

    /// Children of `container`, in order.
    pub fn children(&self, container: ViewId) -> Vec<ViewId> {
        self.nodes
            .get(&container)
            .map(|n| n.children.clone())
            .unwrap_or_default()
    }

    /// Whether `view` exists and was not released.
    pub fn contains(&self, view: ViewId) -> bool {
        self.nodes.contains_key(&view)
    }

    /// Number of views released by the engine.
    pub fn released(&self) -> usize {
        self.released
    }

    /// Last animation frame written to `view`.
    pub fn frame(&self, view: ViewId) -> Option<AnimFrame> {
        self.nodes.get(&view).map(|n| n.frame)
    }

    /// Set the content value captured by hierarchy state.
    pub fn set_content(&mut self, view: ViewId, value: Value) {
        if let Some(node) = self.nodes.get_mut(&view) {
            node.content = Some(value);
        }
    }

    /// Content value of `view`.
    pub fn content(&self, view: ViewId) -> Option<&Value> {
        self.nodes.get(&view).and_then(|n| n.content.as_ref())
    }

    /// Whether `view` is currently presented as a detached window.
    pub fn is_presented(&self, view: ViewId) -> bool {
        self.nodes.get(&view).is_some_and(|n| n.presented)
    }

    /// Simulate the user closing a detached view.
    pub fn user_dismiss(&mut self, view: ViewId) {
        if let Some(node) = self.nodes.get_mut(&view)
            && node.presented
        {
            node.presented = false;
            node.dismissed = true;
        }
    }

    /// Whether `view` opted out of parent hierarchy saving.
    pub fn is_save_from_parent_enabled(&self, view: ViewId) -> bool {
        self.nodes.get(&view).is_some_and(|n| n.save_from_parent)
    }

    fn alloc(&mut self, node: Node) -> ViewId {
        let id = ViewId(self.next_id);
        self.next_id += 1;
        self.nodes.insert(id, node);
        id
    }

    fn link(&mut self, parent: ViewId, child: ViewId, index: Option<usize>) -> LayersResult<()> {
        match self.nodes.get(&child) {
            None => return Err(anyhow!("unknown view {child:?}").into()),
            Some(node) if node.parent.is_some() => {
                return Err(anyhow!("view {child:?} already has a parent").into());
            }
            Some(_) => {}
        }
        let parent_node = self
            .nodes
            .get_mut(&parent)
            .ok_or_else(|| anyhow!("unknown container {parent:?}"))?;
        let index = index.unwrap_or(parent_node.children.len());
        if index > parent_node.children.len() {
            return Err(anyhow!(
                "insert index {index} beyond {} children of {parent:?}",
                parent_node.children.len()
            )
            .into());
        }
        parent_node.children.insert(index, child);
        if let Some(node) = self.nodes.get_mut(&child) {
            node.parent = Some(parent);
        }
        Ok(())
    }

    fn subtree(&self, view: ViewId, respect_save_flag: bool) -> Vec<ViewId> {
        let mut out = Vec::new();
        let mut pending = vec![view];
        while let Some(v) = pending.pop() {
            let Some(node) = self.nodes.get(&v) else {
                continue;
            };
            out.push(v);
            for child in node.children.iter().rev() {
                let skip = respect_save_flag
                    && self.nodes.get(child).is_some_and(|c| !c.save_from_parent);
                if !skip {
                    pending.push(*child);
                }
            }
        }
        out
    }
}

impl ViewBackend for HeadlessBackend {
    fn default_container(&mut self) -> LayersResult<ViewId> {
        Ok(self.root)
    }

    fn find_view(&mut self, parent: Option<ViewId>, id: ContainerId) -> Option<ViewId> {
        let start = parent.unwrap_or(self.root);
        self.subtree(start, false)
            .into_iter()
            .find(|v| self.nodes.get(v).is_some_and(|n| n.container == Some(id)))
    }

    fn inflate(&mut self, layout: LayoutRes) -> LayersResult<ViewId> {
        let key = i32::try_from(layout.0).map_err(|_| anyhow!("layout id {layout:?} too large"))?;
        let root = self.alloc(Node::new(key, None));
        let containers = self.layouts.get(&layout).cloned().unwrap_or_default();
        for id in containers {
            let child = self.create_container(id);
            self.link(root, child, None)?;
        }
        Ok(root)
    }

    fn child_count(&self, container: ViewId) -> usize {
        self.nodes.get(&container).map_or(0, |n| n.children.len())
    }

    fn add_child(&mut self, container: ViewId, child: ViewId, index: usize) -> LayersResult<()> {
        self.link(container, child, Some(index))?;
        self.ops.push(ContainerOp::Add {
            container,
            view: child,
            index,
        });
        Ok(())
    }

    fn remove_child(&mut self, container: ViewId, child: ViewId) -> LayersResult<()> {
        let parent = self
            .nodes
            .get_mut(&container)
            .ok_or_else(|| anyhow!("unknown container {container:?}"))?;
        let pos = parent
            .children
            .iter()
            .position(|c| *c == child)
            .ok_or_else(|| anyhow!("{child:?} is not a child of {container:?}"))?;
        parent.children.remove(pos);
        if let Some(node) = self.nodes.get_mut(&child) {
            node.parent = None;
        }
        self.ops.push(ContainerOp::Remove {
            container,
            view: child,
        });
        Ok(())
    }

    fn set_save_from_parent_enabled(&mut self, view: ViewId, enabled: bool) {
        if let Some(node) = self.nodes.get_mut(&view) {
            node.save_from_parent = enabled;
        }
    }

    fn save_hierarchy_state(&mut self, view: ViewId, out: &mut SparseArray<Value>) {
        for v in self.subtree(view, true) {
            if let Some(node) = self.nodes.get(&v)
                && let Some(content) = &node.content
            {
                out.put(node.key, content.clone());
            }
        }
    }

    fn restore_hierarchy_state(&mut self, view: ViewId, state: &SparseArray<Value>) {
        for v in self.subtree(view, true) {
            if let Some(node) = self.nodes.get_mut(&v)
                && let Some(content) = state.get(node.key)
            {
                node.content = Some(content.clone());
            }
        }
    }

    fn load_animation(&self, res: AnimRes) -> Option<AnimationSpec> {
        self.animations.get(&res).copied()
    }

    fn apply_frame(&mut self, view: ViewId, frame: &AnimFrame) {
        if let Some(node) = self.nodes.get_mut(&view) {
            node.frame = *frame;
        }
    }

    fn present_detached(&mut self, view: ViewId, _cancelable: bool) -> LayersResult<()> {
        let node = self
            .nodes
            .get_mut(&view)
            .ok_or_else(|| anyhow!("unknown view {view:?}"))?;
        node.presented = true;
        Ok(())
    }

    fn dismiss_detached(&mut self, view: ViewId) {
        if let Some(node) = self.nodes.get_mut(&view) {
            node.presented = false;
        }
    }

    fn take_dismissed(&mut self, view: ViewId) -> bool {
        self.nodes
            .get_mut(&view)
            .is_some_and(|n| std::mem::take(&mut n.dismissed))
    }

    fn release_view(&mut self, view: ViewId) {
        let parent = self.nodes.get(&view).and_then(|n| n.parent);
        if let Some(parent) = parent.and_then(|p| self.nodes.get_mut(&p)) {
            parent.children.retain(|c| *c != view);
        }
        for v in self.subtree(view, false) {
            self.nodes.remove(&v);
        }
        self.released += 1;
    }
}

#[cfg(test)]
#[path = "../../tests/unit/backend/headless.rs"]
mod tests;
