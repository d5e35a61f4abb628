use crate::animation::spec::AnimationType;
use crate::backend::view::ViewBackend;
use crate::foundation::error::{LayersError, LayersResult};
use crate::stack::layer_stack::LayerStack;
use crate::transition::base::Transition;

pub(super) fn on_transition(
    t: &mut Transition,
    stack: &mut LayerStack,
    backend: &mut dyn ViewBackend,
) -> LayersResult<()> {
    let len = stack.len();
    let inserted = t.index.map_or(len, |i| i + 1);
    if inserted > len {
        return Err(LayersError::out_of_bounds(inserted - 1, len));
    }
    let replaced = inserted.checked_sub(1);
    t.replaced = replaced.map(|r| stack.entries[r].id);

    let mut entry = t
        .entry
        .take()
        .ok_or_else(|| LayersError::consistency("replace transition has no entry"))?;
    entry.in_transition = true;
    stack.add_entry(backend, entry, Some(inserted))?;

    t.lowest_visible = stack.lowest_visible();
    if let Some(r) = replaced {
        stack.entries[r].valid = false;
    }
    let Some(lowest) = t.lowest_visible else {
        return Ok(());
    };
    if inserted < lowest {
        return Ok(());
    }
    stack.set_transition_state(lowest);
    t.animated = true;
    let first = replaced.map_or(lowest, |r| r.max(lowest));
    for i in first..=inserted {
        let kind = if i == inserted {
            AnimationType::UpperIn
        } else {
            AnimationType::LowerOut
        };
        t.animate_layer(stack, &*backend, i, kind)?;
    }
    Ok(())
}

pub(super) fn on_after_transition(
    t: &mut Transition,
    stack: &mut LayerStack,
    backend: &mut dyn ViewBackend,
) -> LayersResult<()> {
    if t.animated
        && let Some(lowest) = t.lowest_visible
    {
        stack.reset_transition_state(lowest);
    }
    if let Some(i) = stack.position(t.target) {
        stack.entries[i].in_transition = false;
    }
    match t.replaced.and_then(|id| stack.position(id)) {
        Some(index) => {
            stack.remove_layer_at(backend, index)?;
        }
        None => stack.ensure_views(backend)?,
    }
    Ok(())
}
