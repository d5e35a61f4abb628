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
    let mut entry = t
        .entry
        .take()
        .ok_or_else(|| LayersError::consistency("add transition has no entry"))?;
    entry.in_transition = true;
    let inserted = stack.add_entry(backend, entry, t.index)?;

    t.lowest_visible = stack.lowest_visible();
    let Some(lowest) = t.lowest_visible else {
        return Ok(());
    };
    if inserted < lowest {
        return Ok(());
    }
    stack.set_transition_state(lowest);
    for i in lowest..=inserted {
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
    if let Some(lowest) = t.lowest_visible {
        stack.reset_transition_state(lowest);
    }
    if let Some(i) = stack.position(t.target) {
        stack.entries[i].in_transition = false;
    }
    stack.ensure_views(backend)
}
