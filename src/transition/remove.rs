use crate::animation::spec::AnimationType;
use crate::backend::view::ViewBackend;
use crate::foundation::error::LayersResult;
use crate::stack::layer_stack::LayerStack;
use crate::transition::base::Transition;

pub(super) fn on_transition(
    t: &mut Transition,
    stack: &mut LayerStack,
    backend: &mut dyn ViewBackend,
) -> LayersResult<()> {
    // Earlier transitions may have shifted or dropped the entry since enqueue.
    let Some(index) = stack.position(t.target) else {
        tracing::warn!(id = t.target.0, "entry to remove is gone");
        return Ok(());
    };
    stack.entries[index].in_transition = true;
    t.lowest_visible = stack.lowest_visible();
    stack.entries[index].valid = false;
    t.animations = stack.entries[index].record.animations;

    let Some(lowest) = t.lowest_visible else {
        return Ok(());
    };
    if index < lowest {
        return Ok(());
    }
    stack.set_transition_state(lowest);
    t.animated = true;
    // Reveal whatever the leaving layer was hiding before animating it away.
    stack.ensure_views(backend)?;
    for i in lowest..=index {
        let kind = if i == index {
            AnimationType::UpperOut
        } else {
            AnimationType::LowerIn
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
    if let Some(index) = stack.position(t.target) {
        stack.remove_layer_at(backend, index)?;
    }
    Ok(())
}
