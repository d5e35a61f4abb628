pub(crate) mod entry;
pub(crate) mod layer_stack;
