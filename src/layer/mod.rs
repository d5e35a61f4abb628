pub(crate) mod behavior;
pub(crate) mod core;
pub(crate) mod delegate;
pub(crate) mod dialog;
pub(crate) mod live;
pub(crate) mod registry;
