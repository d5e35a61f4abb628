pub(crate) mod add;
pub(crate) mod base;
pub(crate) mod builder;
pub(crate) mod remove;
pub(crate) mod replace;

#[cfg(test)]
#[path = "../../tests/unit/transition/base.rs"]
mod tests;
