pub(crate) mod builder;
pub(crate) mod rect;
pub(crate) mod style;
