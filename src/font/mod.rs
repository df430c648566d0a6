pub(crate) mod glyph;
pub(crate) mod group;
pub(crate) mod model;
pub(crate) mod recognize;
pub(crate) mod reducer;
pub(crate) mod writer;
