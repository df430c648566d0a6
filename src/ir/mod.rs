pub(crate) mod model;
pub(crate) mod path;
pub(crate) mod visit;

#[cfg(test)]
#[path = "../../tests/unit/ir/model.rs"]
mod tests;
