pub(crate) mod model;

#[cfg(test)]
#[path = "../../tests/unit/movie/model.rs"]
mod tests;
