pub mod definitions;
pub mod entities;
pub mod health;
pub mod relations;

#[cfg(test)]
pub(crate) mod test_fixtures;
