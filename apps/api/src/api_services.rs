mod database;
mod definitions;
mod state_builder;

pub use database::connect_and_migrate;
pub use definitions::load_definitions;
pub use state_builder::build_app_state;
