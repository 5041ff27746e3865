pub mod commands;
pub mod convert;
pub mod error;
pub mod loader;
pub mod output;
pub mod schema;
pub mod store;
