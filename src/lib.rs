pub mod error_utils;
pub mod graph;
pub mod loader;
pub mod models;
pub mod validation;
