pub mod config;
pub mod domain;
pub mod error;
pub mod infra;
pub mod registry;
pub mod workspace;

pub use error::{Result, RocketError};
