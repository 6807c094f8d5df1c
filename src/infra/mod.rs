#[cfg(feature = "docker")]
pub mod docker;
pub mod selector;
pub mod web;
