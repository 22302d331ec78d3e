//! Cross-provider test protocols: every provider against every other.

pub mod controller;
pub mod service;
