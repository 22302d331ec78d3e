//! Discovers which language adapters are present under the wrappers directory.

pub mod controller;
pub mod repo;
pub mod service;
