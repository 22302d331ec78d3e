//! Runs one adapter process per capability call and folds every outcome,
//! including launch failures and timeouts, into a `CapabilityResult`.

pub mod controller;
pub mod repo;
pub mod service;
