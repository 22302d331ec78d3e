//! Tallies outcomes, renders the failure digest and persists the artifact.

pub mod controller;
pub mod repo;
pub mod service;
