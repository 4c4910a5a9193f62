//! `intune-assign` library crate.
//!
//! Finds every Intune device configuration, settings catalog policy, compliance policy,
//! app protection and app configuration policy, application, script and endpoint
//! security intent assigned to one Entra ID group.
//!
//! The binary is a thin wrapper so the pipeline can be driven against a mock Graph
//! server in tests.

pub mod app;
pub mod config;
pub mod error;
pub mod graph;
pub mod report;
pub mod resource;
