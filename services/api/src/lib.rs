//! services/api/src/lib.rs
//!
//! Library entry point for the `api` service, exposing the adapters,
//! configuration, and web layer to the binaries and tests.

pub mod adapters;
pub mod config;
pub mod error;
pub mod web;
