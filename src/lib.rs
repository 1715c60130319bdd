//! Inkwell: an in-memory blog post store served over a JSON HTTP interface.

pub mod application;
pub mod config;
pub mod domain;
pub mod infra;
