//! Stylepipe core library.
//!
//! This crate exposes programmatic APIs for linting SCSS sources against a
//! sass-lint rule file and compiling them to CSS.
//!
//! High-level modules:
//! - `cli`: CLI argument parsing (binary uses this).
//! - `config`: Discovery and effective configuration resolution.
//! - `sources`: Glob enumeration and ignore matching.
//! - `rules`: Built-in lint rules.
//! - `lint`: Rule-file driven linting with severity accounting.
//! - `compile`: SCSS compilation via `grass`.
//! - `pipeline`: The styles task (lint, then compile and write).
//! - `models`: Task configuration, lint output structs, rule file schema.
//! - `output`: Human/JSON printers for lint and build.
//! - `error`: `BuildError`.
//! - `utils`: Supporting helpers.
pub mod cli;
pub mod compile;
pub mod config;
pub mod error;
pub mod lint;
pub mod models;
pub mod output;
pub mod pipeline;
pub mod rules;
pub mod sources;
pub mod utils;
