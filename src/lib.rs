//! trackdesk - marketing operations dashboard backend
//!
//! Websites and their Sub-IDs, GEO brand rankings, and reconciliation of
//! affiliate lineups against an external task tracker.
//!
//! # Features
//! - **server**: HTTP server mode (default)
//! - **cli**: offline subcommands
//!
//! # Architecture
//! - `affiliate`: pure text heuristics (tracking params, lineup extraction, comments, GEO labels)
//! - `tracker`: task-tracker models and HTTP client
//! - `storage`: SeaORM storage backend and domain models
//! - `services`: business rules shared by HTTP and CLI
//! - `api`: HTTP handlers and middleware
//! - `config`: static configuration
//! - `runtime`: application lifecycle and execution modes
//! - `system`: logging

pub mod affiliate;
pub mod api;
pub mod cli;
pub mod config;
pub mod errors;
pub mod runtime;
pub mod services;
pub mod storage;
pub mod system;
pub mod tracker;
pub mod utils;
