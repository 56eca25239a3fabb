//! IPShorter - URL shortener with per-link visitor logging
//!
//! Owners obtain an API key by email, register destination URLs as
//! "loggers", and every visit to a logger's short link is redirected while
//! its click count and visitor history are recorded.
//!
//! # Architecture
//! - `storage`: persistence traits and the SeaORM backend
//! - `services`: key issuance, logger management, redirect recording
//! - `api`: HTTP handlers and middleware
//! - `config`: static configuration (TOML + environment)
//! - `runtime`: server startup and shutdown
//! - `system`: logging setup

pub mod api;
pub mod cli;
pub mod config;
pub mod errors;
pub mod runtime;
pub mod services;
pub mod storage;
pub mod system;
pub mod utils;
