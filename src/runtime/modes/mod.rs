//! Mode routing
//!
//! `serve` (the default) runs the HTTP server; `config generate` only writes
//! a sample configuration and exits.

pub mod server;

pub use server::run_server;
