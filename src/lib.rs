//! `loan-score` library crate.
//!
//! The binary (`loan-score`) is a thin wrapper around this library so that:
//!
//! - the trainer, scorer and HTTP router are testable without spawning processes
//! - the scoring core stays independent of the transport that calls it
//! - rule-based loan offers (`offers`) share validation and HTTP plumbing with scoring

pub mod app;
pub mod cli;
pub mod client;
pub mod data;
pub mod domain;
pub mod error;
pub mod fit;
pub mod io;
pub mod math;
pub mod models;
pub mod offers;
pub mod report;
pub mod scoring;
pub mod server;
