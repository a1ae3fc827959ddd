//! Core types and trait definitions for the SkillSpace enrollment engine.
//!
//! This crate is deliberately free of HTTP and database dependencies.
//! Storage backends and the transport layer depend on it, not the reverse.

// We intentionally use native `async fn` in traits (stabilised in Rust 1.75).
// Suppress the advisory lint about `Send` bounds on the returned futures.
#![allow(async_fn_in_trait)]

pub mod course;
pub mod engine;
pub mod enrollment;
pub mod error;
pub mod grading;
pub mod identity;
pub mod locks;
pub mod progress;
pub mod store;

pub use engine::{EngineConfig, EnrollmentEngine};
pub use error::{Error, Result};
