//! Core of the geo-guessing game: great-circle scoring, region checks,
//! target sampling and the per-player round state machine.
//!
//! Everything here is synchronous and free of I/O. Hosts own the
//! [`session::GameSession`] instances and serialize access to each one.

pub mod catalog;
pub mod error;
pub mod geo;
pub mod models;
pub mod scoring;
pub mod session;

pub use error::{GameError, Result};
