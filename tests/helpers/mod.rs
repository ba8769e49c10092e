//! Test helpers module
//!
//! In-process fakes and builders shared by the scenario tests: a scripted
//! Update Source, a context wired to in-memory stores, and update builders.

#![allow(dead_code)]

pub mod telegram_mock;
pub mod test_context;
pub mod test_data;

pub use telegram_mock::*;
pub use test_context::*;
pub use test_data::*;
