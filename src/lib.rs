//! Core of the digital transformation index dashboard.
//!
//! Everything in here is UI-agnostic: the desktop shell in `main.rs` only
//! turns widget state into [`data::filter::FilterCriteria`] and draws the
//! [`data::dashboard::Dashboard`] it gets back.

pub mod config;
pub mod data;
pub mod error;
