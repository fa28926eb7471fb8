//! services/api/src/lib.rs
//!
//! Library root for the `api` service: configuration, error mapping,
//! adapters, bot command dispatch and the web router.

pub mod adapters;
pub mod bot;
pub mod config;
pub mod error;
pub mod web;
