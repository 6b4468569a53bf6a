//! cinemetrics: fetch movie metadata, normalize it into a flat table,
//! and rank, search and summarize it.
//!
//! The pipeline is a chain of explicit stages: [`fetch`] produces raw
//! documents ([`raw`]), [`normalize`] turns them into typed rows, [`table`]
//! persists the rows, and [`derived`], [`query`] and [`report`] read them.

pub mod commands;
pub mod config;
pub mod derived;
pub mod error;
pub mod fetch;
pub mod normalize;
pub mod progress;
pub mod query;
pub mod raw;
pub mod report;
pub mod stats;
pub mod table;
