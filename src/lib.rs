//! Real-estate deal analysis pipeline: listing and statistics scraping,
//! a flat fingerprint corpus, market summaries and LLM-written reports.

pub mod config;
pub mod corpus;
pub mod error;
pub mod market;
pub mod models;
pub mod report;
pub mod router;
pub mod scrapers;
pub mod workflows;
