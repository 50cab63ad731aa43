//! # eventrec common library
//!
//! Core of the college event record keeper:
//! - Event and media models, with boundary validation
//! - Category taxonomy registry
//! - SQLite-backed local store and the synchronizing event repository
//! - Report filtering, dashboard counts and report export
//! - Media upload boundary, session roles, configuration

pub mod config;
pub mod dashboard;
pub mod db;
pub mod error;
pub mod filter;
pub mod ids;
pub mod media;
pub mod model;
pub mod notify;
pub mod report;
pub mod repository;
pub mod session;
pub mod sse;
pub mod taxonomy;

pub use error::{Error, Result};
pub use model::{Event, EventDraft, EventId};
pub use repository::EventRepository;
