//! Creative Hub data layer.
//!
//! Client-side data-fetch and state-reconciliation layer for the Creative Hub
//! student-portfolio application. Persistence, authentication and file storage
//! all live behind two external REST collaborators: the application API
//! (session-cookie authenticated) and a tabular backing store queried through
//! a PostgREST-style interface. This crate owns the typed clients for both,
//! the list/filter/paginate pipeline, and the per-view state machines
//! (save/bookmark, report submission, moderation queue).
pub mod api;
pub mod config;
pub mod error;
pub mod gallery;
pub mod models;
pub mod moderation;
pub mod report;
pub mod session;
pub mod store;
pub mod work_view;
pub mod works;


pub use error::{Error, Result};
