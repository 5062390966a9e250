//! # product-analyzer
//!
//! Client-side analysis session and local history cache for a remote
//! product analysis service.
//!
//! A user submits a product page URL or a photograph of its label; the
//! remote service extracts ingredients and nutrition data and scores them.
//! This crate owns the client side of that exchange: one request in flight
//! per session, revocable previews of the selected image, and a history of
//! finished analyses kept in a key-value medium. The service itself is an
//! external collaborator.
//!
//! ## Architecture
//!
//! ```text
//! Caller (UI, CLI)
//!     │
//!     ├── AnalysisRequestController (service/)
//!     │       ├── AnalysisTransport ── HttpTransport (client/) ── POST /api/analyze
//!     │       └── PreviewRegistry (domain/)
//!     │
//!     ├── LocalAnalysisStore (persistence/)
//!     │       └── KeyValueStore ── MemoryStore | JsonFileStore
//!     │
//!     └── EventBus (domain/) ◄── diagnostics from both
//! ```
//!
//! The controller and the store never call each other; they meet only in
//! [`domain::AnalysisRecord`].

pub mod client;
pub mod config;
pub mod domain;
pub mod error;
pub mod persistence;
pub mod service;

pub use error::{AnalyzerError, ErrorKind};
