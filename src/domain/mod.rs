//! Domain layer: inputs, session state, records, previews and diagnostics.
//!
//! This module contains the client-side model: what a request carries,
//! what a session looks like from outside, how a finished analysis is
//! persisted, and the revocable preview handles tied to image selection.

pub mod analysis_record;
pub mod analyzer_event;
pub mod event_bus;
pub mod preview;
pub mod request_input;
pub mod session_state;

pub use analysis_record::{AnalysisPayload, AnalysisRecord};
pub use analyzer_event::AnalyzerEvent;
pub use event_bus::EventBus;
pub use preview::{PreviewHandle, PreviewRegistry};
pub use request_input::{ImageUpload, InputMode, RequestInput};
pub use session_state::{AnalysisState, SessionSnapshot};
