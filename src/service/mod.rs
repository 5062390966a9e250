//! Service layer: the analysis session controller.
//!
//! [`AnalysisRequestController`] owns the input mode, the single in-flight
//! request and the selected image's preview handle.

pub mod request_controller;

pub use request_controller::AnalysisRequestController;
