//! Analysis session controller: one request in flight, one live preview.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::Utc;
use tokio_util::sync::CancellationToken;

use crate::client::{AnalysisTransport, AnalyzeResponse};
use crate::domain::{
    AnalysisPayload, AnalysisState, AnalyzerEvent, EventBus, ImageUpload, InputMode,
    PreviewHandle, PreviewRegistry, RequestInput, SessionSnapshot,
};
use crate::error::AnalyzerError;

/// Image chosen by the user together with its live preview.
#[derive(Debug)]
struct ImageSelection {
    upload: ImageUpload,
    preview: PreviewHandle,
}

#[derive(Debug, Default)]
struct Session {
    mode: InputMode,
    state: AnalysisState,
    selection: Option<ImageSelection>,
    torn_down: bool,
}

/// Mediates exactly one outstanding call to the analysis service.
///
/// Every method takes `&self`; the session lives behind a mutex that is
/// never held across the network await. A second [`submit`] while one is
/// pending is rejected with [`AnalyzerError::Busy`] before any I/O.
///
/// Selecting an image allocates a [`PreviewHandle`] in the shared
/// [`PreviewRegistry`]. The controller holds at most one live handle and
/// revokes it on replacement, on [`clear_image`], on [`teardown`] and on
/// drop. Teardown also cancels an in-flight request.
///
/// [`submit`]: Self::submit
/// [`clear_image`]: Self::clear_image
/// [`teardown`]: Self::teardown
#[derive(Debug)]
pub struct AnalysisRequestController<T> {
    transport: T,
    previews: Arc<PreviewRegistry>,
    events: EventBus,
    session: Mutex<Session>,
    cancel: CancellationToken,
}

impl<T> AnalysisRequestController<T> {
    /// Creates an idle controller in URL mode.
    #[must_use]
    pub fn new(transport: T, previews: Arc<PreviewRegistry>, events: EventBus) -> Self {
        Self {
            transport,
            previews,
            events,
            session: Mutex::new(Session::default()),
            cancel: CancellationToken::new(),
        }
    }

    /// The transport requests are sent through.
    #[must_use]
    pub const fn transport(&self) -> &T {
        &self.transport
    }

    /// Point-in-time copy of the session state.
    #[must_use]
    pub fn snapshot(&self) -> SessionSnapshot {
        let session = self.lock();
        SessionSnapshot {
            mode: session.mode,
            state: session.state.clone(),
            preview: session.selection.as_ref().map(|s| s.preview),
        }
    }

    /// Current input mode.
    #[must_use]
    pub fn mode(&self) -> InputMode {
        self.lock().mode
    }

    /// Returns `true` while a request is in flight.
    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.lock().state.is_pending()
    }

    /// Message of the last failed submit, if the last submit failed.
    #[must_use]
    pub fn last_error(&self) -> Option<String> {
        self.lock().state.last_error().map(str::to_string)
    }

    /// Payload of the last successful submit, if the last submit succeeded.
    #[must_use]
    pub fn last_result(&self) -> Option<AnalysisPayload> {
        self.lock().state.last_result().cloned()
    }

    /// Preview of the selected image, if any.
    #[must_use]
    pub fn selected_preview(&self) -> Option<PreviewHandle> {
        self.lock().selection.as_ref().map(|s| s.preview)
    }

    /// The selected image, if any.
    #[must_use]
    pub fn selected_image(&self) -> Option<ImageUpload> {
        self.lock().selection.as_ref().map(|s| s.upload.clone())
    }

    /// Switches input mode. A pending request is not affected.
    ///
    /// # Errors
    ///
    /// Returns [`AnalyzerError::Busy`] while a request is pending and
    /// [`AnalyzerError::TornDown`] after teardown.
    pub fn set_mode(&self, mode: InputMode) -> Result<(), AnalyzerError> {
        let mut session = self.lock();
        if session.torn_down {
            return Err(AnalyzerError::TornDown);
        }
        if session.state.is_pending() {
            return Err(AnalyzerError::Busy);
        }
        session.mode = mode;
        Ok(())
    }

    /// Stores `upload` as the selected image and returns its fresh preview.
    ///
    /// The previously held preview, if any, is revoked before the new one
    /// is allocated.
    ///
    /// # Errors
    ///
    /// Returns [`AnalyzerError::TornDown`] after teardown.
    pub fn select_image(&self, upload: ImageUpload) -> Result<PreviewHandle, AnalyzerError> {
        let mut session = self.lock();
        if session.torn_down {
            return Err(AnalyzerError::TornDown);
        }
        if let Some(previous) = session.selection.take() {
            self.revoke(previous.preview);
        }
        let preview = self.previews.create(&upload);
        tracing::debug!(%preview, bytes = upload.len(), "image selected");
        session.selection = Some(ImageSelection { upload, preview });
        Ok(preview)
    }

    /// Forgets the selected image and revokes its preview.
    pub fn clear_image(&self) {
        let selection = self.lock().selection.take();
        if let Some(selection) = selection {
            self.revoke(selection.preview);
        }
    }

    /// Releases every resource held by the session.
    ///
    /// Revokes the preview and cancels an in-flight request, whose submit
    /// then resolves to [`AnalyzerError::Cancelled`]. Idempotent; also run
    /// on drop. Any later call that would start work fails with
    /// [`AnalyzerError::TornDown`].
    pub fn teardown(&self) {
        let selection = {
            let mut session = self.lock();
            if session.torn_down {
                return;
            }
            session.torn_down = true;
            session.selection.take()
        };
        self.cancel.cancel();
        if let Some(selection) = selection {
            self.revoke(selection.preview);
        }
        tracing::debug!("analysis session torn down");
    }

    fn revoke(&self, preview: PreviewHandle) {
        if self.previews.revoke(&preview) {
            let _ = self
                .events
                .publish(AnalyzerEvent::PreviewRevoked { handle: preview });
        }
    }

    fn lock(&self) -> MutexGuard<'_, Session> {
        self.session.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<T: AnalysisTransport> AnalysisRequestController<T> {
    /// Sends `input` to the analysis service and records the outcome.
    ///
    /// The request is validated and the session moved to
    /// [`AnalysisState::Pending`] before the single network call, which
    /// also clears the previous error or result. The session is never left
    /// pending: it ends in `Succeeded`, `Failed`, or `Idle` (cancelled or
    /// abandoned).
    ///
    /// # Errors
    ///
    /// Precondition errors are returned without touching the session or the
    /// network: [`AnalyzerError::Busy`], [`AnalyzerError::TornDown`],
    /// [`AnalyzerError::ModeMismatch`], [`AnalyzerError::EmptyInput`].
    /// Otherwise returns [`AnalyzerError::Transport`],
    /// [`AnalyzerError::Service`] (message verbatim), or
    /// [`AnalyzerError::Cancelled`].
    pub async fn submit(&self, input: RequestInput) -> Result<AnalysisPayload, AnalyzerError> {
        let guard = self.begin(&input)?;

        let outcome = tokio::select! {
            biased;
            () = self.cancel.cancelled() => Err(AnalyzerError::Cancelled),
            response = self.transport.analyze(&input) => {
                response.and_then(AnalyzeResponse::into_result)
            }
        };

        guard.disarm();
        self.finish(outcome)
    }

    /// Submits the currently selected image.
    ///
    /// # Errors
    ///
    /// Returns [`AnalyzerError::NoImageSelected`] if nothing is selected;
    /// otherwise as [`submit`](Self::submit).
    pub async fn submit_selected(&self) -> Result<AnalysisPayload, AnalyzerError> {
        let upload = self
            .selected_image()
            .ok_or(AnalyzerError::NoImageSelected)?;
        self.submit(RequestInput::Image(upload)).await
    }

    /// Asks the service whether it is up. Does not touch the session.
    ///
    /// # Errors
    ///
    /// Returns [`AnalyzerError::Transport`] if the service cannot be reached.
    pub async fn check_health(&self) -> Result<bool, AnalyzerError> {
        Ok(self.transport.health().await?.is_healthy())
    }

    fn begin(&self, input: &RequestInput) -> Result<PendingGuard<'_>, AnalyzerError> {
        let mut session = self.lock();
        if session.torn_down {
            return Err(AnalyzerError::TornDown);
        }
        if session.state.is_pending() {
            return Err(AnalyzerError::Busy);
        }
        let mode = input.mode();
        if mode != session.mode {
            return Err(AnalyzerError::ModeMismatch {
                mode: session.mode,
                input: mode,
            });
        }
        input.validate()?;

        session.state = AnalysisState::Pending;
        drop(session);

        tracing::info!(%mode, "analysis submitted");
        let _ = self.events.publish(AnalyzerEvent::SubmitStarted {
            mode,
            timestamp: Utc::now(),
        });
        Ok(PendingGuard {
            session: &self.session,
            armed: true,
        })
    }

    fn finish(
        &self,
        outcome: Result<AnalysisPayload, AnalyzerError>,
    ) -> Result<AnalysisPayload, AnalyzerError> {
        let mut session = self.lock();
        // A result that lands after teardown is discarded.
        let outcome = if session.torn_down {
            Err(AnalyzerError::Cancelled)
        } else {
            outcome
        };

        match outcome {
            Ok(payload) => {
                session.state = AnalysisState::Succeeded(payload.clone());
                drop(session);
                tracing::info!("analysis succeeded");
                let _ = self.events.publish(AnalyzerEvent::SubmitSucceeded {
                    timestamp: Utc::now(),
                });
                Ok(payload)
            }
            Err(AnalyzerError::Cancelled) => {
                session.state = AnalysisState::Idle;
                drop(session);
                tracing::info!("analysis cancelled");
                let _ = self.events.publish(AnalyzerEvent::SubmitCancelled {
                    timestamp: Utc::now(),
                });
                Err(AnalyzerError::Cancelled)
            }
            Err(err) => {
                let message = err.user_message();
                session.state = AnalysisState::Failed(message.clone());
                drop(session);
                tracing::warn!(error = %err, "analysis failed");
                let _ = self.events.publish(AnalyzerEvent::SubmitFailed {
                    message,
                    timestamp: Utc::now(),
                });
                Err(err)
            }
        }
    }
}

impl<T> Drop for AnalysisRequestController<T> {
    fn drop(&mut self) {
        self.teardown();
    }
}

/// Resets a pending session to idle if the submit future is dropped
/// before the response arrives.
struct PendingGuard<'a> {
    session: &'a Mutex<Session>,
    armed: bool,
}

impl PendingGuard<'_> {
    fn disarm(mut self) {
        self.armed = false;
    }
}

impl Drop for PendingGuard<'_> {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        let mut session = self.session.lock().unwrap_or_else(PoisonError::into_inner);
        if session.state.is_pending() {
            session.state = AnalysisState::Idle;
            tracing::debug!("pending analysis abandoned");
        }
    }
}
