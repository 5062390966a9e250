//! Revocable in-memory preview handles for selected images.
//!
//! A [`PreviewHandle`] is the analogue of a browser object URL: creating one
//! pins the image bytes in the [`PreviewRegistry`] until it is revoked. The
//! registry is shared, so a handle that is never revoked stays live for the
//! registry's whole lifetime.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};

use serde::{Deserialize, Serialize};

use super::ImageUpload;

/// Opaque, renderable reference to previewed image bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PreviewHandle(uuid::Uuid);

impl PreviewHandle {
    fn new() -> Self {
        Self(uuid::Uuid::new_v4())
    }
}

impl fmt::Display for PreviewHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "blob:preview/{}", self.0)
    }
}

/// Process-wide table of live preview handles.
#[derive(Debug, Default)]
pub struct PreviewRegistry {
    live: Mutex<HashMap<PreviewHandle, ImageUpload>>,
}

impl PreviewRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty registry behind an [`Arc`], ready to share.
    #[must_use]
    pub fn shared() -> Arc<Self> {
        Arc::new(Self::new())
    }

    /// Allocates a fresh handle pinning `upload`.
    pub fn create(&self, upload: &ImageUpload) -> PreviewHandle {
        let handle = PreviewHandle::new();
        self.lock().insert(handle, upload.clone());
        handle
    }

    /// Resolves a live handle to its image.
    #[must_use]
    pub fn resolve(&self, handle: &PreviewHandle) -> Option<ImageUpload> {
        self.lock().get(handle).cloned()
    }

    /// Releases a handle. Returns `false` if it was not live.
    pub fn revoke(&self, handle: &PreviewHandle) -> bool {
        self.lock().remove(handle).is_some()
    }

    /// Returns `true` if the handle has not been revoked.
    #[must_use]
    pub fn is_live(&self, handle: &PreviewHandle) -> bool {
        self.lock().contains_key(handle)
    }

    /// Number of handles not yet revoked.
    #[must_use]
    pub fn live_count(&self) -> usize {
        self.lock().len()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<PreviewHandle, ImageUpload>> {
        self.live.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn upload() -> ImageUpload {
        ImageUpload::new(vec![1u8, 2, 3], "label.png")
    }

    #[test]
    fn create_then_revoke() {
        let registry = PreviewRegistry::new();
        let handle = registry.create(&upload());
        assert!(registry.is_live(&handle));
        assert_eq!(registry.live_count(), 1);

        assert!(registry.revoke(&handle));
        assert!(!registry.is_live(&handle));
        assert_eq!(registry.live_count(), 0);
    }

    #[test]
    fn revoke_twice_is_harmless() {
        let registry = PreviewRegistry::new();
        let handle = registry.create(&upload());
        assert!(registry.revoke(&handle));
        assert!(!registry.revoke(&handle));
    }

    #[test]
    fn handles_are_unique() {
        let registry = PreviewRegistry::new();
        let a = registry.create(&upload());
        let b = registry.create(&upload());
        assert_ne!(a, b);
        assert_eq!(registry.live_count(), 2);
    }

    #[test]
    fn resolve_returns_pinned_bytes() {
        let registry = PreviewRegistry::new();
        let handle = registry.create(&upload());
        let resolved = registry.resolve(&handle).map(|u| u.bytes().to_vec());
        assert_eq!(resolved, Some(vec![1, 2, 3]));

        registry.revoke(&handle);
        assert!(registry.resolve(&handle).is_none());
    }

    #[test]
    fn display_looks_like_object_url() {
        let registry = PreviewRegistry::new();
        let handle = registry.create(&upload());
        assert!(handle.to_string().starts_with("blob:preview/"));
    }
}
