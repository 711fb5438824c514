//! Lifecycle of generated binary artifacts.
//!
//! Payloads returned by the service are decoded once and registered with a
//! [`ResourceManager`], which hands out revocable [`ResourceHandle`]s. Rendering
//! surfaces resolve a handle to its bytes (or its `blob:` URL) until it is
//! revoked. [`ScopedResource`] revokes automatically when dropped.

pub mod wav;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use bytes::Bytes;
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use uuid::Uuid;

use crate::error::MediaResult;

/// URL scheme prefix of materialized resources.
pub const RESOURCE_URL_PREFIX: &str = "blob:gemini-media/";

/// A revocable reference to a materialized payload.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ResourceHandle {
    id: Uuid,
    mime_type: String,
    byte_len: usize,
}

impl ResourceHandle {
    /// Unique identifier.
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// MIME type of the payload.
    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }

    /// Payload size in bytes.
    pub fn byte_len(&self) -> usize {
        self.byte_len
    }

    /// Object URL rendering surfaces can reference.
    pub fn url(&self) -> String {
        format!("{RESOURCE_URL_PREFIX}{}", self.id)
    }
}

impl fmt::Display for ResourceHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.url())
    }
}

struct Resource {
    mime_type: String,
    data: Bytes,
}

/// Registry of live resources.
///
/// Cloning is cheap and every clone shares the same registry.
#[derive(Clone, Default)]
pub struct ResourceManager {
    resources: Arc<Mutex<HashMap<Uuid, Resource>>>,
}

impl ResourceManager {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Decodes a base64 payload and registers it.
    ///
    /// # Errors
    ///
    /// Returns [`GenerationError::MalformedResponse`](crate::error::GenerationError::MalformedResponse)
    /// if `base64` does not decode.
    pub fn materialize(&self, base64: &str, mime_type: &str) -> MediaResult<ResourceHandle> {
        let data = STANDARD.decode(base64.trim())?;
        Ok(self.materialize_bytes(Bytes::from(data), mime_type))
    }

    /// Registers already decoded bytes.
    pub fn materialize_bytes(&self, data: Bytes, mime_type: &str) -> ResourceHandle {
        let handle = ResourceHandle {
            id: Uuid::new_v4(),
            mime_type: mime_type.to_string(),
            byte_len: data.len(),
        };

        self.lock().insert(
            handle.id,
            Resource {
                mime_type: handle.mime_type.clone(),
                data,
            },
        );
        tracing::debug!(url = %handle.url(), mime_type, bytes = handle.byte_len, "Materialized resource");

        handle
    }

    /// Releases a resource. Returns `false` if it was already revoked.
    pub fn revoke(&self, handle: &ResourceHandle) -> bool {
        let removed = self.lock().remove(&handle.id).is_some();
        if removed {
            tracing::debug!(url = %handle.url(), "Revoked resource");
        } else {
            tracing::trace!(url = %handle.url(), "Resource already revoked");
        }
        removed
    }

    /// The payload behind a live handle; `None` once revoked.
    pub fn bytes(&self, handle: &ResourceHandle) -> Option<Bytes> {
        self.lock().get(&handle.id).map(|r| r.data.clone())
    }

    /// Resolves a `blob:` URL produced by [`ResourceHandle::url`].
    pub fn resolve_url(&self, url: &str) -> Option<(String, Bytes)> {
        let id = url.strip_prefix(RESOURCE_URL_PREFIX)?.parse::<Uuid>().ok()?;
        self.lock()
            .get(&id)
            .map(|r| (r.mime_type.clone(), r.data.clone()))
    }

    /// Whether the handle has not been revoked.
    pub fn is_live(&self, handle: &ResourceHandle) -> bool {
        self.lock().contains_key(&handle.id)
    }

    /// Number of unrevoked resources.
    pub fn live_count(&self) -> usize {
        self.lock().len()
    }

    /// Wraps a handle so it is revoked on drop.
    pub fn scoped(&self, handle: ResourceHandle) -> ScopedResource {
        ScopedResource {
            manager: self.clone(),
            handle: Some(handle),
        }
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<Uuid, Resource>> {
        self.resources.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl fmt::Debug for ResourceManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResourceManager")
            .field("live_count", &self.live_count())
            .finish()
    }
}

/// A resource that is revoked when this guard goes out of scope.
///
/// Call [`ScopedResource::into_handle`] to take manual ownership instead.
#[derive(Debug)]
pub struct ScopedResource {
    manager: ResourceManager,
    handle: Option<ResourceHandle>,
}

impl ScopedResource {
    /// The guarded handle.
    pub fn handle(&self) -> Option<&ResourceHandle> {
        self.handle.as_ref()
    }

    /// Object URL of the guarded resource.
    pub fn url(&self) -> Option<String> {
        self.handle.as_ref().map(ResourceHandle::url)
    }

    /// The payload, while the guard holds it.
    pub fn bytes(&self) -> Option<Bytes> {
        self.handle.as_ref().and_then(|h| self.manager.bytes(h))
    }

    /// MIME type of the guarded resource.
    pub fn mime_type(&self) -> Option<&str> {
        self.handle.as_ref().map(ResourceHandle::mime_type)
    }

    /// Revokes now. Later calls, and the eventual drop, do nothing.
    pub fn revoke(&mut self) -> bool {
        self.handle
            .take()
            .is_some_and(|handle| self.manager.revoke(&handle))
    }

    /// Releases the guard without revoking; the caller must revoke manually.
    pub fn into_handle(mut self) -> Option<ResourceHandle> {
        self.handle.take()
    }
}

impl Drop for ScopedResource {
    fn drop(&mut self) {
        if let Some(handle) = self.handle.take() {
            self.manager.revoke(&handle);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn test_materialize_and_resolve() {
        let manager = ResourceManager::new();
        let handle = manager.materialize("aGVsbG8=", "text/plain").unwrap();

        assert_eq!(handle.byte_len(), 5);
        assert!(handle.url().starts_with("blob:gemini-media/"));
        assert_eq!(manager.bytes(&handle), Some(Bytes::from_static(b"hello")));
        assert_eq!(
            manager.resolve_url(&handle.url()),
            Some(("text/plain".to_string(), Bytes::from_static(b"hello")))
        );
        assert_eq!(manager.live_count(), 1);
    }

    #[test]
    fn test_revoke_twice_is_a_no_op() {
        let manager = ResourceManager::new();
        let handle = manager.materialize("aGVsbG8=", "text/plain").unwrap();

        assert!(manager.revoke(&handle));
        assert!(!manager.revoke(&handle));
        assert!(manager.bytes(&handle).is_none());
        assert!(!manager.is_live(&handle));
        assert_eq!(manager.live_count(), 0);
    }

    #[test]
    fn test_invalid_base64_is_malformed() {
        let manager = ResourceManager::new();
        let error = manager.materialize("not base64!!", "image/png").unwrap_err();

        assert_eq!(error.kind(), ErrorKind::MalformedResponse);
        assert_eq!(manager.live_count(), 0);
    }

    #[test]
    fn test_scoped_resource_revokes_on_drop() {
        let manager = ResourceManager::new();
        let handle = manager.materialize_bytes(Bytes::from_static(b"png"), "image/png");

        {
            let scoped = manager.scoped(handle.clone());
            assert_eq!(scoped.bytes(), Some(Bytes::from_static(b"png")));
        }

        assert!(!manager.is_live(&handle));
    }

    #[test]
    fn test_scoped_resource_manual_revoke_and_release() {
        let manager = ResourceManager::new();

        let mut scoped = manager.scoped(manager.materialize_bytes(Bytes::from_static(b"a"), "audio/wav"));
        assert!(scoped.revoke());
        assert!(!scoped.revoke());
        drop(scoped);

        let kept = manager
            .scoped(manager.materialize_bytes(Bytes::from_static(b"b"), "audio/wav"))
            .into_handle()
            .unwrap();
        assert!(manager.is_live(&kept));
        assert!(manager.revoke(&kept));
    }
}
