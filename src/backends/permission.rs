// SPDX-License-Identifier: GPL-3.0-only

//! Camera access permission
//!
//! Access is requested through xdg-desktop-portal's Camera interface over
//! the session D-Bus. The portal remembers the user's answer, so asking again
//! after a denial returns the stored decision without prompting.

use crate::errors::PermissionError;
use futures::StreamExt;
use futures::future::BoxFuture;
use std::collections::HashMap;
use std::sync::Mutex;
use tracing::{debug, info, warn};
use zbus::zvariant::{OwnedObjectPath, OwnedValue, Value};

const PORTAL_DESTINATION: &str = "org.freedesktop.portal.Desktop";
const PORTAL_PATH: &str = "/org/freedesktop/portal/desktop";
const CAMERA_INTERFACE: &str = "org.freedesktop.portal.Camera";
const REQUEST_INTERFACE: &str = "org.freedesktop.portal.Request";

/// Camera permission as known to the platform
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PermissionState {
    /// The user has not been asked yet
    #[default]
    NotDetermined,
    Granted,
    Denied,
}

impl PermissionState {
    /// Map a portal `Response` code (0 = success, 1 = cancelled, 2 = other)
    pub fn from_portal_response(code: u32) -> Self {
        if code == 0 {
            PermissionState::Granted
        } else {
            PermissionState::Denied
        }
    }
}

/// Source of camera access decisions
pub trait PermissionProvider: Send + Sync {
    /// Last known permission state, without prompting
    fn status(&self) -> PermissionState;

    /// Ask for camera access, prompting the user only if not yet determined
    fn request(&self) -> BoxFuture<'_, PermissionState>;
}

/// Permission provider backed by xdg-desktop-portal
#[derive(Debug, Default)]
pub struct PortalPermission {
    state: Mutex<PermissionState>,
}

impl PortalPermission {
    pub fn new() -> Self {
        Self::default()
    }

    fn remember(&self, state: PermissionState) -> PermissionState {
        *self.state.lock().unwrap_or_else(|e| e.into_inner()) = state;
        state
    }
}

impl PermissionProvider for PortalPermission {
    fn status(&self) -> PermissionState {
        *self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn request(&self) -> BoxFuture<'_, PermissionState> {
        Box::pin(async move {
            let state = resolve_access(access_camera().await);
            info!(?state, "Camera permission resolved");
            self.remember(state)
        })
    }
}

/// Permission provider with a fixed answer (e.g. `--no-portal`)
#[derive(Debug, Clone, Copy)]
pub struct StaticPermission(pub PermissionState);

impl PermissionProvider for StaticPermission {
    fn status(&self) -> PermissionState {
        self.0
    }

    fn request(&self) -> BoxFuture<'_, PermissionState> {
        let state = self.0;
        Box::pin(async move { state })
    }
}

/// Turn the outcome of a portal request into a permission decision
///
/// Only a missing portal falls back to direct device access. Once the portal
/// has answered, any later failure refuses access.
fn resolve_access(result: Result<PermissionState, PermissionError>) -> PermissionState {
    match result {
        Ok(state) => state,
        Err(PermissionError::PortalUnavailable(e)) => {
            // Outside a sandbox the camera nodes are directly accessible
            warn!(error = %e, "Camera portal unavailable, assuming direct device access");
            PermissionState::Granted
        }
        Err(e) => {
            warn!(error = %e, "Camera access request failed");
            PermissionState::Denied
        }
    }
}

/// Failure after the portal was found to be present
fn protocol_error(e: zbus::Error) -> PermissionError {
    PermissionError::Protocol(e.to_string())
}

/// Object path of the Request the portal will create for `token`
pub fn request_path(unique_name: &str, token: &str) -> String {
    let sender = unique_name.trim_start_matches(':').replace('.', "_");
    format!("{}/request/{}/{}", PORTAL_PATH, sender, token)
}

/// Call `org.freedesktop.portal.Camera.AccessCamera` and wait for the response
async fn access_camera() -> Result<PermissionState, PermissionError> {
    let connection = zbus::Connection::session().await?;

    let camera = zbus::Proxy::new(
        &connection,
        PORTAL_DESTINATION,
        PORTAL_PATH,
        CAMERA_INTERFACE,
    )
    .await?;

    match camera.get_property::<bool>("IsCameraPresent").await {
        Ok(false) => warn!("Portal reports no camera present"),
        Ok(true) => {}
        Err(e) => return Err(PermissionError::PortalUnavailable(e.to_string())),
    }

    let unique_name = connection
        .unique_name()
        .map(|name| name.to_string())
        .ok_or_else(|| PermissionError::Protocol("connection has no unique name".to_string()))?;
    let token = format!("barcode_scanner_{}", uuid::Uuid::new_v4().simple());
    let path = request_path(&unique_name, &token);

    // Subscribe before calling so the response cannot be missed
    let request = zbus::Proxy::new(&connection, PORTAL_DESTINATION, path.clone(), REQUEST_INTERFACE)
        .await
        .map_err(protocol_error)?;
    let mut responses = request
        .receive_signal("Response")
        .await
        .map_err(protocol_error)?;

    let mut options: HashMap<&str, Value> = HashMap::new();
    options.insert("handle_token", Value::from(token.as_str()));

    let handle: OwnedObjectPath = camera
        .call("AccessCamera", &(options,))
        .await
        .map_err(protocol_error)?;
    debug!(handle = %handle, expected = %path, "Camera access requested");

    let message = responses
        .next()
        .await
        .ok_or_else(|| PermissionError::Protocol("response stream closed".to_string()))?;

    let (code, _results): (u32, HashMap<String, OwnedValue>) = message
        .body()
        .deserialize()
        .map_err(|e| PermissionError::Protocol(e.to_string()))?;

    Ok(PermissionState::from_portal_response(code))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_path_escapes_sender() {
        assert_eq!(
            request_path(":1.42", "tok"),
            "/org/freedesktop/portal/desktop/request/1_42/tok"
        );
    }

    #[test]
    fn test_portal_response_codes() {
        assert_eq!(
            PermissionState::from_portal_response(0),
            PermissionState::Granted
        );
        assert_eq!(
            PermissionState::from_portal_response(1),
            PermissionState::Denied
        );
        assert_eq!(
            PermissionState::from_portal_response(2),
            PermissionState::Denied
        );
    }

    #[test]
    fn test_missing_portal_grants_direct_access() {
        let result = Err(PermissionError::PortalUnavailable("no bus".to_string()));
        assert_eq!(resolve_access(result), PermissionState::Granted);
    }

    #[test]
    fn test_failed_access_call_denies() {
        let result = Err(protocol_error(zbus::Error::Failure(
            "AccessCamera rejected".to_string(),
        )));
        assert_eq!(resolve_access(result), PermissionState::Denied);

        let closed = Err(PermissionError::Protocol("response stream closed".to_string()));
        assert_eq!(resolve_access(closed), PermissionState::Denied);
    }

    #[test]
    fn test_portal_answer_passes_through() {
        assert_eq!(
            resolve_access(Ok(PermissionState::Denied)),
            PermissionState::Denied
        );
        assert_eq!(
            resolve_access(Ok(PermissionState::Granted)),
            PermissionState::Granted
        );
    }

    #[tokio::test]
    async fn test_static_permission() {
        let provider = StaticPermission(PermissionState::Denied);
        assert_eq!(provider.request().await, PermissionState::Denied);
        assert_eq!(provider.status(), PermissionState::Denied);
    }

    #[test]
    fn test_portal_permission_starts_undetermined() {
        assert_eq!(
            PortalPermission::new().status(),
            PermissionState::NotDetermined
        );
    }
}
