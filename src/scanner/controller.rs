// SPDX-License-Identifier: GPL-3.0-only

//! Scanner controller
//!
//! Owns the capture session, asks for camera permission, and publishes the
//! latest decoded value, the permission-denied flag and the capture handle.

use super::decode_loop;
use super::state::{CaptureHandle, Detection, ScannerEvent, ScannerPhase, ScannerSnapshot};
use crate::backends::camera::CaptureSource;
use crate::backends::permission::{PermissionProvider, PermissionState};
use crate::config::Config;
use crate::constants::{detection, preview, text};
use crate::frame_processor::QrDetector;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::sync::{broadcast, watch};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

/// Capacity of the event broadcast channel
const EVENT_CAPACITY: usize = 64;

/// Tuning knobs for the controller
#[derive(Debug, Clone)]
pub struct ScannerOptions {
    pub decode_interval: Duration,
    pub detector_max_dimension: u32,
    pub suppress_repeats: bool,
    pub frame_channel_capacity: usize,
}

impl Default for ScannerOptions {
    fn default() -> Self {
        Self {
            decode_interval: Duration::from_millis(detection::DEFAULT_DECODE_INTERVAL_MS),
            detector_max_dimension: detection::DEFAULT_MAX_DIMENSION,
            suppress_repeats: false,
            frame_channel_capacity: preview::DEFAULT_FRAME_CHANNEL_CAPACITY,
        }
    }
}

impl ScannerOptions {
    pub fn from_config(config: &Config) -> Self {
        Self {
            decode_interval: config.decode_interval(),
            detector_max_dimension: config.detector_max_dimension,
            suppress_repeats: config.suppress_repeats,
            frame_channel_capacity: config.frame_channel_capacity.max(1),
        }
    }
}

/// Mutable session bookkeeping, never held across an `.await`
#[derive(Default)]
struct Control {
    decode_task: Option<JoinHandle<()>>,
}

pub(crate) struct Inner {
    /// Locked only on the blocking pool or once a session is published
    capture: Mutex<Box<dyn CaptureSource>>,
    /// Bumped by every stop under the control lock; a start resolving under
    /// an older generation is discarded
    generation: AtomicU64,
    permission: Arc<dyn PermissionProvider>,
    detector: QrDetector,
    options: ScannerOptions,
    control: Mutex<Control>,
    state: watch::Sender<ScannerSnapshot>,
    events: broadcast::Sender<ScannerEvent>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|e| e.into_inner())
}

impl Inner {
    fn emit(&self, event: ScannerEvent) {
        // No subscribers is fine
        let _ = self.events.send(event);
    }

    /// Store a decoded value as the latest detection, overwriting the previous one
    pub(crate) fn handle_decoded(&self, value: String) {
        let mut repeated = false;
        self.state.send_modify(|s| {
            repeated = s.last_detected() == Some(value.as_str());
            s.detection = Some(Detection::new(value.clone()));
        });

        if repeated && self.options.suppress_repeats {
            return;
        }
        info!(value = %value, "Barcode detected");
        self.emit(ScannerEvent::Detected(value));
    }

    fn is_current(&self, generation: u64) -> bool {
        self.generation.load(Ordering::SeqCst) == generation
    }

    /// Open the camera and publish the session. Runs on the blocking pool.
    ///
    /// Lock order is capture then control. `stop_scanning` only takes the
    /// capture lock while a session is published, which cannot happen while
    /// a current start is in here.
    fn open_session(self: &Arc<Self>, generation: u64, runtime: &Handle) {
        let mut capture = lock(&self.capture);
        if !self.is_current(generation) {
            debug!(generation, "Start superseded by stop, not capturing");
            return;
        }

        let (frame_tx, frame_rx) =
            futures::channel::mpsc::channel(self.options.frame_channel_capacity);
        let started = capture.start(frame_tx);

        let mut control = lock(&self.control);
        if !self.is_current(generation) {
            debug!(generation, "Stopped while the camera was opening, releasing it");
            if started.is_ok()
                && let Err(e) = capture.stop()
            {
                warn!(error = %e, "Failed to release superseded capture");
            }
            return;
        }
        if let Err(e) = started {
            error!(error = %e, "Failed to start capture");
            self.state.send_modify(|s| s.phase = ScannerPhase::Idle);
            return;
        }

        let (preview_tx, preview_rx) = watch::channel(None);
        let handle = CaptureHandle::new(capture.device_name(), preview_rx);
        drop(capture);
        let id = handle.id();

        control.decode_task = Some(runtime.spawn(decode_loop::run(
            frame_rx,
            preview_tx,
            self.detector,
            self.options.decode_interval,
            Arc::downgrade(self),
        )));

        self.state.send_modify(|s| {
            s.phase = ScannerPhase::Scanning;
            s.session = Some(handle);
            s.permission_denied = false;
        });
        info!(session = %id, "Scanning started");
        self.emit(ScannerEvent::SessionStarted { id });
    }
}

/// Controller for a single scanning screen
///
/// Cheap to clone; all clones drive the same session.
#[derive(Clone)]
pub struct ScannerController {
    inner: Arc<Inner>,
}

impl ScannerController {
    pub fn new(
        capture: Box<dyn CaptureSource>,
        permission: Arc<dyn PermissionProvider>,
        options: ScannerOptions,
    ) -> Self {
        let (state, _) = watch::channel(ScannerSnapshot::default());
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        let detector = QrDetector::with_max_dimension(options.detector_max_dimension);

        Self {
            inner: Arc::new(Inner {
                capture: Mutex::new(capture),
                generation: AtomicU64::new(0),
                permission,
                detector,
                options,
                control: Mutex::new(Control::default()),
                state,
                events,
            }),
        }
    }

    /// Current published state
    pub fn snapshot(&self) -> ScannerSnapshot {
        self.inner.state.borrow().clone()
    }

    /// Subscribe to published state changes
    pub fn subscribe(&self) -> watch::Receiver<ScannerSnapshot> {
        self.inner.state.subscribe()
    }

    /// Subscribe to controller notifications
    pub fn events(&self) -> broadcast::Receiver<ScannerEvent> {
        self.inner.events.subscribe()
    }

    /// Permission as last reported by the provider
    pub fn permission_state(&self) -> PermissionState {
        self.inner.permission.status()
    }

    /// Ask for permission if needed and start capturing.
    ///
    /// No-op while a session is running or a request is already pending.
    /// A denial is published through the snapshot and a `PermissionDenied` event.
    pub async fn start_scanning(&self) {
        let generation = {
            let _control = lock(&self.inner.control);
            let claimed = self.inner.state.send_if_modified(|s| {
                if s.session.is_some() || s.phase == ScannerPhase::RequestingPermission {
                    false
                } else {
                    s.phase = ScannerPhase::RequestingPermission;
                    true
                }
            });
            if !claimed {
                debug!("Scanning already started");
                return;
            }
            self.inner.generation.load(Ordering::SeqCst)
        };

        debug!(generation, "Requesting camera permission");
        let permission = self.inner.permission.request().await;

        match permission {
            PermissionState::Granted => self.begin_capture(generation).await,
            PermissionState::Denied | PermissionState::NotDetermined => {
                self.publish_denied(generation)
            }
        }
    }

    /// Opening a camera blocks for up to several seconds, so it runs on the
    /// blocking pool and a concurrent `stop_scanning` returns immediately.
    async fn begin_capture(&self, generation: u64) {
        let inner = Arc::clone(&self.inner);
        let runtime = Handle::current();
        let opened =
            tokio::task::spawn_blocking(move || inner.open_session(generation, &runtime)).await;
        if let Err(e) = opened {
            error!(error = %e, "Capture start task failed");
            let _control = lock(&self.inner.control);
            if self.inner.is_current(generation) {
                self.inner.state.send_modify(|s| s.phase = ScannerPhase::Idle);
            }
        }
    }

    fn publish_denied(&self, generation: u64) {
        let _control = lock(&self.inner.control);
        if !self.inner.is_current(generation) {
            debug!(generation, "Permission answer arrived after stop, ignoring");
            return;
        }

        let message = text::ACCESS_DENIED_MESSAGE.to_string();
        self.inner.state.send_modify(|s| {
            s.phase = ScannerPhase::Denied;
            s.permission_denied = true;
            s.denied_message = message.clone();
        });
        warn!("Camera permission denied");
        self.inner.emit(ScannerEvent::PermissionDenied { message });
    }

    /// Halt capture if running. Safe to call when not running.
    ///
    /// Keeps the last detected value. Never waits for a camera that is still
    /// opening.
    pub fn stop_scanning(&self) {
        let mut control = lock(&self.inner.control);

        let (phase, session) = {
            let state = self.inner.state.borrow();
            (state.phase, state.session.clone())
        };
        if session.is_none() && phase != ScannerPhase::RequestingPermission {
            debug!("Scanner not running, nothing to stop");
            return;
        }

        self.inner.generation.fetch_add(1, Ordering::SeqCst);
        if let Some(task) = control.decode_task.take() {
            task.abort();
        }
        // A start still opening the camera releases it on its own
        if session.is_some()
            && let Err(e) = lock(&self.inner.capture).stop()
        {
            warn!(error = %e, "Failed to stop capture cleanly");
        }

        self.inner.state.send_modify(|s| {
            s.phase = ScannerPhase::Idle;
            s.session = None;
        });

        match session {
            Some(handle) => {
                info!(session = %handle.id(), "Scanning stopped");
                self.inner
                    .emit(ScannerEvent::SessionStopped { id: handle.id() });
            }
            None => debug!("Pending permission request cancelled"),
        }
    }

    /// Clear the last value and start a fresh session
    pub async fn reset(&self) {
        self.clear_detection();
        self.stop_scanning();
        self.start_scanning().await;
    }

    /// Forget the last detected value
    pub fn clear_detection(&self) {
        self.inner.state.send_if_modified(|s| s.detection.take().is_some());
    }

    /// Lower the permission-denied flag once the alert has been dismissed
    pub fn dismiss_permission_alert(&self) {
        self.inner
            .state
            .send_if_modified(|s| std::mem::replace(&mut s.permission_denied, false));
    }

    /// Decode callback: store `value` as the latest detection
    pub fn handle_decoded(&self, value: impl Into<String>) {
        self.inner.handle_decoded(value.into());
    }
}

impl std::fmt::Debug for ScannerController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.inner.state.borrow();
        f.debug_struct("ScannerController")
            .field("phase", &state.phase)
            .field("active", &state.is_active())
            .finish()
    }
}

impl Drop for Inner {
    fn drop(&mut self) {
        if let Some(task) = lock(&self.control).decode_task.take() {
            task.abort();
        }
        let capture = self.capture.get_mut().unwrap_or_else(|e| e.into_inner());
        if capture.is_running()
            && let Err(e) = capture.stop()
        {
            warn!(error = %e, "Failed to stop capture on drop");
        }
    }
}
