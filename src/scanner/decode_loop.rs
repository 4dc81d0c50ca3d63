// SPDX-License-Identifier: GPL-3.0-only

//! Per-session frame loop: publishes preview frames and feeds the detector

use super::controller::Inner;
use crate::backends::camera::{CameraFrame, FrameReceiver};
use crate::frame_processor::{QrDetection, QrDetector};
use futures::StreamExt;
use std::sync::{Arc, Weak};
use std::time::{Duration, Instant};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, trace};

/// Run until the capture source drops its sender or the controller goes away.
///
/// At most one detection runs at a time; frames arriving meanwhile only
/// refresh the preview.
pub(crate) async fn run(
    mut frames: FrameReceiver,
    preview: watch::Sender<Option<Arc<CameraFrame>>>,
    detector: QrDetector,
    interval: Duration,
    controller: Weak<Inner>,
) {
    let mut in_flight: Option<JoinHandle<Vec<QrDetection>>> = None;
    let mut last_detection: Option<Instant> = None;
    let mut frame_count: u64 = 0;

    loop {
        tokio::select! {
            frame = frames.next() => {
                let Some(frame) = frame else {
                    debug!(frame_count, "Frame stream ended");
                    break;
                };
                frame_count += 1;
                let frame = Arc::new(frame);
                preview.send_replace(Some(Arc::clone(&frame)));

                let due = last_detection.is_none_or(|t| t.elapsed() >= interval);
                if in_flight.is_none() && due {
                    last_detection = Some(Instant::now());
                    in_flight = Some(tokio::spawn(async move { detector.detect(frame).await }));
                }
            }
            detections = join_in_flight(&mut in_flight) => {
                in_flight = None;
                let Some(inner) = controller.upgrade() else {
                    break;
                };
                trace!(count = detections.len(), "Detection pass finished");
                for detection in detections {
                    inner.handle_decoded(detection.content);
                }
            }
        }
    }

    if let Some(task) = in_flight {
        task.abort();
    }
    preview.send_replace(None);
}

async fn join_in_flight(task: &mut Option<JoinHandle<Vec<QrDetection>>>) -> Vec<QrDetection> {
    match task.as_mut() {
        Some(handle) => handle.await.unwrap_or_default(),
        None => std::future::pending().await,
    }
}
