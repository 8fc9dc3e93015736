//! Background task forwarding location samples to the tracking stream.

use digitask_common::RealtimeError;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::connection::ConnectionSender;
use crate::protocol::TrackingOutbound;

use super::types::{LocationError, LocationProvider, PresenceSample, WatchOptions};

pub struct LocationPublisher {
    cancel: CancellationToken,
    task: Option<JoinHandle<()>>,
}

impl LocationPublisher {
    /// Begin watching `provider` and publishing onto `tracking`.
    pub fn start(
        provider: &dyn LocationProvider,
        options: WatchOptions,
        tracking: ConnectionSender,
    ) -> Self {
        info!(
            high_accuracy = options.high_accuracy,
            maximum_age_ms = options.maximum_age.as_millis() as u64,
            timeout_ms = options.timeout.as_millis() as u64,
            "Starting location watch"
        );
        let samples = provider.watch(options);
        let cancel = CancellationToken::new();
        let task = tokio::spawn(publish_loop(samples, tracking, cancel.clone()));
        Self {
            cancel,
            task: Some(task),
        }
    }

    /// Cancel the watch. Idempotent.
    pub fn stop(&mut self) {
        if self.cancel.is_cancelled() {
            return;
        }
        info!("Stopping location watch");
        self.cancel.cancel();
        self.task.take();
    }

    pub fn is_running(&self) -> bool {
        !self.cancel.is_cancelled()
            && self.task.as_ref().is_some_and(|task| !task.is_finished())
    }
}

impl Drop for LocationPublisher {
    fn drop(&mut self) {
        self.stop();
    }
}

async fn publish_loop(
    mut samples: mpsc::Receiver<Result<PresenceSample, LocationError>>,
    tracking: ConnectionSender,
    cancel: CancellationToken,
) {
    loop {
        let next = tokio::select! {
            _ = cancel.cancelled() => break,
            next = samples.recv() => next,
        };
        match next {
            Some(Ok(sample)) => publish(&tracking, &sample),
            Some(Err(e)) => {
                warn!(error = %e, "Location watch error");
            }
            None => {
                debug!("Location watch ended");
                break;
            }
        }
    }
    // Dropping the receiver ends the provider's watch.
}

fn publish(tracking: &ConnectionSender, sample: &PresenceSample) {
    match tracking.send_json(&TrackingOutbound::from(sample)) {
        Ok(()) => {
            debug!(
                latitude = sample.latitude,
                longitude = sample.longitude,
                "Location published"
            );
        }
        Err(RealtimeError::NotConnected) => {
            debug!(status = ?tracking.status(), "Tracking not open; location sample dropped");
        }
        Err(e) => {
            warn!(error = %e, "Location sample not sent");
        }
    }
}
