//! Location backend fed by the embedding host.
//!
//! The host shell owns the real platform API and pushes readings in through
//! a cloneable `HostLocationFeed`. Reports made before `start_updates` or
//! after `stop_updates` are dropped.

use super::{Accuracy, Authorization, LocationError, LocationSink, LocationSource};
use crate::model::task::Coordinate;
use std::sync::{Arc, Mutex, MutexGuard};

type SharedSink = Arc<Mutex<Option<LocationSink>>>;

/// `LocationSource` whose readings come from `HostLocationFeed`.
pub struct HostLocationSource {
    authorization: Authorization,
    sink: SharedSink,
}

impl HostLocationSource {
    /// Creates a source reporting `authorization` when asked, plus the feed
    /// the host uses to push readings.
    pub fn new(authorization: Authorization) -> (Self, HostLocationFeed) {
        let sink: SharedSink = Arc::new(Mutex::new(None));
        let feed = HostLocationFeed { sink: sink.clone() };
        (
            Self {
                authorization,
                sink,
            },
            feed,
        )
    }
}

impl LocationSource for HostLocationSource {
    fn request_authorization(&mut self) -> Authorization {
        self.authorization
    }

    fn start_updates(
        &mut self,
        _accuracy: Accuracy,
        sink: LocationSink,
    ) -> Result<(), LocationError> {
        *lock(&self.sink) = Some(sink);
        Ok(())
    }

    fn stop_updates(&mut self) {
        lock(&self.sink).take();
    }
}

/// Host-side handle for pushing readings from any thread.
#[derive(Clone)]
pub struct HostLocationFeed {
    sink: SharedSink,
}

impl HostLocationFeed {
    /// Returns `false` when no subscription is active.
    pub fn report(&self, coordinate: Coordinate) -> bool {
        self.with_sink(|sink| sink.update(coordinate))
    }

    pub fn report_failure(&self, reason: impl Into<String>) -> bool {
        let reason = reason.into();
        self.with_sink(|sink| sink.fail(reason))
    }

    pub fn report_authorization(&self, state: Authorization) -> bool {
        self.with_sink(|sink| sink.authorization_changed(state))
    }

    fn with_sink(&self, f: impl FnOnce(&LocationSink) -> bool) -> bool {
        lock(&self.sink).as_ref().is_some_and(f)
    }
}

fn lock(sink: &SharedSink) -> MutexGuard<'_, Option<LocationSink>> {
    sink.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}
