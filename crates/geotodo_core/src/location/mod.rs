//! Device location tracking for tagging new tasks.
//!
//! # Responsibility
//! - Ask a platform backend for authorization and start updates.
//! - Keep the most recent coordinate as readable state.
//!
//! # Invariants
//! - Backends may call `LocationSink` from any thread; provider state only
//!   changes inside `pump()` on the owning thread.
//! - Denied authorization or delivery failures never invent a coordinate.

use crate::model::task::Coordinate;
use log::{debug, info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

mod host;

pub use host::{HostLocationFeed, HostLocationSource};

/// Authorization state reported by the platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Authorization {
    NotDetermined,
    Denied,
    Granted,
}

/// Requested accuracy class for updates. The provider always asks for `Best`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Accuracy {
    #[default]
    Best,
}

/// Message delivered by a backend.
#[derive(Debug, Clone, PartialEq)]
pub enum LocationEvent {
    Updated(Coordinate),
    Failed(String),
    AuthorizationChanged(Authorization),
}

#[derive(Debug, Clone, PartialEq)]
pub enum LocationError {
    NotAuthorized(Authorization),
    Unavailable(String),
}

impl Display for LocationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotAuthorized(state) => write!(f, "location not authorized: {state:?}"),
            Self::Unavailable(reason) => write!(f, "location unavailable: {reason}"),
        }
    }
}

impl Error for LocationError {}

/// Thread-safe handle a backend uses to report events.
#[derive(Debug, Clone)]
pub struct LocationSink {
    tx: UnboundedSender<LocationEvent>,
}

impl LocationSink {
    /// Returns `false` once the provider has been dropped.
    pub fn update(&self, coordinate: Coordinate) -> bool {
        self.send(LocationEvent::Updated(coordinate))
    }

    pub fn fail(&self, reason: impl Into<String>) -> bool {
        self.send(LocationEvent::Failed(reason.into()))
    }

    pub fn authorization_changed(&self, state: Authorization) -> bool {
        self.send(LocationEvent::AuthorizationChanged(state))
    }

    fn send(&self, event: LocationEvent) -> bool {
        self.tx.send(event).is_ok()
    }
}

/// Platform location backend.
pub trait LocationSource: Send {
    /// Prompts for (or reports existing) authorization.
    fn request_authorization(&mut self) -> Authorization;
    /// Begins delivering events to `sink` until `stop_updates`.
    fn start_updates(&mut self, accuracy: Accuracy, sink: LocationSink)
        -> Result<(), LocationError>;
    fn stop_updates(&mut self);
}

/// Handle returned by `LocationProvider::on_update`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListenerId(u64);

type Listener = Box<dyn FnMut(Coordinate)>;

/// Owner-thread view of the device location.
pub struct LocationProvider {
    source: Option<Box<dyn LocationSource>>,
    tx: UnboundedSender<LocationEvent>,
    rx: UnboundedReceiver<LocationEvent>,
    current: Option<Coordinate>,
    authorization: Authorization,
    listeners: Vec<(ListenerId, Listener)>,
    next_listener_id: u64,
}

impl Default for LocationProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl LocationProvider {
    /// Creates an idle provider with no coordinate.
    pub fn new() -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            source: None,
            tx,
            rx,
            current: None,
            authorization: Authorization::NotDetermined,
            listeners: Vec::new(),
            next_listener_id: 0,
        }
    }

    /// Requests authorization from `source` and subscribes with best accuracy.
    ///
    /// A denied or failed start clears any coordinate left from a previous
    /// subscription.
    ///
    /// # Errors
    /// - `NotAuthorized` when the platform does not grant access.
    /// - Any error reported by the backend while starting.
    pub fn start(&mut self, mut source: Box<dyn LocationSource>) -> Result<(), LocationError> {
        self.stop();

        self.authorization = source.request_authorization();
        if self.authorization != Authorization::Granted {
            self.current = None;
            warn!(
                "event=location_start module=location status=denied authorization={:?}",
                self.authorization
            );
            return Err(LocationError::NotAuthorized(self.authorization));
        }

        let sink = LocationSink {
            tx: self.tx.clone(),
        };
        if let Err(err) = source.start_updates(Accuracy::Best, sink) {
            self.current = None;
            warn!("event=location_start module=location status=error error={err}");
            return Err(err);
        }

        info!("event=location_start module=location status=ok accuracy=best");
        self.source = Some(source);
        Ok(())
    }

    /// Stops the active backend, keeping the last coordinate.
    pub fn stop(&mut self) {
        if let Some(mut source) = self.source.take() {
            source.stop_updates();
            info!("event=location_stop module=location status=ok");
        }
    }

    pub fn is_running(&self) -> bool {
        self.source.is_some()
    }

    /// Applies queued backend events; returns how many were drained.
    pub fn pump(&mut self) -> usize {
        let mut drained = 0;
        while let Ok(event) = self.rx.try_recv() {
            drained += 1;
            self.apply(event);
        }
        drained
    }

    /// Latest accepted coordinate, if any.
    pub fn current_coordinate(&self) -> Option<Coordinate> {
        self.current
    }

    pub fn authorization(&self) -> Authorization {
        self.authorization
    }

    /// Registers a callback run from `pump()` for each accepted coordinate.
    pub fn on_update(&mut self, listener: impl FnMut(Coordinate) + 'static) -> ListenerId {
        let id = ListenerId(self.next_listener_id);
        self.next_listener_id += 1;
        self.listeners.push((id, Box::new(listener)));
        id
    }

    pub fn remove_listener(&mut self, id: ListenerId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(listener_id, _)| *listener_id != id);
        self.listeners.len() != before
    }

    fn apply(&mut self, event: LocationEvent) {
        match event {
            LocationEvent::Updated(coordinate) => {
                if self.authorization != Authorization::Granted {
                    debug!("event=location_update module=location status=ignored reason=unauthorized");
                    return;
                }
                if let Err(err) = coordinate.validate() {
                    warn!("event=location_update module=location status=rejected error={err}");
                    return;
                }
                self.current = Some(coordinate);
                for (_, listener) in self.listeners.iter_mut() {
                    listener(coordinate);
                }
            }
            LocationEvent::Failed(reason) => {
                warn!("event=location_update module=location status=error error={reason}");
            }
            LocationEvent::AuthorizationChanged(state) => {
                info!("event=location_authorization module=location status=ok authorization={state:?}");
                self.authorization = state;
                if state != Authorization::Granted {
                    self.current = None;
                }
            }
        }
    }
}

impl Drop for LocationProvider {
    fn drop(&mut self) {
        self.stop();
    }
}
