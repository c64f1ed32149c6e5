use geotodo_core::{
    Accuracy, Authorization, Coordinate, HostLocationSource, LocationError, LocationProvider,
    LocationSink, LocationSource,
};
use std::cell::RefCell;
use std::rc::Rc;
use std::sync::{Arc, Mutex};

#[test]
fn updates_apply_only_when_pumped() {
    let (source, feed) = HostLocationSource::new(Authorization::Granted);
    let mut provider = LocationProvider::new();
    provider.start(Box::new(source)).unwrap();

    assert!(feed.report(Coordinate::new(25.0330, 121.5654)));
    assert_eq!(provider.current_coordinate(), None);

    assert_eq!(provider.pump(), 1);
    assert_eq!(
        provider.current_coordinate(),
        Some(Coordinate::new(25.0330, 121.5654))
    );
}

#[test]
fn latest_update_wins_and_listeners_see_each_one() {
    let (source, feed) = HostLocationSource::new(Authorization::Granted);
    let mut provider = LocationProvider::new();
    provider.start(Box::new(source)).unwrap();

    let seen = Rc::new(RefCell::new(Vec::new()));
    let sink = seen.clone();
    let listener = provider.on_update(move |coordinate| sink.borrow_mut().push(coordinate));

    feed.report(Coordinate::new(1.0, 1.0));
    feed.report(Coordinate::new(2.0, 2.0));
    provider.pump();

    assert_eq!(provider.current_coordinate(), Some(Coordinate::new(2.0, 2.0)));
    assert_eq!(seen.borrow().len(), 2);

    assert!(provider.remove_listener(listener));
    feed.report(Coordinate::new(3.0, 3.0));
    provider.pump();
    assert_eq!(seen.borrow().len(), 2);
}

#[test]
fn reports_from_other_threads_are_marshalled() {
    let (source, feed) = HostLocationSource::new(Authorization::Granted);
    let mut provider = LocationProvider::new();
    provider.start(Box::new(source)).unwrap();

    let worker = std::thread::spawn(move || feed.report(Coordinate::new(-41.2865, 174.7762)));
    assert!(worker.join().unwrap());

    provider.pump();
    assert_eq!(
        provider.current_coordinate(),
        Some(Coordinate::new(-41.2865, 174.7762))
    );
}

#[test]
fn denied_authorization_leaves_coordinate_unset() {
    let (source, feed) = HostLocationSource::new(Authorization::Denied);
    let mut provider = LocationProvider::new();

    let err = provider.start(Box::new(source)).unwrap_err();
    assert_eq!(err, LocationError::NotAuthorized(Authorization::Denied));
    assert!(!provider.is_running());

    assert!(!feed.report(Coordinate::new(10.0, 10.0)));
    provider.pump();
    assert_eq!(provider.current_coordinate(), None);
}

#[test]
fn denied_restart_drops_coordinate_from_previous_subscription() {
    let (granted, feed) = HostLocationSource::new(Authorization::Granted);
    let mut provider = LocationProvider::new();
    provider.start(Box::new(granted)).unwrap();
    feed.report(Coordinate::new(10.0, 20.0));
    provider.pump();
    assert_eq!(provider.current_coordinate(), Some(Coordinate::new(10.0, 20.0)));

    let (denied, _denied_feed) = HostLocationSource::new(Authorization::Denied);
    let err = provider.start(Box::new(denied)).unwrap_err();

    assert_eq!(err, LocationError::NotAuthorized(Authorization::Denied));
    assert_eq!(provider.authorization(), Authorization::Denied);
    assert_eq!(provider.current_coordinate(), None);
}

#[test]
fn failed_restart_drops_coordinate_from_previous_subscription() {
    let (granted, feed) = HostLocationSource::new(Authorization::Granted);
    let mut provider = LocationProvider::new();
    provider.start(Box::new(granted)).unwrap();
    feed.report(Coordinate::new(10.0, 20.0));
    provider.pump();

    let err = provider.start(Box::new(UnavailableSource)).unwrap_err();

    assert!(matches!(err, LocationError::Unavailable(_)));
    assert!(!provider.is_running());
    assert_eq!(provider.current_coordinate(), None);
}

#[test]
fn failures_and_invalid_readings_keep_last_coordinate() {
    let (source, feed) = HostLocationSource::new(Authorization::Granted);
    let mut provider = LocationProvider::new();
    provider.start(Box::new(source)).unwrap();

    feed.report(Coordinate::new(51.5072, -0.1276));
    feed.report_failure("no signal");
    feed.report(Coordinate::new(120.0, 0.0));
    assert_eq!(provider.pump(), 3);

    assert_eq!(
        provider.current_coordinate(),
        Some(Coordinate::new(51.5072, -0.1276))
    );
}

#[test]
fn revoked_authorization_clears_coordinate() {
    let (source, feed) = HostLocationSource::new(Authorization::Granted);
    let mut provider = LocationProvider::new();
    provider.start(Box::new(source)).unwrap();

    feed.report(Coordinate::new(0.5, 0.5));
    feed.report_authorization(Authorization::Denied);
    feed.report(Coordinate::new(0.6, 0.6));
    provider.pump();

    assert_eq!(provider.authorization(), Authorization::Denied);
    assert_eq!(provider.current_coordinate(), None);
}

#[test]
fn stop_detaches_backend_and_requests_best_accuracy() {
    let calls = Arc::new(Mutex::new(Vec::new()));
    let mut provider = LocationProvider::new();
    provider
        .start(Box::new(RecordingSource {
            calls: calls.clone(),
        }))
        .unwrap();
    assert!(provider.is_running());

    provider.stop();
    assert!(!provider.is_running());
    assert_eq!(
        *calls.lock().unwrap(),
        vec!["authorize", "start:Best", "stop"]
    );
}

struct RecordingSource {
    calls: Arc<Mutex<Vec<String>>>,
}

impl LocationSource for RecordingSource {
    fn request_authorization(&mut self) -> Authorization {
        self.calls.lock().unwrap().push("authorize".to_string());
        Authorization::Granted
    }

    fn start_updates(
        &mut self,
        accuracy: Accuracy,
        _sink: LocationSink,
    ) -> Result<(), LocationError> {
        self.calls.lock().unwrap().push(format!("start:{accuracy:?}"));
        Ok(())
    }

    fn stop_updates(&mut self) {
        self.calls.lock().unwrap().push("stop".to_string());
    }
}

struct UnavailableSource;

impl LocationSource for UnavailableSource {
    fn request_authorization(&mut self) -> Authorization {
        Authorization::Granted
    }

    fn start_updates(
        &mut self,
        _accuracy: Accuracy,
        _sink: LocationSink,
    ) -> Result<(), LocationError> {
        Err(LocationError::Unavailable("no GPS hardware".to_string()))
    }

    fn stop_updates(&mut self) {}
}
