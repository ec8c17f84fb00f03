//! Connection lifecycle ordering: start, run, stop.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use corvid_bot::prelude::*;
use corvid_bot::BotError;
use corvid_gateway::{GatewayError, GatewayResult};

struct FakeConnection {
    calls: Arc<Mutex<Vec<&'static str>>>,
    start_result: Option<GatewayError>,
    run_result: Option<GatewayError>,
}

impl FakeConnection {
    fn new(calls: Arc<Mutex<Vec<&'static str>>>) -> Self {
        Self {
            calls,
            start_result: None,
            run_result: None,
        }
    }
}

#[async_trait]
impl Connection for FakeConnection {
    async fn start(&mut self) -> GatewayResult<()> {
        self.calls.lock().unwrap().push("start");
        match self.start_result.take() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    async fn run(&mut self) -> GatewayResult<()> {
        self.calls.lock().unwrap().push("run");
        match self.run_result.take() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    async fn stop(&mut self) {
        self.calls.lock().unwrap().push("stop");
    }
}

#[tokio::test]
async fn lifecycle_runs_start_run_stop_in_order() {
    let calls = Arc::new(Mutex::new(Vec::new()));
    let conn = FakeConnection::new(Arc::clone(&calls));

    run_lifecycle(conn).await.unwrap();

    assert_eq!(*calls.lock().unwrap(), vec!["start", "run", "stop"]);
}

#[tokio::test]
async fn stop_runs_even_when_run_fails() {
    let calls = Arc::new(Mutex::new(Vec::new()));
    let mut conn = FakeConnection::new(Arc::clone(&calls));
    conn.run_result = Some(GatewayError::AuthenticationFailed);

    let outcome = run_lifecycle(conn).await;

    assert_eq!(*calls.lock().unwrap(), vec!["start", "run", "stop"]);
    assert!(matches!(
        outcome,
        Err(BotError::Gateway(GatewayError::AuthenticationFailed))
    ));
}

#[tokio::test]
async fn start_failure_propagates_without_running_or_stopping() {
    let calls = Arc::new(Mutex::new(Vec::new()));
    let mut conn = FakeConnection::new(Arc::clone(&calls));
    conn.start_result = Some(GatewayError::HelloTimeout);

    let outcome = run_lifecycle(conn).await;

    assert_eq!(*calls.lock().unwrap(), vec!["start"]);
    assert!(matches!(
        outcome,
        Err(BotError::Gateway(GatewayError::HelloTimeout))
    ));
}

#[tokio::test]
async fn stop_happens_exactly_once() {
    let calls = Arc::new(Mutex::new(Vec::new()));
    let conn = FakeConnection::new(Arc::clone(&calls));

    run_lifecycle(conn).await.unwrap();

    let stops = calls
        .lock()
        .unwrap()
        .iter()
        .filter(|c| **c == "stop")
        .count();
    assert_eq!(stops, 1);
}
