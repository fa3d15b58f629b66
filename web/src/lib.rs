use std::sync::Arc;

use domain::Ingestor;
use log::*;
use tokio::net::TcpListener;

mod controller;
mod error;
pub mod router;

pub use error::{Error, Result};

// Needs to implement Clone to be able to be passed into Router as State
#[derive(Clone)]
pub struct AppState {
    pub ingestor: Arc<Ingestor>,
}

impl AppState {
    pub fn new(ingestor: Ingestor) -> Self {
        Self {
            ingestor: Arc::new(ingestor),
        }
    }
}

pub async fn init_server(app_state: AppState, bind_address: &str) -> std::io::Result<()> {
    let listener = TcpListener::bind(bind_address).await?;
    let local_addr = listener.local_addr()?;

    if let Err(e) = app_state.ingestor.event_log().record(
        Level::Info,
        &format!("Server starting... listening for webhooks on http://{local_addr}/webhook"),
    ) {
        warn!("Failed to write to event log: {e}");
    }

    axum::serve(listener, router::define_routes(app_state)).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use service::EventLog;
    use std::fs;
    use std::time::Duration;

    #[tokio::test]
    async fn test_init_server_logs_startup_once() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("watchdog.log");
        let app_state = AppState::new(Ingestor::unverified(EventLog::new(&path)));

        let served = tokio::time::timeout(
            Duration::from_millis(200),
            init_server(app_state, "127.0.0.1:0"),
        )
        .await;

        assert!(served.is_err(), "server should keep running");
        let log = fs::read_to_string(&path).unwrap();
        assert_eq!(log.lines().count(), 1);
        assert!(log.contains(
            " - INFO - Server starting... listening for webhooks on http://127.0.0.1:"
        ));
    }
}
