//! Centralized shutdown management

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{Mutex, watch};
use tokio::task::JoinHandle;

use super::constants::SHUTDOWN_TIMEOUT_SECS;
use crate::data::sqlite::SqliteService;

/// Coordinates graceful shutdown: fans a signal out to background tasks,
/// waits for them, then closes the database.
#[derive(Clone)]
pub struct ShutdownService {
    tx: Arc<watch::Sender<bool>>,
    rx: watch::Receiver<bool>,
    handles: Arc<Mutex<Vec<JoinHandle<()>>>>,
    database: Arc<SqliteService>,
}

impl ShutdownService {
    pub fn new(database: Arc<SqliteService>) -> Self {
        let (tx, rx) = watch::channel(false);
        Self {
            tx: Arc::new(tx),
            rx,
            handles: Arc::new(Mutex::new(Vec::new())),
            database,
        }
    }

    /// Register a background task handle to be awaited during shutdown
    pub async fn register(&self, handle: JoinHandle<()>) {
        self.handles.lock().await.push(handle);
    }

    /// Subscribe to the shutdown signal
    pub fn subscribe(&self) -> watch::Receiver<bool> {
        self.rx.clone()
    }

    /// Trigger shutdown
    pub fn trigger(&self) {
        let _ = self.tx.send(true);
    }

    /// Check if shutdown was triggered
    pub fn is_triggered(&self) -> bool {
        *self.rx.borrow()
    }

    /// Future that resolves once shutdown has been triggered
    pub fn wait(&self) -> impl Future<Output = ()> + use<> {
        let mut rx = self.rx.clone();
        async move {
            if *rx.borrow() {
                return;
            }
            let _ = rx.changed().await;
        }
    }

    /// Trigger shutdown, wait for registered tasks, then close the database.
    pub async fn shutdown(&self) {
        tracing::debug!("Initiating graceful shutdown...");
        self.trigger();

        let handles = std::mem::take(&mut *self.handles.lock().await);
        if !handles.is_empty() {
            let timeout = Duration::from_secs(SHUTDOWN_TIMEOUT_SECS);
            match tokio::time::timeout(timeout, futures::future::join_all(handles)).await {
                Ok(_) => tracing::debug!("All background tasks completed"),
                Err(_) => tracing::warn!(
                    timeout_secs = timeout.as_secs(),
                    "Timeout waiting for background tasks"
                ),
            }
        }

        self.database.close().await;
        tracing::info!("Shutdown complete");
    }

    /// Install Ctrl+C / SIGTERM handlers that trigger shutdown.
    pub fn install_signal_handlers(&self) {
        let service = self.clone();
        tokio::spawn(async move {
            let ctrl_c = async {
                tokio::signal::ctrl_c()
                    .await
                    .expect("Failed to install Ctrl+C handler");
            };

            #[cfg(unix)]
            let terminate = async {
                tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
                    .expect("Failed to install SIGTERM handler")
                    .recv()
                    .await;
            };

            #[cfg(not(unix))]
            let terminate = std::future::pending::<()>();

            tokio::select! {
                _ = ctrl_c => tracing::debug!("Received Ctrl+C, shutting down"),
                _ = terminate => tracing::debug!("Received SIGTERM, shutting down"),
            }

            service.trigger();
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn trigger_resolves_waiters() {
        let database = Arc::new(SqliteService::connect_in_memory().await.unwrap());
        let shutdown = ShutdownService::new(database);

        assert!(!shutdown.is_triggered());
        let waiter = shutdown.wait();
        shutdown.trigger();
        waiter.await;
        assert!(shutdown.is_triggered());
    }

    #[tokio::test]
    async fn shutdown_awaits_registered_tasks() {
        let database = Arc::new(SqliteService::connect_in_memory().await.unwrap());
        let shutdown = ShutdownService::new(database);

        let mut rx = shutdown.subscribe();
        shutdown
            .register(tokio::spawn(async move {
                let _ = rx.changed().await;
            }))
            .await;

        shutdown.shutdown().await;
        assert!(shutdown.is_triggered());
    }
}
