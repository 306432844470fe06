//! Session lifecycle shared by producers and tools
//!
//! A session goes Disconnected -> Connected on a successful registration and
//! back on disconnect, reconnect or rename. Transitions are serialized; the
//! background tasks of a session are stopped and joined before the service
//! is told the session is over.

use crate::error::ClientError;
use crate::models::ConnectionState;
use crate::observability::StructuredLogger;
use async_trait::async_trait;
use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::RwLock;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

/// Connect/disconnect/rename surface common to producers and tools
#[async_trait]
pub trait Connection: Send + Sync {
    /// Register with the central service, replacing any live session
    async fn connect(&self, reason: &str) -> Result<(), ClientError>;

    /// End the live session; succeeds immediately when disconnected
    async fn disconnect(&self, reason: &str) -> Result<(), ClientError>;

    /// Change the session name, disconnecting first when connected
    async fn rename(&self, new_name: &str) -> Result<(), ClientError>;

    fn name(&self) -> String;

    fn state(&self) -> ConnectionState;
}

/// Role-specific part of a session
#[async_trait]
pub trait Role: Send + Sync + 'static {
    /// Role name used in logs
    const ROLE: &'static str;

    /// Register `name`; returns the name the service assigned
    async fn register(&self, name: &str, reason: &str) -> Result<String, ClientError>;

    async fn unregister(&self, name: &str, reason: &str) -> Result<(), ClientError>;

    /// Spawn the background tasks of a fresh session
    fn start_tasks(&self, name: &str) -> Vec<BackgroundTask>;

    /// Called once the tasks of a session are stopped, before unregistering
    async fn on_stopped(&self) {}
}

/// Periodic activity bound to one session
///
/// Stopping is terminal: the token is cancelled and the task is joined, so a
/// cycle already in flight completes before `stop` returns.
#[derive(Debug)]
pub struct BackgroundTask {
    name: &'static str,
    cancel: CancellationToken,
    handle: JoinHandle<()>,
}

impl BackgroundTask {
    /// Spawn `body` with a fresh cancellation token
    pub fn spawn<F, Fut>(name: &'static str, body: F) -> Self
    where
        F: FnOnce(CancellationToken) -> Fut,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let cancel = CancellationToken::new();
        let handle = tokio::spawn(body(cancel.clone()));
        debug!(task = name, "Background task started");
        Self {
            name,
            cancel,
            handle,
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    #[cfg(test)]
    pub(crate) fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /// Cancel the task and wait for it to exit
    pub async fn stop(self) {
        self.cancel.cancel();
        match self.handle.await {
            Ok(()) => debug!(task = self.name, "Background task stopped"),
            Err(e) if e.is_panic() => warn!(task = self.name, "Background task panicked"),
            Err(_) => debug!(task = self.name, "Background task aborted"),
        }
    }
}

struct Session {
    tasks: Option<Vec<BackgroundTask>>,
}

/// State machine driving a `Role`
pub struct Lifecycle<R: Role> {
    role: R,
    session: Mutex<Session>,
    name: RwLock<String>,
    connected: AtomicBool,
    logger: StructuredLogger,
}

impl<R: Role> Lifecycle<R> {
    pub fn new(role: R, name: impl Into<String>) -> Self {
        Self {
            role,
            session: Mutex::new(Session { tasks: None }),
            name: RwLock::new(name.into()),
            connected: AtomicBool::new(false),
            logger: StructuredLogger::new(R::ROLE),
        }
    }

    pub fn role(&self) -> &R {
        &self.role
    }

    pub fn name(&self) -> String {
        self.name.read().unwrap_or_else(|e| e.into_inner()).clone()
    }

    fn set_name(&self, name: String) {
        *self.name.write().unwrap_or_else(|e| e.into_inner()) = name;
    }

    pub fn state(&self) -> ConnectionState {
        if self.connected.load(Ordering::Acquire) {
            ConnectionState::Connected
        } else {
            ConnectionState::Disconnected
        }
    }

    pub fn is_connected(&self) -> bool {
        self.state() == ConnectionState::Connected
    }

    pub async fn connect(&self, reason: &str) -> Result<(), ClientError> {
        let mut session = self.session.lock().await;

        if session.tasks.is_some() {
            if let Err(e) = self.close(&mut session, "reconnecting").await {
                warn!(role = R::ROLE, error = %e, "Previous session closed with error");
            }
        }

        let requested = self.name();
        match self.role.register(&requested, reason).await {
            Ok(assigned) => {
                if assigned != requested {
                    debug!(
                        role = R::ROLE,
                        requested = %requested,
                        assigned = %assigned,
                        "Central service assigned a different name"
                    );
                    self.set_name(assigned.clone());
                }
                session.tasks = Some(self.role.start_tasks(&assigned));
                self.connected.store(true, Ordering::Release);
                self.logger.log_connected(&assigned, reason);
                Ok(())
            }
            Err(e) => {
                self.logger.log_connect_failed(&requested, &e.to_string());
                Err(e)
            }
        }
    }

    pub async fn disconnect(&self, reason: &str) -> Result<(), ClientError> {
        let mut session = self.session.lock().await;
        if session.tasks.is_none() {
            return Ok(());
        }
        self.close(&mut session, reason).await
    }

    pub async fn rename(&self, new_name: &str) -> Result<(), ClientError> {
        let mut session = self.session.lock().await;
        let result = if session.tasks.is_some() {
            self.close(&mut session, "name change").await
        } else {
            Ok(())
        };

        let old_name = self.name();
        self.set_name(new_name.to_string());
        self.logger.log_renamed(&old_name, new_name);
        result
    }

    /// Stop the session tasks, then unregister; the session ends either way
    async fn close(&self, session: &mut Session, reason: &str) -> Result<(), ClientError> {
        if let Some(tasks) = session.tasks.take() {
            for task in tasks {
                task.stop().await;
            }
        }
        self.role.on_stopped().await;
        self.connected.store(false, Ordering::Release);

        let name = self.name();
        match self.role.unregister(&name, reason).await {
            Ok(()) => {
                self.logger.log_disconnected(&name, reason);
                Ok(())
            }
            Err(e) => {
                self.logger.log_unregister_failed(&name, &e.to_string());
                Err(e)
            }
        }
    }
}
