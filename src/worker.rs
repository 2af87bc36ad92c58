//! Background worker that trains contexts and answers recommendation requests.
//!
//! Commands arrive over a channel as tagged envelopes (`{"action": "trainModel", ...}`)
//! and results flow back as [`WorkerEvent`]s. A training run publishes its
//! context only after every step succeeded, so a failed run leaves the previous
//! context in place.

use serde::{Deserialize, Serialize};
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Instant;

use crate::catalog::{CatalogProvider, User};
use crate::config::EngineConfig;
use crate::context_store::ContextStore;
use crate::error::{Error, Result};
use crate::recommend::{recommend, Recommendation};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "camelCase")]
pub enum Command {
    TrainModel { users: Vec<User> },
    Recommend { user: User },
    Shutdown,
}

const KNOWN_ACTIONS: [&str; 3] = ["trainModel", "recommend", "shutdown"];

impl Command {
    /// Parses a raw envelope. Unknown actions are not an error and yield `None`.
    pub fn from_message(message: &str) -> Result<Option<Command>> {
        let value: serde_json::Value = serde_json::from_str(message)?;
        let action = value.get("action").and_then(|a| a.as_str());
        match action {
            Some(action) if KNOWN_ACTIONS.contains(&action) => {
                Ok(Some(serde_json::from_value(value)?))
            }
            other => {
                log::warn!("Ignoring message with unknown action {other:?}");
                Ok(None)
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum WorkerEvent {
    ProgressUpdate {
        progress: u8,
    },
    /// No real optimisation happens, so these are fixed placeholders.
    TrainingLog {
        epoch: u32,
        loss: f32,
        accuracy: f32,
    },
    TrainingComplete {
        version: u64,
    },
    Recommend {
        user: User,
        recommendations: Vec<Recommendation>,
    },
    Error {
        message: String,
    },
}

pub struct Worker {
    catalog: Box<dyn CatalogProvider>,
    config: EngineConfig,
    store: Arc<ContextStore>,
    events: Sender<WorkerEvent>,
}

impl Worker {
    pub fn new(
        catalog: Box<dyn CatalogProvider>,
        config: EngineConfig,
        store: Arc<ContextStore>,
        events: Sender<WorkerEvent>,
    ) -> Self {
        Self {
            catalog,
            config,
            store,
            events,
        }
    }

    /// Runs a worker on its own thread.
    pub fn spawn(catalog: impl CatalogProvider + 'static, config: EngineConfig) -> WorkerHandle {
        let store = Arc::new(ContextStore::new());
        let (command_sender, command_receiver) = mpsc::channel::<Command>();
        let (event_sender, event_receiver) = mpsc::channel::<WorkerEvent>();

        let worker = Worker::new(Box::new(catalog), config, Arc::clone(&store), event_sender);
        let thread = thread::spawn(move || worker.run(command_receiver));
        log::info!("Recommendation worker started");

        WorkerHandle {
            commands: command_sender,
            events: event_receiver,
            store,
            thread: Some(thread),
        }
    }

    pub fn store(&self) -> &Arc<ContextStore> {
        &self.store
    }

    fn run(self, commands: Receiver<Command>) {
        for command in commands.iter() {
            if !self.handle(command) {
                break;
            }
        }
        log::info!("Recommendation worker stopped");
    }

    /// Dispatches one command. Returns `false` once the worker should stop.
    pub fn handle(&self, command: Command) -> bool {
        match command {
            Command::TrainModel { users } => {
                if let Err(e) = self.train_model(&users) {
                    log::error!("Training failed, keeping previous context: {e}");
                    self.emit(WorkerEvent::Error {
                        message: e.to_string(),
                    });
                }
            }
            Command::Recommend { user } => match self.recommend(&user) {
                Ok(recommendations) => self.emit(WorkerEvent::Recommend {
                    user,
                    recommendations,
                }),
                Err(e) => {
                    log::warn!("Recommendation failed: {e}");
                    self.emit(WorkerEvent::Error {
                        message: e.to_string(),
                    });
                }
            },
            Command::Shutdown => return false,
        }
        true
    }

    /// Handles a raw JSON envelope, ignoring unknown actions.
    pub fn handle_message(&self, message: &str) -> bool {
        match Command::from_message(message) {
            Ok(Some(command)) => self.handle(command),
            Ok(None) => true,
            Err(e) => {
                log::warn!("Malformed message: {e}");
                self.emit(WorkerEvent::Error {
                    message: e.to_string(),
                });
                true
            }
        }
    }

    fn train_model(&self, users: &[User]) -> Result<u64> {
        log::info!("Training model with {} users", users.len());
        let start_time = Instant::now();
        self.emit(WorkerEvent::ProgressUpdate { progress: 50 });

        let catalog = self.catalog.fetch_catalog()?;
        let context = crate::train(&catalog, users, &self.config, |progress| {
            log::trace!("Encoded {:.0}% of catalog", progress * 100.0);
        })?;

        self.emit(WorkerEvent::TrainingLog {
            epoch: 1,
            loss: 1.0,
            accuracy: 1.0,
        });

        let version = self.store.publish(context);
        log::info!(
            "Published context v{version} in {:.1?}",
            start_time.elapsed()
        );
        self.emit(WorkerEvent::ProgressUpdate { progress: 100 });
        self.emit(WorkerEvent::TrainingComplete { version });
        Ok(version)
    }

    fn recommend(&self, user: &User) -> Result<Vec<Recommendation>> {
        let current = self.store.current().ok_or(Error::NoContext)?;
        log::debug!(
            "Recommending for {} against context v{}",
            user.name.as_deref().unwrap_or("anonymous user"),
            current.version
        );
        recommend(user, &current.context, self.config.num_recommendations)
    }

    fn emit(&self, event: WorkerEvent) {
        if self.events.send(event).is_err() {
            log::debug!("Event receiver dropped");
        }
    }
}

/// Owner side of a spawned [`Worker`]. Dropping it stops the worker thread.
pub struct WorkerHandle {
    commands: Sender<Command>,
    events: Receiver<WorkerEvent>,
    store: Arc<ContextStore>,
    thread: Option<JoinHandle<()>>,
}

impl WorkerHandle {
    pub fn send(&self, command: Command) -> Result<()> {
        self.commands
            .send(command)
            .map_err(|_| Error::WorkerDisconnected)
    }

    /// Parses and forwards a raw JSON envelope.
    pub fn post_message(&self, message: &str) -> Result<()> {
        match Command::from_message(message)? {
            Some(command) => self.send(command),
            None => Ok(()),
        }
    }

    pub fn events(&self) -> &Receiver<WorkerEvent> {
        &self.events
    }

    pub fn store(&self) -> &Arc<ContextStore> {
        &self.store
    }

    pub fn shutdown(mut self) -> Result<()> {
        self.stop()
    }

    fn stop(&mut self) -> Result<()> {
        if let Some(thread) = self.thread.take() {
            // Already stopped if the send fails
            let _ = self.commands.send(Command::Shutdown);
            thread.join().map_err(|_| Error::WorkerDisconnected)?;
        }
        Ok(())
    }
}

impl Drop for WorkerHandle {
    fn drop(&mut self) {
        if let Err(e) = self.stop() {
            log::error!("Failed to stop worker: {e}");
        }
    }
}
