// src/store.rs
use crate::error::PortfolioError;
use crate::models::{PortfolioState, PositionId, PositionInput, StockPosition};
use crate::reducer::{self, Action};
use log::{debug, error, info, warn};
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::{self, JoinHandle};

enum Command {
    Add {
        input: PositionInput,
        reply: oneshot::Sender<Result<PositionId, PortfolioError>>,
    },
    Apply {
        action: Action,
        reply: oneshot::Sender<Result<(), PortfolioError>>,
    },
}

/// Cloneable handle to a running store.
#[derive(Clone)]
pub struct PortfolioStore {
    commands: mpsc::Sender<Command>,
    snapshots: watch::Receiver<Arc<PortfolioState>>,
}

pub struct StoreTask {
    writer: JoinHandle<()>,
}

impl PortfolioStore {
    pub fn spawn(seed: Vec<StockPosition>, queue_depth: usize) -> (PortfolioStore, StoreTask) {
        let initial = PortfolioState::with_positions(seed);
        let next_id = next_free_id(&initial);
        let (snapshot_tx, snapshot_rx) = watch::channel(Arc::new(initial));
        let (tx, rx) = mpsc::channel(queue_depth.max(1));

        let writer = Writer {
            snapshots: snapshot_tx,
            next_id,
        };
        let writer = task::spawn(writer.run(rx));
        info!("Portfolio store started.");

        (
            PortfolioStore {
                commands: tx,
                snapshots: snapshot_rx,
            },
            StoreTask { writer },
        )
    }

    pub fn snapshot(&self) -> Arc<PortfolioState> {
        self.snapshots.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<Arc<PortfolioState>> {
        self.snapshots.clone()
    }

    pub async fn add_position(&self, input: PositionInput) -> Result<PositionId, PortfolioError> {
        let (reply, outcome) = oneshot::channel();
        self.send(Command::Add { input, reply }).await?;
        outcome.await.map_err(|_| PortfolioError::StoreClosed)?
    }

    pub async fn update_position(
        &self,
        id: PositionId,
        input: PositionInput,
    ) -> Result<(), PortfolioError> {
        self.dispatch(Action::Update { id, input }).await
    }

    /// Removes `id` if it exists. Unknown ids succeed without change.
    pub async fn delete_position(&self, id: PositionId) -> Result<(), PortfolioError> {
        self.dispatch(Action::Delete(id)).await
    }

    pub async fn replace_positions(
        &self,
        positions: Vec<StockPosition>,
    ) -> Result<(), PortfolioError> {
        self.dispatch(Action::Replace(positions)).await
    }

    async fn dispatch(&self, action: Action) -> Result<(), PortfolioError> {
        let (reply, outcome) = oneshot::channel();
        self.send(Command::Apply { action, reply }).await?;
        outcome.await.map_err(|_| PortfolioError::StoreClosed)?
    }

    async fn send(&self, command: Command) -> Result<(), PortfolioError> {
        self.commands
            .send(command)
            .await
            .map_err(|_| PortfolioError::StoreClosed)
    }
}

impl StoreTask {
    pub async fn shutdown(self) {
        match self.writer.await {
            Ok(()) => info!("Portfolio store stopped."),
            Err(e) => error!("Portfolio store writer failed: {}", e),
        }
    }
}

struct Writer {
    snapshots: watch::Sender<Arc<PortfolioState>>,
    // None once u64::MAX is taken.
    next_id: Option<u64>,
}

impl Writer {
    async fn run(mut self, mut rx: mpsc::Receiver<Command>) {
        while let Some(command) = rx.recv().await {
            let current = self.begin();
            // Let readers observe the pending snapshot before it settles.
            task::yield_now().await;

            // Callers may have stopped waiting; the snapshot already reflects the outcome.
            match command {
                Command::Add { input, reply } => {
                    let result = match self.next_id {
                        Some(raw) => {
                            let id = PositionId(raw);
                            self.commit(&current, Action::Add { id, input }).map(|()| id)
                        }
                        None => Err(self.reject(
                            &current,
                            "add",
                            PortfolioError::Validation("no position ids left".to_string()),
                        )),
                    };
                    let _ = reply.send(result);
                }
                Command::Apply { action, reply } => {
                    let _ = reply.send(self.commit(&current, action));
                }
            }
        }
    }

    fn begin(&self) -> Arc<PortfolioState> {
        let current = self.snapshots.borrow().clone();
        self.snapshots.send_replace(Arc::new(PortfolioState {
            loading: true,
            ..(*current).clone()
        }));
        current
    }

    fn commit(&mut self, current: &PortfolioState, action: Action) -> Result<(), PortfolioError> {
        let name = action.name();
        match reducer::apply(&current.positions, action) {
            Ok(positions) => {
                debug!("Applied {} ({} positions).", name, positions.len());
                let settled = PortfolioState::with_positions(positions);
                self.advance_ids(&settled);
                self.snapshots.send_replace(Arc::new(settled));
                Ok(())
            }
            Err(e) => Err(self.reject(current, name, e)),
        }
    }

    fn reject(&self, current: &PortfolioState, name: &str, e: PortfolioError) -> PortfolioError {
        warn!("Rejected {}: {}", name, e);
        self.snapshots
            .send_replace(Arc::new(reducer::settle(current, &Err(e.clone()))));
        e
    }

    fn advance_ids(&mut self, settled: &PortfolioState) {
        self.next_id = match (self.next_id, next_free_id(settled)) {
            (_, None) => None,
            (Some(next), Some(free)) => Some(next.max(free)),
            (None, Some(free)) => Some(free),
        };
    }
}

fn next_free_id(state: &PortfolioState) -> Option<u64> {
    match state.max_id() {
        Some(id) => id.0.checked_add(1),
        None => Some(1),
    }
}
