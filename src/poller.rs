// src/poller.rs
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use dashmap::DashMap;
use log::{debug, error, info, warn};
use tokio::sync::mpsc;
use tokio::task::{AbortHandle, JoinHandle};
use tokio::time::MissedTickBehavior;
use uuid::Uuid;
use crate::client::ServerSource;
use crate::config::Config;
use crate::models::server::ServerIdentifier;
use crate::storage::board::Board;

/// Sends manual refresh requests to a running [`PollLoop`].
#[derive(Debug, Clone)]
pub struct PollHandle {
    tx: mpsc::Sender<()>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoopStopped;

impl PollHandle {
    /// Queues a manual cycle. Requests arriving while one is already queued
    /// are folded into it.
    pub fn refresh(&self) -> Result<(), LoopStopped> {
        match self.tx.try_send(()) {
            Ok(()) => Ok(()),
            Err(mpsc::error::TrySendError::Full(())) => {
                debug!("Manual refresh already queued");
                Ok(())
            }
            Err(mpsc::error::TrySendError::Closed(())) => Err(LoopStopped),
        }
    }
}

/// Result of one cycle's dispatch phase. The per-server fetches keep running
/// after it is returned.
#[derive(Debug)]
pub struct Dispatch {
    pub cycle_id: Uuid,
    pub listed: usize,
    tasks: Vec<JoinHandle<()>>,
}

impl Dispatch {
    /// Waits for every fetch spawned by this cycle. Returns how many ran to
    /// completion rather than being aborted.
    pub async fn settled(self) -> usize {
        let mut completed = 0;
        for task in self.tasks {
            match task.await {
                Ok(()) => completed += 1,
                Err(e) if e.is_cancelled() => {}
                Err(e) => error!("[{}] fetch task failed: {}", self.cycle_id, e),
            }
        }
        completed
    }
}

// Keeps the refresh control balanced even if a cycle future is dropped mid-way.
struct RefreshGuard<'a>(&'a Board);

impl<'a> RefreshGuard<'a> {
    fn begin(board: &'a Board) -> Self {
        board.begin_refresh();
        Self(board)
    }
}

impl Drop for RefreshGuard<'_> {
    fn drop(&mut self) {
        self.0.finish_refresh();
    }
}

pub struct PollLoop<S: ServerSource> {
    board: Arc<Board>,
    source: Arc<S>,
    poll_interval: Duration,
    directory_timeout: Duration,
    supersede_stale_fetches: bool,
    in_flight: DashMap<ServerIdentifier, AbortHandle>,
}

impl<S: ServerSource> PollLoop<S> {
    pub fn new(board: Arc<Board>, source: S, config: &Config) -> Self {
        Self {
            board,
            source: Arc::new(source),
            poll_interval: config.poll_interval,
            directory_timeout: config.directory_timeout,
            supersede_stale_fetches: config.supersede_stale_fetches,
            in_flight: DashMap::new(),
        }
    }

    pub fn board(&self) -> &Arc<Board> {
        &self.board
    }

    /// Runs the loop on the current runtime: one cycle straight away, then one
    /// per interval tick or manual refresh.
    pub fn spawn(self) -> (PollHandle, JoinHandle<()>) {
        let (tx, rx) = mpsc::channel(1);
        let task = tokio::spawn(self.run(rx));
        (PollHandle { tx }, task)
    }

    async fn run(self, mut manual: mpsc::Receiver<()>) {
        let mut ticker = tokio::time::interval(self.poll_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        info!("Polling servers every {:?}", self.poll_interval);

        loop {
            tokio::select! {
                _ = ticker.tick() => debug!("Timed refresh"),
                Some(()) = manual.recv() => {
                    info!("Manual refresh requested");
                    ticker.reset();
                }
            }
            self.run_cycle().await;
        }
    }

    /// One cycle: list servers (bounded by the directory timeout), reconcile
    /// the table, and spawn a fetch per listed server. Returns once dispatch
    /// is done, without waiting on the fetches.
    pub async fn run_cycle(&self) -> Dispatch {
        let cycle_id = Uuid::new_v4();
        let _refreshing = RefreshGuard::begin(&self.board);
        info!("[{}] polling servers...", cycle_id);

        let ids = match tokio::time::timeout(self.directory_timeout, self.source.list_servers()).await {
            Ok(ids) => ids,
            Err(_) => {
                warn!(
                    "[{}] server list did not arrive within {:?}, treating as empty",
                    cycle_id, self.directory_timeout
                );
                Vec::new()
            }
        };

        if ids.is_empty() {
            let removed = self.board.show_empty();
            self.abort_unlisted(&[]);
            info!("[{}] no servers listed, removed {} rows", cycle_id, removed);
            return Dispatch { cycle_id, listed: 0, tasks: Vec::new() };
        }

        let pruned = self.board.prepare_rows(&ids);
        self.abort_unlisted(&ids);
        if pruned > 0 {
            debug!("[{}] pruned {} rows of unlisted servers", cycle_id, pruned);
        }

        let tasks: Vec<JoinHandle<()>> = ids
            .iter()
            .map(|id| self.spawn_fetch(cycle_id, id.clone()))
            .collect();
        info!("[{}] dispatched {} status fetches", cycle_id, tasks.len());

        Dispatch { cycle_id, listed: ids.len(), tasks }
    }

    fn spawn_fetch(&self, cycle_id: Uuid, id: ServerIdentifier) -> JoinHandle<()> {
        let source = Arc::clone(&self.source);
        let board = Arc::clone(&self.board);
        let key = id.clone();

        let task = tokio::spawn(async move {
            match source.fetch_status(&id).await {
                Some(status) => {
                    if !board.render_status(&status) {
                        debug!("[{}] {} is no longer listed, dropping its status", cycle_id, id);
                    }
                }
                None => debug!("[{}] no status for {}", cycle_id, id),
            }
        });

        if let Some(previous) = self.in_flight.insert(key, task.abort_handle()) {
            if self.supersede_stale_fetches && !previous.is_finished() {
                debug!("[{}] superseding in-flight fetch", cycle_id);
                previous.abort();
            }
        }
        task
    }

    fn abort_unlisted(&self, ids: &[ServerIdentifier]) {
        let listed: HashSet<&ServerIdentifier> = ids.iter().collect();
        self.in_flight.retain(|id, handle| {
            if listed.contains(id) {
                return true;
            }
            handle.abort();
            false
        });
    }
}
