// src/storage/board.rs
use std::collections::HashSet;
use parking_lot::Mutex;
use serde::Serialize;
use crate::models::server::{ServerIdentifier, ServerStatus};
use crate::render::row::update_table_row;
use crate::storage::table::{ServerTable, TableRow};

pub const READY_LABEL: &str = "Manual refresh";
pub const REFRESHING_LABEL: &str = "Refreshing...";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ControlState {
    Ready,
    Refreshing,
}

/// The manual-refresh control. Counts overlapping cycles so that it only
/// returns to ready once the last one has dispatched.
#[derive(Debug, Default)]
pub struct RefreshControl {
    active_cycles: usize,
}

impl RefreshControl {
    pub fn state(&self) -> ControlState {
        if self.active_cycles == 0 {
            ControlState::Ready
        } else {
            ControlState::Refreshing
        }
    }

    pub fn label(&self) -> &'static str {
        match self.state() {
            ControlState::Ready => READY_LABEL,
            ControlState::Refreshing => REFRESHING_LABEL,
        }
    }

    fn begin(&mut self) {
        self.active_cycles += 1;
    }

    fn finish(&mut self) {
        self.active_cycles = self.active_cycles.saturating_sub(1);
    }
}

#[derive(Debug, Default)]
struct BoardInner {
    table: ServerTable,
    control: RefreshControl,
    // Servers named by the latest directory answer.
    listed: HashSet<ServerIdentifier>,
}

/// Point-in-time copy of the board, used by the page renderer and the JSON route.
#[derive(Debug, Clone, Serialize)]
pub struct BoardSnapshot {
    pub state: ControlState,
    pub refresh_label: &'static str,
    pub placeholder_visible: bool,
    pub rows: Vec<TableRow>,
}

/// The server table plus its refresh control. Created once at start-up and
/// shared between the poll loop and the HTTP handlers.
#[derive(Debug)]
pub struct Board {
    inner: Mutex<BoardInner>,
    connect_port: u16,
}

impl Board {
    pub fn new(connect_port: u16) -> Self {
        Self {
            inner: Mutex::new(BoardInner::default()),
            connect_port,
        }
    }

    pub fn begin_refresh(&self) {
        self.inner.lock().control.begin();
    }

    pub fn finish_refresh(&self) {
        self.inner.lock().control.finish();
    }

    pub fn control_state(&self) -> ControlState {
        self.inner.lock().control.state()
    }

    /// Empty directory: placeholder on, every server row gone.
    pub fn show_empty(&self) -> usize {
        let mut inner = self.inner.lock();
        inner.listed.clear();
        inner.table.show_placeholder();
        inner.table.clear_rows()
    }

    /// Non-empty directory: placeholder off, rows of unlisted servers pruned.
    pub fn prepare_rows(&self, ids: &[ServerIdentifier]) -> usize {
        let keep: HashSet<&ServerIdentifier> = ids.iter().collect();
        let mut inner = self.inner.lock();
        inner.listed = ids.iter().cloned().collect();
        inner.table.hide_placeholder();
        inner.table.retain_keys(&keep)
    }

    /// Renders `status` into its row. Statuses of servers the directory no
    /// longer lists are dropped and `false` is returned.
    pub fn render_status(&self, status: &ServerStatus) -> bool {
        let mut inner = self.inner.lock();
        if !inner.listed.contains(&status.id) {
            return false;
        }
        update_table_row(&mut inner.table, status, self.connect_port);
        true
    }

    pub fn row_count(&self) -> usize {
        self.inner.lock().table.len()
    }

    pub fn snapshot(&self) -> BoardSnapshot {
        let inner = self.inner.lock();
        BoardSnapshot {
            state: inner.control.state(),
            refresh_label: inner.control.label(),
            placeholder_visible: inner.table.placeholder_visible(),
            rows: inner.table.rows().to_vec(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::region::Region;

    fn status(ip: &str) -> ServerStatus {
        ServerStatus {
            id: ServerIdentifier::parse(ip).unwrap(),
            address: ip.to_string(),
            region: Region::parse("eu-central").unwrap(),
            online: true,
            map: "ctf_2fort".to_string(),
            players: 0,
            max_players: 24,
            hostname: None,
        }
    }

    #[test]
    fn control_tracks_overlapping_cycles() {
        let board = Board::new(27015);
        assert_eq!(board.control_state(), ControlState::Ready);

        board.begin_refresh();
        board.begin_refresh();
        assert_eq!(board.snapshot().refresh_label, REFRESHING_LABEL);

        board.finish_refresh();
        assert_eq!(board.control_state(), ControlState::Refreshing);
        board.finish_refresh();
        assert_eq!(board.control_state(), ControlState::Ready);

        // An unmatched finish never underflows.
        board.finish_refresh();
        assert_eq!(board.snapshot().refresh_label, READY_LABEL);
    }

    #[test]
    fn empty_directory_clears_rows_and_shows_placeholder() {
        let board = Board::new(27015);
        board.prepare_rows(&[status("1.1.1.1").id, status("2.2.2.2").id]);
        assert!(board.render_status(&status("1.1.1.1")));
        assert!(board.render_status(&status("2.2.2.2")));
        assert!(!board.snapshot().placeholder_visible);

        assert_eq!(board.show_empty(), 2);
        let snapshot = board.snapshot();
        assert!(snapshot.placeholder_visible);
        assert!(snapshot.rows.is_empty());
    }

    #[test]
    fn unlisted_status_is_not_rendered() {
        let board = Board::new(27015);
        assert!(!board.render_status(&status("1.1.1.1")));

        board.prepare_rows(&[status("2.2.2.2").id]);
        assert!(!board.render_status(&status("1.1.1.1")));
        assert!(board.render_status(&status("2.2.2.2")));
        assert_eq!(board.row_count(), 1);
    }

    #[test]
    fn snapshot_serializes_state_in_lowercase() {
        let board = Board::new(27015);
        let json = serde_json::to_value(board.snapshot()).unwrap();
        assert_eq!(json["state"], "ready");
        assert_eq!(json["placeholder_visible"], true);
    }
}
