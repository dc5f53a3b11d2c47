// src/storage/table.rs
use std::collections::HashSet;
use serde::Serialize;
use crate::models::server::ServerIdentifier;
use crate::render::row::RowContent;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TableRow {
    pub key: ServerIdentifier,
    pub content: RowContent,
}

/// In-memory server table: header and placeholder are implicit, server rows
/// are kept in insertion order and keyed by identifier.
#[derive(Debug, Clone)]
pub struct ServerTable {
    rows: Vec<TableRow>,
    placeholder_visible: bool,
}

impl Default for ServerTable {
    fn default() -> Self {
        Self::new()
    }
}

impl ServerTable {
    pub fn new() -> Self {
        Self {
            rows: Vec::new(),
            placeholder_visible: true,
        }
    }

    pub fn find_row_mut(&mut self, key: &ServerIdentifier) -> Option<&mut TableRow> {
        self.rows.iter_mut().find(|row| &row.key == key)
    }

    /// Appends a row for `key`. Callers look the key up first, so the table
    /// never holds two rows for one server.
    pub fn append_row(&mut self, key: ServerIdentifier, content: RowContent) -> &mut TableRow {
        debug_assert!(self.rows.iter().all(|row| row.key != key));
        self.rows.push(TableRow { key, content });
        let last = self.rows.len() - 1;
        &mut self.rows[last]
    }

    /// Drops every row whose key is not in `keep`, returning how many went.
    pub fn retain_keys(&mut self, keep: &HashSet<&ServerIdentifier>) -> usize {
        let before = self.rows.len();
        self.rows.retain(|row| keep.contains(&row.key));
        before - self.rows.len()
    }

    pub fn clear_rows(&mut self) -> usize {
        let removed = self.rows.len();
        self.rows.clear();
        removed
    }

    pub fn show_placeholder(&mut self) {
        self.placeholder_visible = true;
    }

    pub fn hide_placeholder(&mut self) {
        self.placeholder_visible = false;
    }

    pub fn placeholder_visible(&self) -> bool {
        self.placeholder_visible
    }

    pub fn rows(&self) -> &[TableRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(raw: &str) -> ServerIdentifier {
        ServerIdentifier::parse(raw).unwrap()
    }

    fn content(map: &str) -> RowContent {
        RowContent {
            region: "eu-central".to_string(),
            region_icon: "/img/eu-central.svg".to_string(),
            online: true,
            status_label: "Online".to_string(),
            map: map.to_string(),
            players: "0/24".to_string(),
            connect_uri: "steam://connect/1.1.1.1:27015".to_string(),
            copy_address: "1.1.1.1".to_string(),
            hostname: None,
        }
    }

    #[test]
    fn starts_empty_with_placeholder() {
        let table = ServerTable::new();
        assert!(table.is_empty());
        assert!(table.placeholder_visible());
    }

    #[test]
    fn retain_keys_prunes_unlisted_rows() {
        let mut table = ServerTable::new();
        table.append_row(id("1.1.1.1"), content("a"));
        table.append_row(id("2.2.2.2"), content("b"));
        table.append_row(id("3.3.3.3"), content("c"));

        let keep_a = id("1.1.1.1");
        let keep_c = id("3.3.3.3");
        let keep: HashSet<&ServerIdentifier> = [&keep_a, &keep_c].into_iter().collect();
        assert_eq!(table.retain_keys(&keep), 1);

        let keys: Vec<&str> = table.rows().iter().map(|r| r.key.as_str()).collect();
        assert_eq!(keys, vec!["1.1.1.1", "3.3.3.3"]);
    }

    #[test]
    fn find_row_mut_locates_by_key() {
        let mut table = ServerTable::new();
        table.append_row(id("1.1.1.1"), content("a"));
        table.find_row_mut(&id("1.1.1.1")).unwrap().content.map = "b".to_string();
        assert_eq!(table.rows()[0].content.map, "b");
        assert!(table.find_row_mut(&id("9.9.9.9")).is_none());
        assert_eq!(table.clear_rows(), 1);
    }
}
