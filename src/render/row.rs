// src/render/row.rs
use serde::Serialize;
use crate::models::server::ServerStatus;
use crate::storage::table::ServerTable;

/// Rendered cells of one server row.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RowContent {
    pub region: String,
    pub region_icon: String,
    pub online: bool,
    pub status_label: String,
    pub map: String,
    pub players: String,
    pub connect_uri: String,
    pub copy_address: String,
    pub hostname: Option<String>,
}

pub fn render_row(status: &ServerStatus, connect_port: u16) -> RowContent {
    let region = &status.region;
    RowContent {
        region: region.to_string(),
        region_icon: region.icon_path(),
        online: status.online,
        status_label: (if status.online { "Online" } else { "Offline" }).to_string(),
        map: status.map.clone(),
        players: format!("{}/{}", status.players, status.max_players),
        connect_uri: format!("steam://connect/{}", status.connect_address(connect_port)),
        copy_address: status.address.clone(),
        hostname: status.hostname.clone(),
    }
}

/// Creates the row for `status.id` on first sighting, then overwrites its
/// content wholesale.
pub fn update_table_row(table: &mut ServerTable, status: &ServerStatus, connect_port: u16) {
    let content = render_row(status, connect_port);
    match table.find_row_mut(&status.id) {
        Some(row) => row.content = content,
        None => {
            table.append_row(status.id.clone(), content);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::region::Region;
    use crate::models::server::ServerIdentifier;

    fn status(ip: &str, map: &str, players: u32) -> ServerStatus {
        ServerStatus {
            id: ServerIdentifier::parse(ip).unwrap(),
            address: ip.to_string(),
            region: Region::parse("us-west").unwrap(),
            online: true,
            map: map.to_string(),
            players,
            max_players: 24,
            hostname: None,
        }
    }

    #[test]
    fn renders_all_cells() {
        let row = render_row(&status("54.193.198.90", "ctf_2fort", 7), 27015);
        assert_eq!(row.region, "us-west");
        assert_eq!(row.region_icon, "/img/us-west.svg");
        assert_eq!(row.status_label, "Online");
        assert_eq!(row.players, "7/24");
        assert_eq!(row.connect_uri, "steam://connect/54.193.198.90:27015");
        assert_eq!(row.copy_address, "54.193.198.90");
    }

    #[test]
    fn offline_servers_are_labelled() {
        let mut offline = status("1.1.1.1", "cp_well", 0);
        offline.online = false;
        assert_eq!(render_row(&offline, 27015).status_label, "Offline");
    }

    #[test]
    fn second_sighting_updates_in_place() {
        let mut table = ServerTable::new();
        update_table_row(&mut table, &status("1.1.1.1", "ctf_2fort", 1), 27015);
        update_table_row(&mut table, &status("2.2.2.2", "pl_upward", 2), 27015);
        update_table_row(&mut table, &status("1.1.1.1", "koth_viaduct", 9), 27015);

        assert_eq!(table.len(), 2);
        assert_eq!(table.rows()[0].key.as_str(), "1.1.1.1");
        assert_eq!(table.rows()[0].content.map, "koth_viaduct");
        assert_eq!(table.rows()[0].content.players, "9/24");
    }
}
