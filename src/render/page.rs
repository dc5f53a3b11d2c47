// src/render/page.rs
use std::fmt::Write;
use crate::render::row::RowContent;
use crate::storage::board::{BoardSnapshot, ControlState};
use crate::utils::escape_html;

const PAGE_HEAD: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<title>Servers</title>
<link rel="stylesheet" href="/css/style.css">
"#;

// Copy-to-clipboard and the manual refresh trigger. The page reloads itself
// after a refresh so the server-side table is shown.
const PAGE_SCRIPT: &str = r#"<script>
function copyToClipboard(element, ip) {
    navigator.clipboard.writeText(ip).catch(err => {
        console.error('Failed to copy IP: ', err);
    });
}
document.addEventListener('DOMContentLoaded', function() {
    const refreshButton = document.getElementById('refresh');
    refreshButton.addEventListener('click', function() {
        refreshButton.innerHTML = 'Refreshing...';
        fetch('/refresh', { method: 'POST' })
            .then(() => setTimeout(() => window.location.reload(), 1000))
            .catch(err => console.error('Manual refresh failed: ', err));
    });
});
</script>
"#;

pub fn render_page(snapshot: &BoardSnapshot, poll_interval_secs: u64) -> String {
    let mut html = String::with_capacity(4096);
    html.push_str(PAGE_HEAD);
    let _ = writeln!(html, r#"<meta http-equiv="refresh" content="{}">"#, poll_interval_secs);
    html.push_str("</head>\n<body>\n");
    html.push_str(&render_refresh_control(snapshot));
    html.push_str(&render_table(snapshot));
    html.push_str(PAGE_SCRIPT);
    html.push_str("</body>\n</html>\n");
    html
}

fn render_refresh_control(snapshot: &BoardSnapshot) -> String {
    let style = match snapshot.state {
        ControlState::Ready => "cursor: pointer; text-decoration: underline;",
        ControlState::Refreshing => "cursor: default; text-decoration: none;",
    };
    format!(
        "<span id=\"refresh\" style=\"{}\">{}</span>\n",
        style,
        escape_html(snapshot.refresh_label)
    )
}

pub fn render_table(snapshot: &BoardSnapshot) -> String {
    let mut html = String::new();
    html.push_str("<div id=\"server-table\">\n<table>\n<tbody>\n");
    html.push_str(
        "<tr id=\"header-row\"><th>Region</th><th>Status</th><th>Map</th><th>Players</th><th>Connect</th></tr>\n"
    );
    let display = if snapshot.placeholder_visible { "table-row" } else { "none" };
    let _ = writeln!(
        html,
        "<tr id=\"default-row\" style=\"display: {}\"><td colspan=\"5\">No servers online</td></tr>",
        display
    );
    for row in &snapshot.rows {
        let _ = writeln!(
            html,
            "<tr data-ip=\"{}\">{}</tr>",
            escape_html(row.key.as_str()),
            render_cells(&row.content)
        );
    }
    html.push_str("</tbody>\n</table>\n</div>\n");
    html
}

fn render_cells(row: &RowContent) -> String {
    let region = escape_html(&row.region);
    let address = escape_html(&row.copy_address);
    let status_class = if row.online { "online-status" } else { "offline-status" };
    let title = row
        .hostname
        .as_deref()
        .map(|h| format!(" title=\"{}\"", escape_html(h)))
        .unwrap_or_default();

    format!(
        concat!(
            "<td class=\"region {region}\"><img src=\"{icon}\" alt=\"{region} flag\" class=\"flag-icon\"><span>{region}</span></td>",
            "<td class=\"{status_class}\">{status}</td>",
            "<td{title}>{map}</td>",
            "<td>{players}</td>",
            "<td><a href=\"{connect}\">Connect</a>",
            "<span class=\"copy-icon\" title=\"Copy {address}\" data-address=\"{address}\" onclick=\"copyToClipboard(this, this.dataset.address)\">",
            "<img src=\"/img/copy.svg\" alt=\"Copy {address}\" style=\"width: 16px; height: 16px; vertical-align: middle;\">",
            "</span></td>"
        ),
        region = region,
        icon = escape_html(&row.region_icon),
        status_class = status_class,
        status = escape_html(&row.status_label),
        title = title,
        map = escape_html(&row.map),
        players = escape_html(&row.players),
        connect = escape_html(&row.connect_uri),
        address = address,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::server::ServerIdentifier;
    use crate::storage::table::TableRow;

    fn snapshot(rows: Vec<TableRow>) -> BoardSnapshot {
        BoardSnapshot {
            state: ControlState::Ready,
            refresh_label: "Manual refresh",
            placeholder_visible: rows.is_empty(),
            rows,
        }
    }

    fn row(ip: &str, map: &str) -> TableRow {
        TableRow {
            key: ServerIdentifier::parse(ip).unwrap(),
            content: RowContent {
                region: "us-west".to_string(),
                region_icon: "/img/us-west.svg".to_string(),
                online: true,
                status_label: "Online".to_string(),
                map: map.to_string(),
                players: "3/24".to_string(),
                connect_uri: format!("steam://connect/{}:27015", ip),
                copy_address: ip.to_string(),
                hostname: Some("upfast".to_string()),
            },
        }
    }

    #[test]
    fn empty_board_shows_placeholder() {
        let html = render_table(&snapshot(Vec::new()));
        assert!(html.contains("id=\"default-row\" style=\"display: table-row\""));
        assert!(!html.contains("data-ip"));
    }

    #[test]
    fn rows_are_keyed_and_escaped() {
        let html = render_table(&snapshot(vec![row("1.2.3.4", "<script>")]));
        assert!(html.contains("style=\"display: none\""));
        assert!(html.contains("<tr data-ip=\"1.2.3.4\">"));
        assert!(html.contains("&lt;script&gt;"));
        assert!(html.contains("steam://connect/1.2.3.4:27015"));
        assert!(html.contains("data-address=\"1.2.3.4\""));
    }

    #[test]
    fn page_wraps_table_and_control() {
        let html = render_page(&snapshot(vec![row("1.2.3.4", "ctf_2fort")]), 35);
        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.contains("<span id=\"refresh\""));
        assert!(html.contains("Manual refresh"));
        assert!(html.contains("content=\"35\""));
    }
}
