use anyhow::Result;
use rusqlite::Connection;
use serde::Serialize;
use std::fs::File;
use std::io::Write;

use crate::db;

#[derive(Serialize)]
struct ExportItem {
    id: String,
    theme: String,
    title: String,
    category: String,
    destination: String,
    status: String,
    generated_at: String,
}

// Entry point
pub fn export_json(conn: &Connection, path: &str) -> Result<usize> {
    let items = db::fetch_all(conn)?;

    let exported: Vec<ExportItem> = items
        .into_iter()
        .map(|item| ExportItem {
            id: item.id,
            theme: item.theme,
            title: item.title,
            category: item.category,
            destination: item.destination,
            status: item.status,
            generated_at: item.generated_at,
        })
        .collect();

    let json = serde_json::to_string_pretty(&exported)?;

    let mut file = File::create(path)?;
    file.write_all(json.as_bytes())?;

    Ok(exported.len())
}
