use anyhow::Result;
use rusqlite::{Connection, params};
use std::fs;
use std::path::Path;

// One generated post, as recorded after it was saved or published
#[derive(Debug, Clone, PartialEq)]
pub struct PostRecord {
    pub id: String,
    pub theme: String,
    pub title: String,
    pub category: String,
    pub destination: String,
    pub status: String,
    pub generated_at: String,
}

// Open (or create) the ledger file and make sure the table exists
pub fn open(path: &str) -> Result<Connection> {
    if let Some(parent) = Path::new(path).parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }

    let conn = Connection::open(path)?;
    init(&conn)?;
    Ok(conn)
}

// Initialize database and table
pub fn init(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "
        PRAGMA journal_mode = WAL;
        PRAGMA synchronous = NORMAL;

        -- Generated posts (saved / published / failed)
        CREATE TABLE IF NOT EXISTS posts (
            id TEXT PRIMARY KEY,
            theme TEXT NOT NULL,
            title TEXT NOT NULL,
            category TEXT NOT NULL,
            destination TEXT NOT NULL,
            status TEXT NOT NULL,
            generated_at TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_generated_at
            ON posts (generated_at);
        ",
    )?;

    Ok(())
}

// Returns true if inserted, false if the id was already recorded
pub fn insert(conn: &Connection, post: &PostRecord) -> Result<bool> {
    let affected = conn.execute(
        "
        INSERT OR IGNORE INTO posts
        (id, theme, title, category, destination, status, generated_at)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
        ",
        params![
            post.id,
            post.theme,
            post.title,
            post.category,
            post.destination,
            post.status,
            post.generated_at
        ],
    )?;

    Ok(affected > 0)
}

// Fetch all posts for JSON export, newest first
pub fn fetch_all(conn: &Connection) -> Result<Vec<PostRecord>> {
    let mut stmt = conn.prepare(
        "
        SELECT id, theme, title, category, destination, status, generated_at
        FROM posts
        ORDER BY generated_at DESC
        ",
    )?;

    let rows = stmt.query_map([], |row| {
        Ok(PostRecord {
            id: row.get(0)?,
            theme: row.get(1)?,
            title: row.get(2)?,
            category: row.get(3)?,
            destination: row.get(4)?,
            status: row.get(5)?,
            generated_at: row.get(6)?,
        })
    })?;

    let mut results = Vec::new();
    for item in rows {
        results.push(item?);
    }

    Ok(results)
}
