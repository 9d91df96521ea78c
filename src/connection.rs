use anyhow::Result;
use rusqlite::Connection;
use std::fs;
use std::path::Path;

pub fn conn(database_url: &str) -> Result<Connection> {
    if let Some(parent) = Path::new(database_url).parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }

    let conn = Connection::open(database_url)?;

    // Initialize the database tables
    crate::database::create_tables(&conn)?;

    tracing::info!(database = database_url, "database ready");
    Ok(conn)
}

pub fn memory_conn() -> Result<Connection> {
    let conn = Connection::open_in_memory()?;
    crate::database::create_tables(&conn)?;
    Ok(conn)
}
