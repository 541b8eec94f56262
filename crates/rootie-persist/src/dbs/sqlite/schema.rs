use rusqlite::Connection;

pub(crate) const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS dialogue_graphs (
    id TEXT PRIMARY KEY,
    title TEXT NOT NULL,
    description TEXT,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS dialogue_nodes (
    id TEXT PRIMARY KEY,
    graph_id TEXT REFERENCES dialogue_graphs(id) ON DELETE CASCADE,
    parent_node_id TEXT,
    user_prompt TEXT NOT NULL,
    ai_response TEXT NOT NULL,
    created_at TEXT NOT NULL,
    position_x REAL,
    position_y REAL,
    model_name TEXT,
    endpoint_id TEXT
);

CREATE INDEX IF NOT EXISTS idx_dialogue_nodes_graph_id ON dialogue_nodes(graph_id);
"#;

/// Connection settings applied to every connection (foreign keys are per-connection in SQLite)
pub(crate) fn configure(conn: &Connection) -> rusqlite::Result<()> {
    conn.pragma_update(None, "foreign_keys", true)?;
    conn.busy_timeout(std::time::Duration::from_secs(5))?;
    Ok(())
}

pub(crate) fn migrate(conn: &Connection) -> rusqlite::Result<()> {
    conn.pragma_update_and_check(None, "journal_mode", "WAL", |_| Ok(()))?;
    conn.execute_batch(SCHEMA)
}
