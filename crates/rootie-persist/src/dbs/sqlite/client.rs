use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension, Row};

use rootie_types::{DialogueGraph, DialogueNode, GraphEdge, GraphUpdate, NewGraph};

use super::schema;
use crate::error::{PersistError, Result};
use crate::models::{GraphInfo, GraphSnapshot, NodeScope, UpsertOutcome};
use crate::trait_client::PersistenceClient;
use crate::validate::{finalize_node, prepare_snapshot};

const NODE_COLUMNS: &str = "id, graph_id, parent_node_id, user_prompt, ai_response, created_at, \
                            position_x, position_y, model_name, endpoint_id";

const GRAPH_INFO_SELECT: &str = "SELECT g.id, g.title, g.description, g.created_at, g.updated_at, \
                                 COUNT(n.id) FROM dialogue_graphs g \
                                 LEFT JOIN dialogue_nodes n ON n.graph_id = g.id";

/// SQLite-backed store: tables `dialogue_graphs` and `dialogue_nodes`.
///
/// Each operation opens its own connection on the blocking pool, so a
/// request's transaction never outlives the call that started it.
pub struct SqliteClient {
    db_path: PathBuf,
}

impl SqliteClient {
    /// Opens (or creates) the database file and ensures the schema exists
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let db_path = path.as_ref().to_path_buf();
        if let Some(parent) = db_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .map_err(|e| PersistError::Connection(format!("{}: {}", parent.display(), e)))?;
        }

        let conn = connect(&db_path)?;
        schema::migrate(&conn)?;
        tracing::info!(path = %db_path.display(), "SQLite store ready");

        Ok(Self { db_path })
    }

    pub fn path(&self) -> &Path {
        &self.db_path
    }

    async fn run<T, F>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&mut Connection) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let db_path = self.db_path.clone();
        tokio::task::spawn_blocking(move || {
            let mut conn = connect(&db_path)?;
            f(&mut conn)
        })
        .await?
    }
}

fn connect(path: &Path) -> Result<Connection> {
    let conn = Connection::open(path)
        .map_err(|e| PersistError::Connection(format!("{}: {}", path.display(), e)))?;
    schema::configure(&conn)?;
    Ok(conn)
}

fn row_to_node(row: &Row<'_>) -> rusqlite::Result<DialogueNode> {
    Ok(DialogueNode {
        id: row.get(0)?,
        graph_id: row.get(1)?,
        parent_node_id: row.get(2)?,
        user_prompt: row.get(3)?,
        ai_response: row.get(4)?,
        created_at: Some(row.get(5)?),
        position_x: row.get(6)?,
        position_y: row.get(7)?,
        model_name: row.get(8)?,
        endpoint_id: row.get(9)?,
    })
}

fn row_to_graph_info(row: &Row<'_>) -> rusqlite::Result<GraphInfo> {
    let node_count: i64 = row.get(5)?;
    Ok(GraphInfo {
        graph: DialogueGraph {
            id: row.get(0)?,
            title: row.get(1)?,
            description: row.get(2)?,
            created_at: row.get(3)?,
            updated_at: row.get(4)?,
        },
        node_count: usize::try_from(node_count).unwrap_or_default(),
    })
}

fn fetch_graph_info(conn: &Connection, graph_id: &str) -> Result<Option<GraphInfo>> {
    let sql = format!("{} WHERE g.id = ?1 GROUP BY g.id", GRAPH_INFO_SELECT);
    Ok(conn
        .query_row(&sql, params![graph_id], row_to_graph_info)
        .optional()?)
}

fn require_graph(conn: &Connection, graph_id: &str) -> Result<GraphInfo> {
    fetch_graph_info(conn, graph_id)?.ok_or_else(|| PersistError::GraphNotFound(graph_id.to_string()))
}

fn touch_graph(conn: &Connection, graph_id: &str) -> Result<()> {
    conn.execute(
        "UPDATE dialogue_graphs SET updated_at = ?2 WHERE id = ?1",
        params![graph_id, Utc::now()],
    )?;
    Ok(())
}

fn query_nodes(conn: &Connection, scope: &NodeScope) -> Result<Vec<DialogueNode>> {
    let (sql, arg) = match scope {
        NodeScope::All => (
            format!("SELECT {} FROM dialogue_nodes ORDER BY rowid", NODE_COLUMNS),
            None,
        ),
        NodeScope::Unfiled => (
            format!("SELECT {} FROM dialogue_nodes WHERE graph_id IS NULL ORDER BY rowid", NODE_COLUMNS),
            None,
        ),
        NodeScope::Graph(graph_id) => (
            format!("SELECT {} FROM dialogue_nodes WHERE graph_id = ?1 ORDER BY rowid", NODE_COLUMNS),
            Some(graph_id.as_str()),
        ),
    };

    let mut stmt = conn.prepare(&sql)?;
    let rows = match arg {
        Some(graph_id) => stmt.query_map(params![graph_id], row_to_node)?,
        None => stmt.query_map([], row_to_node)?,
    };
    Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
}

fn insert_node(conn: &Connection, node: &DialogueNode) -> Result<()> {
    conn.execute(
        &format!(
            "INSERT OR REPLACE INTO dialogue_nodes ({}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
            NODE_COLUMNS
        ),
        params![
            node.id,
            node.graph_id,
            node.parent_node_id,
            node.user_prompt,
            node.ai_response,
            node.created_at.unwrap_or_else(Utc::now),
            node.position_x,
            node.position_y,
            node.model_name,
            node.endpoint_id,
        ],
    )?;
    Ok(())
}

/// `Some(graph_id)` of the stored row with this id, `None` when no row exists
fn stored_graph_of(conn: &Connection, node_id: &str) -> Result<Option<Option<String>>> {
    Ok(conn
        .query_row(
            "SELECT graph_id FROM dialogue_nodes WHERE id = ?1",
            params![node_id],
            |row| row.get::<_, Option<String>>(0),
        )
        .optional()?)
}

#[async_trait]
impl PersistenceClient for SqliteClient {
    async fn create_graph(&self, new_graph: NewGraph) -> Result<DialogueGraph> {
        let graph = DialogueGraph::new(new_graph.title, new_graph.description);
        let row = graph.clone();
        self.run(move |conn| {
            conn.execute(
                "INSERT INTO dialogue_graphs (id, title, description, created_at, updated_at) \
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![row.id, row.title, row.description, row.created_at, row.updated_at],
            )?;
            Ok(())
        })
        .await?;

        tracing::info!(graph_id = %graph.id, "Created graph");
        Ok(graph)
    }

    async fn list_graphs(&self) -> Result<Vec<GraphInfo>> {
        self.run(|conn| {
            let sql = format!("{} GROUP BY g.id ORDER BY g.updated_at DESC", GRAPH_INFO_SELECT);
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt.query_map([], row_to_graph_info)?;
            Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
        })
        .await
    }

    async fn get_graph(&self, graph_id: &str) -> Result<Option<GraphInfo>> {
        let graph_id = graph_id.to_string();
        self.run(move |conn| fetch_graph_info(conn, &graph_id)).await
    }

    async fn update_graph(&self, graph_id: &str, update: GraphUpdate) -> Result<GraphInfo> {
        let graph_id = graph_id.to_string();
        self.run(move |conn| {
            let tx = conn.transaction()?;
            let mut info = require_graph(&tx, &graph_id)?;
            if info.graph.apply(&update) {
                tx.execute(
                    "UPDATE dialogue_graphs SET title = ?2, description = ?3, updated_at = ?4 WHERE id = ?1",
                    params![
                        info.graph.id,
                        info.graph.title,
                        info.graph.description,
                        info.graph.updated_at
                    ],
                )?;
            }
            tx.commit()?;
            Ok(info)
        })
        .await
    }

    async fn delete_graph(&self, graph_id: &str) -> Result<usize> {
        let graph_id = graph_id.to_string();
        let removed = self
            .run(move |conn| {
                let tx = conn.transaction()?;
                let info = require_graph(&tx, &graph_id)?;
                tx.execute("DELETE FROM dialogue_graphs WHERE id = ?1", params![graph_id])?;
                tx.commit()?;
                Ok(info.node_count)
            })
            .await?;

        tracing::info!(nodes = removed, "Deleted graph");
        Ok(removed)
    }

    async fn save_graph(
        &self,
        graph_id: &str,
        nodes: Vec<DialogueNode>,
        edges: Vec<GraphEdge>,
    ) -> Result<usize> {
        let nodes = prepare_snapshot(graph_id, nodes, &edges)?;
        let graph_id = graph_id.to_string();

        self.run(move |conn| {
            let tx = conn.transaction()?;
            require_graph(&tx, &graph_id)?;

            tx.execute("DELETE FROM dialogue_nodes WHERE graph_id = ?1", params![graph_id])?;
            for node in &nodes {
                if let Some(Some(other)) = stored_graph_of(&tx, &node.id)? {
                    return Err(PersistError::Validation(format!(
                        "node {} already belongs to graph {}",
                        node.id, other
                    )));
                }
                insert_node(&tx, node)?;
            }
            touch_graph(&tx, &graph_id)?;
            tx.commit()?;

            tracing::info!(graph_id = %graph_id, nodes = nodes.len(), "Saved graph");
            Ok(nodes.len())
        })
        .await
    }

    async fn load_graph(&self, graph_id: &str) -> Result<GraphSnapshot> {
        let graph_id = graph_id.to_string();
        self.run(move |conn| {
            let info = require_graph(conn, &graph_id)?;
            let nodes = query_nodes(conn, &NodeScope::Graph(graph_id))?;
            Ok(GraphSnapshot::new(info.graph, nodes))
        })
        .await
    }

    async fn upsert_node(&self, node: DialogueNode) -> Result<UpsertOutcome> {
        let node = finalize_node(node)?;

        self.run(move |conn| {
            let tx = conn.transaction()?;
            if let Some(graph_id) = node.graph_id.as_deref() {
                require_graph(&tx, graph_id)?;
            }

            let outcome = match stored_graph_of(&tx, &node.id)? {
                None => UpsertOutcome::Inserted,
                Some(Some(existing)) if node.graph_id.as_deref().is_some_and(|g| g != existing) => {
                    return Err(PersistError::Validation(format!(
                        "node {} already belongs to graph {}",
                        node.id, existing
                    )));
                }
                Some(_) => UpsertOutcome::Updated,
            };

            tx.execute(
                &format!(
                    "INSERT INTO dialogue_nodes ({}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10) \
                     ON CONFLICT(id) DO UPDATE SET \
                         parent_node_id = excluded.parent_node_id, \
                         user_prompt = excluded.user_prompt, \
                         ai_response = excluded.ai_response, \
                         created_at = excluded.created_at, \
                         model_name = excluded.model_name, \
                         endpoint_id = excluded.endpoint_id, \
                         graph_id = COALESCE(excluded.graph_id, dialogue_nodes.graph_id), \
                         position_x = COALESCE(excluded.position_x, dialogue_nodes.position_x), \
                         position_y = COALESCE(excluded.position_y, dialogue_nodes.position_y)",
                    NODE_COLUMNS
                ),
                params![
                    node.id,
                    node.graph_id,
                    node.parent_node_id,
                    node.user_prompt,
                    node.ai_response,
                    node.created_at.unwrap_or_else(Utc::now),
                    node.position_x,
                    node.position_y,
                    node.model_name,
                    node.endpoint_id,
                ],
            )?;

            if let Some(graph_id) = node.graph_id.as_deref() {
                touch_graph(&tx, graph_id)?;
            }
            tx.commit()?;

            tracing::debug!(node_id = %node.id, outcome = ?outcome, "Upserted node");
            Ok(outcome)
        })
        .await
    }

    async fn list_nodes(&self, scope: NodeScope) -> Result<Vec<DialogueNode>> {
        self.run(move |conn| query_nodes(conn, &scope)).await
    }

    async fn ping(&self) -> Result<()> {
        self.run(|conn| {
            conn.query_row("SELECT 1", [], |_| Ok(()))?;
            Ok(())
        })
        .await
    }
}
