//! libSQL storage layer for collected legal-news items.
//!
//! The [`Storage`] struct wraps a local libSQL database holding:
//! - `law_changes`: one row per feed item, unique by URL
//! - `change_analyses`: the latest entity analysis per item
//!
//! Failing to open the database, or to read a batch of items out of it, is
//! [`LegalWatchError::StoreUnreachable`]; other query failures on an open
//! database are [`LegalWatchError::Storage`].

mod migrations;

use std::fmt::Display;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use legalwatch_shared::{ChangeAnalysis, LawChange, LegalWatchError, Result, SourceItem};
use libsql::{Connection, Database, Row, params};
use tracing::{debug, info};

/// Primary storage handle wrapping a libSQL database.
pub struct Storage {
    #[allow(dead_code)]
    db: Database,
    conn: Connection,
    path: PathBuf,
}

fn query_err(e: impl Display) -> LegalWatchError {
    LegalWatchError::Storage(e.to_string())
}

fn read_err(e: impl Display) -> LegalWatchError {
    LegalWatchError::StoreUnreachable(e.to_string())
}

impl Storage {
    /// Open or create a database at `path` and bring its schema up to date.
    pub async fn open(path: &Path) -> Result<Self> {
        let unreachable =
            |e: &dyn Display| LegalWatchError::StoreUnreachable(format!("{}: {e}", path.display()));

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| unreachable(&e))?;
        }

        let db = libsql::Builder::new_local(path)
            .build()
            .await
            .map_err(|e| unreachable(&e))?;

        let conn = db.connect().map_err(|e| unreachable(&e))?;

        let storage = Self {
            db,
            conn,
            path: path.to_path_buf(),
        };
        storage
            .run_migrations()
            .await
            .map_err(|e| unreachable(&e))?;
        Ok(storage)
    }

    /// Open a database that must already exist.
    ///
    /// Used by readers that should never conjure up an empty store.
    pub async fn open_existing(path: &Path) -> Result<Self> {
        if !path.is_file() {
            return Err(LegalWatchError::StoreUnreachable(format!(
                "{}: database file does not exist",
                path.display()
            )));
        }
        Self::open(path).await
    }

    /// Location of the database file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Run pending schema migrations.
    async fn run_migrations(&self) -> Result<()> {
        let current_version = self.get_schema_version().await;

        for migration in migrations::all_migrations() {
            if migration.version > current_version {
                info!(
                    version = migration.version,
                    description = migration.description,
                    "applying migration"
                );
                self.conn
                    .execute_batch(migration.sql)
                    .await
                    .map_err(|e| {
                        LegalWatchError::Storage(format!(
                            "migration v{} failed: {e}",
                            migration.version
                        ))
                    })?;
            }
        }
        Ok(())
    }

    /// Current schema version, or 0 before the first migration.
    async fn get_schema_version(&self) -> u32 {
        let result = self
            .conn
            .query("SELECT MAX(version) FROM schema_migrations", params![])
            .await;

        match result {
            Ok(mut rows) => match rows.next().await {
                Ok(Some(row)) => row.get::<u32>(0).unwrap_or(0),
                _ => 0,
            },
            // Table doesn't exist yet
            Err(_) => 0,
        }
    }

    // -----------------------------------------------------------------------
    // Items
    // -----------------------------------------------------------------------

    /// Insert a feed item unless one with the same URL is already stored.
    ///
    /// Returns `true` when a new row was written.
    pub async fn insert_item(&self, item: &SourceItem) -> Result<bool> {
        let published_at = item.published_at.map(|d| d.to_rfc3339());
        let fetched_at = Utc::now().to_rfc3339();

        let affected = self
            .conn
            .execute(
                "INSERT OR IGNORE INTO law_changes (title, url, date, description, published_at, fetched_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![
                    item.title.as_str(),
                    item.url.as_str(),
                    item.date.as_str(),
                    item.description.as_str(),
                    published_at,
                    fetched_at.as_str()
                ],
            )
            .await
            .map_err(query_err)?;

        if affected == 0 {
            debug!(url = %item.url, "item already stored");
        }
        Ok(affected > 0)
    }

    /// All items in insertion order, read in one batch.
    pub async fn list_items(&self) -> Result<Vec<SourceItem>> {
        let mut rows = self
            .conn
            .query(
                "SELECT title, url, date, description, published_at FROM law_changes ORDER BY id",
                params![],
            )
            .await
            .map_err(read_err)?;

        let mut items = Vec::new();
        while let Some(row) = rows.next().await.map_err(read_err)? {
            items.push(row_to_source_item(&row)?);
        }
        Ok(items)
    }

    /// Items newest first, with their row ids.
    ///
    /// Rows with a parsed publication time sort by it; older rows without one
    /// follow, ordered by the raw date text.
    pub async fn list_items_recent(&self) -> Result<Vec<LawChange>> {
        let mut rows = self
            .conn
            .query(
                "SELECT id, title, url, date, description FROM law_changes
                 ORDER BY published_at DESC, date DESC",
                params![],
            )
            .await
            .map_err(read_err)?;

        let mut changes = Vec::new();
        while let Some(row) = rows.next().await.map_err(read_err)? {
            changes.push(LawChange {
                id: row.get::<i64>(0).map_err(query_err)?,
                title: text_or_empty(&row, 1),
                url: text_or_empty(&row, 2),
                date: text_or_empty(&row, 3),
                description: text_or_empty(&row, 4),
            });
        }
        Ok(changes)
    }

    /// Number of stored items.
    pub async fn count_items(&self) -> Result<u64> {
        let mut rows = self
            .conn
            .query("SELECT COUNT(*) FROM law_changes", params![])
            .await
            .map_err(query_err)?;

        match rows.next().await.map_err(query_err)? {
            Some(row) => Ok(row.get::<i64>(0).map_err(query_err)?.max(0) as u64),
            None => Ok(0),
        }
    }

    // -----------------------------------------------------------------------
    // Analyses
    // -----------------------------------------------------------------------

    /// Store the analysis of the item at `url`, replacing any earlier one.
    pub async fn save_analysis(&self, url: &str, analysis: &ChangeAnalysis) -> Result<()> {
        let json = serde_json::to_string(analysis)
            .map_err(|e| LegalWatchError::Storage(format!("failed to encode analysis: {e}")))?;
        let now = Utc::now().to_rfc3339();

        self.conn
            .execute(
                "INSERT INTO change_analyses (url, analysis_json, analyzed_at)
                 VALUES (?1, ?2, ?3)
                 ON CONFLICT(url) DO UPDATE SET
                    analysis_json = excluded.analysis_json,
                    analyzed_at = excluded.analyzed_at",
                params![url, json.as_str(), now.as_str()],
            )
            .await
            .map_err(query_err)?;
        Ok(())
    }

    /// Latest stored analysis for `url`, if any.
    pub async fn get_analysis(&self, url: &str) -> Result<Option<ChangeAnalysis>> {
        let mut rows = self
            .conn
            .query(
                "SELECT analysis_json FROM change_analyses WHERE url = ?1",
                params![url],
            )
            .await
            .map_err(query_err)?;

        match rows.next().await.map_err(query_err)? {
            Some(row) => {
                let json = row.get::<String>(0).map_err(query_err)?;
                let analysis = serde_json::from_str(&json)
                    .map_err(|e| LegalWatchError::Storage(format!("corrupt analysis for {url}: {e}")))?;
                Ok(Some(analysis))
            }
            None => Ok(None),
        }
    }
}

// ---------------------------------------------------------------------------
// Row mapping
// ---------------------------------------------------------------------------

/// Rows written by older tools may hold NULLs in text columns.
fn text_or_empty(row: &Row, idx: i32) -> String {
    row.get::<String>(idx).unwrap_or_default()
}

fn row_to_source_item(row: &Row) -> Result<SourceItem> {
    let published_at = row
        .get::<String>(4)
        .ok()
        .and_then(|s| DateTime::parse_from_rfc3339(&s).ok())
        .map(|d| d.with_timezone(&Utc));

    Ok(SourceItem {
        title: text_or_empty(row, 0),
        url: row.get::<String>(1).map_err(query_err)?,
        date: text_or_empty(row, 2),
        description: text_or_empty(row, 3),
        published_at,
    })
}
