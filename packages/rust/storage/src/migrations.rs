//! SQL migration definitions for the LegalWatch database.
//!
//! Migrations are applied in order on database open. Version 1 matches the
//! table layout older deployments created by hand, so an existing `laws.db`
//! is upgraded in place.

/// A database migration with a version and SQL statements.
pub(crate) struct Migration {
    pub version: u32,
    pub description: &'static str,
    pub sql: &'static str,
}

/// All migrations, in ascending version order.
pub(crate) fn all_migrations() -> Vec<Migration> {
    vec![
        Migration {
            version: 1,
            description: "Initial schema: law_changes",
            sql: r#"
CREATE TABLE IF NOT EXISTS schema_migrations (
    version    INTEGER PRIMARY KEY,
    applied_at TEXT NOT NULL DEFAULT (datetime('now'))
);

CREATE TABLE IF NOT EXISTS law_changes (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    title       TEXT,
    url         TEXT UNIQUE,
    date        TEXT,
    description TEXT
);

INSERT INTO schema_migrations (version) VALUES (1);
"#,
        },
        Migration {
            version: 2,
            description: "Parsed publication time and fetch time",
            sql: r#"
ALTER TABLE law_changes ADD COLUMN published_at TEXT;
ALTER TABLE law_changes ADD COLUMN fetched_at TEXT;

CREATE INDEX IF NOT EXISTS idx_law_changes_published ON law_changes(published_at);

INSERT INTO schema_migrations (version) VALUES (2);
"#,
        },
        Migration {
            version: 3,
            description: "Per-item entity analyses",
            sql: r#"
CREATE TABLE IF NOT EXISTS change_analyses (
    url           TEXT PRIMARY KEY REFERENCES law_changes(url) ON DELETE CASCADE,
    analysis_json TEXT NOT NULL,
    analyzed_at   TEXT NOT NULL
);

INSERT INTO schema_migrations (version) VALUES (3);
"#,
        },
    ]
}
