//! # Database Commands
//!
//! Diagnostics for the local database file.

use serde::Serialize;
use tracing::debug;

use crate::error::ApiError;
use crate::output::Render;
use mediroom_db::{migrations, Database, Table};

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TableCount {
    pub table: String,
    pub rows: i64,
}

/// Snapshot of the database's health and contents.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DbStatus {
    /// `None` for in-memory databases.
    pub path: Option<String>,
    pub schema_version: Option<i64>,
    pub latest_version: i64,
    pub migrations_applied: usize,
    pub migrations_known: usize,
    pub healthy: bool,
    pub tables: Vec<TableCount>,
}

impl Render for DbStatus {
    fn render(&self) -> String {
        let mut lines = vec![
            format!(
                "Database:  {}",
                self.path.as_deref().unwrap_or("(in memory)")
            ),
            format!(
                "Schema:    v{} (latest v{}, {}/{} migrations applied)",
                self.schema_version.unwrap_or(0),
                self.latest_version,
                self.migrations_applied,
                self.migrations_known
            ),
            format!("Healthy:   {}", if self.healthy { "yes" } else { "no" }),
        ];
        lines.extend(
            self.tables
                .iter()
                .map(|t| format!("  {:<14} {:>6} rows", t.table, t.rows)),
        );
        lines.join("\n")
    }
}

/// Collects schema, health, and per-table row counts.
pub async fn status(db: &Database) -> Result<DbStatus, ApiError> {
    let schema_version = db.schema_version().await?;
    let (migrations_known, migrations_applied) = db.migration_status().await?;
    let healthy = db.health_check().await;

    let mut tables = Vec::with_capacity(Table::ALL.len());
    for table in Table::ALL {
        let rows = db.count(table).await?;
        tables.push(TableCount {
            table: table.name().to_string(),
            rows,
        });
    }

    debug!(?schema_version, healthy, "Collected database status");

    Ok(DbStatus {
        path: db.database_path().map(|p| p.display().to_string()),
        schema_version,
        latest_version: migrations::latest_version(),
        migrations_applied,
        migrations_known,
        healthy,
        tables,
    })
}
