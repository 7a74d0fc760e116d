use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use sqlx::{
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
    Pool, Row, Sqlite,
};
use std::{
    fs,
    path::{Path, PathBuf},
    str::FromStr,
};

use shared::domain::{ItemId, ListId};

#[derive(Clone)]
pub struct Storage {
    pool: Pool<Sqlite>,
}

#[derive(Debug, Clone)]
pub struct StoredItem {
    pub item_id: ItemId,
    pub list_id: ListId,
    pub text: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct StoredList {
    pub list_id: ListId,
    pub created_at: DateTime<Utc>,
    pub items: Vec<StoredItem>,
}

impl Storage {
    pub async fn new(database_url: &str) -> Result<Self> {
        ensure_sqlite_parent_dir_exists(database_url)?;

        let connect_options = SqliteConnectOptions::from_str(database_url)?
            .create_if_missing(true)
            .foreign_keys(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(connect_options)
            .await?;
        sqlx::migrate!("./migrations").run(&pool).await?;
        Ok(Self { pool })
    }

    pub async fn health_check(&self) -> Result<()> {
        let _: i64 = sqlx::query_scalar("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .context("sqlite ping failed")?;
        Ok(())
    }

    pub async fn create_list(&self) -> Result<ListId> {
        let rec = sqlx::query("INSERT INTO lists DEFAULT VALUES RETURNING id")
            .fetch_one(&self.pool)
            .await?;
        Ok(ListId(rec.get::<i64, _>(0)))
    }

    /// Creates a list and its first item in one transaction, so a failed
    /// item insert never leaves an orphan list behind.
    pub async fn create_list_with_first_item(&self, text: &str) -> Result<(ListId, ItemId)> {
        let mut tx = self.pool.begin().await?;

        let rec = sqlx::query("INSERT INTO lists DEFAULT VALUES RETURNING id")
            .fetch_one(&mut *tx)
            .await?;
        let list_id = ListId(rec.get::<i64, _>(0));

        let rec = sqlx::query("INSERT INTO items (list_id, text) VALUES (?, ?) RETURNING id")
            .bind(list_id.0)
            .bind(text)
            .fetch_one(&mut *tx)
            .await?;
        let item_id = ItemId(rec.get::<i64, _>(0));

        tx.commit().await?;
        Ok((list_id, item_id))
    }

    /// Returns `None` when the list does not exist. The existence check and
    /// the insert run in the same transaction.
    pub async fn create_item(&self, list_id: ListId, text: &str) -> Result<Option<ItemId>> {
        let mut tx = self.pool.begin().await?;

        let list_row = sqlx::query("SELECT id FROM lists WHERE id = ?")
            .bind(list_id.0)
            .fetch_optional(&mut *tx)
            .await?;
        if list_row.is_none() {
            return Ok(None);
        }

        let rec = sqlx::query("INSERT INTO items (list_id, text) VALUES (?, ?) RETURNING id")
            .bind(list_id.0)
            .bind(text)
            .fetch_one(&mut *tx)
            .await?;
        let item_id = ItemId(rec.get::<i64, _>(0));

        tx.commit().await?;
        Ok(Some(item_id))
    }

    /// Loads a list with its items in insertion order (ascending item id).
    pub async fn get_list(&self, list_id: ListId) -> Result<Option<StoredList>> {
        let list_row = sqlx::query("SELECT id, created_at FROM lists WHERE id = ?")
            .bind(list_id.0)
            .fetch_optional(&self.pool)
            .await?;
        let Some(list_row) = list_row else {
            return Ok(None);
        };

        let rows = sqlx::query(
            "SELECT id, list_id, text, created_at
             FROM items
             WHERE list_id = ?
             ORDER BY id ASC",
        )
        .bind(list_id.0)
        .fetch_all(&self.pool)
        .await?;

        Ok(Some(StoredList {
            list_id: ListId(list_row.get::<i64, _>(0)),
            created_at: list_row.get::<DateTime<Utc>, _>(1),
            items: rows
                .into_iter()
                .map(|r| StoredItem {
                    item_id: ItemId(r.get::<i64, _>(0)),
                    list_id: ListId(r.get::<i64, _>(1)),
                    text: r.get::<String, _>(2),
                    created_at: r.get::<DateTime<Utc>, _>(3),
                })
                .collect(),
        }))
    }
}

fn ensure_sqlite_parent_dir_exists(database_url: &str) -> Result<()> {
    let Some(path) = sqlite_path(database_url) else {
        return Ok(());
    };

    let Some(parent) = path.parent() else {
        return Ok(());
    };

    fs::create_dir_all(parent).with_context(|| {
        format!(
            "failed to create parent directory '{}' for database url '{database_url}'",
            parent.display()
        )
    })?;

    Ok(())
}

fn sqlite_path(database_url: &str) -> Option<PathBuf> {
    if database_url == "sqlite::memory:" || !database_url.starts_with("sqlite:") {
        return None;
    }

    let path = database_url
        .trim_start_matches("sqlite://")
        .trim_start_matches("sqlite:")
        .split('?')
        .next()
        .unwrap_or_default();

    if path.is_empty() {
        return None;
    }

    Some(Path::new(path).to_path_buf())
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
