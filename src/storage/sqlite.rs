//! SQLite Storage Backend
//!
//! One connection per call, opened on the blocking pool. Foreign keys are
//! switched on for every connection so the database itself refuses dangling
//! client references and deletes of referenced reps.

use anyhow::{anyhow, Context};
use async_trait::async_trait;
use rusqlite::types::Type;
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::task;
use tracing::{debug, info};
use uuid::Uuid;

use super::{ClientRepository, SalesRepRepository, StorageError, StorageResult};
use crate::models::{Client, SalesRep};

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS sales_reps (
    id TEXT PRIMARY KEY,
    name TEXT NOT NULL,
    email TEXT NOT NULL,
    phone TEXT
);

CREATE TABLE IF NOT EXISTS clients (
    id TEXT PRIMARY KEY,
    name TEXT NOT NULL,
    contact_email TEXT NOT NULL,
    visit_date TEXT NOT NULL,
    notes TEXT,
    sales_rep_id TEXT NOT NULL REFERENCES sales_reps(id) ON DELETE RESTRICT
);

CREATE INDEX IF NOT EXISTS idx_clients_sales_rep ON clients(sales_rep_id);
"#;

const CLIENT_COLUMNS: &str = "id, name, contact_email, visit_date, sales_rep_id, notes";

const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

impl From<rusqlite::Error> for StorageError {
    fn from(err: rusqlite::Error) -> Self {
        match &err {
            rusqlite::Error::SqliteFailure(e, _)
                if e.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_FOREIGNKEY =>
            {
                StorageError::ForeignKeyViolation
            }
            _ => StorageError::Backend(err.into()),
        }
    }
}

#[derive(Debug, Clone)]
pub struct SqliteStore {
    db_path: PathBuf,
}

impl SqliteStore {
    /// Opens (or creates) the database file and applies the schema.
    pub async fn new(db_path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = db_path.as_ref().to_path_buf();
        let path_clone = path.clone();

        task::spawn_blocking(move || {
            let conn = connect(&path_clone)?;
            conn.execute_batch(SCHEMA)?;
            Ok::<_, anyhow::Error>(())
        })
        .await?
        .with_context(|| format!("Failed to initialise database at {}", path.display()))?;

        info!("SQLite store ready at {}", path.display());
        Ok(Self { db_path: path })
    }

    pub fn path(&self) -> &Path {
        &self.db_path
    }

    /// Inserts the default rep unless it is already present. Returns whether
    /// a row was written.
    pub async fn seed_default_sales_rep(&self) -> StorageResult<bool> {
        let rep = SalesRep::default_rep();
        let inserted = self
            .run(move |conn| {
                let n = conn.execute(
                    "INSERT OR IGNORE INTO sales_reps (id, name, email, phone) VALUES (?1, ?2, ?3, ?4)",
                    params![rep.id.to_string(), rep.name, rep.email, rep.phone],
                )?;
                Ok(n > 0)
            })
            .await?;
        if inserted {
            info!("Seeded default sales rep");
        }
        Ok(inserted)
    }

    async fn run<T, F>(&self, f: F) -> StorageResult<T>
    where
        T: Send + 'static,
        F: FnOnce(&Connection) -> StorageResult<T> + Send + 'static,
    {
        let path = self.db_path.clone();
        task::spawn_blocking(move || {
            let conn = connect(&path)?;
            f(&conn)
        })
        .await
        .map_err(|e| StorageError::Backend(anyhow!("storage task failed: {}", e)))?
    }
}

fn connect(path: &Path) -> rusqlite::Result<Connection> {
    let conn = Connection::open(path)?;
    conn.busy_timeout(BUSY_TIMEOUT)?;
    conn.execute_batch("PRAGMA foreign_keys = ON;")?;
    Ok(conn)
}

fn uuid_at(row: &Row<'_>, idx: usize) -> rusqlite::Result<Uuid> {
    let raw: String = row.get(idx)?;
    Uuid::parse_str(&raw)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

fn sales_rep_from_row(row: &Row<'_>) -> rusqlite::Result<SalesRep> {
    Ok(SalesRep {
        id: uuid_at(row, 0)?,
        name: row.get(1)?,
        email: row.get(2)?,
        phone: row.get(3)?,
    })
}

fn client_from_row(row: &Row<'_>) -> rusqlite::Result<Client> {
    Ok(Client {
        id: uuid_at(row, 0)?,
        name: row.get(1)?,
        contact_email: row.get(2)?,
        visit_date: row.get(3)?,
        sales_rep_id: uuid_at(row, 4)?,
        notes: row.get(5)?,
    })
}

#[async_trait]
impl SalesRepRepository for SqliteStore {
    async fn find_all(&self) -> StorageResult<Vec<SalesRep>> {
        self.run(|conn| {
            let mut stmt =
                conn.prepare("SELECT id, name, email, phone FROM sales_reps ORDER BY rowid")?;
            let reps = stmt
                .query_map([], sales_rep_from_row)?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            Ok(reps)
        })
        .await
    }

    async fn find_by_id(&self, id: Uuid) -> StorageResult<Option<SalesRep>> {
        self.run(move |conn| {
            let rep = conn
                .query_row(
                    "SELECT id, name, email, phone FROM sales_reps WHERE id = ?1",
                    params![id.to_string()],
                    sales_rep_from_row,
                )
                .optional()?;
            Ok(rep)
        })
        .await
    }

    async fn exists(&self, id: Uuid) -> StorageResult<bool> {
        self.run(move |conn| {
            let found: bool = conn.query_row(
                "SELECT EXISTS(SELECT 1 FROM sales_reps WHERE id = ?1)",
                params![id.to_string()],
                |row| row.get(0),
            )?;
            Ok(found)
        })
        .await
    }

    async fn insert(&self, rep: &SalesRep) -> StorageResult<()> {
        let rep = rep.clone();
        self.run(move |conn| {
            conn.execute(
                "INSERT INTO sales_reps (id, name, email, phone) VALUES (?1, ?2, ?3, ?4)",
                params![rep.id.to_string(), rep.name, rep.email, rep.phone],
            )?;
            debug!("Inserted sales rep {}", rep.id);
            Ok(())
        })
        .await
    }

    async fn replace(&self, rep: &SalesRep) -> StorageResult<bool> {
        let rep = rep.clone();
        self.run(move |conn| {
            let n = conn.execute(
                "UPDATE sales_reps SET name = ?1, email = ?2, phone = ?3 WHERE id = ?4",
                params![rep.name, rep.email, rep.phone, rep.id.to_string()],
            )?;
            Ok(n > 0)
        })
        .await
    }

    async fn remove(&self, id: Uuid) -> StorageResult<bool> {
        self.run(move |conn| {
            let n = conn.execute("DELETE FROM sales_reps WHERE id = ?1", params![id.to_string()])?;
            Ok(n > 0)
        })
        .await
    }
}

#[async_trait]
impl ClientRepository for SqliteStore {
    async fn find_all(&self) -> StorageResult<Vec<Client>> {
        self.run(|conn| {
            let sql = format!("SELECT {} FROM clients ORDER BY rowid", CLIENT_COLUMNS);
            let mut stmt = conn.prepare(&sql)?;
            let clients = stmt
                .query_map([], client_from_row)?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            Ok(clients)
        })
        .await
    }

    async fn find_by_id(&self, id: Uuid) -> StorageResult<Option<Client>> {
        self.run(move |conn| {
            let client = conn
                .query_row(
                    &format!("SELECT {} FROM clients WHERE id = ?1", CLIENT_COLUMNS),
                    params![id.to_string()],
                    client_from_row,
                )
                .optional()?;
            Ok(client)
        })
        .await
    }

    async fn find_by_sales_rep(&self, sales_rep_id: Uuid) -> StorageResult<Vec<Client>> {
        self.run(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {} FROM clients WHERE sales_rep_id = ?1 ORDER BY rowid",
                CLIENT_COLUMNS
            ))?;
            let clients = stmt
                .query_map(params![sales_rep_id.to_string()], client_from_row)?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            Ok(clients)
        })
        .await
    }

    async fn exists(&self, id: Uuid) -> StorageResult<bool> {
        self.run(move |conn| {
            let found: bool = conn.query_row(
                "SELECT EXISTS(SELECT 1 FROM clients WHERE id = ?1)",
                params![id.to_string()],
                |row| row.get(0),
            )?;
            Ok(found)
        })
        .await
    }

    async fn insert(&self, client: &Client) -> StorageResult<()> {
        let client = client.clone();
        self.run(move |conn| {
            conn.execute(
                "INSERT INTO clients (id, name, contact_email, visit_date, sales_rep_id, notes) VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![
                    client.id.to_string(),
                    client.name,
                    client.contact_email,
                    client.visit_date,
                    client.sales_rep_id.to_string(),
                    client.notes
                ],
            )?;
            debug!("Inserted client {}", client.id);
            Ok(())
        })
        .await
    }

    async fn replace(&self, client: &Client) -> StorageResult<bool> {
        let client = client.clone();
        self.run(move |conn| {
            let n = conn.execute(
                "UPDATE clients SET name = ?1, contact_email = ?2, visit_date = ?3, sales_rep_id = ?4, notes = ?5 WHERE id = ?6",
                params![
                    client.name,
                    client.contact_email,
                    client.visit_date,
                    client.sales_rep_id.to_string(),
                    client.notes,
                    client.id.to_string()
                ],
            )?;
            Ok(n > 0)
        })
        .await
    }

    async fn remove(&self, id: Uuid) -> StorageResult<bool> {
        self.run(move |conn| {
            let n = conn.execute("DELETE FROM clients WHERE id = ?1", params![id.to_string()])?;
            Ok(n > 0)
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use tempfile::NamedTempFile;

    fn rep(name: &str) -> SalesRep {
        SalesRep {
            id: Uuid::new_v4(),
            name: name.to_string(),
            email: format!("{}@acme.test", name.to_lowercase()),
            phone: None,
        }
    }

    fn client(name: &str, sales_rep_id: Uuid) -> Client {
        Client {
            id: Uuid::new_v4(),
            name: name.to_string(),
            contact_email: "buyer@acme.test".to_string(),
            visit_date: NaiveDate::from_ymd_opt(2024, 5, 1)
                .unwrap()
                .and_hms_opt(10, 30, 0)
                .unwrap(),
            sales_rep_id,
            notes: Some("first visit".to_string()),
        }
    }

    #[tokio::test]
    async fn test_sqlite_round_trip_and_order() -> anyhow::Result<()> {
        let temp_file = NamedTempFile::new()?;
        let store = SqliteStore::new(temp_file.path()).await?;

        let ana = rep("Ana");
        let bo = rep("Bo");
        SalesRepRepository::insert(&store, &ana).await?;
        SalesRepRepository::insert(&store, &bo).await?;

        let first = client("Acme Co", ana.id);
        let second = client("Globex", bo.id);
        let third = client("Initech", ana.id);
        for c in [&first, &second, &third] {
            ClientRepository::insert(&store, c).await?;
        }

        let reps = SalesRepRepository::find_all(&store).await?;
        assert_eq!(reps, vec![ana.clone(), bo.clone()]);

        let loaded = ClientRepository::find_by_id(&store, first.id).await?;
        assert_eq!(loaded, Some(first.clone()));

        let owned: Vec<_> = store
            .find_by_sales_rep(ana.id)
            .await?
            .into_iter()
            .map(|c| c.name)
            .collect();
        assert_eq!(owned, vec!["Acme Co", "Initech"]);

        assert!(ClientRepository::exists(&store, second.id).await?);
        assert!(ClientRepository::remove(&store, second.id).await?);
        assert!(!ClientRepository::remove(&store, second.id).await?);
        assert!(!ClientRepository::exists(&store, second.id).await?);
        Ok(())
    }

    #[tokio::test]
    async fn test_replace_reports_missing_rows() -> anyhow::Result<()> {
        let temp_file = NamedTempFile::new()?;
        let store = SqliteStore::new(temp_file.path()).await?;

        let mut ana = rep("Ana");
        assert!(!SalesRepRepository::replace(&store, &ana).await?);

        SalesRepRepository::insert(&store, &ana).await?;
        ana.phone = Some("555-0100".to_string());
        assert!(SalesRepRepository::replace(&store, &ana).await?);
        assert_eq!(SalesRepRepository::find_by_id(&store, ana.id).await?, Some(ana));
        Ok(())
    }

    #[tokio::test]
    async fn test_foreign_keys_are_enforced() -> anyhow::Result<()> {
        let temp_file = NamedTempFile::new()?;
        let store = SqliteStore::new(temp_file.path()).await?;

        let orphan = client("Orphan", Uuid::new_v4());
        let err = ClientRepository::insert(&store, &orphan).await.unwrap_err();
        assert!(matches!(err, StorageError::ForeignKeyViolation));

        let ana = rep("Ana");
        SalesRepRepository::insert(&store, &ana).await?;
        ClientRepository::insert(&store, &client("Acme Co", ana.id)).await?;

        let err = SalesRepRepository::remove(&store, ana.id).await.unwrap_err();
        assert!(matches!(err, StorageError::ForeignKeyViolation));
        assert!(SalesRepRepository::exists(&store, ana.id).await?);
        Ok(())
    }

    #[tokio::test]
    async fn test_seed_is_idempotent() -> anyhow::Result<()> {
        let temp_file = NamedTempFile::new()?;
        let store = SqliteStore::new(temp_file.path()).await?;

        assert!(store.seed_default_sales_rep().await?);
        assert!(!store.seed_default_sales_rep().await?);

        // schema creation must not wipe existing rows
        let reopened = SqliteStore::new(temp_file.path()).await?;
        let reps = SalesRepRepository::find_all(&reopened).await?;
        assert_eq!(reps, vec![SalesRep::default_rep()]);
        Ok(())
    }
}
