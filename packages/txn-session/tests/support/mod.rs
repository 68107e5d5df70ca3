#![allow(dead_code)]

pub mod notes;

use std::path::Path;

use sea_orm::{ConnectionTrait, Database, DatabaseConnection, EntityTrait, PaginatorTrait, Set};
use tempfile::TempDir;
use txn_session::SessionConfig;

pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

// Logging is auto-installed for every test binary that includes this module
#[ctor::ctor]
fn init_logging() {
    test_support::logging::init();
}

/// A throwaway SQLite database file with the `notes` table created and committed.
///
/// Reads made through [`TestDb::count_notes`] and friends use a fresh
/// connection, so they only ever see committed state.
pub struct TestDb {
    _dir: TempDir,
    url: String,
    pub config: SessionConfig,
}

impl TestDb {
    pub async fn create() -> Result<Self, BoxError> {
        let dir = TempDir::new()?;
        let url = sqlite_url(&dir.path().join("session.sqlite"));

        let setup = Database::connect(&url).await?;
        setup
            .execute_unprepared(
                "CREATE TABLE notes (id INTEGER PRIMARY KEY AUTOINCREMENT, body TEXT NOT NULL)",
            )
            .await?;
        setup.close().await?;

        let config = SessionConfig::new(url.clone())?;
        Ok(Self {
            _dir: dir,
            url,
            config,
        })
    }

    async fn observer_conn(&self) -> Result<DatabaseConnection, BoxError> {
        Ok(Database::connect(&self.url).await?)
    }

    /// Insert and commit a note outside any test session.
    pub async fn seed_note(&self, body: &str) -> Result<i32, BoxError> {
        let conn = self.observer_conn().await?;
        let id = insert_note(&conn, body).await?;
        conn.close().await?;
        Ok(id)
    }

    pub async fn count_notes(&self) -> Result<u64, BoxError> {
        let conn = self.observer_conn().await?;
        let count = notes::Entity::find().count(&conn).await?;
        conn.close().await?;
        Ok(count)
    }

    pub async fn note_bodies(&self) -> Result<Vec<String>, BoxError> {
        let conn = self.observer_conn().await?;
        let bodies = notes::Entity::find()
            .all(&conn)
            .await?
            .into_iter()
            .map(|n| n.body)
            .collect();
        conn.close().await?;
        Ok(bodies)
    }
}

/// Insert a note through any connection-like handle; returns its id.
pub async fn insert_note<C: ConnectionTrait>(conn: &C, body: &str) -> Result<i32, sea_orm::DbErr> {
    let note = notes::ActiveModel {
        body: Set(body.to_string()),
        ..Default::default()
    };
    let res = notes::Entity::insert(note).exec(conn).await?;
    Ok(res.last_insert_id)
}

pub fn sqlite_url(path: &Path) -> String {
    format!("sqlite://{}?mode=rwc", path.display())
}
