use crate::domain::models::{Session, User};
use crate::infrastructure::error::ClientError;
use rusqlite::{params, Connection};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

pub const USER_KEY: &str = "user";
pub const ACCESS_TOKEN_KEY: &str = "access_token";
pub const REFRESH_TOKEN_KEY: &str = "refresh_token";

const SCHEMA_SQL: &str = include_str!("../../sql/schema.sql");

/// Client-local persistence of the session. A missing entry means anonymous.
pub trait SessionStorage: Send + Sync {
    fn load(&self) -> Result<Session, ClientError>;
    fn save(&self, session: &Session) -> Result<(), ClientError>;
    fn clear(&self) -> Result<(), ClientError>;
}

pub fn initialize_database(path: &Path) -> Result<(), ClientError> {
    let connection = Connection::open(path)?;
    connection.execute_batch(SCHEMA_SQL)?;
    Ok(())
}

#[derive(Debug, Clone)]
pub struct SqliteSessionStorage {
    db_path: PathBuf,
}

impl SqliteSessionStorage {
    pub fn new(db_path: impl AsRef<Path>) -> Self {
        Self {
            db_path: db_path.as_ref().to_path_buf(),
        }
    }

    fn connect(&self) -> Result<Connection, ClientError> {
        Connection::open(&self.db_path).map_err(ClientError::from)
    }
}

fn session_entries(session: &Session) -> Result<Vec<(&'static str, String)>, ClientError> {
    let mut entries = Vec::new();
    if let Some(user) = session.user.as_ref() {
        entries.push((USER_KEY, serde_json::to_string(user)?));
    }
    if let Some(token) = session.access_token.as_ref() {
        entries.push((ACCESS_TOKEN_KEY, token.clone()));
    }
    if let Some(token) = session.refresh_token.as_ref() {
        entries.push((REFRESH_TOKEN_KEY, token.clone()));
    }
    Ok(entries)
}

fn session_from_entries(mut entries: HashMap<String, String>) -> Result<Session, ClientError> {
    let user = match entries.remove(USER_KEY) {
        Some(raw) => Some(serde_json::from_str::<User>(&raw).map_err(|error| {
            ClientError::Storage(format!("invalid persisted user: {error}"))
        })?),
        None => None,
    };
    Ok(Session {
        user,
        access_token: entries.remove(ACCESS_TOKEN_KEY),
        refresh_token: entries.remove(REFRESH_TOKEN_KEY),
    })
}

impl SessionStorage for SqliteSessionStorage {
    fn load(&self) -> Result<Session, ClientError> {
        let connection = self.connect()?;
        let mut statement = connection.prepare("SELECT key, value FROM session_entries")?;
        let entries = statement
            .query_map([], |row| Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?)))?
            .collect::<Result<HashMap<_, _>, _>>()?;
        session_from_entries(entries)
    }

    fn save(&self, session: &Session) -> Result<(), ClientError> {
        let entries = session_entries(session)?;
        let mut connection = self.connect()?;
        let transaction = connection.transaction()?;
        transaction.execute("DELETE FROM session_entries", [])?;
        for (key, value) in entries {
            transaction.execute(
                "INSERT INTO session_entries (key, value) VALUES (?1, ?2)",
                params![key, value],
            )?;
        }
        transaction.commit()?;
        Ok(())
    }

    fn clear(&self) -> Result<(), ClientError> {
        let connection = self.connect()?;
        connection.execute("DELETE FROM session_entries", [])?;
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct InMemorySessionStorage {
    entries: Mutex<HashMap<String, String>>,
}

impl InMemorySessionStorage {
    pub fn with_session(session: &Session) -> Result<Self, ClientError> {
        let storage = Self::default();
        storage.save(session)?;
        Ok(storage)
    }
}

impl SessionStorage for InMemorySessionStorage {
    fn load(&self) -> Result<Session, ClientError> {
        let entries = self
            .entries
            .lock()
            .map_err(|error| ClientError::Storage(format!("in-memory lock poisoned: {error}")))?;
        session_from_entries(entries.clone())
    }

    fn save(&self, session: &Session) -> Result<(), ClientError> {
        let next = session_entries(session)?
            .into_iter()
            .map(|(key, value)| (key.to_string(), value))
            .collect();
        let mut entries = self
            .entries
            .lock()
            .map_err(|error| ClientError::Storage(format!("in-memory lock poisoned: {error}")))?;
        *entries = next;
        Ok(())
    }

    fn clear(&self) -> Result<(), ClientError> {
        let mut entries = self
            .entries
            .lock()
            .map_err(|error| ClientError::Storage(format!("in-memory lock poisoned: {error}")))?;
        entries.clear();
        Ok(())
    }
}
