use crate::db::traits::{NewUser, StoredIdentity, UpdateUser, UserStore};
use crate::types::{AppError, Result};
use async_trait::async_trait;
use chrono::Utc;
use libsql::params::IntoParams;
use libsql::{Builder, Connection, Database, Row};
use tracing::debug;

const USER_COLUMNS: &str =
    "id, phone_number, full_name, password, login_success_count, created_at, updated_at";

/// libsql-backed [`UserStore`].
///
/// A single connection is kept for the lifetime of the client. For `:memory:`
/// databases every new connection would open a separate empty database.
pub struct TursoClient {
    _db: Database,
    conn: Connection,
}

impl TursoClient {
    pub async fn new_local(path: &str) -> Result<Self> {
        let db = Builder::new_local(path)
            .build()
            .await
            .map_err(|e| AppError::Database(format!("Failed to open database {}: {}", path, e)))?;

        Self::from_database(db).await
    }

    pub async fn new_memory() -> Result<Self> {
        Self::new_local(":memory:").await
    }

    async fn from_database(db: Database) -> Result<Self> {
        let conn = db
            .connect()
            .map_err(|e| AppError::Database(format!("Failed to get connection: {}", e)))?;

        let client = Self { _db: db, conn };
        client.initialize_schema().await?;

        Ok(client)
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    async fn initialize_schema(&self) -> Result<()> {
        self.conn
            .execute(
                "CREATE TABLE IF NOT EXISTS users (
                    id INTEGER PRIMARY KEY AUTOINCREMENT,
                    phone_number TEXT UNIQUE NOT NULL,
                    full_name TEXT NOT NULL,
                    password TEXT NOT NULL,
                    login_success_count INTEGER NOT NULL DEFAULT 0,
                    created_at INTEGER NOT NULL,
                    updated_at INTEGER NOT NULL
                )",
                (),
            )
            .await
            .map_err(|e| AppError::Database(format!("Failed to create users table: {}", e)))?;

        Ok(())
    }

    async fn query_one(
        &self,
        sql: &str,
        params: impl IntoParams,
    ) -> Result<Option<StoredIdentity>> {
        let mut rows = self
            .conn
            .query(sql, params)
            .await
            .map_err(|e| AppError::Database(format!("Failed to query user: {}", e)))?;

        match rows
            .next()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?
        {
            Some(row) => Ok(Some(identity_from_row(&row)?)),
            None => Ok(None),
        }
    }
}

fn identity_from_row(row: &Row) -> Result<StoredIdentity> {
    Ok(StoredIdentity {
        id: row.get(0).map_err(|e| AppError::Database(e.to_string()))?,
        phone_number: row.get(1).map_err(|e| AppError::Database(e.to_string()))?,
        full_name: row.get(2).map_err(|e| AppError::Database(e.to_string()))?,
        password_hash: row.get(3).map_err(|e| AppError::Database(e.to_string()))?,
        login_success_count: row.get(4).map_err(|e| AppError::Database(e.to_string()))?,
        created_at: row.get(5).map_err(|e| AppError::Database(e.to_string()))?,
        updated_at: row.get(6).map_err(|e| AppError::Database(e.to_string()))?,
    })
}

fn write_error(action: &str, phone_number: &str, err: libsql::Error) -> AppError {
    if err.to_string().contains("UNIQUE constraint failed") {
        AppError::Conflict(format!("Phone number {} is already registered", phone_number))
    } else {
        AppError::Database(format!("Failed to {} user: {}", action, err))
    }
}

#[async_trait]
impl UserStore for TursoClient {
    async fn get_by_id(&self, id: i64) -> Result<Option<StoredIdentity>> {
        let sql = format!("SELECT {} FROM users WHERE id = ?", USER_COLUMNS);
        self.query_one(&sql, [id]).await
    }

    async fn get_by_phone_number(&self, phone_number: &str) -> Result<Option<StoredIdentity>> {
        let sql = format!("SELECT {} FROM users WHERE phone_number = ?", USER_COLUMNS);
        self.query_one(&sql, [phone_number]).await
    }

    async fn insert(&self, user: NewUser) -> Result<i64> {
        let now = Utc::now().timestamp();

        let mut rows = self
            .conn
            .query(
                "INSERT INTO users (phone_number, full_name, password, login_success_count, created_at, updated_at)
                 VALUES (?, ?, ?, 0, ?, ?)
                 RETURNING id",
                (
                    user.phone_number.as_str(),
                    user.full_name.as_str(),
                    user.password_hash.as_str(),
                    now,
                    now,
                ),
            )
            .await
            .map_err(|e| write_error("create", &user.phone_number, e))?;

        let row = rows
            .next()
            .await
            .map_err(|e| write_error("create", &user.phone_number, e))?
            .ok_or_else(|| AppError::Database("Insert returned no id".to_string()))?;

        let id: i64 = row.get(0).map_err(|e| AppError::Database(e.to_string()))?;
        debug!(user_id = id, "user row inserted");

        Ok(id)
    }

    async fn update(&self, user: UpdateUser) -> Result<bool> {
        let now = Utc::now().timestamp();

        let affected = self
            .conn
            .execute(
                "UPDATE users
                 SET phone_number = ?, full_name = ?, login_success_count = ?, updated_at = ?
                 WHERE id = ?",
                (
                    user.phone_number.as_str(),
                    user.full_name.as_str(),
                    user.login_success_count,
                    now,
                    user.id,
                ),
            )
            .await
            .map_err(|e| write_error("update", &user.phone_number, e))?;

        Ok(affected > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_user(phone: &str) -> NewUser {
        NewUser {
            phone_number: phone.to_string(),
            full_name: "Test User".to_string(),
            password_hash: "$2b$04$hash".to_string(),
        }
    }

    #[tokio::test]
    async fn test_insert_and_lookup() {
        let client = TursoClient::new_memory().await.unwrap();
        let id = client.insert(new_user("+628111111111")).await.unwrap();

        let by_id = client.get_by_id(id).await.unwrap().expect("user by id");
        let by_phone = client
            .get_by_phone_number("+628111111111")
            .await
            .unwrap()
            .expect("user by phone");

        assert_eq!(by_id, by_phone);
        assert_eq!(by_id.login_success_count, 0);
        assert_eq!(by_id.password_hash, "$2b$04$hash");
        assert!(by_id.created_at > 0);
    }

    #[tokio::test]
    async fn test_ids_are_sequential() {
        let client = TursoClient::new_memory().await.unwrap();
        let first = client.insert(new_user("+628111111111")).await.unwrap();
        let second = client.insert(new_user("+628222222222")).await.unwrap();

        assert!(second > first);
    }

    #[tokio::test]
    async fn test_duplicate_phone_is_conflict() {
        let client = TursoClient::new_memory().await.unwrap();
        client.insert(new_user("+628111111111")).await.unwrap();

        let result = client.insert(new_user("+628111111111")).await;
        assert!(matches!(result, Err(AppError::Conflict(_))));
    }

    #[tokio::test]
    async fn test_update_missing_row_returns_false() {
        let client = TursoClient::new_memory().await.unwrap();

        let updated = client
            .update(UpdateUser {
                id: 404,
                phone_number: "+628111111111".to_string(),
                full_name: "Nobody".to_string(),
                login_success_count: 1,
            })
            .await
            .unwrap();

        assert!(!updated);
    }

    #[tokio::test]
    async fn test_update_replaces_columns() {
        let client = TursoClient::new_memory().await.unwrap();
        let id = client.insert(new_user("+628111111111")).await.unwrap();

        let updated = client
            .update(UpdateUser {
                id,
                phone_number: "+628333333333".to_string(),
                full_name: "Renamed".to_string(),
                login_success_count: 7,
            })
            .await
            .unwrap();
        assert!(updated);

        let user = client.get_by_id(id).await.unwrap().unwrap();
        assert_eq!(user.phone_number, "+628333333333");
        assert_eq!(user.full_name, "Renamed");
        assert_eq!(user.login_success_count, 7);
        assert!(client
            .get_by_phone_number("+628111111111")
            .await
            .unwrap()
            .is_none());
    }
}
