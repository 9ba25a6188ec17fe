//! User account database operations

use bandstand_common::{auth, Result};
use sqlx::{Row, SqlitePool};
use uuid::Uuid;

/// User account record
#[derive(Debug, Clone)]
pub struct User {
    pub guid: Uuid,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub password_salt: String,
}

impl User {
    /// Create a new account from a plaintext password
    ///
    /// The password is salted and hashed here; the plaintext is not kept.
    pub fn new(username: &str, email: &str, password: &str) -> Self {
        let salt = auth::generate_salt();
        let hash = auth::hash_password(password, &salt);

        Self {
            guid: Uuid::new_v4(),
            username: username.to_string(),
            email: email.to_string(),
            password_hash: hash,
            password_salt: salt,
        }
    }

    /// Check a login attempt against the stored credentials
    pub fn verify_password(&self, password: &str) -> bool {
        auth::verify_password(password, &self.password_salt, &self.password_hash)
    }
}

/// Insert a new user row
///
/// The UNIQUE constraint on username makes a duplicate insert fail; the
/// register handler checks first and treats the constraint as backstop.
pub async fn create_user(pool: &SqlitePool, user: &User) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO users (guid, username, email, password_hash, password_salt,
                           created_at, updated_at)
        VALUES (?, ?, ?, ?, ?, CURRENT_TIMESTAMP, CURRENT_TIMESTAMP)
        "#,
    )
    .bind(user.guid.to_string())
    .bind(&user.username)
    .bind(&user.email)
    .bind(&user.password_hash)
    .bind(&user.password_salt)
    .execute(pool)
    .await?;

    Ok(())
}

/// Load user by username
pub async fn load_user_by_username(pool: &SqlitePool, username: &str) -> Result<Option<User>> {
    let row = sqlx::query(
        r#"
        SELECT guid, username, email, password_hash, password_salt
        FROM users
        WHERE username = ?
        "#,
    )
    .bind(username)
    .fetch_optional(pool)
    .await?;

    match row {
        Some(row) => {
            let guid_str: String = row.get("guid");
            let guid = Uuid::parse_str(&guid_str).map_err(|e| {
                bandstand_common::Error::Internal(format!("Invalid user guid: {}", e))
            })?;

            Ok(Some(User {
                guid,
                username: row.get("username"),
                email: row.get("email"),
                password_hash: row.get("password_hash"),
                password_salt: row.get("password_salt"),
            }))
        }
        None => Ok(None),
    }
}

/// Check whether a username is already taken
pub async fn username_exists(pool: &SqlitePool, username: &str) -> Result<bool> {
    let exists: bool =
        sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM users WHERE username = ?)")
            .bind(username)
            .fetch_one(pool)
            .await?;
    Ok(exists)
}
