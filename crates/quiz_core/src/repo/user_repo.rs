//! Account repository contracts and SQLite implementation.

use crate::db::bool_to_int;
use crate::model::user::{NewUser, User, UserId};
use crate::repo::error::{map_write_error, RepoError, RepoResult};
use crate::repo::parse_flag;
use rusqlite::{params, Connection, OptionalExtension, Row};

const USER_SELECT_SQL: &str = "SELECT
    id,
    username,
    email,
    first_name,
    last_name,
    is_staff,
    created_at
FROM users";

/// Repository interface for account records.
pub trait UserRepository {
    fn create_user(&self, user: &NewUser) -> RepoResult<User>;
    fn get_user(&self, id: UserId) -> RepoResult<Option<User>>;
    fn get_user_by_username(&self, username: &str) -> RepoResult<Option<User>>;
    /// Whether any registered account uses `email` (exact match).
    fn email_in_use(&self, email: &str) -> RepoResult<bool>;
    fn list_users(&self) -> RepoResult<Vec<User>>;
}

/// SQLite-backed account repository.
pub struct SqliteUserRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteUserRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl UserRepository for SqliteUserRepository<'_> {
    fn create_user(&self, user: &NewUser) -> RepoResult<User> {
        user.validate()?;

        self.conn
            .execute(
                "INSERT INTO users (username, email, first_name, last_name, is_staff)
                 VALUES (?1, ?2, ?3, ?4, ?5);",
                params![
                    user.username.trim(),
                    user.email.as_str(),
                    user.first_name.as_str(),
                    user.last_name.as_str(),
                    bool_to_int(user.is_staff),
                ],
            )
            .map_err(|err| {
                map_write_error(err, || {
                    format!("username `{}` is already taken", user.username.trim())
                })
            })?;

        let id = self.conn.last_insert_rowid();
        self.get_user(id)?
            .ok_or(RepoError::NotFound { entity: "user", id })
    }

    fn get_user(&self, id: UserId) -> RepoResult<Option<User>> {
        let row = self
            .conn
            .query_row(&format!("{USER_SELECT_SQL} WHERE id = ?1;"), [id], |row| {
                Ok(parse_user_row(row))
            })
            .optional()?;
        row.transpose()
    }

    fn get_user_by_username(&self, username: &str) -> RepoResult<Option<User>> {
        let row = self
            .conn
            .query_row(
                &format!("{USER_SELECT_SQL} WHERE username = ?1;"),
                [username.trim()],
                |row| Ok(parse_user_row(row)),
            )
            .optional()?;
        row.transpose()
    }

    fn email_in_use(&self, email: &str) -> RepoResult<bool> {
        let exists: i64 = self.conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM users WHERE email = ?1 AND email <> '');",
            [email],
            |row| row.get(0),
        )?;
        Ok(exists == 1)
    }

    fn list_users(&self) -> RepoResult<Vec<User>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{USER_SELECT_SQL} ORDER BY id ASC;"))?;
        let mut rows = stmt.query([])?;
        let mut users = Vec::new();
        while let Some(row) = rows.next()? {
            users.push(parse_user_row(row)?);
        }
        Ok(users)
    }
}

fn parse_user_row(row: &Row<'_>) -> RepoResult<User> {
    Ok(User {
        id: row.get("id")?,
        username: row.get("username")?,
        email: row.get("email")?,
        first_name: row.get("first_name")?,
        last_name: row.get("last_name")?,
        is_staff: parse_flag("users", "is_staff", row.get("is_staff")?)?,
        created_at: row.get("created_at")?,
    })
}
