use course_core::model::{User, UserId};
use sqlx::Row;
use sqlx::sqlite::SqliteRow;

use crate::repository::{AccountRecord, StorageError};

pub(crate) fn ser<E: core::fmt::Display>(e: E) -> StorageError {
    StorageError::Serialization(e.to_string())
}

pub(crate) fn conn<E: core::fmt::Display>(e: E) -> StorageError {
    StorageError::Connection(e.to_string())
}

pub(crate) fn map_account_row(row: &SqliteRow) -> Result<AccountRecord, StorageError> {
    let id: UserId = row.try_get::<String, _>("id").map_err(ser)?.parse().map_err(ser)?;
    let user = User::new(
        id,
        row.try_get::<String, _>("email").map_err(ser)?,
        row.try_get::<String, _>("name").map_err(ser)?,
        row.try_get::<Option<String>, _>("avatar").map_err(ser)?,
    )
    .map_err(ser)?;

    Ok(AccountRecord {
        user,
        password_hash: row.try_get("password_hash").map_err(ser)?,
        created_at: row.try_get("created_at").map_err(ser)?,
    })
}
