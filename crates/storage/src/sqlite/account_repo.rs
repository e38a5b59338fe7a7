use super::SqliteRepository;
use super::mapping::{conn, map_account_row};
use crate::repository::{AccountRecord, AccountRepository, StorageError};

#[async_trait::async_trait]
impl AccountRepository for SqliteRepository {
    async fn find_account_by_email(
        &self,
        email: &str,
    ) -> Result<Option<AccountRecord>, StorageError> {
        let row = sqlx::query(
            r"
            SELECT id, email, name, avatar, password_hash, created_at
            FROM accounts
            WHERE email = ?1
            ",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .map_err(conn)?;

        row.as_ref().map(map_account_row).transpose()
    }

    async fn insert_account(&self, account: &AccountRecord) -> Result<(), StorageError> {
        let res = sqlx::query(
            r"
            INSERT INTO accounts (id, email, name, avatar, password_hash, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            ON CONFLICT(email) DO NOTHING
            ",
        )
        .bind(account.user.id().to_string())
        .bind(account.user.email())
        .bind(account.user.name())
        .bind(account.user.avatar())
        .bind(&account.password_hash)
        .bind(account.created_at)
        .execute(&self.pool)
        .await
        .map_err(conn)?;

        if res.rows_affected() == 0 {
            return Err(StorageError::Conflict);
        }
        Ok(())
    }
}
