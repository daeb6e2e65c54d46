use argon2::{
    Argon2, PasswordHash, PasswordHasher, PasswordVerifier,
    password_hash::{Result as HashResult, SaltString, rand_core::OsRng},
};
use garde::Validate;
use libris_types::{
    claim::{ROLE_USER, Role},
    general::ValidEmail,
};
use serde::{Deserialize, Serialize};
use sqlx::Pool;
use tracing::{debug, error};

use crate::{
    ChosenDB, Error,
    error::Result,
    messages,
    validation::is_valid_password,
};

fn hash_password(password: &str) -> HashResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    let password_hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)?
        .to_string();
    Ok(password_hash)
}

fn verify_password(password: &str, password_hash: &str) -> HashResult<bool> {
    let parsed_hash = PasswordHash::new(password_hash)?;
    let res = Argon2::default().verify_password(password.as_bytes(), &parsed_hash);
    if let Err(e) = res {
        debug!("Invalid password, error {e}");
    }
    Ok(res.is_ok())
}

fn is_valid_role(role: &str, _ctx: &()) -> garde::Result {
    if Role::from(role).is_known() {
        Ok(())
    } else {
        Err(garde::Error::new(format!("unknown role {role}")))
    }
}

fn strong_enough(password: &str, _ctx: &()) -> garde::Result {
    if is_valid_password(password) {
        Ok(())
    } else {
        Err(garde::Error::new("password must be at least 8 characters"))
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Validate)]
pub struct CreateAccount {
    #[garde(length(min = 1, max = 255))]
    pub firstname: String,
    #[garde(length(min = 1, max = 255))]
    pub lastname: String,
    #[garde(length(min = 1, max = 255))]
    pub username: String,
    #[garde(dive)]
    pub email: ValidEmail,
    #[garde(custom(strong_enough), length(max = 255))]
    pub password: String,
    #[garde(inner(custom(is_valid_role)))]
    pub role: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Clone, Validate)]
pub struct Credentials {
    #[garde(dive)]
    pub email: ValidEmail,
    #[garde(length(min = 1))]
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize, Clone, Validate)]
pub struct ChangePassword {
    #[garde(dive)]
    pub email: ValidEmail,
    #[garde(length(min = 1))]
    pub password: String,
    #[garde(custom(strong_enough), length(max = 255))]
    pub new_password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Account {
    pub id: i64,
    pub firstname: String,
    pub lastname: String,
    pub username: String,
    pub email: String,
    pub role: String,
}

impl Account {
    pub fn display_name(&self) -> String {
        format!("{} {}", self.firstname, self.lastname)
    }
}

const ACCOUNT_COLUMNS: &str = "id, firstname, lastname, username, email, role";

pub type AccountRepository = AccountRepositoryImpl<Pool<ChosenDB>>;

pub struct AccountRepositoryImpl<E> {
    executor: E,
}

impl<'c, E> AccountRepositoryImpl<E>
where
    for<'a> &'a E: sqlx::Executor<'c, Database = ChosenDB>,
{
    pub fn new(executor: E) -> Self {
        Self { executor }
    }

    pub async fn create(&self, payload: CreateAccount) -> Result<Account> {
        let password = hash_password(&payload.password)?;
        let role = payload.role.as_deref().unwrap_or(ROLE_USER);
        let result = sqlx::query(
            "INSERT INTO accounts (firstname, lastname, username, email, role, password) \
             VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(&payload.firstname)
        .bind(&payload.lastname)
        .bind(&payload.username)
        .bind(payload.email.as_ref())
        .bind(role)
        .bind(password)
        .execute(&self.executor)
        .await
        .map_err(|e| match Error::from(e) {
            Error::AlreadyExists(_) => Error::AlreadyExists(messages::ACCOUNT_EXISTS.to_string()),
            other => other,
        })?;

        let id = result.last_insert_rowid();
        self.get(id).await
    }

    pub async fn get(&self, id: i64) -> Result<Account> {
        let sql = format!("SELECT {ACCOUNT_COLUMNS} FROM accounts WHERE id = ?");
        sqlx::query_as::<_, Account>(&sql)
            .bind(id)
            .fetch_optional(&self.executor)
            .await?
            .ok_or_else(|| Error::RecordNotFound(messages::USER_NOT_FOUND.to_string()))
    }

    pub async fn check_password(&self, email: &str, password: &str) -> Result<Account> {
        let (id, hashed_password): (i64, String) =
            sqlx::query_as("SELECT id, password FROM accounts WHERE email = ?")
                .bind(email)
                .fetch_one(&self.executor)
                .await
                .map_err(|e| {
                    debug!("Account check error: {e}");
                    Error::InvalidCredentials
                })?;
        if verify_password(password, &hashed_password).unwrap_or(false) {
            return self.get(id).await;
        }
        Err(Error::InvalidCredentials)
    }

    /// Replaces the password after checking the current one.
    pub async fn change_password(&self, payload: &ChangePassword) -> Result<Account> {
        let account = self
            .check_password(payload.email.as_ref(), &payload.password)
            .await?;
        let password = hash_password(&payload.new_password)?;
        let res = sqlx::query("UPDATE accounts SET password = ? WHERE id = ?")
            .bind(password)
            .bind(account.id)
            .execute(&self.executor)
            .await?;
        match res.rows_affected() {
            0 => Err(Error::RecordNotFound(messages::USER_NOT_FOUND.to_string())),
            1 => Ok(account),
            n => {
                error!("{n} accounts updated for id {}", account.id);
                Err(Error::MultipleMatched(messages::MULTIPLE_ACCOUNTS.to_string()))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_password_hash() {
        let hash = hash_password("sup3rsecret").unwrap();
        assert!(verify_password("sup3rsecret", &hash).unwrap());
        assert!(!verify_password("wrong-password", &hash).unwrap());
    }

    #[test]
    fn test_create_account_validation() {
        let payload: CreateAccount = serde_json::from_value(serde_json::json!({
            "firstname": "Ada",
            "lastname": "Reader",
            "username": "ada",
            "email": "ada@example.com",
            "password": "short",
            "role": "emperor"
        }))
        .unwrap();
        let report = payload.validate().unwrap_err();
        let fields: Vec<String> = report.iter().map(|(path, _)| path.to_string()).collect();
        assert_eq!(fields.len(), 2);
        assert!(fields.iter().any(|f| f.starts_with("password")));
        assert!(fields.iter().any(|f| f.starts_with("role")));
    }
}
