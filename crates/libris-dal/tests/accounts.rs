use libris_dal::{
    Error,
    account::{AccountRepositoryImpl, ChangePassword, CreateAccount},
    messages,
};
use serde_json::json;

async fn init_db() -> sqlx::Pool<sqlx::Sqlite> {
    let conn = sqlx::sqlite::SqlitePoolOptions::new()
        .max_connections(1)
        .min_connections(1)
        .connect("sqlite::memory:")
        .await
        .unwrap();
    libris_dal::MIGRATOR.run(&conn).await.unwrap();
    conn
}

fn new_account(username: &str, email: &str) -> CreateAccount {
    serde_json::from_value(json!({
        "firstname": "Ada",
        "lastname": "Reader",
        "username": username,
        "email": email,
        "password": "password123"
    }))
    .unwrap()
}

#[tokio::test]
async fn test_account_lifecycle() {
    let conn = init_db().await;
    let repo = AccountRepositoryImpl::new(conn);

    let account = repo
        .create(new_account("ada", "ada@example.com"))
        .await
        .unwrap();
    assert_eq!(account.role, "user");
    assert_eq!(account.display_name(), "Ada Reader");

    let res = repo.create(new_account("ada2", "ada@example.com")).await;
    assert!(matches!(res, Err(Error::AlreadyExists(m)) if m == messages::ACCOUNT_EXISTS));

    let checked = repo
        .check_password("ada@example.com", "password123")
        .await
        .unwrap();
    assert_eq!(checked.id, account.id);
    assert!(matches!(
        repo.check_password("ada@example.com", "nope").await,
        Err(Error::InvalidCredentials)
    ));
    assert!(matches!(
        repo.check_password("nobody@example.com", "password123").await,
        Err(Error::InvalidCredentials)
    ));
}

#[tokio::test]
async fn test_change_password() {
    let conn = init_db().await;
    let repo = AccountRepositoryImpl::new(conn);
    repo.create(new_account("bob", "bob@example.com"))
        .await
        .unwrap();

    let change: ChangePassword = serde_json::from_value(json!({
        "email": "bob@example.com",
        "password": "password123",
        "new_password": "another-secret"
    }))
    .unwrap();
    repo.change_password(&change).await.unwrap();

    assert!(
        repo.check_password("bob@example.com", "another-secret")
            .await
            .is_ok()
    );
    assert!(matches!(
        repo.change_password(&change).await,
        Err(Error::InvalidCredentials)
    ));
}
