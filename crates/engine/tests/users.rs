use sea_orm::{ConnectionTrait, Database, DatabaseConnection, Statement};

use engine::{Engine, EngineError, UserRole};
use migration::MigratorTrait;
use uuid::Uuid;

async fn engine_with_db() -> (Engine, DatabaseConnection) {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    let engine = Engine::builder()
        .database(db.clone())
        .build()
        .await
        .unwrap();
    (engine, db)
}

#[tokio::test]
async fn register_and_authenticate() {
    let (engine, _db) = engine_with_db().await;

    let user = engine
        .register_user(
            " Customer@Test.com ",
            "Customer123",
            " Test Customer ",
            Some("+254 711 111 111"),
        )
        .await
        .unwrap();
    assert_eq!(user.email, "customer@test.com");
    assert_eq!(user.full_name, "Test Customer");
    assert_eq!(user.phone.as_deref(), Some("+254711111111"));
    assert_eq!(user.role, UserRole::Customer);

    let logged = engine
        .authenticate("CUSTOMER@test.com", "Customer123")
        .await
        .unwrap();
    assert_eq!(logged.id, user.id);

    let loaded = engine.user(user.id).await.unwrap();
    assert_eq!(loaded.email, user.email);
    assert_eq!(loaded.phone, user.phone);
}

#[tokio::test]
async fn password_is_not_stored_in_clear() {
    let (engine, db) = engine_with_db().await;
    engine
        .register_user("customer@test.com", "Customer123", "Test Customer", None)
        .await
        .unwrap();

    let backend = db.get_database_backend();
    let row = db
        .query_one(Statement::from_string(
            backend,
            "SELECT password_hash FROM users",
        ))
        .await
        .unwrap()
        .unwrap();
    let hash: String = row.try_get("", "password_hash").unwrap();
    assert!(hash.starts_with("$argon2"));
    assert!(!hash.contains("Customer123"));
}

#[tokio::test]
async fn duplicate_email_is_rejected() {
    let (engine, _db) = engine_with_db().await;
    engine
        .register_user("customer@test.com", "Customer123", "Test Customer", None)
        .await
        .unwrap();

    let err = engine
        .register_user("CUSTOMER@test.com", "Customer123", "Someone Else", None)
        .await
        .unwrap_err();
    assert_eq!(err, EngineError::ExistingKey("customer@test.com".to_string()));
}

#[tokio::test]
async fn registration_validates_input() {
    let (engine, _db) = engine_with_db().await;

    assert!(matches!(
        engine
            .register_user("not-an-email", "Customer123", "Test", None)
            .await,
        Err(EngineError::InvalidInput(_))
    ));
    assert_eq!(
        engine
            .register_user("customer@test.com", "customer123", "Test", None)
            .await
            .unwrap_err(),
        EngineError::InvalidInput(
            "password must contain at least one uppercase letter".to_string()
        )
    );
    assert_eq!(
        engine
            .register_user("customer@test.com", "Customer123", "Test", Some("12-34"))
            .await
            .unwrap_err(),
        EngineError::InvalidInput("invalid phone number format".to_string())
    );
}

#[tokio::test]
async fn wrong_credentials_are_uniform() {
    let (engine, db) = engine_with_db().await;
    let user = engine
        .create_user_with_role("staff@test.com", "Staff1234", "Staff", None, UserRole::Staff)
        .await
        .unwrap();
    assert!(user.role.is_staff());

    assert_eq!(
        engine.authenticate("staff@test.com", "Wrong1234").await,
        Err(EngineError::InvalidCredentials)
    );
    assert_eq!(
        engine.authenticate("nobody@test.com", "Staff1234").await,
        Err(EngineError::InvalidCredentials)
    );

    let backend = db.get_database_backend();
    db.execute(Statement::from_sql_and_values(
        backend,
        "UPDATE users SET is_active = ? WHERE id = ?",
        vec![false.into(), user.id.into()],
    ))
    .await
    .unwrap();
    assert_eq!(
        engine.authenticate("staff@test.com", "Staff1234").await,
        Err(EngineError::InvalidCredentials)
    );
    assert!(matches!(
        engine.user(user.id).await,
        Err(EngineError::KeyNotFound(_))
    ));
    assert!(matches!(
        engine.user(Uuid::new_v4()).await,
        Err(EngineError::KeyNotFound(_))
    ));
}
