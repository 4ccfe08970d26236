use rust_decimal::Decimal;
use sea_orm::{ConnectionTrait, Database, DatabaseConnection, Statement};

use engine::{
    CostOutcome, Currency, Engine, EngineError, FreightMode, MissingInput, PageRequest,
    PricingBasis, QuoteStatus, RateType, ShippingMethod, ShippingMethodNew, User,
};
use migration::MigratorTrait;
use uuid::Uuid;

async fn engine_with_db() -> (Engine, DatabaseConnection) {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    let engine = Engine::builder()
        .database(db.clone())
        .quote_validity_days(30)
        .build()
        .await
        .unwrap();
    (engine, db)
}

fn dec(value: &str) -> Decimal {
    value.parse().unwrap()
}

async fn customer(engine: &Engine) -> User {
    engine
        .register_user("customer@test.com", "Customer123", "Test Customer", None)
        .await
        .unwrap()
}

async fn air_method(engine: &Engine) -> ShippingMethod {
    engine
        .new_shipping_method(ShippingMethodNew {
            name: "Direct Air (Guangzhou)".to_string(),
            mode: FreightMode::Air,
            origin: Some("Guangzhou".to_string()),
            rate_type: RateType::PerKg,
            base_rate: dec("12.50"),
            currency: Currency::default(),
            transit_days_min: Some(3),
            transit_days_max: Some(5),
            schedule: Some("Daily departures".to_string()),
            restrictions: None,
        })
        .await
        .unwrap()
}

async fn sea_method(engine: &Engine) -> ShippingMethod {
    engine
        .new_shipping_method(ShippingMethodNew {
            name: "Guangzhou Sea Freight".to_string(),
            mode: FreightMode::Sea,
            origin: Some("Guangzhou".to_string()),
            rate_type: RateType::PerCbm,
            base_rate: dec("60000"),
            currency: "KSH".parse().unwrap(),
            transit_days_min: Some(30),
            transit_days_max: Some(35),
            schedule: None,
            restrictions: None,
        })
        .await
        .unwrap()
}

#[tokio::test]
async fn calculate_quote_is_not_persisted() {
    let (engine, db) = engine_with_db().await;
    let method = air_method(&engine).await;

    let details = engine
        .calculate_quote(method.id, Some(dec("10")), Some(dec("0.1")))
        .await
        .unwrap();

    assert_eq!(details.quote.quote_number, None);
    assert_eq!(details.quote.chargeable_weight_kg, Some(dec("16.6")));
    assert_eq!(details.quote.total_cost(), Some(dec("207.5")));
    assert_eq!(details.shipping_method.map(|m| m.id), Some(method.id));

    let backend = db.get_database_backend();
    let row = db
        .query_one(Statement::from_string(
            backend,
            "SELECT COUNT(*) AS n FROM quotes",
        ))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(row.try_get::<i64>("", "n").unwrap(), 0);
}

#[tokio::test]
async fn calculate_quote_per_cbm() {
    let (engine, _db) = engine_with_db().await;
    let method = sea_method(&engine).await;

    let details = engine
        .calculate_quote(method.id, Some(dec("2000")), Some(dec("5.0")))
        .await
        .unwrap();
    assert_eq!(details.quote.total_cost(), Some(dec("300000")));
    assert_eq!(details.quote.currency.code(), "KSH");

    let details = engine
        .calculate_quote(method.id, Some(dec("20")), None)
        .await
        .unwrap();
    assert_eq!(
        details.quote.cost,
        Some(CostOutcome::Insufficient(MissingInput::Volume))
    );
}

#[tokio::test]
async fn calculate_quote_unknown_method() {
    let (engine, _db) = engine_with_db().await;
    let err = engine
        .calculate_quote(Uuid::new_v4(), Some(dec("1")), None)
        .await
        .unwrap_err();
    assert_eq!(
        err,
        EngineError::KeyNotFound("shipping method not exists".to_string())
    );
}

#[tokio::test]
async fn calculate_quote_rejects_negative_weight() {
    let (engine, _db) = engine_with_db().await;
    let method = air_method(&engine).await;
    let err = engine
        .calculate_quote(method.id, Some(dec("-5")), None)
        .await
        .unwrap_err();
    assert_eq!(
        err,
        EngineError::InvalidMeasurement("actual weight must be >= 0".to_string())
    );
}

#[tokio::test]
async fn create_quote_assigns_number_and_validity() {
    let (engine, _db) = engine_with_db().await;
    let user = customer(&engine).await;
    let method = air_method(&engine).await;

    let created = engine
        .create_quote(user.id, method.id, Some(dec("10")), Some(dec("0.1")))
        .await
        .unwrap();
    let number = created.quote.quote_number.clone().unwrap();
    assert!(number.starts_with("QT"));
    assert_eq!(number.len(), 10);
    assert_eq!(created.quote.status, QuoteStatus::Draft);
    assert_eq!(
        created.quote.valid_until,
        Some(created.quote.created_at.date_naive() + chrono::Duration::days(30))
    );

    let loaded = engine
        .quote_by_number(&number.to_lowercase())
        .await
        .unwrap();
    assert_eq!(loaded.quote.id, created.quote.id);
    assert_eq!(loaded.quote.user_id, Some(user.id));
    assert_eq!(loaded.quote.chargeable_weight_kg, Some(dec("16.6")));
    assert_eq!(loaded.quote.total_cost(), Some(dec("207.5")));
    assert_eq!(
        loaded.quote.cost.and_then(|c| c.basis()),
        Some(PricingBasis::PerKg)
    );
    assert_eq!(
        loaded.shipping_method.map(|m| m.name),
        Some("Direct Air (Guangzhou)".to_string())
    );
}

#[tokio::test]
async fn quote_keeps_rate_snapshot_after_catalog_change() {
    let (engine, db) = engine_with_db().await;
    let user = customer(&engine).await;
    let method = air_method(&engine).await;

    let created = engine
        .create_quote(user.id, method.id, Some(dec("10")), None)
        .await
        .unwrap();
    let number = created.quote.quote_number.unwrap();

    let backend = db.get_database_backend();
    db.execute(Statement::from_sql_and_values(
        backend,
        "UPDATE shipping_methods SET base_rate = ? WHERE id = ?",
        vec!["20.00".into(), method.id.into()],
    ))
    .await
    .unwrap();

    let repriced = engine.shipping_method(method.id).await.unwrap();
    assert_eq!(repriced.base_rate.to_string(), "20.00");

    let loaded = engine.quote_by_number(&number).await.unwrap();
    assert_eq!(loaded.quote.rate, Some(dec("12.5")));
    assert_eq!(loaded.quote.total_cost(), Some(dec("125")));
}

#[tokio::test]
async fn quotes_for_user_are_paginated() {
    let (engine, _db) = engine_with_db().await;
    let user = customer(&engine).await;
    let other = engine
        .register_user("other@test.com", "Customer123", "Other", None)
        .await
        .unwrap();
    let method = air_method(&engine).await;

    for weight in ["1", "2", "3"] {
        engine
            .create_quote(user.id, method.id, Some(dec(weight)), None)
            .await
            .unwrap();
    }
    engine
        .create_quote(other.id, method.id, Some(dec("9")), None)
        .await
        .unwrap();

    let first = engine
        .quotes_for_user(user.id, PageRequest::new(Some(1), Some(2)))
        .await
        .unwrap();
    assert_eq!(first.total, 3);
    assert_eq!(first.pages, 2);
    assert_eq!(first.current_page, 1);
    assert_eq!(first.items.len(), 2);

    let second = engine
        .quotes_for_user(user.id, PageRequest::new(Some(2), Some(2)))
        .await
        .unwrap();
    assert_eq!(second.items.len(), 1);
    assert!(
        second
            .items
            .iter()
            .chain(first.items.iter())
            .all(|d| d.quote.user_id == Some(user.id))
    );
}

#[tokio::test]
async fn inactive_method_cannot_be_quoted() {
    let (engine, db) = engine_with_db().await;
    let method = air_method(&engine).await;

    let backend = db.get_database_backend();
    db.execute(Statement::from_sql_and_values(
        backend,
        "UPDATE shipping_methods SET is_active = ? WHERE id = ?",
        vec![false.into(), method.id.into()],
    ))
    .await
    .unwrap();

    assert!(matches!(
        engine.calculate_quote(method.id, Some(dec("1")), None).await,
        Err(EngineError::KeyNotFound(_))
    ));
    assert!(engine.shipping_methods(true).await.unwrap().is_empty());
    assert_eq!(engine.shipping_methods(false).await.unwrap().len(), 1);
}

#[tokio::test]
async fn catalog_rejects_non_positive_rate() {
    let (engine, _db) = engine_with_db().await;
    let err = engine
        .new_shipping_method(ShippingMethodNew {
            name: "Free Air".to_string(),
            mode: FreightMode::Air,
            origin: None,
            rate_type: RateType::PerKg,
            base_rate: Decimal::ZERO,
            currency: Currency::default(),
            transit_days_min: None,
            transit_days_max: None,
            schedule: None,
            restrictions: None,
        })
        .await
        .unwrap_err();
    assert_eq!(
        err,
        EngineError::InvalidRate("base rate must be > 0".to_string())
    );
}
