use rust_decimal::Decimal;
use sea_orm::{Database, DatabaseConnection};

use engine::{
    CargoUpdate, CostOutcome, Currency, Engine, EngineError, FreightMode, MissingInput,
    PageRequest, PricingBasis, RateType, ShipmentFilter, ShipmentNew, ShippingMethod,
    ShippingMethodNew, StatusUpdate, TrackingEventNew, WarehouseKind, WarehouseNew,
};
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

fn dec(value: &str) -> Decimal {
    value.parse().unwrap()
}

async fn hong_kong_air(engine: &Engine) -> ShippingMethod {
    engine
        .new_shipping_method(ShippingMethodNew {
            name: "Hong Kong Air".to_string(),
            mode: FreightMode::Air,
            origin: Some("Hong Kong".to_string()),
            rate_type: RateType::PerKg,
            base_rate: dec("14.00"),
            currency: Currency::default(),
            transit_days_min: Some(10),
            transit_days_max: Some(15),
            schedule: Some("Weekly departures".to_string()),
            restrictions: Some("Including batteries, liquids, powders, food".to_string()),
        })
        .await
        .unwrap()
}

async fn yiwu_sea(engine: &Engine) -> ShippingMethod {
    engine
        .new_shipping_method(ShippingMethodNew {
            name: "Yiwu Sea Freight".to_string(),
            mode: FreightMode::Sea,
            origin: Some("Yiwu".to_string()),
            rate_type: RateType::PerCbm,
            base_rate: dec("55000"),
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
async fn create_shipment_prices_and_records_created_event() {
    let (engine, _db) = engine_with_db().await;
    let method = hong_kong_air(&engine).await;

    let details = engine
        .create_shipment(ShipmentNew {
            shipping_method_id: Some(method.id),
            consignment_number: Some("sea_186".to_string()),
            description: Some("Toy desks and electric bikes".to_string()),
            cartons: Some(24),
            actual_weight_kg: Some(dec("2000")),
            volume_cbm: Some(dec("5.0")),
            origin: Some("Hong Kong".to_string()),
            destination: Some("Nairobi".to_string()),
            ..Default::default()
        })
        .await
        .unwrap();

    let shipment = &details.shipment;
    assert!(shipment.tracking_number.starts_with("RD"));
    assert_eq!(shipment.tracking_number.len(), 9);
    assert_eq!(shipment.current_status, "pending");
    assert_eq!(shipment.chargeable_weight_kg, Some(dec("2000")));
    assert_eq!(shipment.total_cost(), Some(dec("28000")));
    assert_eq!(details.events.len(), 1);
    assert_eq!(details.events[0].event_type, "created");
    assert!(details.events[0].is_current);
    assert_eq!(details.events[0].location.as_deref(), Some("Hong Kong"));
}

#[tokio::test]
async fn unknown_method_falls_back_to_per_kg() {
    let (engine, _db) = engine_with_db().await;

    let details = engine
        .create_shipment(ShipmentNew {
            shipping_method_id: Some(Uuid::new_v4()),
            actual_weight_kg: Some(dec("10")),
            volume_cbm: Some(dec("0.1")),
            rate: Some(dec("12.5")),
            ..Default::default()
        })
        .await
        .unwrap();

    assert_eq!(details.shipment.shipping_method_id, None);
    assert_eq!(details.shipping_method, None);
    assert_eq!(details.shipment.rate_type, None);
    assert_eq!(details.shipment.total_cost(), Some(dec("207.5")));
    assert_eq!(
        details.shipment.cost.and_then(|c| c.basis()),
        Some(PricingBasis::DefaultPerKg)
    );

    let loaded = engine.shipment(details.shipment.id).await.unwrap();
    assert_eq!(
        loaded.shipment.cost.and_then(|c| c.basis()),
        Some(PricingBasis::DefaultPerKg)
    );
}

#[tokio::test]
async fn tracking_lookup_is_case_insensitive() {
    let (engine, _db) = engine_with_db().await;
    let created = engine
        .create_shipment(ShipmentNew::default())
        .await
        .unwrap();
    let number = created.shipment.tracking_number.clone();

    let found = engine
        .shipment_by_tracking(&format!("  {}  ", number.to_lowercase()))
        .await
        .unwrap();
    assert_eq!(found.shipment.id, created.shipment.id);

    assert!(matches!(
        engine.shipment_by_tracking("RD0000000X").await,
        Err(EngineError::KeyNotFound(_))
    ));
}

#[tokio::test]
async fn cargo_update_reprices_from_stored_snapshot() {
    let (engine, _db) = engine_with_db().await;
    let method = yiwu_sea(&engine).await;

    let created = engine
        .create_shipment(ShipmentNew {
            shipping_method_id: Some(method.id),
            actual_weight_kg: Some(dec("300")),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(
        created.shipment.cost,
        Some(CostOutcome::Insufficient(MissingInput::Volume))
    );

    let updated = engine
        .update_shipment_cargo(
            created.shipment.id,
            CargoUpdate {
                volume_cbm: Some(dec("2")),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.shipment.total_cost(), Some(dec("110000")));
    assert_eq!(updated.shipment.chargeable_weight_kg, Some(dec("332")));

    let reloaded = engine.shipment(created.shipment.id).await.unwrap();
    assert_eq!(reloaded.shipment.total_cost(), Some(dec("110000")));
    assert_eq!(
        reloaded.shipment.cost.and_then(|c| c.basis()),
        Some(PricingBasis::PerCbm)
    );
}

#[tokio::test]
async fn recalculation_is_idempotent() {
    let (engine, _db) = engine_with_db().await;
    let method = hong_kong_air(&engine).await;
    let created = engine
        .create_shipment(ShipmentNew {
            shipping_method_id: Some(method.id),
            actual_weight_kg: Some(dec("10")),
            volume_cbm: Some(dec("0.1")),
            ..Default::default()
        })
        .await
        .unwrap();

    let first = engine
        .recalculate_shipment(created.shipment.id)
        .await
        .unwrap();
    let second = engine
        .recalculate_shipment(created.shipment.id)
        .await
        .unwrap();

    assert_eq!(first.shipment.total_cost(), Some(dec("232.4")));
    assert_eq!(
        first.shipment.total_cost(),
        second.shipment.total_cost()
    );
    assert_eq!(
        first.shipment.chargeable_weight_kg,
        second.shipment.chargeable_weight_kg
    );
}

#[tokio::test]
async fn stored_amounts_keep_exact_value_and_scale() {
    let (engine, _db) = engine_with_db().await;

    for (weight, rate, total) in [
        ("98765432109876.54", "1", "98765432109876.54"),
        ("10", "0.1", "1.0"),
    ] {
        let created = engine
            .create_shipment(ShipmentNew {
                actual_weight_kg: Some(dec(weight)),
                rate: Some(dec(rate)),
                ..Default::default()
            })
            .await
            .unwrap();
        let id = created.shipment.id;
        assert_eq!(
            created.shipment.total_cost().map(|t| t.to_string()).as_deref(),
            Some(total)
        );

        let loaded = engine.shipment(id).await.unwrap();
        assert_eq!(
            loaded.shipment.actual_weight_kg.map(|w| w.to_string()).as_deref(),
            Some(weight)
        );
        assert_eq!(
            loaded.shipment.rate.map(|r| r.to_string()).as_deref(),
            Some(rate)
        );
        assert_eq!(
            loaded.shipment.total_cost().map(|t| t.to_string()).as_deref(),
            Some(total)
        );

        let repriced = engine.recalculate_shipment(id).await.unwrap();
        assert_eq!(
            repriced.shipment.total_cost().map(|t| t.to_string()).as_deref(),
            Some(total)
        );
        assert_eq!(
            repriced.shipment.chargeable_weight_kg,
            created.shipment.chargeable_weight_kg
        );
    }
}

#[tokio::test]
async fn status_update_appends_events() {
    let (engine, _db) = engine_with_db().await;
    let created = engine
        .create_shipment(ShipmentNew::default())
        .await
        .unwrap();

    let updated = engine
        .update_shipment_status(
            created.shipment.id,
            StatusUpdate {
                status: Some("in_transit".to_string()),
                event: Some(TrackingEventNew {
                    event_type: "Departed Hong Kong".to_string(),
                    location: Some("Hong Kong".to_string()),
                    is_current: true,
                    ..Default::default()
                }),
            },
        )
        .await
        .unwrap();

    assert_eq!(updated.shipment.current_status, "in_transit");
    assert_eq!(updated.events.len(), 2);
    assert_eq!(updated.events[0].event_type, "created");
    assert!(updated.events[0].is_current);
    assert_eq!(updated.events[1].event_type, "Departed Hong Kong");

    let delivered = engine
        .update_shipment_status(
            created.shipment.id,
            StatusUpdate {
                status: Some("delivered".to_string()),
                event: None,
            },
        )
        .await
        .unwrap();
    assert!(delivered.shipment.actual_delivery.is_some());
    assert_eq!(delivered.events.len(), 2);

    assert!(matches!(
        engine
            .update_shipment_status(created.shipment.id, StatusUpdate::default())
            .await,
        Err(EngineError::InvalidInput(_))
    ));
    assert!(matches!(
        engine
            .update_shipment_status(
                Uuid::new_v4(),
                StatusUpdate {
                    status: Some("lost".to_string()),
                    event: None
                }
            )
            .await,
        Err(EngineError::KeyNotFound(_))
    ));
}

#[tokio::test]
async fn shipments_page_filters_by_user_and_status() {
    let (engine, _db) = engine_with_db().await;
    let user = engine
        .register_user("customer@test.com", "Customer123", "Test Customer", None)
        .await
        .unwrap();

    for status in ["pending", "in_transit", "in_transit"] {
        engine
            .create_shipment(ShipmentNew {
                user_id: Some(user.id),
                current_status: Some(status.to_string()),
                ..Default::default()
            })
            .await
            .unwrap();
    }
    engine
        .create_shipment(ShipmentNew::default())
        .await
        .unwrap();

    let all = engine
        .shipments_page(PageRequest::default(), &ShipmentFilter::default())
        .await
        .unwrap();
    assert_eq!(all.total, 4);
    assert_eq!(all.pages, 1);
    assert!(all.items.iter().all(|d| d.events.len() == 1));

    let mine = engine
        .shipments_page(
            PageRequest::default(),
            &ShipmentFilter {
                user_id: Some(user.id),
                status: Some("in_transit".to_string()),
            },
        )
        .await
        .unwrap();
    assert_eq!(mine.total, 2);
    assert!(
        mine.items
            .iter()
            .all(|d| d.shipment.user_id == Some(user.id))
    );
}

#[tokio::test]
async fn warehouses_filter_by_country_and_mode() {
    let (engine, _db) = engine_with_db().await;
    let locations = [
        ("Hong Kong Air", "China", WarehouseKind::Warehouse, vec![FreightMode::Air]),
        ("Yiwu Sea Freight", "China", WarehouseKind::Warehouse, vec![FreightMode::Sea]),
        (
            "Eastleigh Office",
            "Kenya",
            WarehouseKind::Office,
            vec![FreightMode::Air, FreightMode::Sea],
        ),
    ];
    for (name, country, kind, modes) in locations {
        engine
            .new_warehouse(WarehouseNew {
                name: name.to_string(),
                kind,
                country: Some(country.to_string()),
                shipping_modes: modes,
                ..Default::default()
            })
            .await
            .unwrap();
    }

    assert_eq!(engine.warehouses(None, None).await.unwrap().len(), 3);
    assert_eq!(engine.warehouses(Some("China"), None).await.unwrap().len(), 2);

    let sea = engine
        .warehouses(None, Some(FreightMode::Sea))
        .await
        .unwrap();
    let names: Vec<_> = sea.iter().map(|w| w.name.as_str()).collect();
    assert_eq!(names, vec!["Yiwu Sea Freight", "Eastleigh Office"]);

    let kenya_air = engine
        .warehouses(Some("Kenya"), Some(FreightMode::Air))
        .await
        .unwrap();
    assert_eq!(kenya_air.len(), 1);
    assert_eq!(kenya_air[0].kind, WarehouseKind::Office);
}
