//! Engine records rendered as API bodies.

use api_types::{
    FreightMode, RateType, Role,
    auth::UserView,
    quote::QuoteView,
    shipping_method::ShippingMethodView,
    tracking::{ShipmentView, TrackingEventView},
    warehouse::WarehouseView,
};
use chrono::{NaiveDate, Utc};
use engine::{
    CostOutcome, QuoteDetails, ShipmentDetails, ShippingMethod, TrackingEvent, User, UserRole,
    Warehouse,
};

pub(crate) fn freight_mode(mode: engine::FreightMode) -> FreightMode {
    match mode {
        engine::FreightMode::Air => FreightMode::Air,
        engine::FreightMode::Sea => FreightMode::Sea,
    }
}

pub(crate) fn engine_freight_mode(mode: FreightMode) -> engine::FreightMode {
    match mode {
        FreightMode::Air => engine::FreightMode::Air,
        FreightMode::Sea => engine::FreightMode::Sea,
    }
}

fn rate_type(rate_type: engine::RateType) -> RateType {
    match rate_type {
        engine::RateType::PerKg => RateType::PerKg,
        engine::RateType::PerCbm => RateType::PerCbm,
    }
}

fn pricing_basis(cost: Option<CostOutcome>) -> Option<String> {
    cost.and_then(|c| c.basis()).map(|b| b.as_str().to_string())
}

fn missing(cost: Option<CostOutcome>) -> Option<String> {
    cost.and_then(|c| c.missing()).map(|m| m.as_str().to_string())
}

pub(crate) fn user(user: &User) -> UserView {
    UserView {
        id: user.id,
        email: user.email.clone(),
        full_name: user.full_name.clone(),
        phone: user.phone.clone(),
        role: match user.role {
            UserRole::Customer => Role::Customer,
            UserRole::Staff => Role::Staff,
            UserRole::Admin => Role::Admin,
        },
        is_active: user.is_active,
        created_at: user.created_at,
    }
}

pub(crate) fn shipping_method(method: &ShippingMethod) -> ShippingMethodView {
    ShippingMethodView {
        id: method.id,
        name: method.name.clone(),
        mode: freight_mode(method.mode),
        origin: method.origin.clone(),
        rate_type: rate_type(method.rate_type),
        base_rate: method.base_rate,
        currency: method.currency.to_string(),
        transit_days: method.transit_days(),
        transit_days_min: method.transit_days_min,
        transit_days_max: method.transit_days_max,
        schedule: method.schedule.clone(),
        restrictions: method.restrictions.clone(),
    }
}

pub(crate) fn quote(details: &QuoteDetails) -> QuoteView {
    quote_on(details, Utc::now().date_naive())
}

/// Quotes past `valid_until` are reported as expired.
fn quote_on(details: &QuoteDetails, today: NaiveDate) -> QuoteView {
    let quote = &details.quote;
    QuoteView {
        id: quote.id,
        quote_number: quote.quote_number.clone(),
        shipping_method: details.shipping_method.as_ref().map(shipping_method),
        actual_weight: quote.actual_weight_kg,
        volume_cbm: quote.volume_cbm,
        chargeable_weight: quote.chargeable_weight_kg,
        rate: quote.rate,
        rate_type: quote.rate_type.map(rate_type),
        currency: quote.currency.to_string(),
        total_cost: quote.total_cost(),
        pricing_basis: pricing_basis(quote.cost),
        missing: missing(quote.cost),
        status: quote.status_on(today).to_string(),
        valid_until: quote.valid_until,
        created_at: quote.created_at,
    }
}

fn tracking_event(event: &TrackingEvent) -> TrackingEventView {
    TrackingEventView {
        id: event.id,
        event_type: event.event_type.clone(),
        location: event.location.clone(),
        description: event.description.clone(),
        is_current: event.is_current,
        event_time: event.event_time,
    }
}

pub(crate) fn shipment(details: &ShipmentDetails) -> ShipmentView {
    let shipment = &details.shipment;
    ShipmentView {
        id: shipment.id,
        tracking_number: shipment.tracking_number.clone(),
        consignment_number: shipment.consignment_number.clone(),
        description: shipment.description.clone(),
        cartons: shipment.cartons,
        shipping_method: details.shipping_method.as_ref().map(shipping_method),
        actual_weight: shipment.actual_weight_kg,
        volume_cbm: shipment.volume_cbm,
        chargeable_weight: shipment.chargeable_weight_kg,
        rate: shipment.rate,
        rate_type: shipment.rate_type.map(rate_type),
        currency: shipment.currency.to_string(),
        total_cost: shipment.total_cost(),
        pricing_basis: pricing_basis(shipment.cost),
        missing: missing(shipment.cost),
        current_status: shipment.current_status.clone(),
        origin: shipment.origin.clone(),
        destination: shipment.destination.clone(),
        estimated_delivery: shipment.estimated_delivery,
        actual_delivery: shipment.actual_delivery,
        created_at: shipment.created_at,
        updated_at: shipment.updated_at,
        events: details.events.iter().map(tracking_event).collect(),
    }
}

pub(crate) fn warehouse(warehouse: &Warehouse) -> WarehouseView {
    WarehouseView {
        id: warehouse.id,
        name: warehouse.name.clone(),
        kind: warehouse.kind.to_string(),
        country: warehouse.country.clone(),
        address_en: warehouse.address_en.clone(),
        address_cn: warehouse.address_cn.clone(),
        phone_1: warehouse.phone_1.clone(),
        phone_2: warehouse.phone_2.clone(),
        email: warehouse.email.clone(),
        shipping_types: warehouse
            .shipping_modes
            .iter()
            .copied()
            .map(freight_mode)
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use engine::{Currency, Quote, RateSnapshot};
    use uuid::Uuid;

    use super::*;

    fn details(valid_from: NaiveDate) -> QuoteDetails {
        let snapshot = RateSnapshot {
            shipping_method_id: Uuid::new_v4(),
            rate_type: engine::RateType::PerKg,
            rate: "12.50".parse().unwrap(),
            currency: Currency::default(),
        };
        let mut quote = Quote::new(&snapshot, Some("10".parse().unwrap()), None).unwrap();
        quote.set_validity(valid_from, 30);
        QuoteDetails {
            quote,
            shipping_method: None,
        }
    }

    #[test]
    fn quote_past_validity_renders_expired() {
        let issued = NaiveDate::from_ymd_opt(2026, 1, 1).unwrap();
        let details = details(issued);

        assert_eq!(quote_on(&details, issued).status, "draft");
        let later = NaiveDate::from_ymd_opt(2026, 3, 1).unwrap();
        assert_eq!(quote_on(&details, later).status, "expired");
    }
}
