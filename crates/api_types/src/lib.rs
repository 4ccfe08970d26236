//! Request and response bodies of the Golden Sail HTTP API.
//!
//! Decimal values (weights, volumes, rates, costs) are serialized as strings
//! and accepted either as strings or as JSON numbers.
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FreightMode {
    Air,
    Sea,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RateType {
    PerKg,
    PerCbm,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Customer,
    Staff,
    Admin,
}

/// Paging parameters shared by the list endpoints.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct PageQuery {
    pub page: Option<u64>,
    pub per_page: Option<u64>,
    /// Only honoured by shipment listings.
    pub status: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Health {
    pub status: String,
}

pub mod auth {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct RegisterRequest {
        pub email: String,
        pub password: String,
        pub full_name: String,
        pub phone: Option<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct LoginRequest {
        pub email: String,
        pub password: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct RefreshRequest {
        pub refresh_token: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct UserView {
        pub id: Uuid,
        pub email: String,
        pub full_name: String,
        pub phone: Option<String>,
        pub role: Role,
        pub is_active: bool,
        pub created_at: DateTime<Utc>,
    }

    /// Returned by register and login.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct AuthResponse {
        pub user: UserView,
        pub access_token: String,
        pub refresh_token: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct AccessToken {
        pub access_token: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct Me {
        pub user: UserView,
    }
}

pub mod shipping_method {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ShippingMethodView {
        pub id: Uuid,
        pub name: String,
        #[serde(rename = "type")]
        pub mode: FreightMode,
        pub origin: Option<String>,
        pub rate_type: RateType,
        pub base_rate: Decimal,
        pub currency: String,
        /// `"3-5 days"` style range, when both bounds are known.
        pub transit_days: Option<String>,
        pub transit_days_min: Option<i32>,
        pub transit_days_max: Option<i32>,
        pub schedule: Option<String>,
        pub restrictions: Option<String>,
    }
}

pub mod quote {
    use super::*;
    use crate::shipping_method::ShippingMethodView;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct QuoteRequest {
        pub shipping_method_id: Uuid,
        pub actual_weight: Option<Decimal>,
        pub volume_cbm: Option<Decimal>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct QuoteView {
        pub id: Uuid,
        /// Absent on quotes that were only calculated.
        pub quote_number: Option<String>,
        pub shipping_method: Option<ShippingMethodView>,
        pub actual_weight: Option<Decimal>,
        pub volume_cbm: Option<Decimal>,
        pub chargeable_weight: Option<Decimal>,
        pub rate: Option<Decimal>,
        pub rate_type: Option<RateType>,
        pub currency: String,
        pub total_cost: Option<Decimal>,
        /// `per_kg`, `per_cbm` or `default_per_kg`.
        pub pricing_basis: Option<String>,
        /// Measurement the total could not be computed without.
        pub missing: Option<String>,
        pub status: String,
        pub valid_until: Option<NaiveDate>,
        pub created_at: DateTime<Utc>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct QuoteResponse {
        pub quote: QuoteView,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct QuoteList {
        pub quotes: Vec<QuoteView>,
        pub total: u64,
        pub pages: u64,
        pub current_page: u64,
    }
}

pub mod tracking {
    use super::*;
    use crate::shipping_method::ShippingMethodView;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct TrackingSearch {
        pub tracking_number: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct TrackingEventView {
        pub id: Uuid,
        pub event_type: String,
        pub location: Option<String>,
        pub description: Option<String>,
        pub is_current: bool,
        pub event_time: DateTime<Utc>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ShipmentView {
        pub id: Uuid,
        pub tracking_number: String,
        pub consignment_number: Option<String>,
        pub description: Option<String>,
        pub cartons: Option<i32>,
        pub shipping_method: Option<ShippingMethodView>,
        pub actual_weight: Option<Decimal>,
        pub volume_cbm: Option<Decimal>,
        pub chargeable_weight: Option<Decimal>,
        pub rate: Option<Decimal>,
        pub rate_type: Option<RateType>,
        pub currency: String,
        pub total_cost: Option<Decimal>,
        pub pricing_basis: Option<String>,
        pub missing: Option<String>,
        pub current_status: String,
        pub origin: Option<String>,
        pub destination: Option<String>,
        pub estimated_delivery: Option<NaiveDate>,
        pub actual_delivery: Option<NaiveDate>,
        pub created_at: DateTime<Utc>,
        pub updated_at: DateTime<Utc>,
        pub events: Vec<TrackingEventView>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ShipmentResponse {
        pub shipment: ShipmentView,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ShipmentList {
        pub shipments: Vec<ShipmentView>,
        pub total: u64,
        pub pages: u64,
        pub current_page: u64,
    }
}

pub mod admin {
    use super::*;

    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct ShipmentCreate {
        pub user_id: Option<Uuid>,
        pub shipping_method_id: Option<Uuid>,
        pub consignment_number: Option<String>,
        pub description: Option<String>,
        pub cartons: Option<i32>,
        pub actual_weight: Option<Decimal>,
        pub volume_cbm: Option<Decimal>,
        /// Overrides the method's base rate.
        pub rate: Option<Decimal>,
        pub currency: Option<String>,
        pub status: Option<String>,
        pub origin: Option<String>,
        pub destination: Option<String>,
        pub estimated_delivery: Option<NaiveDate>,
    }

    /// A new status, a new tracking event, or both.
    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct StatusUpdate {
        pub status: Option<String>,
        pub event_type: Option<String>,
        pub location: Option<String>,
        pub description: Option<String>,
        #[serde(default)]
        pub is_current: bool,
    }

    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct CargoUpdate {
        pub actual_weight: Option<Decimal>,
        pub volume_cbm: Option<Decimal>,
        pub cartons: Option<i32>,
        pub description: Option<String>,
        pub consignment_number: Option<String>,
    }
}

pub mod warehouse {
    use super::*;

    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct WarehouseQuery {
        pub country: Option<String>,
        pub shipping_type: Option<FreightMode>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct WarehouseView {
        pub id: Uuid,
        pub name: String,
        #[serde(rename = "type")]
        pub kind: String,
        pub country: Option<String>,
        pub address_en: Option<String>,
        pub address_cn: Option<String>,
        pub phone_1: Option<String>,
        pub phone_2: Option<String>,
        pub email: Option<String>,
        pub shipping_types: Vec<FreightMode>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct WarehouseList {
        pub warehouses: Vec<WarehouseView>,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decimals_accept_numbers_and_strings() {
        let request: quote::QuoteRequest = serde_json::from_str(
            r#"{"shipping_method_id":"6f1c1f7e-4a5b-4c1d-9a43-0d2f4a8b9c10","actual_weight":10,"volume_cbm":"0.1"}"#,
        )
        .unwrap();
        assert_eq!(request.actual_weight, Some(Decimal::new(10, 0)));
        assert_eq!(request.volume_cbm, Some(Decimal::new(1, 1)));
    }

    #[test]
    fn status_update_defaults() {
        let update: admin::StatusUpdate = serde_json::from_str(r#"{"status":"in_transit"}"#).unwrap();
        assert_eq!(update.status.as_deref(), Some("in_transit"));
        assert!(update.event_type.is_none());
        assert!(!update.is_current);
    }
}
