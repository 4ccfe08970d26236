//! Domain core of the Golden Sail logistics backend.
//!
//! Pricing ([`PricingInput`], [`Priced`]) and identifier generation
//! ([`unique_identifier`]) are pure and storage-agnostic. [`Engine`] runs
//! every persisted operation inside its own database transaction.

pub use currency::Currency;
pub use error::EngineError;
pub use identifiers::{
    IdentifierKind, MAX_ATTEMPTS, generate_quote_number, generate_tracking_number,
    unique_identifier,
};
pub use notifications::{LogNotifier, Notification, Notifier, NotifyError, notify};
pub use ops::{
    DEFAULT_QUOTE_VALIDITY_DAYS, Engine, EngineBuilder, MAX_QUOTE_VALIDITY_DAYS, Page, PageRequest,
};
pub use pricing::{
    CostOutcome, MissingInput, Priced, PricingBasis, PricingInput, PricingResult, RateType,
    VOLUMETRIC_KG_PER_CBM, chargeable_weight, total_cost,
};
pub use quotes::{Quote, QuoteDetails, QuoteStatus};
pub use shipments::{
    CargoUpdate, DEFAULT_STATUS, DELIVERED_STATUS, Shipment, ShipmentDetails, ShipmentFilter,
    ShipmentNew, StatusUpdate,
};
pub use shipping_methods::{FreightMode, RateSnapshot, ShippingMethod, ShippingMethodNew};
pub use tracking_events::{TrackingEvent, TrackingEventNew};
pub use users::{User, UserRole};
pub use warehouses::{Warehouse, WarehouseKind, WarehouseNew};

mod currency;
mod error;
mod identifiers;
mod notifications;
mod ops;
mod pricing;
mod quotes;
mod shipments;
mod shipping_methods;
mod tracking_events;
mod users;
mod validation;
mod warehouses;

type ResultEngine<T> = Result<T, EngineError>;
