use chrono::Utc;
use sea_orm::{QueryFilter, QueryOrder, TransactionTrait, prelude::*};

use crate::{
    FreightMode, ResultEngine, Warehouse, WarehouseNew,
    validation::{normalize_email, normalize_optional_text, normalize_required},
    warehouses,
};

use super::{Engine, with_tx};

impl Engine {
    /// Active locations, optionally restricted to a country and to those
    /// handling a freight mode.
    pub async fn warehouses(
        &self,
        country: Option<&str>,
        mode: Option<FreightMode>,
    ) -> ResultEngine<Vec<Warehouse>> {
        let country = normalize_optional_text(country);
        with_tx!(self, |db_tx| {
            let mut query =
                warehouses::Entity::find().filter(warehouses::Column::IsActive.eq(true));
            if let Some(country) = country {
                query = query.filter(warehouses::Column::Country.eq(country));
            }
            let found = query
                .order_by_asc(warehouses::Column::CreatedAt)
                .all(&db_tx)
                .await?
                .into_iter()
                .map(Warehouse::try_from)
                .collect::<ResultEngine<Vec<_>>>()?;

            Ok(match mode {
                Some(mode) => found.into_iter().filter(|w| w.handles(mode)).collect(),
                None => found,
            })
        })
    }

    /// Add a location.
    pub async fn new_warehouse(&self, warehouse: WarehouseNew) -> ResultEngine<Warehouse> {
        let email = match normalize_optional_text(warehouse.email.as_deref()) {
            Some(email) => Some(normalize_email(&email)?),
            None => None,
        };
        let warehouse = Warehouse {
            id: Uuid::new_v4(),
            name: normalize_required(&warehouse.name, "warehouse name")?,
            kind: warehouse.kind,
            country: normalize_optional_text(warehouse.country.as_deref()),
            address_en: normalize_optional_text(warehouse.address_en.as_deref()),
            address_cn: normalize_optional_text(warehouse.address_cn.as_deref()),
            phone_1: normalize_optional_text(warehouse.phone_1.as_deref()),
            phone_2: normalize_optional_text(warehouse.phone_2.as_deref()),
            email,
            shipping_modes: warehouse.shipping_modes,
            is_active: true,
            created_at: Utc::now(),
        };
        let model: warehouses::ActiveModel = (&warehouse).into();

        with_tx!(self, |db_tx| {
            model.insert(&db_tx).await?;
            Ok(warehouse)
        })
    }
}
