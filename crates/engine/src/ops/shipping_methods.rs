use chrono::Utc;
use sea_orm::{QueryFilter, QueryOrder, TransactionTrait, prelude::*};

use crate::{
    EngineError, ResultEngine, ShippingMethod, ShippingMethodNew, shipping_methods,
    validation::{normalize_optional_text, normalize_required, validate_base_rate},
};

use super::{Engine, with_tx};

impl Engine {
    /// List the catalog ordered by name.
    pub async fn shipping_methods(&self, active_only: bool) -> ResultEngine<Vec<ShippingMethod>> {
        with_tx!(self, |db_tx| {
            let mut query = shipping_methods::Entity::find();
            if active_only {
                query = query.filter(shipping_methods::Column::IsActive.eq(true));
            }
            query
                .order_by_asc(shipping_methods::Column::Name)
                .all(&db_tx)
                .await?
                .into_iter()
                .map(ShippingMethod::try_from)
                .collect::<ResultEngine<Vec<_>>>()
        })
    }

    /// Return a shipping method, active or not.
    pub async fn shipping_method(&self, method_id: Uuid) -> ResultEngine<ShippingMethod> {
        with_tx!(self, |db_tx| {
            let model = shipping_methods::Entity::find_by_id(method_id)
                .one(&db_tx)
                .await?
                .ok_or_else(|| {
                    EngineError::KeyNotFound("shipping method not exists".to_string())
                })?;
            ShippingMethod::try_from(model)
        })
    }

    /// Add a method to the catalog.
    pub async fn new_shipping_method(
        &self,
        method: ShippingMethodNew,
    ) -> ResultEngine<ShippingMethod> {
        validate_base_rate(method.base_rate)?;
        if let (Some(min), Some(max)) = (method.transit_days_min, method.transit_days_max)
            && min > max
        {
            return Err(EngineError::InvalidInput(
                "transit days min must be <= max".to_string(),
            ));
        }

        let method = ShippingMethod {
            id: Uuid::new_v4(),
            name: normalize_required(&method.name, "shipping method name")?,
            mode: method.mode,
            origin: normalize_optional_text(method.origin.as_deref()),
            rate_type: method.rate_type,
            base_rate: method.base_rate,
            currency: method.currency,
            transit_days_min: method.transit_days_min,
            transit_days_max: method.transit_days_max,
            schedule: normalize_optional_text(method.schedule.as_deref()),
            restrictions: normalize_optional_text(method.restrictions.as_deref()),
            is_active: true,
            created_at: Utc::now(),
        };
        let model: shipping_methods::ActiveModel = (&method).into();

        with_tx!(self, |db_tx| {
            model.insert(&db_tx).await?;
            tracing::info!(
                method_id = %method.id,
                rate_type = %method.rate_type,
                base_rate = %method.base_rate,
                "shipping method created"
            );
            Ok(method)
        })
    }
}
