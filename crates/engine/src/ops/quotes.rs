use std::collections::HashMap;

use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{
    DatabaseTransaction, PaginatorTrait, QueryFilter, QueryOrder, TransactionTrait, prelude::*,
};

use crate::{
    EngineError, IdentifierKind, Priced, Quote, QuoteDetails, ResultEngine, ShippingMethod,
    quotes, shipping_methods, unique_identifier,
};

use super::{Engine, Page, PageRequest, trace_pricing, with_tx};

impl Engine {
    /// Price cargo against an active method without saving anything.
    pub async fn calculate_quote(
        &self,
        method_id: Uuid,
        actual_weight_kg: Option<Decimal>,
        volume_cbm: Option<Decimal>,
    ) -> ResultEngine<QuoteDetails> {
        with_tx!(self, |db_tx| {
            let method = require_active_method(&db_tx, method_id).await?;
            let quote = Quote::new(&method.snapshot(), actual_weight_kg, volume_cbm)?;
            trace_pricing("quote", None, &quote.pricing_input().compute());
            Ok(QuoteDetails {
                quote,
                shipping_method: Some(method),
            })
        })
    }

    /// Price and persist a draft quote with a fresh quote number.
    pub async fn create_quote(
        &self,
        user_id: Uuid,
        method_id: Uuid,
        actual_weight_kg: Option<Decimal>,
        volume_cbm: Option<Decimal>,
    ) -> ResultEngine<QuoteDetails> {
        let today = Utc::now().date_naive();
        with_tx!(self, |db_tx| {
            let method = require_active_method(&db_tx, method_id).await?;
            let mut quote = Quote::new(&method.snapshot(), actual_weight_kg, volume_cbm)?;

            let conn = &db_tx;
            let number = unique_identifier(IdentifierKind::QuoteNumber, move |candidate| async move {
                Ok::<_, EngineError>(
                    quotes::Entity::find()
                        .filter(quotes::Column::QuoteNumber.eq(candidate))
                        .one(conn)
                        .await?
                        .is_some(),
                )
            })
            .await?;
            quote.quote_number = Some(number);
            quote.user_id = Some(user_id);
            quote.set_validity(today, self.quote_validity_days);

            let model = quotes::ActiveModel::try_from(&quote)?;
            model.insert(&db_tx).await?;
            trace_pricing(
                "quote",
                quote.quote_number.as_deref(),
                &quote.pricing_input().compute(),
            );

            Ok(QuoteDetails {
                quote,
                shipping_method: Some(method),
            })
        })
    }

    /// Look a quote up by number, case-insensitively.
    pub async fn quote_by_number(&self, quote_number: &str) -> ResultEngine<QuoteDetails> {
        let quote_number = quote_number.trim().to_uppercase();
        with_tx!(self, |db_tx| {
            let model = quotes::Entity::find()
                .filter(quotes::Column::QuoteNumber.eq(quote_number))
                .one(&db_tx)
                .await?
                .ok_or_else(|| EngineError::KeyNotFound("quote not exists".to_string()))?;
            let quote = Quote::try_from(model)?;
            let shipping_method = match quote.shipping_method_id {
                Some(id) => shipping_methods::Entity::find_by_id(id)
                    .one(&db_tx)
                    .await?
                    .map(ShippingMethod::try_from)
                    .transpose()?,
                None => None,
            };
            Ok(QuoteDetails {
                quote,
                shipping_method,
            })
        })
    }

    /// A user's quotes, newest first.
    pub async fn quotes_for_user(
        &self,
        user_id: Uuid,
        request: PageRequest,
    ) -> ResultEngine<Page<QuoteDetails>> {
        with_tx!(self, |db_tx| {
            let paginator = quotes::Entity::find()
                .filter(quotes::Column::UserId.eq(user_id))
                .order_by_desc(quotes::Column::CreatedAt)
                .paginate(&db_tx, request.per_page);
            let total = paginator.num_items().await?;
            let models = paginator.fetch_page(request.index()).await?;

            let method_ids: Vec<Uuid> = models
                .iter()
                .filter_map(|model| model.shipping_method_id)
                .collect();
            let methods = methods_by_id(&db_tx, method_ids).await?;

            let items = models
                .into_iter()
                .map(|model| {
                    let quote = Quote::try_from(model)?;
                    let shipping_method = quote
                        .shipping_method_id
                        .and_then(|id| methods.get(&id).cloned());
                    Ok(QuoteDetails {
                        quote,
                        shipping_method,
                    })
                })
                .collect::<ResultEngine<Vec<_>>>()?;
            Ok(Page::new(items, total, request))
        })
    }
}

/// Load an active shipping method or fail with `KeyNotFound`.
pub(super) async fn require_active_method(
    db_tx: &DatabaseTransaction,
    method_id: Uuid,
) -> ResultEngine<ShippingMethod> {
    let model = shipping_methods::Entity::find_by_id(method_id)
        .one(db_tx)
        .await?
        .filter(|model| model.is_active)
        .ok_or_else(|| EngineError::KeyNotFound("shipping method not exists".to_string()))?;
    ShippingMethod::try_from(model)
}

pub(super) async fn methods_by_id(
    db_tx: &DatabaseTransaction,
    ids: Vec<Uuid>,
) -> ResultEngine<HashMap<Uuid, ShippingMethod>> {
    if ids.is_empty() {
        return Ok(HashMap::new());
    }
    let mut methods = HashMap::new();
    for model in shipping_methods::Entity::find()
        .filter(shipping_methods::Column::Id.is_in(ids))
        .all(db_tx)
        .await?
    {
        let method = ShippingMethod::try_from(model)?;
        methods.insert(method.id, method);
    }
    Ok(methods)
}
