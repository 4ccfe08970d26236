use sea_orm::DatabaseConnection;

use crate::{PricingResult, ResultEngine};

mod quotes;
mod shipments;
mod shipping_methods;
mod users;
mod warehouses;

/// Days a persisted quote stays valid unless configured otherwise.
pub const DEFAULT_QUOTE_VALIDITY_DAYS: i64 = 30;

/// Longest validity a quote can be configured with (ten years).
pub const MAX_QUOTE_VALIDITY_DAYS: i64 = 3650;

/// Run a block inside a DB transaction, committing on success and rolling back on error.
macro_rules! with_tx {
    ($self:expr, |$tx:ident| $body:expr) => {{
        let $tx = $self.database.begin().await?;
        let result = $body;
        match result {
            Ok(value) => {
                $tx.commit().await?;
                Ok(value)
            }
            Err(err) => Err(err),
        }
    }};
}

pub(crate) use with_tx;

#[derive(Debug)]
pub struct Engine {
    database: DatabaseConnection,
    quote_validity_days: i64,
}

impl Engine {
    /// Return a builder for `Engine`. Help to build the struct.
    pub fn builder() -> EngineBuilder {
        EngineBuilder::default()
    }

    #[must_use]
    pub fn quote_validity_days(&self) -> i64 {
        self.quote_validity_days
    }
}

/// Emit the diagnostic events of a pricing run.
fn trace_pricing(record: &str, number: Option<&str>, result: &PricingResult) {
    let number = number.unwrap_or("-");
    match (result.total_cost(), result.cost.missing()) {
        (Some(total), _) if result.used_fallback() => tracing::warn!(
            record,
            number,
            %total,
            "rate type unknown, priced per kg"
        ),
        (Some(total), _) => tracing::debug!(
            record,
            number,
            chargeable_weight_kg = ?result.chargeable_weight_kg,
            %total,
            basis = result.basis().map(|b| b.as_str()).unwrap_or("-"),
            "priced"
        ),
        (None, missing) => tracing::warn!(
            record,
            number,
            missing = missing.map(|m| m.as_str()).unwrap_or("-"),
            "insufficient pricing input"
        ),
    }
}

/// 1-based page request.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u64,
    pub per_page: u64,
}

impl PageRequest {
    pub const DEFAULT_PER_PAGE: u64 = 20;
    pub const MAX_PER_PAGE: u64 = 100;

    /// Pages below 1 become 1, `per_page` is clamped to `1..=100`.
    #[must_use]
    pub fn new(page: Option<u64>, per_page: Option<u64>) -> Self {
        Self {
            page: page.unwrap_or(1).max(1),
            per_page: per_page
                .unwrap_or(Self::DEFAULT_PER_PAGE)
                .clamp(1, Self::MAX_PER_PAGE),
        }
    }

    /// Zero-based index for sea-orm's paginator.
    fn index(self) -> u64 {
        self.page - 1
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::new(None, None)
    }
}

/// One page of results.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub pages: u64,
    pub current_page: u64,
}

impl<T> Page<T> {
    fn new(items: Vec<T>, total: u64, request: PageRequest) -> Self {
        Self {
            items,
            total,
            pages: total.div_ceil(request.per_page),
            current_page: request.page,
        }
    }
}

/// The builder for `Engine`
#[derive(Default)]
pub struct EngineBuilder {
    database: DatabaseConnection,
    quote_validity_days: Option<i64>,
}

impl EngineBuilder {
    /// Pass the required database
    pub fn database(mut self, db: DatabaseConnection) -> EngineBuilder {
        self.database = db;
        self
    }

    /// Days a new quote stays valid. Defaults to 30.
    pub fn quote_validity_days(mut self, days: i64) -> EngineBuilder {
        self.quote_validity_days = Some(days);
        self
    }

    /// Construct `Engine`
    pub async fn build(self) -> ResultEngine<Engine> {
        let quote_validity_days = self
            .quote_validity_days
            .unwrap_or(DEFAULT_QUOTE_VALIDITY_DAYS);
        if !(0..=MAX_QUOTE_VALIDITY_DAYS).contains(&quote_validity_days) {
            return Err(crate::EngineError::InvalidInput(format!(
                "quote validity must be between 0 and {MAX_QUOTE_VALIDITY_DAYS} days"
            )));
        }
        Ok(Engine {
            database: self.database,
            quote_validity_days,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_request_is_clamped() {
        assert_eq!(PageRequest::new(None, None), PageRequest { page: 1, per_page: 20 });
        assert_eq!(
            PageRequest::new(Some(0), Some(0)),
            PageRequest { page: 1, per_page: 1 }
        );
        assert_eq!(
            PageRequest::new(Some(3), Some(500)),
            PageRequest { page: 3, per_page: 100 }
        );
    }

    #[tokio::test]
    async fn quote_validity_is_bounded() {
        for days in [-1, MAX_QUOTE_VALIDITY_DAYS + 1, 9_999_999_999_999] {
            let err = Engine::builder()
                .quote_validity_days(days)
                .build()
                .await
                .err();
            assert!(
                matches!(err, Some(crate::EngineError::InvalidInput(_))),
                "{days} days accepted"
            );
        }
        for days in [0, DEFAULT_QUOTE_VALIDITY_DAYS, MAX_QUOTE_VALIDITY_DAYS] {
            assert!(Engine::builder().quote_validity_days(days).build().await.is_ok());
        }
    }

    #[test]
    fn page_counts() {
        let request = PageRequest::new(Some(2), Some(20));
        let page = Page::new(vec![1, 2], 41, request);
        assert_eq!(page.pages, 3);
        assert_eq!(page.current_page, 2);
        assert_eq!(Page::<u8>::new(vec![], 0, request).pages, 0);
    }
}
