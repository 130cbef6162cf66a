use std::sync::Arc;
use std::time::Duration;

use chrono::{Days, Local};
use tracing::info;

use cargolink_domain::id::ShipperId;

use crate::domain::repository::Storage;
use crate::domain::types::{Load, LoadSearch, NewLoad, Shipper, rupees};
use crate::error::ChatServiceError;
use crate::jobs::deferred::{DeferredMessage, DeferredQueue};

/// `chennai` → `Chennai`, `NEW DELHI` → `New Delhi`.
pub fn title_case(raw: &str) -> String {
    raw.split_whitespace()
        .map(|word| {
            let lower = word.to_lowercase();
            let mut chars = lower.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[derive(Debug, Clone)]
pub struct PostLoadInput {
    pub from_city: String,
    pub to_city: String,
    pub material: String,
    pub weight: f64,
    pub price: f64,
}

// ── PostLoadUseCase ──────────────────────────────────────────────────────────

pub struct PostLoadUseCase<S: Storage> {
    pub store: Arc<S>,
    pub deferred: DeferredQueue,
}

impl<S: Storage> PostLoadUseCase<S> {
    /// Publish a load for `shipper`, loading tomorrow, any vehicle type.
    ///
    /// Every available trucker gets a match notification through the deferred queue.
    pub async fn execute(
        &self,
        shipper: &Shipper,
        input: PostLoadInput,
    ) -> Result<Load, ChatServiceError> {
        let positive = |v: f64| v.is_finite() && v > 0.0;
        if !positive(input.weight) || !positive(input.price) {
            return Err(ChatServiceError::Validation(
                "Weight and price must be positive numbers.\n\nExample: POST Chennai Bangalore Electronics 15 35000"
                    .to_owned(),
            ));
        }
        let loading_date = Local::now()
            .date_naive()
            .checked_add_days(Days::new(1))
            .ok_or_else(|| anyhow::anyhow!("loading date out of range"))?;

        let load = self
            .store
            .create_load(NewLoad {
                shipper_id: shipper.id,
                shipper_name: shipper.company_name.clone(),
                shipper_phone: shipper.phone.clone(),
                from_city: title_case(&input.from_city),
                to_city: title_case(&input.to_city),
                material: title_case(&input.material),
                weight: input.weight,
                vehicle_type: "Any".to_owned(),
                price: input.price,
                loading_date,
            })
            .await?;
        info!(load_id = %load.id, shipper_id = %shipper.id, route = %load.route(), "load posted");

        let truckers = self.store.list_available_truckers().await?;
        for trucker in &truckers {
            self.deferred.schedule(
                Duration::ZERO,
                DeferredMessage::template(
                    &trucker.phone,
                    "load_match_notification",
                    vec![
                        ("route", load.route()),
                        ("price", rupees(load.price)),
                        ("load_id", load.id.to_string()),
                    ],
                ),
            );
        }
        info!(load_id = %load.id, notified = truckers.len(), "load match notifications queued");
        Ok(load)
    }
}

// ── Queries ──────────────────────────────────────────────────────────────────

pub struct LoadQueries<S: Storage> {
    pub store: Arc<S>,
}

impl<S: Storage> LoadQueries<S> {
    pub async fn search(&self, search: &LoadSearch) -> Result<Vec<Load>, ChatServiceError> {
        self.store.search_loads(search).await
    }

    pub async fn by_shipper(&self, shipper_id: ShipperId) -> Result<Vec<Load>, ChatServiceError> {
        self.store.list_loads_by_shipper(shipper_id).await
    }
}
