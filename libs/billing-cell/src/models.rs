use serde::{Deserialize, Serialize};

use shared_models::plan::PlanLimits;

/// What the frontend needs to know about the clinic's subscription after a
/// refresh against Stripe.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubscriptionStatus {
    pub subscribed: bool,
    pub subscription_tier: Option<String>,
    pub subscription_end: Option<String>,
    pub trial_active: bool,
    pub trial_end: Option<String>,
}

impl SubscriptionStatus {
    pub fn none() -> Self {
        Self {
            subscribed: false,
            subscription_tier: None,
            subscription_end: None,
            trial_active: false,
            trial_end: None,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct CurrentCounts {
    pub patients: i64,
    pub dentists: i64,
    pub rooms: i64,
}

/// Plan ceilings next to what the clinic is actually using, plus the
/// derived can-add flags the forms check before opening a dialog.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlanUsage {
    pub plan: String,
    pub limits: PlanLimits,
    pub current: CurrentCounts,
    pub can_add_patient: bool,
    pub can_add_dentist: bool,
    pub can_add_room: bool,
    pub online_booking: bool,
}

// Just the fields read out of Stripe's list endpoints.

#[derive(Debug, Clone, Deserialize)]
pub struct StripeList<T> {
    pub data: Vec<T>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StripeCustomer {
    pub id: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StripeSubscription {
    pub id: String,
    pub current_period_start: i64,
    pub current_period_end: i64,
    pub items: StripeSubscriptionItems,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StripeSubscriptionItems {
    pub data: Vec<StripeSubscriptionItem>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StripeSubscriptionItem {
    pub price: StripePrice,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StripePrice {
    pub unit_amount: Option<i64>,
}

impl StripeSubscription {
    /// Price-amount to tier mapping, in cents per month.
    pub fn tier(&self) -> &'static str {
        let amount = self
            .items
            .data
            .first()
            .and_then(|item| item.price.unit_amount)
            .unwrap_or(0);

        if amount <= 5000 {
            "basic"
        } else if amount <= 10000 {
            "premium"
        } else {
            "enterprise"
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn subscription(amount: i64) -> StripeSubscription {
        StripeSubscription {
            id: "sub_test".to_string(),
            current_period_start: 0,
            current_period_end: 0,
            items: StripeSubscriptionItems {
                data: vec![StripeSubscriptionItem {
                    price: StripePrice {
                        unit_amount: Some(amount),
                    },
                }],
            },
        }
    }

    #[test]
    fn test_tier_boundaries() {
        assert_eq!(subscription(5000).tier(), "basic");
        assert_eq!(subscription(5001).tier(), "premium");
        assert_eq!(subscription(10000).tier(), "premium");
        assert_eq!(subscription(15000).tier(), "enterprise");
    }
}
