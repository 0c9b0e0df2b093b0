//! Subscription domain model.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, SubsecRound, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::TenancyError;

/// Fractional-second digits kept by the period columns.
const PERIOD_PRECISION: u16 = 3;

/// Plan of a subscription. Stored as lowercase text in `subscriptions.type`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubscriptionType {
    Free,
    Paid,
}

impl SubscriptionType {
    /// Every value accepted by the `type` column.
    pub const ALL: [SubscriptionType; 2] = [SubscriptionType::Free, SubscriptionType::Paid];

    pub fn as_str(&self) -> &'static str {
        match self {
            SubscriptionType::Free => "free",
            SubscriptionType::Paid => "paid",
        }
    }
}

impl fmt::Display for SubscriptionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SubscriptionType {
    type Err = TenancyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "free" => Ok(SubscriptionType::Free),
            "paid" => Ok(SubscriptionType::Paid),
            other => Err(TenancyError::Validation {
                message: format!("unknown subscription type: {other}"),
            }),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subscription {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: SubscriptionType,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
    pub current_period_start: DateTime<Utc>,
    pub current_period_end: DateTime<Utc>,
    pub tenant_id: Uuid,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateSubscription {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: SubscriptionType,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
    pub current_period_start: DateTime<Utc>,
    pub current_period_end: DateTime<Utc>,
    pub tenant_id: Uuid,
}

impl CreateSubscription {
    /// The billing period must end strictly after it starts.
    pub fn validate(&self) -> Result<(), TenancyError> {
        validate_period(self.current_period_start, self.current_period_end)
    }
}

/// Fields that can be changed on an existing subscription.
/// `updated_at` is stamped by the repository.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateSubscription {
    #[serde(rename = "type")]
    pub kind: Option<SubscriptionType>,
    pub current_period_start: Option<DateTime<Utc>>,
    pub current_period_end: Option<DateTime<Utc>>,
}

impl UpdateSubscription {
    /// Applies the update to `current` and checks the resulting period.
    pub fn apply_to(&self, current: &Subscription) -> Result<Subscription, TenancyError> {
        let start = self
            .current_period_start
            .unwrap_or(current.current_period_start);
        let end = self.current_period_end.unwrap_or(current.current_period_end);
        validate_period(start, end)?;

        Ok(Subscription {
            kind: self.kind.unwrap_or(current.kind),
            current_period_start: start,
            current_period_end: end,
            ..current.clone()
        })
    }
}

/// Bounds are compared at column precision, as they will be stored.
fn validate_period(start: DateTime<Utc>, end: DateTime<Utc>) -> Result<(), TenancyError> {
    if end.trunc_subsecs(PERIOD_PRECISION) <= start.trunc_subsecs(PERIOD_PRECISION) {
        return Err(TenancyError::Validation {
            message: format!("current_period_end ({end}) must be after current_period_start ({start})"),
        });
    }
    Ok(())
}
