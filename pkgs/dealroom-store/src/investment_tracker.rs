//! Investment tracker - per-user pipeline record for each deal
//!
//! One record per (user, deal). Tracking again overwrites the record in
//! place; no history is kept. Any status may follow any other.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use sea_orm::{
    sea_query::OnConflict, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::entities::investments;
use crate::{from_millis, now_millis, DealId, Result, StoreError, UserId};

/// Pipeline stage of a tracked investment
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum InvestmentStatus {
    #[default]
    Interested,
    Researching,
    Diligence,
    Negotiating,
    Committed,
    Passed,
}

impl InvestmentStatus {
    pub const ALL: [InvestmentStatus; 6] = [
        InvestmentStatus::Interested,
        InvestmentStatus::Researching,
        InvestmentStatus::Diligence,
        InvestmentStatus::Negotiating,
        InvestmentStatus::Committed,
        InvestmentStatus::Passed,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            InvestmentStatus::Interested => "interested",
            InvestmentStatus::Researching => "researching",
            InvestmentStatus::Diligence => "diligence",
            InvestmentStatus::Negotiating => "negotiating",
            InvestmentStatus::Committed => "committed",
            InvestmentStatus::Passed => "passed",
        }
    }
}

impl fmt::Display for InvestmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for InvestmentStatus {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self> {
        InvestmentStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| StoreError::InvalidStatus(s.to_string()))
    }
}

/// Tracked investment of one user in one deal
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvestmentRecord {
    pub user_id: UserId,
    pub deal_id: DealId,
    pub status: InvestmentStatus,
    pub amount: Option<f64>,
    pub notes: String,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<investments::Model> for InvestmentRecord {
    type Error = StoreError;

    fn try_from(model: investments::Model) -> Result<Self> {
        Ok(Self {
            user_id: model.user_id,
            deal_id: model.deal_id,
            status: model.status.parse()?,
            amount: model.amount,
            notes: model.notes,
            updated_at: from_millis(model.updated_at)?,
        })
    }
}

/// Investment tracker
pub struct InvestmentTracker {
    db: DatabaseConnection,
}

impl InvestmentTracker {
    /// Create a new investment tracker
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Create or overwrite the record for (user, deal).
    ///
    /// `amount`, when present, must be a finite non-negative number.
    pub async fn track(
        &self,
        user_id: UserId,
        deal_id: DealId,
        status: InvestmentStatus,
        amount: Option<f64>,
        notes: &str,
    ) -> Result<InvestmentRecord> {
        if let Some(amount) = amount {
            if !amount.is_finite() || amount < 0.0 {
                return Err(StoreError::InvalidAmount(amount));
            }
        }

        let updated_at = now_millis();

        let record = investments::ActiveModel {
            user_id: Set(user_id),
            deal_id: Set(deal_id),
            status: Set(status.as_str().to_string()),
            amount: Set(amount),
            notes: Set(notes.to_string()),
            updated_at: Set(updated_at),
            ..Default::default()
        };

        investments::Entity::insert(record)
            .on_conflict(
                OnConflict::columns([investments::Column::UserId, investments::Column::DealId])
                    .update_columns([
                        investments::Column::Status,
                        investments::Column::Amount,
                        investments::Column::Notes,
                        investments::Column::UpdatedAt,
                    ])
                    .to_owned(),
            )
            .exec_without_returning(&self.db)
            .await?;

        info!(
            "Tracked deal {} for {} as {} ({:?})",
            deal_id, user_id, status, amount
        );

        Ok(InvestmentRecord {
            user_id,
            deal_id,
            status,
            amount,
            notes: notes.to_string(),
            updated_at: from_millis(updated_at)?,
        })
    }

    /// Get the record for (user, deal)
    pub async fn get(&self, user_id: UserId, deal_id: DealId) -> Result<Option<InvestmentRecord>> {
        investments::Entity::find()
            .filter(investments::Column::UserId.eq(user_id))
            .filter(investments::Column::DealId.eq(deal_id))
            .one(&self.db)
            .await?
            .map(InvestmentRecord::try_from)
            .transpose()
    }

    /// All records of a user keyed by deal
    pub async fn list(&self, user_id: UserId) -> Result<BTreeMap<DealId, InvestmentRecord>> {
        let records = investments::Entity::find()
            .filter(investments::Column::UserId.eq(user_id))
            .all(&self.db)
            .await?
            .into_iter()
            .map(|model| InvestmentRecord::try_from(model).map(|r| (r.deal_id, r)))
            .collect::<Result<BTreeMap<_, _>>>()?;

        debug!("User {} tracks {} deals", user_id, records.len());
        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_round_trip_through_str() {
        for status in InvestmentStatus::ALL {
            assert_eq!(status.as_str().parse::<InvestmentStatus>().unwrap(), status);
        }
    }

    #[test]
    fn test_unknown_status_rejected() {
        let err = "won".parse::<InvestmentStatus>().unwrap_err();
        assert!(matches!(err, StoreError::InvalidStatus(s) if s == "won"));
        assert!("Committed".parse::<InvestmentStatus>().is_err());
    }

    #[test]
    fn test_status_serializes_lowercase() {
        let json = serde_json::to_string(&InvestmentStatus::Diligence).unwrap();
        assert_eq!(json, "\"diligence\"");
        assert_eq!(InvestmentStatus::default(), InvestmentStatus::Interested);
    }
}
