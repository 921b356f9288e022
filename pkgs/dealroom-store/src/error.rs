//! Error types for storage operations

use sea_orm::DbErr;
use thiserror::Error;

use crate::{DealId, UserId};

pub type Result<T> = std::result::Result<T, StoreError>;

/// Errors that can occur in storage operations
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
    #[error("Deal {deal_id} is already in the watchlist of user {user_id}")]
    AlreadyInWatchlist { user_id: UserId, deal_id: DealId },
    #[error("Invalid investment status: {0}")]
    InvalidStatus(String),
    #[error("Invalid investment amount: {0}")]
    InvalidAmount(f64),
    #[error("Corrupt record: {0}")]
    Corrupt(String),
    #[error("Configuration error: {0}")]
    Config(String),
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
