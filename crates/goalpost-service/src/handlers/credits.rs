//! Credit ledger handlers.

use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};

use goalpost_core::{CreditTransaction, UserId};

use crate::error::ApiError;
use crate::state::AppState;

/// Default transaction history page size.
const DEFAULT_HISTORY_LIMIT: usize = 50;

/// Pagination parameters for the balance endpoint.
#[derive(Debug, Deserialize)]
pub struct BalanceParams {
    /// Maximum transactions to return.
    pub limit: Option<usize>,
    /// Transactions to skip.
    pub offset: Option<usize>,
}

/// Balance response with transaction history.
#[derive(Debug, Serialize)]
pub struct BalanceResponse {
    /// Current balance in minutes.
    pub balance_minutes: i64,
    /// Ledger entries, newest first.
    pub transactions: Vec<TransactionResponse>,
}

/// A ledger entry in responses.
#[derive(Debug, Serialize)]
pub struct TransactionResponse {
    /// Transaction ID (ULID).
    pub transaction_id: String,
    /// Signed amount: positive grants, negative consumption.
    pub amount_minutes: i64,
    /// Balance after this entry was applied.
    pub balance_after_minutes: i64,
    /// Human-readable description.
    pub description: String,
    /// Optional external reference.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
    /// When the entry was written.
    pub created_at: String,
}

impl From<CreditTransaction> for TransactionResponse {
    fn from(tx: CreditTransaction) -> Self {
        Self {
            transaction_id: tx.id.to_string(),
            amount_minutes: tx.amount_minutes,
            balance_after_minutes: tx.balance_after_minutes,
            description: tx.description,
            reference: tx.reference,
            created_at: tx.created_at.to_rfc3339(),
        }
    }
}

/// Admin credit grant request.
#[derive(Debug, Deserialize)]
pub struct AddCreditsRequest {
    /// User to credit.
    pub user_id: String,
    /// Minutes to grant (must be positive).
    pub amount_minutes: i64,
    /// Optional description; a default is used when absent.
    pub description: Option<String>,
    /// Optional external reference (order ID, etc.).
    pub reference: Option<String>,
}

/// Admin credit grant response.
#[derive(Debug, Serialize)]
pub struct AddCreditsResponse {
    /// Always true on success.
    pub success: bool,
    /// Balance after the grant.
    pub new_balance: i64,
    /// The ledger entry created.
    pub transaction_id: String,
}

/// Get a user's balance and recent ledger entries.
pub async fn get_balance(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
    Query(params): Query<BalanceParams>,
) -> Result<Json<BalanceResponse>, ApiError> {
    let user_id = parse_user_id(&user_id)?;

    let balance_minutes = state.ledger.balance(&user_id)?;
    let transactions = state.ledger.history(
        &user_id,
        params.limit.unwrap_or(DEFAULT_HISTORY_LIMIT),
        params.offset.unwrap_or(0),
    )?;

    Ok(Json(BalanceResponse {
        balance_minutes,
        transactions: transactions.into_iter().map(Into::into).collect(),
    }))
}

/// Grant credits to a user (admin).
pub async fn add_credits(
    State(state): State<Arc<AppState>>,
    Json(body): Json<AddCreditsRequest>,
) -> Result<Json<AddCreditsResponse>, ApiError> {
    let user_id = parse_user_id(&body.user_id)?;
    let description = body
        .description
        .unwrap_or_else(|| "Admin credit grant".into());

    let receipt = state
        .ledger
        .grant(&user_id, body.amount_minutes, &description, body.reference)?;

    Ok(Json(AddCreditsResponse {
        success: true,
        new_balance: receipt.new_balance_minutes,
        transaction_id: receipt.transaction.id.to_string(),
    }))
}

pub(crate) fn parse_user_id(raw: &str) -> Result<UserId, ApiError> {
    raw.parse()
        .map_err(|_| ApiError::BadRequest("Invalid user ID".into()))
}
