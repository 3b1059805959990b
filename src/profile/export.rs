//! Exports the user's transactions as a CSV file.

use std::sync::Arc;

use axum::{
    Extension,
    body::Bytes,
    extract::{FromRef, State},
    http::header::{CONTENT_DISPOSITION, CONTENT_TYPE},
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use time::{OffsetDateTime, format_description::well_known::Rfc3339};

use crate::{
    AppState, Error, UserID,
    stores::{SortOrder, TransactionQuery, TransactionStore},
    timezone::local_now,
    transaction::Transaction,
};

const CSV_FORMAT: &str = "csv";
const CSV_HEADER: [&str; 5] = ["Date", "Description", "Category", "Type", "Amount"];

/// The state needed to export transactions.
#[derive(Debug, Clone)]
pub struct ExportState {
    /// The store for reading the user's transactions.
    pub transaction_store: Arc<dyn TransactionStore>,
    /// The local timezone as a canonical timezone name, e.g. "Pacific/Auckland".
    pub local_timezone: String,
}

impl FromRef<AppState> for ExportState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            transaction_store: state.transaction_store.clone(),
            local_timezone: state.local_timezone.clone(),
        }
    }
}

/// The request body for exporting data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportData {
    /// The file format. Only "csv" is supported.
    #[serde(default = "default_format")]
    pub format: String,
}

impl Default for ExportData {
    fn default() -> Self {
        Self {
            format: default_format(),
        }
    }
}

fn default_format() -> String {
    CSV_FORMAT.to_owned()
}

impl ExportData {
    /// Parse the request body, treating an empty body as a request for CSV.
    fn from_body(body: &[u8]) -> Result<Self, Error> {
        if body.iter().all(u8::is_ascii_whitespace) {
            return Ok(Self::default());
        }

        serde_json::from_slice(body).map_err(|error| Error::InvalidRequest(error.to_string()))
    }
}

/// The name of the export file for the month of `now`, e.g. "transactions-2024-03.csv".
pub fn export_file_name(now: OffsetDateTime) -> String {
    format!("transactions-{}-{:02}.csv", now.year(), u8::from(now.month()))
}

/// Write `transactions` as CSV with a `Date,Description,Category,Type,Amount` header.
///
/// Rows are written in the order given. Fields containing commas or quotes are quoted.
///
/// # Errors
/// Returns [Error::CsvError] if a row cannot be written.
pub fn write_transactions_csv(transactions: &[Transaction]) -> Result<Vec<u8>, Error> {
    let mut writer = csv::Writer::from_writer(vec![]);
    writer.write_record(CSV_HEADER).map_err(csv_error)?;

    for transaction in transactions {
        let date = transaction
            .occurred_at
            .format(&Rfc3339)
            .map_err(|error| Error::CsvError(error.to_string()))?;

        writer
            .write_record([
                date.as_str(),
                transaction.description.as_str(),
                transaction.category.as_str(),
                transaction.kind.as_str(),
                transaction.amount.to_string().as_str(),
            ])
            .map_err(csv_error)?;
    }

    writer
        .into_inner()
        .map_err(|error| Error::CsvError(error.to_string()))
}

fn csv_error(error: csv::Error) -> Error {
    Error::CsvError(error.to_string())
}

fn export(state: &ExportState, user_id: UserID, body: &[u8]) -> Result<Response, Error> {
    let data = ExportData::from_body(body)?;
    if data.format != CSV_FORMAT {
        return Err(Error::UnsupportedExportFormat(data.format));
    }

    let now = local_now(&state.local_timezone)?;
    let transactions = state.transaction_store.get_query(
        user_id,
        &TransactionQuery {
            sort_date: Some(SortOrder::Ascending),
            ..Default::default()
        },
    )?;
    let csv = write_transactions_csv(&transactions)?;
    tracing::debug!(
        "Exported {} transactions for user {user_id}",
        transactions.len()
    );

    Ok((
        [
            (CONTENT_TYPE, "text/csv".to_owned()),
            (
                CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", export_file_name(now)),
            ),
        ],
        csv,
    )
        .into_response())
}

/// A route handler for downloading all of the user's transactions, oldest first.
///
/// The body may be empty or `{"format": "csv"}`.
pub async fn export_transactions(
    State(state): State<ExportState>,
    Extension(user_id): Extension<UserID>,
    body: Bytes,
) -> Response {
    export(&state, user_id, &body).unwrap_or_else(|error| error.into_response())
}
