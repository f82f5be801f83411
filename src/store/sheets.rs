//! Google Sheets implementation of the ledger and goal stores
//!
//! Thin consumer of the spreadsheets.values REST API: append for new
//! rows, a full range read for queries, and a single cell for the goal.
//! Credential management (token refresh, service accounts) is out of
//! scope; a bearer token is supplied via configuration.

use chrono::NaiveDateTime;
use serde::Deserialize;
use serde_json::json;
use tracing::{error, warn};

use crate::error::AssistantError;
use crate::http;
use crate::models::{Transaction, TransactionKind};
use crate::Result;

use super::{GoalStore, LedgerStore};

/// Ledger columns, header row included, live in A:E of the first sheet.
const LEDGER_RANGE: &str = "A:E";
/// The spending goal lives in a single cell next to the ledger.
const GOAL_CELL: &str = "F1";

const DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

const COL_DATE: &str = "Data";
const COL_AMOUNT: &str = "Valor";
const COL_KIND: &str = "Tipo";
const COL_CATEGORY: &str = "Categoria";
const COL_DESCRIPTION: &str = "Descrição";

pub struct SheetsStore {
    client: reqwest::Client,
    base_url: String,
    spreadsheet_id: String,
    access_token: String,
}

impl SheetsStore {
    pub fn new(
        base_url: String,
        spreadsheet_id: String,
        access_token: String,
    ) -> crate::Result<Self> {
        Ok(Self {
            client: http::build_client()?,
            base_url,
            spreadsheet_id,
            access_token,
        })
    }

    fn values_url(&self, range: &str) -> String {
        format!(
            "{}/v4/spreadsheets/{}/values/{}",
            self.base_url, self.spreadsheet_id, range
        )
    }

    async fn fetch_range(&self, range: &str) -> Result<ValueRange> {
        let request = self
            .client
            .get(self.values_url(range))
            .bearer_auth(&self.access_token);

        let response = http::send_with_retry(request).await.map_err(|e| {
            error!("Sheets read failed: {}", e);
            AssistantError::StoreError(format!("Sheets read failed: {}", e))
        })?;

        if !response.status().is_success() {
            let status = response.status();
            error!("Sheets read returned {}", status);
            return Err(AssistantError::StoreError(format!(
                "Sheets API returned {}",
                status
            )));
        }

        Ok(response.json::<ValueRange>().await?)
    }
}

#[async_trait::async_trait]
impl LedgerStore for SheetsStore {
    async fn append(&self, tx: &Transaction) -> Result<()> {
        let url = format!(
            "{}:append?valueInputOption=USER_ENTERED",
            self.values_url(LEDGER_RANGE)
        );

        let body = json!({
            "values": [[
                tx.timestamp.format(DATE_FORMAT).to_string(),
                tx.amount,
                tx.kind.label(),
                tx.category,
                tx.description,
            ]]
        });

        let request = self
            .client
            .post(&url)
            .bearer_auth(&self.access_token)
            .json(&body);

        let response = http::send_with_retry(request).await.map_err(|e| {
            error!("Sheets append failed: {}", e);
            AssistantError::StoreError(format!("Sheets append failed: {}", e))
        })?;

        if !response.status().is_success() {
            let status = response.status();
            error!("Sheets append returned {}", status);
            return Err(AssistantError::StoreError(format!(
                "Sheets API returned {}",
                status
            )));
        }

        Ok(())
    }

    async fn all(&self) -> Result<Vec<Transaction>> {
        let range = self.fetch_range(LEDGER_RANGE).await?;
        Ok(parse_records(range.values))
    }
}

#[async_trait::async_trait]
impl GoalStore for SheetsStore {
    async fn read_goal(&self) -> Result<Option<f64>> {
        let range = self.fetch_range(GOAL_CELL).await?;

        let cell = range
            .values
            .first()
            .and_then(|row| row.first())
            .map(cell_to_string)
            .unwrap_or_default();

        if cell.trim().is_empty() {
            return Ok(None);
        }

        match cell.trim().parse::<f64>() {
            Ok(value) => Ok(Some(value)),
            Err(_) => {
                warn!("Goal cell holds a non-numeric value: {:?}", cell);
                Ok(None)
            }
        }
    }

    async fn write_goal(&self, value: f64) -> Result<()> {
        let url = format!(
            "{}?valueInputOption=USER_ENTERED",
            self.values_url(GOAL_CELL)
        );

        let body = json!({ "values": [[value.to_string()]] });

        let request = self
            .client
            .put(&url)
            .bearer_auth(&self.access_token)
            .json(&body);

        let response = http::send_with_retry(request).await.map_err(|e| {
            error!("Goal write failed: {}", e);
            AssistantError::StoreError(format!("Goal write failed: {}", e))
        })?;

        if !response.status().is_success() {
            let status = response.status();
            error!("Goal write returned {}", status);
            return Err(AssistantError::StoreError(format!(
                "Sheets API returned {}",
                status
            )));
        }

        Ok(())
    }
}

/// spreadsheets.values wire shape. Cells arrive as strings under the
/// default FORMATTED_VALUE rendering, but numbers are tolerated.
#[derive(Debug, Deserialize)]
struct ValueRange {
    #[serde(default)]
    values: Vec<Vec<serde_json::Value>>,
}

fn cell_to_string(cell: &serde_json::Value) -> String {
    match cell {
        serde_json::Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Map the raw grid into transactions. The first row is the header;
/// columns are located by name so column order in the sheet is free.
/// Rows that fail to parse are skipped with a warning rather than
/// poisoning the whole query.
fn parse_records(values: Vec<Vec<serde_json::Value>>) -> Vec<Transaction> {
    let mut rows = values.into_iter();

    let header: Vec<String> = match rows.next() {
        Some(row) => row.iter().map(cell_to_string).collect(),
        None => return Vec::new(),
    };

    let col = |name: &str| header.iter().position(|h| h.trim() == name);

    let (Some(i_date), Some(i_amount), Some(i_kind), Some(i_category), Some(i_description)) = (
        col(COL_DATE),
        col(COL_AMOUNT),
        col(COL_KIND),
        col(COL_CATEGORY),
        col(COL_DESCRIPTION),
    ) else {
        warn!("Ledger header row is missing expected columns: {:?}", header);
        return Vec::new();
    };

    let mut records = Vec::new();

    for (row_index, row) in rows.enumerate() {
        let cell = |i: usize| row.get(i).map(cell_to_string).unwrap_or_default();

        let parsed = parse_row(
            &cell(i_date),
            &cell(i_amount),
            &cell(i_kind),
            cell(i_category),
            cell(i_description),
        );

        match parsed {
            Some(tx) => records.push(tx),
            None => warn!("Skipping unparseable ledger row {}", row_index + 2),
        }
    }

    records
}

fn parse_row(
    date: &str,
    amount: &str,
    kind: &str,
    category: String,
    description: String,
) -> Option<Transaction> {
    let timestamp = NaiveDateTime::parse_from_str(date.trim(), DATE_FORMAT)
        .ok()?
        .and_utc();
    let amount = amount.trim().parse::<f64>().ok()?;
    let kind = TransactionKind::from_label(kind)?;

    Some(Transaction {
        timestamp,
        amount,
        kind,
        category,
        description,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Datelike;

    fn grid(rows: &[&[&str]]) -> Vec<Vec<serde_json::Value>> {
        rows.iter()
            .map(|row| row.iter().map(|c| json!(c)).collect())
            .collect()
    }

    #[test]
    fn test_parse_records_maps_columns_by_header_name() {
        // Column order differs from the canonical A:E layout on purpose.
        let values = grid(&[
            &["Valor", "Data", "Descrição", "Tipo", "Categoria"],
            &["100.50", "2024-03-01 10:30:00", "mercado", "gasto", "Food"],
        ]);

        let records = parse_records(values);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].amount, 100.50);
        assert_eq!(records[0].category, "Food");
        assert_eq!(records[0].description, "mercado");
        assert_eq!(records[0].kind, TransactionKind::Expense);
        assert_eq!(records[0].timestamp.month(), 3);
    }

    #[test]
    fn test_parse_records_skips_bad_rows() {
        let values = grid(&[
            &["Data", "Valor", "Tipo", "Categoria", "Descrição"],
            &["2024-03-01 10:30:00", "not-a-number", "gasto", "Food", "a"],
            &["not-a-date", "10", "gasto", "Food", "b"],
            &["2024-03-02 08:00:00", "10", "investimento", "Food", "c"],
            &["2024-03-03 09:00:00", "42.00", "receita", "Receita", "salário"],
        ]);

        let records = parse_records(values);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].description, "salário");
        assert_eq!(records[0].kind, TransactionKind::Income);
    }

    #[test]
    fn test_parse_records_empty_grid() {
        assert!(parse_records(Vec::new()).is_empty());
        // Header only, no data rows.
        let values = grid(&[&["Data", "Valor", "Tipo", "Categoria", "Descrição"]]);
        assert!(parse_records(values).is_empty());
    }

    #[test]
    fn test_value_range_tolerates_numeric_cells() {
        let raw = r#"{"range":"Sheet1!F1","values":[[1000.5]]}"#;
        let range: ValueRange = serde_json::from_str(raw).unwrap();
        assert_eq!(cell_to_string(&range.values[0][0]), "1000.5");
    }
}
