use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::{postgres::PgRow, FromRow, Row};
use utoipa::ToSchema;

/// Settlement state of a payment debt. Stored and serialized lowercase.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum PaymentDebtStatus {
    #[default]
    Open,
    Payed,
}

impl PaymentDebtStatus {
    pub const CHOICES: [PaymentDebtStatus; 2] = [PaymentDebtStatus::Open, PaymentDebtStatus::Payed];

    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentDebtStatus::Open => "open",
            PaymentDebtStatus::Payed => "payed",
        }
    }
}

impl FromStr for PaymentDebtStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::CHOICES
            .into_iter()
            .find(|choice| choice.as_str() == s)
            .ok_or_else(|| format!("\"{}\" is not a valid choice.", s))
    }
}

impl fmt::Display for PaymentDebtStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct PaymentDebt {
    pub debt_id: i32,
    #[schema(max_length = 100)]
    pub name: String,
    pub government_id: i64,
    #[schema(max_length = 254)]
    pub email: String,
    /// NUMERIC(10, 2); serialized as a string such as "1500.00"
    #[schema(example = "1500.00")]
    pub debt_amount: Decimal,
    pub debt_due_date: NaiveDate,
    #[serde(default)]
    pub status: PaymentDebtStatus,
}

impl PaymentDebt {
    pub const TABLE: &'static str = "payment_debt";
    pub const COLUMNS: &'static str =
        "debt_id, name, government_id, email, debt_amount, debt_due_date, status";
}

impl<'r> FromRow<'r, PgRow> for PaymentDebt {
    fn from_row(row: &'r PgRow) -> Result<Self, sqlx::Error> {
        let status: String = row.try_get("status")?;
        let status = status.parse::<PaymentDebtStatus>().map_err(|e| sqlx::Error::ColumnDecode {
            index: "status".to_string(),
            source: e.into(),
        })?;

        Ok(Self {
            debt_id: row.try_get("debt_id")?,
            name: row.try_get("name")?,
            government_id: row.try_get("government_id")?,
            email: row.try_get("email")?,
            debt_amount: row.try_get("debt_amount")?,
            debt_due_date: row.try_get("debt_due_date")?,
            status,
        })
    }
}
