use std::collections::BTreeMap;
use std::fmt;

use chrono::NaiveDate;

// ---------------------------------------------------------------------------
// Transaction – one row of the source table
// ---------------------------------------------------------------------------

/// A single cleaned transaction.
#[derive(Debug, Clone, PartialEq)]
pub struct Transaction {
    /// Opaque identifier, kept verbatim from the source.
    pub id: String,
    pub country: String,
    pub transaction_type: String,
    /// Amount in USD.
    pub amount: f64,
    /// Ordinal money-laundering risk score.
    pub risk_score: i64,
    pub industry: String,
    pub date: NaiveDate,
    /// Every other source column: column_name → raw value.
    pub extra: BTreeMap<String, String>,
}

// ---------------------------------------------------------------------------
// Typed column selectors
// ---------------------------------------------------------------------------

/// Categorical columns that can be grouped on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CategoryColumn {
    Country,
    TransactionType,
    Industry,
}

impl CategoryColumn {
    pub fn value<'a>(&self, tx: &'a Transaction) -> &'a str {
        match self {
            CategoryColumn::Country => &tx.country,
            CategoryColumn::TransactionType => &tx.transaction_type,
            CategoryColumn::Industry => &tx.industry,
        }
    }

    /// Source header name.
    pub fn header(&self) -> &'static str {
        match self {
            CategoryColumn::Country => COL_COUNTRY,
            CategoryColumn::TransactionType => COL_TYPE,
            CategoryColumn::Industry => COL_INDUSTRY,
        }
    }
}

/// Numeric (or ordinal) columns usable for paired samples.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NumericColumn {
    Amount,
    RiskScore,
}

impl NumericColumn {
    pub fn value(&self, tx: &Transaction) -> f64 {
        match self {
            NumericColumn::Amount => tx.amount,
            NumericColumn::RiskScore => tx.risk_score as f64,
        }
    }

    pub fn header(&self) -> &'static str {
        match self {
            NumericColumn::Amount => COL_AMOUNT,
            NumericColumn::RiskScore => COL_RISK,
        }
    }
}

impl fmt::Display for CategoryColumn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.header())
    }
}

impl fmt::Display for NumericColumn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.header())
    }
}

// ---------------------------------------------------------------------------
// Source header names
// ---------------------------------------------------------------------------

pub const COL_ID: &str = "Transaction ID";
pub const COL_DATE: &str = "Date of Transaction";
pub const COL_COUNTRY: &str = "Country";
pub const COL_TYPE: &str = "Transaction Type";
pub const COL_AMOUNT: &str = "Amount (USD)";
pub const COL_RISK: &str = "Money Laundering Risk Score";
pub const COL_INDUSTRY: &str = "Industry";

/// Columns every input file must carry.
pub const REQUIRED_COLUMNS: [&str; 7] = [
    COL_ID,
    COL_DATE,
    COL_COUNTRY,
    COL_TYPE,
    COL_AMOUNT,
    COL_RISK,
    COL_INDUSTRY,
];

// ---------------------------------------------------------------------------
// TransactionTable – the complete loaded dataset
// ---------------------------------------------------------------------------

/// The full cleaned dataset. Read-only after load.
#[derive(Debug, Clone, Default)]
pub struct TransactionTable {
    /// Records in file order.
    pub records: Vec<Transaction>,
    /// Non-required columns in header order.
    pub extra_columns: Vec<String>,
    /// Rows discarded during cleaning.
    pub dropped_rows: usize,
}

impl TransactionTable {
    pub fn new(records: Vec<Transaction>, extra_columns: Vec<String>, dropped_rows: usize) -> Self {
        TransactionTable {
            records,
            extra_columns,
            dropped_rows,
        }
    }

    /// Number of transactions.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the table is empty.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Earliest and latest transaction date.
    pub fn date_span(&self) -> Option<(NaiveDate, NaiveDate)> {
        let first = self.records.iter().map(|t| t.date).min()?;
        let last = self.records.iter().map(|t| t.date).max()?;
        Some((first, last))
    }
}
