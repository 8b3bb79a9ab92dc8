use std::collections::{BTreeSet, HashSet};
use std::fmt;

use super::model::{Transaction, TransactionTable};

// ---------------------------------------------------------------------------
// Selection values
// ---------------------------------------------------------------------------

/// A categorical selection: either everything or one specific value.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Choice {
    All,
    Only(String),
}

impl Choice {
    /// Case-sensitive exact match; `All` matches anything.
    pub fn matches(&self, value: &str) -> bool {
        match self {
            Choice::All => true,
            Choice::Only(v) => v == value,
        }
    }
}

impl fmt::Display for Choice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Choice::All => write!(f, "All"),
            Choice::Only(v) => write!(f, "{v}"),
        }
    }
}

/// Closed amount interval `[lo, hi]` in USD.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AmountRange {
    pub lo: f64,
    pub hi: f64,
}

impl AmountRange {
    pub fn new(lo: f64, hi: f64) -> Self {
        AmountRange { lo, hi }
    }

    /// The range that admits every finite amount.
    pub fn unbounded() -> Self {
        AmountRange {
            lo: f64::NEG_INFINITY,
            hi: f64::INFINITY,
        }
    }

    pub fn contains(&self, amount: f64) -> bool {
        self.lo <= amount && amount <= self.hi
    }
}

// ---------------------------------------------------------------------------
// FilterSet – one user selection
// ---------------------------------------------------------------------------

/// The three conjunctive predicates chosen by the user.
///
/// Built fresh for every interaction and never mutated afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterSet {
    country: Choice,
    transaction_types: BTreeSet<Choice>,
    amount_range: AmountRange,
}

/// One of the predicates a [`FilterSet`] is made of.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Predicate {
    Country,
    TransactionType,
    Amount,
}

impl Predicate {
    pub const ALL: [Predicate; 3] = [
        Predicate::Country,
        Predicate::TransactionType,
        Predicate::Amount,
    ];
}

impl FilterSet {
    pub fn new(
        country: Choice,
        transaction_types: impl IntoIterator<Item = Choice>,
        amount_range: AmountRange,
    ) -> Self {
        FilterSet {
            country,
            transaction_types: transaction_types.into_iter().collect(),
            amount_range,
        }
    }

    /// A filter that keeps every row of the table the options came from.
    pub fn unrestricted(options: &FilterOptions) -> Self {
        FilterSet::new(
            Choice::All,
            [Choice::All],
            options.amount_bounds.unwrap_or_else(AmountRange::unbounded),
        )
    }

    pub fn country(&self) -> &Choice {
        &self.country
    }

    pub fn transaction_types(&self) -> &BTreeSet<Choice> {
        &self.transaction_types
    }

    pub fn amount_range(&self) -> AmountRange {
        self.amount_range
    }

    /// Whether the type predicate constrains anything at all.
    /// An empty selection or one containing `All` does not.
    pub fn restricts_types(&self) -> bool {
        !self.transaction_types.is_empty() && !self.transaction_types.contains(&Choice::All)
    }

    /// Evaluate a single predicate against a row.
    pub fn passes(&self, predicate: Predicate, tx: &Transaction) -> bool {
        match predicate {
            Predicate::Country => self.country.matches(&tx.country),
            Predicate::TransactionType => {
                !self.restricts_types()
                    || self
                        .transaction_types
                        .iter()
                        .any(|c| c.matches(&tx.transaction_type))
            }
            Predicate::Amount => self.amount_range.contains(tx.amount),
        }
    }

    /// Whether a row satisfies all predicates.
    pub fn accepts(&self, tx: &Transaction) -> bool {
        Predicate::ALL.iter().all(|p| self.passes(*p, tx))
    }
}

// ---------------------------------------------------------------------------
// FilterOptions – what the sidebar offers
// ---------------------------------------------------------------------------

/// Selectable values derived from the unfiltered table.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterOptions {
    /// Distinct countries in first-appearance order.
    pub countries: Vec<String>,
    /// Distinct transaction types in first-appearance order.
    pub transaction_types: Vec<String>,
    /// Global min/max amount; `None` for an empty table.
    pub amount_bounds: Option<AmountRange>,
}

impl FilterOptions {
    pub fn from_table(table: &TransactionTable) -> Self {
        let mut countries = Vec::new();
        let mut types = Vec::new();
        let mut seen_countries = HashSet::new();
        let mut seen_types = HashSet::new();
        let mut bounds: Option<AmountRange> = None;

        for tx in &table.records {
            if seen_countries.insert(tx.country.as_str()) {
                countries.push(tx.country.clone());
            }
            if seen_types.insert(tx.transaction_type.as_str()) {
                types.push(tx.transaction_type.clone());
            }
            bounds = Some(match bounds {
                None => AmountRange::new(tx.amount, tx.amount),
                Some(r) => AmountRange::new(r.lo.min(tx.amount), r.hi.max(tx.amount)),
            });
        }

        FilterOptions {
            countries,
            transaction_types: types,
            amount_bounds: bounds,
        }
    }
}

// ---------------------------------------------------------------------------
// Filter engine
// ---------------------------------------------------------------------------

/// Return indices of transactions that pass all predicates, in table order.
pub fn filtered_indices(table: &TransactionTable, filters: &FilterSet) -> Vec<usize> {
    table
        .records
        .iter()
        .enumerate()
        .filter(|(_, tx)| filters.accepts(tx))
        .map(|(i, _)| i)
        .collect()
}

/// Apply a filter set, evaluating the predicates in their canonical order.
pub fn apply<'a>(table: &'a TransactionTable, filters: &FilterSet) -> FilteredView<'a> {
    apply_in_order(table, filters, &Predicate::ALL)
}

/// Apply the predicates one after another in the given order, narrowing the
/// surviving rows at each step.
pub fn apply_in_order<'a>(
    table: &'a TransactionTable,
    filters: &FilterSet,
    order: &[Predicate],
) -> FilteredView<'a> {
    let mut view = FilteredView::all(table);
    for predicate in order {
        view.rows.retain(|tx| filters.passes(*predicate, tx));
    }
    view
}

// ---------------------------------------------------------------------------
// FilteredView
// ---------------------------------------------------------------------------

/// Read-only, order-preserving subsequence of a [`TransactionTable`].
#[derive(Debug, Clone, PartialEq)]
pub struct FilteredView<'a> {
    rows: Vec<&'a Transaction>,
}

impl<'a> FilteredView<'a> {
    /// Every row of the table.
    pub fn all(table: &'a TransactionTable) -> Self {
        FilteredView {
            rows: table.records.iter().collect(),
        }
    }

    /// Rows at the given indices. Out-of-range indices are skipped.
    pub fn from_indices(table: &'a TransactionTable, indices: &[usize]) -> Self {
        FilteredView {
            rows: indices
                .iter()
                .filter_map(|&i| table.records.get(i))
                .collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &'a Transaction> + '_ {
        self.rows.iter().copied()
    }

    pub fn amounts(&self) -> impl Iterator<Item = f64> + '_ {
        self.iter().map(|tx| tx.amount)
    }
}
