use std::collections::BTreeSet;
use std::path::Path;

use crate::config::DashboardConfig;
use crate::dashboard::{Aggregates, DeriveSettings};
use crate::data::filter::{
    filtered_indices, AmountRange, Choice, FilterOptions, FilterSet, FilteredView,
};
use crate::data::loader::{load_file, RowPolicy};
use crate::data::model::TransactionTable;

// ---------------------------------------------------------------------------
// Sidebar widget state
// ---------------------------------------------------------------------------

/// What the sidebar widgets currently show. Turned into a fresh
/// [`FilterSet`] every frame.
#[derive(Debug, Clone, PartialEq)]
pub struct SelectionDraft {
    pub country: Choice,
    pub transaction_types: BTreeSet<Choice>,
    pub amount: AmountRange,
}

impl SelectionDraft {
    pub fn unrestricted(options: &FilterOptions) -> Self {
        SelectionDraft {
            country: Choice::All,
            transaction_types: BTreeSet::from([Choice::All]),
            amount: options.amount_bounds.unwrap_or(AmountRange::new(0.0, 0.0)),
        }
    }

    pub fn to_filter_set(&self) -> FilterSet {
        FilterSet::new(
            self.country.clone(),
            self.transaction_types.iter().cloned(),
            self.amount,
        )
    }
}

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering.
pub struct AppState {
    /// Loaded dataset (None until a file is loaded).
    pub dataset: Option<TransactionTable>,

    /// Selectable values of the unfiltered dataset.
    pub options: FilterOptions,

    /// Sidebar widget values.
    pub draft: SelectionDraft,

    /// Filter set the cached results below were computed with.
    pub active_filters: Option<FilterSet>,

    /// Indices of transactions passing the current filters (cached).
    pub visible_indices: Vec<usize>,

    /// Aggregates of the visible transactions (cached).
    pub aggregates: Aggregates,

    pub settings: DeriveSettings,

    pub row_policy: RowPolicy,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,
}

impl AppState {
    pub fn new(config: &DashboardConfig) -> Self {
        let options = FilterOptions::default();
        Self {
            dataset: None,
            draft: SelectionDraft::unrestricted(&options),
            options,
            active_filters: None,
            visible_indices: Vec::new(),
            aggregates: Aggregates::default(),
            settings: config.derive_settings(),
            row_policy: config.row_policy,
            status_message: None,
        }
    }

    /// Ingest a newly loaded dataset and reset the filters to show everything.
    pub fn set_dataset(&mut self, dataset: TransactionTable) {
        self.options = FilterOptions::from_table(&dataset);
        self.draft = SelectionDraft::unrestricted(&self.options);
        self.dataset = Some(dataset);
        self.active_filters = None;
        self.status_message = None;
        self.update_filters(self.draft.to_filter_set());
    }

    /// Load a file and make it the current dataset. On failure the previous
    /// dataset stays and the error is kept as the status message.
    pub fn load_path(&mut self, path: &Path) {
        match load_file(path, self.row_policy) {
            Ok(dataset) => {
                log::info!(
                    "Loaded {} transactions ({} dropped) from {}",
                    dataset.len(),
                    dataset.dropped_rows,
                    path.display()
                );
                let empty = dataset.is_empty();
                self.set_dataset(dataset);
                if empty {
                    let message = format!("No complete transactions in {}", path.display());
                    log::warn!("{message}");
                    self.status_message = Some(message);
                }
            }
            Err(e) => {
                log::error!("Failed to load file: {e:#}");
                self.status_message = Some(format!("Error: {e}"));
            }
        }
    }

    /// Recompute the visible rows and aggregates if `filters` differs from
    /// the active filter set. Returns whether anything was recomputed.
    pub fn update_filters(&mut self, filters: FilterSet) -> bool {
        if self.active_filters.as_ref() == Some(&filters) {
            return false;
        }
        let Some(ds) = &self.dataset else {
            return false;
        };

        self.visible_indices = filtered_indices(ds, &filters);
        let view = FilteredView::from_indices(ds, &self.visible_indices);
        self.aggregates = Aggregates::derive(&view, &self.settings);
        log::debug!("Filters changed: {} of {} rows visible", view.len(), ds.len());

        self.active_filters = Some(filters);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::tests::two_row_table;

    fn loaded() -> AppState {
        let mut state = AppState::new(&DashboardConfig::default());
        state.set_dataset(two_row_table());
        state
    }

    #[test]
    fn new_dataset_shows_everything() {
        let state = loaded();
        assert_eq!(state.visible_indices, vec![0, 1]);
        assert_eq!(state.aggregates.total, 2);
        assert_eq!(state.options.countries, vec!["US", "UK"]);
        assert_eq!(state.draft.amount, AmountRange::new(100.0, 500.0));
    }

    #[test]
    fn filters_recompute_only_on_change() {
        let mut state = loaded();
        state.draft.country = Choice::Only("UK".into());
        assert!(state.update_filters(state.draft.to_filter_set()));
        assert_eq!(state.visible_indices, vec![1]);
        assert_eq!(state.aggregates.total, 1);
        assert!(!state.update_filters(state.draft.to_filter_set()));
    }

    #[test]
    fn no_dataset_means_nothing_to_filter() {
        let mut state = AppState::new(&DashboardConfig::default());
        assert!(!state.update_filters(state.draft.to_filter_set()));
        assert!(state.visible_indices.is_empty());
    }

    #[test]
    fn failed_load_keeps_previous_dataset() {
        let mut state = loaded();
        state.load_path(Path::new("/nonexistent/transactions.csv"));
        let status = state.status_message.as_deref().unwrap_or("");
        assert!(status.starts_with("Error: file not found"));
        assert_eq!(state.dataset.as_ref().map(|d| d.len()), Some(2));
    }

    #[test]
    fn file_without_complete_rows_is_flagged() {
        let path = std::env::temp_dir().join("dashboard_state_only_incomplete.csv");
        std::fs::write(
            &path,
            "Transaction ID,Country,Amount (USD),Transaction Type,Date of Transaction,\
             Industry,Money Laundering Risk Score\n\
             TX1,US,,Wire,2013-01-01,Finance,3\n",
        )
        .unwrap();

        let mut state = loaded();
        state.load_path(&path);
        let _ = std::fs::remove_file(&path);

        assert_eq!(state.dataset.as_ref().map(|d| d.len()), Some(0));
        let status = state.status_message.as_deref().unwrap_or("");
        assert!(status.starts_with("No complete transactions"));
        assert!(state.visible_indices.is_empty());
        assert_eq!(state.aggregates.total, 0);
    }
}
