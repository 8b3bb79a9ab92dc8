//! Transactions in, filtered views out.
//!
//! ```text
//!   file on disk ──► loader::load_file ──► TransactionTable
//!                         (RowPolicy decides which rows survive)
//!
//!   TransactionTable + FilterSet ──► filter::apply ──► FilteredView
//!                                                       (borrowed rows)
//! ```
//!
//! `FilterOptions::from_table` lists what the sidebar and the command line
//! may choose from.

pub mod filter;
pub mod loader;
pub mod model;
