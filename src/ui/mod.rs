//! egui rendering: the sidebar filter source, the top bar, and the chart sink
//! for the central panel.

pub mod panels;
pub mod plot;
