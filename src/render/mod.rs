//! Output formats for the aggregated table.

pub mod csv;
pub mod table;

pub use csv::render_csv;
pub use table::render_table;

/// Printed for cells without a value.
pub const PLACEHOLDER: &str = "-";
