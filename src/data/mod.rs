//! Data module - CSV loading, cleaning and grouping

mod cleaner;
mod loader;
mod processor;
mod table;

pub use cleaner::{CleaningError, CleaningSummary, DataCleaner};
pub use loader::{is_numeric_dtype, DataLoader, LoaderError};
pub use processor::{CrossTab, DataProcessor, TenureGroup};
pub use table::{count_in_order, ColumnValues, Table, TableColumn};

/// Identifier column, never used as a feature or chart axis.
pub const CUSTOMER_ID: &str = "customerID";
pub const TENURE: &str = "tenure";
pub const TOTAL_CHARGES: &str = "TotalCharges";
pub const CHURN: &str = "Churn";
pub const CHURN_FLAG: &str = "Churn_flag";
