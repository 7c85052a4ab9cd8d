//! Report sinks that hand metric tables to external consumers.

pub mod csv;

pub use self::csv::{ExportedFile, write_report_csv, write_table_csv, write_top_values_csv};
