pub mod forecast_processor;
pub mod integrity_checker;
pub mod row_builder;
pub mod table_assembler;

pub use forecast_processor::ForecastProcessor;
pub use integrity_checker::{IntegrityChecker, IntegrityReport, TableViolation};
pub use row_builder::RowBuilder;
pub use table_assembler::{MergeStrategy, TableAssembler};
