pub mod remote_processor;
pub mod result_exporter;
pub mod row_source;

pub use remote_processor::RemoteProcessor;
pub use result_exporter::{ExcelExporter, ResultExporter};
pub use row_source::{ExcelRowSource, RowSource};
