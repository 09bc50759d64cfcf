// ==========================================
// IWS BDE 系统 - CSV 交换层
// ==========================================
// 职责: CSV 解析、字段映射、导出写出、导入报告
// 约束: 列名与列顺序属于外部契约（EntityKind::csv_columns）
// ==========================================

pub mod error;
pub mod exporter;
pub mod field_mapper;
pub mod file_parser;
pub mod report;

// 重导出核心类型
pub use error::{CsvRowError, ImportError, ImportResult};
pub use exporter::CsvExporter;
pub use field_mapper::{CsvMapping, FieldMapper};
pub use file_parser::{CsvDocument, CsvParser, CsvRow};
pub use report::ImportReport;
