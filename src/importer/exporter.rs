// ==========================================
// IWS BDE 系统 - CSV 导出
// ==========================================
// 输出: UTF-8（无 BOM），表头 + 数据行，列顺序即契约顺序
// ==========================================

use crate::importer::error::{ImportError, ImportResult};
use crate::importer::field_mapper::CsvMapping;
use csv::Writer;

pub struct CsvExporter;

impl CsvExporter {
    /// 将记录写为 CSV 字节
    pub fn write<T: CsvMapping>(records: &[T]) -> ImportResult<Vec<u8>> {
        let mut writer = Writer::from_writer(Vec::new());
        writer
            .write_record(T::KIND.csv_columns())
            .map_err(|e| ImportError::CsvWriteError(e.to_string()))?;
        for record in records {
            writer
                .write_record(record.to_csv_record())
                .map_err(|e| ImportError::CsvWriteError(e.to_string()))?;
        }
        writer
            .into_inner()
            .map_err(|e| ImportError::CsvWriteError(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::machine::Machine;

    #[test]
    fn test_write_header_only_when_empty() {
        let bytes = CsvExporter::write::<Machine>(&[]).unwrap();
        assert_eq!(
            String::from_utf8(bytes).unwrap(),
            "code,name,description,location,active\n"
        );
    }

    #[test]
    fn test_write_quotes_commas() {
        let machine = Machine {
            code: "M-01".to_string(),
            name: "Säge, groß".to_string(),
            description: None,
            location: Some("Halle 2".to_string()),
            active: false,
        };
        let text = String::from_utf8(CsvExporter::write(&[machine]).unwrap()).unwrap();
        assert_eq!(
            text.lines().nth(1),
            Some("M-01,\"Säge, groß\",,Halle 2,false")
        );
    }
}
