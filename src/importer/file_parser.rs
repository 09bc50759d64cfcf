// ==========================================
// IWS BDE 系统 - CSV 文件解析器
// ==========================================
// 输入: 上传的原始字节（UTF-8，可带 BOM）
// 输出: 按表头列名索引的行，附带物理行号
// 规则:
// - 表头必须包含实体的全部契约列（顺序无关，列名去空白）
// - 多余列忽略（记录在 ignored_columns）
// - 完全空白的行跳过
// ==========================================

use crate::importer::error::{CsvRowError, ImportError, ImportResult};
use csv::{Position, ReaderBuilder, StringRecord};
use std::collections::{HashMap, HashSet};

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// 一行数据（列名 → 去空白后的单元格）
#[derive(Debug, Clone)]
pub struct CsvRow {
    /// 物理行号（表头为第 1 行）
    pub line: u64,
    pub fields: HashMap<String, String>,
}

impl CsvRow {
    /// 取单元格（缺列或空白均返回 None）
    pub fn get(&self, column: &str) -> Option<&str> {
        self.fields
            .get(column)
            .map(String::as_str)
            .filter(|v| !v.is_empty())
    }
}

/// 解析结果
#[derive(Debug)]
pub struct CsvDocument {
    /// 行解析结果；结构错误的行以 CsvRowError 形式保留
    pub rows: Vec<Result<CsvRow, CsvRowError>>,
    /// 表头中未被契约使用的列
    pub ignored_columns: Vec<String>,
}

// ==========================================
// CSV Parser
// ==========================================
pub struct CsvParser {
    required_columns: &'static [&'static str],
}

impl CsvParser {
    pub fn new(required_columns: &'static [&'static str]) -> Self {
        Self { required_columns }
    }

    /// 解析整份 CSV
    ///
    /// # 返回
    /// - `Err(ImportError)`: 编码错误、空文件、表头不合契约
    /// - `Ok(CsvDocument)`: 行级问题记录在各行结果中
    pub fn parse(&self, bytes: &[u8]) -> ImportResult<CsvDocument> {
        let bytes = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes);
        let text =
            std::str::from_utf8(bytes).map_err(|e| ImportError::EncodingError(e.to_string()))?;

        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true) // 列数不一致的行交由行级错误处理
            .from_reader(text.as_bytes());

        let headers: Vec<String> = reader
            .headers()?
            .iter()
            .map(|h| h.trim().to_string())
            .collect();
        if headers.iter().all(|h| h.is_empty()) {
            return Err(ImportError::EmptyFile);
        }
        let ignored_columns = self.check_headers(&headers)?;

        let lines = LineIndex::new(text);
        let mut rows = Vec::new();
        for result in reader.records() {
            match result {
                Ok(record) => {
                    if is_blank(&record) {
                        continue;
                    }
                    let line = lines.line_of(record.position());
                    rows.push(self.to_row(&headers, &record, line));
                }
                Err(err) => {
                    let line = lines.line_of(err.position());
                    rows.push(Err(CsvRowError::new(line, err.to_string())));
                }
            }
        }

        Ok(CsvDocument {
            rows,
            ignored_columns,
        })
    }

    /// 校验表头，返回多余列
    fn check_headers(&self, headers: &[String]) -> ImportResult<Vec<String>> {
        let mut seen = HashSet::new();
        for header in headers {
            if !seen.insert(header.as_str()) && !header.is_empty() {
                return Err(ImportError::DuplicateColumn(header.clone()));
            }
        }

        let missing: Vec<String> = self
            .required_columns
            .iter()
            .filter(|c| !seen.contains(**c))
            .map(|c| c.to_string())
            .collect();
        if !missing.is_empty() {
            return Err(ImportError::MissingColumns(missing));
        }

        Ok(headers
            .iter()
            .filter(|h| !h.is_empty() && !self.required_columns.contains(&h.as_str()))
            .cloned()
            .collect())
    }

    fn to_row(
        &self,
        headers: &[String],
        record: &StringRecord,
        line: u64,
    ) -> Result<CsvRow, CsvRowError> {
        if record.len() != headers.len() {
            return Err(CsvRowError::new(
                line,
                ImportError::FieldCountMismatch {
                    expected: headers.len(),
                    actual: record.len(),
                }
                .to_string(),
            ));
        }

        let fields = headers
            .iter()
            .zip(record.iter())
            .filter(|(header, _)| self.required_columns.contains(&header.as_str()))
            .map(|(header, value)| (header.clone(), value.trim().to_string()))
            .collect();
        Ok(CsvRow { line, fields })
    }
}

/// 字节偏移 → 物理行号
///
/// csv 读取器的行计数不含被跳过的空行，且记录位置指向空行之前；
/// 这里按换行符偏移表重新计算
struct LineIndex<'a> {
    text: &'a [u8],
    newlines: Vec<usize>,
}

impl<'a> LineIndex<'a> {
    fn new(text: &'a str) -> Self {
        let text = text.as_bytes();
        let newlines = text
            .iter()
            .enumerate()
            .filter(|(_, b)| **b == b'\n')
            .map(|(i, _)| i)
            .collect();
        Self { text, newlines }
    }

    fn line_of(&self, position: Option<&Position>) -> u64 {
        let mut start = match position {
            Some(pos) => pos.byte() as usize,
            None => return 0,
        };
        // 跳过记录前的空行（\n 或 \r\n）
        while start < self.text.len() && matches!(self.text[start], b'\n' | b'\r') {
            start += 1;
        }
        self.newlines.partition_point(|&offset| offset < start) as u64 + 1
    }
}

fn is_blank(record: &StringRecord) -> bool {
    record.iter().all(|v| v.trim().is_empty())
}
