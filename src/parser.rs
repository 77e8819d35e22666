// 🏗️ Delimited-Text Parser
// Semicolon-separated CSV → ordered rows of header → value

use crate::error::FormatError;
use csv::{ReaderBuilder, StringRecord, Terminator, Trim};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use tracing::debug;

/// Field delimiter used by every input file
pub const DELIMITER: u8 = b';';

// ============================================================================
// CORE TYPES
// ============================================================================

/// CsvRow - one data line mapped by header label
///
/// Every header label is present; rows shorter than the header get "".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CsvRow {
    fields: HashMap<String, String>,

    /// 1-based line in the source file (for error messages)
    pub line_number: usize,
}

impl CsvRow {
    pub fn new(line_number: usize) -> Self {
        CsvRow {
            fields: HashMap::new(),
            line_number,
        }
    }

    /// Builder pattern: add one field
    pub fn with_field(mut self, header: &str, value: &str) -> Self {
        self.fields.insert(header.to_string(), value.to_string());
        self
    }

    /// Value for a header, None when the file has no such column
    pub fn get(&self, header: &str) -> Option<&str> {
        self.fields.get(header).map(String::as_str)
    }

    /// Value for a header, "" when the file has no such column
    pub fn value(&self, header: &str) -> &str {
        self.get(header).unwrap_or("")
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// CsvDocument - output of parse_csv()
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CsvDocument {
    pub file_name: String,
    pub headers: Vec<String>,
    pub rows: Vec<CsvRow>,
}

impl CsvDocument {
    pub fn has_column(&self, header: &str) -> bool {
        self.headers.iter().any(|h| h == header)
    }
}

// ============================================================================
// PARSING
// ============================================================================

/// Reject anything that is not named *.csv (checked before reading content)
pub fn ensure_csv_name(file_name: &str) -> Result<(), FormatError> {
    if file_name.to_ascii_lowercase().ends_with(".csv") {
        Ok(())
    } else {
        Err(FormatError::NotCsv(file_name.to_string()))
    }
}

/// Parse raw CSV text
///
/// # Format
/// - blank lines (including whitespace-only) are skipped, `\n` or `\r\n` endings
/// - first remaining line is the header, labels trimmed
/// - fields split on `;`, trimmed, quotes are plain characters
/// - extra fields beyond the header are dropped
///
/// # Returns
/// * `Err(FormatError::NotCsv)` - name lacks the .csv suffix
/// * `Err(FormatError::Empty)` - nothing but blank lines
/// * `Ok(CsvDocument)` - possibly with zero rows (header only)
pub fn parse_csv(file_name: &str, content: &str) -> Result<CsvDocument, FormatError> {
    ensure_csv_name(file_name)?;

    let mut reader = ReaderBuilder::new()
        .delimiter(DELIMITER)
        .has_headers(false)
        .flexible(true)
        .quoting(false)
        .trim(Trim::All)
        // only \n ends a line; the \r of \r\n is trimmed with the last field
        .terminator(Terminator::Any(b'\n'))
        .from_reader(content.as_bytes());

    let mut headers: Option<Vec<String>> = None;
    let mut rows = Vec::new();

    for result in reader.records() {
        let record = result?;
        if is_blank(&record) {
            continue;
        }

        // position().line() does not count skipped blank lines
        let line_number = record
            .position()
            .map(|p| line_at(content, p.byte() as usize))
            .unwrap_or(0);

        match &headers {
            None => {
                let labels: Vec<String> = record.iter().map(str::to_string).collect();
                debug!(file = file_name, headers = ?labels, "CSV headers");
                headers = Some(labels);
            }
            Some(labels) => {
                let mut row = CsvRow::new(line_number);
                for (idx, label) in labels.iter().enumerate() {
                    let value = record.get(idx).unwrap_or("");
                    row.fields.insert(label.clone(), value.to_string());
                }
                rows.push(row);
            }
        }
    }

    let headers = headers.ok_or(FormatError::Empty)?;
    debug!(file = file_name, rows = rows.len(), "CSV parsed");

    Ok(CsvDocument {
        file_name: file_name.to_string(),
        headers,
        rows,
    })
}

/// Read a file from disk and parse it
///
/// The name is checked first so non-CSV files are never opened.
pub async fn read_csv(path: &Path) -> Result<CsvDocument, FormatError> {
    let file_name = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("")
        .to_string();

    ensure_csv_name(&file_name)?;

    let content = tokio::fs::read_to_string(path).await?;
    parse_csv(&file_name, &content)
}

/// 1-based line of the first non-blank line at or after byte `offset`
///
/// The reader may report a record's start before the empty lines it skipped.
fn line_at(content: &str, offset: usize) -> usize {
    let start = offset.min(content.len());
    let before = content.as_bytes()[..start]
        .iter()
        .filter(|b| **b == b'\n')
        .count();
    let skipped = content
        .get(start..)
        .unwrap_or("")
        .split_inclusive('\n')
        .take_while(|line| line.ends_with('\n') && line.trim().is_empty())
        .count();
    before + skipped + 1
}

fn is_blank(record: &StringRecord) -> bool {
    record.len() <= 1 && record.get(0).map_or(true, str::is_empty)
}

#[cfg(test)]
mod tests {
    use super::*;

    const FIXTURE: &str = include_str!("../tests/fixtures/barcelona.csv");

    #[test]
    fn test_ensure_csv_name() {
        assert!(ensure_csv_name("punts.csv").is_ok());
        assert!(ensure_csv_name("PUNTS.CSV").is_ok());
        assert!(matches!(
            ensure_csv_name("punts.xlsx"),
            Err(FormatError::NotCsv(name)) if name == "punts.xlsx"
        ));
        assert!(ensure_csv_name("csv").is_err());
    }

    #[test]
    fn test_parse_fixture_keeps_row_order() {
        let doc = parse_csv("barcelona.csv", FIXTURE).unwrap();

        assert_eq!(doc.headers.len(), 13);
        assert!(doc.has_column("direcció"));
        assert_eq!(doc.rows.len(), 3, "blank line must be skipped");

        assert_eq!(doc.rows[0].value("nom"), "Sagrada Família");
        assert_eq!(doc.rows[1].value("nom"), "Museu Picasso");
        assert_eq!(doc.rows[2].value("nom"), "Plaça de Catalunya");

        assert_eq!(doc.rows[0].line_number, 2);
        assert_eq!(doc.rows[2].line_number, 5);
    }

    #[test]
    fn test_parse_handles_crlf_and_whitespace_lines() {
        let content = "nom ; ciutat \r\n  \r\nA;Girona\r\n\r\n B ; Lleida \r\n";
        let doc = parse_csv("a.csv", content).unwrap();

        assert_eq!(doc.headers, vec!["nom", "ciutat"]);
        assert_eq!(doc.rows.len(), 2);
        assert_eq!(doc.rows[1].value("nom"), "B");
        assert_eq!(doc.rows[1].value("ciutat"), "Lleida");
    }

    #[test]
    fn test_line_numbers_count_blank_lines() {
        let content = "nom;ciutat\n\nA;Girona\r\n   \r\n\nB;Lleida\n";
        let doc = parse_csv("a.csv", content).unwrap();

        assert_eq!(doc.rows[0].line_number, 3);
        assert_eq!(doc.rows[1].line_number, 6);
    }

    #[test]
    fn test_lone_carriage_return_stays_in_field() {
        let doc = parse_csv("a.csv", "nom;ciutat\nA\rB;Girona\n").unwrap();

        assert_eq!(doc.rows.len(), 1);
        assert_eq!(doc.rows[0].value("nom"), "A\rB");
        assert_eq!(doc.rows[0].value("ciutat"), "Girona");
        assert_eq!(doc.rows[0].line_number, 2);
    }

    #[test]
    fn test_short_row_fills_empty_and_long_row_is_cut() {
        let content = "a;b;c\n1\n1;2;3;4\n";
        let doc = parse_csv("a.csv", content).unwrap();

        assert_eq!(doc.rows[0].value("a"), "1");
        assert_eq!(doc.rows[0].get("b"), Some(""));
        assert_eq!(doc.rows[0].get("c"), Some(""));
        assert_eq!(doc.rows[1].len(), 3);
        assert_eq!(doc.rows[1].value("c"), "3");
    }

    #[test]
    fn test_quotes_are_not_special() {
        let content = "nom;direccio\n\"Casa;Batllo\";x\n";
        let doc = parse_csv("a.csv", content).unwrap();

        assert_eq!(doc.rows[0].value("nom"), "\"Casa");
        assert_eq!(doc.rows[0].value("direccio"), "Batllo\"");
    }

    #[test]
    fn test_empty_content_is_format_error() {
        assert!(matches!(parse_csv("a.csv", ""), Err(FormatError::Empty)));
        assert!(matches!(parse_csv("a.csv", "\n  \r\n\n"), Err(FormatError::Empty)));
    }

    #[test]
    fn test_header_only_yields_no_rows() {
        let doc = parse_csv("a.csv", "nom;ciutat\n").unwrap();
        assert!(doc.rows.is_empty());
    }

    #[test]
    fn test_wrong_extension_rejected_before_parsing() {
        let result = parse_csv("a.txt", "nom\nx\n");
        assert!(matches!(result, Err(FormatError::NotCsv(_))));
    }

    #[test]
    fn test_row_of_empty_fields_is_not_blank() {
        let doc = parse_csv("a.csv", "a;b\n;\n").unwrap();
        assert_eq!(doc.rows.len(), 1);
        assert_eq!(doc.rows[0].value("a"), "");
    }

    #[tokio::test]
    async fn test_read_csv_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("punts.csv");
        std::fs::write(&path, FIXTURE).unwrap();

        let doc = read_csv(&path).await.unwrap();
        assert_eq!(doc.file_name, "punts.csv");
        assert_eq!(doc.rows.len(), 3);
    }

    #[tokio::test]
    async fn test_read_csv_rejects_name_without_opening() {
        let result = read_csv(Path::new("/does/not/exist/punts.json")).await;
        assert!(matches!(result, Err(FormatError::NotCsv(_))));
    }

    #[tokio::test]
    async fn test_read_csv_missing_file_is_io_error() {
        let result = read_csv(Path::new("/does/not/exist/punts.csv")).await;
        assert!(matches!(result, Err(FormatError::Io(_))));
    }
}
