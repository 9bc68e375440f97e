use crate::errors::ParserError;
use crate::model::{Header, ParsedCsv, RawRecord};

const UTF8_BOM: char = '\u{feff}';

/// Reader settings. Only the field delimiter is configurable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CsvOptions {
    pub delimiter: u8,
}

impl Default for CsvOptions {
    fn default() -> Self {
        Self { delimiter: b',' }
    }
}

pub fn decode_utf8(contents: &[u8]) -> Result<&str, ParserError> {
    Ok(std::str::from_utf8(contents)?)
}

pub fn parse_csv_bytes(contents: &[u8], options: &CsvOptions) -> Result<ParsedCsv, ParserError> {
    parse_csv(decode_utf8(contents)?, options)
}

/// Splits CSV text into a header and its data records.
///
/// Blank lines are dropped before field splitting, so the header is the first
/// non-blank line. Rows whose every field is whitespace are skipped as well.
pub fn parse_csv(content: &str, options: &CsvOptions) -> Result<ParsedCsv, ParserError> {
    let content = content.strip_prefix(UTF8_BOM).unwrap_or(content);

    let mut line_numbers = Vec::new();
    let mut kept = String::with_capacity(content.len());
    for (idx, line) in content.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        line_numbers.push(idx + 1);
        kept.push_str(line);
        kept.push('\n');
    }

    let Some(&header_line) = line_numbers.first() else {
        return Err(ParserError::MissingHeader);
    };

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .delimiter(options.delimiter)
        .from_reader(kept.as_bytes());
    let mut rows = reader.records();

    let header_record = rows
        .next()
        .ok_or(ParserError::MissingHeader)?
        .map_err(|source| ParserError::Csv {
            line: header_line,
            source,
        })?;

    if header_record.iter().all(|column| column.trim().is_empty()) {
        return Err(ParserError::EmptyHeader { line: header_line });
    }
    let header = Header::new(header_record.iter());

    let mut records = Vec::new();
    for row in rows {
        let row = row.map_err(|source| {
            let line = source
                .position()
                .map(|pos| source_line(&line_numbers, pos.line()))
                .unwrap_or(header_line);
            ParserError::Csv { line, source }
        })?;

        let line = row
            .position()
            .map(|pos| source_line(&line_numbers, pos.line()))
            .unwrap_or(header_line);
        let record = RawRecord::from_values(line, &header, row.iter());
        if record.is_blank() {
            continue;
        }
        records.push(record);
    }

    Ok(ParsedCsv { header, records })
}

// csv reports 1-based lines of the filtered text; map them back to the input.
fn source_line(line_numbers: &[usize], filtered_line: u64) -> usize {
    let filtered = filtered_line as usize;
    line_numbers
        .get(filtered.saturating_sub(1))
        .copied()
        .unwrap_or(filtered)
}
