use std::fmt;

use serde::{Deserialize, Serialize};

/// Column names from the first non-blank line, exactly as written in the file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Header {
    columns: Vec<String>,
}

impl Header {
    pub fn new<I, S>(columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            columns: columns.into_iter().map(Into::into).collect(),
        }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn contains(&self, column: &str) -> bool {
        self.columns.iter().any(|existing| existing == column)
    }
}

impl fmt::Display for Header {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.columns.join(","))
    }
}

/// One data line, keyed by the header's column names.
///
/// Values beyond the header width are kept in `overflow` so the row-shape
/// check downstream can see them; short rows simply carry fewer fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawRecord {
    line: usize,
    fields: Vec<(String, String)>,
    overflow: Vec<String>,
}

impl RawRecord {
    pub fn new(line: usize, fields: Vec<(String, String)>, overflow: Vec<String>) -> Self {
        Self {
            line,
            fields,
            overflow,
        }
    }

    /// Builds a record for the given header, zipping values positionally.
    pub fn from_values<I, S>(line: usize, header: &Header, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut fields = Vec::with_capacity(header.len());
        let mut overflow = Vec::new();
        for (idx, value) in values.into_iter().enumerate() {
            match header.columns().get(idx) {
                Some(column) => fields.push((column.clone(), value.into())),
                None => overflow.push(value.into()),
            }
        }
        Self::new(line, fields, overflow)
    }

    pub fn line(&self) -> usize {
        self.line
    }

    pub fn fields(&self) -> &[(String, String)] {
        &self.fields
    }

    pub fn overflow(&self) -> &[String] {
        &self.overflow
    }

    pub fn get(&self, column: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, value)| value.as_str())
    }

    pub fn is_blank(&self) -> bool {
        self.fields.iter().all(|(_, value)| value.trim().is_empty())
            && self.overflow.iter().all(|value| value.trim().is_empty())
    }
}

#[derive(Debug, Clone)]
pub struct ParsedCsv {
    pub header: Header,
    pub records: Vec<RawRecord>,
}
