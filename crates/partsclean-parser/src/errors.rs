use thiserror::Error;

#[derive(Debug, Error)]
pub enum ParserError {
    #[error("input is not valid UTF-8: {0}")]
    InvalidUtf8(#[from] std::str::Utf8Error),

    #[error("input contains no header line")]
    MissingHeader,

    #[error("header line {line} has no named columns")]
    EmptyHeader { line: usize },

    #[error("CSV error near line {line}: {source}")]
    Csv {
        line: usize,
        #[source]
        source: csv::Error,
    },
}
