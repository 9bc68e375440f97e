pub mod errors;
pub mod model;
mod reader;

pub use errors::ParserError;
pub use model::{Header, ParsedCsv, RawRecord};
pub use reader::{decode_utf8, parse_csv, parse_csv_bytes, CsvOptions};
