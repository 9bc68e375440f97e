use crate::error::Result;
use crate::record::NormalizedRecord;

pub const JSON_CONTENT_TYPE: &str = "application/json";

/// Pretty-printed JSON array of accepted records. Field order follows the
/// header and non-ASCII text is written as-is.
pub fn encode_json(records: &[NormalizedRecord]) -> Result<Vec<u8>> {
    let mut bytes = serde_json::to_vec_pretty(records)?;
    bytes.push(b'\n');
    Ok(bytes)
}

/// `incoming/parts.csv` -> `incoming/parts.json`. Keys without a `.csv`
/// extension get `.json` appended.
pub fn derive_output_key(source_key: &str) -> String {
    let split = source_key.len().saturating_sub(4);
    match source_key.get(split..) {
        Some(ext) if ext.eq_ignore_ascii_case(".csv") => {
            format!("{}.json", &source_key[..split])
        }
        _ => format!("{source_key}.json"),
    }
}
