// Text ingestion: pasted text or uploaded file content -> participant names.
//
// Format is "one name per line or comma-separated". There is no header row
// and no escaping, so a name can never contain a comma or a newline.

use std::path::{Path, PathBuf};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum IngestError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("{path} is not valid UTF-8 text")]
    Encoding { path: PathBuf },
}

/// Demo roster appended by the "sample names" action.
pub const SAMPLE_NAMES: [&str; 20] = [
    "王小明", "李美玲", "張家豪", "陳怡君", "林俊傑",
    "周杰倫", "蔡英文", "柯文哲", "郭台銘", "徐若瑄",
    "黃子佼", "吳宗憲", "陶晶瑩", "蕭敬騰", "鄧紫棋",
    "蔡依林", "羅志祥", "楊丞琳", "潘瑋柏", "林志玲",
];

/// Split raw text into trimmed, non-empty names, preserving input order.
///
/// Newlines and commas are both separators, so `"A, B\nC"` yields three names.
pub fn parse_names(text: &str) -> Vec<String> {
    text.split(['\n', ','])
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .map(str::to_string)
        .collect()
}

/// Read a `.csv` / `.txt` file and parse its names.
///
/// A leading UTF-8 byte-order mark (as written by spreadsheet exports) is
/// stripped before parsing.
pub fn read_names_file(path: &Path) -> Result<Vec<String>, IngestError> {
    let bytes = std::fs::read(path).map_err(|source| IngestError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let text = String::from_utf8(bytes).map_err(|_| IngestError::Encoding {
        path: path.to_path_buf(),
    })?;
    let text = text.strip_prefix('\u{feff}').unwrap_or(&text);
    Ok(parse_names(text))
}

/// The demo names as owned strings.
pub fn sample_names() -> Vec<String> {
    SAMPLE_NAMES.iter().map(|n| n.to_string()).collect()
}
