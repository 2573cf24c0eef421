// CSV export of a grouping batch.

use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use thiserror::Error;
use tracing::info;

use crate::model::Group;

/// Header row of the exported file: group, member name.
pub const CSV_HEADER: [&str; 2] = ["組別", "成員姓名"];

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("there are no groups to export")]
    NoGroups,

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("failed to write {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Serialize `groups` into CSV bytes: a UTF-8 BOM, the header row, then one
/// row per (group, member) pair in group order. Every field is quoted.
pub fn groups_csv(groups: &[Group]) -> Result<Vec<u8>, ExportError> {
    let mut buf = UTF8_BOM.to_vec();
    {
        let mut writer = csv::WriterBuilder::new()
            .quote_style(csv::QuoteStyle::Always)
            .from_writer(&mut buf);
        writer.write_record(CSV_HEADER)?;
        for group in groups {
            for member in &group.members {
                writer.write_record([group.name.as_str(), member.name.as_str()])?;
            }
        }
        writer.flush().map_err(csv::Error::from)?;
    }
    Ok(buf)
}

/// File name for an export made on `date`.
pub fn export_file_name(date: NaiveDate) -> String {
    format!("分組結果_{}.csv", date.format("%Y-%m-%d"))
}

/// Write `groups` as CSV into `dir` (created if missing) and return the path.
pub fn write_groups_csv(groups: &[Group], dir: &Path, date: NaiveDate) -> Result<PathBuf, ExportError> {
    if groups.is_empty() {
        return Err(ExportError::NoGroups);
    }
    let bytes = groups_csv(groups)?;
    let path = dir.join(export_file_name(date));

    let io_err = |source: std::io::Error| ExportError::Io {
        path: path.clone(),
        source,
    };
    std::fs::create_dir_all(dir).map_err(io_err)?;
    let mut file = std::fs::File::create(&path).map_err(io_err)?;
    file.write_all(&bytes).map_err(io_err)?;

    info!("Exported {} groups to {}", groups.len(), path.display());
    Ok(path)
}
