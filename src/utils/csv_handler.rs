//! Sub-ID CSV 导出
//!
//! 两列 (`sub_id,url`) 或四列 (`sub_id,url,task_id,created_at`)，供 Web Admin 下载

use std::io::Write;

use chrono::Utc;
use csv::WriterBuilder;
use serde::Serialize;

use crate::errors::TrackdeskError;
use crate::storage::SubId;

/// 导出列布局
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ExportColumns {
    #[default]
    Two,
    Four,
}

impl TryFrom<u8> for ExportColumns {
    type Error = TrackdeskError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            2 => Ok(ExportColumns::Two),
            4 => Ok(ExportColumns::Four),
            other => Err(TrackdeskError::validation(format!(
                "Unsupported column count {}, expected 2 or 4",
                other
            ))),
        }
    }
}

#[derive(Debug, Serialize)]
struct ShortRow<'a> {
    sub_id: &'a str,
    url: &'a str,
}

#[derive(Debug, Serialize)]
struct FullRow<'a> {
    sub_id: &'a str,
    url: &'a str,
    task_id: &'a str,
    created_at: String,
}

/// 写出 CSV（带表头），空值写为空单元格
pub fn write_sub_ids_csv<W: Write>(
    records: &[SubId],
    columns: ExportColumns,
    writer: W,
) -> Result<(), TrackdeskError> {
    let mut csv_writer = WriterBuilder::new().from_writer(writer);

    for record in records {
        let url = record.url.as_deref().unwrap_or("");
        match columns {
            ExportColumns::Two => csv_writer.serialize(ShortRow {
                sub_id: &record.value,
                url,
            })?,
            ExportColumns::Four => csv_writer.serialize(FullRow {
                sub_id: &record.value,
                url,
                task_id: record.task_id.as_deref().unwrap_or(""),
                created_at: record.created_at.to_rfc3339(),
            })?,
        }
    }

    // 没有数据行时 serialize 不会写表头
    if records.is_empty() {
        match columns {
            ExportColumns::Two => csv_writer.write_record(["sub_id", "url"])?,
            ExportColumns::Four => {
                csv_writer.write_record(["sub_id", "url", "task_id", "created_at"])?
            }
        }
    }

    csv_writer
        .flush()
        .map_err(|e| TrackdeskError::file_operation(format!("Failed to flush CSV: {}", e)))?;
    Ok(())
}

pub fn sub_ids_to_csv(records: &[SubId], columns: ExportColumns) -> Result<String, TrackdeskError> {
    let mut buf = Vec::new();
    write_sub_ids_csv(records, columns, &mut buf)?;
    String::from_utf8(buf)
        .map_err(|e| TrackdeskError::serialization(format!("CSV is not valid UTF-8: {}", e)))
}

/// 生成默认导出文件名（带网站名与时间戳）
pub fn generate_export_filename(website_name: &str) -> String {
    let slug: String = website_name
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c.to_ascii_lowercase() } else { '_' })
        .collect();
    format!(
        "sub_ids_{}_{}.csv",
        slug.trim_matches('_'),
        Utc::now().format("%Y%m%d_%H%M%S")
    )
}
