//! 列表导出与简单统计

use crate::crud::Record;
use crate::form::display_value;
use campusdesk_shared::ResourceSchema;
use chrono::NaiveDate;
use std::collections::BTreeMap;

/// 导出为 CSV，表头为字段标签，列顺序与资源描述一致
pub fn to_csv(schema: &ResourceSchema, items: &[Record]) -> String {
    let mut out = String::new();
    let header: Vec<String> = schema.fields.iter().map(|f| escape(f.label)).collect();
    out.push_str(&header.join(","));
    out.push_str("\r\n");

    for item in items {
        let row: Vec<String> = schema
            .fields
            .iter()
            .map(|f| escape(&item.get(f.name).map(display_value).unwrap_or_default()))
            .collect();
        out.push_str(&row.join(","));
        out.push_str("\r\n");
    }
    out
}

fn escape(value: &str) -> String {
    if value.contains([',', '"', '\r', '\n']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

pub fn to_json_pretty(items: &[Record]) -> String {
    serde_json::to_string_pretty(items).unwrap_or_else(|_| "[]".to_string())
}

/// 按字段取值计数，缺失或空值归入 "未填写"
pub fn tally_by(items: &[Record], field: &str) -> BTreeMap<String, usize> {
    let mut tally = BTreeMap::new();
    for item in items {
        let key = item
            .get(field)
            .map(display_value)
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| "未填写".to_string());
        *tally.entry(key).or_insert(0) += 1;
    }
    tally
}

/// 导出文件名，例如 `students-2026-03-01.csv`
pub fn export_filename(schema: &ResourceSchema, date: NaiveDate, extension: &str) -> String {
    format!(
        "{}-{}.{}",
        schema.path.trim_start_matches('/'),
        date.format("%Y-%m-%d"),
        extension
    )
}
