// ==========================================
// Setup Sheet Analyzer - Ledger CSV export
// ==========================================
// Format: one header row, one row per ledger entry
// Usage columns are seconds; missing metrics are empty cells
// ==========================================

use crate::api::dto::LedgerRow;
use crate::domain::types::OperationCategory;
use std::io::Write;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ExportError {
    #[error("CSV write failed: {0}")]
    Csv(#[from] csv::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type ExportResult<T> = Result<T, ExportError>;

const FIXED_HEADERS: [&str; 6] = [
    "name",
    "diameter",
    "price",
    "need",
    "relational_durability",
    "cost",
];

const TRAILING_HEADERS: [&str; 5] = ["usage_total", "registered", "group", "members", "sources"];

/// Write `rows` as CSV to `writer`
pub fn write_ledger_csv<W: Write>(rows: &[LedgerRow], writer: W) -> ExportResult<()> {
    let mut csv_writer = csv::Writer::from_writer(writer);

    let mut header: Vec<String> = FIXED_HEADERS.iter().map(|h| h.to_string()).collect();
    for category in OperationCategory::ALL {
        header.push(format!("usage_{}", category.as_str().to_lowercase()));
    }
    header.extend(TRAILING_HEADERS.iter().map(|h| h.to_string()));
    csv_writer.write_record(&header)?;

    for row in rows {
        let mut record = vec![
            row.name.clone(),
            row.diameter.to_string(),
            optional(row.price),
            optional(row.need),
            optional(row.relational_durability),
            optional(row.cost),
        ];
        for category in OperationCategory::ALL {
            record.push(row.usage[category].to_string());
        }
        record.push(row.total_usage.to_string());
        record.push(row.registered.to_string());
        record.push(row.is_group.to_string());
        record.push(row.members.join("; "));
        record.push(row.sources.join("; "));
        csv_writer.write_record(&record)?;
    }

    csv_writer.flush()?;
    Ok(())
}

fn optional(value: Option<f64>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::types::{ToolDurability, ToolUsage};

    fn row(name: &str) -> LedgerRow {
        LedgerRow {
            name: name.to_string(),
            diameter: 6.8,
            price: None,
            durability: ToolDurability::default(),
            need: Some(0.25),
            relational_durability: Some(4.0),
            cost: Some(0.0),
            usage: ToolUsage {
                drilling: 45.0,
                ..Default::default()
            },
            total_usage: 45.0,
            registered: false,
            is_group: false,
            members: Vec::new(),
            sources: vec!["OP10".to_string(), "OP20".to_string()],
            selected: false,
        }
    }

    #[test]
    fn test_header_and_row() {
        let mut out = Vec::new();
        write_ledger_csv(&[row("DR6.8")], &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        let mut lines = text.lines();

        assert_eq!(
            lines.next().unwrap(),
            "name,diameter,price,need,relational_durability,cost,usage_rough,usage_drilling,\
             usage_face_milling,usage_semi_finish,usage_finish,usage_total,registered,group,members,sources"
        );
        assert_eq!(
            lines.next().unwrap(),
            "DR6.8,6.8,,0.25,4,0,0,45,0,0,0,45,false,false,,OP10; OP20"
        );
        assert!(lines.next().is_none());
    }

    #[test]
    fn test_empty_ledger_writes_header_only() {
        let mut out = Vec::new();
        write_ledger_csv(&[], &mut out).unwrap();
        assert_eq!(String::from_utf8(out).unwrap().lines().count(), 1);
    }
}
