use crate::model::{SettlementStatus, StatementRow};
use anyhow::{anyhow, bail, Context, Result};
use calamine::{open_workbook_auto, DataType, Reader};
use chrono::NaiveDateTime;
use std::collections::HashMap;
use std::io::Read;
use std::path::Path;

const COL_USED_AT: &str = "이용일시";
const COL_APPROVAL_NO: &str = "승인번호";
const COL_HOLDER: &str = "본인구분";
const COL_BRAND: &str = "브랜드";
const COL_CARD_TAIL: &str = "이용카드";
const COL_MERCHANT: &str = "가맹점명";
const COL_AMOUNT: &str = "이용금액";
const COL_USAGE_TYPE: &str = "이용구분";
const COL_STATUS: &str = "매입상태";

// Timestamp formats seen across card-company exports. Date-only rows are
// taken as midnight.
const USED_AT_FORMATS: [&str; 6] = [
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y/%m/%d %H:%M:%S",
    "%Y/%m/%d %H:%M",
    "%Y.%m.%d %H:%M:%S",
    "%Y.%m.%d %H:%M",
];
const USED_AT_DATE_FORMATS: [&str; 3] = ["%Y-%m-%d", "%Y/%m/%d", "%Y.%m.%d"];

/// Reads a statement file, picking the reader from the file extension.
pub fn read_statement(path: &Path) -> Result<Vec<StatementRow>> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());
    let label = path.display().to_string();
    match extension.as_deref() {
        Some("xls") | Some("xlsx") => import_workbook(path),
        Some("csv") => {
            let file = std::fs::File::open(path).with_context(|| format!("{label}: open failed"))?;
            import_csv(&label, file)
        }
        _ => bail!("{label}: unsupported file type (supported: .xls, .xlsx, .csv)"),
    }
}

/// Imports the first worksheet of an Excel workbook. Remaining sheets are
/// ignored.
pub fn import_workbook(path: &Path) -> Result<Vec<StatementRow>> {
    let label = path.display().to_string();
    let mut workbook =
        open_workbook_auto(path).with_context(|| format!("{label}: open failed"))?;
    let range = match workbook.worksheet_range_at(0) {
        Some(range) => range.with_context(|| format!("{label}: failed to read first sheet"))?,
        None => return Ok(Vec::new()),
    };

    let mut rows = range.rows();
    let header: Vec<String> = match rows.next() {
        Some(cells) => cells.iter().map(|c| c.to_string().trim().to_string()).collect(),
        None => return Ok(Vec::new()),
    };

    let mut statement = Vec::new();
    // Row 1 is the header.
    for (i, cells) in rows.enumerate() {
        let line = i + 2;
        let as_kv: HashMap<String, String> = header
            .iter()
            .zip(cells.iter())
            .map(|(h, c)| (h.clone(), cell_to_string(c)))
            .collect();
        if as_kv.values().all(|v| v.is_empty()) {
            // Trailing blank rows are common in exported workbooks.
            continue;
        }
        statement.push(parse_row(&label, line, &as_kv)?);
    }
    Ok(statement)
}

fn cell_to_string(cell: &DataType) -> String {
    match cell {
        DataType::String(s) => s.trim().to_string(),
        // Integer amounts come back as floats from Excel.
        DataType::Float(f) if f.fract() == 0.0 => format!("{}", *f as i64),
        DataType::DateTime(_) => cell
            .as_datetime()
            .map(|dt| dt.format("%Y-%m-%d %H:%M:%S").to_string())
            .unwrap_or_default(),
        DataType::Empty => String::new(),
        other => other.to_string().trim().to_string(),
    }
}

/// Imports a .csv export carrying the same columns as the workbook format.
pub fn import_csv<T>(label: &str, reader: T) -> Result<Vec<StatementRow>>
where
    T: Read,
{
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(b',')
        .quote(b'"')
        .from_reader(reader);

    let header: Vec<String> = reader
        .headers()?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();

    let mut statement = Vec::new();
    let mut line = 2; // line 1 is the header.
    for result in reader.records() {
        let record = result.map_err(|e| anyhow!("{}: {}", label, e))?;
        let as_kv: HashMap<String, String> = header
            .iter()
            .zip(record.iter())
            .map(|(h, r)| (h.clone(), r.trim().to_string()))
            .collect();
        statement.push(parse_row(label, line, &as_kv)?);
        line += 1;
    }
    Ok(statement)
}

fn parse_row(label: &str, line: usize, as_kv: &HashMap<String, String>) -> Result<StatementRow> {
    let required = |column: &str| -> Result<&String> {
        as_kv
            .get(column)
            .ok_or(anyhow!("{label}:{line} has no '{column}' field"))
    };
    let optional = |column: &str| as_kv.get(column).cloned().unwrap_or_default();

    let used_at = parse_used_at(required(COL_USED_AT)?)
        .map_err(|e| anyhow!("{label}:{line} failed to parse '{COL_USED_AT}': {e}"))?;
    let amount = parse_amount(required(COL_AMOUNT)?)
        .map_err(|e| anyhow!("{label}:{line} failed to parse '{COL_AMOUNT}': {e}"))?;
    let status = SettlementStatus::parse(&optional(COL_STATUS))
        .map_err(|e| anyhow!("{label}:{line}: {e}"))?;

    let merchant = required(COL_MERCHANT)?.trim().to_string();
    if merchant.is_empty() {
        bail!("{label}:{line} has an empty '{COL_MERCHANT}' field");
    }

    Ok(StatementRow {
        used_at,
        approval_no: required(COL_APPROVAL_NO)?.to_string(),
        holder: optional(COL_HOLDER),
        brand: optional(COL_BRAND),
        card_tail: optional(COL_CARD_TAIL),
        merchant,
        amount,
        usage_type: optional(COL_USAGE_TYPE),
        status,
    })
}

pub fn parse_used_at(value: &str) -> Result<NaiveDateTime> {
    let value = value.trim();
    for format in USED_AT_FORMATS {
        if let Ok(parsed) = NaiveDateTime::parse_from_str(value, format) {
            return Ok(parsed);
        }
    }
    for format in USED_AT_DATE_FORMATS {
        if let Ok(parsed) = chrono::NaiveDate::parse_from_str(value, format) {
            return parsed
                .and_hms_opt(0, 0, 0)
                .ok_or(anyhow!("invalid timestamp '{value}'"));
        }
    }
    bail!("invalid timestamp '{value}'")
}

fn parse_amount(value: &str) -> Result<i64> {
    let cleaned = value.replace(',', "");
    let cleaned = cleaned.trim_end_matches('원').trim();
    if cleaned.is_empty() {
        return Ok(0);
    }
    let amount: i64 = cleaned
        .parse()
        .map_err(|_| anyhow!("invalid amount '{value}'"))?;
    if amount < 0 {
        bail!("negative amount '{value}'");
    }
    Ok(amount)
}


#[cfg(test)]
mod parse_amount_tests {
    use super::*;

    #[test]
    fn plain_and_grouped() {
        assert_eq!(parse_amount("5500").unwrap(), 5500);
        assert_eq!(parse_amount("1,234,567").unwrap(), 1234567);
    }

    #[test]
    fn won_suffix() {
        assert_eq!(parse_amount("5,500원").unwrap(), 5500);
    }

    #[test]
    fn empty_is_zero() {
        assert_eq!(parse_amount("").unwrap(), 0);
    }

    #[test]
    fn rejects_negative_and_garbage() {
        assert!(parse_amount("-100").is_err());
        assert!(parse_amount("오천원").is_err());
    }
}
