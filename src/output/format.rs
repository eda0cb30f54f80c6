use chrono::NaiveDateTime;

pub trait ToOutputFormat {
    fn to_output_format(&self) -> String;
}

impl ToOutputFormat for String {
    fn to_output_format(&self) -> String {
        self.to_string()
    }
}

impl ToOutputFormat for str {
    fn to_output_format(&self) -> String {
        self.to_string()
    }
}

impl ToOutputFormat for NaiveDateTime {
    fn to_output_format(&self) -> String {
        format!("{}", self.format("%Y/%m/%d %H:%M"))
    }
}

/// Won amount with digit grouping: 1234567 -> "₩1,234,567".
pub fn won(amount: i64) -> String {
    let digits = amount.unsigned_abs().to_string();
    let mut grouped = String::new();
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }
    if amount < 0 {
        format!("-₩{grouped}")
    } else {
        format!("₩{grouped}")
    }
}

/// Ratio as a percentage with at most two decimals: 0.0909 -> "9.09%".
/// Non-finite input renders as "-" instead of leaking NaN to the terminal.
pub fn percent(rate: f64) -> String {
    if !rate.is_finite() {
        return "-".to_string();
    }
    format!("{}%", (rate * 10000.0).round() / 100.0)
}
