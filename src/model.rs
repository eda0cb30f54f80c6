use anyhow::{bail, Result};
use chrono::NaiveDateTime;
use std::collections::HashSet;
use std::fmt::{Display, Error, Formatter};
use std::sync::OnceLock;

/// Minimum amount (won) for a transaction to earn points at all.
pub const MIN_QUALIFYING_AMOUNT: i64 = 5000;

/// Points are the "spare change" below the nearest multiple of this.
pub const POINT_UNIT: i64 = 1000;

// Merchants whose points are doubled under the card's promotional terms
// (food delivery and utility autopay aggregators).
const SPECIAL_MERCHANTS: [&str; 4] = [
    "(주)우아한형제들",
    "요기요_위대한상상",
    "KT통신요금 자동납부",
    "SKT 요금납부",
];

pub fn is_special_merchant(name: &str) -> bool {
    static SET: OnceLock<HashSet<&'static str>> = OnceLock::new();
    SET.get_or_init(|| SPECIAL_MERCHANTS.into_iter().collect())
        .contains(name)
}

/// 매입상태 column of the statement.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum SettlementStatus {
    Captured,
    Cancelled,
    #[default]
    Pending,
}

impl SettlementStatus {
    pub fn parse(value: &str) -> Result<SettlementStatus> {
        match value.trim() {
            "전표매입" => Ok(SettlementStatus::Captured),
            "승인취소" => Ok(SettlementStatus::Cancelled),
            "" => Ok(SettlementStatus::Pending),
            other => bail!("unknown 매입상태 value: '{other}'"),
        }
    }
}

impl Display for SettlementStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), Error> {
        let s = match self {
            SettlementStatus::Captured => "전표매입",
            SettlementStatus::Cancelled => "승인취소",
            SettlementStatus::Pending => "",
        };
        write!(f, "{}", s)
    }
}

/// One row of the card statement, exactly as imported.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct StatementRow {
    pub used_at: NaiveDateTime,
    pub approval_no: String,
    pub holder: String,
    pub brand: String,
    pub card_tail: String,
    pub merchant: String,
    pub amount: i64,
    pub usage_type: String,
    pub status: SettlementStatus,
}

/// A statement row enriched by the point calculator.
#[derive(Debug, Clone, PartialEq)]
pub struct Transaction {
    pub row: StatementRow,
    /// True for at most one transaction per (calendar day, merchant) pair.
    pub first_qualifying_of_day: bool,
    pub points: i64,
    /// points / amount; defined as 0.0 when amount is 0.
    pub pick_rate: f64,
}

/// Full output of the point calculator for one statement.
#[derive(Debug, Default, Clone)]
pub struct Accrual {
    pub transactions: Vec<Transaction>,
    /// Sum of amounts over non-cancelled transactions.
    pub total_used: i64,
    /// Sum of points over all transactions.
    pub total_points: i64,
}

impl Accrual {
    /// Overall pick rate for the statement; 0.0 on an empty statement.
    pub fn overall_pick_rate(&self) -> f64 {
        if self.total_used == 0 {
            0.0
        } else {
            self.total_points as f64 / self.total_used as f64
        }
    }
}

/// One row of the per-merchant ranking.
#[derive(Debug, Clone, PartialEq)]
pub struct MerchantTotals {
    pub merchant: String,
    pub total_used: i64,
    pub total_points: i64,
}


#[cfg(test)]
mod special_merchant_tests {
    use super::*;

    #[test]
    fn allowlist_members() {
        assert!(is_special_merchant("(주)우아한형제들"));
        assert!(is_special_merchant("SKT 요금납부"));
    }

    #[test]
    fn other_merchants() {
        assert!(!is_special_merchant("스타벅스코리아"));
        assert!(!is_special_merchant(""));
        // Membership is exact, not substring.
        assert!(!is_special_merchant("SKT 요금납부 "));
    }
}
