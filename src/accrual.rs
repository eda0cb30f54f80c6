use crate::model::{
    is_special_merchant, Accrual, MerchantTotals, SettlementStatus, StatementRow, Transaction,
    MIN_QUALIFYING_AMOUNT, POINT_UNIT,
};
use chrono::NaiveDate;
use std::collections::{HashMap, HashSet};

/// Runs the point accrual over one statement.
///
/// Transactions are bucketed by calendar day and walked chronologically
/// within each day. The first transaction at a given merchant on a given day
/// earns points if it was not cancelled and its amount is at least
/// `MIN_QUALIFYING_AMOUNT`; every other transaction earns nothing. Points are
/// the won below the nearest `POINT_UNIT`, doubled at special merchants.
///
/// The output keeps day groups in the order their dates first appear in the
/// input, chronologically sorted within each day. Equal timestamps keep
/// their input order.
pub fn calculate(rows: Vec<StatementRow>) -> Accrual {
    // Day buckets, keyed by the local calendar day of the timestamp.
    let mut days: Vec<(NaiveDate, Vec<StatementRow>)> = Vec::new();
    let mut day_index: HashMap<NaiveDate, usize> = HashMap::new();
    for row in rows {
        let date = row.used_at.date();
        match day_index.get(&date) {
            Some(&i) => days[i].1.push(row),
            None => {
                day_index.insert(date, days.len());
                days.push((date, vec![row]));
            }
        }
    }

    let mut accrual = Accrual::default();
    for (_, mut day) in days {
        // Stable, so same-instant rows keep their statement order.
        day.sort_by_key(|row| row.used_at);

        let mut credited: HashSet<String> = HashSet::new();
        for row in day {
            let first_qualifying_of_day = row.status != SettlementStatus::Cancelled
                && row.amount >= MIN_QUALIFYING_AMOUNT
                && !credited.contains(&row.merchant);
            if first_qualifying_of_day {
                credited.insert(row.merchant.clone());
            }

            let points = if first_qualifying_of_day {
                let multiplier = if is_special_merchant(&row.merchant) { 2 } else { 1 };
                (row.amount % POINT_UNIT) * multiplier
            } else {
                0
            };

            if row.status != SettlementStatus::Cancelled {
                accrual.total_used += row.amount;
            }
            accrual.total_points += points;

            let pick_rate = if row.amount == 0 {
                0.0
            } else {
                points as f64 / row.amount as f64
            };
            accrual.transactions.push(Transaction {
                row,
                first_qualifying_of_day,
                points,
                pick_rate,
            });
        }
    }
    accrual
}

/// Per-merchant totals over non-cancelled transactions, ranked by points
/// earned, descending. Merchants with equal points keep the order they first
/// appear in the transaction list.
pub fn merchant_ranking(transactions: &[Transaction]) -> Vec<MerchantTotals> {
    let mut totals: Vec<MerchantTotals> = Vec::new();
    let mut by_merchant: HashMap<String, usize> = HashMap::new();
    for transaction in transactions {
        if transaction.row.status == SettlementStatus::Cancelled {
            continue;
        }
        let i = *by_merchant
            .entry(transaction.row.merchant.clone())
            .or_insert_with(|| {
                totals.push(MerchantTotals {
                    merchant: transaction.row.merchant.clone(),
                    total_used: 0,
                    total_points: 0,
                });
                totals.len() - 1
            });
        totals[i].total_used += transaction.row.amount;
        totals[i].total_points += transaction.points;
    }
    totals.sort_by_key(|m| std::cmp::Reverse(m.total_points));
    totals
}
