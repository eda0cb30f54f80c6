use crate::accrual::merchant_ranking;
use crate::model::Accrual;
use crate::output::{chart, table, Output, OutputForTesting};
use crate::RankBy;
use anyhow::Result;
use std::io::Write;

pub fn command_merchants<W>(
    writer: &mut W,
    accrual: &Accrual,
    by: RankBy,
    top: usize,
    as_chart: bool,
) -> Result<OutputForTesting>
where
    W: Write,
{
    let ranking = merchant_ranking(&accrual.transactions);
    if as_chart {
        let mut co = chart::ChartOutput::new(writer, None);
        co.render_merchants(&ranking, by, top)
    } else {
        let mut to = table::TableOutput::new(writer, None);
        to.render_merchants(&ranking, by, top)
    }
}

#[cfg(test)]
mod merchants_tests {
    use super::*;
    use crate::accrual::calculate;
    use crate::import::parse_used_at;
    use crate::model::{SettlementStatus, StatementRow};
    use serde_json;
    use std::io::Cursor;

    fn sample() -> Accrual {
        let row = |used_at: &str, merchant: &str, amount: i64, status| StatementRow {
            used_at: parse_used_at(used_at).unwrap(),
            approval_no: format!("{merchant}-{amount}"),
            merchant: merchant.to_string(),
            amount,
            status,
            ..StatementRow::default()
        };
        calculate(vec![
            // 500 points over two days, 11,000 won spent.
            row(
                "2021-03-01 09:00:00",
                "김밥천국",
                5100,
                SettlementStatus::Captured,
            ),
            row(
                "2021-03-02 09:00:00",
                "김밥천국",
                5900,
                SettlementStatus::Captured,
            ),
            // 1,800 points, 21,900 won.
            row(
                "2021-03-01 11:00:00",
                "(주)우아한형제들",
                21900,
                SettlementStatus::Captured,
            ),
            // Cancelled: invisible to the ranking.
            row(
                "2021-03-01 12:00:00",
                "스타벅스코리아",
                9000,
                SettlementStatus::Cancelled,
            ),
        ])
    }

    #[test]
    fn columns() {
        let accrual = sample();
        let output =
            command_merchants(&mut Cursor::new(vec![]), &accrual, RankBy::points, 5, false)
                .unwrap();
        if let OutputForTesting::Table((columns, _)) = output {
            assert_eq!(
                columns,
                vec!["순위", "가맹점명", "사용 금액", "적립 포인트", "피킹률"]
            );
        } else {
            unimplemented!();
        }
    }

    #[test]
    fn ranks_by_points() {
        let accrual = sample();
        let output =
            command_merchants(&mut Cursor::new(vec![]), &accrual, RankBy::points, 5, false)
                .unwrap();
        if let OutputForTesting::Table((_, rows)) = output {
            assert_eq!(rows.len(), 2);
            assert_eq!(rows[0][0], "1");
            assert_eq!(rows[0][1], "(주)우아한형제들");
            assert_eq!(rows[0][3], "₩1,800");
            assert_eq!(rows[1][1], "김밥천국");
            assert_eq!(rows[1][2], "₩11,000");
            assert_eq!(rows[1][3], "₩500");
        } else {
            unimplemented!();
        }
    }

    #[test]
    fn ranks_by_spend() {
        let accrual = sample();
        let output =
            command_merchants(&mut Cursor::new(vec![]), &accrual, RankBy::spent, 5, false)
                .unwrap();
        if let OutputForTesting::Table((_, rows)) = output {
            assert_eq!(rows[0][1], "(주)우아한형제들");
            assert_eq!(rows[1][1], "김밥천국");
        } else {
            unimplemented!();
        }
    }

    #[test]
    fn top_truncates() {
        let accrual = sample();
        let output =
            command_merchants(&mut Cursor::new(vec![]), &accrual, RankBy::points, 1, false)
                .unwrap();
        if let OutputForTesting::Table((_, rows)) = output {
            assert_eq!(rows.len(), 1);
            assert_eq!(rows[0][1], "(주)우아한형제들");
        } else {
            unimplemented!();
        }
    }

    #[test]
    fn cancelled_merchant_is_absent() {
        let accrual = sample();
        let output =
            command_merchants(&mut Cursor::new(vec![]), &accrual, RankBy::points, 0, false)
                .unwrap();
        if let OutputForTesting::Table((_, rows)) = output {
            assert!(rows.iter().all(|r| r[1] != "스타벅스코리아"));
        } else {
            unimplemented!();
        }
    }

    #[test]
    fn chart_output() {
        let accrual = sample();
        let output =
            command_merchants(&mut Cursor::new(vec![]), &accrual, RankBy::points, 5, true)
                .unwrap();
        if let OutputForTesting::Chart(chart_json) = output {
            let chart = serde_json::from_str::<serde_json::Value>(&chart_json).unwrap();
            let axis = chart.get("xAxis").unwrap().as_array().unwrap()[0]
                .get("data")
                .unwrap()
                .as_array()
                .unwrap();
            assert_eq!(axis.len(), 2);
        } else {
            unimplemented!();
        }
    }
}
