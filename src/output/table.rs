use crate::model::{is_special_merchant, Accrual, MerchantTotals, SettlementStatus, Transaction};
use crate::output::format::{percent, won, ToOutputFormat};
use crate::output::{Output, OutputForTesting};
use crate::RankBy;
use anyhow::{bail, Result};
use pager::Pager;
use std::cmp::min;
use std::io::Write;
use textwrap::core::display_width;

fn termwidth() -> usize {
    #[cfg(test)]
    return 44;
    #[allow(unreachable_code)]
    textwrap::termwidth()
}

fn setup_pager() {
    #[cfg(test)]
    return;
    #[allow(unreachable_code)]
    Pager::with_pager("less --quit-if-one-screen").setup()
}

#[derive(Clone, Copy, PartialEq)]
pub enum Align {
    Left,
    Right,
}

pub struct Column {
    pub title: String,
    pub align: Align,
}

impl Column {
    pub fn left(title: &str) -> Column {
        Column {
            title: title.to_string(),
            align: Align::Left,
        }
    }

    pub fn right(title: &str) -> Column {
        Column {
            title: title.to_string(),
            align: Align::Right,
        }
    }
}

fn horizontal_rule(widths: &[usize]) -> String {
    let mut rule = String::from("+");
    for width in widths {
        rule.push_str(&"-".repeat(*width));
        rule.push('+');
    }
    rule
}

fn write_row<W>(
    writer: &mut W,
    widths: &[usize],
    columns: &[Column],
    cells: &[String],
) -> Result<()>
where
    W: Write,
{
    let wrapped: Vec<Vec<String>> = cells
        .iter()
        .enumerate()
        .map(|(i, cell)| {
            textwrap::wrap(cell, widths[i].max(1))
                .iter()
                .map(|l| l.to_string())
                .collect()
        })
        .collect();
    let height = wrapped.iter().map(|lines| lines.len()).max().unwrap_or(1).max(1);

    for line_no in 0..height {
        write!(writer, "|")?;
        for (i, lines) in wrapped.iter().enumerate() {
            let line = lines.get(line_no).map(|l| l.as_str()).unwrap_or("");
            let pad = widths[i].saturating_sub(display_width(line));
            match columns[i].align {
                Align::Left => write!(writer, "{line}{:pad$}", "")?,
                Align::Right => write!(writer, "{:pad$}{line}", "")?,
            }
            write!(writer, "|")?;
        }
        writeln!(writer)?;
    }
    Ok(())
}

/// Renders a bordered table, wrapping cells so the whole table fits in
/// `termwidth`. Each column gets its natural width when everything fits;
/// otherwise columns are clamped to a fair share of the terminal and any
/// unused space is handed back to the clipped ones.
pub fn render_table<W>(
    writer: &mut W,
    termwidth: usize,
    columns: &[Column],
    rows: &[Vec<String>],
) -> Result<()>
where
    W: Write,
{
    let n_columns = columns.len();
    let budget = match termwidth.checked_sub(n_columns + 1) {
        Some(budget) if budget >= n_columns => budget,
        _ => bail!("terminal too narrow to render {n_columns} columns"),
    };
    let fair = budget / n_columns;

    let mut natural: Vec<usize> = columns.iter().map(|c| display_width(&c.title)).collect();
    for row in rows {
        for (i, cell) in row.iter().enumerate() {
            natural[i] = natural[i].max(display_width(cell));
        }
    }

    let mut widths: Vec<usize> = natural.iter().map(|w| min(*w, fair)).collect();
    let mut spare = budget - widths.iter().sum::<usize>();
    for i in 0..n_columns {
        let extra = min(natural[i] - widths[i], spare);
        widths[i] += extra;
        spare -= extra;
    }

    setup_pager();
    let rule = horizontal_rule(&widths);
    let titles: Vec<String> = columns.iter().map(|c| c.title.clone()).collect();
    writeln!(writer, "{rule}")?;
    write_row(writer, &widths, columns, &titles)?;
    writeln!(writer, "{rule}")?;
    for row in rows {
        write_row(writer, &widths, columns, row)?;
    }
    if !rows.is_empty() {
        writeln!(writer, "{rule}")?;
    }
    writeln!(writer, "({}건)", rows.len())?;
    Ok(())
}

fn remark(transaction: &Transaction) -> String {
    if transaction.row.status == SettlementStatus::Cancelled {
        "취소".to_string()
    } else if transaction.first_qualifying_of_day && is_special_merchant(&transaction.row.merchant)
    {
        "2배 적립".to_string()
    } else if transaction.first_qualifying_of_day {
        "적립".to_string()
    } else {
        String::new()
    }
}

pub struct TableOutput<W> {
    writer: W,
    termwidth: Option<usize>,
}

impl<W> TableOutput<W>
where
    W: Write,
{
    fn render(
        &mut self,
        columns: Vec<Column>,
        rows: Vec<Vec<String>>,
    ) -> Result<OutputForTesting> {
        let termwidth = self.termwidth.unwrap_or_else(termwidth);
        render_table(&mut self.writer, termwidth, &columns, &rows)?;
        let titles = columns.into_iter().map(|c| c.title).collect();
        Ok(OutputForTesting::Table((titles, rows)))
    }
}

impl<W> Output<W> for TableOutput<W>
where
    W: Write,
{
    fn new(writer: W, termwidth: Option<usize>) -> TableOutput<W> {
        TableOutput { writer, termwidth }
    }

    fn render_transactions(&mut self, accrual: &Accrual) -> Result<OutputForTesting> {
        let columns = vec![
            Column::left("이용일시"),
            Column::left("승인번호"),
            Column::left("이용카드"),
            Column::left("가맹점명"),
            Column::right("이용금액"),
            Column::left("이용구분"),
            Column::left("매입상태"),
            Column::right("적립 포인트"),
            Column::right("피킹률"),
            Column::left("비고"),
        ];
        let mut rows: Vec<Vec<String>> = accrual
            .transactions
            .iter()
            .map(|t| {
                vec![
                    t.row.used_at.to_output_format(),
                    t.row.approval_no.clone(),
                    t.row.card_tail.clone(),
                    t.row.merchant.clone(),
                    won(t.row.amount),
                    t.row.usage_type.clone(),
                    t.row.status.to_string(),
                    won(t.points),
                    percent(t.pick_rate),
                    remark(t),
                ]
            })
            .collect();
        if !rows.is_empty() {
            rows.push(vec![
                "합계".to_string(),
                String::new(),
                String::new(),
                String::new(),
                won(accrual.total_used),
                String::new(),
                String::new(),
                won(accrual.total_points),
                percent(accrual.overall_pick_rate()),
                String::new(),
            ]);
        }
        self.render(columns, rows)
    }

    fn render_summary(&mut self, accrual: &Accrual) -> Result<OutputForTesting> {
        let columns = vec![Column::left("항목"), Column::right("값")];
        let rows = vec![
            vec!["총 사용 금액".to_string(), won(accrual.total_used)],
            vec!["총 적립 포인트".to_string(), won(accrual.total_points)],
            vec![
                "평균 피킹률".to_string(),
                percent(accrual.overall_pick_rate()),
            ],
        ];
        self.render(columns, rows)
    }

    fn render_merchants(
        &mut self,
        ranking: &[MerchantTotals],
        by: RankBy,
        top: usize,
    ) -> Result<OutputForTesting> {
        let mut ranking = ranking.to_vec();
        if by == RankBy::spent {
            ranking.sort_by_key(|m| std::cmp::Reverse(m.total_used));
        }
        if top > 0 {
            ranking.truncate(top);
        }
        let columns = vec![
            Column::right("순위"),
            Column::left("가맹점명"),
            Column::right("사용 금액"),
            Column::right("적립 포인트"),
            Column::right("피킹률"),
        ];
        let rows: Vec<Vec<String>> = ranking
            .iter()
            .enumerate()
            .map(|(i, m)| {
                let rate = if m.total_used == 0 {
                    0.0
                } else {
                    m.total_points as f64 / m.total_used as f64
                };
                vec![
                    format!("{}", i + 1),
                    m.merchant.clone(),
                    won(m.total_used),
                    won(m.total_points),
                    percent(rate),
                ]
            })
            .collect();
        self.render(columns, rows)
    }
}

#[cfg(test)]
mod render_table_tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn aligns_and_borders() {
        let mut cursor = Cursor::new(Vec::new());
        let columns = vec![Column::left("name"), Column::right("amt")];
        let rows = vec![
            vec!["cafe".to_string(), "500".to_string()],
            vec!["bus".to_string(), "1,250".to_string()],
        ];
        render_table(cursor.get_mut(), 40, &columns, &rows).unwrap();
        let output = String::from_utf8(cursor.get_ref().to_vec()).unwrap();
        let lines: Vec<_> = output.split('\n').collect();
        assert_eq!(lines[0], "+----+-----+");
        assert_eq!(lines[1], "|name|  amt|");
        assert_eq!(lines[2], "+----+-----+");
        assert_eq!(lines[3], "|cafe|  500|");
        assert_eq!(lines[4], "|bus |1,250|");
        assert_eq!(lines[5], "+----+-----+");
        assert_eq!(lines[6], "(2건)");
    }

    #[test]
    fn wraps_wide_cells() {
        let mut cursor = Cursor::new(Vec::new());
        let columns = vec![Column::left("desc")];
        let rows = vec![vec!["hello brave new world".to_string()]];
        render_table(cursor.get_mut(), 12, &columns, &rows).unwrap();
        let output = String::from_utf8(cursor.get_ref().to_vec()).unwrap();
        let lines: Vec<_> = output.split('\n').collect();
        assert_eq!(lines[0], "+----------+");
        assert_eq!(lines[1], "|desc      |");
        assert_eq!(lines[2], "+----------+");
        assert_eq!(lines[3], "|hello     |");
        assert_eq!(lines[4], "|brave new |");
        assert_eq!(lines[5], "|world     |");
        assert_eq!(lines[6], "+----------+");
        assert_eq!(lines[7], "(1건)");
    }

    #[test]
    fn wide_characters_count_double() {
        let mut cursor = Cursor::new(Vec::new());
        let columns = vec![Column::left("가맹점명")];
        let rows = vec![vec!["김밥".to_string()]];
        render_table(cursor.get_mut(), 40, &columns, &rows).unwrap();
        let output = String::from_utf8(cursor.get_ref().to_vec()).unwrap();
        let lines: Vec<_> = output.split('\n').collect();
        // 가맹점명 is 8 cells wide, 김밥 is 4 plus 4 cells of padding.
        assert_eq!(lines[0], "+--------+");
        assert_eq!(lines[1], "|가맹점명|");
        assert_eq!(lines[3], "|김밥    |");
    }

    #[test]
    fn spare_width_goes_back_to_clipped_columns() {
        let mut cursor = Cursor::new(Vec::new());
        let columns = vec![Column::left("a"), Column::left("b")];
        let rows = vec![vec!["x".to_string(), "01234567890123456789".to_string()]];
        // budget = 17, fair = 8: column a only needs 1, so b grows to 16.
        render_table(cursor.get_mut(), 20, &columns, &rows).unwrap();
        let output = String::from_utf8(cursor.get_ref().to_vec()).unwrap();
        let lines: Vec<_> = output.split('\n').collect();
        assert_eq!(lines[0], "+-+----------------+");
        assert_eq!(lines[3], "|x|0123456789012345|");
        assert_eq!(lines[4], "| |6789            |");
    }

    #[test]
    fn empty_rows_render_header_only() {
        let mut cursor = Cursor::new(Vec::new());
        let columns = vec![Column::left("name")];
        render_table(cursor.get_mut(), 40, &columns, &[]).unwrap();
        let output = String::from_utf8(cursor.get_ref().to_vec()).unwrap();
        let lines: Vec<_> = output.split('\n').collect();
        assert_eq!(lines[0], "+----+");
        assert_eq!(lines[1], "|name|");
        assert_eq!(lines[2], "+----+");
        assert_eq!(lines[3], "(0건)");
    }

    #[test]
    fn too_narrow_terminal() {
        let mut cursor = Cursor::new(Vec::new());
        let columns = vec![Column::left("a"), Column::left("b"), Column::left("c")];
        assert!(render_table(cursor.get_mut(), 5, &columns, &[]).is_err());
    }
}
