use crate::model::{Accrual, MerchantTotals};
use crate::RankBy;
use anyhow::Result;
use std::io::Write;

pub mod chart;
pub mod format;
pub mod table;

pub enum OutputForTesting {
    Table((Vec<String>, Vec<Vec<String>>)),
    Chart(String),
}

pub trait Output<W>
where
    W: Write,
{
    fn new(writer: W, termwidth: Option<usize>) -> Self;
    fn render_transactions(&mut self, accrual: &Accrual) -> Result<OutputForTesting>;
    fn render_summary(&mut self, accrual: &Accrual) -> Result<OutputForTesting>;
    fn render_merchants(
        &mut self,
        ranking: &[MerchantTotals],
        by: RankBy,
        top: usize,
    ) -> Result<OutputForTesting>;
}
