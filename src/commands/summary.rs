use crate::model::Accrual;
use crate::output::{chart, table, Output, OutputForTesting};
use anyhow::Result;
use std::io::Write;

pub fn command_summary<W>(
    writer: &mut W,
    accrual: &Accrual,
    as_chart: bool,
) -> Result<OutputForTesting>
where
    W: Write,
{
    if as_chart {
        let mut co = chart::ChartOutput::new(writer, None);
        co.render_summary(accrual)
    } else {
        let mut to = table::TableOutput::new(writer, None);
        to.render_summary(accrual)
    }
}
