use crate::model::Accrual;
use crate::output::{table, Output, OutputForTesting};
use anyhow::Result;
use std::io::Write;

pub fn command_transactions<W>(writer: &mut W, accrual: &Accrual) -> Result<OutputForTesting>
where
    W: Write,
{
    let mut to = table::TableOutput::new(writer, None);
    to.render_transactions(accrual)
}
