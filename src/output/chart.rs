use anyhow::{bail, Result};
use charming;
use std::io::Write;
use std::process;

use crate::model::{Accrual, MerchantTotals};
use crate::output::format::won;
use crate::output::{Output, OutputForTesting};
use crate::RankBy;

const FONT_SIZE: f64 = 22.0;
const TITLE_FONT_SIZE: f64 = FONT_SIZE * 1.5;

// Terminals render the chart as sixel graphics; imagemagick does the
// PNG-to-sixel conversion.
fn chart_to_sixel<W>(writer: &mut W, chart: &charming::Chart) -> Result<()>
where
    W: Write,
{
    let mut renderer = charming::ImageRenderer::new(1600, 900);
    let bytes = renderer.render_format(charming::ImageFormat::Png, chart)?;

    let mut child = process::Command::new("sh")
        .arg("-c")
        .arg("magick png:- sixel:-")
        .stdin(process::Stdio::piped())
        .stdout(process::Stdio::piped())
        .spawn()?;

    if let Some(mut stdin) = child.stdin.take() {
        std::thread::spawn(move || stdin.write_all(&bytes));
        let output = child.wait_with_output()?;
        Ok(writer.write_all(&output.stdout)?)
    } else {
        child.kill()?;
        bail!("failed to take handle to child process stdin")
    }
}

fn base_chart() -> charming::Chart {
    charming::Chart::new().background_color("#efefef")
}

fn chart_title(text: &str) -> charming::component::Title {
    charming::component::Title::new()
        .text(text)
        .padding((20, 0))
        .left("center")
        .text_style(charming::element::TextStyle::new().font_size(TITLE_FONT_SIZE))
}

fn merchant_axis(names: &[String]) -> charming::component::Axis {
    charming::component::Axis::new()
        .type_(charming::element::AxisType::Category)
        .data(names.to_vec())
        .axis_label(charming::element::AxisLabel::new().font_size(FONT_SIZE))
}

fn won_axis() -> charming::component::Axis {
    charming::component::Axis::new()
        .type_(charming::element::AxisType::Value)
        .axis_label(charming::element::AxisLabel::new().font_size(FONT_SIZE))
        .axis_line(charming::element::axis_line::AxisLine::new().show(true))
}

/// 피킹률 pie: points earned against the rest of the spend.
fn summary_to_chart(accrual: &Accrual) -> charming::Chart {
    let data = vec![
        (
            accrual.total_points as f64,
            format!("적립 포인트\n({})", won(accrual.total_points)),
        ),
        (
            (accrual.total_used - accrual.total_points) as f64,
            format!(
                "이외 사용 금액\n({})",
                won(accrual.total_used - accrual.total_points)
            ),
        ),
    ];
    base_chart().title(chart_title("피킹률")).series(
        charming::series::Pie::new()
            .name("피킹률")
            .radius("55%")
            .center(vec!["50%", "55%"])
            .label(charming::element::Label::new().font_size(FONT_SIZE))
            .data(data),
    )
}

/// TOP-N bar of merchants by points earned or by amount spent.
fn merchants_to_chart(ranking: &[MerchantTotals], by: RankBy, top: usize) -> charming::Chart {
    let mut ranking = ranking.to_vec();
    if by == RankBy::spent {
        ranking.sort_by_key(|m| std::cmp::Reverse(m.total_used));
    }
    if top > 0 {
        ranking.truncate(top);
    }

    let names: Vec<String> = ranking.iter().map(|m| m.merchant.clone()).collect();
    let values: Vec<f64> = ranking
        .iter()
        .map(|m| match by {
            RankBy::points => m.total_points as f64,
            RankBy::spent => m.total_used as f64,
        })
        .collect();
    let title = match by {
        RankBy::points => format!("TOP {} 적립처", names.len()),
        RankBy::spent => format!("TOP {} 사용처", names.len()),
    };

    base_chart()
        .title(chart_title(&title))
        .grid(charming::component::Grid::new().top("17%"))
        .x_axis(merchant_axis(&names))
        .y_axis(won_axis())
        .series(
            charming::series::Bar::new()
                .data(values)
                .label(charming::element::Label::new().font_size(FONT_SIZE)),
        )
}

pub struct ChartOutput<W> {
    writer: W,
}

impl<W> Output<W> for ChartOutput<W>
where
    W: Write,
{
    fn new(writer: W, _: Option<usize>) -> ChartOutput<W> {
        ChartOutput { writer }
    }

    fn render_transactions(&mut self, _: &Accrual) -> Result<OutputForTesting> {
        unimplemented!();
    }

    fn render_summary(&mut self, accrual: &Accrual) -> Result<OutputForTesting> {
        let chart = summary_to_chart(accrual);
        chart_to_sixel(&mut self.writer, &chart)?;
        Ok(OutputForTesting::Chart(chart.to_string()))
    }

    fn render_merchants(
        &mut self,
        ranking: &[MerchantTotals],
        by: RankBy,
        top: usize,
    ) -> Result<OutputForTesting> {
        let chart = merchants_to_chart(ranking, by, top);
        chart_to_sixel(&mut self.writer, &chart)?;
        Ok(OutputForTesting::Chart(chart.to_string()))
    }
}
