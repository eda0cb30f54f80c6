use anyhow::{anyhow, bail, Result};
use clap::{error::ErrorKind, CommandFactory, ValueEnum};
use clap::{Parser, Subcommand};
use std::env;
use std::ffi::OsStr;
use std::fmt::{Display, Error, Formatter};
use std::io;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

mod accrual;
mod commands;
mod fallible_print;
mod import;
mod model;
mod output;

const TIP: &str = "💡";
#[cfg(debug_assertions)]
const DEBUG: &str = "🛠️ ";

#[derive(Debug, Parser)]
#[command(infer_subcommands = true)]
struct Pickrate {
    /// The card statement to calculate from (.xls, .xlsx or .csv).
    #[arg(short, long, global = true)]
    statement: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Every transaction with its earned points and pick rate, in accrual
    /// order. This is also what an invocation without a subcommand shows.
    Transactions {},

    /// Total spend, total points, and the overall pick rate.
    Summary {
        /// Render as a pie chart (sixel) instead of a table.
        #[arg(long)]
        chart: bool,
    },

    /// Merchants ranked by earned points or by spend.
    Merchants {
        /// Ranking key.
        #[arg(long, value_enum, default_value_t = RankBy::points)]
        by: RankBy,

        /// How many merchants to show; 0 means all.
        #[arg(long, default_value_t = 5)]
        top: usize,

        /// Render as a bar chart (sixel) instead of a table.
        #[arg(long)]
        chart: bool,
    },
}

#[allow(non_camel_case_types)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum RankBy {
    points,
    spent,
}

impl Display for RankBy {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), Error> {
        write!(f, "{:?}", self)
    }
}

fn main() -> ExitCode {
    match pickrate_main() {
        Err(e) => {
            if let Some(io_error) = e.downcast_ref::<io::Error>() {
                if io_error.kind() == io::ErrorKind::BrokenPipe {
                    return ExitCode::SUCCESS;
                }
            } else if let Some(clap_error) = e.downcast_ref::<clap::error::Error>() {
                clap_error.exit();
            }
            let _ = eprintln!("Error: {e}");
            return ExitCode::FAILURE;
        }
        Ok(_) => {
            return ExitCode::SUCCESS;
        }
    }
}

fn pickrate_main() -> Result<()> {
    #[cfg(debug_assertions)]
    println!("{DEBUG} This is a debug build!")?;

    // https://stackoverflow.com/a/36848555
    let binary_name = env::args()
        .nth(0)
        .as_ref()
        .map(Path::new)
        .and_then(Path::file_name)
        .and_then(OsStr::to_str)
        .map(String::from)
        .unwrap_or(String::from("pickrate"));

    let cli = Pickrate::parse();
    let mut cmd = Pickrate::command();

    let statement = match &cli.statement {
        Some(statement) => statement,
        None => {
            bail!(cmd.error(
                ErrorKind::MissingRequiredArgument,
                format!(
                    "a statement file is required.\n\n{TIP} Try '{binary_name} --statement card.xlsx'."
                )
            ));
        }
    };

    let rows = import::read_statement(statement)?;
    if rows.is_empty() {
        println!(
            "{TIP} No transactions found in '{}'. Only the first sheet of a workbook is read.",
            statement.display()
        )?;
        return Ok(());
    }

    let accrual = accrual::calculate(rows);
    match &cli.command {
        // On empty invocation, default to the transaction table.
        None | Some(Commands::Transactions {}) => {
            commands::transactions::command_transactions(&mut io::stdout(), &accrual)?;
        }
        Some(Commands::Summary { chart }) => {
            commands::summary::command_summary(&mut io::stdout(), &accrual, *chart)?;
        }
        Some(Commands::Merchants { by, top, chart }) => {
            commands::merchants::command_merchants(&mut io::stdout(), &accrual, *by, *top, *chart)?;
        }
    }
    Ok(())
}
