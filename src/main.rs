mod cli;
mod clockify;
mod config;
mod lib;
mod load;

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use cli::{plot::Plotter, table::Table};
use clockify::{
    report::{fetch_entries, ReportQuery},
    resolve::{project_id, workspace_id},
    Client, HttpTransport,
};
use config::{Credentials, Endpoints};
use lib::{budget::project_budget, error, summary::Calendar, usage::cumulative_usage};

/// Compare hours logged on a Clockify project against the hours purchased
#[derive(Parser, Debug)]
#[command(name = "burnup", version, about)]
struct Args {
    /// Plan file describing the project and its purchased days
    #[arg(default_value = "hours.pln")]
    plan: String,

    /// Where to write the chart
    #[arg(short, long, default_value = "hours.svg")]
    output: PathBuf,

    /// Do not print the monthly summary
    #[arg(long)]
    no_table: bool,

    /// Read environment variables from this file instead of searching for `.env`
    #[arg(long)]
    env_file: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();
    setup_logging(args.debug);

    let mut errs = error::Record::new();
    let plan = load::read_plan(&args.plan, &mut errs);
    print!("{}", errs);
    let Some(plan) = plan else {
        bail!("could not load plan from '{}'", args.plan);
    };

    config::load_dotenv(args.env_file.as_deref());
    let credentials = Credentials::from_env()?;
    let client = Client::new(HttpTransport::new(credentials), Endpoints::from_env());

    let workspace = workspace_id(&client, &plan.workspace)?;
    let project = project_id(&client, &workspace, &plan.project)?;
    let query = ReportQuery {
        workspace: &workspace,
        project: &project,
        start: plan.window.start(),
        end: plan.window.end(),
        page_size: plan.page_size,
    };
    let entries = fetch_entries(&client, &query)?;

    let usage = cumulative_usage(&entries, plan.window.start());
    let budget = project_budget(&plan.months, plan.workday);
    info!(
        used = usage.last().map(|p| p.hours).unwrap_or(0.0),
        purchased = plan.purchased_hours(),
        "hours so far"
    );

    if !args.no_table {
        let mut cal = Calendar::from_budget(&plan.months, plan.workday);
        cal.register(&entries);
        println!("{}", Table::from(&cal.balances()).with_title(&plan.title));
    }

    let title = format!("{} (as of {})", plan.title, chrono::Local::now().format("%Y/%m/%d"));
    Plotter::from(&usage, &budget)
        .with_title(title)
        .save(&args.output)
        .with_context(|| format!("could not write chart to '{}'", args.output.display()))?;
    info!("chart written to {}", args.output.display());
    Ok(())
}

fn setup_logging(debug: bool) {
    let filter = if debug {
        EnvFilter::new("burnup=debug")
    } else {
        EnvFilter::new("burnup=info")
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();
}
