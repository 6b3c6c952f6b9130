mod diff;
mod output;
mod plan;
mod render;
mod schema;
mod stream;

use std::fs;
use std::io::{self, BufRead, IsTerminal};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use output::Colorize;
use plan::Plan;
use render::PlanRenderer;
use stream::LogStream;

#[derive(Parser)]
#[command(name = "planfmt")]
#[command(about = "Render structured infrastructure plan files as human-readable diffs", long_about = None)]
#[command(version)]
struct Cli {
    /// Strip colour codes from the output
    #[arg(long, global = true)]
    no_color: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render a plan file as a human-readable diff
    #[command(
        long_about = "Render a plan file as a human-readable diff\n\nExamples:\n  planfmt render plan.json\n  planfmt render plan.json --no-color"
    )]
    Render {
        /// Path to the machine-readable plan file
        plan: String,
    },

    /// Relay a structured NDJSON log stream from stdin
    #[command(
        long_about = "Relay a structured NDJSON log stream from stdin\n\nLogs that arrive after the plan phase starts are deferred and replayed\nafter the rendered diff, so the diff stays in one piece.\n\nExamples:\n  run-plan -json | planfmt stream\n  run-plan -json | planfmt stream --plan plan.json"
    )]
    Stream {
        /// Plan file to render once the stream's plan phase completes
        #[arg(long)]
        plan: Option<String>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let colorize = Colorize::new(cli.no_color || !io::stdout().is_terminal());

    match cli.command {
        Commands::Render { plan } => render_command(&plan, colorize),
        Commands::Stream { plan } => stream_command(plan.as_deref(), colorize),
    }
}

fn render_command(path: &str, colorize: Colorize) -> Result<()> {
    let rendered = render_plan_file(path)?;
    print!("{}", colorize.color(&rendered));
    Ok(())
}

fn render_plan_file(path: &str) -> Result<String> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("failed to read plan file {:?}", path))?;
    let plan = Plan::parse(&text)?;
    PlanRenderer::new().render_plan(&plan)
}

fn stream_command(plan_path: Option<&str>, colorize: Colorize) -> Result<()> {
    let stdin = io::stdin();
    let mut stream = LogStream::new();
    for line in stdin.lock().lines() {
        let line = line.context("failed to read log stream")?;
        if let Some(text) = stream.process_line(&line) {
            println!("{}", colorize.color(&text));
        }
    }

    if stream.plan_started() {
        if let Some(path) = plan_path {
            print!("{}", colorize.color(&render_plan_file(path)?));
        }
    }

    for text in stream.take_deferred() {
        println!("{}", colorize.color(&text));
    }

    Ok(())
}
