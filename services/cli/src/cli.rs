use std::path::PathBuf;

use clap::{Parser, Subcommand};
use mood_stability::config::AppConfig;
use mood_stability::error::AppError;
use mood_stability::telemetry;
use mood_stability::workflows::stability::UserId;
use tracing::info;

use crate::commands::{
    run_extract, run_formula_compose, run_formula_parse, run_score, ComposeArgs, ExtractArgs,
    ParseArgs, ScoreArgs,
};
use crate::infra::load_catalog;

#[derive(Parser, Debug)]
#[command(
    name = "mood-stability",
    about = "Parse stability formulas, score mood entries, and recover assessments from assistant replies",
    version
)]
struct Cli {
    /// Scale catalog JSON ({"scales": [...], "formulas": [...]}). Defaults to the standard scales.
    #[arg(long, global = true)]
    catalog: Option<PathBuf>,
    /// User the command acts for
    #[arg(long, global = true, default_value = "cli-user")]
    user: String,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Parse or compose stability formulas
    Formula {
        #[command(subcommand)]
        command: FormulaCommand,
    },
    /// Validate and score a mood entry submission
    Score(ScoreArgs),
    /// Recover an assessment from a recorded assistant reply
    Extract(ExtractArgs),
}

#[derive(Subcommand, Debug)]
enum FormulaCommand {
    /// Parse formula text against the catalog's active scales
    Parse(ParseArgs),
    /// Validate weights and print the stored formula text
    Compose(ComposeArgs),
}

pub(crate) fn run() -> Result<(), AppError> {
    let cli = Cli::parse();

    let config = AppConfig::load()?;
    telemetry::init(&config.telemetry)?;

    let catalog = load_catalog(cli.catalog.as_deref())?;
    info!(
        environment = ?config.environment,
        scales = catalog.scales.len(),
        formulas = catalog.formulas.len(),
        "catalog loaded"
    );
    let user = UserId(cli.user);

    match cli.command {
        Command::Formula {
            command: FormulaCommand::Parse(args),
        } => run_formula_parse(args, catalog, &user),
        Command::Formula {
            command: FormulaCommand::Compose(args),
        } => run_formula_compose(args, catalog),
        Command::Score(args) => run_score(args, catalog, &user),
        Command::Extract(args) => run_extract(args, catalog, &user, config.assistant),
    }
}
