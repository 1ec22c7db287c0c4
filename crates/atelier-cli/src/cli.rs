//! Argument parsing and command dispatch for the `atelier` binary.

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;
use url::Url;
use uuid::Uuid;

use atelier_client::Collection;

use crate::commands::{catalog, moderation};
use crate::context::{AppContext, CliResult, parse_url};

const DEFAULT_API_URL: &str = "http://127.0.0.1:8800";
const DEFAULT_TIMEOUT_SECS: u64 = 15;

/// Parses CLI arguments, executes the requested command, and returns the
/// process exit code.
pub async fn run() -> i32 {
    init_tracing();
    let cli = Cli::parse();
    let trace_id = Uuid::new_v4().to_string();
    tracing::debug!(trace_id, "dispatching command");

    match dispatch(cli, &trace_id).await {
        Ok(()) => 0,
        Err(err) => {
            eprintln!("error: {}", err.display_message());
            err.exit_code()
        }
    }
}

async fn dispatch(cli: Cli, trace_id: &str) -> CliResult<()> {
    let ctx = AppContext::new(cli.api_url, cli.api_key, cli.timeout, trace_id, cli.output)?;

    match cli.command {
        Command::Ls(args) => catalog::handle_list(&ctx, args).await,
        Command::Show(args) => catalog::handle_show(&ctx, args).await,
        Command::Create(args) => catalog::handle_create(&ctx, args).await,
        Command::Edit(args) => catalog::handle_edit(&ctx, args).await,
        Command::Action(args) => moderation::handle_action(&ctx, args).await,
        Command::Rm(args) => moderation::handle_remove(&ctx, args).await,
    }
}

fn init_tracing() {
    let filter =
        EnvFilter::try_from_env("ATELIER_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

#[derive(Parser)]
#[command(name = "atelier", about = "Administrative CLI for the Atelier marketplace")]
pub(crate) struct Cli {
    #[arg(
        long,
        global = true,
        env = "ATELIER_API_URL",
        value_parser = parse_url,
        default_value = DEFAULT_API_URL
    )]
    api_url: Url,
    #[arg(long, global = true, env = "ATELIER_API_KEY")]
    api_key: Option<String>,
    #[arg(
        long,
        global = true,
        env = "ATELIER_HTTP_TIMEOUT_SECS",
        default_value_t = DEFAULT_TIMEOUT_SECS
    )]
    timeout: u64,
    #[arg(
        long = "output",
        alias = "format",
        global = true,
        value_enum,
        default_value_t = OutputFormat::Table,
        help = "Select output format for commands that render structured data"
    )]
    output: OutputFormat,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    Ls(ListArgs),
    Show(ShowArgs),
    Create(CreateArgs),
    Edit(EditArgs),
    Action(ActionArgs),
    Rm(RemoveArgs),
}

#[derive(Args)]
pub(crate) struct ListArgs {
    #[arg(value_parser = parse_collection, help = "Collection to list")]
    pub(crate) collection: Collection,
    #[arg(long, default_value_t = 1)]
    pub(crate) page: u32,
    #[arg(long, default_value_t = 20)]
    pub(crate) limit: u32,
    #[arg(long, help = "Free-text search over titles and identifiers")]
    pub(crate) search: Option<String>,
    #[arg(long, help = "Restrict to one status label")]
    pub(crate) status: Option<String>,
    #[arg(long, help = "Sort key understood by the server")]
    pub(crate) sort: Option<String>,
}

#[derive(Args)]
pub(crate) struct ShowArgs {
    #[arg(value_parser = parse_collection)]
    pub(crate) collection: Collection,
    #[arg(help = "Entity identifier")]
    pub(crate) id: String,
}

#[derive(Args)]
pub(crate) struct CreateArgs {
    #[arg(value_parser = parse_collection)]
    pub(crate) collection: Collection,
    #[arg(short = 'f', long = "file", help = "JSON file holding the new entity")]
    pub(crate) file: PathBuf,
}

#[derive(Args)]
pub(crate) struct EditArgs {
    #[arg(value_parser = parse_collection)]
    pub(crate) collection: Collection,
    #[arg(help = "Entity identifier")]
    pub(crate) id: String,
    #[arg(short = 'f', long = "file", help = "JSON file holding the changes")]
    pub(crate) file: PathBuf,
    #[arg(long, help = "Replace the entity wholesale instead of patching")]
    pub(crate) replace: bool,
}

#[derive(Args)]
pub(crate) struct ActionArgs {
    #[arg(value_parser = parse_collection)]
    pub(crate) collection: Collection,
    #[arg(help = "Entity identifier")]
    pub(crate) id: String,
    #[arg(help = "Transition to request, e.g. approve, reject, publish")]
    pub(crate) action: String,
    #[arg(long, help = "Reason shown to the studio; required when rejecting")]
    pub(crate) reason: Option<String>,
    #[arg(long, help = "Confirm destructive or irreversible transitions")]
    pub(crate) yes: bool,
}

#[derive(Args)]
pub(crate) struct RemoveArgs {
    #[arg(value_parser = parse_collection)]
    pub(crate) collection: Collection,
    #[arg(help = "Entity identifier")]
    pub(crate) id: String,
    #[arg(long, help = "Confirm permanent removal")]
    pub(crate) yes: bool,
}

#[derive(Copy, Clone, Debug, Default, ValueEnum)]
pub(crate) enum OutputFormat {
    #[default]
    Table,
    Json,
}

fn parse_collection(input: &str) -> Result<Collection, String> {
    Collection::parse(input).ok_or_else(|| {
        let known = Collection::ALL
            .iter()
            .map(|collection| collection.segment())
            .collect::<Vec<_>>()
            .join(", ");
        format!("unknown collection '{input}' (expected one of: {known})")
    })
}
