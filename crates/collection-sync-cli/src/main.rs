use clap::{ArgAction, Parser};
use collection_sync_config::PathManager;
use color_eyre::eyre::eyre;
use commands::dump::{run_dump, DumpKind};
use commands::{reconcile, setup, summary};
use std::path::PathBuf;

mod commands;
mod logging;
mod output;

#[derive(Parser)]
#[command(name = "plex-collections")]
#[command(about = "Keep Plex collections in line with YAML collection files")]
#[command(version)]
struct Cli {
    /// Skip creating and editing collections
    #[arg(long, action = ArgAction::SetTrue)]
    no_edit: bool,

    /// Write every collection of each library to the collections dump directory
    #[arg(long, action = ArgAction::SetTrue)]
    dump_collections: bool,

    /// Write every item of each library to the library dump directory
    #[arg(long, action = ArgAction::SetTrue)]
    dump_library: bool,

    /// Include all item fields in the library dump
    #[arg(long, action = ArgAction::SetTrue, requires = "dump_library")]
    all_fields: bool,

    /// Path to config.yml
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Write logs to a daily rotated file instead of stderr
    #[arg(long, value_name = "PATH")]
    log_file: Option<PathBuf>,

    /// Enable verbose output (-v debug, -vv trace)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long)]
    quiet: bool,

    /// Output format
    #[arg(long, default_value = "human", value_enum)]
    output: output::OutputFormat,
}

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse();

    logging::init_logging(cli.verbose, cli.quiet, cli.log_file.as_deref()).map_err(|e| eyre!("{}", e))?;

    let output = output::Output::new(cli.output, cli.quiet);
    let config_path = cli.config.unwrap_or_else(PathManager::default_config_file);

    let session = setup::open_session(&config_path, &output).await?;

    if cli.no_edit {
        tracing::info!("Editing disabled, leaving collections untouched");
    } else {
        let reports = reconcile::run_reconcile(&session, &output).await;
        summary::print_summary(&reports, &output);
    }

    if cli.dump_collections {
        run_dump(&session, DumpKind::Collections, &output).await?;
    }
    if cli.dump_library {
        run_dump(
            &session,
            DumpKind::Library {
                all_fields: cli.all_fields,
            },
            &output,
        )
        .await?;
    }

    Ok(())
}
