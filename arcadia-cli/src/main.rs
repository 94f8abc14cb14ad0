//! arcadia CLI
//!
//! Command-line interface for importing, browsing and maintaining a game
//! catalog database.

mod cli_types;
mod commands;
mod error;
mod settings;

use std::io::Write;

use clap::Parser;

use cli_types::{Cli, Commands, ConfigAction};
pub(crate) use error::CliError;

fn main() {
    let cli = Cli::parse();
    init_logging(cli.quiet, cli.verbose);

    let settings = settings::load_settings();
    let db = cli.db;

    let result = match cli.command {
        Commands::Init => commands::catalog::run_init(&settings, db),
        Commands::Import { paths } => commands::import::run_import(&settings, db, &paths),
        Commands::ImportPlaylist { path, on_conflict } => {
            commands::import::run_import_playlist(&settings, db, &path, on_conflict)
        }
        Commands::ExportPlaylist { id, path } => {
            commands::playlist::run_export_playlist(&settings, db, &id, &path)
        }
        Commands::Query {
            filter,
            order,
            limit,
            offset,
            after,
            page,
            shallow,
            total,
            request,
        } => commands::browse::run_query(
            &settings,
            db,
            commands::browse::QueryArgs {
                filter,
                order,
                limit,
                offset,
                after,
                page,
                shallow,
                total,
                request,
            },
        ),
        Commands::Index {
            filter,
            order,
            page_size,
        } => commands::browse::run_index(&settings, db, &filter, &order, page_size),
        Commands::Row {
            game_id,
            filter,
            order,
        } => commands::browse::run_row(&settings, db, &game_id, &filter, &order),
        Commands::Random { count } => commands::browse::run_random(&settings, db, count),
        Commands::Show { id } => commands::game::run_show(&settings, db, &id),
        Commands::Delete { id } => commands::game::run_delete(&settings, db, &id),
        Commands::Duplicate { id } => commands::game::run_duplicate(&settings, db, &id),
        Commands::Stats { library } => {
            commands::catalog::run_stats(&settings, db, library.as_deref())
        }
        Commands::Playlists {
            id,
            duplicate,
            delete,
        } => commands::playlist::run_playlists(&settings, db, id.as_deref(), duplicate, delete),
        Commands::Config { action } => match action {
            ConfigAction::Show => commands::config::run_config_show(&settings, db),
            ConfigAction::SetDb { path } => commands::config::run_config_set_db(&path),
            ConfigAction::ClearDb => commands::config::run_config_clear_db(),
        },
    };

    if let Err(e) = result {
        log::error!("{}", e);
        std::process::exit(1);
    }
}

/// Log to stderr; `RUST_LOG` overrides the level picked from the flags.
fn init_logging(quiet: bool, verbose: bool) {
    let level = if quiet {
        "warn"
    } else if verbose {
        "debug"
    } else {
        "info"
    };

    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level));
    if !verbose {
        // Plain messages for normal output; warnings and errors keep a prefix.
        builder.format(|buf, record| match record.level() {
            log::Level::Info => writeln!(buf, "{}", record.args()),
            other => writeln!(buf, "{}: {}", other.as_str().to_lowercase(), record.args()),
        });
    }
    builder.init();
}

/// Emit an empty line through the logger.
pub(crate) fn log_blank() {
    log::info!("");
}
