use std::{path::PathBuf, sync::Arc, time::Duration};

use clap::Parser;
use cli::{Args, Commands, RepoAction};
use logging::setup_logging;
use pkgdex_config::config::{default_config_path, generate_default_config, Config};
use pkgdex_dl::http_client::{configure_http_client, parse_headers};
use pkgdex_events::{ChannelSink, EventSinkHandle};
use pkgdex_operations::PkgdexContext;
use pkgdex_utils::path::resolve_path;
use progress::{spawn_event_handler, LogSink, ProgressGuard};
use tracing::debug;
use ureq::Proxy;

use crate::{
    error::{CliError, CliResult},
    utils::{progress_enabled, set_color, set_progress},
};

mod cli;
mod error;
mod list;
mod logging;
mod progress;
mod repo;
mod sync;
mod utils;

/// Builds the context. With progress enabled, events feed the spinner thread;
/// otherwise they are logged as they arrive.
fn create_context(config: Config, config_path: PathBuf) -> (Arc<PkgdexContext>, Option<ProgressGuard>) {
    if progress_enabled() {
        let (sink, receiver) = ChannelSink::new();
        let events: EventSinkHandle = Arc::new(sink);
        let ctx = PkgdexContext::new(config, events).with_config_path(config_path);
        let guard = spawn_event_handler(receiver);
        (Arc::new(ctx), Some(guard))
    } else {
        let events: EventSinkHandle = Arc::new(LogSink);
        let ctx = PkgdexContext::new(config, events).with_config_path(config_path);
        (Arc::new(ctx), None)
    }
}

fn configure_client(args: &Args, config: &Config) -> CliResult<()> {
    let proxy = args
        .proxy
        .as_deref()
        .map(|proxy| {
            Proxy::new(proxy).map_err(|source| CliError::InvalidProxy {
                proxy: proxy.to_string(),
                source,
            })
        })
        .transpose()?;
    let headers = args.header.as_deref().map(parse_headers);
    let user_agent = args.user_agent.clone();
    let timeout = Duration::from_secs(config.http_timeout());

    configure_http_client(|client| {
        if let Some(user_agent) = user_agent {
            client.user_agent = Some(user_agent);
        }
        if proxy.is_some() {
            client.proxy = proxy;
        }
        if headers.is_some() {
            client.headers = headers;
        }
        client.timeout = Some(timeout);
    });

    Ok(())
}

async fn handle_cli() -> CliResult<()> {
    let args = Args::parse();

    setup_logging(&args);

    if args.no_color {
        set_color(false);
    }

    if args.no_progress || args.json {
        set_progress(false);
    }

    let config_path = match args.config.as_deref() {
        Some(path) => resolve_path(path)?,
        None => default_config_path(),
    };
    debug!(path = %config_path.display(), "using config");

    if let Commands::DefConfig = args.command {
        generate_default_config(&config_path)?;
        return Ok(());
    }

    let config = Config::load(&config_path)?;
    configure_client(&args, &config)?;

    let (ctx, progress_guard) = create_context(config, config_path);

    let result = match args.command {
        Commands::Sync => sync::sync_repositories(Arc::clone(&ctx)).await,
        Commands::Search {
            query,
            limit,
        } => list::search_packages(&ctx, &query, limit, args.json).await,
        Commands::Info {
            name,
        } => list::package_info(&ctx, &name, args.json).await,
        Commands::Repo {
            action,
        } => {
            match action {
                RepoAction::Add {
                    name,
                    location,
                } => repo::add_repository(&ctx, &name, &location),
                RepoAction::Remove {
                    name,
                } => repo::remove_repository(&ctx, &name),
                RepoAction::List => repo::list_repositories(&ctx, args.json),
            }
        }
        Commands::Config => {
            ctx.config()
                .to_toml()
                .map(|toml| print!("{toml}"))
                .map_err(CliError::from)
        }
        Commands::DefConfig => Ok(()),
    };

    drop(ctx);
    if let Some(guard) = progress_guard {
        guard.finish();
    }
    progress::stop();

    result
}

#[tokio::main]
async fn main() {
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .unicode(true)
                .context_lines(2)
                .build(),
        )
    }))
    .ok();

    if let Err(err) = handle_cli().await {
        eprintln!("{:?}", miette::Report::new(err));
        std::process::exit(1);
    }
}
