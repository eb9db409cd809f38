//! docr CLI application entry point
//!
//! This is the main executable for docr, a documentation lookup and
//! browsing tool. A query is resolved through the adapter configured for
//! its domain, disambiguated when it matches several pages, and shown
//! either as plain output or in an interactive pager with back/forward
//! navigation.
//!
//! # Usage
//!
//! ```bash
//! # Print the man page for printf
//! docr printf
//!
//! # C++ documentation in the interactive pager
//! docr -d cpp -i sort
//!
//! # Inspect configuration
//! docr adapters
//! docr config get history_mode
//! ```
//!
//! Configuration is stored in the user's config directory
//! (`~/.config/docr/config.toml` on Linux). Diagnostics are controlled by
//! the `DOCR_LOG` environment variable.

use std::sync::Arc;

use clap::Parser;
use colored::Colorize;

use docr::{
    DocrError,
    backend::AdapterRegistry,
    cache::DocCache,
    cli::{Cli, Commands, ConfigCommands, LookupArgs, split_setting},
    config::DocrConfig,
    engine::{Engine, EngineOptions},
    runner::{CommandRunner, ShellSpawner},
    ui,
};

type Result<T> = std::result::Result<T, DocrError>;

fn main() {
    let cli = Cli::parse();
    init_tracing();

    if let Err(e) = run(cli) {
        eprintln!("{}", format!("Error: {e}").red());
        std::process::exit(1);
    }
}

fn init_tracing() {
    use tracing_subscriber::EnvFilter;
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_env("DOCR_LOG"))
        .with_writer(std::io::stderr)
        .init();
}

fn run(cli: Cli) -> Result<()> {
    let config = DocrConfig::load()?;
    let quiet = cli.quiet || config.quiet;

    match cli.command {
        Some(Commands::Adapters) => handle_adapters(&config, quiet),
        Some(Commands::Config { command }) => handle_config_command(config, &command, quiet),
        Some(Commands::Lookup { args }) => handle_lookup(&config, &args, quiet),
        None => handle_lookup(&config, &cli.lookup, quiet),
    }
}

/// Resolve a query and display it, in the pager or as plain output
fn handle_lookup(config: &DocrConfig, args: &LookupArgs, quiet: bool) -> Result<()> {
    let Some(query) = args.query.as_deref() else {
        return Err(DocrError::InvalidInput(
            "no query given; try `docr <term>` or `docr --help`".to_string(),
        ));
    };

    let runtime = tokio::runtime::Runtime::new()?;
    let registry = AdapterRegistry::from_config(config)?;
    let (runner, events) = CommandRunner::new(
        config.max_async_jobs,
        Arc::new(ShellSpawner),
        DocCache::new(),
        runtime.handle().clone(),
    );

    let mut options = engine_options(config);
    if args.sync {
        options.async_enabled = false;
    }

    if args.interactive {
        let view = ui::pager::SharedView::new();
        let status = ui::pager::StatusLine::new();
        let mut engine = Engine::new(
            registry,
            runner,
            events,
            options,
            Box::new(ui::pager::TuiRenderer::new(view.clone())),
            Box::new(ui::pager::TuiNotifier::new(status.clone())),
            Box::new(ui::pager::TuiHover::new(status.clone())),
        );
        ui::pager::run(&mut engine, &view, &status, &args.domain, query, args.width)
    } else {
        // One-shot printing takes the deliberate blocking path; the
        // asynchronous scheduler is the pager's concern.
        options.async_enabled = false;
        let mut engine = Engine::new(
            registry,
            runner,
            events,
            options,
            Box::new(ui::plain::PlainRenderer::new(quiet)),
            Box::new(ui::plain::PlainNotifier::new(quiet)),
            Box::new(ui::plain::PlainHover),
        );
        let width = args.width.or_else(terminal_width).unwrap_or(80);
        ui::plain::run_lookup(&mut engine, &args.domain, query, width)
    }
}

/// List configured adapters and domain bindings
fn handle_adapters(config: &DocrConfig, quiet: bool) -> Result<()> {
    let registry = AdapterRegistry::from_config(config)?;

    for adapter in registry.adapters() {
        if quiet {
            println!("{}", adapter.name);
            continue;
        }
        let mut capabilities = Vec::new();
        if adapter.supports_selections {
            capabilities.push("selections");
        }
        if adapter.fallback_to_hover {
            capabilities.push("hover-fallback");
        }
        if adapter.exit_code_error {
            capabilities.push("exit-code");
        }
        println!(
            "  {} -> {} [{}]",
            adapter.name.bold(),
            adapter.command,
            capabilities.join(", ")
        );
    }

    if !quiet && !config.domains.is_empty() {
        println!();
        let mut domains: Vec<_> = config.domains.iter().collect();
        domains.sort_by_key(|(domain, _)| domain.as_str());
        for (domain, binding) in domains {
            println!("  domain {} -> {}", domain.bold(), binding.adapter);
        }
    }
    Ok(())
}

fn handle_config_command(
    mut config: DocrConfig,
    command: &ConfigCommands,
    quiet: bool,
) -> Result<()> {
    match command {
        ConfigCommands::Set { setting } => {
            let (key, value) = split_setting(setting).map_err(DocrError::InvalidInput)?;
            config.set_value(key, value)?;
            config.save()?;
            if !quiet {
                println!("Set {key} = {value}");
            }
        }
        ConfigCommands::Get { key } => match config.get_value(key) {
            Some(value) => println!("{value}"),
            None => {
                return Err(DocrError::InvalidInput(format!(
                    "unknown config key: {key}"
                )));
            }
        },
        ConfigCommands::Path => println!("{}", DocrConfig::config_path()?.display()),
    }
    Ok(())
}

fn engine_options(config: &DocrConfig) -> EngineOptions {
    EngineOptions {
        history_mode: config.history_mode,
        auto_select_first_match: config.auto_select_first_match,
        async_enabled: config.async_enabled,
        max_prefetch_options: config.max_prefetch_options,
    }
}

fn terminal_width() -> Option<u16> {
    crossterm::terminal::size()
        .ok()
        .map(|(width, _)| width.saturating_sub(2))
}
