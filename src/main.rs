//! Carepath CLI - Track care-pathway task progress in a spreadsheet.

use carepath::cascade::FormChoice;
use carepath::cli::{Cli, Commands, ConfigCommands, FilterArgs};
use carepath::commands::{self, Output};
use carepath::config::{
    ConfigOverrides, ConfigSources, LOCAL_CONFIG_FILE, OutputFormat, ResolvedConfig,
    resolve_config,
};
use carepath::models::{Locale, TaskKey};
use carepath::view::FilterSelection;
use clap::Parser;
use std::path::{Path, PathBuf};
use std::process;

/// Environment variable holding the log filter (e.g. `debug`, `carepath=trace`).
const LOG_ENV: &str = "CAREPATH_LOG";

fn main() {
    let cli = Cli::parse();
    let mut human = cli.human_readable;

    init_tracing(&cli.command);

    let result = resolve(&cli).and_then(|(config, local_config)| {
        human = config.output_format.value == OutputFormat::Human;
        run_command(cli.command, &config, &local_config, human)
    });

    // Handle result
    if let Err(e) = result {
        if human {
            eprintln!("Error: {}", e);
        } else {
            eprintln!("{}", serde_json::json!({ "error": e.to_string() }));
        }
        process::exit(1);
    }
}

/// Logs go to stderr so JSON on stdout stays parseable.
fn init_tracing(command: &Commands) {
    let level = match command {
        #[cfg(feature = "gui")]
        Commands::Serve { .. } => "info",
        _ => "warn",
    };

    let filter = tracing_subscriber::EnvFilter::try_from_env(LOG_ENV)
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

/// Resolve configuration from CLI flags, environment, and config files.
fn resolve(cli: &Cli) -> Result<(ResolvedConfig, PathBuf), carepath::Error> {
    let local_config = cli
        .config
        .clone()
        .unwrap_or_else(|| PathBuf::from(LOCAL_CONFIG_FILE));
    let sources = ConfigSources::load(&local_config)?;

    let mut overrides = ConfigOverrides::new();
    if let Some(ref file) = cli.file {
        overrides = overrides.with_data_file(file);
    }
    if cli.human_readable {
        overrides = overrides.with_output_format(OutputFormat::Human);
    }
    match &cli.command {
        Commands::Init {
            locale: Some(locale),
            ..
        } => {
            let locale = Locale::parse(locale).ok_or_else(|| {
                carepath::Error::InvalidInput(format!(
                    "Unknown locale: {} (expected en or pt)",
                    locale
                ))
            })?;
            overrides = overrides.with_locale(locale);
        }
        #[cfg(feature = "gui")]
        Commands::Serve { port, host } => {
            if let Some(port) = port {
                overrides = overrides.with_port(*port);
            }
            if let Some(host) = host {
                overrides = overrides.with_host(host);
            }
        }
        _ => {}
    }

    Ok((resolve_config(&sources, &overrides), local_config))
}

fn filters(args: &FilterArgs) -> FilterSelection {
    commands::filter_selection(&args.pathways, &args.phases, &args.statuses)
}

fn run_command(
    command: Commands,
    config: &ResolvedConfig,
    local_config: &Path,
    human: bool,
) -> Result<(), carepath::Error> {
    let data_file = config.data_file();
    tracing::debug!(data_file = %data_file.display(), source = %config.data_file.source, "resolved tracking sheet");

    match command {
        Commands::Init { force, .. } => {
            let result = commands::init(data_file, config.locale.value, force)?;
            output(&result, human);
        }
        Commands::Options {
            pathway,
            phase,
            task,
        } => {
            let result = commands::options(data_file, &FormChoice::new(pathway, phase, task))?;
            output(&result, human);
        }
        Commands::Edit {
            pathway,
            phase,
            task,
            status,
            note,
        } => {
            let key = TaskKey::new(pathway, phase, task);
            let result = commands::edit(data_file, &key, &status, note.as_deref())?;
            output(&result, human);
        }
        Commands::AddPathway { name } => {
            let result = commands::add_pathway(data_file, &name)?;
            output(&result, human);
        }
        Commands::List { filters: args } => {
            let result = commands::list(data_file, &filters(&args))?;
            output(&result, human);
        }
        Commands::Report { filters: args } => {
            let result = commands::report(data_file, &filters(&args))?;
            output(&result, human);
        }
        Commands::Export {
            output: path,
            filters: args,
        } => {
            let path = path.unwrap_or_else(|| commands::default_export_path(config));
            let result = commands::export(data_file, &filters(&args), &path)?;
            output(&result, human);
        }
        Commands::Config { command } => match command {
            ConfigCommands::Show => {
                let result = commands::config_show(config, local_config);
                output(&result, human);
            }
        },
        #[cfg(feature = "gui")]
        Commands::Serve { .. } => run_gui(config)?,
    }

    Ok(())
}

fn output<T: Output>(result: &T, human: bool) {
    if human {
        println!("{}", result.to_human());
    } else {
        println!("{}", result.to_json());
    }
}

/// Run the dashboard web server
#[cfg(feature = "gui")]
fn run_gui(config: &ResolvedConfig) -> Result<(), carepath::Error> {
    use carepath::session::Dashboard;
    use carepath::storage::TableStore;

    let store = TableStore::open(config.data_file())?;
    let dashboard =
        Dashboard::open(store)?.with_export_filename(config.export_filename.value.clone());

    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?
        .block_on(carepath::gui::start_server(
            dashboard,
            &config.host.value,
            config.port.value,
        ))
}
