use clap::builder::{styling::AnsiColor, Styles};
use clap::ColorChoice;
use clap::{CommandFactory, FromArgMatches, Parser, Subcommand};
use commands::{build_variants, check_options, BuildArgs, CheckArgs};
use miette::Result;

mod commands;
mod emit;
mod errors;
mod snapshot;
mod utils;

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Log every substitution and emitted asset
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Validate an options file and show the variants it describes
    Check {
        /// The path to the options file (.json or .toml)
        #[arg(short, long)]
        config: String,
    },
    /// Render the default and override assets of a module graph snapshot
    Build {
        /// The path to the module graph snapshot
        #[arg(short, long)]
        graph: String,

        /// The path to the options file (.json or .toml)
        #[arg(short, long)]
        config: String,

        /// The directory to write the assets to
        #[arg(short, long, default_value = "build")]
        output_dir: String,
    },
}

fn parse_args() -> Result<Args> {
    // Configure colored/styled help output
    let styles = Styles::styled()
        .header(AnsiColor::Yellow.on_default().bold())
        .usage(AnsiColor::Green.on_default().bold())
        .literal(AnsiColor::Cyan.on_default())
        .placeholder(AnsiColor::Blue.on_default());

    let matches = Args::command()
        .styles(styles)
        .color(ColorChoice::Auto)
        .get_matches();

    Args::from_arg_matches(&matches).map_err(|e| miette::miette!("{}", e))
}

fn init_logging(verbose: bool) {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    let default_filter = if verbose {
        "css_module_override=debug,cmo_engine=debug"
    } else {
        "css_module_override=info,cmo_engine=info"
    };
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| default_filter.into());

    let stdout_layer = tracing_subscriber::fmt::layer().with_target(false);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(stdout_layer)
        .init();
}

fn main() -> Result<()> {
    let args = parse_args()?;
    init_logging(args.verbose);

    match args.command {
        Commands::Check { config } => check_options(CheckArgs { config }),
        Commands::Build {
            graph,
            config,
            output_dir,
        } => build_variants(BuildArgs {
            graph,
            config,
            output_dir,
        }),
    }
}
