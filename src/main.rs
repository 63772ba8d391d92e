use clap::{Parser, Subcommand};
use hypertemplate::build::{self, BuildOptions};
use hypertemplate::{config, output};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

/// Directory overrides shared by `build` and `check`.
#[derive(clap::Args, Clone)]
struct DirArgs {
    /// Documents directory
    #[arg(short, long)]
    docs: Option<PathBuf>,

    /// Templates directory
    #[arg(short, long)]
    templates: Option<PathBuf>,

    /// Output directory
    output: Option<PathBuf>,
}

#[derive(clap::Args, Clone)]
struct BuildArgs {
    #[command(flatten)]
    dirs: DirArgs,

    /// Expand and report, but write nothing
    #[arg(long)]
    dry_run: bool,

    /// Rebuild every document regardless of timestamps
    #[arg(long)]
    force_rebuild: bool,
}

#[derive(Parser)]
#[command(name = "hypertemplate")]
#[command(version)]
#[command(about = "Static site template expander")]
#[command(long_about = "\
Static site template expander

Documents are copied from the docs directory to the output directory.
Markup documents (.html, .htm) may use templates from the templates
directory:

  templates/card.html:
    <h1><--field --name=\"title\" --default=\"Untitled\"></h1>
    <--inner-html>

  docs/index.html:
    <--template --name=\"card\" $title=\"Hi\">
      <p>body</p>
    </--template>

Fields can also be given in bulk: --fields=\"title:Hi;lead:Welcome\".
Only documents whose source or templates changed since the last build
are rebuilt.

Run 'hypertemplate gen-config' to generate a documented hypertemplate.toml.")]
struct Cli {
    /// Config file (defaults to ./hypertemplate.toml when present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log planner and expansion decisions
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    no_color: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Expand changed documents into the output directory
    Build(BuildArgs),
    /// Expand every document without writing, reporting any defect
    Check(DirArgs),
    /// Print a stock hypertemplate.toml with all options documented
    GenConfig,
}

fn main() -> Result<ExitCode, Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    if cli.no_color {
        colored::control::set_override(false);
    }

    let status = match &cli.command {
        Command::Build(args) => {
            let options = build_options(&cli, &args.dirs, args.dry_run, args.force_rebuild)?;
            run(&options)
        }
        Command::Check(dirs) => {
            let options = build_options(&cli, dirs, true, true)?;
            run(&options)
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
            0
        }
    };
    Ok(ExitCode::from(status))
}

/// Run a build, printing progress as it goes. Returns the exit code.
fn run(options: &BuildOptions) -> u8 {
    let (tx, rx) = std::sync::mpsc::channel();
    let printer = std::thread::spawn(move || {
        for event in rx {
            for line in output::format_build_event(&event) {
                println!("{}", line);
            }
        }
    });
    let outcome = build::build(options, Some(tx));
    printer.join().unwrap();

    output::print_outcome(&outcome);
    outcome.status.exit_code()
}

/// Resolve config, apply CLI overrides and size the thread pool.
fn build_options(
    cli: &Cli,
    dirs: &DirArgs,
    dry_run: bool,
    force_rebuild: bool,
) -> Result<BuildOptions, config::ConfigError> {
    let mut config = config::load_config(cli.config.as_deref(), Path::new("."))?;
    if let Some(docs) = &dirs.docs {
        config.docs = docs.clone();
    }
    if let Some(templates) = &dirs.templates {
        config.templates = templates.clone();
    }
    if let Some(output) = &dirs.output {
        config.output = output.clone();
    }
    config.validate()?;
    init_thread_pool(&config.processing);

    Ok(BuildOptions {
        docs: config.docs,
        templates: config.templates,
        output: config.output,
        max_expansions: config.expansion.max_expansions,
        dry_run,
        force_rebuild,
    })
}

/// Install the stderr log subscriber. `RUST_LOG` refines the filter.
fn init_logging(verbose: bool) {
    let level = if verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::WARN
    };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()),
        )
        .init();
}

/// Initialize the rayon thread pool based on processing config.
///
/// Capped at the number of available CPU cores.
fn init_thread_pool(processing: &config::ProcessingConfig) {
    let threads = config::effective_threads(processing);
    rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .build_global()
        .ok();
}
