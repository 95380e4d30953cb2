//! CLI entry point for the SDUI schema resolver.
//!
//! Provides commands for inlining `$ref` graphs into single documents,
//! checking reference integrity, and displaying active configuration.

use clap::{
    Parser, Subcommand,
    builder::styling::{AnsiColor, Effects, Styles},
};
use refsolve::io::{ExitCode, OutputFormat, OutputManager};
use refsolve::resolver::Resolution;
use refsolve::{ResolveError, Resolver, Settings};
use serde::Serialize;
use std::fmt;
use std::path::{Path, PathBuf};

fn clap_cargo_style() -> Styles {
    Styles::styled()
        .header(AnsiColor::Cyan.on_default() | Effects::BOLD)
        .usage(AnsiColor::Cyan.on_default() | Effects::BOLD)
        .literal(AnsiColor::Green.on_default())
        .placeholder(AnsiColor::Green.on_default())
}

/// SDUI schema reference resolver
#[derive(Parser)]
#[command(
    name = "refsolve",
    version = env!("CARGO_PKG_VERSION"),
    about = "SDUI schema reference resolver",
    long_about = "Inline $ref graphs of SDUI component schemas into single documents,\nwith bounded duplication and depth so recursive component trees stay finite.",
    next_line_help = true,
    styles = clap_cargo_style()
)]
struct Cli {
    /// Path to custom refsolve.toml file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

/// Available CLI commands
#[derive(Subcommand)]
enum Commands {
    /// Resolve a schema into a single inlined document
    #[command(
        about = "Inline every reachable $ref into one document",
        after_help = "Examples:\n  refsolve resolve screens/Home.json\n  refsolve resolve screens/Home.json -o Home.resolved.json\n  refsolve resolve screens/Home.json --web-only --max-depth 20\n\nThe resolved document goes to stdout (or --output); the run summary\ngoes to stderr. Exit code 3 means the output contains stubs."
    )]
    Resolve {
        /// Root schema file
        schema: PathBuf,

        /// Write the resolved document here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Recursion ceiling (overrides config)
        #[arg(long)]
        max_depth: Option<usize>,

        /// Stub out components not released for web
        #[arg(long)]
        web_only: bool,

        /// Emit compact JSON instead of pretty-printed
        #[arg(long)]
        compact: bool,
    },

    /// Check reference integrity of a schema tree
    #[command(
        about = "Report stubs and broken references without writing a document",
        after_help = "Examples:\n  refsolve check screens/Home.json\n  refsolve check screens/Home.json --web-only --json\n\nExit code 0 means every $ref resolved cleanly; 3 means the run\ndegraded (stubs or error markers)."
    )]
    Check {
        /// Root schema file
        schema: PathBuf,

        /// Recursion ceiling (overrides config)
        #[arg(long)]
        max_depth: Option<usize>,

        /// Stub out components not released for web
        #[arg(long)]
        web_only: bool,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show current configuration settings
    #[command(about = "Display active settings from refsolve.toml and environment")]
    Config {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let code = run(cli);
    std::process::exit(code.into());
}

fn run(cli: Cli) -> ExitCode {
    let settings = match Settings::load(cli.config.as_deref()) {
        Ok(settings) => settings,
        Err(e) => {
            let mut manager = OutputManager::new(OutputFormat::Text);
            return manager.error(&e).unwrap_or(ExitCode::GeneralError);
        }
    };

    match cli.command {
        Commands::Resolve {
            schema,
            output,
            max_depth,
            web_only,
            compact,
        } => cmd_resolve(&settings, schema, output, max_depth, web_only, compact),
        Commands::Check {
            schema,
            max_depth,
            web_only,
            json,
        } => cmd_check(&settings, schema, max_depth, web_only, json),
        Commands::Config { json } => cmd_config(settings, json),
    }
}

fn resolve_with_overrides(
    settings: &Settings,
    schema: &Path,
    max_depth: Option<usize>,
    web_only: bool,
) -> Result<Resolution, ResolveError> {
    let mut options = settings.resolve_options();
    if let Some(depth) = max_depth {
        options.max_depth = depth;
    }
    if web_only {
        options.web_only = true;
    }
    Resolver::new(options).resolve_file(schema)
}

fn cmd_resolve(
    settings: &Settings,
    schema: PathBuf,
    output: Option<PathBuf>,
    max_depth: Option<usize>,
    web_only: bool,
    compact: bool,
) -> ExitCode {
    let mut manager = OutputManager::new(OutputFormat::Text);

    let resolution = match resolve_with_overrides(settings, &schema, max_depth, web_only) {
        Ok(resolution) => resolution,
        Err(e) => return manager.error(&e).unwrap_or(ExitCode::GeneralError),
    };

    let pretty = settings.output.pretty && !compact;
    let rendered = match render_document(&resolution.document, pretty) {
        Ok(rendered) => rendered,
        Err(e) => return manager.error(&e).unwrap_or(ExitCode::GeneralError),
    };

    match output {
        Some(path) => {
            if let Err(source) = std::fs::write(&path, rendered.as_bytes()) {
                let e = ResolveError::OutputWrite { path, source };
                return manager.error(&e).unwrap_or(ExitCode::GeneralError);
            }
            eprintln!("Wrote {}", path.display());
        }
        None => println!("{rendered}"),
    }

    // Summary on stderr so piped output stays clean JSON
    eprintln!("{}", resolution.report);
    ExitCode::from_clean_flag(resolution.report.is_clean())
}

fn cmd_check(
    settings: &Settings,
    schema: PathBuf,
    max_depth: Option<usize>,
    web_only: bool,
    json: bool,
) -> ExitCode {
    let mut manager = OutputManager::new(OutputFormat::from_json_flag(json));

    match resolve_with_overrides(settings, &schema, max_depth, web_only) {
        Err(e) => manager.error(&e).unwrap_or(ExitCode::GeneralError),
        Ok(resolution) => {
            let clean = resolution.report.is_clean();
            let summary = format!(
                "{} stub(s), {} error marker(s)",
                resolution.report.total_stubs, resolution.report.error_markers
            );
            manager
                .run_result(resolution.report, clean, summary)
                .unwrap_or(ExitCode::GeneralError)
        }
    }
}

fn cmd_config(settings: Settings, json: bool) -> ExitCode {
    let mut manager = OutputManager::new(OutputFormat::from_json_flag(json));
    manager
        .success(SettingsView(settings))
        .unwrap_or(ExitCode::GeneralError)
}

fn render_document(document: &serde_json::Value, pretty: bool) -> Result<String, ResolveError> {
    let rendered = if pretty {
        serde_json::to_string_pretty(document)
    } else {
        serde_json::to_string(document)
    };
    rendered.map_err(|e| ResolveError::General(format!("failed to serialize output: {e}")))
}

/// Settings with a text rendering for the `config` command.
#[derive(Serialize)]
#[serde(transparent)]
struct SettingsView(Settings);

impl fmt::Display for SettingsView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = &self.0;
        writeln!(f, "version = {}", s.version)?;
        writeln!(f, "debug = {}", s.debug)?;
        writeln!(f)?;
        writeln!(f, "[resolver]")?;
        writeln!(f, "max_depth = {}", s.resolver.max_depth)?;
        writeln!(f, "web_only = {}", s.resolver.web_only)?;
        writeln!(f, "duplicate_cap = {}", s.resolver.duplicate_cap)?;
        writeln!(f, "cyclic_cap = {}", s.resolver.cyclic_cap)?;
        writeln!(f, "cyclic_components = {:?}", s.resolver.cyclic_components)?;
        writeln!(f)?;
        writeln!(f, "[output]")?;
        write!(f, "pretty = {}", s.output.pretty)
    }
}
