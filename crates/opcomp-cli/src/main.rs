use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use clap_complete::Shell;

use opcomp_core::config::{self, CONFIG_FILE_NAME, OpcompConfig, OutputFormat, ResolverKind};
use opcomp_core::ir::{CompiledSpec, Severity, ValidationIssue};
use opcomp_core::parse::{self, spec::OpenApiSpec};
use opcomp_core::{CompileOptions, ComponentsResolver, NoopResolver, compile};

#[derive(Parser)]
#[command(
    name = "opcomp",
    about = "Compile OpenAPI operations into method descriptors",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compile a spec and print its method descriptors
    Compile {
        /// Path to the OpenAPI spec file (YAML or JSON)
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Output format (defaults to the config's `output.format`)
        #[arg(long)]
        format: Option<FormatArg>,
    },

    /// Validate a spec and report skipped operations
    Validate {
        /// Path to the OpenAPI spec file
        #[arg(short, long)]
        input: PathBuf,
    },

    /// Print a one-line summary per compiled operation
    Inspect {
        /// Path to the OpenAPI spec file
        #[arg(short, long)]
        input: PathBuf,
    },

    /// Initialize a new opcomp configuration
    Init {
        /// Overwrite existing files
        #[arg(long)]
        force: bool,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        shell: Shell,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum FormatArg {
    Json,
    Yaml,
}

impl From<OutputFormat> for FormatArg {
    fn from(format: OutputFormat) -> Self {
        match format {
            OutputFormat::Json => FormatArg::Json,
            OutputFormat::Yaml => FormatArg::Yaml,
        }
    }
}

fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Compile { input, format } => cmd_compile(input, format),

        Commands::Validate { input } => cmd_validate(input),

        Commands::Inspect { input } => cmd_inspect(input),

        Commands::Init { force } => cmd_init(force),

        Commands::Completions { shell } => {
            let mut cmd = <Cli as clap::CommandFactory>::command();
            clap_complete::generate(shell, &mut cmd, "opcomp", &mut std::io::stdout());
            Ok(())
        }
    }
}

/// Try to load the project config file from the current directory.
fn try_load_config() -> Result<Option<OpcompConfig>> {
    let config_path = PathBuf::from(CONFIG_FILE_NAME);
    Ok(config::load_config(&config_path)?)
}

fn load_spec(path: &Path) -> Result<OpenApiSpec> {
    let content =
        fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?;

    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("yaml");

    let parsed = match ext {
        "json" => parse::from_json(&content)?,
        _ => parse::from_yaml(&content)?,
    };
    Ok(parsed)
}

/// Compile on a single-threaded runtime with the configured resolver, then
/// report every issue through the logger.
fn compile_spec(spec: &OpenApiSpec, cfg: &OpcompConfig) -> Result<CompiledSpec> {
    let options = CompileOptions::from(cfg);
    let runtime = tokio::runtime::Builder::new_current_thread()
        .build()
        .context("failed to start runtime")?;

    let compiled = runtime.block_on(async {
        match cfg.models.resolver {
            ResolverKind::None => compile(spec, &NoopResolver, &options).await,
            ResolverKind::Components => {
                let resolver = ComponentsResolver::new(spec, &cfg.models.import_dir);
                compile(spec, &resolver, &options).await
            }
        }
    })?;

    report_issues(&compiled.issues);
    Ok(compiled)
}

fn report_issues(issues: &[ValidationIssue]) {
    for issue in issues {
        match issue.severity {
            Severity::Error => log::error!("{}: {}", issue.spec_path, issue.message),
            Severity::Warning => log::warn!("{}: {}", issue.spec_path, issue.message),
            Severity::Info => log::info!("{}: {}", issue.spec_path, issue.message),
        }
    }
}

fn cmd_compile(input: Option<PathBuf>, format: Option<FormatArg>) -> Result<()> {
    let cfg = try_load_config()?.unwrap_or_default();
    let input = input.unwrap_or_else(|| PathBuf::from(&cfg.input));
    let spec = load_spec(&input)?;
    let compiled = compile_spec(&spec, &cfg)?;

    match format.unwrap_or_else(|| cfg.output.format.into()) {
        FormatArg::Yaml => {
            let yaml = serde_yaml_ng::to_string(&compiled)?;
            print!("{}", yaml);
        }
        FormatArg::Json => {
            let json = serde_json::to_string_pretty(&compiled)?;
            println!("{}", json);
        }
    }
    Ok(())
}

fn cmd_validate(input: PathBuf) -> Result<()> {
    let cfg = try_load_config()?.unwrap_or_default();
    let spec = load_spec(&input)?;

    let dialect = if spec.is_swagger2() { "Swagger" } else { "OpenAPI" };
    eprintln!("Valid {} {} spec: {}", dialect, spec.version(), spec.info.title);
    eprintln!("  Version: {}", spec.info.version);
    eprintln!(
        "  Paths: {}",
        spec.paths.as_ref().map(|p| p.len()).unwrap_or_default()
    );

    let compiled = compile_spec(&spec, &cfg)?;
    eprintln!("  Compiled operations: {}", compiled.methods.len());
    eprintln!("  Skipped operations: {}", compiled.skipped.len());
    for skipped in &compiled.skipped {
        eprintln!("    {} {}: {}", skipped.method, skipped.path, skipped.reason);
    }
    eprintln!("  Model imports: {}", compiled.imports.len());

    if compiled.methods.is_empty() && !compiled.skipped.is_empty() {
        anyhow::bail!("every operation was skipped");
    }
    eprintln!("Validation successful.");
    Ok(())
}

fn cmd_inspect(input: PathBuf) -> Result<()> {
    let cfg = try_load_config()?.unwrap_or_default();
    let spec = load_spec(&input)?;
    let compiled = compile_spec(&spec, &cfg)?;

    for method in &compiled.methods {
        let mut flags = Vec::new();
        if method.paginated {
            flags.push("paginated");
        }
        if method.response.has_headers() {
            flags.push("headers");
        }
        if method.request_body.is_some() {
            flags.push("body");
        }
        if method.deprecated {
            flags.push("deprecated");
        }
        println!(
            "{:<7} {:<40} {:<28} {:?} [{}]",
            method.method.as_str(),
            method.path.raw,
            method.name.camel_case,
            method.response.kind,
            flags.join(",")
        );
    }
    Ok(())
}

fn cmd_init(force: bool) -> Result<()> {
    let config_path = PathBuf::from(CONFIG_FILE_NAME);

    if config_path.exists() && !force {
        anyhow::bail!(
            "{} already exists. Use --force to overwrite.",
            config_path.display()
        );
    }

    fs::write(&config_path, config::default_config_content())?;
    eprintln!("Created {}", config_path.display());
    Ok(())
}
