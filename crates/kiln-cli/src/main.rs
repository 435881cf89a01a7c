mod builtin;

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result, bail};
use clap::Parser;
use kiln_core::domain::{ResolvedConfig, TaskArguments, ToolArguments};
use kiln_core::{Environment, KilnError};
use serde_json::Value;
use tracing::debug;
use tracing_subscriber::EnvFilter;

/// Runs a task of the current project.
#[derive(Debug, Parser)]
#[command(name = "kiln", version)]
struct Cli {
    /// Network to connect to (defaults to the config's defaultNetwork)
    #[arg(long)]
    network: Option<String>,

    /// Path to a JSON config file
    #[arg(long)]
    config: Option<PathBuf>,

    #[arg(short, long)]
    verbose: bool,

    #[arg(long)]
    show_stack_traces: bool,

    /// Task to run
    #[arg(default_value = "tasks")]
    task: String,

    /// Task argument as key=value; values are parsed as JSON when possible
    #[arg(short = 'a', long = "arg", value_name = "KEY=VALUE")]
    args: Vec<String>,
}

impl Cli {
    fn tool_arguments(&self) -> ToolArguments {
        ToolArguments {
            network: self.network.clone(),
            config: self.config.clone(),
            verbose: self.verbose,
            show_stack_traces: self.show_stack_traces,
        }
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = std::env::var("RUST_LOG").unwrap_or_else(|_| default.into());
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .with_writer(std::io::stderr)
        .try_init();
}

fn load_config(path: Option<&Path>) -> Result<ResolvedConfig> {
    let Some(path) = path else {
        return Ok(ResolvedConfig::default());
    };

    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("reading config {}", path.display()))?;
    let mut config: ResolvedConfig = serde_json::from_str(&raw)
        .with_context(|| format!("parsing config {}", path.display()))?;

    // relative project paths are relative to the config file
    let base = path
        .parent()
        .filter(|dir| !dir.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let paths = &mut config.paths;
    for p in [&mut paths.root, &mut paths.sources, &mut paths.cache, &mut paths.artifacts] {
        *p = rebase(base, p);
    }

    debug!(path = %path.display(), networks = config.networks.len(), "loaded config");
    Ok(config)
}

fn rebase(base: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        return path.to_path_buf();
    }
    let rest = path.strip_prefix(".").unwrap_or(path);
    if rest.as_os_str().is_empty() {
        base.to_path_buf()
    } else {
        base.join(rest)
    }
}

fn parse_task_args(raw: &[String]) -> Result<TaskArguments> {
    let mut args = TaskArguments::new();
    for item in raw {
        let Some((key, value)) = item.split_once('=') else {
            bail!("task argument {item:?} is not KEY=VALUE");
        };
        let value =
            serde_json::from_str(value).unwrap_or_else(|_| Value::String(value.to_string()));
        args.insert(key.to_string(), value);
    }
    Ok(args)
}

async fn run(cli: Cli) -> Result<Value> {
    let config = load_config(cli.config.as_deref())?;
    let task_args = parse_task_args(&cli.args)?;

    let env = Environment::builder(config, cli.tool_arguments(), builtin::builtin_tasks())
        .extender(builtin::artifacts_extender)
        .build()?;

    let out = env.run(&cli.task, task_args).await?;
    Ok(out)
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    let show_stack_traces = cli.show_stack_traces;

    match run(cli).await {
        Ok(out) => {
            match serde_json::to_string_pretty(&out) {
                Ok(text) => println!("{text}"),
                Err(_) => println!("{out}"),
            }
            ExitCode::SUCCESS
        }
        Err(err) => {
            match err.downcast_ref::<KilnError>() {
                Some(kiln) => eprintln!("Error {}: {kiln}", kiln.code()),
                None => eprintln!("Error: {err}"),
            }
            if show_stack_traces {
                eprintln!("{err:?}");
            }
            ExitCode::FAILURE
        }
    }
}
