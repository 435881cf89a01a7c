//! Built-in tasks and extenders registered by the `kiln` binary.

use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use kiln_core::domain::TaskArguments;
use kiln_core::{Environment, Provider, RunSuper, TaskAction, TaskRegistry, TaskResult, action_fn};
use serde_json::{Value, json};
use tracing::{info, warn};

/// Where compiled artifacts go; attached by `artifacts_extender`.
#[derive(Debug, Clone)]
pub struct ArtifactsDir(pub PathBuf);

pub fn artifacts_extender(env: &mut Environment) {
    let dir = env.config().paths.artifacts.clone();
    if let Err(err) = env.insert_extension("artifacts", ArtifactsDir(dir)) {
        warn!(%err, "artifacts extension not attached");
    }
}

struct Compile;

#[async_trait]
impl TaskAction for Compile {
    async fn run(
        &self,
        args: TaskArguments,
        env: Arc<Environment>,
        _run_super: RunSuper,
    ) -> TaskResult {
        let force = args.get("force").and_then(Value::as_bool).unwrap_or(false);
        let artifacts = env
            .extension::<ArtifactsDir>("artifacts")
            .map(|dir| dir.0.display().to_string());

        Ok(json!({
            "solc": env.config().toolchain_version(),
            "sources": env.config().paths.sources.display().to_string(),
            "artifacts": artifacts,
            "force": force,
        }))
    }
}

pub fn builtin_tasks() -> TaskRegistry {
    let mut tasks = TaskRegistry::new();

    tasks.define_with_description(
        "accounts",
        "Prints the accounts of the selected network",
        action_fn(|_args, env, _run_super| async move {
            env.ethereum().request("eth_accounts", json!([])).await
        }),
    );

    tasks.define_with_description(
        "chain-id",
        "Prints the chain id of the selected network",
        action_fn(|_args, env, _run_super| async move {
            env.ethereum().request("eth_chainId", json!([])).await
        }),
    );

    tasks.define_with_description("compile", "Compiles the project sources", Arc::new(Compile));

    // logs around the base compile and tags the result
    tasks.define(
        "compile",
        action_fn(|_args, env, run_super| async move {
            info!(task = run_super.task_name(), network = %env.network().name, "compiling");
            let mut out = run_super.call().await?;
            if let Value::Object(map) = &mut out {
                map.insert("network".to_string(), json!(env.network().name));
            }
            Ok(out)
        }),
    );

    tasks.define_with_description(
        "tasks",
        "Lists the available tasks",
        action_fn(|_args, env, _run_super| async move {
            let registry = env.tasks();
            let listing: serde_json::Map<String, Value> = registry
                .names()
                .into_iter()
                .map(|name| {
                    let description = registry
                        .definition(name)
                        .and_then(|d| d.description())
                        .unwrap_or("");
                    (name.to_string(), json!(description))
                })
                .collect();
            Ok(Value::Object(listing))
        }),
    );

    tasks
}
