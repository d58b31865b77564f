// src/lib.rs

pub mod cli;
pub mod config;
pub mod errors;
pub mod exec;
pub mod invocation;
pub mod logging;
pub mod orchestrator;
pub mod result;
pub mod types;

use std::sync::Arc;

use tracing::{debug, info};

use crate::cli::CliArgs;
use crate::config::duration::parse_timeout;
use crate::config::{default_config_path, load_and_validate, load_or_default, ConfigFile};
use crate::errors::{BridgeError, Result};
use crate::exec::{cancel_pair, ConsoleSink};
use crate::invocation::build_invocation;
use crate::orchestrator::{orchestrate_with_cancel, Outcome};

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - config loading + CLI overrides
/// - Ctrl-C → cancellation
/// - one orchestrated worker run with output mirrored to the console
///
/// Returns `None` for `--dry-run`.
pub async fn run(args: CliArgs) -> Result<Option<Outcome>> {
    let cfg = resolve_config(&args)?;

    if args.dry_run {
        print_dry_run(&cfg);
        return Ok(None);
    }

    let (cancel_handle, cancel_signal) = cancel_pair();

    // Ctrl-C → kill the worker.
    let ctrl_c = tokio::spawn(async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            eprintln!("failed to listen for Ctrl+C: {e}");
            return;
        }
        info!("Ctrl+C received");
        cancel_handle.cancel();
    });

    let outcome = orchestrate_with_cancel(
        &cfg.launch,
        &cfg.process,
        cfg.run,
        Arc::new(ConsoleSink),
        Some(cancel_signal),
    )
    .await;

    ctrl_c.abort();
    outcome.map(Some)
}

/// Load the config file (explicit `--config`, or the default path if it
/// exists) and apply CLI overrides on top.
pub fn resolve_config(args: &CliArgs) -> Result<ConfigFile> {
    let cfg = match args.config {
        Some(ref path) => load_and_validate(path)?,
        None => load_or_default(default_config_path())?,
    };
    apply_overrides(cfg, args)
}

/// Overlay any values given on the command line onto `cfg`.
pub fn apply_overrides(mut cfg: ConfigFile, args: &CliArgs) -> Result<ConfigFile> {
    let launch = &mut cfg.launch;

    if let Some(ref p) = args.python {
        launch.executable = p.clone();
    }
    if let Some(ref s) = args.script {
        launch.script = s.clone();
    }
    if let Some(ref port) = args.port {
        launch.port = port.clone();
    }
    if let Some(baud) = args.baud_rate {
        launch.baud_rate = baud;
    }
    if let Some(ref folder) = args.save_folder {
        launch.save_folder = folder.clone();
    }
    if let Some(interactive) = args.interactive {
        launch.interactive = interactive;
    }
    if let Some(w) = args.default_width {
        launch.default_width = w;
    }
    if let Some(h) = args.default_height {
        launch.default_height = h;
    }
    if let Some(stdin) = args.stdin {
        cfg.process.stdin = stdin;
    }
    if let Some(ref t) = args.timeout {
        let dur =
            parse_timeout(t).map_err(|e| BridgeError::ConfigError(format!("--timeout: {e}")))?;
        cfg.run.timeout = Some(dur);
    }

    Ok(cfg)
}

/// Process exit status for a finished run: 0 if the worker reported
/// success, 1 if it reported an error.
///
/// Classified failures (`BridgeError`) map to 2 in `main.rs`.
pub fn exit_status(outcome: &Outcome) -> i32 {
    if outcome.result.is_success() { 0 } else { 1 }
}

/// Simple dry-run output: print the resolved settings and the command line.
fn print_dry_run(cfg: &ConfigFile) {
    println!("sigbridge dry-run");
    println!("  invocation: {}", build_invocation(&cfg.launch));
    if let Some(ref dir) = cfg.process.working_dir {
        println!("  working_dir: {}", dir.display());
    }
    if !cfg.process.env.is_empty() {
        println!("  env: {:?}", cfg.process.env);
    }
    println!("  stdin: {:?}", cfg.process.stdin);
    match cfg.run.timeout {
        Some(t) => println!("  timeout: {t:?}"),
        None => println!("  timeout: none"),
    }

    debug!("dry-run complete (no execution)");
}
