mod cli;
mod ui;

use std::io::Read;
use std::process::ExitCode;

use anyhow::{Context, Result};
use api2convert::client::ReqwestTransport;
use api2convert::{Api, CallbackHandler, Configuration, Conversion, JobSpec, WaitOptions};
use clap::Parser;
use cli::{Cli, Command};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use ui::JobProgress;

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    let default_filter = if cli.verbose { "api2convert=debug" } else { "api2convert=info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    match &cli.command {
        // Não precisa de chave API nem de rede.
        Command::VerifyCallback { file } => return verify_callback(file),
        Command::Convert {
            inputs,
            target,
            category,
            options,
            callback,
        } => {
            let mut conversion = Conversion::new(target.clone());
            if let Some(category) = category {
                conversion = conversion.with_category(category.clone());
            }
            for (key, value) in options {
                conversion = conversion.with_option(key.clone(), value.clone());
            }

            let mut spec = JobSpec::new().with_conversion(conversion);
            spec.input = inputs.clone();
            if let Some(callback) = callback {
                spec = spec.with_callback(callback.clone());
            }

            let (mut api, _) = connect(&cli)?;
            let progress = JobProgress::start("converting...");
            match api.post_full_job(spec).await {
                Ok(job) => progress.finish(job),
                Err(err) => {
                    progress.fail(&err);
                    return Ok(ExitCode::FAILURE);
                }
            }
        }
        Command::Status { job_id } => {
            let (api, _) = connect(&cli)?;
            let job = api.get_job(job_id).await?;
            ui::print_job_summary(&job);
        }
        Command::Wait { job_id, statuses } => {
            let (api, wait) = connect(&cli)?;
            let progress = JobProgress::start(&format!("waiting for job {job_id}..."));
            match api.jobs().wait_for_status(job_id, statuses, wait).await {
                Ok(job) => progress.finish(&job),
                Err(err) => {
                    progress.fail(&err);
                    return Ok(ExitCode::FAILURE);
                }
            }
        }
        Command::Delete { job_id } => {
            let (api, _) = connect(&cli)?;
            api.jobs().delete_job(job_id).await?;
            println!("  job {job_id} deleted");
        }
        Command::Conversions { target, category } => {
            let (api, _) = connect(&cli)?;
            list_conversions(&api, target.as_deref(), category.as_deref()).await?;
        }
    }

    Ok(ExitCode::SUCCESS)
}

/// Carrega a configuração, aplica as flags e monta o cliente. Ctrl-C
/// cancela qualquer espera em andamento.
fn connect(cli: &Cli) -> Result<(Api<ReqwestTransport>, WaitOptions)> {
    let mut config = match &cli.config {
        Some(path) => Configuration::load_from(path)?,
        None => Configuration::load()?,
    };
    apply_overrides(&mut config, cli);

    let cancel = CancellationToken::new();
    let on_ctrl_c = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("interrupted, cancelling wait");
            on_ctrl_c.cancel();
        }
    });

    let wait = wait_options(&config).with_cancel(cancel);
    let api = Api::from_config(&config, &cli.api_key_prefix)
        .with_context(|| format!("cannot build client for key prefix '{}'", cli.api_key_prefix))?
        .with_wait_defaults(wait.clone());
    Ok((api, wait))
}

// Flags da CLI têm precedência sobre o arquivo.
fn apply_overrides(config: &mut Configuration, cli: &Cli) {
    if cli.async_mode {
        config.async_mode = true;
    }
    if let Some(secs) = cli.poll_interval {
        config.wait.poll_interval_secs = secs;
    }
    if let Some(secs) = cli.timeout {
        config.wait.timeout_secs = secs;
    }
}

fn wait_options(config: &Configuration) -> WaitOptions {
    WaitOptions::new()
        .with_poll_interval(config.wait.poll_interval())
        .with_timeout(config.wait.timeout())
}

async fn list_conversions(
    api: &Api<ReqwestTransport>,
    target: Option<&str>,
    category: Option<&str>,
) -> Result<()> {
    match target {
        Some(target) => match api.get_conversion_info(target, category).await? {
            Some(schema) => println!("{}", serde_json::to_string_pretty(&schema)?),
            None => println!("  no conversion to '{target}'"),
        },
        None => {
            for conversion in api.information().get_conversions().await? {
                let category = conversion["category"].as_str().unwrap_or("-");
                let target = conversion["target"].as_str().unwrap_or("-");
                println!("  {category:<12} {target}");
            }
        }
    }
    Ok(())
}

fn verify_callback(file: &std::path::Path) -> Result<ExitCode> {
    let raw = if file.as_os_str() == "-" {
        let mut raw = String::new();
        std::io::stdin().read_to_string(&mut raw)?;
        raw
    } else {
        std::fs::read_to_string(file).with_context(|| format!("cannot read {}", file.display()))?
    };

    match CallbackHandler::new().assert_completed_json(&raw) {
        Ok(_) => {
            let job = serde_json::from_str(&raw)?;
            ui::print_job_summary(&job);
            Ok(ExitCode::SUCCESS)
        }
        Err(err) => {
            tracing::error!(error = %err, "callback payload rejected");
            println!("  ✗ {err}");
            Ok(ExitCode::FAILURE)
        }
    }
}
