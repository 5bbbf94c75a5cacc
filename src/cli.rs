//! Interface de linha de comando do api2convert baseada em clap.
//!
//! Define a struct [`Cli`] com subcomandos [`Command`] e flags globais
//! (--api-key-prefix, --async, --config, --verbose).

use std::path::PathBuf;

use api2convert::config::DEFAULT_API_KEY_PREFIX;
use api2convert::{Input, JobStatusCode};
use clap::{Parser, Subcommand};
use serde_json::Value;
use uuid::Uuid;

/// api2convert — conversão de arquivos pela API do api2convert.
#[derive(Debug, Parser)]
#[command(name = "api2convert", version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Prefixo da chave API definida em `[api_keys]`.
    #[arg(long, global = true, default_value = DEFAULT_API_KEY_PREFIX)]
    pub api_key_prefix: String,

    /// Modo assíncrono: exige callback e não aguarda a conclusão.
    #[arg(long = "async", global = true, default_value_t = false)]
    pub async_mode: bool,

    /// Caminho alternativo para o arquivo de configuração.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Intervalo entre consultas de status, em segundos.
    #[arg(long, global = true)]
    pub poll_interval: Option<u64>,

    /// Tempo máximo de espera, em segundos.
    #[arg(long, global = true)]
    pub timeout: Option<u64>,

    /// Habilita saída detalhada (verbose).
    #[arg(long, short, global = true, default_value_t = false)]
    pub verbose: bool,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Cria um job completo: envia as entradas, processa e aguarda.
    Convert {
        /// Arquivo local, URL remota ou id de uma saída anterior.
        #[arg(long = "input", short, required = true, value_parser = parse_input)]
        inputs: Vec<Input>,

        /// Formato de destino (ex.: png, mp3, pdf).
        #[arg(long, short)]
        target: String,

        /// Categoria da conversão (ex.: image, audio).
        #[arg(long)]
        category: Option<String>,

        /// Opção da conversão no formato chave=valor.
        #[arg(long = "option", short, value_parser = parse_option)]
        options: Vec<(String, Value)>,

        /// URL chamada pelo serviço quando o job termina.
        #[arg(long)]
        callback: Option<String>,
    },

    /// Mostra o status atual de um job.
    Status {
        job_id: String,
    },

    /// Aguarda até o job atingir um dos status informados.
    Wait {
        job_id: String,

        /// Status aguardado; pode ser repetido.
        #[arg(long = "status", short, default_value = "completed")]
        statuses: Vec<JobStatusCode>,
    },

    /// Remove um job.
    Delete {
        job_id: String,
    },

    /// Lista conversões disponíveis ou o schema de um destino.
    Conversions {
        #[arg(long, short)]
        target: Option<String>,

        #[arg(long)]
        category: Option<String>,
    },

    /// Valida o corpo JSON recebido por um webhook (`-` lê do stdin).
    VerifyCallback {
        file: PathBuf,
    },
}

/// Interpreta uma entrada: URL http(s) vira remota, UUID vira `input_id`,
/// qualquer outra coisa é um arquivo local a enviar.
pub fn parse_input(raw: &str) -> Result<Input, String> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err("input must not be empty".into());
    }
    if raw.starts_with("http://") || raw.starts_with("https://") {
        return Ok(Input::remote(raw));
    }
    if let Ok(id) = Uuid::parse_str(raw) {
        return Ok(Input::input_id(id));
    }
    Ok(Input::upload(raw))
}

/// `chave=valor`; o valor é lido como JSON quando possível, senão como texto.
pub fn parse_option(raw: &str) -> Result<(String, Value), String> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected key=value, got '{raw}'"))?;
    let key = key.trim();
    if key.is_empty() {
        return Err(format!("empty option name in '{raw}'"));
    }
    let value = serde_json::from_str(value).unwrap_or_else(|_| Value::String(value.to_string()));
    Ok((key.to_string(), value))
}
