//! Configuração do SDK carregada a partir de `api2convert.toml`.
//!
//! A struct [`Configuration`] contém a tabela de chaves da API, o host,
//! a pasta de downloads e as opções repassadas ao cliente HTTP.
//! Valores não presentes no arquivo usam defaults sensíveis.
//! A variável de ambiente `API2CONVERT_API_KEY` tem precedência sobre o
//! arquivo para o prefixo `main`.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Result;
use serde::Deserialize;

use crate::client::RetryPolicy;
use crate::client::resources::{HTTP_HOST, HTTPS_HOST};
use crate::error::ConvertError;

/// Nome do arquivo de configuração procurado no diretório atual.
pub const CONFIG_FILE: &str = "api2convert.toml";

/// Variável de ambiente com a chave do prefixo [`DEFAULT_API_KEY_PREFIX`].
pub const API_KEY_ENV: &str = "API2CONVERT_API_KEY";

/// Prefixo usado quando nenhum outro é informado.
pub const DEFAULT_API_KEY_PREFIX: &str = "main";

/// Configuração de nível superior carregada de `api2convert.toml`.
#[derive(Debug, Clone, Deserialize)]
pub struct Configuration {
    /// Chaves da API indexadas pelo prefixo.
    #[serde(default)]
    pub api_keys: BTreeMap<String, String>,

    /// Conecta via https.
    #[serde(default = "default_https")]
    pub https: bool,

    /// Sobrescreve o host da API (útil para testes e proxies).
    #[serde(default)]
    pub base_url: Option<String>,

    /// Pasta onde os downloads das saídas seriam salvos.
    #[serde(default = "default_download_folder")]
    pub download_folder: PathBuf,

    /// Jobs assíncronos exigem callback e não aguardam a conclusão.
    #[serde(default)]
    pub async_mode: bool,

    /// Opções repassadas sem alteração ao cliente HTTP.
    #[serde(default)]
    pub http: HttpOptions,

    /// Política de retentativa para respostas transitórias.
    #[serde(default)]
    pub retry: RetryPolicy,

    /// Valores padrão da espera por status.
    #[serde(default)]
    pub wait: WaitDefaults,
}

/// Timeouts do cliente HTTP.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct HttpOptions {
    pub connect_timeout_secs: u64,
    pub timeout_secs: u64,
}

impl Default for HttpOptions {
    fn default() -> Self {
        Self {
            connect_timeout_secs: 10,
            timeout_secs: 120,
        }
    }
}

/// Intervalo entre consultas e tempo máximo de espera, em segundos.
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default)]
pub struct WaitDefaults {
    pub poll_interval_secs: u64,
    pub timeout_secs: u64,
}

impl Default for WaitDefaults {
    fn default() -> Self {
        Self {
            poll_interval_secs: 1,
            timeout_secs: 14_400,
        }
    }
}

impl WaitDefaults {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

// Valor padrão para https: ligado.
fn default_https() -> bool {
    true
}

// Valor padrão para a pasta de downloads: "downloads".
fn default_download_folder() -> PathBuf {
    PathBuf::from("downloads")
}

impl Default for Configuration {
    fn default() -> Self {
        Self {
            api_keys: BTreeMap::new(),
            https: default_https(),
            base_url: None,
            download_folder: default_download_folder(),
            async_mode: false,
            http: HttpOptions::default(),
            retry: RetryPolicy::default(),
            wait: WaitDefaults::default(),
        }
    }
}

impl Configuration {
    /// Carrega a configuração de `api2convert.toml` no diretório atual.
    /// Usa valores padrão se o arquivo não existir.
    pub fn load() -> Result<Self> {
        Self::load_from(Path::new(CONFIG_FILE))
    }

    /// Carrega a configuração de um caminho específico.
    pub fn load_from(path: &Path) -> Result<Self> {
        let mut config = if path.exists() {
            let contents = std::fs::read_to_string(path)?;
            toml::from_str::<Configuration>(&contents)?
        } else {
            Self::default()
        };

        // Variável de ambiente tem precedência sobre o arquivo para a chave API.
        if let Ok(key) = std::env::var(API_KEY_ENV)
            && !key.trim().is_empty()
        {
            config.set_api_key(DEFAULT_API_KEY_PREFIX, key);
        }

        Ok(config)
    }

    /// Retorna a chave do prefixo, sem espaços nas bordas.
    pub fn api_key(&self, prefix: &str) -> Result<&str, ConvertError> {
        let key = self
            .api_keys
            .get(prefix)
            .ok_or_else(|| ConvertError::NoApiKeyDefined(prefix.to_string()))?
            .trim();
        if key.is_empty() {
            return Err(ConvertError::NoApiKeyDefined(prefix.to_string()));
        }
        Ok(key)
    }

    pub fn set_api_key(&mut self, prefix: impl Into<String>, key: impl Into<String>) {
        self.api_keys.insert(prefix.into(), key.into());
    }

    /// Host efetivo: o override, ou o host https/http conforme a flag.
    pub fn base_url(&self) -> String {
        match &self.base_url {
            Some(url) if url.ends_with('/') => url.clone(),
            Some(url) => format!("{url}/"),
            None if self.https => HTTPS_HOST.to_string(),
            None => HTTP_HOST.to_string(),
        }
    }
}
