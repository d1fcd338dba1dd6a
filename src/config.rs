//! Configuração do copydesk carregada a partir de `copydesk.toml`.
//!
//! A struct [`CopydeskConfig`] contém todos os parâmetros configuráveis.
//! Valores não presentes no arquivo usam defaults sensíveis.
//! As variáveis de ambiente `COPYDESK_API_URL` e `COPYDESK_API_TOKEN`
//! têm precedência sobre o arquivo.

use anyhow::Result;
use serde::Deserialize;
use std::path::Path;

use crate::runner::BatchStrategy;

/// Configuração de nível superior carregada de `copydesk.toml`.
#[derive(Debug, Clone, Deserialize)]
pub struct CopydeskConfig {
    /// URL base da API do estúdio de conteúdo.
    #[serde(default = "default_api_url")]
    pub api_url: String,

    /// Token de autenticação Bearer. Vazio desativa o cabeçalho.
    #[serde(default)]
    pub api_token: String,

    /// Timeout de cada requisição HTTP, em segundos.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Pausa entre itens consecutivos de um lote, em milissegundos.
    #[serde(default = "default_item_delay_ms")]
    pub item_delay_ms: u64,

    /// Intervalo padrão da automação quando não informado via CLI.
    #[serde(default = "default_interval_minutes")]
    pub default_interval_minutes: u32,

    /// Estratégia de processamento do lote ("local" ou "remote").
    #[serde(default)]
    pub strategy: BatchStrategy,

    /// Caminho do arquivo onde o estado da automação é persistido.
    #[serde(default = "default_state_path")]
    pub state_path: String,
}

// Valor padrão para a URL da API: estúdio local.
fn default_api_url() -> String {
    "http://localhost:8700".to_string()
}

// Valor padrão para o timeout de requisição: 120s.
fn default_request_timeout_secs() -> u64 {
    120
}

// Valor padrão para a pausa entre itens: 400ms.
fn default_item_delay_ms() -> u64 {
    400
}

// Valor padrão para o intervalo da automação: 30 minutos.
fn default_interval_minutes() -> u32 {
    30
}

// Valor padrão para o arquivo de estado.
fn default_state_path() -> String {
    "copydesk.state.toml".to_string()
}

impl Default for CopydeskConfig {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            api_token: String::new(),
            request_timeout_secs: default_request_timeout_secs(),
            item_delay_ms: default_item_delay_ms(),
            default_interval_minutes: default_interval_minutes(),
            strategy: BatchStrategy::default(),
            state_path: default_state_path(),
        }
    }
}

impl CopydeskConfig {
    /// Carrega a configuração de `copydesk.toml` no diretório atual.
    /// Usa valores padrão se o arquivo não existir.
    pub fn load() -> Result<Self> {
        Self::load_from(Path::new("copydesk.toml"))
    }

    /// Carrega a configuração a partir de um caminho específico.
    pub fn load_from(path: &Path) -> Result<Self> {
        let mut config = if path.exists() {
            let contents = std::fs::read_to_string(path)?;
            toml::from_str::<CopydeskConfig>(&contents)?
        } else {
            Self::default()
        };

        // Variáveis de ambiente têm precedência sobre o arquivo.
        if let Ok(url) = std::env::var("COPYDESK_API_URL")
            && !url.is_empty()
        {
            config.api_url = url;
        }
        if let Ok(token) = std::env::var("COPYDESK_API_TOKEN")
            && !token.is_empty()
        {
            config.api_token = token;
        }

        Ok(config)
    }

    /// Token como opção: `None` quando não configurado.
    pub fn token(&self) -> Option<String> {
        if self.api_token.is_empty() {
            None
        } else {
            Some(self.api_token.clone())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_values() {
        let config = CopydeskConfig::default();
        assert_eq!(config.api_url, "http://localhost:8700");
        assert!(config.api_token.is_empty());
        assert_eq!(config.request_timeout_secs, 120);
        assert_eq!(config.item_delay_ms, 400);
        assert_eq!(config.default_interval_minutes, 30);
        assert_eq!(config.strategy, BatchStrategy::Local);
        assert_eq!(config.state_path, "copydesk.state.toml");
    }

    #[test]
    fn deserialize_partial_toml() {
        let toml_str = r#"
            api_token = "cds-test-123"
            item_delay_ms = 250
        "#;
        let config: CopydeskConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.api_token, "cds-test-123");
        assert_eq!(config.item_delay_ms, 250);
        assert_eq!(config.api_url, "http://localhost:8700");
        assert_eq!(config.default_interval_minutes, 30);
    }

    #[test]
    fn deserialize_remote_strategy() {
        let config: CopydeskConfig = toml::from_str(r#"strategy = "remote""#).unwrap();
        assert_eq!(config.strategy, BatchStrategy::Remote);
    }

    #[test]
    fn unknown_strategy_is_rejected() {
        let result = toml::from_str::<CopydeskConfig>(r#"strategy = "hybrid""#);
        assert!(result.is_err());
    }

    #[test]
    fn token_is_none_when_empty() {
        let config = CopydeskConfig::default();
        assert!(config.token().is_none());

        let config: CopydeskConfig = toml::from_str(r#"api_token = "cds-1""#).unwrap();
        assert_eq!(config.token().as_deref(), Some("cds-1"));
    }

    #[test]
    fn load_falls_back_to_defaults() {
        // No ambiente de teste, tipicamente não há copydesk.toml no diretório de trabalho.
        let config = CopydeskConfig::load().unwrap();
        assert_eq!(config.request_timeout_secs, 120);
    }
}
