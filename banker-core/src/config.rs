//! Configuração da sessão
//!
//! Lida de TOML (`banker.toml`) ou de variáveis de ambiente. O `.env` é
//! carregado uma única vez, no primeiro acesso ao ambiente.

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::env;
use std::path::Path;

use crate::error::{LedgerError, LedgerResult};

// Automatically load .env when the environment is first read
static DOTENV_INIT: Lazy<()> = Lazy::new(|| {
    let _ = dotenv::dotenv();
});

#[inline]
fn ensure_loaded() {
    let _ = &*DOTENV_INIT;
}

/// Consumidores padrão
pub const DEFAULT_CONSUMERS: usize = 5;

/// Tipos de recurso padrão
pub const DEFAULT_RESOURCES: usize = 4;

/// Rótulo sugerido para o savepoint automático de deadlock
pub const DEFAULT_DEADLOCK_LABEL: &str = "auto_deadlock";

/// Configuração do ledger
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerConfig {
    /// Número de consumidores (C)
    #[serde(default = "default_consumers")]
    pub consumers: usize,

    /// Número de tipos de recurso (R)
    #[serde(default = "default_resources")]
    pub resources: usize,

    /// Registrar a sequência segura de cada concessão
    #[serde(default)]
    pub show_safe_sequence: bool,

    /// Rótulo usado pelo chamador ao salvar o estado de um deadlock
    #[serde(default = "default_deadlock_label")]
    pub deadlock_savepoint_label: String,
}

fn default_consumers() -> usize {
    DEFAULT_CONSUMERS
}

fn default_resources() -> usize {
    DEFAULT_RESOURCES
}

fn default_deadlock_label() -> String {
    DEFAULT_DEADLOCK_LABEL.to_string()
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            consumers: DEFAULT_CONSUMERS,
            resources: DEFAULT_RESOURCES,
            show_safe_sequence: false,
            deadlock_savepoint_label: default_deadlock_label(),
        }
    }
}

impl LedgerConfig {
    /// Cria configuração padrão (5 × 4)
    pub fn new() -> Self {
        Self::default()
    }

    /// Define as dimensões
    pub fn with_dimensions(mut self, consumers: usize, resources: usize) -> Self {
        self.consumers = consumers;
        self.resources = resources;
        self
    }

    /// Liga/desliga a sequência segura
    pub fn with_safe_sequence(mut self, show: bool) -> Self {
        self.show_safe_sequence = show;
        self
    }

    /// Define o rótulo de deadlock
    pub fn with_deadlock_label(mut self, label: impl Into<String>) -> Self {
        self.deadlock_savepoint_label = label.into();
        self
    }

    /// Rejeita dimensões nulas e rótulo vazio
    pub fn validate(&self) -> LedgerResult<()> {
        if self.consumers == 0 {
            return Err(LedgerError::Config("consumers must be at least 1".into()));
        }
        if self.resources == 0 {
            return Err(LedgerError::Config("resources must be at least 1".into()));
        }
        if self.deadlock_savepoint_label.trim().is_empty() {
            return Err(LedgerError::Config("deadlock savepoint label is empty".into()));
        }
        Ok(())
    }

    /// Parse de TOML
    pub fn from_str(content: &str) -> LedgerResult<Self> {
        let config: Self = toml::from_str(content)
            .map_err(|e| LedgerError::Config(format!("Failed to parse config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Carrega de arquivo TOML
    pub fn from_file(path: &Path) -> LedgerResult<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| LedgerError::Config(format!("Failed to read {}: {}", path.display(), e)))?;
        Self::from_str(&content)
    }

    /// Serializa para TOML
    pub fn to_string(&self) -> LedgerResult<String> {
        toml::to_string_pretty(self)
            .map_err(|e| LedgerError::Config(format!("Failed to serialize config: {}", e)))
    }

    /// Padrões sobrescritos por `BANKER_CONSUMERS`, `BANKER_RESOURCES`,
    /// `BANKER_SHOW_SAFE_SEQUENCE` e `BANKER_DEADLOCK_LABEL`
    pub fn from_env() -> LedgerResult<Self> {
        ensure_loaded();
        Self::default().with_overrides(|key| env::var(key).ok())
    }

    fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> LedgerResult<Self> {
        if let Some(value) = lookup("BANKER_CONSUMERS") {
            self.consumers = parse_env("BANKER_CONSUMERS", &value)?;
        }
        if let Some(value) = lookup("BANKER_RESOURCES") {
            self.resources = parse_env("BANKER_RESOURCES", &value)?;
        }
        if let Some(value) = lookup("BANKER_SHOW_SAFE_SEQUENCE") {
            self.show_safe_sequence = parse_env("BANKER_SHOW_SAFE_SEQUENCE", &value)?;
        }
        if let Some(value) = lookup("BANKER_DEADLOCK_LABEL") {
            self.deadlock_savepoint_label = value;
        }
        self.validate()?;
        Ok(self)
    }
}

fn parse_env<T: std::str::FromStr>(key: &str, value: &str) -> LedgerResult<T> {
    value
        .trim()
        .parse()
        .map_err(|_| LedgerError::Config(format!("invalid value for {key}: '{value}'")))
}
