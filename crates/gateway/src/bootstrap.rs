//! AppState construction extracted from `main.rs`.

use std::sync::Arc;

use anyhow::Context;
use sha2::{Digest, Sha256};

use nb_domain::config::{Config, ConfigSeverity, StorageBackend};
use nb_notices::{
    JsonSettings, JsonlLog, MemoryLog, MemorySettings, NoticeLog, PhraseBook, PhraseMap,
    SettingsStore,
};

use crate::state::AppState;

/// Validate config, open the storage backends and return a fully-wired
/// [`AppState`].
pub fn build_app_state(config: Arc<Config>) -> anyhow::Result<AppState> {
    // ── Config validation ────────────────────────────────────────────
    let issues = config.validate();
    for issue in &issues {
        match issue.severity {
            ConfigSeverity::Warning => tracing::warn!("config: {issue}"),
            ConfigSeverity::Error => tracing::error!("config: {issue}"),
        }
    }
    if issues.iter().any(|i| i.severity == ConfigSeverity::Error) {
        anyhow::bail!(
            "config validation failed with {} error(s)",
            issues
                .iter()
                .filter(|i| i.severity == ConfigSeverity::Error)
                .count()
        );
    }

    // ── Storage ──────────────────────────────────────────────────────
    let (log, settings): (Arc<dyn NoticeLog>, Arc<dyn SettingsStore>) = match config.storage.backend
    {
        StorageBackend::Memory => {
            tracing::warn!("memory storage backend: notices and settings are lost on restart");
            let log: Arc<dyn NoticeLog> = Arc::new(MemoryLog::new());
            let settings: Arc<dyn SettingsStore> = Arc::new(MemorySettings::new());
            (log, settings)
        }
        StorageBackend::File => {
            let path = &config.storage.state_path;
            let log = JsonlLog::open(path)
                .with_context(|| format!("opening notice log under {}", path.display()))?;
            let settings = JsonSettings::open(path)
                .with_context(|| format!("opening settings under {}", path.display()))?;
            let log: Arc<dyn NoticeLog> = Arc::new(log);
            let settings: Arc<dyn SettingsStore> = Arc::new(settings);
            (log, settings)
        }
    };

    // ── Phrases ──────────────────────────────────────────────────────
    let phrases: Arc<dyn PhraseBook> = Arc::new(
        config
            .notices
            .phrases
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect::<PhraseMap>(),
    );
    tracing::info!(
        phrases = config.notices.phrases.len(),
        extra_types = config.notices.additional_types.len(),
        "notice store configured"
    );

    // ── Admin token (read once, hash for constant-time comparison) ──
    // Priority: config.admin.token > env var (config.admin.token_env)
    let admin_token_hash = {
        let env_var = &config.admin.token_env;
        let token = config
            .admin
            .token
            .as_deref()
            .filter(|t| !t.is_empty())
            .map(|t| ("config".to_string(), t.to_string()))
            .or_else(|| {
                std::env::var(env_var)
                    .ok()
                    .filter(|t| !t.is_empty())
                    .map(|t| (format!("env:{env_var}"), t))
            });
        match token {
            Some((source, t)) => {
                tracing::info!(source = %source, "admin bearer-token auth enabled");
                Some(Sha256::digest(t.as_bytes()).to_vec())
            }
            None => {
                tracing::warn!(
                    "admin bearer-token auth DISABLED: set admin.token in config.toml or {env_var} env var"
                );
                None
            }
        }
    };

    Ok(AppState {
        config,
        log,
        settings,
        phrases,
        admin_token_hash,
    })
}
