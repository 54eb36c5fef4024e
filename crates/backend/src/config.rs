use std::path::PathBuf;

use anyhow::{anyhow, Context};
use geoguess_shared::models::{GameRules, Variant};

/// Server settings, read once from the environment at startup.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub assets_dir: PathBuf,
    pub dist_dir: PathBuf,
    pub variant: Variant,
    pub rules: GameRules,
    pub maps_api_key: Option<String>,
    pub session_ttl: chrono::Duration,
}

const DEFAULT_SESSION_TTL_MINUTES: i64 = 120;

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let port = match lookup("PORT") {
            Some(p) => p.parse().with_context(|| format!("Invalid PORT: {p}"))?,
            None => 3000,
        };

        let variant = match lookup("GAME_VARIANT") {
            Some(v) => v.parse::<Variant>().map_err(|e| anyhow!(e))?,
            None => Variant::World,
        };

        let threshold = match lookup("WIN_THRESHOLD_KM") {
            Some(t) => t
                .parse::<f64>()
                .with_context(|| format!("Invalid WIN_THRESHOLD_KM: {t}"))?,
            None => variant.default_win_threshold_km(),
        };
        let rules = GameRules::new(variant.region(), threshold)?;

        let session_ttl = match lookup("SESSION_TTL_MINUTES") {
            Some(m) => m
                .parse::<i64>()
                .ok()
                .filter(|m| *m > 0)
                .and_then(chrono::Duration::try_minutes)
                .ok_or_else(|| anyhow!("Invalid SESSION_TTL_MINUTES: {m}"))?,
            None => chrono::Duration::minutes(DEFAULT_SESSION_TTL_MINUTES),
        };

        // An empty key is treated the same as a missing one
        let maps_api_key = lookup("GOOGLE_MAPS_API_KEY").filter(|k| !k.trim().is_empty());

        Ok(Config {
            port,
            assets_dir: PathBuf::from(lookup("ASSETS_DIR").unwrap_or_else(|| "assets".to_string())),
            dist_dir: PathBuf::from(lookup("DIST_DIR").unwrap_or_else(|| "dist".to_string())),
            variant,
            rules,
            maps_api_key,
            session_ttl,
        })
    }
}
