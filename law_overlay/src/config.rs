//! Overlay configuration: parsing, validation, and loading.
//!
//! The config is a small TOML document. Every field has a default, so an empty
//! file (or no file at all) yields the stock indicator settings:
//!
//! ```toml
//! unit_size = 48
//! levels = [0.0, 0.236, 0.382, 0.5, 0.618, 0.764, 1.0, 1.236, 1.382, -0.236, -0.382]
//! htf_levels = [0.0, 0.236, 0.382, 0.5, 0.618, 0.764, 1.0]
//! include_htf = false
//! signature_precision = 6
//! ```
//!
//! Resolution order used by the CLI: explicit `--config` path, then the path in
//! [`CONFIG_ENV_VAR`], then [`OverlayConfig::default`].

use std::path::{Path, PathBuf};

use anyhow::{Context, bail};
use serde::{Deserialize, Serialize};
use shared_utils::env::optional_env_path;
use toml::from_str;
use tracing::debug;

use crate::indicator::levels::{DEFAULT_LEVELS, HTF_LEVELS};

/// Environment variable naming an overlay config file.
pub const CONFIG_ENV_VAR: &str = "LAW_OVERLAY_CONFIG";

/// Upper bound for `signature_precision`; beyond this f64 rounding is noise.
pub const MAX_SIGNATURE_PRECISION: u32 = 12;

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct OverlayConfig {
    /// Bars per unit.
    pub unit_size: usize,
    /// Ratios drawn on the last unit.
    pub levels: Vec<f64>,
    /// Ratios drawn on the higher-timeframe unit when `include_htf` is set.
    pub htf_levels: Vec<f64>,
    pub include_htf: bool,
    /// Decimal digits kept when building merge signatures.
    pub signature_precision: u32,
}

impl Default for OverlayConfig {
    fn default() -> Self {
        Self {
            unit_size: 48,
            levels: DEFAULT_LEVELS.to_vec(),
            htf_levels: HTF_LEVELS.to_vec(),
            include_htf: false,
            signature_precision: 6,
        }
    }
}

impl OverlayConfig {
    /// Reject settings that would make the pipeline degenerate.
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.unit_size == 0 {
            bail!("unit_size must be greater than zero");
        }
        if self.levels.is_empty() {
            bail!("levels cannot be empty");
        }
        if self.include_htf && self.htf_levels.is_empty() {
            bail!("htf_levels cannot be empty when include_htf is set");
        }
        if let Some(r) = self
            .levels
            .iter()
            .chain(self.htf_levels.iter())
            .find(|r| !r.is_finite())
        {
            bail!("level ratios must be finite, got {r}");
        }
        if self.signature_precision > MAX_SIGNATURE_PRECISION {
            bail!(
                "signature_precision must be at most {MAX_SIGNATURE_PRECISION}, got {}",
                self.signature_precision
            );
        }
        Ok(())
    }
}

/// Parse and validate a config from a TOML string.
pub fn load_config_str(toml_str: &str) -> anyhow::Result<OverlayConfig> {
    let cfg: OverlayConfig = from_str(toml_str).context("failed to parse overlay config TOML")?;
    cfg.validate().context("invalid overlay config")?;
    Ok(cfg)
}

/// Read a config TOML file from disk, parse, and validate it.
pub fn load_config_path(path: impl AsRef<Path>) -> anyhow::Result<OverlayConfig> {
    let text = std::fs::read_to_string(path.as_ref())
        .with_context(|| format!("read config file {}", path.as_ref().display()))?;
    load_config_str(&text)
}

/// Resolve the effective config: explicit path, then [`CONFIG_ENV_VAR`], then defaults.
pub fn resolve_config(explicit: Option<&Path>) -> anyhow::Result<OverlayConfig> {
    let path: Option<PathBuf> = match explicit {
        Some(p) => Some(p.to_path_buf()),
        None => optional_env_path(CONFIG_ENV_VAR),
    };

    match path {
        Some(p) => {
            debug!(path = %p.display(), "loading overlay config");
            load_config_path(&p)
        }
        None => Ok(OverlayConfig::default()),
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn empty_document_yields_defaults() {
        let cfg = load_config_str("").unwrap();
        assert_eq!(cfg, OverlayConfig::default());
        assert_eq!(cfg.unit_size, 48);
        assert_eq!(cfg.levels.len(), 11);
        assert!(!cfg.include_htf);
    }

    #[test]
    fn partial_document_keeps_other_defaults() {
        let cfg = load_config_str("unit_size = 5\ninclude_htf = true").unwrap();
        assert_eq!(cfg.unit_size, 5);
        assert!(cfg.include_htf);
        assert_eq!(cfg.signature_precision, 6);
    }

    #[test]
    fn rejects_zero_unit_size() {
        let err = load_config_str("unit_size = 0").unwrap_err();
        assert!(format!("{err:#}").contains("unit_size"));
    }

    #[test]
    fn rejects_unknown_fields() {
        let err = load_config_str("unit = 5").unwrap_err();
        assert!(err.to_string().contains("failed to parse"));
    }

    #[test]
    fn rejects_excessive_precision() {
        let err = load_config_str("signature_precision = 20").unwrap_err();
        assert!(format!("{err:#}").contains("signature_precision"));
    }

    #[test]
    fn explicit_path_wins() {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        writeln!(f, "unit_size = 3").unwrap();
        let cfg = resolve_config(Some(f.path())).unwrap();
        assert_eq!(cfg.unit_size, 3);
    }

    #[test]
    fn missing_file_has_context() {
        let err = load_config_path("/no/such/overlay.toml").unwrap_err();
        assert!(err.to_string().contains("read config file"));
    }
}
