//! Configuration
//!
//! Effective settings are layered: built-in defaults, then a TOML file,
//! then environment variables, then command-line flags.
//!
//! ```toml
//! income_tax = 18        # percent
//! levy = "legacy"        # or "current"
//! military_tax = 1.5     # percent, overrides the preset
//!
//! [nbu]
//! base_url = "https://bank.gov.ua"
//! timeout_secs = 10
//! latest_ttl_secs = 3600
//! ```

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::error::ConfigError;
use crate::rates::nbu::DEFAULT_BASE_URL;
use crate::tax::{LevyPreset, TaxRates, DEFAULT_INCOME_TAX_RATE};

pub const CONFIG_ENV: &str = "NBU_PNL_CONFIG";
pub const API_URL_ENV: &str = "NBU_PNL_API_URL";

/// Upper bound for `latest_ttl_secs`: one week
pub const MAX_LATEST_TTL_SECS: i64 = 7 * 24 * 60 * 60;

/// On-disk shape; every field optional so partial files work
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct FileConfig {
    income_tax: Option<Decimal>,
    military_tax: Option<Decimal>,
    levy: Option<LevyPreset>,
    #[serde(default)]
    nbu: FileNbuConfig,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct FileNbuConfig {
    base_url: Option<String>,
    timeout_secs: Option<u64>,
    latest_ttl_secs: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NbuConfig {
    pub base_url: String,
    pub timeout_secs: u64,
    pub latest_ttl_secs: i64,
}

impl Default for NbuConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_secs: 10,
            latest_ttl_secs: 3600,
        }
    }
}

/// Effective configuration
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub levy: LevyPreset,
    /// Fractions, not percent
    pub tax: TaxRates,
    pub nbu: NbuConfig,
    /// File the settings were read from, if any
    pub source: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            levy: LevyPreset::default(),
            tax: TaxRates::default(),
            nbu: NbuConfig::default(),
            source: None,
        }
    }
}

/// Tax overrides given on the command line, as fractions
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TaxOverrides {
    pub income: Option<Decimal>,
    pub military: Option<Decimal>,
    pub levy: Option<LevyPreset>,
}

impl Config {
    /// Load from an explicit path, `$NBU_PNL_CONFIG`, or the default location
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        let path = match explicit {
            Some(p) => Some(p.to_path_buf()),
            None => match std::env::var_os(CONFIG_ENV) {
                Some(p) => Some(PathBuf::from(p)),
                None => default_config_path().filter(|p| p.exists()),
            },
        };

        let mut config = match path {
            Some(p) => Self::from_file(&p)?,
            None => {
                debug!("No config file found, using defaults");
                Self::default()
            }
        };

        if let Ok(url) = std::env::var(API_URL_ENV) {
            if !url.trim().is_empty() {
                debug!("NBU base URL overridden by {}", API_URL_ENV);
                config.nbu.base_url = url;
            }
        }

        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        info!("Loading config from {}", path.display());
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let mut config = Self::from_toml(&content).map_err(|e| match e {
            ConfigError::Parse { message, .. } => ConfigError::Parse {
                path: path.display().to_string(),
                message,
            },
            other => other,
        })?;
        config.source = Some(path.to_path_buf());
        Ok(config)
    }

    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let file: FileConfig = toml::from_str(content).map_err(|e| ConfigError::Parse {
            path: "<inline>".to_string(),
            message: e.to_string(),
        })?;

        let levy = file.levy.unwrap_or_default();
        let income = match file.income_tax {
            Some(pct) => percent_to_fraction("income_tax", pct)?,
            None => DEFAULT_INCOME_TAX_RATE,
        };
        let military = match file.military_tax {
            Some(pct) => percent_to_fraction("military_tax", pct)?,
            None => levy.rate(),
        };

        let defaults = NbuConfig::default();
        let nbu = NbuConfig {
            base_url: file.nbu.base_url.unwrap_or(defaults.base_url),
            timeout_secs: file.nbu.timeout_secs.unwrap_or(defaults.timeout_secs),
            latest_ttl_secs: match file.nbu.latest_ttl_secs {
                Some(secs) => validate_ttl(secs)?,
                None => defaults.latest_ttl_secs,
            },
        };

        Ok(Self {
            levy,
            tax: TaxRates::new(income, military),
            nbu,
            source: None,
        })
    }

    /// Tax rates after command-line overrides.
    ///
    /// An explicit military rate wins over a preset; a preset on the command
    /// line wins over the file's military rate.
    pub fn tax_rates(&self, overrides: TaxOverrides) -> TaxRates {
        let income = overrides.income.unwrap_or(self.tax.income);
        let military = match (overrides.military, overrides.levy) {
            (Some(rate), _) => rate,
            (None, Some(preset)) => preset.rate(),
            (None, None) => self.tax.military,
        };
        TaxRates::new(income, military)
    }
}

fn percent_to_fraction(field: &str, pct: Decimal) -> Result<Decimal, ConfigError> {
    if pct.is_sign_negative() || pct > Decimal::ONE_HUNDRED {
        return Err(ConfigError::InvalidRate(format!(
            "{} must be between 0 and 100 percent (got {})",
            field, pct
        )));
    }
    Ok(pct / Decimal::ONE_HUNDRED)
}

fn validate_ttl(secs: i64) -> Result<i64, ConfigError> {
    if !(0..=MAX_LATEST_TTL_SECS).contains(&secs) {
        return Err(ConfigError::InvalidSetting {
            field: "nbu.latest_ttl_secs".to_string(),
            message: format!("must be between 0 and {} (got {})", MAX_LATEST_TTL_SECS, secs),
        });
    }
    Ok(secs)
}

/// `<config_home>/nbu-pnl/config.toml`
pub fn default_config_path() -> Option<PathBuf> {
    std::env::var_os("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .or_else(dir_spec::config_home)
        .map(|dir| dir.join("nbu-pnl").join("config.toml"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.tax.income, dec!(0.18));
        assert_eq!(config.tax.military, dec!(0.05));
        assert_eq!(config.nbu.base_url, "https://bank.gov.ua");
        assert_eq!(config.nbu.timeout_secs, 10);
    }

    #[test]
    fn test_empty_file_equals_defaults() {
        let config = Config::from_toml("").unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_levy_preset_from_file() {
        let config = Config::from_toml("levy = \"legacy\"").unwrap();
        assert_eq!(config.levy, LevyPreset::Legacy);
        assert_eq!(config.tax.military, dec!(0.015));
    }

    #[test]
    fn test_explicit_rates_from_file() {
        let toml = r#"
income_tax = 19.5
military_tax = 2

[nbu]
base_url = "http://mirror.local"
timeout_secs = 3
"#;
        let config = Config::from_toml(toml).unwrap();
        assert_eq!(config.tax.income, dec!(0.195));
        assert_eq!(config.tax.military, dec!(0.02));
        assert_eq!(config.nbu.base_url, "http://mirror.local");
        assert_eq!(config.nbu.timeout_secs, 3);
        assert_eq!(config.nbu.latest_ttl_secs, 3600);
    }

    #[test]
    fn test_invalid_files_rejected() {
        assert!(matches!(
            Config::from_toml("income_tax = 120"),
            Err(ConfigError::InvalidRate(_))
        ));
        assert!(matches!(
            Config::from_toml("levy = \"wartime\""),
            Err(ConfigError::Parse { .. })
        ));
        assert!(matches!(
            Config::from_toml("unknown_key = 1"),
            Err(ConfigError::Parse { .. })
        ));
    }

    #[test]
    fn test_latest_ttl_bounds() {
        let config = Config::from_toml("[nbu]\nlatest_ttl_secs = 0").unwrap();
        assert_eq!(config.nbu.latest_ttl_secs, 0);

        let config = Config::from_toml("[nbu]\nlatest_ttl_secs = 604800").unwrap();
        assert_eq!(config.nbu.latest_ttl_secs, MAX_LATEST_TTL_SECS);

        for bad in ["-1", "604801", "9223372036854775807"] {
            let toml = format!("[nbu]\nlatest_ttl_secs = {}", bad);
            assert!(matches!(
                Config::from_toml(&toml),
                Err(ConfigError::InvalidSetting { .. })
            ));
        }
    }

    #[test]
    fn test_from_file_records_source() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "income_tax = 18\nlevy = \"current\"").unwrap();

        let config = Config::from_file(file.path()).unwrap();
        assert_eq!(config.source.as_deref(), Some(file.path()));
        assert_eq!(config.tax.military, dec!(0.05));
    }

    #[test]
    fn test_missing_explicit_file_is_io_error() {
        let err = Config::from_file(Path::new("/nonexistent/nbu-pnl.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }

    #[test]
    fn test_override_precedence() {
        let config = Config::from_toml("military_tax = 2").unwrap();

        let untouched = config.tax_rates(TaxOverrides::default());
        assert_eq!(untouched.military, dec!(0.02));

        let preset = config.tax_rates(TaxOverrides {
            levy: Some(LevyPreset::Legacy),
            ..Default::default()
        });
        assert_eq!(preset.military, dec!(0.015));

        let explicit = config.tax_rates(TaxOverrides {
            income: Some(dec!(0.2)),
            military: Some(dec!(0.01)),
            levy: Some(LevyPreset::Current),
        });
        assert_eq!(explicit, TaxRates::new(dec!(0.2), dec!(0.01)));
    }
}
