use crate::core::history::Period;
use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf, time::Duration};
use tracing::debug;

/// Approximate long-term USD→NPR rate used when nothing better is known.
pub const DEFAULT_NPR_RATE: f64 = 140.0;
pub const DEFAULT_RATE_TIMEOUT_SECS: f64 = 5.0;
pub const DEFAULT_HISTORY_TIMEOUT_SECS: f64 = 20.0;
pub const DEFAULT_MOVING_AVERAGE_WINDOW: usize = 7;

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct RateEndpointConfig {
    pub url: String,
    /// JSON pointer to the rate, e.g. `/rates/NPR`.
    pub pointer: String,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(default)]
pub struct RatesConfig {
    pub timeout_secs: f64,
    pub default_rate: f64,
    pub endpoints: Vec<RateEndpointConfig>,
}

/// Positive, finite seconds as a `Duration`; anything else gives `default`.
fn timeout_or(secs: f64, default: f64) -> Duration {
    if secs > 0.0 {
        Duration::try_from_secs_f64(secs).unwrap_or_else(|_| Duration::from_secs_f64(default))
    } else {
        Duration::from_secs_f64(default)
    }
}

impl RatesConfig {
    pub fn timeout(&self) -> Duration {
        timeout_or(self.timeout_secs, DEFAULT_RATE_TIMEOUT_SECS)
    }
}

impl Default for RatesConfig {
    fn default() -> Self {
        RatesConfig {
            timeout_secs: DEFAULT_RATE_TIMEOUT_SECS,
            default_rate: DEFAULT_NPR_RATE,
            endpoints: vec![
                RateEndpointConfig {
                    url: "https://api.exchangerate.host/convert?from=USD&to=NPR".to_string(),
                    pointer: "/info/rate".to_string(),
                },
                RateEndpointConfig {
                    url: "https://api.exchangerate.host/latest?base=USD&symbols=NPR".to_string(),
                    pointer: "/rates/NPR".to_string(),
                },
                RateEndpointConfig {
                    url: "https://open.er-api.com/v6/latest/USD".to_string(),
                    pointer: "/rates/NPR".to_string(),
                },
            ],
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(default)]
pub struct YahooProviderConfig {
    pub base_url: String,
    /// Limit for one history request, including the body.
    pub timeout_secs: f64,
}

impl YahooProviderConfig {
    pub fn timeout(&self) -> Duration {
        timeout_or(self.timeout_secs, DEFAULT_HISTORY_TIMEOUT_SECS)
    }
}

impl Default for YahooProviderConfig {
    fn default() -> Self {
        YahooProviderConfig {
            base_url: "https://query1.finance.yahoo.com".to_string(),
            timeout_secs: DEFAULT_HISTORY_TIMEOUT_SECS,
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
#[serde(default)]
pub struct ProvidersConfig {
    pub yahoo: YahooProviderConfig,
    pub rates: RatesConfig,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(default)]
pub struct ChartConfig {
    pub moving_average_window: usize,
    /// Attach per-point hover labels to rendered figures.
    pub hover: bool,
}

impl Default for ChartConfig {
    fn default() -> Self {
        ChartConfig {
            moving_average_window: DEFAULT_MOVING_AVERAGE_WINDOW,
            hover: true,
        }
    }
}

/// SMTP settings for price alerts. The password is read from the
/// environment variable named by `password_env`.
#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(default)]
pub struct AlertConfig {
    pub smtp_host: String,
    /// Submission port; the connection is upgraded with STARTTLS.
    pub smtp_port: u16,
    pub username: Option<String>,
    pub password_env: String,
    pub from: Option<String>,
}

impl Default for AlertConfig {
    fn default() -> Self {
        AlertConfig {
            smtp_host: "smtp.gmail.com".to_string(),
            smtp_port: 587,
            username: None,
            password_env: "NPRTRACK_SMTP_PASSWORD".to_string(),
            from: None,
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(default)]
pub struct AppConfig {
    pub symbols_file: PathBuf,
    pub snapshot_path: PathBuf,
    pub rate_cache_path: PathBuf,
    pub period: Period,
    pub providers: ProvidersConfig,
    pub chart: ChartConfig,
    pub alert: AlertConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            symbols_file: PathBuf::from("Stock_Symbols.txt"),
            snapshot_path: PathBuf::from("stock_data.csv"),
            rate_cache_path: PathBuf::from("last_npr_rate.txt"),
            period: Period::default(),
            providers: ProvidersConfig::default(),
            chart: ChartConfig::default(),
            alert: AlertConfig::default(),
        }
    }
}

impl AppConfig {
    /// Loads the default config file, or built-in defaults when it does not
    /// exist yet.
    pub fn load() -> Result<Self> {
        debug!("Loading default config");
        let config_path = Self::default_config_path()?;
        if !config_path.exists() {
            debug!(
                "No config at {}; using built-in defaults",
                config_path.display()
            );
            return Ok(Self::default());
        }
        Self::load_from_path(&config_path)
    }

    pub fn default_config_path() -> Result<PathBuf> {
        let proj_dirs = ProjectDirs::from("np", "nprtrack", "nprtrack")
            .context("Could not determine project directories")?;
        Ok(proj_dirs.config_dir().join("config.yaml"))
    }

    pub fn load_from_path<P: AsRef<std::path::Path>>(path: P) -> Result<Self> {
        let config_str = fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;

        // An empty document deserializes to `null`, which serde rejects.
        if config_str.trim().is_empty() {
            return Ok(Self::default());
        }

        let config: Self = serde_yaml::from_str(&config_str)
            .with_context(|| format!("Failed to parse config file: {}", path.as_ref().display()))?;
        debug!("Successfully loaded config");
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_builtin_constants() {
        let config = AppConfig::default();
        assert_eq!(config.period, Period::OneMonth);
        assert_eq!(config.symbols_file, PathBuf::from("Stock_Symbols.txt"));
        assert_eq!(config.snapshot_path, PathBuf::from("stock_data.csv"));
        assert_eq!(config.rate_cache_path, PathBuf::from("last_npr_rate.txt"));
        assert_eq!(config.providers.rates.default_rate, 140.0);
        assert_eq!(config.providers.rates.timeout(), Duration::from_secs(5));
        assert_eq!(config.providers.rates.endpoints.len(), 3);
        assert_eq!(config.providers.rates.endpoints[0].pointer, "/info/rate");
        assert_eq!(config.chart.moving_average_window, 7);
        assert_eq!(config.providers.yahoo.timeout(), Duration::from_secs(20));
    }

    #[test]
    fn test_config_deserialization() {
        let yaml_str = r#"
period: 3mo
snapshot_path: /tmp/snap.csv
providers:
  yahoo:
    base_url: "http://example.com/yahoo"
  rates:
    timeout_secs: 2.5
    endpoints:
      - url: "http://example.com/fx"
        pointer: "/data/NPR"
chart:
  moving_average_window: 20
alert:
  username: "alerts@example.com"
"#;

        let config: AppConfig = serde_yaml::from_str(yaml_str).expect("Failed to deserialize");
        assert_eq!(config.period, Period::ThreeMonths);
        assert_eq!(config.snapshot_path, PathBuf::from("/tmp/snap.csv"));
        assert_eq!(config.rate_cache_path, PathBuf::from("last_npr_rate.txt"));
        assert_eq!(config.providers.yahoo.base_url, "http://example.com/yahoo");
        assert_eq!(config.providers.rates.timeout(), Duration::from_millis(2500));
        assert_eq!(config.providers.rates.default_rate, 140.0);
        assert_eq!(
            config.providers.rates.endpoints,
            vec![RateEndpointConfig {
                url: "http://example.com/fx".to_string(),
                pointer: "/data/NPR".to_string(),
            }]
        );
        assert_eq!(config.chart.moving_average_window, 20);
        assert!(config.chart.hover);
        assert_eq!(config.alert.username.as_deref(), Some("alerts@example.com"));
        assert_eq!(config.alert.smtp_host, "smtp.gmail.com");
        assert_eq!(config.alert.smtp_port, 587);
    }

    #[test]
    fn test_invalid_period_is_rejected() {
        let result: Result<AppConfig, _> = serde_yaml::from_str("period: fortnight");
        assert!(result.is_err());
    }

    #[test]
    fn test_non_positive_timeout_falls_back_to_default() {
        for secs in [-1.0, 0.0, f64::NAN] {
            let rates = RatesConfig {
                timeout_secs: secs,
                ..RatesConfig::default()
            };
            assert_eq!(rates.timeout(), Duration::from_secs(5), "timeout_secs: {secs}");
        }

        let rates: RatesConfig = serde_yaml::from_str("timeout_secs: 0").unwrap();
        assert_eq!(rates.timeout(), Duration::from_secs(5));

        let yahoo = YahooProviderConfig {
            timeout_secs: 0.0,
            ..YahooProviderConfig::default()
        };
        assert_eq!(yahoo.timeout(), Duration::from_secs(20));
    }

    #[test]
    fn test_empty_yahoo_section_uses_defaults() {
        let config: AppConfig =
            serde_yaml::from_str("providers:\n  yahoo: {}\n").expect("Failed to deserialize");
        assert_eq!(config.providers.yahoo.base_url, "https://query1.finance.yahoo.com");
        assert_eq!(config.providers.yahoo.timeout(), Duration::from_secs(20));

        let config: AppConfig =
            serde_yaml::from_str("providers:\n  yahoo:\n    timeout_secs: 3\n").unwrap();
        assert_eq!(config.providers.yahoo.timeout(), Duration::from_secs(3));
    }

    #[test]
    fn test_load_from_empty_file_uses_defaults() {
        let file = tempfile::NamedTempFile::new().unwrap();
        let config = AppConfig::load_from_path(file.path()).unwrap();
        assert_eq!(config.providers.rates.endpoints.len(), 3);
    }

    #[test]
    fn test_load_from_missing_explicit_path_fails() {
        let dir = tempfile::TempDir::new().unwrap();
        let result = AppConfig::load_from_path(dir.path().join("nope.yaml"));
        assert!(result.is_err());
    }
}
