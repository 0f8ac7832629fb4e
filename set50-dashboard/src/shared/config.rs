/// Dashboard configuration
///
/// Defaults match the dashboard sidebar controls. Every field can be
/// overridden through an environment variable.
use std::str::FromStr;
use std::time::Duration;

use tracing::{info, warn};
use url::Url;

use crate::shared::alerts::AlertThresholds;
use crate::shared::error::ConfigError;
use crate::shared::provider::{HttpSnapshotProvider, MockProvider, SnapshotProvider};
use crate::shared::types::Contract;

/// Allowed range for the sell/buy volume ratio
pub const SELL_BUY_RATIO_RANGE: (f64, f64) = (1.0, 5.0);

/// Where snapshots come from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataSource {
    Mock,
    Live,
}

impl FromStr for DataSource {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "mock" | "local" => Ok(DataSource::Mock),
            "live" | "http" => Ok(DataSource::Live),
            other => Err(ConfigError::UnknownDataSource(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DashboardConfig {
    /// Selected contract
    pub contract: Contract,
    /// Snapshot source
    pub data_source: DataSource,
    /// Base URL for the live snapshot API
    pub snapshot_api_url: Option<Url>,
    /// Alert and Fibonacci inputs
    pub thresholds: AlertThresholds,
    /// Refresh on a timer
    pub auto_refresh: bool,
    /// Timer period when auto refresh is on
    pub refresh_interval: Duration,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            contract: Contract::S50Z25,
            data_source: DataSource::Mock,
            snapshot_api_url: None,
            thresholds: AlertThresholds::default(),
            auto_refresh: true,
            refresh_interval: Duration::from_millis(5_000),
        }
    }
}

impl DashboardConfig {
    /// Load configuration from process environment variables
    ///
    /// CONTRACT, DATA_SOURCE, SNAPSHOT_API_URL, ALERT_PRICE, SELL_BUY_RATIO,
    /// NET_FLOW_THRESHOLD, SWING_HIGH, SWING_LOW, AUTO_REFRESH,
    /// REFRESH_INTERVAL_MS
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration from an arbitrary key/value source
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(value) = lookup("CONTRACT") {
            config.contract = value
                .parse::<Contract>()
                .map_err(|value| ConfigError::UnknownContract {
                    key: "CONTRACT",
                    value,
                })?;
        }

        if let Some(value) = lookup("DATA_SOURCE") {
            config.data_source = value.parse::<DataSource>()?;
        }

        if let Some(value) = lookup("SNAPSHOT_API_URL") {
            let url = Url::parse(&value).map_err(|e| ConfigError::InvalidUrl {
                url: value.clone(),
                reason: e.to_string(),
            })?;
            config.snapshot_api_url = Some(url);
        }

        let thresholds = &mut config.thresholds;
        if let Some(price) = parse_finite(&lookup, "ALERT_PRICE")? {
            thresholds.price_threshold = price;
        }
        if let Some(ratio) = parse_var(&lookup, "SELL_BUY_RATIO")? {
            thresholds.sell_to_buy_ratio = clamp_ratio(ratio);
        }
        if let Some(net) = parse_var(&lookup, "NET_FLOW_THRESHOLD")? {
            thresholds.net_flow_threshold = net;
        }
        if let Some(high) = parse_finite(&lookup, "SWING_HIGH")? {
            thresholds.swing_high = high;
        }
        if let Some(low) = parse_finite(&lookup, "SWING_LOW")? {
            thresholds.swing_low = low;
        }

        if let Some(value) = lookup("AUTO_REFRESH") {
            config.auto_refresh = parse_bool(&value).ok_or(ConfigError::InvalidValue {
                key: "AUTO_REFRESH",
                value,
            })?;
        }

        if let Some(millis) = parse_var::<u64, _>(&lookup, "REFRESH_INTERVAL_MS")? {
            if millis == 0 {
                return Err(ConfigError::InvalidValue {
                    key: "REFRESH_INTERVAL_MS",
                    value: millis.to_string(),
                });
            }
            config.refresh_interval = Duration::from_millis(millis);
        }

        Ok(config)
    }

    /// Set selected contract
    pub fn with_contract(mut self, contract: Contract) -> Self {
        self.contract = contract;
        self
    }

    /// Set data source
    pub fn with_data_source(mut self, data_source: DataSource) -> Self {
        self.data_source = data_source;
        self
    }

    /// Set alert thresholds; the sell/buy ratio is clamped to its allowed range
    pub fn with_thresholds(mut self, mut thresholds: AlertThresholds) -> Self {
        thresholds.sell_to_buy_ratio = clamp_ratio(thresholds.sell_to_buy_ratio);
        self.thresholds = thresholds;
        self
    }

    /// Set auto refresh
    pub fn with_auto_refresh(mut self, enabled: bool) -> Self {
        self.auto_refresh = enabled;
        self
    }

    /// Build the snapshot provider for the configured data source
    ///
    /// A live source without SNAPSHOT_API_URL falls back to the mock table.
    pub fn provider(&self) -> Box<dyn SnapshotProvider> {
        match (self.data_source, &self.snapshot_api_url) {
            (DataSource::Live, Some(url)) => {
                info!("Using live snapshot provider at {}", url);
                Box::new(HttpSnapshotProvider::new(url.clone()))
            }
            (DataSource::Live, None) => {
                warn!("DATA_SOURCE=live but SNAPSHOT_API_URL is not set, using mock data");
                Box::new(MockProvider::new())
            }
            (DataSource::Mock, _) => Box::new(MockProvider::new()),
        }
    }
}

fn parse_var<T, F>(lookup: &F, key: &'static str) -> Result<Option<T>, ConfigError>
where
    T: FromStr,
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        None => Ok(None),
        Some(value) => value
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::InvalidValue { key, value }),
    }
}

/// Like [`parse_var`] for thresholds, which must be finite
fn parse_finite<F>(lookup: &F, key: &'static str) -> Result<Option<f64>, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    match parse_var::<f64, F>(lookup, key)? {
        Some(value) if !value.is_finite() => Err(ConfigError::InvalidValue {
            key,
            value: value.to_string(),
        }),
        parsed => Ok(parsed),
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

fn clamp_ratio(ratio: f64) -> f64 {
    let (min, max) = SELL_BUY_RATIO_RANGE;
    if !ratio.is_finite() {
        warn!("Sell/buy ratio {} is not finite, using {}", ratio, min);
        return min;
    }
    let clamped = ratio.clamp(min, max);
    if clamped != ratio {
        warn!("Sell/buy ratio {} out of range, clamped to {}", ratio, clamped);
    }
    clamped
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(vars: &[(&str, &str)]) -> Result<DashboardConfig, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        DashboardConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_default_config() {
        let config = DashboardConfig::default();
        assert_eq!(config.contract, Contract::S50Z25);
        assert_eq!(config.data_source, DataSource::Mock);
        assert_eq!(config.thresholds.price_threshold, 820.0);
        assert_eq!(config.thresholds.sell_to_buy_ratio, 2.0);
        assert_eq!(config.thresholds.net_flow_threshold, -10_000);
        assert_eq!(config.thresholds.swing_high, 830.0);
        assert_eq!(config.thresholds.swing_low, 800.0);
        assert!(config.auto_refresh);
        assert_eq!(config.refresh_interval, Duration::from_secs(5));
    }

    #[test]
    fn test_empty_environment_gives_defaults() {
        assert_eq!(config_from(&[]).unwrap(), DashboardConfig::default());
    }

    #[test]
    fn test_overrides() {
        let config = config_from(&[
            ("CONTRACT", "s50m26"),
            ("DATA_SOURCE", "live"),
            ("SNAPSHOT_API_URL", "http://localhost:8080/api"),
            ("ALERT_PRICE", "805.5"),
            ("SELL_BUY_RATIO", "3.5"),
            ("NET_FLOW_THRESHOLD", "-500"),
            ("SWING_HIGH", "810"),
            ("SWING_LOW", "790"),
            ("AUTO_REFRESH", "off"),
            ("REFRESH_INTERVAL_MS", "2500"),
        ])
        .unwrap();

        assert_eq!(config.contract, Contract::S50M26);
        assert_eq!(config.data_source, DataSource::Live);
        assert_eq!(
            config.snapshot_api_url.as_ref().map(Url::as_str),
            Some("http://localhost:8080/api")
        );
        assert_eq!(config.thresholds.price_threshold, 805.5);
        assert_eq!(config.thresholds.sell_to_buy_ratio, 3.5);
        assert_eq!(config.thresholds.net_flow_threshold, -500);
        assert_eq!(config.thresholds.swing_high, 810.0);
        assert_eq!(config.thresholds.swing_low, 790.0);
        assert!(!config.auto_refresh);
        assert_eq!(config.refresh_interval, Duration::from_millis(2_500));
    }

    #[test]
    fn test_ratio_is_clamped() {
        let high = config_from(&[("SELL_BUY_RATIO", "9")]).unwrap();
        assert_eq!(high.thresholds.sell_to_buy_ratio, 5.0);

        let low = config_from(&[("SELL_BUY_RATIO", "0.5")]).unwrap();
        assert_eq!(low.thresholds.sell_to_buy_ratio, 1.0);

        let builder = DashboardConfig::default().with_thresholds(AlertThresholds {
            sell_to_buy_ratio: 7.0,
            ..AlertThresholds::default()
        });
        assert_eq!(builder.thresholds.sell_to_buy_ratio, 5.0);
    }

    #[test]
    fn test_invalid_values() {
        assert_eq!(
            config_from(&[("ALERT_PRICE", "cheap")]),
            Err(ConfigError::InvalidValue {
                key: "ALERT_PRICE",
                value: "cheap".to_string()
            })
        );
        assert_eq!(
            config_from(&[("NET_FLOW_THRESHOLD", "-1.5")]),
            Err(ConfigError::InvalidValue {
                key: "NET_FLOW_THRESHOLD",
                value: "-1.5".to_string()
            })
        );
        assert_eq!(
            config_from(&[("CONTRACT", "S50U26")]),
            Err(ConfigError::UnknownContract {
                key: "CONTRACT",
                value: "S50U26".to_string()
            })
        );
        assert_eq!(
            config_from(&[("DATA_SOURCE", "setsmart")]),
            Err(ConfigError::UnknownDataSource("setsmart".to_string()))
        );
        assert!(matches!(
            config_from(&[("SNAPSHOT_API_URL", "not a url")]),
            Err(ConfigError::InvalidUrl { .. })
        ));
        assert!(config_from(&[("AUTO_REFRESH", "maybe")]).is_err());
        assert!(config_from(&[("REFRESH_INTERVAL_MS", "0")]).is_err());
    }

    #[test]
    fn test_non_finite_thresholds_rejected() {
        assert_eq!(
            config_from(&[("ALERT_PRICE", "NaN")]),
            Err(ConfigError::InvalidValue {
                key: "ALERT_PRICE",
                value: "NaN".to_string()
            })
        );
        assert_eq!(
            config_from(&[("SWING_HIGH", "inf")]),
            Err(ConfigError::InvalidValue {
                key: "SWING_HIGH",
                value: "inf".to_string()
            })
        );
        assert!(config_from(&[("SWING_LOW", "-infinity")]).is_err());
    }

    #[test]
    fn test_provider_selection() {
        let mock = DashboardConfig::default();
        assert_eq!(mock.provider().name(), "Mock (local)");

        let live_without_url = DashboardConfig::default().with_data_source(DataSource::Live);
        assert_eq!(live_without_url.provider().name(), "Mock (local)");

        let live = DashboardConfig {
            data_source: DataSource::Live,
            snapshot_api_url: Url::parse("http://localhost:8080").ok(),
            ..DashboardConfig::default()
        };
        assert_eq!(live.provider().name(), "Live (HTTP)");
    }
}
