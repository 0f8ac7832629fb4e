/// Core data types for contract snapshots
///
/// These types match the JSON shape served by a live snapshot endpoint, so the
/// mock table and the HTTP provider produce identical values.
use std::str::FromStr;

use chrono::{NaiveTime, Timelike};
use serde::{Deserialize, Serialize};

/// SET50 index futures contracts supported by the dashboard
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
pub enum Contract {
    S50Z25,
    S50H26,
    S50M26,
}

impl Contract {
    /// All supported contracts in display order
    pub const ALL: [Contract; 3] = [Contract::S50Z25, Contract::S50H26, Contract::S50M26];

    pub fn as_str(&self) -> &'static str {
        match self {
            Contract::S50Z25 => "S50Z25",
            Contract::S50H26 => "S50H26",
            Contract::S50M26 => "S50M26",
        }
    }

    /// Next contract in display order, wrapping around
    pub fn next(&self) -> Contract {
        match self {
            Contract::S50Z25 => Contract::S50H26,
            Contract::S50H26 => Contract::S50M26,
            Contract::S50M26 => Contract::S50Z25,
        }
    }
}

impl std::fmt::Display for Contract {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Contract {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "S50Z25" => Ok(Contract::S50Z25),
            "S50H26" => Ok(Contract::S50H26),
            "S50M26" => Ok(Contract::S50M26),
            other => Err(other.to_string()),
        }
    }
}

/// Aggressor side of a trade tick
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq, Hash)]
pub enum Side {
    #[serde(rename = "Aggressive Buy")]
    AggressiveBuy,
    #[serde(rename = "Aggressive Sell")]
    AggressiveSell,
}

impl Side {
    /// Convert to display string
    pub fn as_str(&self) -> &'static str {
        match self {
            Side::AggressiveBuy => "Aggressive Buy",
            Side::AggressiveSell => "Aggressive Sell",
        }
    }

    /// Check if the buyer was the aggressor
    pub fn is_buy(&self) -> bool {
        matches!(self, Side::AggressiveBuy)
    }

    /// Check if the seller was the aggressor
    pub fn is_sell(&self) -> bool {
        matches!(self, Side::AggressiveSell)
    }
}

impl std::fmt::Display for Side {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Single trade tick
///
/// Timestamps are a time of day only; every trade in a snapshot belongs to the
/// same trading session.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Trade {
    /// Execution time (HH:MM)
    #[serde(with = "hhmm")]
    pub timestamp: NaiveTime,
    /// Execution price
    pub price: f64,
    /// Contracts traded
    pub volume: u64,
    /// Aggressor side
    #[serde(rename = "type", alias = "side")]
    pub side: Side,
}

impl Trade {
    pub fn new(timestamp: NaiveTime, price: f64, volume: u64, side: Side) -> Self {
        Self {
            timestamp,
            price,
            volume,
            side,
        }
    }

    /// Hour component of the trade timestamp
    pub fn hour(&self) -> u32 {
        self.timestamp.hour()
    }
}

/// Market snapshot for one contract
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ContractSnapshot {
    pub symbol: String,
    /// Last traded price
    pub price: f64,
    /// Change on the session, in percentage points
    #[serde(alias = "change")]
    pub percent_change: f64,
    /// Resting volume on the bid
    #[serde(alias = "bid")]
    pub bid_volume: u64,
    /// Resting volume on the offer
    #[serde(alias = "offer")]
    pub offer_volume: u64,
    /// Recent trades in insertion order (not guaranteed to be time sorted)
    #[serde(default)]
    pub trades: Vec<Trade>,
}

impl ContractSnapshot {
    /// Percent change, signed with `+` only when positive, e.g. "+0.45%"
    pub fn change_label(&self) -> String {
        if self.percent_change > 0.0 {
            format!("+{:.2}%", self.percent_change)
        } else {
            format!("{:.2}%", self.percent_change)
        }
    }
}

/// Serde adapter for "HH:MM" time-of-day strings
pub mod hhmm {
    use chrono::NaiveTime;
    use serde::{Deserialize, Deserializer, Serializer};

    const FORMAT: &str = "%H:%M";

    pub fn serialize<S>(time: &NaiveTime, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&time.format(FORMAT).to_string())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<NaiveTime, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        NaiveTime::parse_from_str(&raw, FORMAT).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_side_display() {
        assert_eq!(Side::AggressiveBuy.to_string(), "Aggressive Buy");
        assert_eq!(Side::AggressiveSell.to_string(), "Aggressive Sell");
    }

    #[test]
    fn test_side_checks() {
        assert!(Side::AggressiveBuy.is_buy());
        assert!(!Side::AggressiveBuy.is_sell());
        assert!(Side::AggressiveSell.is_sell());
        assert!(!Side::AggressiveSell.is_buy());
    }

    #[test]
    fn test_contract_parse_and_cycle() {
        assert_eq!("s50h26".parse::<Contract>(), Ok(Contract::S50H26));
        assert_eq!(" S50M26 ".parse::<Contract>(), Ok(Contract::S50M26));
        assert_eq!("S50U26".parse::<Contract>(), Err("S50U26".to_string()));

        assert_eq!(Contract::S50Z25.next(), Contract::S50H26);
        assert_eq!(Contract::S50M26.next(), Contract::S50Z25);
    }

    #[test]
    fn test_trade_deserializes_dashboard_shape() {
        let json = r#"{"timestamp": "15:45", "price": 814.0, "volume": 500, "type": "Aggressive Sell"}"#;
        let trade: Trade = serde_json::from_str(json).unwrap();

        assert_eq!(trade.hour(), 15);
        assert_eq!(trade.volume, 500);
        assert_eq!(trade.side, Side::AggressiveSell);

        let back = serde_json::to_value(&trade).unwrap();
        assert_eq!(back["timestamp"], "15:45");
        assert_eq!(back["type"], "Aggressive Sell");
    }

    #[test]
    fn test_trade_rejects_bad_timestamp() {
        let json = r#"{"timestamp": "25:99", "price": 814.0, "volume": 5, "type": "Aggressive Buy"}"#;
        assert!(serde_json::from_str::<Trade>(json).is_err());
    }

    #[test]
    fn test_snapshot_accepts_short_field_names() {
        let json = r#"{
            "symbol": "S50H26",
            "price": 842.1,
            "change": 0.45,
            "bid": 18000,
            "offer": 22000
        }"#;
        let snapshot: ContractSnapshot = serde_json::from_str(json).unwrap();

        assert_eq!(snapshot.bid_volume, 18_000);
        assert_eq!(snapshot.offer_volume, 22_000);
        assert!(snapshot.trades.is_empty());
        assert_eq!(snapshot.change_label(), "+0.45%");
    }

    #[test]
    fn test_change_label_negative() {
        let snapshot = ContractSnapshot {
            symbol: "S50Z25".to_string(),
            price: 814.0,
            percent_change: -1.32,
            bid_volume: 0,
            offer_volume: 0,
            trades: vec![],
        };
        assert_eq!(snapshot.change_label(), "-1.32%");
    }

    #[test]
    fn test_change_label_unchanged_has_no_sign() {
        let snapshot = ContractSnapshot {
            symbol: "S50M26".to_string(),
            price: 798.75,
            percent_change: 0.0,
            bid_volume: 0,
            offer_volume: 0,
            trades: vec![],
        };
        assert_eq!(snapshot.change_label(), "0.00%");
    }
}
