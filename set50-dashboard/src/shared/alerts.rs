//! Threshold alerts over price and aggressive trade flow
//!
//! Rules are checked in priority order and the first match wins. Evaluation is
//! stateless; nothing from a previous refresh is carried over.

use crate::shared::aggregation::FlowSummary;

/// Sell volume below which selling is considered to be drying up
pub const EARLY_WEAKNESS_MAX_SELL_VOLUME: u64 = 400;
/// Fraction of the swing range price must clear for the early weakness note
pub const EARLY_WEAKNESS_RETRACE: f64 = 0.2;
/// Fraction of the swing range price must clear for a bullish signal
pub const BULLISH_RETRACE: f64 = 0.25;

/// User-supplied alert configuration
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AlertThresholds {
    /// Price below which heavy selling triggers a panic alert
    pub price_threshold: f64,
    /// Sell volume must exceed buy volume by this multiple for a panic alert
    pub sell_to_buy_ratio: f64,
    /// Net flow below this value triggers a warning
    pub net_flow_threshold: i64,
    pub swing_high: f64,
    pub swing_low: f64,
}

impl Default for AlertThresholds {
    fn default() -> Self {
        Self {
            price_threshold: 820.0,
            sell_to_buy_ratio: 2.0,
            net_flow_threshold: -10_000,
            swing_high: 830.0,
            swing_low: 800.0,
        }
    }
}

impl AlertThresholds {
    /// Price sitting `fraction` of the way up from swing low to swing high
    pub fn retrace_from_low(&self, fraction: f64) -> f64 {
        self.swing_low + (self.swing_high - self.swing_low) * fraction
    }
}

#[derive(Clone, Debug, Copy, PartialEq, Eq)]
pub enum AlertState {
    PanicAlert,
    NetFlowWarning,
    EarlyWeaknessInfo,
    BullishSignal,
    Stable,
}

impl AlertState {
    pub fn label(&self) -> &'static str {
        match self {
            AlertState::PanicAlert => "PANIC",
            AlertState::NetFlowWarning => "NET FLOW",
            AlertState::EarlyWeaknessInfo => "SELLING EASES",
            AlertState::BullishSignal => "REVERSAL",
            AlertState::Stable => "STABLE",
        }
    }

    pub fn severity(&self) -> Severity {
        match self {
            AlertState::PanicAlert => Severity::Error,
            AlertState::NetFlowWarning => Severity::Warning,
            AlertState::EarlyWeaknessInfo => Severity::Info,
            AlertState::BullishSignal | AlertState::Stable => Severity::Success,
        }
    }
}

/// Banner styling class for an alert
#[derive(Clone, Debug, Copy, PartialEq, Eq)]
pub enum Severity {
    Error,
    Warning,
    Info,
    Success,
}

/// Pick the single alert state for the current price and flow
pub fn evaluate_alert(
    price: f64,
    buy_volume: u64,
    sell_volume: u64,
    net_flow: i64,
    thresholds: &AlertThresholds,
) -> AlertState {
    let heavy_selling = sell_volume as f64 > buy_volume as f64 * thresholds.sell_to_buy_ratio;

    if price < thresholds.price_threshold && heavy_selling {
        AlertState::PanicAlert
    } else if net_flow < thresholds.net_flow_threshold {
        AlertState::NetFlowWarning
    } else if sell_volume < EARLY_WEAKNESS_MAX_SELL_VOLUME
        && price > thresholds.retrace_from_low(EARLY_WEAKNESS_RETRACE)
    {
        AlertState::EarlyWeaknessInfo
    } else if net_flow > 0 && price > thresholds.retrace_from_low(BULLISH_RETRACE) {
        AlertState::BullishSignal
    } else {
        AlertState::Stable
    }
}

/// Evaluated alert with its rendered banner text
#[derive(Clone, Debug, PartialEq)]
pub struct Alert {
    pub state: AlertState,
    pub severity: Severity,
    pub message: String,
}

impl Alert {
    pub fn evaluate(price: f64, flow: &FlowSummary, thresholds: &AlertThresholds) -> Self {
        let state = evaluate_alert(
            price,
            flow.buy_volume,
            flow.sell_volume,
            flow.net_volume,
            thresholds,
        );

        let message = match state {
            AlertState::PanicAlert => format!(
                "PANIC ALERT: Price < {:.1} with heavy sell flow (> {:.1}x buy volume)",
                thresholds.price_threshold, thresholds.sell_to_buy_ratio
            ),
            AlertState::NetFlowWarning => format!(
                "Net flow below threshold ({}) | Net: {}",
                thresholds.net_flow_threshold, flow.net_volume
            ),
            AlertState::EarlyWeaknessInfo => {
                "Selling pressure is easing and price is rebounding".to_string()
            }
            AlertState::BullishSignal => {
                "Reversal signal: net flow positive and price rebounding".to_string()
            }
            AlertState::Stable => "Market Stable".to_string(),
        };

        Self {
            state,
            severity: state.severity(),
            message,
        }
    }
}
