/// SET50 Futures Mini Trader Dashboard - Shared Library
///
/// Analytics and data plumbing behind the `set50-dashboard` terminal UI:
/// - Snapshot providers (static mock table or a live HTTP source)
/// - Trade flow analytics: buy/sell volume, net flow, VWAP, intraday buckets
/// - Threshold alerts and Fibonacci retracement levels
/// - A refresh-cycle adapter producing a render-ready view
pub mod shared;

// Re-export commonly used types for convenience
pub use shared::types::{Contract, ContractSnapshot, Side, Trade};

pub use shared::aggregation::{
    aggregate_volumes, compute_vwap, liquidity_imbalance, summarize_periods,
    trade_flow_timeline, FlowSummary, LiquidityImbalance, Period, PeriodSummaries, Sentiment,
};
pub use shared::alerts::{evaluate_alert, Alert, AlertState, AlertThresholds, Severity};
pub use shared::levels::{compute_levels, RetracementLevel};

pub use shared::config::{DashboardConfig, DataSource};
pub use shared::error::{ConfigError, ProviderError};
pub use shared::provider::{HttpSnapshotProvider, MockProvider, SnapshotProvider};

pub use shared::dashboard::{build_view, Dashboard, DashboardView, FeedStatus};
pub use shared::widget::render_dashboard;
