/// Dashboard refresh cycle and view model
///
/// Each refresh asks the provider for a snapshot, runs every analytic over it
/// and produces a fresh [`DashboardView`]. Rendering only ever reads a view.
use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

use crate::shared::aggregation::{
    aggregate_volumes, compute_vwap, liquidity_imbalance, summarize_periods, trade_flow_timeline,
    FlowSummary, LiquidityImbalance, PeriodSummaries, TimelineSeries,
};
use crate::shared::alerts::{Alert, AlertThresholds};
use crate::shared::config::DashboardConfig;
use crate::shared::levels::{compute_levels, nearest_level, RetracementLevel};
use crate::shared::provider::SnapshotProvider;
use crate::shared::types::{Contract, ContractSnapshot};

/// Headline index shown above the contract panels
#[derive(Clone, Debug, Copy, PartialEq)]
pub struct IndexQuote {
    pub name: &'static str,
    pub value: f64,
    pub change_pct: f64,
}

/// Static index figures; no index feed is wired in
pub const MARKET_INDICES: [IndexQuote; 2] = [
    IndexQuote {
        name: "SET Index",
        value: 1276.39,
        change_pct: -0.91,
    },
    IndexQuote {
        name: "SET50 Index",
        value: 825.31,
        change_pct: -1.08,
    },
];

/// Everything the front-end needs to draw one refresh
#[derive(Clone, Debug, PartialEq)]
pub struct DashboardView {
    pub indices: [IndexQuote; 2],
    pub snapshot: ContractSnapshot,
    pub liquidity: LiquidityImbalance,
    pub vwap: Option<f64>,
    pub flow: FlowSummary,
    pub alert: Alert,
    pub periods: PeriodSummaries,
    pub levels: Vec<RetracementLevel>,
    /// Retracement label closest to the contract price
    pub nearest_level: Option<&'static str>,
    pub timeline: Vec<TimelineSeries>,
}

/// Compute the full view for one snapshot
pub fn build_view(snapshot: ContractSnapshot, thresholds: &AlertThresholds) -> DashboardView {
    let flow = aggregate_volumes(&snapshot.trades);
    let alert = Alert::evaluate(snapshot.price, &flow, thresholds);
    let levels = compute_levels(thresholds.swing_high, thresholds.swing_low);
    let nearest = nearest_level(&levels, snapshot.price).map(|l| l.label);

    DashboardView {
        indices: MARKET_INDICES,
        liquidity: liquidity_imbalance(snapshot.bid_volume, snapshot.offer_volume),
        vwap: compute_vwap(&snapshot.trades),
        flow,
        alert,
        periods: summarize_periods(&snapshot.trades),
        nearest_level: nearest,
        levels,
        timeline: trade_flow_timeline(&snapshot.trades),
        snapshot,
    }
}

/// Outcome of the most recent refresh
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FeedStatus {
    /// No refresh attempted yet
    Idle,
    Live,
    /// Last refresh failed; the previous view (if any) is still shown
    Unavailable(String),
}

/// Dashboard state carried between refresh cycles
#[derive(Debug)]
pub struct Dashboard {
    config: DashboardConfig,
    view: Option<DashboardView>,
    status: FeedStatus,
    last_refresh: Option<DateTime<Utc>>,
}

impl Dashboard {
    pub fn new(config: DashboardConfig) -> Self {
        Self {
            config,
            view: None,
            status: FeedStatus::Idle,
            last_refresh: None,
        }
    }

    pub fn config(&self) -> &DashboardConfig {
        &self.config
    }

    /// Latest successfully built view
    pub fn view(&self) -> Option<&DashboardView> {
        self.view.as_ref()
    }

    pub fn status(&self) -> &FeedStatus {
        &self.status
    }

    /// Time of the last successful refresh
    pub fn last_refresh(&self) -> Option<DateTime<Utc>> {
        self.last_refresh
    }

    /// Run one refresh cycle against `provider`
    ///
    /// Provider failures never escape: they are recorded in [`FeedStatus`] and
    /// the previous view is kept.
    pub async fn refresh(&mut self, provider: &dyn SnapshotProvider) -> &FeedStatus {
        let symbol = self.config.contract.as_str();
        debug!("Refreshing {} from {}", symbol, provider.name());

        match provider.snapshot(symbol).await {
            Ok(snapshot) => {
                self.view = Some(build_view(snapshot, &self.config.thresholds));
                self.status = FeedStatus::Live;
                self.last_refresh = Some(Utc::now());
            }
            Err(e) => {
                warn!("Snapshot refresh for {} failed: {}", symbol, e);
                self.status = FeedStatus::Unavailable(e.status_text());
            }
        }

        &self.status
    }

    /// Switch contract; the old contract's view is dropped
    pub fn select_contract(&mut self, contract: Contract) {
        if contract == self.config.contract {
            return;
        }
        info!("Switching contract {} -> {}", self.config.contract, contract);
        self.config.contract = contract;
        self.view = None;
        self.status = FeedStatus::Idle;
    }

    pub fn next_contract(&mut self) {
        self.select_contract(self.config.contract.next());
    }

    /// Flip auto refresh and return the new setting
    pub fn toggle_auto_refresh(&mut self) -> bool {
        self.config.auto_refresh = !self.config.auto_refresh;
        info!("Auto refresh {}", if self.config.auto_refresh { "on" } else { "off" });
        self.config.auto_refresh
    }
}
