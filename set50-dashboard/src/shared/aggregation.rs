/// Trade flow analytics
///
/// Pure functions over a slice of trade ticks. Nothing here fails: empty or
/// degenerate input yields zeros or `None`.
use chrono::NaiveTime;

use crate::shared::types::{Side, Trade};

/// Bid/offer imbalance above which the book reads as one-sided
pub const IMBALANCE_SENTIMENT_THRESHOLD: i64 = 1_000;

const MARKER_SCALE: f64 = 40.0;
const MARKER_BASE: f64 = 8.0;

/// Aggressive buy/sell volume totals
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FlowSummary {
    pub buy_volume: u64,
    pub sell_volume: u64,
    /// buy_volume - sell_volume
    pub net_volume: i64,
}

impl FlowSummary {
    fn new(buy_volume: u64, sell_volume: u64) -> Self {
        Self {
            buy_volume,
            sell_volume,
            net_volume: signed_difference(buy_volume, sell_volume),
        }
    }

    pub fn total_volume(&self) -> u64 {
        self.buy_volume.saturating_add(self.sell_volume)
    }
}

/// `a - b` saturated to the i64 range
fn signed_difference(a: u64, b: u64) -> i64 {
    let difference = i128::from(a) - i128::from(b);
    i64::try_from(difference).unwrap_or(if difference > 0 { i64::MAX } else { i64::MIN })
}

/// Sum trade volume by aggressor side
pub fn aggregate_volumes(trades: &[Trade]) -> FlowSummary {
    aggregate_where(trades, |_| true)
}

fn aggregate_where(trades: &[Trade], include: impl Fn(&Trade) -> bool) -> FlowSummary {
    let (buy, sell) = trades
        .iter()
        .filter(|&trade| include(trade))
        .fold((0u64, 0u64), |(buy, sell), trade| match trade.side {
            Side::AggressiveBuy => (buy.saturating_add(trade.volume), sell),
            Side::AggressiveSell => (buy, sell.saturating_add(trade.volume)),
        });

    FlowSummary::new(buy, sell)
}

/// Volume-weighted average price over every trade regardless of side
///
/// `None` when there is no traded volume.
pub fn compute_vwap(trades: &[Trade]) -> Option<f64> {
    let (notional, volume) = trades.iter().fold((0.0, 0.0), |(notional, volume), trade| {
        let size = trade.volume as f64;
        (notional + trade.price * size, volume + size)
    });

    (volume > 0.0).then(|| notional / volume)
}

/// Intraday time bucket, keyed on the hour of the trade timestamp
#[derive(Clone, Debug, Copy, PartialEq, Eq, Hash)]
pub enum Period {
    Early, // before 10:00
    Mid,   // 10:00 - 15:00
    Late,  // 15:00 - 16:00
    After, // 16:00 onwards
}

impl Period {
    pub const ALL: [Period; 4] = [Period::Early, Period::Mid, Period::Late, Period::After];

    pub fn from_hour(hour: u32) -> Self {
        match hour {
            0..=9 => Period::Early,
            10..=14 => Period::Mid,
            15 => Period::Late,
            _ => Period::After,
        }
    }

    pub fn key(&self) -> &'static str {
        match self {
            Period::Early => "early",
            Period::Mid => "mid",
            Period::Late => "late",
            Period::After => "after",
        }
    }

    /// Display label; names the hour boundaries actually used for bucketing
    pub fn label(&self) -> &'static str {
        match self {
            Period::Early => "Before 10:00",
            Period::Mid => "10:00-15:00",
            Period::Late => "15:00-16:00",
            Period::After => "After 16:00",
        }
    }
}

/// Buy/sell/net volume per intraday bucket
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PeriodSummaries {
    pub early: FlowSummary,
    pub mid: FlowSummary,
    pub late: FlowSummary,
    pub after: FlowSummary,
}

impl PeriodSummaries {
    pub fn get(&self, period: Period) -> &FlowSummary {
        match period {
            Period::Early => &self.early,
            Period::Mid => &self.mid,
            Period::Late => &self.late,
            Period::After => &self.after,
        }
    }

    /// Buckets in chronological order
    pub fn iter(&self) -> impl Iterator<Item = (Period, &FlowSummary)> + '_ {
        Period::ALL.into_iter().map(move |p| (p, self.get(p)))
    }
}

/// Partition trades into intraday buckets and aggregate each one
pub fn summarize_periods(trades: &[Trade]) -> PeriodSummaries {
    let bucket = |period: Period| aggregate_where(trades, |t| Period::from_hour(t.hour()) == period);

    PeriodSummaries {
        early: bucket(Period::Early),
        mid: bucket(Period::Mid),
        late: bucket(Period::Late),
        after: bucket(Period::After),
    }
}

/// Order book pressure read from resting bid vs offer volume
#[derive(Clone, Debug, Copy, PartialEq, Eq)]
pub enum Sentiment {
    BearishPressure,
    Bullish,
    Neutral,
}

impl Sentiment {
    pub fn label(&self) -> &'static str {
        match self {
            Sentiment::BearishPressure => "Bearish Pressure",
            Sentiment::Bullish => "Bullish",
            Sentiment::Neutral => "Neutral",
        }
    }
}

/// Bid vs offer liquidity statistics
#[derive(Clone, Debug, Copy, PartialEq)]
pub struct LiquidityImbalance {
    pub bid_volume: u64,
    pub offer_volume: u64,
    /// offer - bid; positive means more size waiting to sell
    pub imbalance: i64,
    /// offer / (bid + 1)
    pub offer_bid_ratio: f64,
    pub sentiment: Sentiment,
}

pub fn liquidity_imbalance(bid_volume: u64, offer_volume: u64) -> LiquidityImbalance {
    let imbalance = signed_difference(offer_volume, bid_volume);
    let offer_bid_ratio = offer_volume as f64 / (bid_volume as f64 + 1.0);

    let sentiment = if imbalance > IMBALANCE_SENTIMENT_THRESHOLD {
        Sentiment::BearishPressure
    } else if imbalance < -IMBALANCE_SENTIMENT_THRESHOLD {
        Sentiment::Bullish
    } else {
        Sentiment::Neutral
    };

    LiquidityImbalance {
        bid_volume,
        offer_volume,
        imbalance,
        offer_bid_ratio,
        sentiment,
    }
}

/// One trade plotted on the flow timeline
#[derive(Clone, Debug, PartialEq)]
pub struct TimelinePoint {
    pub timestamp: NaiveTime,
    pub price: f64,
    pub volume: u64,
    /// Relative marker weight, scaled to the largest trade on the same side
    pub marker_size: f64,
}

/// Trades of one aggressor side, sorted by time
#[derive(Clone, Debug, PartialEq)]
pub struct TimelineSeries {
    pub side: Side,
    pub points: Vec<TimelinePoint>,
}

/// Group trades into per-side series for the flow timeline
///
/// Series appear in the order each side is first seen in `trades`.
pub fn trade_flow_timeline(trades: &[Trade]) -> Vec<TimelineSeries> {
    let mut sides: Vec<Side> = Vec::with_capacity(2);
    for trade in trades {
        if !sides.contains(&trade.side) {
            sides.push(trade.side);
        }
    }

    sides
        .into_iter()
        .map(|side| {
            let mut side_trades: Vec<&Trade> = trades.iter().filter(|t| t.side == side).collect();
            side_trades.sort_by_key(|t| t.timestamp);

            let max_volume = side_trades.iter().map(|t| t.volume).max().unwrap_or(0);
            let points = side_trades
                .into_iter()
                .map(|t| TimelinePoint {
                    timestamp: t.timestamp,
                    price: t.price,
                    volume: t.volume,
                    marker_size: if max_volume > 0 {
                        t.volume as f64 / max_volume as f64 * MARKER_SCALE + MARKER_BASE
                    } else {
                        MARKER_BASE
                    },
                })
                .collect();

            TimelineSeries { side, points }
        })
        .collect()
}
