//! Ratatui panels for the dashboard - overview, liquidity, flow, alerts, periods, levels

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

use super::aggregation::Sentiment;
use super::alerts::Severity;
use super::dashboard::{Dashboard, DashboardView, FeedStatus, MARKET_INDICES};
use super::types::Side;

const C_BUY: Color = Color::Rgb(100, 220, 100);
const C_SELL: Color = Color::Rgb(220, 100, 100);
const C_NEUTRAL: Color = Color::Rgb(180, 180, 100);
const C_DIM: Color = Color::Rgb(120, 120, 120);
const C_BRIGHT: Color = Color::Rgb(220, 220, 220);
const C_ACCENT: Color = Color::Rgb(100, 180, 220);

/// Render the whole dashboard into the frame
pub fn render_dashboard(f: &mut Frame, dashboard: &Dashboard, provider_name: &str) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(4),
            Constraint::Min(10),
            Constraint::Length(4),
            Constraint::Length(5),
            Constraint::Length(9),
            Constraint::Length(1),
        ])
        .split(f.area());

    render_overview(f, rows[0], dashboard, provider_name);

    let Some(view) = dashboard.view() else {
        render_placeholder(f, rows[1], dashboard.status());
        render_help(f, rows[5]);
        return;
    };

    let middle = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(35), Constraint::Percentage(65)])
        .split(rows[1]);

    render_liquidity(f, middle[0], view);
    render_trade_flow(f, middle[1], view);
    render_alert(f, rows[2], view);
    render_periods(f, rows[3], view);
    render_levels(f, rows[4], view);
    render_help(f, rows[5]);
}

fn render_overview(f: &mut Frame, area: Rect, dashboard: &Dashboard, provider_name: &str) {
    let (status_text, status_color) = match dashboard.status() {
        FeedStatus::Idle => ("CONNECTING".to_string(), C_DIM),
        FeedStatus::Live => ("LIVE".to_string(), C_BUY),
        FeedStatus::Unavailable(reason) => (format!("DATA UNAVAILABLE: {reason}"), C_SELL),
    };

    let block = Block::default()
        .title(" SET50 FUTURES - MINI TRADER DASHBOARD ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(status_color));

    let mut headline = Vec::new();
    let indices = dashboard.view().map(|v| v.indices).unwrap_or(MARKET_INDICES);
    for index in &indices {
        headline.push(Span::styled(format!("{} ", index.name), Style::default().fg(C_DIM)));
        headline.push(Span::styled(
            format!("{:.2}", index.value),
            Style::default().fg(C_BRIGHT).add_modifier(Modifier::BOLD),
        ));
        headline.push(Span::styled(
            format!(" {:+.2}%   ", index.change_pct),
            Style::default().fg(change_color(index.change_pct)),
        ));
    }

    let contract = dashboard.config().contract;
    headline.push(Span::styled(format!("{contract} (Futures) "), Style::default().fg(C_DIM)));
    match dashboard.view() {
        Some(view) => {
            headline.push(Span::styled(
                format!("{:.2}", view.snapshot.price),
                Style::default().fg(C_BRIGHT).add_modifier(Modifier::BOLD),
            ));
            headline.push(Span::styled(
                format!(" {}", view.snapshot.change_label()),
                Style::default().fg(change_color(view.snapshot.percent_change)),
            ));
        }
        None => headline.push(Span::styled("--", Style::default().fg(C_DIM))),
    }

    let refreshed = dashboard
        .last_refresh()
        .map(|t| t.format("%H:%M:%S UTC").to_string())
        .unwrap_or_else(|| "--".to_string());
    let auto = if dashboard.config().auto_refresh {
        format!("auto {}s", dashboard.config().refresh_interval.as_secs_f64())
    } else {
        "auto off".to_string()
    };

    let lines = vec![
        Line::from(headline),
        Line::from(vec![
            Span::styled(status_text, Style::default().fg(status_color)),
            Span::styled(
                format!("  |  {provider_name}  |  {auto}  |  last refresh {refreshed}"),
                Style::default().fg(C_DIM),
            ),
        ]),
    ];

    f.render_widget(Paragraph::new(lines).block(block), area);
}

fn render_placeholder(f: &mut Frame, area: Rect, status: &FeedStatus) {
    let text = match status {
        FeedStatus::Unavailable(reason) => format!("Data unavailable: {reason}"),
        _ => "Fetching data...".to_string(),
    };
    let block = Block::default().borders(Borders::ALL);
    f.render_widget(
        Paragraph::new(Line::from(Span::styled(text, Style::default().fg(C_DIM)))).block(block),
        area,
    );
}

fn render_liquidity(f: &mut Frame, area: Rect, view: &DashboardView) {
    let liquidity = &view.liquidity;
    let block = Block::default()
        .title(format!(
            " LIQUIDITY & IMBALANCE (Ratio: {:.2}) ",
            liquidity.offer_bid_ratio
        ))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(C_ACCENT));

    let inner_width = area.width.saturating_sub(2) as usize;
    let bar_width = inner_width.saturating_sub(16).max(5);
    let max = liquidity.bid_volume.max(liquidity.offer_volume);

    let sentiment_color = match liquidity.sentiment {
        Sentiment::BearishPressure => C_SELL,
        Sentiment::Bullish => C_BUY,
        Sentiment::Neutral => C_NEUTRAL,
    };

    let vwap = view
        .vwap
        .map(|v| format!("{v:.2}"))
        .unwrap_or_else(|| "N/A".to_string());

    let lines = vec![
        Line::from(vec![
            Span::styled("Bid   ", Style::default().fg(C_DIM)),
            Span::styled(volume_bar(liquidity.bid_volume, max, bar_width), Style::default().fg(C_BUY)),
            Span::styled(format!(" {}", liquidity.bid_volume), Style::default().fg(C_BRIGHT)),
        ]),
        Line::from(vec![
            Span::styled("Offer ", Style::default().fg(C_DIM)),
            Span::styled(volume_bar(liquidity.offer_volume, max, bar_width), Style::default().fg(C_SELL)),
            Span::styled(format!(" {}", liquidity.offer_volume), Style::default().fg(C_BRIGHT)),
        ]),
        Line::from(""),
        Line::from(vec![
            Span::styled("Sentiment: ", Style::default().fg(C_DIM)),
            Span::styled(
                liquidity.sentiment.label(),
                Style::default().fg(sentiment_color).add_modifier(Modifier::BOLD),
            ),
        ]),
        Line::from(vec![
            Span::styled("Imbalance: ", Style::default().fg(C_DIM)),
            Span::styled(format!("{:+}", liquidity.imbalance), Style::default().fg(sentiment_color)),
        ]),
        Line::from(vec![
            Span::styled("VWAP (recent trades): ", Style::default().fg(C_DIM)),
            Span::styled(vwap, Style::default().fg(C_ACCENT).add_modifier(Modifier::BOLD)),
        ]),
    ];

    f.render_widget(Paragraph::new(lines).block(block), area);
}

fn render_trade_flow(f: &mut Frame, area: Rect, view: &DashboardView) {
    let block = Block::default()
        .title(" TRADE FLOW TIMELINE ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(C_ACCENT));

    if view.timeline.is_empty() {
        f.render_widget(
            Paragraph::new(Line::from(Span::styled(
                "No trades in sample data",
                Style::default().fg(C_DIM),
            )))
            .block(block),
            area,
        );
        return;
    }

    let mut lines = Vec::new();
    for series in &view.timeline {
        let color = side_color(series.side);
        lines.push(Line::from(Span::styled(
            series.side.as_str(),
            Style::default().fg(color).add_modifier(Modifier::BOLD),
        )));
        for point in &series.points {
            // marker sizes run 8..=48; draw one block per 4 units
            let marker = "●".repeat((point.marker_size / 4.0).round() as usize);
            lines.push(Line::from(vec![
                Span::styled(
                    format!("  {}  ", point.timestamp.format("%H:%M")),
                    Style::default().fg(C_DIM),
                ),
                Span::styled(format!("{:>8.2}", point.price), Style::default().fg(C_BRIGHT)),
                Span::styled(format!(" x{:<6} ", point.volume), Style::default().fg(C_DIM)),
                Span::styled(marker, Style::default().fg(color)),
            ]));
        }
    }

    f.render_widget(Paragraph::new(lines).block(block).wrap(Wrap { trim: false }), area);
}

fn render_alert(f: &mut Frame, area: Rect, view: &DashboardView) {
    let color = match view.alert.severity {
        Severity::Error => C_SELL,
        Severity::Warning => C_NEUTRAL,
        Severity::Info => C_ACCENT,
        Severity::Success => C_BUY,
    };

    let block = Block::default()
        .title(format!(" ALERTS & TRADE SIGNALS [{}] ", view.alert.state.label()))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(color));

    let flow = &view.flow;
    let lines = vec![
        Line::from(Span::styled(
            view.alert.message.as_str(),
            Style::default().fg(color).add_modifier(Modifier::BOLD),
        )),
        Line::from(vec![
            Span::styled("Buy Volume: ", Style::default().fg(C_DIM)),
            Span::styled(flow.buy_volume.to_string(), Style::default().fg(C_BUY)),
            Span::styled(" | Sell Volume: ", Style::default().fg(C_DIM)),
            Span::styled(flow.sell_volume.to_string(), Style::default().fg(C_SELL)),
            Span::styled(" | Net Flow: ", Style::default().fg(C_DIM)),
            Span::styled(
                format!("{:+}", flow.net_volume),
                Style::default().fg(change_color(flow.net_volume as f64)),
            ),
        ]),
    ];

    f.render_widget(Paragraph::new(lines).block(block), area);
}

fn render_periods(f: &mut Frame, area: Rect, view: &DashboardView) {
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Ratio(1, 4); 4])
        .split(area);

    for ((period, summary), column) in view.periods.iter().zip(columns.iter()) {
        let block = Block::default()
            .title(format!(" {} ", period.label()))
            .borders(Borders::ALL)
            .border_style(Style::default().fg(C_DIM));

        let lines = vec![
            Line::from(Span::styled(
                format!("Net {:+}", summary.net_volume),
                Style::default()
                    .fg(change_color(summary.net_volume as f64))
                    .add_modifier(Modifier::BOLD),
            )),
            Line::from(Span::styled(
                format!("Buy:{} / Sell:{}", summary.buy_volume, summary.sell_volume),
                Style::default().fg(C_DIM),
            )),
        ];

        f.render_widget(Paragraph::new(lines).block(block), *column);
    }
}

fn render_levels(f: &mut Frame, area: Rect, view: &DashboardView) {
    let block = Block::default()
        .title(format!(" FIBONACCI LEVELS (current {:.2}) ", view.snapshot.price))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(C_ACCENT));

    let lines: Vec<Line> = view
        .levels
        .iter()
        .map(|level| {
            let nearest = view.nearest_level == Some(level.label);
            let style = if nearest {
                Style::default().fg(C_NEUTRAL).add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(C_BRIGHT)
            };
            Line::from(vec![
                Span::styled(format!("{:>7}  ", level.label), Style::default().fg(C_DIM)),
                Span::styled(format!("{:.2}", level.price), style),
                Span::styled(if nearest { "  ◀ current" } else { "" }, style),
            ])
        })
        .collect();

    f.render_widget(Paragraph::new(lines).block(block), area);
}

fn render_help(f: &mut Frame, area: Rect) {
    let help = Line::from(Span::styled(
        " q quit | tab/1-3 contract | r refresh | a auto refresh ",
        Style::default().fg(C_DIM),
    ));
    f.render_widget(Paragraph::new(help), area);
}

fn side_color(side: Side) -> Color {
    match side {
        Side::AggressiveBuy => C_BUY,
        Side::AggressiveSell => C_SELL,
    }
}

fn change_color(value: f64) -> Color {
    if value > 0.0 {
        C_BUY
    } else if value < 0.0 {
        C_SELL
    } else {
        C_DIM
    }
}

/// Horizontal bar of `width` cells filled in proportion to value / max
fn volume_bar(value: u64, max: u64, width: usize) -> String {
    let filled = if max == 0 {
        0
    } else {
        (((value as f64 / max as f64) * width as f64).round() as usize).min(width)
    };
    format!("{}{}", "█".repeat(filled), "░".repeat(width - filled))
}
