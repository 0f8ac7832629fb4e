/// SET50 Futures Mini Trader Dashboard
///
/// Polls the configured snapshot provider on a fixed interval and renders
/// liquidity, trade flow, alerts, intraday buckets and Fibonacci levels.
use std::{
    error::Error,
    io,
    time::{Duration, Instant},
};

use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use set50_dashboard::{render_dashboard, Contract, Dashboard, DashboardConfig, SnapshotProvider};
use tracing::info;

/// Input poll granularity; keeps key handling responsive between refreshes
const POLL_INTERVAL: Duration = Duration::from_millis(250);

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    init_logging();

    let config = DashboardConfig::from_env()?;
    let provider = config.provider();
    info!(
        contract = %config.contract,
        source = provider.name(),
        "Starting SET50 dashboard"
    );
    let mut dashboard = Dashboard::new(config);

    // Setup panic hook to restore terminal on crash
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen, DisableMouseCapture);
        original_hook(panic_info);
    }));

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run(&mut terminal, &mut dashboard, provider.as_ref()).await;

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;
    result
}

async fn run(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    dashboard: &mut Dashboard,
    provider: &dyn SnapshotProvider,
) -> Result<(), Box<dyn Error>> {
    dashboard.refresh(provider).await;
    let mut last_refresh = Instant::now();

    loop {
        terminal.draw(|f| render_dashboard(f, dashboard, provider.name()))?;

        let config = dashboard.config();
        let refresh_due = config.auto_refresh && last_refresh.elapsed() >= config.refresh_interval;
        if refresh_due {
            dashboard.refresh(provider).await;
            last_refresh = Instant::now();
            continue;
        }

        if !event::poll(POLL_INTERVAL)? {
            continue;
        }

        if let Event::Key(key) = event::read()? {
            let mut refresh_now = false;
            match key.code {
                KeyCode::Char('q') | KeyCode::Esc => break,
                KeyCode::Char('r') => refresh_now = true,
                KeyCode::Char('a') => {
                    dashboard.toggle_auto_refresh();
                }
                KeyCode::Tab => {
                    dashboard.next_contract();
                    refresh_now = true;
                }
                KeyCode::Char(c @ '1'..='3') => {
                    let index = c as usize - '1' as usize;
                    dashboard.select_contract(Contract::ALL[index]);
                    refresh_now = true;
                }
                _ => {}
            }

            if refresh_now {
                dashboard.refresh(provider).await;
                last_refresh = Instant::now();
            }
        }
    }

    Ok(())
}

/// Initialize logging
///
/// Stdout belongs to the terminal UI, so logs go to stderr and stay off unless
/// RUST_LOG is set (e.g. `RUST_LOG=info set50-dashboard 2> dashboard.log`).
fn init_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("off")),
        )
        .with_writer(io::stderr)
        .init();
}
