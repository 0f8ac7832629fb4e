/// Snapshot providers
///
/// The dashboard only ever talks to a [`SnapshotProvider`]; the static mock
/// table and the HTTP source are interchangeable behind it.
use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveTime;
use reqwest::StatusCode;
use tracing::{debug, warn};
use url::Url;

use crate::shared::error::ProviderError;
use crate::shared::types::{Contract, ContractSnapshot, Side, Trade};

#[async_trait]
pub trait SnapshotProvider: Send + Sync {
    /// Short name shown in the status line
    fn name(&self) -> &'static str;

    /// Fetch the latest snapshot for `symbol`
    async fn snapshot(&self, symbol: &str) -> Result<ContractSnapshot, ProviderError>;
}

struct MockQuote {
    contract: Contract,
    price: f64,
    change: f64,
    bid: u64,
    offer: u64,
    trades: &'static [MockTrade],
}

// (hour, minute, price, volume, side)
type MockTrade = (u32, u32, f64, u64, Side);

const MOCK_QUOTES: [MockQuote; 3] = [
    MockQuote {
        contract: Contract::S50Z25,
        price: 814.0,
        change: -1.32,
        bid: 20_000,
        offer: 50_000,
        trades: &[
            (9, 45, 814.2, 300, Side::AggressiveSell),
            (11, 15, 814.6, 200, Side::AggressiveBuy),
            (15, 45, 814.0, 500, Side::AggressiveSell),
            (16, 5, 814.8, 400, Side::AggressiveBuy),
        ],
    },
    MockQuote {
        contract: Contract::S50H26,
        price: 842.1,
        change: 0.45,
        bid: 18_000,
        offer: 22_000,
        trades: &[
            (9, 30, 841.8, 150, Side::AggressiveBuy),
            (13, 20, 842.2, 250, Side::AggressiveBuy),
            (15, 50, 842.0, 100, Side::AggressiveSell),
            (16, 10, 842.5, 300, Side::AggressiveBuy),
        ],
    },
    MockQuote {
        contract: Contract::S50M26,
        price: 798.75,
        change: -0.62,
        bid: 15_000,
        offer: 30_000,
        trades: &[
            (9, 50, 799.0, 400, Side::AggressiveSell),
            (14, 10, 798.5, 300, Side::AggressiveSell),
            (15, 40, 798.8, 200, Side::AggressiveBuy),
            (16, 20, 799.2, 250, Side::AggressiveBuy),
        ],
    },
];

/// Static snapshot table for local development and tests
#[derive(Debug, Clone, Default)]
pub struct MockProvider;

impl MockProvider {
    pub fn new() -> Self {
        Self
    }

    fn lookup(contract: Contract) -> Result<ContractSnapshot, ProviderError> {
        let quote = MOCK_QUOTES
            .iter()
            .find(|q| q.contract == contract)
            .ok_or_else(|| ProviderError::UnknownSymbol(contract.to_string()))?;

        let trades = quote
            .trades
            .iter()
            .map(|&(hour, minute, price, volume, side)| {
                NaiveTime::from_hms_opt(hour, minute, 0)
                    .map(|timestamp| Trade::new(timestamp, price, volume, side))
                    .ok_or_else(|| {
                        ProviderError::DataUnavailable(format!(
                            "invalid mock trade time {hour:02}:{minute:02}"
                        ))
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(ContractSnapshot {
            symbol: contract.to_string(),
            price: quote.price,
            percent_change: quote.change,
            bid_volume: quote.bid,
            offer_volume: quote.offer,
            trades,
        })
    }
}

#[async_trait]
impl SnapshotProvider for MockProvider {
    fn name(&self) -> &'static str {
        "Mock (local)"
    }

    async fn snapshot(&self, symbol: &str) -> Result<ContractSnapshot, ProviderError> {
        let contract: Contract = symbol
            .parse()
            .map_err(|_| ProviderError::UnknownSymbol(symbol.to_string()))?;
        Self::lookup(contract)
    }
}

/// HTTP snapshot source serving `GET {base_url}/snapshot/{symbol}` as JSON
#[derive(Debug, Clone)]
pub struct HttpSnapshotProvider {
    client: reqwest::Client,
    base_url: Url,
    timeout: Duration,
}

impl HttpSnapshotProvider {
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

    pub fn new(mut base_url: Url) -> Self {
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        Self {
            client: reqwest::Client::new(),
            base_url,
            timeout: Self::DEFAULT_TIMEOUT,
        }
    }

    /// Set request timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn snapshot_url(&self, symbol: &str) -> Result<Url, ProviderError> {
        self.base_url
            .join(&format!("snapshot/{symbol}"))
            .map_err(|e| ProviderError::DataUnavailable(format!("bad snapshot url: {e}")))
    }
}

#[async_trait]
impl SnapshotProvider for HttpSnapshotProvider {
    fn name(&self) -> &'static str {
        "Live (HTTP)"
    }

    async fn snapshot(&self, symbol: &str) -> Result<ContractSnapshot, ProviderError> {
        let contract: Contract = symbol
            .parse()
            .map_err(|_| ProviderError::UnknownSymbol(symbol.to_string()))?;
        let url = self.snapshot_url(contract.as_str())?;
        debug!("Fetching snapshot from {}", url);

        let response = self
            .client
            .get(url.clone())
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| {
                warn!("Snapshot request to {} failed: {}", url, e);
                if e.is_timeout() {
                    ProviderError::DataUnavailable("request timed out".to_string())
                } else {
                    ProviderError::DataUnavailable(format!("HTTP request failed: {e}"))
                }
            })?;

        match response.status() {
            StatusCode::NOT_FOUND => {
                return Err(ProviderError::UnknownSymbol(contract.to_string()));
            }
            status if !status.is_success() => {
                return Err(ProviderError::DataUnavailable(format!("HTTP error: {status}")));
            }
            _ => {}
        }

        let snapshot: ContractSnapshot = response
            .json()
            .await
            .map_err(|e| ProviderError::DataUnavailable(format!("JSON parse failed: {e}")))?;

        if snapshot.symbol != contract.as_str() {
            return Err(ProviderError::DataUnavailable(format!(
                "asked for {} but provider returned {}",
                contract, snapshot.symbol
            )));
        }

        validate_snapshot(&snapshot).map_err(|reason| {
            warn!("Rejected {} snapshot from {}: {}", contract, self.base_url, reason);
            ProviderError::DataUnavailable(reason)
        })?;

        Ok(snapshot)
    }
}

/// Largest volume a live snapshot may report; signed flow figures must fit in i64
pub const MAX_SNAPSHOT_VOLUME: u64 = i64::MAX as u64;

/// Check a decoded payload before any analytics run over it
fn validate_snapshot(snapshot: &ContractSnapshot) -> Result<(), String> {
    if !snapshot.price.is_finite() || !snapshot.percent_change.is_finite() {
        return Err("non-finite price or change".to_string());
    }
    if snapshot.bid_volume > MAX_SNAPSHOT_VOLUME || snapshot.offer_volume > MAX_SNAPSHOT_VOLUME {
        return Err(format!(
            "bid/offer volume out of range: {}/{}",
            snapshot.bid_volume, snapshot.offer_volume
        ));
    }

    let mut traded: u64 = 0;
    for trade in &snapshot.trades {
        if trade.volume == 0 {
            return Err(format!("zero volume trade at {}", trade.timestamp.format("%H:%M")));
        }
        if !trade.price.is_finite() {
            return Err(format!("non-finite trade price at {}", trade.timestamp.format("%H:%M")));
        }
        traded = traded
            .checked_add(trade.volume)
            .filter(|total| *total <= MAX_SNAPSHOT_VOLUME)
            .ok_or_else(|| "total traded volume out of range".to_string())?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    /// Serve one canned HTTP response on an ephemeral port
    async fn serve_once(status_line: &'static str, body: String) -> Url {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = [0u8; 2048];
            let _ = socket.read(&mut buf).await;
            let response = format!(
                "HTTP/1.1 {status_line}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                body.len()
            );
            let _ = socket.write_all(response.as_bytes()).await;
            let _ = socket.shutdown().await;
        });

        Url::parse(&format!("http://{addr}/api")).unwrap()
    }

    /// Accept one connection and hold it open without ever answering
    async fn serve_silence() -> Url {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            let (_socket, _) = listener.accept().await.unwrap();
            tokio::time::sleep(Duration::from_secs(30)).await;
        });

        Url::parse(&format!("http://{addr}/")).unwrap()
    }

    #[tokio::test]
    async fn test_mock_fixture_s50z25() {
        let snapshot = MockProvider::new().snapshot("S50Z25").await.unwrap();

        assert_eq!(snapshot.symbol, "S50Z25");
        assert_eq!(snapshot.price, 814.0);
        assert_eq!(snapshot.percent_change, -1.32);
        assert_eq!(snapshot.bid_volume, 20_000);
        assert_eq!(snapshot.offer_volume, 50_000);
        assert_eq!(snapshot.trades.len(), 4);
        assert_eq!(snapshot.trades[3].timestamp.format("%H:%M").to_string(), "16:05");
    }

    #[tokio::test]
    async fn test_mock_covers_every_contract() {
        let provider = MockProvider::new();
        for contract in Contract::ALL {
            let snapshot = provider.snapshot(contract.as_str()).await.unwrap();
            assert_eq!(snapshot.symbol, contract.as_str());
            assert_eq!(snapshot.trades.len(), 4);
        }
    }

    #[tokio::test]
    async fn test_mock_unknown_symbol() {
        let err = MockProvider::new().snapshot("S50U26").await.unwrap_err();
        assert_eq!(err, ProviderError::UnknownSymbol("S50U26".to_string()));
    }

    #[test]
    fn test_snapshot_url_keeps_base_path() {
        let provider = HttpSnapshotProvider::new(Url::parse("http://localhost:8080/api").unwrap());
        assert_eq!(
            provider.snapshot_url("S50H26").unwrap().as_str(),
            "http://localhost:8080/api/snapshot/S50H26"
        );
    }

    #[tokio::test]
    async fn test_http_rejects_unknown_symbol_without_request() {
        // Nothing listens here; an unknown symbol must fail before connecting
        let provider = HttpSnapshotProvider::new(Url::parse("http://127.0.0.1:9/").unwrap());
        let err = provider.snapshot("ES").await.unwrap_err();
        assert!(err.is_unknown_symbol());
    }

    #[tokio::test]
    async fn test_http_parses_snapshot() {
        let body = r#"{
            "symbol": "S50H26",
            "price": 842.1,
            "change": 0.45,
            "bid": 18000,
            "offer": 22000,
            "trades": [
                {"timestamp": "09:30", "price": 841.8, "volume": 150, "type": "Aggressive Buy"}
            ]
        }"#;
        let url = serve_once("200 OK", body.to_string()).await;

        let snapshot = HttpSnapshotProvider::new(url)
            .snapshot("S50H26")
            .await
            .unwrap();
        assert_eq!(snapshot.price, 842.1);
        assert_eq!(snapshot.trades.len(), 1);
        assert_eq!(snapshot.trades[0].side, Side::AggressiveBuy);
    }

    #[tokio::test]
    async fn test_http_not_found_is_unknown_symbol() {
        let url = serve_once("404 Not Found", String::new()).await;
        let err = HttpSnapshotProvider::new(url)
            .snapshot("S50M26")
            .await
            .unwrap_err();
        assert_eq!(err, ProviderError::UnknownSymbol("S50M26".to_string()));
    }

    #[tokio::test]
    async fn test_http_server_error_is_data_unavailable() {
        let url = serve_once("503 Service Unavailable", String::new()).await;
        let err = HttpSnapshotProvider::new(url)
            .snapshot("S50M26")
            .await
            .unwrap_err();
        assert!(matches!(err, ProviderError::DataUnavailable(_)));
    }

    #[tokio::test]
    async fn test_http_malformed_payload_is_data_unavailable() {
        let url = serve_once("200 OK", "{\"symbol\": ".to_string()).await;
        let err = HttpSnapshotProvider::new(url)
            .snapshot("S50Z25")
            .await
            .unwrap_err();
        assert!(matches!(err, ProviderError::DataUnavailable(_)));
    }

    #[tokio::test]
    async fn test_http_symbol_mismatch_is_data_unavailable() {
        let body = r#"{"symbol": "S50Z25", "price": 814.0, "change": -1.32, "bid": 1, "offer": 2}"#;
        let url = serve_once("200 OK", body.to_string()).await;
        let err = HttpSnapshotProvider::new(url)
            .snapshot("S50H26")
            .await
            .unwrap_err();
        assert!(matches!(err, ProviderError::DataUnavailable(_)));
    }

    #[tokio::test]
    async fn test_http_timeout_is_data_unavailable() {
        let url = serve_silence().await;
        let err = HttpSnapshotProvider::new(url)
            .with_timeout(Duration::from_millis(50))
            .snapshot("S50Z25")
            .await
            .unwrap_err();
        assert_eq!(
            err,
            ProviderError::DataUnavailable("request timed out".to_string())
        );
    }

    #[tokio::test]
    async fn test_http_zero_volume_trade_is_data_unavailable() {
        let body = r#"{
            "symbol": "S50Z25", "price": 814.0, "change": -1.32, "bid": 20000, "offer": 50000,
            "trades": [
                {"timestamp": "09:45", "price": 814.2, "volume": 0, "type": "Aggressive Sell"}
            ]
        }"#;
        let url = serve_once("200 OK", body.to_string()).await;
        let err = HttpSnapshotProvider::new(url)
            .snapshot("S50Z25")
            .await
            .unwrap_err();
        assert!(matches!(err, ProviderError::DataUnavailable(reason) if reason.contains("zero volume")));
    }

    #[tokio::test]
    async fn test_http_overflowing_trade_volume_is_data_unavailable() {
        let body = r#"{
            "symbol": "S50Z25", "price": 814.0, "change": -1.32, "bid": 20000, "offer": 50000,
            "trades": [
                {"timestamp": "09:45", "price": 814.2, "volume": 18446744073709551615, "type": "Aggressive Buy"},
                {"timestamp": "09:46", "price": 814.2, "volume": 1, "type": "Aggressive Buy"}
            ]
        }"#;
        let url = serve_once("200 OK", body.to_string()).await;
        let err = HttpSnapshotProvider::new(url)
            .snapshot("S50Z25")
            .await
            .unwrap_err();
        assert!(matches!(err, ProviderError::DataUnavailable(_)));
    }

    #[tokio::test]
    async fn test_http_out_of_range_book_volume_is_data_unavailable() {
        let body = r#"{"symbol": "S50Z25", "price": 814.0, "change": -1.32, "bid": 0, "offer": 9223372036854775808}"#;
        let url = serve_once("200 OK", body.to_string()).await;
        let err = HttpSnapshotProvider::new(url)
            .snapshot("S50Z25")
            .await
            .unwrap_err();
        assert!(matches!(err, ProviderError::DataUnavailable(reason) if reason.contains("out of range")));
    }

    #[test]
    fn test_mock_fixtures_pass_validation() {
        for contract in Contract::ALL {
            let snapshot = MockProvider::lookup(contract).unwrap();
            assert_eq!(validate_snapshot(&snapshot), Ok(()));
        }
    }
}
