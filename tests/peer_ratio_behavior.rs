//! Behavior-driven tests for the peer index P/E aggregator
//!
//! A failing or slow lookup must only blank its own label.

mod support;

use std::time::Duration;

use stockscope_core::{PeerIndex, PeerRatioAggregator, PEER_INDICES};

use support::StubProvider;

#[tokio::test]
async fn when_two_of_eight_lookups_fail_the_other_six_are_still_reported() {
    // Given: a provider answering six peers and failing two
    let provider = StubProvider::new()
        .with_ratio("DIA", 22.1)
        .with_failing_ratio("QQQ")
        .with_ratio("SPY", 24.3)
        .with_ratio("XLK", 33.0)
        .with_ratio("XLF", 16.2)
        .with_failing_ratio("XLE")
        .with_ratio("XLV", 25.4)
        .with_ratio("XLRE", 38.9);

    // When: the table is collected
    let table = PeerRatioAggregator::new(&provider).collect().await;

    // Then: six numbers, two blanks, configuration order kept
    assert_eq!(table.len(), 8);
    assert_eq!(table.available_count(), 6);
    assert_eq!(table.get("NASDAQ").and_then(|peer| peer.trailing_pe), None);
    assert_eq!(table.get("Energy").and_then(|peer| peer.trailing_pe), None);
    assert_eq!(table.get("S&P 500").and_then(|peer| peer.trailing_pe), Some(24.3));

    let labels: Vec<&str> = table.entries.iter().map(|peer| peer.label.as_str()).collect();
    let configured: Vec<&str> = PEER_INDICES.iter().map(|peer| peer.label).collect();
    assert_eq!(labels, configured);
    assert_eq!(provider.calls(), 8, "one lookup per label, no retries");
}

#[tokio::test]
async fn when_one_lookup_fails_the_other_seven_are_populated() {
    let provider = PEER_INDICES
        .iter()
        .fold(StubProvider::new(), |provider, peer| {
            provider.with_ratio(peer.symbol, 20.0)
        })
        .with_failing_ratio("XLRE");

    let table = PeerRatioAggregator::new(&provider).collect().await;

    assert_eq!(table.available_count(), 7);
    assert_eq!(table.get("Real Estate").and_then(|peer| peer.trailing_pe), None);
}

#[tokio::test]
async fn when_a_lookup_exceeds_the_timeout_only_that_label_is_blank() {
    // Given: one slow peer among two
    let provider = StubProvider::new()
        .with_ratio("SPY", 24.0)
        .with_slow_ratio("QQQ", Duration::from_millis(500), 31.0);
    let peers = [
        PeerIndex::new("S&P 500", "SPY"),
        PeerIndex::new("NASDAQ", "QQQ"),
    ];

    // When: lookups are bounded to 50ms
    let table = PeerRatioAggregator::new(&provider)
        .with_peers(peers)
        .with_timeout(Duration::from_millis(50))
        .collect()
        .await;

    // Then: the slow label is blank, the fast one is reported
    assert_eq!(table.get("S&P 500").and_then(|peer| peer.trailing_pe), Some(24.0));
    assert_eq!(table.get("NASDAQ").and_then(|peer| peer.trailing_pe), None);
}

#[tokio::test]
async fn unreported_ratio_is_blank_rather_than_zero() {
    let provider = StubProvider::new();

    let table = PeerRatioAggregator::new(&provider)
        .with_peers([PeerIndex::new("Technology", "XLK")])
        .collect()
        .await;

    assert_eq!(table.len(), 1);
    assert_eq!(table.entries[0].trailing_pe, None);
    assert_eq!(table.entries[0].symbol, "XLK");
}
