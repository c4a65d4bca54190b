use log::{debug, info};
use tokio::sync::watch;

use super::{DisplayStats, SessionClock};

/// Receives stats and clock updates. Called from the sampling and display
/// tasks, so implementations must not block.
pub trait StatsSink: Send + Sync + 'static {
    fn publish_stats(&self, stats: DisplayStats);
    fn publish_clock(&self, clock: SessionClock);
}

/// Writes updates to the log; used by the headless host.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogSink;

impl StatsSink for LogSink {
    fn publish_stats(&self, stats: DisplayStats) {
        debug!(
            "attention={} blink_rate={} distractions={}",
            stats.attention_score, stats.blink_rate, stats.distractions
        );
    }

    fn publish_clock(&self, clock: SessionClock) {
        info!("session time {}", clock.display);
    }
}

/// Keeps only the latest value of each stream for a UI to poll or await.
pub struct WatchSink {
    stats_tx: watch::Sender<DisplayStats>,
    clock_tx: watch::Sender<SessionClock>,
}

impl WatchSink {
    pub fn new() -> (Self, watch::Receiver<DisplayStats>, watch::Receiver<SessionClock>) {
        let (stats_tx, stats_rx) = watch::channel(DisplayStats::default());
        let (clock_tx, clock_rx) = watch::channel(SessionClock::from_elapsed(0));
        (Self { stats_tx, clock_tx }, stats_rx, clock_rx)
    }
}

impl StatsSink for WatchSink {
    fn publish_stats(&self, stats: DisplayStats) {
        self.stats_tx.send_replace(stats);
    }

    fn publish_clock(&self, clock: SessionClock) {
        self.clock_tx.send_replace(clock);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn watch_sink_keeps_latest_values() {
        let (sink, stats_rx, clock_rx) = WatchSink::new();
        sink.publish_stats(DisplayStats {
            attention_score: 99,
            blink_rate: 10,
            distractions: 0,
        });
        sink.publish_stats(DisplayStats {
            attention_score: 94,
            blink_rate: 10,
            distractions: 1,
        });
        sink.publish_clock(SessionClock::from_elapsed(65));

        assert_eq!(stats_rx.borrow().attention_score, 94);
        assert_eq!(stats_rx.borrow().distractions, 1);
        assert_eq!(clock_rx.borrow().display, "01:05");
    }
}
