use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info};

use crate::display::SessionEvent;
use crate::realtime::client::LocationSource;

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(3000);

/// Read the location source on a fixed period and queue each result for the
/// session.
///
/// Every tick runs its read in its own task, so a slow or failed read never
/// holds up the next tick. Nothing limits how many reads are in flight:
/// results reach the session in completion order, which under jitter may
/// differ from request order. Stops once the session's queue is closed.
pub async fn run_poller<S: LocationSource>(
    source: Arc<S>,
    interval: Duration,
    events: mpsc::Sender<SessionEvent>,
) {
    info!(
        interval_ms = interval.as_millis() as u64,
        "Starting location poller"
    );
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    let mut tick: u64 = 0;
    loop {
        ticker.tick().await;
        if events.is_closed() {
            break;
        }
        tick += 1;

        let source = source.clone();
        let events = events.clone();
        tokio::spawn(async move {
            let result = source.fetch().await;
            debug!(tick, ok = result.is_ok(), "Poll finished");
            // A closed queue just means the session is gone.
            let _ = events.send(SessionEvent::Poll(result)).await;
        });
    }
    info!("Location poller stopped");
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    use tokio::time::Instant;

    use crate::display::session::tests::{campus, RecordingSurface};
    use crate::display::{MapSession, SessionOptions};
    use crate::location::types::coerce_number;
    use crate::location::{Coordinate, LocationReport, LocationStore};
    use crate::realtime::FetchError;

    /// Answers with a report numbered by call order, after a per-call delay.
    struct ScriptedSource {
        delays: Mutex<VecDeque<Duration>>,
        started: AtomicUsize,
    }

    impl ScriptedSource {
        fn new(delays: &[u64]) -> Self {
            Self {
                delays: Mutex::new(delays.iter().map(|&s| Duration::from_secs(s)).collect()),
                started: AtomicUsize::new(0),
            }
        }
    }

    impl LocationSource for ScriptedSource {
        async fn fetch(&self) -> Result<LocationReport, FetchError> {
            let n = self.started.fetch_add(1, Ordering::SeqCst) + 1;
            let delay = self.delays.lock().unwrap().pop_front().unwrap_or_default();
            tokio::time::sleep(delay).await;
            Ok(LocationReport::from_numbers(10.0 + n as f64, 121.0))
        }
    }

    struct FailingSource;

    impl LocationSource for FailingSource {
        async fn fetch(&self) -> Result<LocationReport, FetchError> {
            Err(FetchError::Status(503))
        }
    }

    fn polled_lat(event: SessionEvent) -> f64 {
        match event {
            SessionEvent::Poll(Ok(report)) => report.lat.as_ref().and_then(coerce_number).unwrap(),
            other => panic!("unexpected event {other:?}"),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn polls_on_the_configured_period() {
        let store = Arc::new(LocationStore::new(Coordinate::now(14.5995, 120.9842)));
        store.write(Coordinate::now(14.65, 121.08)).await;
        let (tx, mut rx) = mpsc::channel(8);

        let start = Instant::now();
        let poller = tokio::spawn(run_poller(store, Duration::from_secs(3), tx));

        for _ in 0..3 {
            assert_eq!(polled_lat(rx.recv().await.unwrap()), 14.65);
        }
        assert!(start.elapsed() >= Duration::from_secs(6));
        assert!(start.elapsed() < Duration::from_secs(9));
        poller.abort();
    }

    #[tokio::test(start_paused = true)]
    async fn slow_reads_do_not_hold_up_later_ticks() {
        let source = Arc::new(ScriptedSource::new(&[10, 10, 10, 10]));
        let (tx, _rx) = mpsc::channel(8);

        let poller = tokio::spawn(run_poller(source.clone(), Duration::from_secs(3), tx));
        tokio::time::sleep(Duration::from_millis(6500)).await;

        assert_eq!(source.started.load(Ordering::SeqCst), 3);
        poller.abort();
    }

    #[tokio::test(start_paused = true)]
    async fn results_arrive_in_completion_order() {
        let source = Arc::new(ScriptedSource::new(&[5, 1]));
        let (tx, mut rx) = mpsc::channel(8);

        let poller = tokio::spawn(run_poller(source, Duration::from_secs(3), tx));

        // Second request (sent at 3s, done at 4s) beats the first (done at 5s).
        assert_eq!(polled_lat(rx.recv().await.unwrap()), 12.0);
        assert_eq!(polled_lat(rx.recv().await.unwrap()), 11.0);
        poller.abort();
    }

    #[tokio::test(start_paused = true)]
    async fn failed_ticks_keep_the_last_known_position() {
        let (tx, rx) = mpsc::channel(8);
        let session = MapSession::new(campus(), SessionOptions::default(), RecordingSurface::default());
        let before = session.last_known_good();

        let poller = tokio::spawn(run_poller(Arc::new(FailingSource), Duration::from_secs(3), tx));
        let driver = tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(9500)).await;
            poller.abort();
        });

        let session = session.run(rx).await;
        driver.await.unwrap();

        assert_eq!(session.last_known_good(), before);
        assert_eq!(session.surface().vehicle.len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn stops_when_the_session_is_gone() {
        let store = Arc::new(LocationStore::new(Coordinate::now(14.5995, 120.9842)));
        let (tx, rx) = mpsc::channel(8);
        drop(rx);

        let poller = tokio::spawn(run_poller(store, Duration::from_secs(3), tx));
        tokio::time::timeout(Duration::from_secs(1), poller)
            .await
            .expect("poller should exit")
            .unwrap();
    }
}
