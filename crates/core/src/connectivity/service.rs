//! Connectivity monitor - core business logic

use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use repairhub_domain::constants::{PROBE_GOOD_THRESHOLD_MS, PROBE_MIN_INTERVAL_SECS};
use serde::Serialize;
use tokio::sync::{watch, Mutex};
use tracing::{debug, info, warn};

use super::ports::ConnectivityProbe;

/// Assessment of the link to the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionQuality {
    /// Probe answered quickly.
    Good,
    /// Probe answered slowly, or failed while the platform still reports a
    /// network.
    Poor,
    /// No probe result yet (startup, or just came back online).
    Unknown,
}

/// Snapshot of connectivity as the rest of the application sees it.
///
/// `is_online` follows the platform's online/offline signals; `quality`
/// follows active probes. The two are independent: a captive portal can be
/// "online" with `Poor` quality.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ConnectionState {
    pub is_online: bool,
    pub quality: ConnectionQuality,
    pub last_online_at: Option<DateTime<Utc>>,
    pub last_offline_at: Option<DateTime<Utc>>,
}

impl ConnectionState {
    fn startup() -> Self {
        // Assume online until told otherwise, matching platform behaviour
        // where the offline signal arrives after the fact.
        Self {
            is_online: true,
            quality: ConnectionQuality::Unknown,
            last_online_at: None,
            last_offline_at: None,
        }
    }
}

struct MonitorInner {
    state: ConnectionState,
    last_probe_at: Option<Instant>,
}

/// Connectivity monitor service.
///
/// Consumes platform online/offline signals via [`set_online`] /
/// [`set_offline`] and refines the picture with active latency probes.
/// Probes are rate-limited so bursts of quality checks collapse into one
/// wire request.
///
/// [`set_online`]: ConnectivityMonitor::set_online
/// [`set_offline`]: ConnectivityMonitor::set_offline
pub struct ConnectivityMonitor {
    probe: Arc<dyn ConnectivityProbe>,
    inner: Mutex<MonitorInner>,
    events: watch::Sender<ConnectionState>,
    min_probe_interval: Duration,
    good_threshold: Duration,
}

impl ConnectivityMonitor {
    pub fn new(probe: Arc<dyn ConnectivityProbe>) -> Self {
        let state = ConnectionState::startup();
        let (events, _) = watch::channel(state);
        Self {
            probe,
            inner: Mutex::new(MonitorInner { state, last_probe_at: None }),
            events,
            min_probe_interval: Duration::from_secs(PROBE_MIN_INTERVAL_SECS),
            good_threshold: Duration::from_millis(PROBE_GOOD_THRESHOLD_MS),
        }
    }

    /// Override the minimum spacing between probes.
    #[must_use]
    pub fn with_min_probe_interval(mut self, interval: Duration) -> Self {
        self.min_probe_interval = interval;
        self
    }

    /// Override the latency below which the link counts as good.
    #[must_use]
    pub fn with_good_threshold(mut self, threshold: Duration) -> Self {
        self.good_threshold = threshold;
        self
    }

    /// Platform reports the network came back. Quality is unknown until the
    /// next probe confirms the backend is actually reachable.
    pub async fn set_online(&self) {
        let mut inner = self.inner.lock().await;
        if !inner.state.is_online {
            info!("connection restored");
        }
        inner.state.is_online = true;
        inner.state.quality = ConnectionQuality::Unknown;
        inner.state.last_online_at = Some(Utc::now());
        self.publish(&inner);
    }

    /// Platform reports the network went away.
    pub async fn set_offline(&self) {
        let mut inner = self.inner.lock().await;
        if inner.state.is_online {
            warn!("connection lost");
        }
        inner.state.is_online = false;
        inner.state.quality = ConnectionQuality::Unknown;
        inner.state.last_offline_at = Some(Utc::now());
        self.publish(&inner);
    }

    /// Probe the backend and update quality. Calls arriving within the
    /// minimum probe interval return the current state without a wire
    /// request. A failed probe degrades quality to `Poor` but does not flip
    /// `is_online`; only platform signals do that.
    pub async fn probe_quality(&self) -> ConnectionState {
        let mut inner = self.inner.lock().await;

        if let Some(last) = inner.last_probe_at {
            if last.elapsed() < self.min_probe_interval {
                debug!("probe throttled, reusing last connectivity state");
                return inner.state;
            }
        }
        inner.last_probe_at = Some(Instant::now());

        inner.state.quality = match self.probe.measure_latency().await {
            Ok(latency) if latency < self.good_threshold => {
                debug!(latency_ms = latency.as_millis() as u64, "probe completed, link good");
                ConnectionQuality::Good
            }
            Ok(latency) => {
                debug!(latency_ms = latency.as_millis() as u64, "probe completed, link slow");
                ConnectionQuality::Poor
            }
            Err(err) => {
                warn!(error = %err, "connectivity probe failed");
                ConnectionQuality::Poor
            }
        };

        self.publish(&inner);
        inner.state
    }

    /// Current state without probing.
    pub async fn state(&self) -> ConnectionState {
        self.inner.lock().await.state
    }

    pub async fn is_online(&self) -> bool {
        self.inner.lock().await.state.is_online
    }

    /// Whether list/search and mutating API calls should be attempted right
    /// now.
    pub async fn allows_mutations(&self) -> bool {
        self.is_online().await
    }

    /// Subscribe to connectivity state changes.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<ConnectionState> {
        self.events.subscribe()
    }

    fn publish(&self, inner: &MonitorInner) {
        let _ = self.events.send(inner.state);
    }
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;
    use std::sync::Mutex as StdMutex;

    use async_trait::async_trait;
    use repairhub_domain::{RepairHubError, Result};

    use super::*;

    /// Probe double that pops scripted outcomes in order.
    struct ScriptedProbe {
        outcomes: StdMutex<VecDeque<Result<Duration>>>,
        calls: StdMutex<usize>,
    }

    impl ScriptedProbe {
        fn new(outcomes: Vec<Result<Duration>>) -> Arc<Self> {
            Arc::new(Self { outcomes: StdMutex::new(outcomes.into()), calls: StdMutex::new(0) })
        }

        fn calls(&self) -> usize {
            *self.calls.lock().unwrap()
        }
    }

    #[async_trait]
    impl ConnectivityProbe for ScriptedProbe {
        async fn measure_latency(&self) -> Result<Duration> {
            *self.calls.lock().unwrap() += 1;
            self.outcomes
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Err(RepairHubError::Network("probe script exhausted".into())))
        }
    }

    fn monitor(probe: Arc<ScriptedProbe>) -> ConnectivityMonitor {
        ConnectivityMonitor::new(probe).with_min_probe_interval(Duration::ZERO)
    }

    #[tokio::test]
    async fn starts_online_with_unknown_quality() {
        let probe = ScriptedProbe::new(vec![]);
        let state = monitor(probe).state().await;
        assert!(state.is_online);
        assert_eq!(state.quality, ConnectionQuality::Unknown);
        assert_eq!(state.last_offline_at, None);
    }

    #[tokio::test]
    async fn fast_probe_is_good_quality() {
        let probe = ScriptedProbe::new(vec![Ok(Duration::from_millis(120))]);
        let state = monitor(probe).probe_quality().await;
        assert_eq!(state.quality, ConnectionQuality::Good);
    }

    #[tokio::test]
    async fn slow_probe_is_poor_quality() {
        let probe = ScriptedProbe::new(vec![Ok(Duration::from_millis(3_500))]);
        let state = monitor(probe).probe_quality().await;
        assert_eq!(state.quality, ConnectionQuality::Poor);
    }

    #[tokio::test]
    async fn failed_probe_degrades_quality_but_not_online_flag() {
        let probe = ScriptedProbe::new(vec![Err(RepairHubError::Network("timeout".into()))]);
        let mon = monitor(probe);
        let state = mon.probe_quality().await;
        assert!(state.is_online);
        assert_eq!(state.quality, ConnectionQuality::Poor);
    }

    #[tokio::test]
    async fn probes_are_rate_limited() {
        let probe = ScriptedProbe::new(vec![
            Ok(Duration::from_millis(100)),
            Ok(Duration::from_millis(100)),
        ]);
        let mon = ConnectivityMonitor::new(probe.clone())
            .with_min_probe_interval(Duration::from_secs(60));

        mon.probe_quality().await;
        mon.probe_quality().await;
        mon.probe_quality().await;

        assert_eq!(probe.calls(), 1);
    }

    #[tokio::test]
    async fn offline_signal_gates_mutations_until_back_online() {
        let probe = ScriptedProbe::new(vec![Ok(Duration::from_millis(90))]);
        let mon = monitor(probe);

        mon.set_offline().await;
        assert!(!mon.allows_mutations().await);
        assert!(mon.state().await.last_offline_at.is_some());

        mon.set_online().await;
        assert_eq!(mon.state().await.quality, ConnectionQuality::Unknown);
        assert!(mon.state().await.last_online_at.is_some());

        let state = mon.probe_quality().await;
        assert!(state.is_online);
        assert_eq!(state.quality, ConnectionQuality::Good);
    }

    #[tokio::test]
    async fn subscribers_see_transitions() {
        let probe = ScriptedProbe::new(vec![]);
        let mon = monitor(probe);
        let mut events = mon.subscribe();

        mon.set_offline().await;
        events.changed().await.unwrap();
        assert!(!events.borrow().is_online);

        mon.set_online().await;
        events.changed().await.unwrap();
        assert!(events.borrow().is_online);
    }
}
