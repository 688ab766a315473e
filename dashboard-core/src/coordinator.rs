use parking_lot::{Mutex, RwLock};
use std::{sync::Arc, time::Duration};
use tokio::{task::JoinHandle, time};

use crate::{
    error::WeatherError,
    model::{ForecastSnapshot, Unit, WeatherSnapshot},
    prefs::PrefStore,
    provider::WeatherApi,
};

/// Period of the background re-synchronization timer.
pub const POLL_PERIOD: Duration = Duration::from_secs(30);

/// Read-only view of the coordinator's state, cloned out to consumers.
///
/// Invariant: `weather` and `forecast` are `None` whenever `error` is
/// `Some`. The converse does not hold; a failed poll leaves stale
/// snapshots in place.
#[derive(Debug, Clone, Default)]
pub struct WeatherState {
    pub city: String,
    pub unit: Unit,
    pub weather: Option<WeatherSnapshot>,
    pub forecast: Option<ForecastSnapshot>,
    pub error: Option<String>,
}

#[derive(Debug)]
struct Shared {
    provider: Arc<dyn WeatherApi>,
    state: RwLock<WeatherState>,
}

/// The stateful core of the dashboard.
///
/// Owns the city/unit inputs, the fetched snapshots, and the background
/// poll; writes input changes through to the preference store. Construct
/// one per application instance and share it by handle.
#[derive(Debug)]
pub struct Coordinator {
    shared: Arc<Shared>,
    store: PrefStore,
    poll: Mutex<Option<JoinHandle<()>>>,
    poll_period: Duration,
}

impl Coordinator {
    /// Build a coordinator with city and unit restored from `store`.
    ///
    /// The restored values are written back once, the same initial
    /// persistence sync the triggers perform on later changes.
    pub fn new(provider: Arc<dyn WeatherApi>, store: PrefStore) -> Self {
        let city = store.city().unwrap_or_default();
        let unit = store.unit();

        if !city.is_empty() {
            store.set_city(&city);
        }
        store.set_unit(unit);

        let state = WeatherState {
            city,
            unit,
            ..WeatherState::default()
        };

        Self {
            shared: Arc::new(Shared {
                provider,
                state: RwLock::new(state),
            }),
            store,
            poll: Mutex::new(None),
            poll_period: POLL_PERIOD,
        }
    }

    /// Override the poll period; tests use a short one.
    pub fn with_poll_period(mut self, period: Duration) -> Self {
        self.poll_period = period;
        self
    }

    /// Issue the startup fetch pair for the restored city and schedule
    /// the background poll. Exactly one fetch pair when a city was
    /// restored, none otherwise.
    pub async fn start(&self) {
        if self.city_is_empty() {
            return;
        }
        self.reschedule_poll();
        self.shared.primary_fetch().await;
    }

    /// Change the searched city.
    ///
    /// Non-empty values are persisted, then the primary fetch runs and
    /// the poll is rescheduled. An empty city disables fetching and
    /// cancels the poll without clearing whatever is displayed.
    pub async fn set_city(&self, city: &str) {
        if city.is_empty() {
            self.shared.state.write().city.clear();
            self.cancel_poll();
            return;
        }

        self.store.set_city(city);
        self.shared.state.write().city = city.to_string();
        // Old timer goes away at change time, not after the fetch settles.
        self.reschedule_poll();
        self.shared.primary_fetch().await;
    }

    /// Change the unit system.
    ///
    /// Always re-persisted, even when the value is unchanged; refetches
    /// under the same rule as a city change.
    pub async fn set_unit(&self, unit: Unit) {
        self.store.set_unit(unit);
        self.shared.state.write().unit = unit;

        if self.city_is_empty() {
            return;
        }
        self.reschedule_poll();
        self.shared.primary_fetch().await;
    }

    /// Snapshot of the current state.
    pub fn state(&self) -> WeatherState {
        self.shared.state.read().clone()
    }

    fn city_is_empty(&self) -> bool {
        self.shared.state.read().city.is_empty()
    }

    /// Cancel-before-reschedule: at most one poll task per active city.
    fn reschedule_poll(&self) {
        let mut slot = self.poll.lock();
        if let Some(handle) = slot.take() {
            handle.abort();
        }
        if self.shared.state.read().city.is_empty() {
            return;
        }

        let shared = Arc::clone(&self.shared);
        let period = self.poll_period;
        *slot = Some(tokio::spawn(async move {
            // First tick a full period out; the primary fetch already ran.
            let mut ticker = time::interval_at(time::Instant::now() + period, period);
            loop {
                ticker.tick().await;
                shared.poll_tick().await;
            }
        }));
    }

    fn cancel_poll(&self) {
        if let Some(handle) = self.poll.lock().take() {
            handle.abort();
        }
    }
}

impl Drop for Coordinator {
    fn drop(&mut self) {
        self.cancel_poll();
    }
}

impl Shared {
    async fn fetch_pair(
        &self,
        city: &str,
        unit: Unit,
    ) -> Result<(WeatherSnapshot, ForecastSnapshot), WeatherError> {
        let weather = self.provider.fetch_current(city, unit).await?;
        let forecast = self.provider.fetch_forecast(city, unit).await?;
        Ok((weather, forecast))
    }

    /// Fetch cycle triggered by a city/unit change or startup.
    ///
    /// The cycle is tagged with the `(city, unit)` it was issued for; a
    /// result landing after the inputs moved on is discarded rather than
    /// overwriting fresher state.
    async fn primary_fetch(&self) {
        let (city, unit) = self.inputs();
        if city.is_empty() {
            return;
        }

        match self.fetch_pair(&city, unit).await {
            Ok((weather, forecast)) => {
                let mut state = self.state.write();
                if state.city != city || state.unit != unit {
                    return; // superseded while in flight
                }
                state.weather = Some(weather);
                state.forecast = Some(forecast);
                state.error = None;
            }
            Err(err) => {
                let mut state = self.state.write();
                if state.city != city || state.unit != unit {
                    return;
                }
                state.weather = None;
                state.forecast = None;
                state.error = Some(err.user_message());
            }
        }
    }

    /// Timer-driven re-synchronization for the inputs current at firing.
    ///
    /// A failed poll must not blank a previously successful display:
    /// snapshots and the user-visible error stay untouched, the failure
    /// goes to the diagnostic log only.
    async fn poll_tick(&self) {
        let (city, unit) = self.inputs();
        if city.is_empty() {
            return;
        }

        match self.fetch_pair(&city, unit).await {
            Ok((weather, forecast)) => {
                let mut state = self.state.write();
                if state.city != city || state.unit != unit {
                    return;
                }
                state.weather = Some(weather);
                state.forecast = Some(forecast);
                state.error = None;
            }
            Err(err) => {
                tracing::warn!(%city, error = %err, "background refresh failed, keeping last snapshots");
            }
        }
    }

    fn inputs(&self) -> (String, Unit) {
        let state = self.state.read();
        (state.city.clone(), state.unit)
    }
}
