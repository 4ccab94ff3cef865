use std::sync::{Arc, Mutex};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// Source of "now" for arrivals and departures that carry no explicit time.
pub trait SystemSimulator: std::fmt::Debug + Send + Sync {
    fn get_current_time_in_s(&self) -> i64;
    fn get_current_time_in_ms(&self) -> i64;
    fn clone_box(&self) -> SharedSimulator;
}

#[derive(Debug)]
pub struct SharedSimulator(pub Arc<dyn SystemSimulator>);

impl Clone for SharedSimulator {
    fn clone(&self) -> Self {
        self.0.clone_box()
    }
}

impl std::ops::Deref for SharedSimulator {
    type Target = dyn SystemSimulator;
    fn deref(&self) -> &Self::Target {
        &*self.0
    }
}

#[derive(Debug)]
struct SimulatorState {
    is_simulation: bool,
    simulation_base_timestamp: i64,
    real_time_base_timestamp: i64,
}

/// Clock that either follows the wall clock or runs a simulated timeline.
///
/// A simulated clock starts at `simulation_base_timestamp` (ms) and advances with real elapsed
/// time from there on. It can additionally be pushed forward with [`Simulator::advance`].
#[derive(Debug, Clone)]
pub struct Simulator {
    state: Arc<Mutex<SimulatorState>>,
}

impl Simulator {
    pub fn wall_clock() -> Simulator {
        Simulator::with_state(false, 0)
    }

    /// Simulated clock starting at `start_time_s` seconds.
    pub fn simulated(start_time_s: i64) -> Simulator {
        Simulator::with_state(true, start_time_s * 1000)
    }

    fn with_state(is_simulation: bool, simulation_base_timestamp: i64) -> Simulator {
        let state = SimulatorState { is_simulation, simulation_base_timestamp, real_time_base_timestamp: Self::get_system_time_ms() };
        Simulator { state: Arc::new(Mutex::new(state)) }
    }

    fn get_system_time_ms() -> i64 {
        SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or(Duration::ZERO).as_millis() as i64
    }

    pub fn is_simulation(&self) -> bool {
        self.state.lock().map(|state| state.is_simulation).unwrap_or(false)
    }

    /// Moves a simulated clock forward. Has no effect on a wall clock.
    pub fn advance(&self, seconds: i64) {
        match self.state.lock() {
            Ok(mut state) if state.is_simulation => state.simulation_base_timestamp += seconds * 1000,
            Ok(_) => log::warn!("Cannot advance a wall clock by {}s.", seconds),
            Err(e) => log::error!("Simulator state lock poisoned: {}", e),
        }
    }
}

impl SystemSimulator for Simulator {
    fn get_current_time_in_s(&self) -> i64 {
        self.get_current_time_in_ms() / 1000
    }

    fn get_current_time_in_ms(&self) -> i64 {
        let Ok(state) = self.state.lock() else {
            return Self::get_system_time_ms();
        };

        if state.is_simulation {
            let current_real = Self::get_system_time_ms();
            state.simulation_base_timestamp + (current_real - state.real_time_base_timestamp)
        } else {
            Self::get_system_time_ms()
        }
    }

    fn clone_box(&self) -> SharedSimulator {
        SharedSimulator(Arc::new(self.clone()))
    }
}

impl From<SharedSimulator> for Arc<dyn SystemSimulator> {
    fn from(wrapper: SharedSimulator) -> Self {
        wrapper.0
    }
}
