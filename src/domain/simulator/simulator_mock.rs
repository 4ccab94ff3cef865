use crate::domain::simulator::simulator::{SharedSimulator, SystemSimulator};

use std::sync::Arc;

/// Clock frozen at a fixed second.
#[derive(Debug, Clone)]
pub struct MockSimulator {
    pub time: i64,
}

impl MockSimulator {
    pub fn new(time: i64) -> MockSimulator {
        MockSimulator { time }
    }
}

impl SystemSimulator for MockSimulator {
    fn get_current_time_in_s(&self) -> i64 {
        self.time
    }

    fn get_current_time_in_ms(&self) -> i64 {
        self.time * 1000
    }

    fn clone_box(&self) -> SharedSimulator {
        SharedSimulator(Arc::new(self.clone()))
    }
}
