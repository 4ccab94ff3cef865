pub mod garage;
pub mod simulator;
pub mod traffic;
pub mod utils;
