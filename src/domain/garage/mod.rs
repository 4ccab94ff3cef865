pub mod config;
pub mod coordinator;
pub mod outcome;
pub mod queue;
pub mod slot_ledger;
pub mod snapshot;
pub mod stack;
pub mod status;
pub mod vehicle;
