// Domain layer - pure scoring, no I/O
pub mod action;
pub mod fleet;
pub mod fuel;
pub mod maintenance;
pub mod risk;
pub mod trend;
pub mod vehicle;
pub mod weather;
