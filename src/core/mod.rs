pub mod aggregator;
pub mod engine;
pub mod evaluator;
pub mod gateway;
pub mod planner;
pub mod signal;
