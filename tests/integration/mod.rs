//! Integration tests for the agent translation bridge

mod concurrency;
mod resilience;
mod round_trip;
mod scenarios;
mod support;
mod temporal_store;
