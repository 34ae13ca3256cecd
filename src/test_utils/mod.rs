//! Test utilities for use case and HTTP tests.
//!
//! This module provides:
//! - Test data factories for creating valid test fixtures
//! - In-memory repository implementations for mocking persistence
//! - A recording billing provider standing in for the payment API
//! - `TestAppStateBuilder` for route tests

mod app_state_builder;
mod appointment_mocks;
mod billing_mocks;
mod factories;
mod shop_mocks;

pub use app_state_builder::*;
pub use appointment_mocks::*;
pub use billing_mocks::*;
pub use factories::*;
pub use shop_mocks::*;
