//! Helpers for tests and test harnesses. Only compiled with the `test_utils` feature.
pub mod prepare_env;
pub mod seed;
