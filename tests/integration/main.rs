//! Integration test driver for `tests/integration/` submodule.
//!
//! Each `mod` below maps to a file that exercises a specific subsystem
//! against the emulated I2C bus in [`mock_hw`].  All tests run on the host
//! with no real hardware required.

mod display_tests;
mod mock_hw;
