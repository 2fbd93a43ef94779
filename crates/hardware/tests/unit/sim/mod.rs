//! Unit tests for the simulation driver.
