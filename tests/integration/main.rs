//! Integration tests for modelfilter.

mod helpers;

mod memory_test;
mod params_test;
mod sql_test;
