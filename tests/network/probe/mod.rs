//! Reachability probe tests

pub mod checker_tests;
