//! Integration tests across the module stack.

mod bootstrap_tests;
mod catalog_tests;
mod fixture;
mod search_properties;
mod session_tests;
