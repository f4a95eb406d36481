//! Unit tests for learning-cycle domain rules and services.

mod domain_tests;
mod support;
