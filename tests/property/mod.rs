//! Property-based tests for pricing and wizard invariants

mod cost_properties;
mod wizard_properties;
