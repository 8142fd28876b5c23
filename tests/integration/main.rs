//! Integration tests over the in-memory inventory store.

mod helpers;

mod allocation_test;
mod intake_scenario_test;
mod reconciliation_test;
mod release_test;
mod retry_test;
