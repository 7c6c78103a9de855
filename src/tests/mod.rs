//! End-to-end tests of the purge workflow against a mock search backend.

mod purge_e2e;
