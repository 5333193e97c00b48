//! Integration tests for the DocVault HTTP surface.

mod helpers;

mod access_test;
mod ledger_test;
mod ticket_test;
