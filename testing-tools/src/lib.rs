// Testing Tools Library
//
// This crate provides testing utilities for the Webhook Watchdog.
// Currently includes:
// - send-test-webhook: sends signed, tampered and malformed events to a running endpoint

pub mod api_client;
pub mod output;
pub mod scenarios;
