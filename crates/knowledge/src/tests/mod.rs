//! Shared fixtures and end-to-end scenarios.


mod scenarios;
