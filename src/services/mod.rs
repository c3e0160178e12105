// src/services/mod.rs
pub mod api_server;
pub mod event_gate;
pub mod revolut_client;
