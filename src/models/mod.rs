// src/models/mod.rs
pub mod credential;
pub mod webhook;
