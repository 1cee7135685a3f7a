//! pathwire - tiny HTTP-style control endpoint for networked devices
//!
//! Core library for request handling, plus the device capabilities
//! (persistent store, network clock) the handlers build on.

pub mod app;
pub mod config;
pub mod device;
pub mod http;
pub mod server;
