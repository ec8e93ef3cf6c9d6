//! HTTP adapter for the external scoring engine.

mod dto;
mod http_engine;

pub use http_engine::HttpScoringEngine;
