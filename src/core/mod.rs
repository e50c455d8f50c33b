// src/core/mod.rs
pub mod display;
pub mod engine;
pub mod mapping;
pub mod predictions;
pub mod ranker;
pub mod types;
