// src/lib.rs

pub mod config;
pub mod fallback;
pub mod provider;
pub mod relay;
