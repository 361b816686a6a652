//! Data types shared across the pipeline.

pub mod analysis;
pub mod config;
pub mod entity;
pub mod event;
pub mod metadata;
