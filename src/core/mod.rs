pub mod config;
pub mod logging;

// Per-frame pipeline
pub mod keypoint_resolver;
pub mod angle;
pub mod quality_gate;
pub mod frame_pipeline;
pub mod rep_counter;
pub mod session_tracker;

// Persistence and stats
pub mod store;
pub mod database;
pub mod http_store;
pub mod stats;

pub mod engine;
