// Data models for pose keypoints, exercise definitions and sessions

pub mod pose;
pub mod exercise;
pub mod session;
