//! Wire models for the resource manager APIs

pub mod video_analyzer;
pub mod web;
