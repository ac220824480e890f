pub mod config;
pub mod expectation;
pub mod pitch;
pub mod result;
pub mod score;
