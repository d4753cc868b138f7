pub mod config;
pub mod day;
