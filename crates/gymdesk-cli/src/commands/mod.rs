pub mod admin;
pub mod class;
pub mod config;
pub mod exercise;
pub mod workout;
