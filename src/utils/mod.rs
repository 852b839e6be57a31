pub mod config;
pub mod database;
pub mod staging;
pub mod storage;
