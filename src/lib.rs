#![allow(clippy::new_without_default)]

#[macro_use]
extern crate log;
#[macro_use]
extern crate anyhow;

pub mod api;
pub mod caption;
pub mod config;
pub mod duration_clock;
pub mod error;
pub mod export_data;
pub mod gps_processor;
mod logs;
pub mod pace;
pub mod sources;
pub mod storage;
pub mod summary;
pub mod tracker;
pub mod utils;
pub mod workout;
