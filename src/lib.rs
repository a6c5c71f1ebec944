// src/lib.rs

//! Paddock Scraper Library

pub mod config;
pub mod error;
pub mod extract;
pub mod models;
pub mod pipeline;
pub mod services;
pub mod storage;
pub mod utils;
