//! Core module - configuration

pub mod config;
