#![deny(rust_2018_idioms)]

pub mod commands;
pub mod config;
pub mod events;
pub mod permissions;
