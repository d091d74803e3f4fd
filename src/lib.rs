#![allow(non_camel_case_types)]

pub mod cli;
pub mod configuration;
pub mod controller;
pub mod dao;
pub mod error;
pub mod handler;
pub mod migration;
pub mod model;
pub mod provider;
pub mod push;
pub mod server;
pub mod types;

#[cfg(test)]
mod test_helpers;
