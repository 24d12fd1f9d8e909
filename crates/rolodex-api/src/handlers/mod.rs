//! API handlers
//!
//! Author: hephaex@gmail.com

pub mod auth;
pub mod contacts;
pub mod health;
