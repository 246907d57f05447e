//! HTTP handlers

pub mod classes;
pub mod health;
pub mod predict;
pub mod status;
