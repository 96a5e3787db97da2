//! Meal Planner Library
//!
//! Recipe card extraction, nutrition annotation and energy balance
//! calculations.

pub mod build_info;
pub mod config;
pub mod db;
pub mod energy;
pub mod error;
pub mod extract;
pub mod models;
pub mod nutrition;
pub mod tools;
pub mod units;
pub mod whoop;
