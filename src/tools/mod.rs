//! Meal Planner tools
//!
//! Workflows that tie the models, files and external clients together.

pub mod recipes;
