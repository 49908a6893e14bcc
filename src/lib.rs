//! Workforce scheduling optimization service.
//!
//! Given a set of employees, shifts, and constraints, finds one or more
//! feasible assignments of employees to shifts over a `pumpkin_solver`
//! constraint model.

pub mod api;
pub mod config;
pub mod demo_data;
pub mod domain;
pub mod dto;
pub mod engine;
pub mod error;
pub mod facade;
pub mod filter;
pub mod solution;
