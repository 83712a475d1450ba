//! Conveyor Core
//!
//! Core types for the Conveyor CI/CD server.
//!
//! This crate contains:
//! - Domain types: pipeline steps and definitions, build phases and status records
//! - DTOs: HTTP request/response bodies shared by the orchestrator and its client

pub mod domain;
pub mod dto;
