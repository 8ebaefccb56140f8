//! # JAL Sutra backend
//!
//! Groundwater heavy-metal monitoring service.
//!
//! Field scientists submit water samples (five metal concentrations at a
//! point and date). The backend stores them, scores each against regulatory
//! limits, and summarises contamination and hardness around any location.
//!
//! ## Features
//!
//! - **Index calculator**: Heavy Metal Pollution Index (HPI), Heavy Metal
//!   Evaluation Index (HEI), Contamination Degree (CD) and mean CD (mCd)
//! - **Synthetic hardness**: metal-weighted hardness with category bands
//! - **Area aggregation**: Haversine radius filter with per-area statistics
//! - **Collection analytics**: averages, extremes and indices of the mean
//! - **HTTP API**: REST endpoints for the web client
//!
//! ## Architecture
//!
//! - [`models`]: metals, standards, readings and profiles
//! - [`services`]: pure computation (indices, hardness, geometry, area
//!   statistics, analytics, validation)
//! - [`db`]: repository traits, in-memory and Postgres backends, and the
//!   service layer the handlers call
//! - [`auth`]: bearer-token authentication seam
//! - [`config`]: `jalsutra.toml` + environment configuration
//! - `http`: axum router and handlers (feature `http-server`)

// Allow large error types - RepositoryError contains rich context for debugging
#![allow(clippy::result_large_err)]

pub mod auth;
pub mod config;
pub mod db;
pub mod models;
pub mod services;

#[cfg(feature = "http-server")]
pub mod http;
