// Copyright 2026 Mapscout Contributors
// SPDX-License-Identifier: Apache-2.0

//! Mapscout library: spatial address scanning over an interactive web map.
//!
//! This library crate exposes the core modules for integration testing.

pub mod capture;
pub mod cli;
pub mod geodesy;
pub mod progress;
pub mod records;
pub mod renderer;
pub mod scan;
pub mod setops;
