// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Data model: point schema, per-frame annotations and session state.

pub mod annotation;
pub mod schema;
pub mod session;
