// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! I/O operations: the annotation server, frame decoding and file export.

pub mod client;
pub mod media;
pub mod serialization;
pub mod worker;
