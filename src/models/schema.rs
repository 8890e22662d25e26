// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Point schema definitions.
//!
//! A schema is the ordered set of named skeleton keypoints to annotate.
//! The order drives which point the next click places.

use crate::error::SchemaError;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// One named keypoint and its display color.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PointSpec {
    pub name: String,
    pub color: String,
}

impl PointSpec {
    pub fn new(name: impl Into<String>, color: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            color: color.into(),
        }
    }
}

/// Ordered, non-empty list of points with unique names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PointSchema {
    points: Vec<PointSpec>,
}

/// Body stored under the schema key of the server response.
#[derive(Debug, Deserialize)]
struct SchemaBody {
    points: Vec<PointSpec>,
}

impl PointSchema {
    /// Build a schema, rejecting empty lists and duplicate names.
    pub fn new(points: Vec<PointSpec>) -> Result<Self, SchemaError> {
        if points.is_empty() {
            return Err(SchemaError::Empty);
        }
        let mut seen = HashSet::new();
        for point in &points {
            if !seen.insert(point.name.as_str()) {
                return Err(SchemaError::DuplicateName(point.name.clone()));
            }
        }
        Ok(Self { points })
    }

    /// Decode a schema response of the form `{ "<key>": { "points": [...] } }`.
    ///
    /// Other top-level entries are ignored, so a server config that carries
    /// several subjects can share one endpoint.
    pub fn from_response(json: &str, key: &str) -> Result<Self, SchemaError> {
        let mut subjects: HashMap<String, serde_json::Value> = serde_json::from_str(json)?;
        let body = subjects
            .remove(key)
            .ok_or_else(|| SchemaError::MissingKey(key.to_string()))?;
        let body: SchemaBody = serde_json::from_value(body)?;
        Self::new(body.points)
    }

    pub fn points(&self) -> &[PointSpec] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Look up a point by name.
    pub fn find(&self, name: &str) -> Option<&PointSpec> {
        self.points.iter().find(|p| p.name == name)
    }

    pub fn names(&self) -> Vec<&str> {
        self.points.iter().map(|p| p.name.as_str()).collect()
    }
}
