// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Annotation data structures.
//!
//! This module defines named keypoints placed on frames and the per-frame
//! mapping the server stores for each video.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// A named point in pixel coordinates of the displayed frame.
///
/// Travels over the wire as a `[name, x, y]` triple.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "(String, f64, f64)", into = "(String, f64, f64)")]
pub struct AnnotatedPoint {
    pub name: String,
    pub x: f64,
    pub y: f64,
}

impl AnnotatedPoint {
    pub fn new(name: impl Into<String>, x: f64, y: f64) -> Self {
        Self {
            name: name.into(),
            x,
            y,
        }
    }
}

impl From<(String, f64, f64)> for AnnotatedPoint {
    fn from((name, x, y): (String, f64, f64)) -> Self {
        Self { name, x, y }
    }
}

impl From<AnnotatedPoint> for (String, f64, f64) {
    fn from(point: AnnotatedPoint) -> Self {
        (point.name, point.x, point.y)
    }
}

/// Totals over all annotated frames.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AnnotationSummary {
    pub annotated_frames: usize,
    pub total_points: usize,
}

/// Points per frame index, in placement order.
///
/// A frame with no entry has no points; callers never need to distinguish
/// that from an empty list.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FrameAnnotations {
    frames: BTreeMap<u32, Vec<AnnotatedPoint>>,
}

impl FrameAnnotations {
    pub fn new() -> Self {
        Self::default()
    }

    /// Points on `frame`, empty if none were placed.
    pub fn points(&self, frame: u32) -> &[AnnotatedPoint] {
        self.frames.get(&frame).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Append a point, creating the frame's list on first use.
    pub fn push(&mut self, frame: u32, point: AnnotatedPoint) {
        self.frames.entry(frame).or_default().push(point);
    }

    /// Remove the most recently placed point on `frame`.
    pub fn pop(&mut self, frame: u32) -> Option<AnnotatedPoint> {
        let points = self.frames.get_mut(&frame)?;
        let removed = points.pop();
        if points.is_empty() {
            self.frames.remove(&frame);
        }
        removed
    }

    pub fn is_empty(&self) -> bool {
        self.frames.values().all(Vec::is_empty)
    }

    /// Frames in ascending order with their points.
    pub fn iter(&self) -> impl Iterator<Item = (u32, &[AnnotatedPoint])> {
        self.frames.iter().map(|(frame, points)| (*frame, points.as_slice()))
    }

    /// Frames that hold at least one point. The server may send empty lists.
    fn annotated(&self) -> impl Iterator<Item = (&u32, &Vec<AnnotatedPoint>)> {
        self.frames.iter().filter(|(_, points)| !points.is_empty())
    }

    pub fn summary(&self) -> AnnotationSummary {
        AnnotationSummary {
            annotated_frames: self.annotated().count(),
            total_points: self.frames.values().map(Vec::len).sum(),
        }
    }

    /// Report missing and unexpected point names per annotated frame.
    pub fn validate(&self, expected: &[&str]) -> Vec<String> {
        let expected: BTreeSet<&str> = expected.iter().copied().collect();
        let mut errors = Vec::new();

        for (frame, points) in self.annotated() {
            let present: BTreeSet<&str> = points.iter().map(|p| p.name.as_str()).collect();
            let missing: Vec<&str> = expected.difference(&present).copied().collect();
            let extra: Vec<&str> = present.difference(&expected).copied().collect();

            if !missing.is_empty() {
                errors.push(format!("Frame {}: Missing points: {}", frame, missing.join(", ")));
            }
            if !extra.is_empty() {
                errors.push(format!("Frame {}: Unexpected points: {}", frame, extra.join(", ")));
            }
        }

        errors
    }

    /// Fill the frames between consecutive keyframes by linear interpolation.
    ///
    /// Points are paired by position in each keyframe's list; pairs whose
    /// names differ are skipped. Keyframes themselves are left untouched.
    pub fn interpolate(&self) -> FrameAnnotations {
        let mut result = self.clone();
        let keyframes: Vec<(&u32, &Vec<AnnotatedPoint>)> = self.annotated().collect();

        for pair in keyframes.windows(2) {
            let (&start, start_points) = pair[0];
            let (&end, end_points) = pair[1];
            let span = f64::from(end - start);

            for frame in start + 1..end {
                let t = f64::from(frame - start) / span;
                let points: Vec<AnnotatedPoint> = start_points
                    .iter()
                    .zip(end_points)
                    .filter(|(a, b)| a.name == b.name)
                    .map(|(a, b)| {
                        AnnotatedPoint::new(
                            a.name.clone(),
                            (a.x + t * (b.x - a.x)).trunc(),
                            (a.y + t * (b.y - a.y)).trunc(),
                        )
                    })
                    .collect();
                if !points.is_empty() {
                    result.frames.insert(frame, points);
                }
            }
        }

        result
    }
}
