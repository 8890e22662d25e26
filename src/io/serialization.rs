// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Annotation export.
//!
//! This module writes the current video's annotations, together with the
//! schema they were made against, to YAML or JSON files. CSV exports carry
//! the points only, one row per point.

use crate::models::annotation::FrameAnnotations;
use crate::models::schema::PointSchema;
use crate::models::session::SessionState;
use anyhow::{bail, Result};
use serde::Serialize;
use std::path::Path;

/// Everything written to an export file.
#[derive(Debug, Clone, Serialize)]
pub struct ExportDocument {
    pub video: Option<String>,
    pub schema: Option<PointSchema>,
    pub interpolated: bool,
    pub annotations: FrameAnnotations,
}

impl ExportDocument {
    /// Snapshot the session, optionally filling gaps between keyframes.
    pub fn from_session(session: &SessionState, interpolate: bool) -> Self {
        let annotations = if interpolate {
            session.annotations().interpolate()
        } else {
            session.annotations().clone()
        };

        Self {
            video: session.video().map(str::to_string),
            schema: session.schema().cloned(),
            interpolated: interpolate,
            annotations,
        }
    }
}

/// Export to YAML format.
pub fn export_yaml(doc: &ExportDocument, path: &Path) -> Result<()> {
    let yaml = serde_yaml::to_string(doc)?;
    std::fs::write(path, yaml)?;
    Ok(())
}

/// Export to JSON format.
pub fn export_json(doc: &ExportDocument, path: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(doc)?;
    std::fs::write(path, json)?;
    Ok(())
}

/// Quote a CSV field if it contains a comma, quote or line break.
fn csv_escape(value: &str) -> String {
    if value.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

/// Render annotations as `frame,point_name,x,y` rows, frames ascending.
pub fn annotations_to_csv(annotations: &FrameAnnotations) -> String {
    let mut csv = String::from("frame,point_name,x,y\n");
    for (frame, points) in annotations.iter() {
        for point in points {
            csv.push_str(&format!(
                "{},{},{},{}\n",
                frame,
                csv_escape(&point.name),
                point.x,
                point.y
            ));
        }
    }
    csv
}

/// Export to CSV format.
pub fn export_csv(doc: &ExportDocument, path: &Path) -> Result<()> {
    std::fs::write(path, annotations_to_csv(&doc.annotations))?;
    Ok(())
}

/// Export, picking the format from the file extension.
pub fn export(doc: &ExportDocument, path: &Path) -> Result<()> {
    match path.extension().and_then(|s| s.to_str()) {
        Some("yaml") | Some("yml") => export_yaml(doc, path),
        Some("json") => export_json(doc, path),
        Some("csv") => export_csv(doc, path),
        other => bail!("Unsupported file extension: {:?}", other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::annotation::AnnotatedPoint;
    use crate::models::schema::PointSpec;
    use crate::models::session::{Request, VideoInfo};

    /// Head and tail on frames 0 and 4 of a ten frame video.
    fn annotated_session() -> SessionState {
        let mut session = SessionState::new();
        session.set_schema(
            PointSchema::new(vec![PointSpec::new("head", "red"), PointSpec::new("tail", "blue")]).unwrap(),
        );
        if let Request::LoadVideo { ticket, .. } = session.select_video("/data/fly1.mp4") {
            session.apply_video_info(ticket, VideoInfo { total_frames: Some(10) });
        }
        session.place_point(0.0, 0.0).unwrap();
        session.place_point(4.0, 0.0).unwrap();
        session.set_frame(4);
        session.place_point(8.0, 8.0).unwrap();
        session.place_point(12.0, 8.5).unwrap();
        session
    }

    #[test]
    fn test_export_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fly1.json");
        export(&ExportDocument::from_session(&annotated_session(), false), &path).unwrap();

        let value: serde_json::Value = serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(value["video"], "/data/fly1.mp4");
        assert_eq!(value["schema"]["points"][1]["name"], "tail");
        assert_eq!(value["annotations"]["0"], serde_json::json!([["head", 0.0, 0.0], ["tail", 4.0, 0.0]]));
        assert_eq!(value["annotations"]["4"], serde_json::json!([["head", 8.0, 8.0], ["tail", 12.0, 8.5]]));
    }

    #[test]
    fn test_export_yaml_interpolated() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fly1.yaml");
        let doc = ExportDocument::from_session(&annotated_session(), true);
        export(&doc, &path).unwrap();

        let value: serde_yaml::Value = serde_yaml::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(value["interpolated"], serde_yaml::Value::Bool(true));
        assert_eq!(doc.annotations.summary().annotated_frames, 5);
        assert_eq!(
            doc.annotations.points(2),
            &[AnnotatedPoint::new("head", 4.0, 4.0), AnnotatedPoint::new("tail", 8.0, 4.0)]
        );
    }

    #[test]
    fn test_export_csv_rows() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fly1_annotations.csv");
        export(&ExportDocument::from_session(&annotated_session(), false), &path).unwrap();

        assert_eq!(
            std::fs::read_to_string(&path).unwrap(),
            "frame,point_name,x,y\n0,head,0,0\n0,tail,4,0\n4,head,8,8\n4,tail,12,8.5\n"
        );
    }

    #[test]
    fn test_csv_quotes_awkward_names() {
        let mut annotations = FrameAnnotations::new();
        annotations.push(7, AnnotatedPoint::new("wing, left", 1.0, 2.0));
        annotations.push(7, AnnotatedPoint::new("say \"hi\"", 3.0, 4.0));

        assert_eq!(
            annotations_to_csv(&annotations),
            "frame,point_name,x,y\n7,\"wing, left\",1,2\n7,\"say \"\"hi\"\"\",3,4\n"
        );
    }

    #[test]
    fn test_empty_csv_has_header_only() {
        assert_eq!(annotations_to_csv(&FrameAnnotations::new()), "frame,point_name,x,y\n");
    }

    #[test]
    fn test_unsupported_extension() {
        let dir = tempfile::tempdir().unwrap();
        let doc = ExportDocument::from_session(&SessionState::new(), false);
        assert!(export(&doc, &dir.path().join("out.txt")).is_err());
    }
}
