// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Keypoint Annotator
//!
//! A cross-platform desktop client for placing named skeleton keypoints on
//! video frames served by an annotation server, and saving them back.

mod app;
mod config;
mod error;
mod io;
mod models;
mod ui;
mod util;

use anyhow::{Context, Result};
use app::AnnotatorApp;
use config::AnnotatorConfig;
use io::client::AnnotationClient;
use io::worker::Worker;

fn main() -> Result<()> {
    // A missing .env file is fine
    dotenvy::dotenv().ok();

    // Initialize logging
    env_logger::init();

    let config = AnnotatorConfig::from_env().context("Invalid configuration")?;
    log::info!(
        "Annotation server {}, schema '{}', {} videos",
        config.server_url,
        config.schema_key,
        config.videos.len()
    );

    let client = AnnotationClient::new(&config).context("Failed to build HTTP client")?;

    // Configure egui options
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1280.0, 800.0])
            .with_min_inner_size([800.0, 600.0])
            .with_title("Keypoint Annotator"),
        ..Default::default()
    };

    let AnnotatorConfig {
        server_url, videos, ..
    } = config;

    // Run the application
    eframe::run_native(
        "Keypoint Annotator",
        options,
        Box::new(move |cc| {
            let worker = Worker::new(client, Some(cc.egui_ctx.clone()));
            Ok(Box::new(AnnotatorApp::new(worker, videos, server_url)))
        }),
    )
    .map_err(|e| anyhow::anyhow!("Application error: {}", e))?;

    Ok(())
}
