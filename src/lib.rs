#![warn(clippy::all, rust_2018_idioms)]

pub mod app;
pub mod bridge;
pub mod canvas;
pub mod command;
pub mod components;
pub mod config;
pub mod data_url;
pub mod document;
pub mod element;
pub mod error;
pub mod event;
pub mod export;
pub mod file_handler;
pub mod geometry;
pub mod gizmo;
pub mod input;
pub mod panels;
pub mod renderer;
pub mod selection;
pub mod state;
pub mod texture_manager;
pub mod tools;
pub mod util;
pub mod widgets;

pub use app::ScreenshotApp;
pub use canvas::CanvasHost;
pub use command::Command;
pub use config::EditorConfig;
pub use document::Document;
pub use element::{Shape, ShapeId, ToolKind};
pub use export::ExportPipeline;
pub use renderer::Renderer;
pub use state::EditorState;
pub use tools::ToolController;
