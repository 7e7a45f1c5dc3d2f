// Presentation layer - HTTP handlers and page rendering
pub mod app_state;
pub mod charts;
pub mod handlers;
pub mod renderer;
