// Kramer - terminal chat client for a PM agent running in a sprite
// Library exports

pub mod artifact;
pub mod cli;
pub mod clipboard;
pub mod config;
pub mod logging;
pub mod render;
pub mod turn;
