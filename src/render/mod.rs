// Terminal rendering of agent replies

pub mod markdown;

pub use markdown::{render, render_body, render_with_border, strip_markdown, BORDER, WRAP_WIDTH};
