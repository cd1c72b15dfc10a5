//! Subtitle generation: segments from ASR or a TTS manifest, ASS output,
//! and burn-in with FFmpeg.

pub mod ass;
pub mod burn;
pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod manifest;
pub mod recognize;
pub mod segment;

pub use cli::SubtitleCommands;
pub use commands::{CommandContext, Outcome, handle_subtitle_command};
pub use config::SubtitleConfig;
pub use error::SubtitleError;
