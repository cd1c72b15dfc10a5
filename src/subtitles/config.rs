use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::common::Platform;
use crate::common::paths;

use super::ass::AssStyle;
use super::burn::BurnOptions;
use super::recognize::{BackendPreference, Device, ModelSize, RecognitionParams};

/// Persistent defaults, stored as TOML (`subburn.toml`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SubtitleConfig {
    pub style: StyleConfig,
    pub burn: BurnOptions,
    pub recognition: RecognitionConfig,
}

/// Subtitle look. Colours use the ASS `&HAABBGGRR` notation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StyleConfig {
    pub play_res_x: u32,
    pub play_res_y: u32,
    /// Font family; unset picks a CJK-capable font for the host platform
    pub font_name: Option<String>,
    pub font_size: u32,
    pub primary_colour: String,
    pub secondary_colour: String,
    pub outline_colour: String,
    pub back_colour: String,
    pub bold: bool,
    pub italic: bool,
    pub border_style: u8,
    pub outline: f64,
    pub shadow: f64,
    pub alignment: u8,
    pub margin_l: u32,
    pub margin_r: u32,
    pub margin_v: u32,
    pub encoding: u32,
}

impl Default for StyleConfig {
    fn default() -> Self {
        // Platform only affects the font, which stays unset here
        let style = AssStyle::for_platform(Platform::Other);
        Self {
            play_res_x: style.play_res_x,
            play_res_y: style.play_res_y,
            font_name: None,
            font_size: style.font_size,
            primary_colour: style.primary_colour,
            secondary_colour: style.secondary_colour,
            outline_colour: style.outline_colour,
            back_colour: style.back_colour,
            bold: style.bold,
            italic: style.italic,
            border_style: style.border_style,
            outline: style.outline,
            shadow: style.shadow,
            alignment: style.alignment,
            margin_l: style.margin_l,
            margin_r: style.margin_r,
            margin_v: style.margin_v,
            encoding: style.encoding,
        }
    }
}

impl StyleConfig {
    /// Build the ASS style, resolving the font for `platform` when unset.
    pub fn resolve(&self, platform: Platform) -> AssStyle {
        let font_name = self
            .font_name
            .as_deref()
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .unwrap_or_else(|| platform.default_cjk_font())
            .to_string();

        AssStyle {
            play_res_x: self.play_res_x,
            play_res_y: self.play_res_y,
            font_name,
            font_size: self.font_size,
            primary_colour: self.primary_colour.clone(),
            secondary_colour: self.secondary_colour.clone(),
            outline_colour: self.outline_colour.clone(),
            back_colour: self.back_colour.clone(),
            bold: self.bold,
            italic: self.italic,
            border_style: self.border_style,
            outline: self.outline,
            shadow: self.shadow,
            alignment: self.alignment,
            margin_l: self.margin_l,
            margin_r: self.margin_r,
            margin_v: self.margin_v,
            encoding: self.encoding,
        }
    }

    /// Replace values the ASS renderer cannot use with defaults.
    fn sanitize(&mut self) {
        let defaults = Self::default();
        if self.play_res_x == 0 || self.play_res_y == 0 {
            self.play_res_x = defaults.play_res_x;
            self.play_res_y = defaults.play_res_y;
        }
        if self.font_size == 0 {
            self.font_size = defaults.font_size;
        }
        if !self.outline.is_finite() || self.outline < 0.0 {
            self.outline = defaults.outline;
        }
        if !self.shadow.is_finite() || self.shadow < 0.0 {
            self.shadow = defaults.shadow;
        }
        if !(1..=9).contains(&self.alignment) {
            self.alignment = defaults.alignment;
        }
        // Commas would shift every positional field that follows
        if let Some(font) = &self.font_name
            && font.contains(',')
        {
            self.font_name = None;
        }
        for (colour, default) in [
            (&mut self.primary_colour, defaults.primary_colour),
            (&mut self.secondary_colour, defaults.secondary_colour),
            (&mut self.outline_colour, defaults.outline_colour),
            (&mut self.back_colour, defaults.back_colour),
        ] {
            if colour.contains(',') {
                *colour = default;
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecognitionConfig {
    /// Which recognizer to use (auto, whisperx, whisper)
    pub backend: BackendPreference,
    pub model: ModelSize,
    pub device: Device,
    /// Precision mode, honoured by WhisperX only
    pub compute_type: String,
    pub word_timestamps: bool,
    /// Language hint; unset means auto-detect
    pub language: Option<String>,
}

impl Default for RecognitionConfig {
    fn default() -> Self {
        let params = RecognitionParams::default();
        Self {
            backend: BackendPreference::default(),
            model: params.model,
            device: params.device,
            compute_type: params.compute_type,
            word_timestamps: params.word_timestamps,
            language: params.language,
        }
    }
}

impl RecognitionConfig {
    pub fn params(&self) -> RecognitionParams {
        RecognitionParams {
            model: self.model,
            device: self.device,
            compute_type: self.compute_type.clone(),
            language: self.language.clone(),
            word_timestamps: self.word_timestamps,
        }
    }
}

impl SubtitleConfig {
    pub fn default_path() -> Result<PathBuf> {
        paths::subburn_config_path()
    }

    /// Read the config at `path`. A missing file yields defaults without
    /// touching the disk; see [`SubtitleConfig::save_default_if_missing`].
    pub fn load_from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)
            .with_context(|| format!("reading subburn config from {}", path.display()))?;
        let mut config: Self = toml::from_str(&contents)
            .with_context(|| format!("parsing subburn config {}", path.display()))?;
        config.style.sanitize();
        Ok(config)
    }

    /// Write the default config to `path` unless a file is already there.
    /// Returns whether a file was written.
    pub fn save_default_if_missing(path: impl AsRef<Path>) -> Result<bool> {
        let path = path.as_ref();
        if path.exists() {
            return Ok(false);
        }
        Self::default().save_to_path(path)?;
        Ok(true)
    }

    pub fn save_to_path(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("creating config directory {}", parent.display()))?;
        }

        let toml = toml::to_string_pretty(self).context("serializing subburn config")?;
        fs::write(path, toml)
            .with_context(|| format!("writing subburn config to {}", path.display()))?;
        Ok(())
    }
}
