//! ASS (Advanced SubStation Alpha) file format generation.
//!
//! Generates ASS subtitle files for burning into video with FFmpeg.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::common::Platform;

use super::error::SubtitleError;
use super::segment::Segment;

/// Name of the single style every dialogue line references.
pub const STYLE_NAME: &str = "Default";

const STYLE_FORMAT: &str = "Format: Name, Fontname, Fontsize, PrimaryColour, SecondaryColour, OutlineColour, BackColour, Bold, Italic, BorderStyle, Outline, Shadow, Alignment, MarginL, MarginR, MarginV, Encoding";
const EVENTS_FORMAT: &str =
    "Format: Layer, Start, End, Style, Name, MarginL, MarginR, MarginV, Effect, Text";

/// Style configuration for ASS subtitles.
#[derive(Debug, Clone, PartialEq)]
pub struct AssStyle {
    /// Script canvas width (PlayResX)
    pub play_res_x: u32,
    /// Script canvas height (PlayResY)
    pub play_res_y: u32,
    /// Font name
    pub font_name: String,
    /// Font size in script pixels
    pub font_size: u32,
    /// Primary color in AABBGGRR format (e.g., &H00FFFFFF for white)
    pub primary_colour: String,
    /// Secondary color in AABBGGRR format (used for karaoke unsung part)
    pub secondary_colour: String,
    /// Outline color in AABBGGRR format
    pub outline_colour: String,
    /// Background/shadow color in AABBGGRR format
    pub back_colour: String,
    pub bold: bool,
    pub italic: bool,
    /// 1 = outline + drop shadow, 3 = opaque box
    pub border_style: u8,
    /// Outline width in pixels
    pub outline: f64,
    /// Shadow depth in pixels
    pub shadow: f64,
    /// Alignment (numpad layout: 1-3=bottom, 4-6=mid, 7-9=top)
    pub alignment: u8,
    /// Left margin in pixels
    pub margin_l: u32,
    /// Right margin in pixels
    pub margin_r: u32,
    /// Vertical margin in pixels (distance from bottom for bottom-aligned)
    pub margin_v: u32,
    /// Font charset selector
    pub encoding: u32,
}

impl AssStyle {
    pub const DEFAULT_PLAY_RES: (u32, u32) = (1920, 1080);

    /// White text with a black outline, bottom-center, 1080p canvas.
    pub fn for_platform(platform: Platform) -> Self {
        Self {
            play_res_x: Self::DEFAULT_PLAY_RES.0,
            play_res_y: Self::DEFAULT_PLAY_RES.1,
            font_name: platform.default_cjk_font().to_string(),
            font_size: 80,
            primary_colour: "&H00FFFFFF".to_string(),
            secondary_colour: "&H000000FF".to_string(),
            outline_colour: "&H00000000".to_string(),
            back_colour: "&H00000000".to_string(),
            bold: false,
            italic: false,
            border_style: 1,
            outline: 2.5,
            shadow: 1.0,
            alignment: 2, // Bottom-center
            margin_l: 10,
            margin_r: 10,
            margin_v: 40,
            encoding: 1,
        }
    }

    /// Format the style line for the ASS file.
    fn to_style_line(&self) -> String {
        format!(
            "Style: {name},{font},{size},{primary},{secondary},{outline},{back},{bold},{italic},{border},{outline_w},{shadow},{align},{ml},{mr},{mv},{encoding}",
            name = STYLE_NAME,
            font = self.font_name,
            size = self.font_size,
            primary = self.primary_colour,
            secondary = self.secondary_colour,
            outline = self.outline_colour,
            back = self.back_colour,
            bold = ass_flag(self.bold),
            italic = ass_flag(self.italic),
            border = self.border_style,
            outline_w = format_decimal(self.outline),
            shadow = format_decimal(self.shadow),
            align = self.alignment,
            ml = self.margin_l,
            mr = self.margin_r,
            mv = self.margin_v,
            encoding = self.encoding,
        )
    }
}

/// ASS booleans are -1 (true) / 0 (false).
fn ass_flag(value: bool) -> i8 {
    if value { -1 } else { 0 }
}

/// Decimal fields keep at least one fractional digit (2.5, 1.0).
fn format_decimal(value: f64) -> String {
    if value.is_finite() && value.fract() == 0.0 {
        format!("{:.1}", value)
    } else {
        format!("{}", value)
    }
}

/// Build the `[Script Info]`, `[V4+ Styles]` and `[Events]` header.
pub fn generate_ass_header(style: &AssStyle) -> String {
    format!(
        "[Script Info]\n\
         ScriptType: v4.00+\n\
         PlayResX: {x}\n\
         PlayResY: {y}\n\
         \n\
         [V4+ Styles]\n\
         {style_format}\n\
         {style_line}\n\
         \n\
         [Events]\n\
         {events_format}\n",
        x = style.play_res_x,
        y = style.play_res_y,
        style_format = STYLE_FORMAT,
        style_line = style.to_style_line(),
        events_format = EVENTS_FORMAT,
    )
}

/// Format one `Dialogue:` event line (without trailing newline).
pub fn format_dialogue(segment: &Segment) -> String {
    format!(
        "Dialogue: 0,{start},{end},{style},,0,0,0,,{text}",
        start = format_ass_timestamp(segment.start),
        end = format_ass_timestamp(segment.end),
        style = STYLE_NAME,
        text = escape_ass_text(&segment.text),
    )
}

/// Generate the complete ASS document. Segments are emitted in the order
/// given, without sorting or overlap correction.
pub fn generate_ass_file(segments: &[Segment], style: &AssStyle) -> String {
    let mut output = generate_ass_header(style);
    for segment in segments {
        output.push_str(&format_dialogue(segment));
        output.push('\n');
    }
    output
}

/// Write the ASS document to `path`, creating the parent directory.
///
/// The content goes to a temporary file next to the destination and is
/// renamed into place once fully written, so a failed write leaves no
/// partial document behind.
pub fn write_ass_file(
    segments: &[Segment],
    style: &AssStyle,
    path: &Path,
) -> Result<PathBuf, SubtitleError> {
    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    fs::create_dir_all(parent)
        .map_err(|_| SubtitleError::not_found("Subtitle directory", parent))?;

    let content = generate_ass_file(segments, style);

    let mut temp = temp_file_builder()
        .tempfile_in(parent)
        .map_err(|err| SubtitleError::io(parent, err))?;
    let written = temp
        .write_all(content.as_bytes())
        .and_then(|_| temp.flush());
    written.map_err(|err| SubtitleError::io(temp.path(), err))?;
    // Overwrites keep the existing document's permissions
    if let Ok(existing) = fs::metadata(path) {
        temp.as_file()
            .set_permissions(existing.permissions())
            .map_err(|err| SubtitleError::io(temp.path(), err))?;
    }
    temp.persist(path)
        .map_err(|err| SubtitleError::io(path, err.error))?;

    Ok(path.to_path_buf())
}

/// Temp file options giving a new document the mode a plain `fs::write`
/// would (0666 minus umask).
fn temp_file_builder() -> tempfile::Builder<'static, 'static> {
    let mut builder = tempfile::Builder::new();
    builder.prefix(".subburn-").suffix(".ass.tmp");
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        builder.permissions(fs::Permissions::from_mode(0o666));
    }
    builder
}

/// Whole centiseconds in `seconds`, truncated. The epsilon absorbs binary
/// representation error (0.29 * 100 = 28.999...) without rounding up values
/// like 59.999.
fn to_centiseconds(seconds: f64) -> u64 {
    const EPSILON: f64 = 1e-6;
    if !seconds.is_finite() || seconds <= 0.0 {
        return 0;
    }
    (seconds * 100.0 + EPSILON).floor() as u64
}

/// Format seconds as an ASS timestamp (H:MM:SS.cc).
pub fn format_ass_timestamp(seconds: f64) -> String {
    let total_cs = to_centiseconds(seconds);
    let hours = total_cs / 360_000;
    let minutes = (total_cs / 6_000) % 60;
    let secs = (total_cs / 100) % 60;
    let centiseconds = total_cs % 100;

    format!("{}:{:02}:{:02}.{:02}", hours, minutes, secs, centiseconds)
}

/// Escape special characters in ASS text.
///
/// Backslashes are doubled, braces are doubled so they cannot open an
/// override block, and line breaks become the hard break `\N`.
pub fn escape_ass_text(text: &str) -> String {
    text.trim()
        .replace("\r\n", "\n")
        .replace('\r', "\n")
        .replace('\\', "\\\\")
        .replace('{', "{{")
        .replace('}', "}}")
        .replace('\n', "\\N")
}
