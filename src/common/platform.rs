//! Host platform selection.
//!
//! Resolved once in `main` and handed to everything that has
//! platform-dependent defaults, so formatting code never inspects the host.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    MacOs,
    Windows,
    Linux,
    Other,
}

impl Platform {
    pub fn current() -> Self {
        if cfg!(target_os = "macos") {
            Platform::MacOs
        } else if cfg!(target_os = "windows") {
            Platform::Windows
        } else if cfg!(target_os = "linux") {
            Platform::Linux
        } else {
            Platform::Other
        }
    }

    /// CJK-capable font family that ships with the platform.
    pub fn default_cjk_font(self) -> &'static str {
        match self {
            Platform::MacOs => "PingFang SC",
            _ => "SimHei",
        }
    }
}
