pub mod paths;
pub mod platform;
pub mod progress;

// Re-export commonly used types
pub use platform::Platform;
