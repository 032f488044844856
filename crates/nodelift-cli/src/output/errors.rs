//! Error rendering with suggestions and the cause chain

use std::error::Error;

use nodelift_core::error::LiftError;

use super::colors::ColorSupport;

pub struct ErrorFormatter {
    colors: ColorSupport,
}

impl ErrorFormatter {
    pub fn new() -> Self {
        Self::with_colors(ColorSupport::detect())
    }

    pub fn with_colors(colors: ColorSupport) -> Self {
        Self { colors }
    }

    /// Render an error, its suggestion and its sources
    pub fn format_error(&self, error: &LiftError) -> String {
        let mut output = format!("{}: {}\n", self.colors.red("error"), error);

        let mut source = error.source();
        while let Some(err) = source {
            output.push_str(&format!("{}: {}\n", self.colors.dim("caused by"), err));
            source = err.source();
        }

        if let Some(suggestion) = error.suggestion() {
            output.push_str(&format!("{}: {}\n", self.colors.dim("help"), suggestion));
        }

        output
    }

    /// Render a per-file build error
    pub fn format_file_error(&self, file: &str, error: &LiftError) -> String {
        format!("{} {}: {}", self.colors.dim("-->"), file, error)
    }
}

impl Default for ErrorFormatter {
    fn default() -> Self {
        Self::new()
    }
}
