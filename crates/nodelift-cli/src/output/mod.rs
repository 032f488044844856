//! Terminal output formatting

pub mod colors;
pub mod errors;

/// Output handler for consistent terminal formatting
///
/// Results go to stdout so they can be piped; status lines go to stderr.
pub struct OutputHandler {
    colors: colors::ColorSupport,
}

impl OutputHandler {
    pub fn new() -> Self {
        Self {
            colors: colors::ColorSupport::detect(),
        }
    }

    /// Print command output
    pub fn print(&self, message: &str) {
        println!("{}", message);
    }

    pub fn info(&self, message: &str) {
        eprintln!("{}", self.colors.dim(message));
    }

    pub fn success(&self, message: &str) {
        eprintln!("{} {}", self.colors.green("✓"), message);
    }

    pub fn warn(&self, message: &str) {
        eprintln!("{} {}", self.colors.yellow("⚠"), message);
    }

    pub fn error(&self, message: &str) {
        eprintln!("{} {}", self.colors.red("✗"), message);
    }

    /// Print a labelled step
    pub fn step(&self, label: &str, message: &str) {
        eprintln!("{} {}", self.colors.bold(label), message);
    }
}

impl Default for OutputHandler {
    fn default() -> Self {
        Self::new()
    }
}
