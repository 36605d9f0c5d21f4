//! Output formatting
//!
//! Everything here goes to standard error; standard output is left to the
//! builder.

use tracing::level_filters::LevelFilter;

/// Status message prefixes
pub mod status {
    /// Error prefix (red X)
    pub const ERROR: &str = "✗";
}

/// Log level for a `-v` count
pub fn verbosity_level(verbose: u8) -> LevelFilter {
    match verbose {
        0 => LevelFilter::WARN,
        1 => LevelFilter::INFO,
        _ => LevelFilter::DEBUG,
    }
}

/// Render an error and its causes, one per line
pub fn format_error(err: &anyhow::Error) -> String {
    let mut out = format!("{} Error: {err}", status::ERROR);
    for cause in err.chain().skip(1) {
        out.push_str(&format!("\n  Caused by: {cause}"));
    }
    out
}

/// Print an error and its causes to standard error
pub fn display_error(err: &anyhow::Error) {
    eprintln!("{}", format_error(err));
}
