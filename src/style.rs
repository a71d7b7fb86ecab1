//! Terminal styling utilities
//!
//! Consistent status markers for pipeline output.
//! Uses crossterm for cross-platform terminal colors.

use crossterm::style::{StyledContent, Stylize};

/// Success marker
pub fn ok() -> StyledContent<&'static str> {
    "✓".green()
}

/// Advisory warning marker
pub fn warn() -> StyledContent<&'static str> {
    "!".yellow()
}

/// Failure marker
pub fn fail() -> StyledContent<&'static str> {
    "✗".red()
}

/// Styled resource name
pub fn resource(name: &str) -> StyledContent<String> {
    name.to_string().cyan()
}

/// Styled sweep identifier
pub fn sweep_id(id: &str) -> StyledContent<String> {
    id.to_string().magenta().bold()
}

/// Deployed-count styling: green when all made it, yellow otherwise
pub fn deployed_count(deployed: usize, total: usize) -> StyledContent<String> {
    let label = format!("{}/{}", deployed, total);
    if deployed == total {
        label.green()
    } else {
        label.yellow()
    }
}
