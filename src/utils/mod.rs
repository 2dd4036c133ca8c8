//! Utility functions and helpers.
//!
//! # Submodules
//!
//! - [`paths`]: Lexical path handling, relative link targets, directory and
//!   symlink creation
//!
//! # Examples
//!
//! ```
//! use clasy::utils::paths::{join_under, relative_link_target};
//! use std::path::{Path, PathBuf};
//!
//! let link = join_under(Path::new("/dst/photos"), "beach.jpg").unwrap();
//! let target = relative_link_target(link.parent().unwrap(), Path::new("/src/beach.jpg"));
//! assert_eq!(target, Some(PathBuf::from("../../src/beach.jpg")));
//! ```

/// Path manipulation and filesystem helpers
pub mod paths;

/// Reads a yes/no answer from `reader`.
///
/// Only answers starting with `y` or `Y` count as yes. An empty line is no.
///
/// # Errors
///
/// Returns an error if the reader fails or reaches end of input before a
/// line is read.
pub fn confirm<R: std::io::BufRead>(mut reader: R) -> anyhow::Result<bool> {
    let mut line = String::new();
    if reader.read_line(&mut line)? == 0 {
        anyhow::bail!("No answer given (end of input)");
    }
    Ok(line.trim().to_uppercase().starts_with('Y'))
}
