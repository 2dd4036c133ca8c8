use crate::ClasyContext;
use crate::manifest::Manifest;
use crate::output;
use anyhow::{Context, Result};
use std::fs::OpenOptions;
use std::io::{BufWriter, ErrorKind, Write};

/// Write the skeleton manifest to `writer`
///
/// # Errors
///
/// Returns an error if serialization or the write fails.
pub fn write_template<W: Write>(writer: W) -> Result<()> {
    Manifest::template().to_writer(writer)
}

/// Write the skeleton manifest to the manifest path, or to stdout
///
/// An existing manifest is only replaced with `force`.
///
/// # Errors
///
/// Returns an error if:
/// - The manifest file already exists and `force` is not set
/// - The file cannot be created or written
pub fn execute(ctx: &ClasyContext, to_stdout: bool, force: bool) -> Result<()> {
    if to_stdout {
        return write_template(std::io::stdout().lock());
    }

    let path = &ctx.manifest_path;
    let mut options = OpenOptions::new();
    options.write(true);
    if force {
        options.create(true).truncate(true);
    } else {
        options.create_new(true);
    }

    let file = match options.open(path) {
        Ok(file) => file,
        Err(e) if e.kind() == ErrorKind::AlreadyExists => {
            anyhow::bail!(
                "{} already exists, use --force to overwrite it",
                path.display()
            );
        }
        Err(e) => {
            return Err(e).with_context(|| format!("Failed to create {}", path.display()));
        }
    };

    write_template(BufWriter::new(file))
        .with_context(|| format!("Failed to write {}", path.display()))?;

    output::success(&format!("Wrote manifest template to {}", path.display()));
    Ok(())
}
