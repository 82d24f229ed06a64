//! Metric file output.

use camino::Utf8Path;
use std::fs::{self, File};
use std::io::{self, Write};

/// Write `content` to `path` so readers never see a partial file.
///
/// The content goes to a hidden sibling first and is renamed over the
/// target, which keeps the node_exporter textfile collector from scraping a
/// half-written exposition.
pub fn write_atomic(path: &Utf8Path, content: &str) -> io::Result<()> {
    let parent = match path.parent() {
        Some(p) if !p.as_str().is_empty() => p,
        _ => Utf8Path::new("."),
    };
    let file_name = path.file_name().ok_or_else(|| {
        io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("output path has no file name: {}", path),
        )
    })?;
    let temp_path = parent.join(format!(".{}.tmp", file_name));

    let mut file = File::create(&temp_path)?;
    file.write_all(content.as_bytes())?;
    file.sync_all()?;
    drop(file);

    if let Err(e) = fs::rename(&temp_path, path) {
        let _ = fs::remove_file(&temp_path);
        return Err(e);
    }
    Ok(())
}

/// Write to `path`, or stdout when there is none.
pub fn emit(path: Option<&Utf8Path>, content: &str) -> io::Result<()> {
    match path {
        Some(path) => write_atomic(path, content),
        None => {
            let mut stdout = io::stdout().lock();
            stdout.write_all(content.as_bytes())?;
            stdout.flush()
        }
    }
}
