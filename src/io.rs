use std::fmt::Display;
use std::fs;
use std::time::Instant;

use console::Style;

use crate::transform::Artifact;

const ANSI_BLUE: Style = Style::new().blue();

pub(crate) fn as_overhead(s: Instant) -> impl Display {
    let e = Instant::now();
    let f = format!("(+{}ms)", e.duration_since(s).as_millis());
    ANSI_BLUE.apply_to(f)
}

/// Write a fully built artifact in a single step, creating parent
/// directories on demand.
pub(crate) fn write_artifact(artifact: &Artifact) -> std::io::Result<()> {
    if let Some(dir) = artifact.path.parent() {
        fs::create_dir_all(dir)?;
    }

    fs::write(&artifact.path, &artifact.data)
}
