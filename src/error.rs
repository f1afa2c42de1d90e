use camino::Utf8PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Manifest(#[from] ManifestError),

    #[error(transparent)]
    Build(#[from] BuildError),

    #[error(transparent)]
    Watch(#[from] WatchError),
}

/// Fatal at startup; the manifest is read-only for the rest of the process
/// lifetime, so nothing recovers from a malformed one.
#[derive(Debug, Error)]
pub enum ManifestError {
    #[error("Couldn't read manifest '{0}'.\n{1}")]
    Read(Utf8PathBuf, std::io::Error),

    #[error("Couldn't parse manifest.\n{0}")]
    Parse(#[from] toml::de::Error),

    #[error("Group '{0}' has no sources")]
    EmptySources(String),

    #[error("Group '{0}' declares no output filename")]
    MissingOutput(String),

    #[error("Group '{0}' must have exactly one entry point")]
    BundleEntry(String),
}

#[derive(Debug, Error)]
pub enum BuildError {
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Task '{0}':\n{1}")]
    Task(String, anyhow::Error),

    #[error("{0} task(s) failed")]
    Failed(usize),
}

#[derive(Debug, Error)]
pub enum WatchError {
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Notify(#[from] notify::Error),
}

#[derive(Debug, Error)]
pub enum EsbuildError {
    #[error("Couldn't launch esbuild. Is it installed and on PATH?\n{0}")]
    Spawn(std::io::Error),

    #[error("Couldn't pipe data through esbuild.\n{0}")]
    Pipe(std::io::Error),

    #[error("esbuild failed:\n{0}")]
    Failed(String),
}
