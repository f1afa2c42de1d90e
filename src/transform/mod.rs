//! Per-category transform chains.
//!
//! Each manifest category maps to exactly one [`Chain`] variant, selected
//! once at task-generation time. Every variant exposes the same contract:
//! resolved sources in, fully built in-memory artifacts out. Writing is the
//! caller's job, so a failing chain never leaves a truncated file behind.

mod bundle;
mod patch;
mod scripts;
mod statics;
mod styles;
mod templates;

use std::io::Write;
use std::process::{Command, Stdio};

use anyhow::Context;
use camino::Utf8PathBuf;

use crate::BuildOptions;
use crate::error::EsbuildError;
use crate::manifest::{Category, GroupSpec};
use crate::resolve::ResolvedSource;

pub(crate) use patch::PatchSet;

/// A fully built output file: target path plus content buffer.
#[derive(Debug)]
pub struct Artifact {
    pub path: Utf8PathBuf,
    pub data: Vec<u8>,
}

/// The closed set of transform chains, one per manifest category.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Chain {
    Scripts,
    Styles,
    Templates,
    Bundle,
    Static,
}

impl Chain {
    pub(crate) fn select(category: Category) -> Self {
        match category {
            Category::Scripts => Chain::Scripts,
            Category::Styles => Chain::Styles,
            Category::Templates => Chain::Templates,
            Category::Bundles => Chain::Bundle,
            Category::Static => Chain::Static,
        }
    }

    pub(crate) fn run(
        self,
        spec: &GroupSpec,
        sources: &[ResolvedSource],
        options: &BuildOptions,
    ) -> anyhow::Result<Vec<Artifact>> {
        match self {
            Chain::Scripts => scripts::run(spec, sources, options).map(|a| vec![a]),
            Chain::Styles => styles::run(spec, sources, options).map(|a| vec![a]),
            Chain::Templates => templates::run(spec, sources, options).map(|a| vec![a]),
            Chain::Bundle => bundle::run(spec, sources, options).map(|a| vec![a]),
            Chain::Static => statics::run(spec, sources, options),
        }
    }
}

/// Read one source fragment. A missing file was already warned about at
/// resolution time and becomes a gap in the artifact; any other read failure
/// is a hard error for the task.
fn read_fragment(source: &ResolvedSource) -> anyhow::Result<Option<String>> {
    if !source.path.exists() {
        return Ok(None);
    }

    let text = std::fs::read_to_string(&source.path)
        .with_context(|| format!("Couldn't read '{}'", source.path))?;

    Ok(Some(text))
}

/// The artifact filename, guaranteed by manifest validation for every
/// category that produces one.
fn output_filename(spec: &GroupSpec) -> anyhow::Result<&str> {
    spec.output
        .as_deref()
        .context("group declares no output filename")
}

/// Pipe data through the `esbuild` executable.
fn esbuild(args: &[String], input: Option<&[u8]>) -> Result<Vec<u8>, EsbuildError> {
    let mut command = Command::new("esbuild");
    command
        .args(args)
        .stdin(if input.is_some() {
            Stdio::piped()
        } else {
            Stdio::null()
        })
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());

    let mut child = command.spawn().map_err(EsbuildError::Spawn)?;

    // Feed stdin from a separate thread so a filled stdout pipe can't
    // deadlock the exchange on large artifacts.
    let writer = match (input, child.stdin.take()) {
        (Some(input), Some(mut stdin)) => {
            let input = input.to_vec();
            Some(std::thread::spawn(move || stdin.write_all(&input)))
        }
        _ => None,
    };

    let output = child.wait_with_output().map_err(EsbuildError::Pipe)?;

    // Report the tool's own failure first; a broken stdin pipe is just its
    // symptom.
    if !output.status.success() {
        return Err(EsbuildError::Failed(
            String::from_utf8_lossy(&output.stderr).into_owned(),
        ));
    }

    if let Some(writer) = writer {
        writer
            .join()
            .unwrap_or_else(|_| Err(std::io::Error::other("stdin writer panicked")))
            .map_err(EsbuildError::Pipe)?;
    }

    Ok(output.stdout)
}
