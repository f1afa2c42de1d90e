//! Bundle chain: whole-module bundling from a single entry point, as an
//! immediately-invoked bundle. No concatenation, no banners.

use anyhow::Context;

use crate::{BuildOptions, Mode};
use crate::manifest::GroupSpec;
use crate::resolve::ResolvedSource;

use super::{Artifact, esbuild, output_filename};

pub(crate) fn run(
    spec: &GroupSpec,
    sources: &[ResolvedSource],
    options: &BuildOptions,
) -> anyhow::Result<Artifact> {
    let output = output_filename(spec)?;
    let entry = sources.first().context("bundle group has no entry point")?;

    let args = arguments(spec, entry, options.mode);
    let data = esbuild(&args, None) //
        .with_context(|| format!("Couldn't bundle '{}'", entry.path))?;

    Ok(Artifact {
        path: options.dest_root.join(output),
        data,
    })
}

fn arguments(spec: &GroupSpec, entry: &ResolvedSource, mode: Mode) -> Vec<String> {
    let mut args = vec![
        entry.path.as_str().to_owned(),
        "--bundle".to_owned(),
        "--format=iife".to_owned(),
    ];

    if let Some(name) = &spec.name {
        args.push(format!("--global-name={name}"));
    }
    if let Some(factory) = &spec.jsx_factory {
        args.push(format!("--jsx-factory={factory}"));
    }

    match mode {
        Mode::Debug => args.push("--sourcemap=inline".to_owned()),
        _ => args.push("--minify-whitespace".to_owned()),
    }

    args
}
