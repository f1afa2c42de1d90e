//! Template chain: marker-extension fragments are validated and precompiled
//! into registry-assignment script fragments, then concatenated like scripts.

use anyhow::Context;
use camino::Utf8Path;

use crate::BuildOptions;
use crate::concat::{Banner, Fragment, concat};
use crate::manifest::GroupSpec;
use crate::resolve::ResolvedSource;

use super::{Artifact, esbuild, output_filename, read_fragment};

/// Bootstrap line for the client-side template registry.
const REGISTRY_PRELUDE: &str = "window.JST = window.JST || {};\n";

pub(crate) fn run(
    spec: &GroupSpec,
    sources: &[ResolvedSource],
    options: &BuildOptions,
) -> anyhow::Result<Artifact> {
    let output = output_filename(spec)?;

    let mut fragments = Vec::new();
    for source in sources {
        let Some(text) = read_fragment(source)? else {
            continue;
        };

        let text = match source.path.extension() {
            Some("jinja2" | "j2") => precompile(&source.path, &text)?,
            _ => text,
        };

        fragments.push(Fragment {
            origin: Some(source.path.clone()),
            text,
        });
    }

    let mut joined = String::from(REGISTRY_PRELUDE);
    joined.push_str(&concat(&fragments, Banner::Line, !options.compress()));

    let data = if options.compress() && spec.compress {
        esbuild(
            &["--loader=js".into(), "--minify".into()],
            Some(joined.as_bytes()),
        )
        .context("Couldn't minify template artifact")?
    } else {
        joined.into_bytes()
    };

    Ok(Artifact {
        path: options.dest_root.join("jst").join(output),
        data,
    })
}

/// Validate a template and emit its registry assignment. A parse error here
/// fails the whole task.
fn precompile(path: &Utf8Path, text: &str) -> anyhow::Result<String> {
    let env = minijinja::Environment::new();
    env.template_from_str(text)
        .with_context(|| format!("Couldn't compile template '{path}'"))?;

    let stem = path.file_stem().unwrap_or("?");
    Ok(format!(
        "window.JST[{}] = {};\n",
        serde_json::to_string(stem)?,
        serde_json::to_string(text)?,
    ))
}
