//! Script chain: patch application, transpilation of marker-extension
//! sources, banner concatenation, optional minification.

use anyhow::Context;
use camino::Utf8Path;

use crate::BuildOptions;
use crate::concat::{Banner, Fragment, concat};
use crate::manifest::GroupSpec;
use crate::resolve::ResolvedSource;

use super::{Artifact, PatchSet, esbuild, output_filename, read_fragment};

pub(crate) fn run(
    spec: &GroupSpec,
    sources: &[ResolvedSource],
    options: &BuildOptions,
) -> anyhow::Result<Artifact> {
    let output = output_filename(spec)?;
    let patches = PatchSet::load(&options.patch_dir)?;

    let mut fragments = Vec::new();
    for source in sources {
        let Some(text) = read_fragment(source)? else {
            continue;
        };

        let text = patches.apply(&source.rel, text)?;
        let text = match source.path.extension() {
            Some("ts") => transpile(&source.path, &text)?,
            _ => text,
        };

        fragments.push(Fragment {
            origin: Some(source.path.clone()),
            text,
        });
    }

    let joined = concat(&fragments, Banner::Line, !options.compress());
    let data = if options.compress() && spec.compress {
        minify(&joined)?
    } else {
        joined.into_bytes()
    };

    Ok(Artifact {
        path: options.dest_root.join("js").join(output),
        data,
    })
}

/// Lower a `.ts` source to plain script, post-patching, via esbuild stdin.
fn transpile(path: &Utf8Path, text: &str) -> anyhow::Result<String> {
    let out = esbuild(&["--loader=ts".into()], Some(text.as_bytes()))
        .with_context(|| format!("Couldn't transpile '{path}'"))?;

    String::from_utf8(out).with_context(|| format!("Transpiled '{path}' is not UTF-8"))
}

fn minify(script: &str) -> anyhow::Result<Vec<u8>> {
    esbuild(
        &["--loader=js".into(), "--minify".into()],
        Some(script.as_bytes()),
    )
    .context("Couldn't minify script artifact")
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::Mode;
    use std::fs;

    #[test]
    fn plain_sources_concatenate_with_banners() {
        let dir = tempfile::tempdir().unwrap();
        let root = Utf8Path::from_path(dir.path()).unwrap();
        fs::write(root.join("shim.js"), "var shim;\n").unwrap();
        fs::write(root.join("app.js"), "var app;\n").unwrap();

        let spec = GroupSpec {
            sources: vec!["shim.js".into(), "app.js".into()],
            output: Some("general.js".into()),
            compress: true,
            ..GroupSpec::default()
        };
        let opts = BuildOptions {
            mode: Mode::Dev,
            source_root: root.to_owned(),
            dest_root: root.join("dist"),
            patch_dir: root.join("patches"),
        };
        let sources = crate::resolve::resolve_sources(root, &spec.sources);

        let artifact = run(&spec, &sources, &opts).unwrap();
        let text = String::from_utf8(artifact.data).unwrap();

        // `compress` alone changes nothing outside production mode.
        assert!(text.contains("================ 1: shim.js ================"));
        assert!(text.contains("================ 2: app.js ================"));
        assert_eq!(artifact.path, root.join("dist/js/general.js"));
    }

    #[test]
    fn patches_apply_before_concatenation() {
        let dir = tempfile::tempdir().unwrap();
        let root = Utf8Path::from_path(dir.path()).unwrap();
        fs::create_dir(root.join("patches")).unwrap();
        fs::write(root.join("app.js"), "var version = 1;\n").unwrap();

        let patch = diffy::create_patch("var version = 1;\n", "var version = 2;\n")
            .to_string()
            .replace("--- original", "--- a/app.js");
        fs::write(root.join("patches/version.patch"), patch).unwrap();

        let spec = GroupSpec {
            sources: vec!["app.js".into()],
            output: Some("app.js".into()),
            ..GroupSpec::default()
        };
        let opts = BuildOptions {
            mode: Mode::Dev,
            source_root: root.to_owned(),
            dest_root: root.join("dist"),
            patch_dir: root.join("patches"),
        };
        let sources = crate::resolve::resolve_sources(root, &spec.sources);

        let artifact = run(&spec, &sources, &opts).unwrap();
        let text = String::from_utf8(artifact.data).unwrap();
        assert!(text.contains("var version = 2;"));
    }
}
