//! Style chain: banner concatenation, then whole-artifact minification in
//! production mode. Minification is gated globally, not per-group.

use crate::BuildOptions;
use crate::concat::{Banner, Fragment, concat};
use crate::manifest::GroupSpec;
use crate::resolve::ResolvedSource;

use super::{Artifact, output_filename, read_fragment};

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
        fragments.push(Fragment {
            origin: Some(source.path.clone()),
            text,
        });
    }

    let joined = concat(&fragments, Banner::Block, !options.compress());
    let data = if options.compress() {
        minify(&joined)?
    } else {
        joined
    };

    Ok(Artifact {
        path: options.dest_root.join("css").join(output),
        data: data.into_bytes(),
    })
}

/// CSS is valid SCSS, so the compiler doubles as the minifier.
pub(crate) fn minify(css: &str) -> anyhow::Result<String> {
    let opts = grass::Options::default().style(grass::OutputStyle::Compressed);
    grass::from_string(css, &opts).map_err(|e| anyhow::anyhow!("Couldn't minify styles:\n{e}"))
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::Mode;
    use camino::Utf8Path;
    use std::fs;

    fn group(sources: &[&str], output: &str) -> GroupSpec {
        GroupSpec {
            sources: sources.iter().map(ToString::to_string).collect(),
            output: Some(output.into()),
            ..GroupSpec::default()
        }
    }

    fn options(mode: Mode, root: &Utf8Path) -> BuildOptions {
        BuildOptions {
            mode,
            source_root: root.to_owned(),
            dest_root: root.join("dist"),
            ..BuildOptions::default()
        }
    }

    #[test]
    fn production_minifies_without_banners() {
        let dir = tempfile::tempdir().unwrap();
        let root = Utf8Path::from_path(dir.path()).unwrap();
        fs::write(root.join("a.css"), "body { color: red; }\n").unwrap();
        fs::write(root.join("b.css"), "p { margin: 0; }\n").unwrap();

        let spec = group(&["a.css", "b.css"], "out.css");
        let opts = options(Mode::Production, root);
        let sources = crate::resolve::resolve_sources(root, &spec.sources);

        let artifact = run(&spec, &sources, &opts).unwrap();
        let text = String::from_utf8(artifact.data).unwrap();

        assert!(!text.contains("================"));
        let expected = minify("body { color: red; }\np { margin: 0; }\n").unwrap();
        assert_eq!(text, expected);
        assert!(text.len() < "body { color: red; }\np { margin: 0; }\n".len());
    }

    #[test]
    fn dev_keeps_banners_in_source_order() {
        let dir = tempfile::tempdir().unwrap();
        let root = Utf8Path::from_path(dir.path()).unwrap();
        fs::write(root.join("a.css"), "A").unwrap();
        fs::write(root.join("b.css"), "B").unwrap();

        let spec = group(&["a.css", "b.css"], "out.css");
        let opts = options(Mode::Dev, root);
        let sources = crate::resolve::resolve_sources(root, &spec.sources);

        let artifact = run(&spec, &sources, &opts).unwrap();
        let text = String::from_utf8(artifact.data).unwrap();

        let first = text.find("1: a.css").unwrap();
        let second = text.find("2: b.css").unwrap();
        assert!(first < second);
        assert_eq!(artifact.path, root.join("dist/css/out.css"));
    }
}
