//! Passthrough chain: files are copied verbatim, either flat under the
//! group's destination subdirectory or mirroring their path relative to the
//! source root.

use anyhow::Context;
use camino::{Utf8Component, Utf8Path, Utf8PathBuf};

use crate::BuildOptions;
use crate::manifest::GroupSpec;
use crate::resolve::ResolvedSource;

use super::Artifact;

pub(crate) fn run(
    spec: &GroupSpec,
    sources: &[ResolvedSource],
    options: &BuildOptions,
) -> anyhow::Result<Vec<Artifact>> {
    let mut artifacts = Vec::new();

    for source in sources {
        // Missing files were warned about at resolution time.
        if !source.path.exists() {
            continue;
        }

        let data = std::fs::read(&source.path)
            .with_context(|| format!("Couldn't read '{}'", source.path))?;

        let path = match &spec.dest {
            Some(dest) => options
                .dest_root
                .join(dest)
                .join(source.path.file_name().unwrap_or("?")),
            None => options.dest_root.join(mirrored(&source.rel)),
        };

        artifacts.push(Artifact { path, data });
    }

    Ok(artifacts)
}

/// Strip `.`/`..` components so mirrored files never escape the destination
/// root, even for sources declared outside the source tree.
fn mirrored(rel: &Utf8Path) -> Utf8PathBuf {
    let mut out = Utf8PathBuf::new();
    for component in rel.components() {
        if let Utf8Component::Normal(part) = component {
            out.push(part);
        }
    }
    out
}

#[cfg(test)]
mod test {
    use super::*;
    use std::fs;

    #[test]
    fn dest_groups_flatten_to_basename() {
        let dir = tempfile::tempdir().unwrap();
        let root = Utf8Path::from_path(dir.path()).unwrap();
        fs::create_dir_all(root.join("vendor/fonts")).unwrap();
        fs::write(root.join("vendor/fonts/icons.woff2"), b"\x00\x01").unwrap();

        let spec = GroupSpec {
            sources: vec!["vendor/fonts/icons.woff2".into()],
            dest: Some("fonts".into()),
            ..GroupSpec::default()
        };
        let opts = BuildOptions {
            source_root: root.to_owned(),
            dest_root: root.join("dist"),
            ..BuildOptions::default()
        };
        let sources = crate::resolve::resolve_sources(root, &spec.sources);

        let artifacts = run(&spec, &sources, &opts).unwrap();
        assert_eq!(artifacts.len(), 1);
        assert_eq!(artifacts[0].path, root.join("dist/fonts/icons.woff2"));
        assert_eq!(artifacts[0].data, b"\x00\x01");
    }

    #[test]
    fn destless_groups_mirror_relative_paths() {
        let dir = tempfile::tempdir().unwrap();
        let root = Utf8Path::from_path(dir.path()).unwrap();
        fs::create_dir_all(root.join("audio")).unwrap();
        fs::write(root.join("audio/bleep.mp3"), b"riff").unwrap();

        let spec = GroupSpec {
            sources: vec!["audio/bleep.mp3".into()],
            ..GroupSpec::default()
        };
        let opts = BuildOptions {
            source_root: root.to_owned(),
            dest_root: root.join("dist"),
            ..BuildOptions::default()
        };
        let sources = crate::resolve::resolve_sources(root, &spec.sources);

        let artifacts = run(&spec, &sources, &opts).unwrap();
        assert_eq!(artifacts[0].path, root.join("dist/audio/bleep.mp3"));
    }

    #[test]
    fn parent_components_never_escape_dest() {
        assert_eq!(
            mirrored(Utf8Path::new("../vendor/lib/dist/lib.js")),
            Utf8Path::new("vendor/lib/dist/lib.js")
        );
    }
}
