//! Source resolution: manifest path patterns become readable paths rooted at
//! the source directory, with existence re-checked on every task invocation.

use camino::{Utf8Component, Utf8Path, Utf8PathBuf};
use console::style;

/// One resolved source file of a build group.
#[derive(Debug, Clone)]
pub struct ResolvedSource {
    /// The path to read, source root applied and normalized.
    pub path: Utf8PathBuf,
    /// The path as declared in the manifest, or the glob match relative to
    /// the source root. Used for destination mirroring and patch targeting.
    pub rel: Utf8PathBuf,
}

/// Resolve a group's source patterns against the source root, in declared
/// order. Wildcard patterns are glob-expanded; literal paths are kept even
/// when missing, with a warning, so the rest of the group still builds.
pub fn resolve_sources(root: &Utf8Path, patterns: &[String]) -> Vec<ResolvedSource> {
    let mut resolved = Vec::new();

    for pattern in patterns {
        if pattern.contains(['*', '?', '[']) {
            expand_glob(root, pattern, &mut resolved);
            continue;
        }

        let path = normalize_path(&root.join(pattern));
        if !path.exists() {
            eprintln!("{} {}", style("File not found (or error):").red(), pattern);
        }
        resolved.push(ResolvedSource {
            path,
            rel: Utf8PathBuf::from(pattern),
        });
    }

    resolved
}

fn expand_glob(root: &Utf8Path, pattern: &str, resolved: &mut Vec<ResolvedSource>) {
    let full = normalize_path(&root.join(pattern));

    let paths = match glob::glob(full.as_str()) {
        Ok(paths) => paths,
        Err(e) => {
            eprintln!("{} {pattern}\n{e}", style("File not found (or error):").red());
            return;
        }
    };

    let mut matched = false;
    for entry in paths {
        let path = match entry.map(Utf8PathBuf::try_from) {
            Ok(Ok(path)) => path,
            Ok(Err(e)) => {
                eprintln!("{} {e}", style("File not found (or error):").red());
                continue;
            }
            Err(e) => {
                eprintln!("{} {e}", style("File not found (or error):").red());
                continue;
            }
        };

        let rel = path.strip_prefix(root).unwrap_or(&path).to_owned();
        resolved.push(ResolvedSource { path, rel });
        matched = true;
    }

    if !matched {
        eprintln!("{} {pattern}", style("File not found (or error):").red());
    }
}

/// Normalize a path, removing things like `.` and `..`.
///
/// CAUTION: This does not resolve symlinks (unlike [`std::fs::canonicalize`]).
/// Adapted from
/// <https://github.com/rust-lang/cargo/blob/f7acf448fc127df9a77c52cc2bba027790ac4931/crates/cargo-util/src/paths.rs#L76-L116>
pub(crate) fn normalize_path(path: &Utf8Path) -> Utf8PathBuf {
    let mut components = path.components().peekable();
    let mut ret = if let Some(c @ Utf8Component::Prefix(..)) = components.peek().cloned() {
        components.next();
        Utf8PathBuf::from(c.as_str())
    } else {
        Utf8PathBuf::new()
    };

    for component in components {
        match component {
            Utf8Component::Prefix(..) => unreachable!(),
            Utf8Component::RootDir => {
                ret.push(Utf8Component::RootDir);
            }
            Utf8Component::CurDir => {}
            Utf8Component::ParentDir => {
                if ret.ends_with(Utf8Component::ParentDir) {
                    ret.push(Utf8Component::ParentDir);
                } else {
                    let popped = ret.pop();
                    if !popped && !ret.has_root() {
                        ret.push(Utf8Component::ParentDir);
                    }
                }
            }
            Utf8Component::Normal(c) => {
                ret.push(c);
            }
        }
    }
    ret
}

#[cfg(test)]
mod test {
    use super::*;
    use std::fs;

    #[test]
    fn literal_sources_keep_declared_order() {
        let dir = tempfile::tempdir().unwrap();
        let root = Utf8Path::from_path(dir.path()).unwrap();
        fs::write(root.join("b.css"), "b").unwrap();
        fs::write(root.join("a.css"), "a").unwrap();

        let resolved = resolve_sources(root, &["b.css".into(), "a.css".into()]);
        let rels: Vec<_> = resolved.iter().map(|s| s.rel.as_str()).collect();
        assert_eq!(rels, ["b.css", "a.css"]);
    }

    #[test]
    fn missing_literal_source_is_kept() {
        let dir = tempfile::tempdir().unwrap();
        let root = Utf8Path::from_path(dir.path()).unwrap();
        fs::write(root.join("there.js"), "x").unwrap();

        let resolved = resolve_sources(root, &["gone.js".into(), "there.js".into()]);
        assert_eq!(resolved.len(), 2);
        assert!(!resolved[0].path.exists());
        assert!(resolved[1].path.exists());
    }

    #[test]
    fn wildcard_patterns_expand() {
        let dir = tempfile::tempdir().unwrap();
        let root = Utf8Path::from_path(dir.path()).unwrap();
        fs::create_dir(root.join("js")).unwrap();
        fs::write(root.join("js/a.js"), "a").unwrap();
        fs::write(root.join("js/b.js"), "b").unwrap();
        fs::write(root.join("js/c.css"), "c").unwrap();

        let resolved = resolve_sources(root, &["js/*.js".into()]);
        let mut rels: Vec<_> = resolved.iter().map(|s| s.rel.as_str()).collect();
        rels.sort_unstable();
        assert_eq!(rels, ["js/a.js", "js/b.js"]);
    }

    #[test]
    fn parent_components_normalize_away() {
        let path = normalize_path(Utf8Path::new("assets/js/../css/app.css"));
        assert_eq!(path, Utf8Path::new("assets/css/app.css"));
    }
}
