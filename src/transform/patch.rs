//! Textual patches applied to script fragments before any other transform.
//!
//! Patches are unified diffs collected from the patch directory; each one is
//! applied to every fragment whose manifest path ends with the patch target.

use anyhow::Context;
use camino::{Utf8Path, Utf8PathBuf};

pub(crate) struct PatchSet {
    patches: Vec<(Utf8PathBuf, String)>,
}

impl PatchSet {
    /// Collect `*.patch` files from `dir`. A missing directory is an empty
    /// set, not an error.
    pub(crate) fn load(dir: &Utf8Path) -> anyhow::Result<Self> {
        let mut patches = Vec::new();

        if dir.is_dir() {
            let pattern = dir.join("*.patch");
            for entry in glob::glob(pattern.as_str())? {
                let path = Utf8PathBuf::try_from(entry?)?;
                let text = std::fs::read_to_string(&path)
                    .with_context(|| format!("Couldn't read patch '{path}'"))?;
                patches.push((path, text));
            }
        }

        Ok(Self { patches })
    }

    /// Apply every patch whose target matches `rel` by suffix. A malformed
    /// patch or a failed hunk fails the whole task.
    pub(crate) fn apply(&self, rel: &Utf8Path, text: String) -> anyhow::Result<String> {
        let mut text = text;

        for (path, raw) in &self.patches {
            let patch = diffy::Patch::from_str(raw)
                .with_context(|| format!("Couldn't parse patch '{path}'"))?;

            let Some(target) = patch.original() else {
                continue;
            };
            let target = target.strip_prefix("a/").unwrap_or(target);

            if trim_edges(rel.as_str()).ends_with(trim_edges(target)) {
                text = diffy::apply(&text, &patch)
                    .with_context(|| format!("Couldn't apply patch '{path}' to '{rel}'"))?;
            }
        }

        Ok(text)
    }
}

fn trim_edges(s: &str) -> &str {
    s.trim_start_matches(['.', '/'])
}

#[cfg(test)]
mod test {
    use super::*;
    use std::fs;

    #[test]
    fn missing_patch_dir_is_empty() {
        let set = PatchSet::load(Utf8Path::new("no/such/dir")).unwrap();
        let out = set.apply(Utf8Path::new("js/app.js"), "original".into()).unwrap();
        assert_eq!(out, "original");
    }

    #[test]
    fn matching_patch_rewrites_fragment() {
        let before = "left\nmiddle\nright\n";
        let after = "left\npatched\nright\n";
        let mut patch = diffy::create_patch(before, after).to_string();
        patch = patch.replace("--- original", "--- a/js/app.js");

        let dir = tempfile::tempdir().unwrap();
        let root = Utf8Path::from_path(dir.path()).unwrap();
        fs::write(root.join("fix.patch"), patch).unwrap();

        let set = PatchSet::load(root).unwrap();
        let out = set.apply(Utf8Path::new("js/app.js"), before.into()).unwrap();
        assert_eq!(out, after);

        let untouched = set.apply(Utf8Path::new("js/other.js"), before.into()).unwrap();
        assert_eq!(untouched, before);
    }

    #[test]
    fn failed_hunk_is_an_error() {
        let patch = diffy::create_patch("one\ntwo\n", "one\nthree\n").to_string();
        let patch = patch.replace("--- original", "--- a/js/app.js");

        let dir = tempfile::tempdir().unwrap();
        let root = Utf8Path::from_path(dir.path()).unwrap();
        fs::write(root.join("fix.patch"), patch).unwrap();

        let set = PatchSet::load(root).unwrap();
        assert!(set.apply(Utf8Path::new("js/app.js"), "unrelated\n".into()).is_err());
    }
}
