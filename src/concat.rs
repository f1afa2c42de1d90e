//! Fragment concatenation with per-fragment banners.

use camino::{Utf8Path, Utf8PathBuf};

/// One piece of a concatenated artifact, carrying its origin for the banner.
pub(crate) struct Fragment {
    pub origin: Option<Utf8PathBuf>,
    pub text: String,
}

/// Comment syntax used for fragment banners.
#[derive(Debug, Clone, Copy)]
pub(crate) enum Banner {
    Line,
    Block,
}

impl Banner {
    fn render(self, index: usize, original: &str) -> String {
        match self {
            Banner::Line => {
                format!("// ================ {index}: {original} ================\n\n")
            }
            Banner::Block => {
                format!("/* ================ {index}: {original} ================ */\n\n")
            }
        }
    }
}

/// Join fragments in declared order. With `banners`, each fragment is
/// preceded by a banner carrying a 1-based index and the basename of the
/// fragment's origin (`?` when it has none). No separator, no reordering.
pub(crate) fn concat(fragments: &[Fragment], banner: Banner, banners: bool) -> String {
    let mut acc = String::new();

    for (index, fragment) in fragments.iter().enumerate() {
        if banners {
            let original = fragment
                .origin
                .as_deref()
                .and_then(Utf8Path::file_name)
                .unwrap_or("?");
            acc.push_str(&banner.render(index + 1, original));
        }
        acc.push_str(&fragment.text);
    }

    acc
}
