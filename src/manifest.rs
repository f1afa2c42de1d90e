//! The build manifest: a declarative mapping from output groups to their
//! source files and options, loaded once at startup and read-only afterwards.

use std::fmt;
use std::fs;

use camino::Utf8Path;
use indexmap::IndexMap;
use serde::Deserialize;

use crate::error::ManifestError;

/// The asset categories a manifest can declare. Each category selects a
/// different transform chain; iteration order here is the tie-break order
/// for watch dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    Scripts,
    Styles,
    Templates,
    Bundles,
    Static,
}

impl Category {
    pub const ALL: [Category; 5] = [
        Category::Scripts,
        Category::Styles,
        Category::Templates,
        Category::Bundles,
        Category::Static,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Category::Scripts => "scripts",
            Category::Styles => "styles",
            Category::Templates => "templates",
            Category::Bundles => "bundles",
            Category::Static => "static",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Groups within a category keep their declaration order; dispatch
/// tie-breaks depend on it.
pub type Groups = IndexMap<String, GroupSpec>;

/// One named build group: an ordered source list plus output options.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GroupSpec {
    /// Source path patterns, relative to the source root. Order is the
    /// concatenation order.
    pub sources: Vec<String>,
    /// Artifact filename. Required except for `static` groups.
    #[serde(default)]
    pub output: Option<String>,
    /// Destination subdirectory for `static` groups. Without it, copied
    /// files mirror their path relative to the source root.
    #[serde(default)]
    pub dest: Option<String>,
    /// Whether the artifact may be minified in production mode.
    #[serde(default)]
    pub compress: bool,
    /// Extra wildcard patterns matched by watch dispatch.
    #[serde(default)]
    pub watch: Vec<String>,
    /// Global variable name assigned by a bundle artifact.
    #[serde(default)]
    pub name: Option<String>,
    /// JSX factory function used by the bundle transform.
    #[serde(default)]
    pub jsx_factory: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Manifest {
    #[serde(default)]
    pub scripts: Groups,
    #[serde(default)]
    pub styles: Groups,
    #[serde(default)]
    pub templates: Groups,
    #[serde(default)]
    pub bundles: Groups,
    #[serde(default, rename = "static")]
    pub statics: Groups,
}

impl Manifest {
    /// Read and validate a manifest file.
    pub fn load(path: &Utf8Path) -> Result<Self, ManifestError> {
        let text = fs::read_to_string(path) //
            .map_err(|e| ManifestError::Read(path.to_owned(), e))?;
        Self::parse(&text)
    }

    /// Parse and validate manifest text.
    pub fn parse(text: &str) -> Result<Self, ManifestError> {
        let manifest: Manifest = toml::from_str(text)?;
        manifest.validate()?;
        Ok(manifest)
    }

    pub fn groups(&self, category: Category) -> &Groups {
        match category {
            Category::Scripts => &self.scripts,
            Category::Styles => &self.styles,
            Category::Templates => &self.templates,
            Category::Bundles => &self.bundles,
            Category::Static => &self.statics,
        }
    }

    /// Every `(category, group, spec)` triple in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (Category, &str, &GroupSpec)> {
        Category::ALL.iter().flat_map(move |&category| {
            self.groups(category)
                .iter()
                .map(move |(name, spec)| (category, name.as_str(), spec))
        })
    }

    fn validate(&self) -> Result<(), ManifestError> {
        for (category, name, spec) in self.iter() {
            let qualified = format!("{category}:{name}");

            if spec.sources.is_empty() {
                return Err(ManifestError::EmptySources(qualified));
            }

            match category {
                Category::Static => {}
                Category::Bundles => {
                    if spec.output.is_none() {
                        return Err(ManifestError::MissingOutput(qualified));
                    }
                    if spec.sources.len() != 1 {
                        return Err(ManifestError::BundleEntry(qualified));
                    }
                }
                _ => {
                    if spec.output.is_none() {
                        return Err(ManifestError::MissingOutput(qualified));
                    }
                }
            }
        }

        Ok(())
    }
}
