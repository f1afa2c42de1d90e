//! Build tasks: one runnable unit per manifest group.

use std::fmt::Debug;
use std::sync::{Arc, Mutex};

use crate::manifest::{Category, GroupSpec, Manifest};
use crate::transform::Chain;
use crate::{BuildOptions, io, resolve};

/// The runnable unit that builds one group's artifact. Created once at
/// manifest load time and never mutated afterwards; invoking it any number
/// of times is safe, and overlapping invocations queue on the run lock.
pub struct Task {
    name: String,
    category: Category,
    spec: GroupSpec,
    chain: Chain,
    options: Arc<BuildOptions>,
    running: Mutex<()>,
}

impl Task {
    pub(crate) fn new(
        category: Category,
        group: &str,
        spec: GroupSpec,
        options: Arc<BuildOptions>,
    ) -> Self {
        Self {
            name: format!("{category}:{group}"),
            category,
            chain: Chain::select(category),
            spec,
            options,
            running: Mutex::new(()),
        }
    }

    /// Composite task name, `"<category>:<group>"`.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn category(&self) -> Category {
        self.category
    }

    pub(crate) fn spec(&self) -> &GroupSpec {
        &self.spec
    }

    /// Resolve sources, run the transform chain, and write the artifacts.
    /// Artifacts are fully built in memory first, so a failure writes
    /// nothing and the previous artifact survives intact.
    pub fn run(&self) -> anyhow::Result<()> {
        // A poisoned lock only means an earlier run panicked mid-build.
        let _running = self.running.lock().unwrap_or_else(|e| e.into_inner());

        tracing::debug!(task = %self.name, "running");

        let sources = resolve::resolve_sources(&self.options.source_root, &self.spec.sources);
        let artifacts = self.chain.run(&self.spec, &sources, &self.options)?;

        for artifact in &artifacts {
            io::write_artifact(artifact)?;
        }

        Ok(())
    }
}

impl Debug for Task {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Task({})", self.name)
    }
}

/// Derive every task from the manifest, in declaration order. Deterministic:
/// the same manifest always yields the same named tasks.
pub(crate) fn generate(manifest: &Manifest, options: &Arc<BuildOptions>) -> Vec<Task> {
    let tasks: Vec<_> = manifest
        .iter()
        .map(|(category, group, spec)| Task::new(category, group, spec.clone(), options.clone()))
        .collect();

    tracing::debug!("generated {} tasks", tasks.len());
    tasks
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn generation_is_deterministic() {
        let manifest = Manifest::parse(
            r#"
            [scripts.app]
            sources = ["js/app.js"]
            output = "app.js"

            [styles.app]
            sources = ["css/app.css"]
            output = "app.css"
            "#,
        )
        .unwrap();

        let options = Arc::new(BuildOptions::default());
        let first: Vec<_> = generate(&manifest, &options)
            .iter()
            .map(|t| t.name().to_owned())
            .collect();
        let second: Vec<_> = generate(&manifest, &options)
            .iter()
            .map(|t| t.name().to_owned())
            .collect();

        assert_eq!(first, ["scripts:app", "styles:app"]);
        assert_eq!(first, second);
    }
}
