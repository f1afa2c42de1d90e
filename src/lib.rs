#![forbid(unsafe_code)]
#![doc = include_str!("../README.md")]

mod concat;
mod dispatch;
mod error;
mod io;
mod manifest;
mod resolve;
mod task;
mod transform;
mod watch;

use std::collections::HashSet;
use std::sync::{Arc, Mutex};
use std::time::Instant;

use camino::{Utf8Path, Utf8PathBuf};
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use rayon::iter::{IntoParallelRefIterator, ParallelIterator};

pub use crate::error::*;
pub use crate::manifest::{Category, GroupSpec, Groups, Manifest};
pub use crate::resolve::ResolvedSource;
pub use crate::task::Task;
pub use crate::transform::Artifact;

/// The build variant, chosen once per process invocation. `Production`
/// enables global compression mode: fragment banners disappear and
/// compressible artifacts are minified. `Debug` switches the bundle
/// transform to its development variant. The value is threaded explicitly
/// into task generation, so one process can build the same manifest in
/// several modes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    /// Plain development build.
    #[default]
    Dev,
    /// Development build with the debug bundle variant.
    Debug,
    /// Compressed release build.
    Production,
}

/// Everything a task needs to know beyond its own group spec.
#[derive(Debug, Clone)]
pub struct BuildOptions {
    /// Build variant.
    pub mode: Mode,
    /// Directory the manifest's source patterns are rooted at.
    pub source_root: Utf8PathBuf,
    /// Directory artifacts are written under.
    pub dest_root: Utf8PathBuf,
    /// Directory holding `*.patch` files applied to script fragments.
    pub patch_dir: Utf8PathBuf,
}

impl Default for BuildOptions {
    fn default() -> Self {
        Self {
            mode: Mode::Dev,
            source_root: Utf8PathBuf::from("assets"),
            dest_root: Utf8PathBuf::from("dist"),
            patch_dir: Utf8PathBuf::from("patches"),
        }
    }
}

impl BuildOptions {
    /// Global compression mode, the gate for banner suppression and
    /// minification.
    pub fn compress(&self) -> bool {
        self.mode == Mode::Production
    }
}

/// A loaded manifest with one generated task per group.
pub struct Pipeline {
    manifest_path: Utf8PathBuf,
    options: Arc<BuildOptions>,
    tasks: Vec<Task>,
}

impl Pipeline {
    /// Load the manifest and derive every task. Manifest errors are fatal;
    /// nothing else in the pipeline can run without a valid manifest.
    pub fn load(
        manifest_path: impl AsRef<Utf8Path>,
        options: BuildOptions,
    ) -> Result<Self, ManifestError> {
        let manifest_path = manifest_path.as_ref().to_owned();
        let manifest = Manifest::load(&manifest_path)?;
        let options = Arc::new(options);
        let tasks = task::generate(&manifest, &options);

        Ok(Self {
            manifest_path,
            options,
            tasks,
        })
    }

    pub fn options(&self) -> &BuildOptions {
        &self.options
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub(crate) fn manifest_path(&self) -> &Utf8Path {
        &self.manifest_path
    }

    /// Look up the one task responsible for a changed file.
    pub fn find_task(&self, changed: &str) -> Option<&Task> {
        dispatch::find_task(&self.tasks, changed)
    }

    /// Run the task matched by `changed`. A miss is a warning, not an
    /// error; returns whether a task ran.
    pub fn build_file(&self, changed: &str) -> Result<bool, BuildError> {
        let Some(task) = self.find_task(changed) else {
            eprintln!(
                "{} {changed}",
                style(format!("Target file not found in {}:", self.manifest_path)).red(),
            );
            return Ok(false);
        };

        task.run()
            .map_err(|e| BuildError::Task(task.name().to_owned(), e))?;

        Ok(true)
    }

    /// Run every task. Tasks are independent: each one runs to completion
    /// or fails on its own, and every failure is reported before the
    /// aggregate result comes back.
    pub fn run_all(&self) -> Result<(), BuildError> {
        let s = Instant::now();

        let total = self.tasks.len();
        let bar = ProgressBar::new(total as u64);
        bar.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{elapsed}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")
                .expect("invalid progress bar template")
                .progress_chars("#>-"),
        );

        let active = Arc::new(Mutex::new(HashSet::new()));

        let failures: Vec<BuildError> = self
            .tasks
            .par_iter()
            .filter_map(|task| {
                let name = task.name().to_owned();

                {
                    let mut active = active.lock().unwrap();
                    active.insert(name.clone());
                    bar.set_message(format_active(&active));
                }

                let result = task.run();

                {
                    let mut active = active.lock().unwrap();
                    active.remove(&name);
                    bar.set_message(format_active(&active));
                    bar.inc(1);
                }

                result.err().map(|e| BuildError::Task(name, e))
            })
            .collect();

        bar.finish_with_message(format!("Finished tasks {}", io::as_overhead(s)));

        for failure in &failures {
            eprintln!("{} {failure}", style("Error:").red());
        }

        if failures.is_empty() {
            Ok(())
        } else {
            Err(BuildError::Failed(failures.len()))
        }
    }

    /// Watch the source tree and rebuild the matching task per change.
    pub fn watch(&self) -> Result<(), WatchError> {
        watch::watch(self)
    }
}

fn format_active(active: &HashSet<String>) -> String {
    const MAX: usize = 5;
    let mut names: Vec<_> = active.iter().cloned().collect();
    names.sort();

    if names.len() <= MAX {
        names.join(", ")
    } else {
        format!("{}… ({} total)", names[..MAX].join(", "), names.len())
    }
}
