//! Watch mode: a debounced file-system watcher over the source root. Each
//! changed path is dispatched to the one task that claims it; the manifest
//! file itself is watched only to ask for a restart, never hot-reloaded.

use std::env;
use std::path::Path;
use std::time::Duration;

use camino::Utf8Path;
use console::style;
use notify::{EventKind, RecursiveMode};
use notify_debouncer_full::new_debouncer;

use crate::Pipeline;
use crate::error::WatchError;

pub(crate) fn watch(pipeline: &Pipeline) -> Result<(), WatchError> {
    let root = env::current_dir()?;

    let (tx, rx) = std::sync::mpsc::channel();
    let mut debouncer = new_debouncer(Duration::from_millis(250), None, tx)?;

    let source_root = &pipeline.options().source_root;
    debouncer.watch(source_root.as_std_path(), RecursiveMode::Recursive)?;

    let manifest_path = pipeline.manifest_path();
    if manifest_path.exists() {
        debouncer.watch(manifest_path.as_std_path(), RecursiveMode::NonRecursive)?;
    }

    eprintln!("Watching {} for changes.", style(source_root.as_str()).cyan());

    while let Ok(result) = rx.recv() {
        let events = match result {
            Ok(events) => events,
            Err(errors) => {
                for e in errors {
                    eprintln!("{} {e}", style("Error:").red());
                }
                continue;
            }
        };

        let changed = events
            .iter()
            .filter(|de| {
                matches!(
                    de.event.kind,
                    EventKind::Create(..) | EventKind::Modify(..) | EventKind::Remove(..)
                )
            })
            .flat_map(|de| &de.event.paths);

        for path in changed {
            if is_manifest(path, manifest_path) {
                eprintln!(
                    "Pipeline configuration changed. Please restart {}",
                    style("watch").cyan()
                );
                continue;
            }

            let rel = path.strip_prefix(&root).unwrap_or(path);
            let Some(rel) = rel.to_str() else {
                eprintln!("{} {}", style("Error:").red(), path.display());
                continue;
            };

            tracing::debug!(file = rel, "change detected");

            // One task per event, handled sequentially; misses only warn.
            if let Err(e) = pipeline.build_file(rel) {
                eprintln!("{} {e}", style("Error:").red());
            }
        }
    }

    Ok(())
}

fn is_manifest(path: &Path, manifest: &Utf8Path) -> bool {
    match (path.canonicalize(), manifest.as_std_path().canonicalize()) {
        (Ok(a), Ok(b)) => a == b,
        _ => path.ends_with(manifest.as_std_path()),
    }
}
