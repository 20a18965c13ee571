//! Reconciles the tags of a multi-entry selection.
//!
//! Every operation re-reads the current tags, works out the set all entries
//! share, derives the next set and writes it to each entry. Entries are
//! independent; one failed write never stops the others and nothing is
//! rolled back.

use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{info, warn};

use crate::error::TagError;
use crate::store::{TagBackend, TagStore};
use crate::tags::{same_tag_names, Tag};

/// What a user action does to the common tags of a selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transition {
    Clear,
    Toggle(Tag),
    Cycle(Vec<Tag>),
}

impl Transition {
    pub fn next(&self, current: &[Tag]) -> Vec<Tag> {
        match self {
            Transition::Clear => Vec::new(),
            Transition::Toggle(tag) => toggle(current, tag),
            Transition::Cycle(palette) => cycle(current, palette),
        }
    }

    fn needs_current(&self) -> bool {
        !matches!(self, Transition::Clear)
    }
}

/// Removes `target` if a tag with the same name is present, otherwise
/// appends it.
pub fn toggle(current: &[Tag], target: &Tag) -> Vec<Tag> {
    if current.iter().any(|tag| tag.same_name(target)) {
        current
            .iter()
            .filter(|tag| !tag.same_name(target))
            .cloned()
            .collect()
    } else {
        let mut next = current.to_vec();
        next.push(target.clone());
        next
    }
}

/// Position of the current tag on the color wheel. Only a selection with
/// exactly one tag has a position.
pub fn palette_position(current: &[Tag], palette: &[Tag]) -> Option<usize> {
    match current {
        [single] => palette.iter().position(|tag| tag.same_name(single)),
        _ => None,
    }
}

/// Advances to the next palette tag. Stepping past the last one yields no
/// tag at all; the step after that starts again at the first.
pub fn cycle(current: &[Tag], palette: &[Tag]) -> Vec<Tag> {
    let next = match palette_position(current, palette) {
        Some(index) => index + 1,
        None => 0,
    };
    palette.get(next).cloned().into_iter().collect()
}

#[derive(Debug)]
pub struct FailedEntry {
    pub path: PathBuf,
    pub error: TagError,
}

/// Outcome of applying a tag set to a selection.
#[derive(Debug, Default)]
pub struct ApplyReport {
    pub tags: Vec<Tag>,
    pub written: Vec<PathBuf>,
    pub failed: Vec<FailedEntry>,
}

impl ApplyReport {
    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }

    pub fn summary(&self) -> ApplySummary {
        ApplySummary {
            tags: self.tags.iter().map(|tag| tag.name.clone()).collect(),
            written: self.written.clone(),
            failed: self
                .failed
                .iter()
                .map(|entry| (entry.path.clone(), entry.error.to_string()))
                .collect(),
        }
    }
}

/// Serializable view of an [`ApplyReport`].
#[derive(Debug, Clone, Serialize)]
pub struct ApplySummary {
    pub tags: Vec<String>,
    pub written: Vec<PathBuf>,
    pub failed: Vec<(PathBuf, String)>,
}

pub struct SelectionReconciler<B: TagBackend> {
    store: TagStore<B>,
}

impl<B: TagBackend> SelectionReconciler<B> {
    pub fn new(store: TagStore<B>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &TagStore<B> {
        &self.store
    }

    /// The tags every entry of the selection shares, in the order of the
    /// first entry. Divergent selections have no common tags.
    pub fn common_tags(&self, selection: &[PathBuf]) -> Vec<Tag> {
        let Some((first, rest)) = selection.split_first() else {
            return Vec::new();
        };

        let first_tags = self.store.read(first);
        for path in rest {
            if !same_tag_names(&first_tags, &self.store.read(path)) {
                return Vec::new();
            }
        }
        first_tags
    }

    /// Writes `tags` to every entry, collecting the entries that failed.
    pub fn apply(&self, tags: Vec<Tag>, selection: &[PathBuf]) -> ApplyReport {
        let mut report = ApplyReport {
            tags,
            ..Default::default()
        };

        for path in selection {
            match self.store.write(&report.tags, path) {
                Ok(()) => report.written.push(path.clone()),
                Err(error) => {
                    warn!(path = %path.display(), %error, "failed to update tags");
                    report.failed.push(FailedEntry {
                        path: path.clone(),
                        error,
                    });
                }
            }
        }

        report
    }

    /// Reads, transitions and writes back. An empty selection does nothing.
    pub fn reconcile(&self, selection: &[PathBuf], transition: &Transition) -> ApplyReport {
        if selection.is_empty() {
            return ApplyReport::default();
        }

        let current = if transition.needs_current() {
            self.common_tags(selection)
        } else {
            Vec::new()
        };
        let next = transition.next(&current);

        info!(
            entries = selection.len(),
            from = %describe(&current),
            to = %describe(&next),
            "reconciling tags"
        );
        self.apply(next, selection)
    }

    pub fn tags_of(&self, path: &Path) -> Vec<Tag> {
        self.store.read(path)
    }
}

fn describe(tags: &[Tag]) -> String {
    if tags.is_empty() {
        return "(none)".to_string();
    }
    tags.iter()
        .map(|tag| tag.name.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}
