//! Changed-file listing for pull requests, memoized for the current run.

use std::collections::HashMap;
use std::collections::hash_map::Entry;

use crate::github::{GithubClient, Issue};

/// A per-run cache of changed-file listings, keyed by `owner/repo#number`.
///
/// The cache is owned by the caller and dropped when the run exits; there is
/// no cross-run state and therefore no invalidation to get wrong.
#[derive(Default)]
pub struct ChangedFiles {
    cache: HashMap<String, Vec<String>>,
}

impl ChangedFiles {
    pub fn new() -> ChangedFiles {
        ChangedFiles::default()
    }

    /// Returns every path touched by the pull request, fetching it on first
    /// use. Renames contribute both the new and the previous path.
    pub async fn list(
        &mut self,
        client: &GithubClient,
        issue: &Issue,
    ) -> anyhow::Result<&[String]> {
        let key = issue.global_id();
        let files = match self.cache.entry(key) {
            Entry::Occupied(entry) => {
                tracing::debug!("returning changed files for {} from cache", entry.key());
                entry.into_mut()
            }
            Entry::Vacant(entry) => {
                tracing::debug!("fetching changed files for {}", entry.key());
                let mut names = Vec::new();
                for file in issue.files(client).await? {
                    names.push(file.filename);
                    if let Some(previous) = file.previous_filename {
                        names.push(previous);
                    }
                }
                entry.insert(names)
            }
        };
        Ok(files)
    }
}

/// Reduces a changed-file list to the project directories it touches.
///
/// Projects live at `projects/<kind>/<name>/...`; anything outside that tree
/// is ignored. Order follows first appearance, duplicates are dropped.
pub fn touched_projects(files: &[String]) -> Vec<&str> {
    let mut projects: Vec<&str> = Vec::new();
    for file in files {
        let mut parts = file.split('/');
        if parts.next() != Some("projects") {
            continue;
        }
        let (Some(kind), Some(name)) = (parts.next(), parts.next()) else {
            continue;
        };
        // The project prefix, including its two path components.
        let prefix_len = "projects/".len() + kind.len() + 1 + name.len();
        let project = &file[..prefix_len];
        if !projects.contains(&project) {
            projects.push(project);
        }
    }
    projects
}

#[cfg(test)]
mod tests {
    use super::*;

    fn files(names: &[&str]) -> Vec<String> {
        names.iter().map(|n| n.to_string()).collect()
    }

    #[test]
    fn extracts_project_prefixes() {
        let files = files(&[
            "projects/plugins/backup/src/lib.php",
            "projects/plugins/backup/readme.txt",
            "projects/packages/sync/src/sender.rs",
            "tools/scripts/build.sh",
            "README.md",
        ]);
        assert_eq!(
            touched_projects(&files),
            ["projects/plugins/backup", "projects/packages/sync"]
        );
    }

    #[test]
    fn ignores_paths_shallower_than_a_project() {
        let files = files(&["projects/readme.md", "projects/plugins"]);
        assert_eq!(touched_projects(&files), Vec::<&str>::new());
    }

    #[test]
    fn rename_previous_paths_count() {
        let files = files(&[
            "projects/plugins/search/new-name.php",
            "projects/plugins/old-search/old-name.php",
        ]);
        assert_eq!(
            touched_projects(&files),
            ["projects/plugins/search", "projects/plugins/old-search"]
        );
    }
}
