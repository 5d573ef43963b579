// Integration tests for the cleanup pipeline, store and scheduler
// Shared fixtures live here; each area has its own module

mod execute_tests;
mod preview_tests;
mod schedule_tests;
mod session_tests;
mod store_tests;

use std::path::Path;
use std::sync::Arc;

use richiesta_cleanup::cleanup::CleanupService;
use richiesta_cleanup::store::{
    ConfigPatch, ConfigStore, JsonStore, NewExcludeDirectory, NewExcludeFile, NewPattern, DEFAULT_CONFIG_NAME,
};

pub fn write_file(root: &Path, rel: &str, bytes: usize) {
    let path = root.join(rel);
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(path, vec![b'x'; bytes]).unwrap();
}

/// Rules and paths for one test project.
pub struct Fixture<'a> {
    pub patterns: &'a [(&'a str, i32)],
    pub exclude_files: &'a [&'a str],
    pub exclude_dirs: &'a [&'a str],
    pub config: ConfigPatch,
}

impl<'a> Fixture<'a> {
    pub fn new(project: &Path, target: &Path) -> Self {
        Self {
            patterns: &[],
            exclude_files: &[],
            exclude_dirs: &[],
            config: ConfigPatch {
                project_path: Some(project.to_path_buf()),
                target_directory: Some(target.to_path_buf()),
                ..Default::default()
            },
        }
    }

    pub async fn build(self) -> (Arc<JsonStore>, CleanupService) {
        let store = Arc::new(JsonStore::in_memory());
        store.update_config(DEFAULT_CONFIG_NAME, self.config).await.unwrap();
        for (pattern, priority) in self.patterns {
            store.create_pattern(NewPattern::new(*pattern, *priority)).await.unwrap();
        }
        for name in self.exclude_files {
            store.create_exclude_file(NewExcludeFile::new(*name)).await.unwrap();
        }
        for dir in self.exclude_dirs {
            store.create_exclude_dir(NewExcludeDirectory::new(*dir)).await.unwrap();
        }
        let service = CleanupService::new(store.clone());
        (store, service)
    }
}

/// Relative paths of every regular file below `root`, sorted.
pub fn files_under(root: &Path) -> Vec<String> {
    fn visit(dir: &Path, root: &Path, out: &mut Vec<String>) {
        for entry in std::fs::read_dir(dir).unwrap() {
            let path = entry.unwrap().path();
            if path.is_dir() {
                visit(&path, root, out);
            } else {
                let rel = path.strip_prefix(root).unwrap();
                out.push(rel.to_string_lossy().replace('\\', "/"));
            }
        }
    }
    let mut out = Vec::new();
    if root.exists() {
        visit(root, root, &mut out);
    }
    out.sort();
    out
}
