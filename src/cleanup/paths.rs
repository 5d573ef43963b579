// Path utilities for cleanup destinations
// Resolves target directories, checks they sit outside the project and
// renders session folder names

use chrono::{DateTime, TimeZone};
use std::path::{Component, Path, PathBuf};

use crate::store::CleanupConfig;

/// Resolve a path that may be relative or absolute
/// If relative, resolves against the provided base directory
pub fn resolve_path(path: &Path, base_dir: &Path) -> PathBuf {
    if path.is_absolute() {
        clean_path(path)
    } else {
        clean_path(&base_dir.join(path))
    }
}

/// Clean a path by removing redundant components like "." and ".."
/// This provides a normalized form without requiring the path to exist
pub fn clean_path(path: &Path) -> PathBuf {
    let mut components: Vec<Component> = Vec::new();

    for component in path.components() {
        match component {
            Component::CurDir => continue,
            Component::ParentDir => match components.last() {
                Some(Component::Normal(_)) => {
                    components.pop();
                }
                // ".." at the root stays at the root
                Some(Component::RootDir) | Some(Component::Prefix(_)) => {}
                _ => components.push(component),
            },
            _ => components.push(component),
        }
    }

    let result: PathBuf = components.iter().collect();
    if result.as_os_str().is_empty() {
        PathBuf::from(".")
    } else {
        result
    }
}

/// Component-wise containment: `/app/backup` is within `/app`, `/application` is not
pub fn is_within(path: &Path, root: &Path) -> bool {
    clean_path(path).starts_with(clean_path(root))
}

/// Make a path absolute against the current directory without touching the filesystem
pub fn absolutize(path: &Path) -> PathBuf {
    if path.is_absolute() {
        clean_path(path)
    } else {
        let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("/"));
        clean_path(&cwd.join(path))
    }
}

/// Where sessions for this configuration are written
pub fn destination_root(config: &CleanupConfig) -> PathBuf {
    let project = absolutize(&config.project_path);
    let base = config
        .base_path
        .as_deref()
        .map(absolutize)
        .unwrap_or_else(|| project.clone());
    resolve_path(&config.target_directory, &base)
}

/// Render a session folder name from a `{YYYY}-{MM}-{DD}-{HH}-{mm}-{ss}` template
pub fn render_directory_name<Tz: TimeZone>(format: &str, at: &DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    format
        .replace("{YYYY}", &at.format("%Y").to_string())
        .replace("{MM}", &at.format("%m").to_string())
        .replace("{DD}", &at.format("%d").to_string())
        .replace("{HH}", &at.format("%H").to_string())
        .replace("{mm}", &at.format("%M").to_string())
        .replace("{ss}", &at.format("%S").to_string())
}

/// Literal text before the first template token, used to recognize session folders
pub fn session_prefix(format: &str) -> &str {
    match format.find('{') {
        Some(idx) => &format[..idx],
        None => format,
    }
}

/// Relative path rendered with forward slashes, as stored in manifests and reference indexes
pub fn to_slash(path: &Path) -> String {
    path.components()
        .filter_map(|c| match c {
            Component::Normal(name) => Some(name.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/")
}
