//! Console prefixes and path display helpers.

use owo_colors::OwoColorize;
use std::path::Path;

/// Colors are disabled by `NO_COLOR` and for machine-readable output.
pub fn use_colors(output: &str) -> bool {
    output != "json" && std::env::var_os("NO_COLOR").is_none()
}

fn prefix(label: &str, paint: fn(&str) -> String) -> String {
    if use_colors("human") {
        paint(label)
    } else {
        label.to_string()
    }
}

pub fn error_prefix() -> String {
    prefix("error:", |s| s.red().bold().to_string())
}

pub fn note_prefix() -> String {
    prefix("note:", |s| s.cyan().bold().to_string())
}

/// Render `path` relative to `root` when possible.
pub fn display_path(root: &Path, path: &Path) -> String {
    let rel = if path.is_absolute() == root.is_absolute() {
        pathdiff::diff_paths(path, root)
    } else {
        None
    };
    rel.filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| path.to_path_buf())
        .to_string_lossy()
        .replace('\\', "/")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_path_relative_to_root() {
        let root = Path::new("/repo");
        assert_eq!(
            display_path(root, Path::new("/repo/src/a.scss")),
            "src/a.scss"
        );
        assert_eq!(display_path(root, Path::new("src/a.scss")), "src/a.scss");
    }
}
