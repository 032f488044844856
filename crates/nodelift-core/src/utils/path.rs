//! Path utilities for safe file system operations and module specifiers.
//!
//! Provides path normalization, traversal checks, and the package-relative
//! path arithmetic used when rewriting `require` specifiers.

use crate::error::{LiftError, LiftResult};
use std::path::{Component, Path, PathBuf};

/// Normalize a path by resolving . and .. components
pub fn normalize_path(path: &Path) -> PathBuf {
    let mut components = Vec::new();

    for component in path.components() {
        match component {
            Component::CurDir => {},
            Component::ParentDir => {
                // Keep leading `..` so escaping paths stay visible
                match components.last() {
                    Some(Component::Normal(_)) => {
                        components.pop();
                    },
                    _ => components.push(component),
                }
            },
            other => components.push(other),
        }
    }

    components.iter().collect()
}

/// Check if a path is safe (no directory traversal)
pub fn is_safe_path(path: &Path) -> bool {
    if path.is_absolute() {
        return false;
    }

    let mut depth = 0i32;

    for component in path.components() {
        match component {
            Component::CurDir => {},
            Component::ParentDir => {
                depth -= 1;
                if depth < 0 {
                    return false;
                }
            },
            Component::Normal(_) => depth += 1,
            _ => return false,
        }
    }

    true
}

/// Safely join paths, preventing directory traversal
pub fn safe_join(base: &Path, path: &Path) -> LiftResult<PathBuf> {
    if !is_safe_path(path) {
        return Err(LiftError::ConfigValidation {
            field: "path".to_string(),
            reason: format!("{} escapes {}", path.display(), base.display()),
        });
    }

    Ok(base.join(normalize_path(path)))
}

/// Strip a trailing `.js` extension
pub fn strip_js_extension(module: &str) -> &str {
    module.strip_suffix(".js").unwrap_or(module)
}

/// Directory part of a package-relative module path (`lib/a` -> `lib`, `a` -> ``)
pub fn parent_module_dir(module: &str) -> &str {
    module.rsplit_once('/').map_or("", |(dir, _)| dir)
}

/// Render a path with forward slashes
pub fn to_module_path(path: &Path) -> String {
    path.components()
        .map(|component| component.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

/// Relative specifier from a package-relative directory to a package-relative
/// module, always prefixed with `./` or `../`
pub fn relative_module_path(from_dir: &str, target: &str) -> String {
    let relative = pathdiff::diff_paths(Path::new(target), Path::new(from_dir))
        .unwrap_or_else(|| PathBuf::from(target));
    let relative = to_module_path(&relative);

    if relative == ".." || relative.starts_with("../") {
        relative
    } else {
        format!("./{}", relative)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_path() {
        let path = Path::new("./src/../lib/./file.js");
        assert_eq!(normalize_path(path), Path::new("lib/file.js"));
        assert_eq!(normalize_path(Path::new("a/../..")), Path::new(".."));
        assert_eq!(normalize_path(Path::new("lib/..")), Path::new(""));
    }

    #[test]
    fn test_is_safe_path() {
        assert!(is_safe_path(Path::new("src/lib.js")));
        assert!(is_safe_path(Path::new("./src/lib.js")));
        assert!(!is_safe_path(Path::new("../../../etc/passwd")));
        assert!(!is_safe_path(Path::new("/absolute/path")));
    }

    #[test]
    fn test_safe_join() {
        let base = Path::new("/home/user");

        let result = safe_join(base, Path::new("pkg/lib/main.js")).unwrap();
        assert_eq!(result, Path::new("/home/user/pkg/lib/main.js"));

        assert!(safe_join(base, Path::new("../../../etc/passwd")).is_err());
    }

    #[test]
    fn test_strip_js_extension() {
        assert_eq!(strip_js_extension("lib/a.js"), "lib/a");
        assert_eq!(strip_js_extension("lib/a.json"), "lib/a.json");
        assert_eq!(strip_js_extension("lib/a"), "lib/a");
    }

    #[test]
    fn test_parent_module_dir() {
        assert_eq!(parent_module_dir("lib/sub/a"), "lib/sub");
        assert_eq!(parent_module_dir("a"), "");
    }

    #[test]
    fn test_relative_module_path() {
        assert_eq!(relative_module_path("", "lib/main"), "./lib/main");
        assert_eq!(relative_module_path("lib", "lib/main"), "./main");
        assert_eq!(relative_module_path("lib/sub", "lib/main"), "../main");
        assert_eq!(relative_module_path("a/b", "main"), "../../main");
    }
}
