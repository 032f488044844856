//! Import specifier remapping
//!
//! The rewriter finds `require('…')` call sites and hands each specifier to
//! an [`ImportRemapper`]. [`NodeImportRemapper`] maps Node resolution rules
//! onto the loader's: directory imports, JSON plugins, extension stripping,
//! self-references and builtin shims.

use std::path::Path;
use std::sync::Arc;

use nodelift_core::error::LiftResult;
use nodelift_core::utils::path::{normalize_path, parent_module_dir};
use nodelift_core::utils::relative_module_path;

use crate::shim::ShimConfig;

/// Maps one import specifier found in `file` (package-relative, with extension)
///
/// Returns `Ok(None)` to leave the specifier untouched.
pub trait ImportRemapper: Send + Sync {
    fn remap(&self, specifier: &str, file: &str) -> LiftResult<Option<String>>;
}

impl<F> ImportRemapper for F
where
    F: Fn(&str, &str) -> LiftResult<Option<String>> + Send + Sync,
{
    fn remap(&self, specifier: &str, file: &str) -> LiftResult<Option<String>> {
        self(specifier, file)
    }
}

/// Node-style resolution rules for one package
#[derive(Debug, Clone)]
pub struct NodeImportRemapper {
    package_name: String,
    main: String,
    shim: Arc<ShimConfig>,
}

impl NodeImportRemapper {
    pub fn new(package_name: impl Into<String>, main: impl Into<String>, shim: Arc<ShimConfig>) -> Self {
        Self {
            package_name: package_name.into(),
            main: main.into(),
            shim,
        }
    }

    fn is_self_reference(&self, specifier: &str) -> bool {
        specifier == self.package_name
            || specifier
                .strip_prefix(self.package_name.as_str())
                .map_or(false, |rest| rest.starts_with('/'))
    }
}

impl ImportRemapper for NodeImportRemapper {
    fn remap(&self, specifier: &str, file: &str) -> LiftResult<Option<String>> {
        let from_dir = parent_module_dir(file);

        let dep = match specifier {
            "." | ".." => format!("{}/", specifier),
            _ => specifier.to_string(),
        };

        if dep.ends_with(".json") {
            return Ok(Some(format!("{}!{}", dep, self.shim.json_loader())));
        }

        if dep.ends_with('/') {
            let target = normalize_path(&Path::new(from_dir).join(&dep));
            if target.as_os_str().is_empty() {
                return Ok(Some(relative_module_path(from_dir, &self.main)));
            }
            return Ok(Some(format!("{}index", dep)));
        }

        if dep.contains('/') && dep.ends_with(".js") {
            return Ok(Some(dep.trim_end_matches(".js").to_string()));
        }

        // The subpath of a self-reference is dropped; it resolves to main
        if self.is_self_reference(&dep) {
            return Ok(Some(relative_module_path(from_dir, &self.main)));
        }

        let (first, rest) = match dep.find('/') {
            Some(slash) => dep.split_at(slash),
            None => (dep.as_str(), ""),
        };
        if self.shim.is_builtin(first) {
            return Ok(Some(format!("{}/{}{}", self.shim.namespace(), first, rest)));
        }

        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn remapper() -> NodeImportRemapper {
        NodeImportRemapper::new("foo", "lib/main", Arc::new(ShimConfig::default()))
    }

    fn remap(specifier: &str, file: &str) -> Option<String> {
        remapper().remap(specifier, file).unwrap()
    }

    #[test]
    fn test_json_imports_get_loader() {
        assert_eq!(
            remap("./data.json", "lib/a.js").as_deref(),
            Some("./data.json!github:jspm/nodelibs@0.0.8/json")
        );
    }

    #[test]
    fn test_directory_imports() {
        assert_eq!(remap("./util/", "lib/a.js").as_deref(), Some("./util/index"));
        assert_eq!(remap("../", "lib/a.js").as_deref(), Some("./main"));
        assert_eq!(remap("./", "index.js").as_deref(), Some("./lib/main"));
        assert_eq!(remap("../", "lib/sub/a.js").as_deref(), Some("../index"));
    }

    #[test]
    fn test_dot_imports_become_directory_imports() {
        assert_eq!(remap(".", "index.js").as_deref(), Some("./lib/main"));
        assert_eq!(remap("..", "lib/a.js").as_deref(), Some("./main"));
        assert_eq!(remap(".", "lib/sub/a.js").as_deref(), Some("./index"));
    }

    #[test]
    fn test_nested_js_extension_stripped() {
        assert_eq!(remap("./lib/b.js", "index.js").as_deref(), Some("./lib/b"));
        assert_eq!(remap("other/file.js", "index.js").as_deref(), Some("other/file"));
        assert_eq!(remap("bignumber.js", "index.js"), None);
    }

    #[test]
    fn test_self_reference_resolves_to_main() {
        assert_eq!(remap("foo", "index.js").as_deref(), Some("./lib/main"));
        assert_eq!(remap("foo/sub", "lib/x/y.js").as_deref(), Some("../main"));
        assert_eq!(remap("foobar", "index.js"), None);
    }

    #[test]
    fn test_builtins_redirected() {
        assert_eq!(
            remap("fs", "index.js").as_deref(),
            Some("github:jspm/nodelibs@0.0.8/fs")
        );
        assert_eq!(
            remap("util/types", "index.js").as_deref(),
            Some("github:jspm/nodelibs@0.0.8/util/types")
        );
        assert_eq!(remap("lodash", "index.js"), None);
        assert_eq!(remap("./fs", "index.js"), None);
    }

    #[test]
    fn test_closures_are_remappers() {
        let upper = |specifier: &str, _file: &str| -> LiftResult<Option<String>> {
            Ok(Some(specifier.to_uppercase()))
        };
        assert_eq!(upper.remap("abc", "x.js").unwrap().as_deref(), Some("ABC"));
    }
}
