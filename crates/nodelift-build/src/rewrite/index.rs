//! Directory-index forwarders
//!
//! Node resolves `require('./util')` to `./util/index.js`; the loader does
//! not. For every non-root `dir/index.js` a sibling `dir.js` re-exporting the
//! index module is synthesized when none exists.

const INDEX_FILE: &str = "index.js";

/// A forwarder module to create
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexForwarder {
    /// Package-relative path of the new file (`lib/util.js`)
    pub path: String,
    pub source: String,
}

/// Forwarder for `path` when it names a non-root directory index
pub fn index_forwarder(path: &str) -> Option<IndexForwarder> {
    let dir = path.strip_suffix(INDEX_FILE)?.strip_suffix('/')?;
    if dir.is_empty() {
        return None;
    }

    let basename = dir.rsplit('/').next().unwrap_or(dir);
    Some(IndexForwarder {
        path: format!("{}.js", dir),
        source: format!("module.exports = require(\"./{}/index\");\n", basename),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nested_index_gets_forwarder() {
        let forwarder = index_forwarder("lib/util/index.js").unwrap();
        assert_eq!(forwarder.path, "lib/util.js");
        assert_eq!(forwarder.source, "module.exports = require(\"./util/index\");\n");

        let top = index_forwarder("util/index.js").unwrap();
        assert_eq!(top.path, "util.js");
        assert_eq!(top.source, "module.exports = require(\"./util/index\");\n");
    }

    #[test]
    fn test_root_and_non_index_files_ignored() {
        assert_eq!(index_forwarder("index.js"), None);
        assert_eq!(index_forwarder("lib/main.js"), None);
        assert_eq!(index_forwarder("lib/myindex.js"), None);
        assert_eq!(index_forwarder("lib/index.json"), None);
    }
}
