//! Platform shim namespace and builtin module table

/// Dependency target of the platform shim package
pub const DEFAULT_NODELIBS: &str = "github:jspm/nodelibs@0.0.8";

/// Dependency key the shim package is registered under
pub const NODELIBS_DEPENDENCY: &str = "nodelibs";

/// Node builtins redirected to the shim package, server-only ones last
pub const NODE_BUILTINS: &[&str] = &[
    "assert",
    "buffer",
    "console",
    "constants",
    "crypto",
    "domain",
    "events",
    "fs",
    "http",
    "https",
    "os",
    "path",
    "process",
    "punycode",
    "querystring",
    "string_decoder",
    "stream",
    "timers",
    "tls",
    "tty",
    "url",
    "util",
    "vm",
    "zlib",
    "child_process",
    "cluster",
    "dgram",
    "dns",
    "net",
    "readline",
    "repl",
];

/// Immutable shim settings shared by the normalizer and every rewrite worker
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShimConfig {
    namespace: String,
    builtins: Vec<String>,
}

impl ShimConfig {
    pub fn new(namespace: impl Into<String>, builtins: Vec<String>) -> Self {
        Self {
            namespace: namespace.into(),
            builtins,
        }
    }

    /// Namespace builtin references are redirected into
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn builtins(&self) -> &[String] {
        &self.builtins
    }

    pub fn is_builtin(&self, name: &str) -> bool {
        self.builtins.iter().any(|builtin| builtin == name)
    }

    /// Loader reference appended to JSON imports
    pub fn json_loader(&self) -> String {
        format!("{}/json", self.namespace)
    }
}

impl Default for ShimConfig {
    fn default() -> Self {
        Self::new(
            DEFAULT_NODELIBS,
            NODE_BUILTINS.iter().map(|name| name.to_string()).collect(),
        )
    }
}
