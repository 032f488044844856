//! Ambient `Buffer` / `process` detection and wrapping

use super::lexer::free_identifiers;

const BUFFER_ARG: &str = "require('buffer').Buffer";
const PROCESS_ARG: &str = "require('process')";

/// Which ambient globals a module references
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GlobalUsage {
    pub buffer: bool,
    pub process: bool,
}

impl GlobalUsage {
    /// Scan for free `Buffer` and `process` identifiers
    pub fn detect(source: &str) -> Self {
        let mut usage = Self::default();
        for token in free_identifiers(source) {
            match token.text(source) {
                "Buffer" => usage.buffer = true,
                "process" => usage.process = true,
                _ => continue,
            }
            if usage.buffer && usage.process {
                break;
            }
        }
        usage
    }

    pub fn any(&self) -> bool {
        self.buffer || self.process
    }

    fn params(&self) -> String {
        let mut params = Vec::with_capacity(2);
        if self.buffer {
            params.push("Buffer");
        }
        if self.process {
            params.push("process");
        }
        params.join(", ")
    }

    fn args(&self) -> String {
        let mut args = Vec::with_capacity(2);
        if self.buffer {
            args.push(BUFFER_ARG);
        }
        if self.process {
            args.push(PROCESS_ARG);
        }
        args.join(", ")
    }
}

/// Wrap a module so the used globals become closure parameters
pub fn wrap_globals(source: &str, usage: GlobalUsage) -> String {
    format!(
        "(function({}) {{{}\n}})({});",
        usage.params(),
        source,
        usage.args()
    )
}

/// Whether a module already carries the globals wrapper
pub fn is_wrapped(source: &str) -> bool {
    let heads = [
        "(function(Buffer) {",
        "(function(process) {",
        "(function(Buffer, process) {",
    ];
    heads.iter().any(|head| source.starts_with(head))
        && source.trim_end().ends_with(");")
        && source.contains("\n})(")
}
