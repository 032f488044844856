//! Shared benchmark configuration and fixtures

use criterion::Criterion;

pub fn criterion_config() -> Criterion {
    Criterion::default()
        .warm_up_time(std::time::Duration::from_secs(2))
        .measurement_time(std::time::Duration::from_secs(5))
        .sample_size(50)
}

/// A CommonJS module of roughly `statements` lines mixing requires,
/// globals, comments and strings
pub fn commonjs_module(statements: usize) -> String {
    let mut source = String::from("#!/usr/bin/env node\n'use strict';\n");
    for i in 0..statements {
        match i % 6 {
            0 => source.push_str(&format!("var m{0} = require('./lib/m{0}.js');\n", i)),
            1 => source.push_str(&format!("var p{} = require('path');\n", i)),
            2 => source.push_str(&format!("// require('commented{}')\n", i)),
            3 => source.push_str(&format!("var s{} = \"require('nope')\" + `t${{x}}`;\n", i)),
            4 => source.push_str(&format!("var b{} = Buffer.from('{}');\n", i, i)),
            _ => source.push_str(&format!("if (process.env.N{0}) obj.require('x{0}');\n", i)),
        }
    }
    source
}
