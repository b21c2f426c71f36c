//! Import block composition for the Python targets.
//!
//! Symbols accumulate per module while mapping runs; the rendered block lists
//! standard-library modules first, then third-party, then project-local, with
//! symbols sorted inside each line.

use std::collections::{BTreeMap, BTreeSet};

/// Stdlib modules in their fixed render order.
const STDLIB_ORDER: [&str; 3] = ["enum", "dataclasses", "typing"];

/// Third-party modules in their fixed render order.
const THIRD_PARTY_ORDER: [&str; 1] = ["pydantic"];

#[derive(Debug, Clone, Default)]
pub struct ImportSet {
    modules: BTreeMap<String, BTreeSet<String>>,
}

impl ImportSet {
    pub fn new() -> Self {
        ImportSet::default()
    }

    pub fn add(&mut self, module: &str, symbol: &str) {
        self.modules
            .entry(module.to_string())
            .or_default()
            .insert(symbol.to_string());
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }

    /// Render one `from module import a, b` line per module, grouped stdlib /
    /// third-party / local. Empty set renders to an empty string.
    pub fn render(&self) -> String {
        let mut lines = Vec::new();
        let mut emitted = BTreeSet::new();

        for module in STDLIB_ORDER {
            self.push_line(module, &mut lines, &mut emitted);
        }
        for module in THIRD_PARTY_ORDER {
            self.push_line(module, &mut lines, &mut emitted);
        }
        // Anything else is project-local, in sorted order.
        for module in self.modules.keys() {
            self.push_line(module, &mut lines, &mut emitted);
        }

        lines.join("\n")
    }

    fn push_line(&self, module: &str, lines: &mut Vec<String>, emitted: &mut BTreeSet<String>) {
        let Some(symbols) = self.modules.get(module) else {
            return;
        };
        if symbols.is_empty() || !emitted.insert(module.to_string()) {
            return;
        }
        let joined = symbols.iter().cloned().collect::<Vec<_>>().join(", ");
        lines.push(format!("from {module} import {joined}"));
    }
}
