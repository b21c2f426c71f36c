//! Dependency ordering for emission.
//!
//! Definitions are emitted parents-first: anything a definition extends or
//! references through a property type comes earlier in the output. Cycles in
//! the `extends` graph alone are fatal; any cycle that involves a property
//! reference is legal (recursive data models exist) and is broken at the
//! first revisit.

use std::collections::{BTreeSet, HashMap};

use tracing::warn;

use crate::error::GenError;
use crate::ir::IrDocument;
use crate::typeexpr::TypeExpr;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum VisitState {
    Unvisited,
    InProgress,
    Done,
}

/// Return indices into `document.definitions` in emission order.
pub fn sort_definitions(
    document: &IrDocument,
    nominals: &BTreeSet<String>,
) -> Result<Vec<usize>, GenError> {
    let index_of: HashMap<&str, usize> = document
        .definitions
        .iter()
        .enumerate()
        .map(|(idx, def)| (def.name.as_str(), idx))
        .collect();

    // A mixed cycle (property edge somewhere along the loop) is legal, so the
    // inheritance check walks the extends graph in isolation; afterwards any
    // revisit in the full walk is by definition a tolerable property cycle.
    check_inheritance_cycles(document, &index_of)?;

    let mut sorter = Sorter {
        document,
        nominals,
        index_of,
        state: vec![VisitState::Unvisited; document.definitions.len()],
        order: Vec::with_capacity(document.definitions.len()),
    };

    for idx in 0..document.definitions.len() {
        sorter.visit(idx);
    }
    Ok(sorter.order)
}

/// Reject cycles reachable through `extends` edges alone.
fn check_inheritance_cycles(
    document: &IrDocument,
    index_of: &HashMap<&str, usize>,
) -> Result<(), GenError> {
    let mut state = vec![VisitState::Unvisited; document.definitions.len()];
    for idx in 0..document.definitions.len() {
        visit_extends(document, index_of, &mut state, idx)?;
    }
    Ok(())
}

fn visit_extends(
    document: &IrDocument,
    index_of: &HashMap<&str, usize>,
    state: &mut [VisitState],
    idx: usize,
) -> Result<(), GenError> {
    match state[idx] {
        VisitState::Done => return Ok(()),
        VisitState::InProgress => {
            return Err(GenError::InheritanceCycle(
                document.definitions[idx].name.clone(),
            ));
        }
        VisitState::Unvisited => {}
    }
    state[idx] = VisitState::InProgress;
    for parent in &document.definitions[idx].extends {
        if let Some(&parent_idx) = index_of.get(parent.as_str()) {
            visit_extends(document, index_of, state, parent_idx)?;
        }
        // Unresolvable parents were already warned about on load.
    }
    state[idx] = VisitState::Done;
    Ok(())
}

struct Sorter<'a> {
    document: &'a IrDocument,
    nominals: &'a BTreeSet<String>,
    index_of: HashMap<&'a str, usize>,
    state: Vec<VisitState>,
    order: Vec<usize>,
}

impl<'a> Sorter<'a> {
    fn visit(&mut self, idx: usize) {
        match self.state[idx] {
            VisitState::Done => return,
            VisitState::InProgress => {
                // Recursive property type; the reference resolves forward.
                warn!(
                    definition = %self.document.definitions[idx].name,
                    "Recursive property reference, breaking dependency cycle."
                );
                return;
            }
            VisitState::Unvisited => {}
        }
        self.state[idx] = VisitState::InProgress;

        let document: &'a IrDocument = self.document;
        let def = &document.definitions[idx];
        for parent in &def.extends {
            let parent_idx = self.index_of.get(parent.as_str()).copied();
            if let Some(parent_idx) = parent_idx {
                self.visit(parent_idx);
            }
        }
        for property in def.properties.values() {
            let expr = TypeExpr::parse(&property.raw_type, self.nominals);
            let mut refs = Vec::new();
            collect_references(&expr, &mut refs);
            for reference in refs {
                let ref_idx = self.index_of.get(reference.as_str()).copied();
                if let Some(ref_idx) = ref_idx {
                    self.visit(ref_idx);
                }
            }
        }

        self.state[idx] = VisitState::Done;
        self.order.push(idx);
    }
}

fn collect_references(expr: &TypeExpr, out: &mut Vec<String>) {
    match expr {
        TypeExpr::Reference(name) => out.push(name.clone()),
        TypeExpr::List(inner) | TypeExpr::Nullable(inner) => collect_references(inner, out),
        TypeExpr::Map { key, value } => {
            collect_references(key, out);
            collect_references(value, out);
        }
        TypeExpr::Union(branches) => {
            for branch in branches {
                collect_references(branch, out);
            }
        }
        TypeExpr::Primitive(_) | TypeExpr::Literals(_) | TypeExpr::Nominal(_) => {}
    }
}
