//! Dependency Closure Resolution
//!
//! Computes the transitive closure of every node. Each node keeps its direct
//! dependencies and gains the resolved closure next to them.
//!
//! # Algorithm
//!
//! Iterative depth-first traversal with three marks per node:
//!
//! 1. `Unvisited` nodes are pushed as a new frame and marked `InProgress`.
//! 2. A frame walks its direct dependencies one at a time. Reaching a node
//!    that is `InProgress` means the dependency chain loops back onto the
//!    current path, which is reported as a cycle.
//! 3. Once every dependency is `Done` the frame is finalized (post-order):
//!    its closure is itself followed by the deduplicated union of its
//!    dependencies' closures, in first-seen order.
//!
//! The traversal starts at the root, then at each node still unvisited in
//! registration order, so every node ends up resolved.

use indexmap::IndexSet;
use smallvec::SmallVec;

use super::node::{ItemId, Node};

/// A dependency cycle found during resolution.
///
/// `path` starts and ends on the same node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CycleDetected {
    pub path: Vec<ItemId>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mark {
    Unvisited,
    InProgress,
    Done,
}

/// Resolve the closure of every node.
///
/// `nodes[i]` must have id `i`, and every dependency must be a valid index.
pub fn resolve_closures(nodes: &mut [Node], root: ItemId) -> Result<(), CycleDetected> {
    let mut marks = vec![Mark::Unvisited; nodes.len()];
    // (node index, next dependency to inspect)
    let mut stack: SmallVec<[(usize, usize); 16]> = SmallVec::new();

    let starts = std::iter::once(root.index()).chain(0..nodes.len());
    for start in starts {
        if marks[start] != Mark::Unvisited {
            continue;
        }
        marks[start] = Mark::InProgress;
        stack.push((start, 0));

        while let Some(frame) = stack.last_mut() {
            let (current, next) = *frame;
            match nodes[current].dependencies().get(next).copied() {
                Some(dependency) => {
                    frame.1 += 1;
                    let child = dependency.index();
                    match marks[child] {
                        Mark::Done => {}
                        Mark::InProgress => return Err(cycle_from(&stack, child, nodes)),
                        Mark::Unvisited => {
                            marks[child] = Mark::InProgress;
                            stack.push((child, 0));
                        }
                    }
                }
                None => {
                    let closure = union_closure(nodes, current);
                    nodes[current].set_closure(closure);
                    marks[current] = Mark::Done;
                    stack.pop();
                }
            }
        }
    }

    tracing::trace!(nodes = nodes.len(), "closures resolved");
    Ok(())
}

fn union_closure(nodes: &[Node], index: usize) -> Vec<ItemId> {
    let node = &nodes[index];
    let mut closure = IndexSet::with_capacity(node.dependencies().len() + 1);
    closure.insert(node.id());
    for dependency in node.dependencies() {
        closure.extend(nodes[dependency.index()].closure().iter().copied());
    }
    closure.into_iter().collect()
}

fn cycle_from(stack: &[(usize, usize)], reentered: usize, nodes: &[Node]) -> CycleDetected {
    let start = stack
        .iter()
        .position(|&(index, _)| index == reentered)
        .unwrap_or(0);
    let path = stack[start..]
        .iter()
        .map(|&(index, _)| nodes[index].id())
        .chain(std::iter::once(nodes[reentered].id()))
        .collect();
    CycleDetected { path }
}
