//! Linearization of delegation graphs.
//!
//! The search order of an object is a topological order of its delegation
//! graph under two kinds of constraint: every object comes before its
//! parents, and each parent comes before the parent declared after it. Nodes
//! are released in rounds. A round takes every node whose predecessors have
//! all been placed, in the order they became free, and the start object is
//! always first. When nodes remain that can never be freed, the constraints
//! contradict each other and the linearization fails.
//!
//! [`merge`] is the classic C3 merge. Host classes use it for their own
//! ancestor lists.

use std::collections::{HashMap, HashSet, VecDeque};
use std::mem;

use log::debug;

use crate::model::error::ProtoError;
use crate::model::object::{Node, NodeKey};
use crate::model::space::Space;

/// Search order of `start`, `start` first.
pub fn linearize(space: &Space, start: &Node) -> Result<Vec<Node>, ProtoError> {
    let mut graph = Precedence::default();
    let (root, _) = graph.intern(start);
    let mut active = HashSet::new();
    graph.discover(space, root, &mut active)?;
    graph.order(space)
}

/// Pre-order depth-first walk over the raw parent lists, each node once.
pub fn depth_first(space: &Space, start: &Node) -> Result<Vec<Node>, ProtoError> {
    let mut order = Vec::new();
    let mut seen = HashSet::new();
    walk(space, start, &mut seen, &mut order)?;
    Ok(order)
}

fn walk(
    space: &Space,
    node: &Node,
    seen: &mut HashSet<NodeKey>,
    order: &mut Vec<Node>,
) -> Result<(), ProtoError> {
    if !seen.insert(node.key()) {
        return Ok(());
    }
    order.push(node.clone());
    for parent in space.parents_of(node)? {
        walk(space, &parent, seen, order)?;
    }
    Ok(())
}

/// Nodes reachable from the start, indexed in discovery order, with an edge
/// from each node to everything that must follow it.
#[derive(Default)]
struct Precedence {
    nodes: Vec<Node>,
    index: HashMap<NodeKey, usize>,
    successors: Vec<Vec<usize>>,
    waiting: Vec<usize>,
}

impl Precedence {
    /// Index of `node`, and whether it was seen for the first time.
    fn intern(&mut self, node: &Node) -> (usize, bool) {
        if let Some(&i) = self.index.get(&node.key()) {
            return (i, false);
        }
        let i = self.nodes.len();
        self.nodes.push(node.clone());
        self.index.insert(node.key(), i);
        self.successors.push(Vec::new());
        self.waiting.push(0);
        (i, true)
    }

    fn edge(&mut self, before: usize, after: usize) {
        self.successors[before].push(after);
        self.waiting[after] += 1;
    }

    /// Record the constraints below `i`. `active` holds the nodes on the
    /// current path; meeting one again is a cycle.
    fn discover(
        &mut self,
        space: &Space,
        i: usize,
        active: &mut HashSet<usize>,
    ) -> Result<(), ProtoError> {
        active.insert(i);
        let node = self.nodes[i].clone();
        let mut previous = None;
        for parent in space.parents_of(&node)? {
            let (p, fresh) = self.intern(&parent);
            if active.contains(&p) {
                debug!("cycle through {}", space.describe(&parent));
                return Err(ProtoError::CyclicDelegation(space.describe(&parent)));
            }
            self.edge(i, p);
            if let Some(q) = previous {
                self.edge(q, p);
            }
            previous = Some(p);
            if fresh {
                self.discover(space, p, active)?;
            }
        }
        active.remove(&i);
        Ok(())
    }

    fn order(mut self, space: &Space) -> Result<Vec<Node>, ProtoError> {
        let mut ready: Vec<usize> = (0..self.nodes.len())
            .filter(|&i| self.waiting[i] == 0)
            .collect();
        let mut placed = vec![false; self.nodes.len()];
        let mut order = Vec::with_capacity(self.nodes.len());

        while !ready.is_empty() {
            let round = mem::take(&mut ready);
            for &i in &round {
                placed[i] = true;
                order.push(self.nodes[i].clone());
            }
            for &i in &round {
                for s in mem::take(&mut self.successors[i]) {
                    self.waiting[s] -= 1;
                    if self.waiting[s] == 0 {
                        ready.push(s);
                    }
                }
            }
        }

        if order.len() < self.nodes.len() {
            let stuck: Vec<String> = self
                .nodes
                .iter()
                .zip(&placed)
                .filter(|(_, done)| !**done)
                .map(|(n, _)| space.describe(n))
                .collect();
            let object = space.describe(&self.nodes[0]);
            debug!(
                "no consistent order for {}; left over: {}",
                object,
                stuck.join(", ")
            );
            return Err(ProtoError::InconsistentPrecedence {
                object,
                detail: format!("cannot order {}", stuck.join(", ")),
            });
        }
        Ok(order)
    }
}

/// The C3 merge of `sequences`.
///
/// On failure returns the heads that were left, none of which could be taken.
pub fn merge<T, F>(sequences: Vec<Vec<T>>, same: F) -> Result<Vec<T>, Vec<T>>
where
    T: Clone,
    F: Fn(&T, &T) -> bool,
{
    let mut pending: Vec<VecDeque<T>> = sequences
        .into_iter()
        .filter(|s| !s.is_empty())
        .map(VecDeque::from)
        .collect();
    let mut result = Vec::new();

    loop {
        pending.retain(|s| !s.is_empty());
        if pending.is_empty() {
            return Ok(result);
        }

        let candidate = pending
            .iter()
            .filter_map(|s| s.front())
            .find(|head| {
                !pending
                    .iter()
                    .any(|s| s.iter().skip(1).any(|other| same(*head, other)))
            })
            .cloned();

        match candidate {
            Some(next) => {
                for s in pending.iter_mut() {
                    if s.front().map_or(false, |head| same(head, &next)) {
                        s.pop_front();
                    }
                }
                result.push(next);
            }
            None => {
                return Err(pending.iter().filter_map(|s| s.front().cloned()).collect());
            }
        }
    }
}
