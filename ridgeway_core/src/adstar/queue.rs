// AD* OPEN list: a binary min-heap with lazy deletion.
//
// `BinaryHeap` has no decrease-key, so every key change pushes a fresh entry
// and the parallel `valid` map records the one key per node that is current.
// A popped entry whose key differs from `valid[node]` (or whose node has been
// removed) is stale and silently dropped. Ties on key are broken by insertion
// sequence, which keeps expansion order deterministic.
//
// `len()` counts stale entries too. That is the number the engine's OPEN-size
// cap guards against, since stale entries are what actually occupy memory.

use crate::types::NodeId;
use std::cmp::Ordering;
use std::collections::BinaryHeap;

struct QueueEntry {
    key: f64,
    sequence: u64,
    node: NodeId,
}

impl PartialEq for QueueEntry {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for QueueEntry {}

impl PartialOrd for QueueEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for QueueEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reversed: smallest key pops first, then lowest sequence.
        other
            .key
            .total_cmp(&self.key)
            .then_with(|| other.sequence.cmp(&self.sequence))
    }
}

pub(crate) struct OpenQueue {
    heap: BinaryHeap<QueueEntry>,
    /// Current key of each node in OPEN, `None` if absent.
    valid: Vec<Option<f64>>,
    sequence: u64,
}

impl OpenQueue {
    pub(crate) fn new(node_count: usize) -> Self {
        Self {
            heap: BinaryHeap::new(),
            valid: vec![None; node_count],
            sequence: 0,
        }
    }

    /// Insert `node`, or move it to `key` if already present.
    pub(crate) fn push(&mut self, node: NodeId, key: f64) {
        self.valid[node.index()] = Some(key);
        self.sequence += 1;
        self.heap.push(QueueEntry {
            key,
            sequence: self.sequence,
            node,
        });
    }

    /// Remove `node` from OPEN. Its heap entries become stale.
    pub(crate) fn remove(&mut self, node: NodeId) {
        self.valid[node.index()] = None;
    }

    pub(crate) fn contains(&self, node: NodeId) -> bool {
        self.valid[node.index()].is_some()
    }

    fn is_current(&self, entry: &QueueEntry) -> bool {
        self.valid[entry.node.index()] == Some(entry.key)
    }

    /// Smallest valid key, discarding stale entries off the top.
    pub(crate) fn peek_key(&mut self) -> Option<f64> {
        while let Some(top) = self.heap.peek() {
            if self.is_current(top) {
                return Some(top.key);
            }
            self.heap.pop();
        }
        None
    }

    /// Pop the node with the smallest valid key.
    pub(crate) fn pop(&mut self) -> Option<(NodeId, f64)> {
        while let Some(entry) = self.heap.pop() {
            if self.is_current(&entry) {
                self.valid[entry.node.index()] = None;
                return Some((entry.node, entry.key));
            }
        }
        None
    }

    /// Heap length, stale entries included.
    pub(crate) fn len(&self) -> usize {
        self.heap.len()
    }

    /// Nodes currently in OPEN, in id order.
    pub(crate) fn members(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.valid
            .iter()
            .enumerate()
            .filter(|(_, key)| key.is_some())
            .map(|(i, _)| NodeId(i as u32))
    }

    /// Drop every entry, valid or stale.
    pub(crate) fn clear(&mut self) {
        self.heap.clear();
        self.valid.iter_mut().for_each(|k| *k = None);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pops_in_key_order() {
        let mut q = OpenQueue::new(4);
        q.push(NodeId(0), 3.0);
        q.push(NodeId(1), 1.0);
        q.push(NodeId(2), 2.0);
        assert_eq!(q.pop(), Some((NodeId(1), 1.0)));
        assert_eq!(q.pop(), Some((NodeId(2), 2.0)));
        assert_eq!(q.pop(), Some((NodeId(0), 3.0)));
        assert_eq!(q.pop(), None);
    }

    #[test]
    fn equal_keys_pop_in_insertion_order() {
        let mut q = OpenQueue::new(4);
        q.push(NodeId(3), 1.0);
        q.push(NodeId(0), 1.0);
        q.push(NodeId(2), 1.0);
        let order: Vec<NodeId> = std::iter::from_fn(|| q.pop().map(|(n, _)| n)).collect();
        assert_eq!(order, vec![NodeId(3), NodeId(0), NodeId(2)]);
    }

    #[test]
    fn rekeyed_entry_leaves_a_stale_copy_behind() {
        let mut q = OpenQueue::new(2);
        q.push(NodeId(0), 5.0);
        q.push(NodeId(0), 1.0);
        assert_eq!(q.len(), 2);
        assert_eq!(q.pop(), Some((NodeId(0), 1.0)));
        // The 5.0 entry is stale and must not resurface.
        assert_eq!(q.pop(), None);
    }

    #[test]
    fn removed_nodes_are_skipped() {
        let mut q = OpenQueue::new(3);
        q.push(NodeId(0), 1.0);
        q.push(NodeId(1), 2.0);
        q.remove(NodeId(0));
        assert!(!q.contains(NodeId(0)));
        assert_eq!(q.peek_key(), Some(2.0));
        assert_eq!(q.pop(), Some((NodeId(1), 2.0)));
        assert_eq!(q.peek_key(), None);
    }

    #[test]
    fn members_lists_only_valid_nodes() {
        let mut q = OpenQueue::new(5);
        q.push(NodeId(4), 1.0);
        q.push(NodeId(1), 2.0);
        q.push(NodeId(2), 3.0);
        q.remove(NodeId(2));
        let members: Vec<NodeId> = q.members().collect();
        assert_eq!(members, vec![NodeId(1), NodeId(4)]);
        q.clear();
        assert_eq!(q.len(), 0);
        assert_eq!(q.members().count(), 0);
    }
}
