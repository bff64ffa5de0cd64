//! Min-priority queue of cells with insertion-order tie-breaking.
use crate::error::{Error, Result};
use crate::grid::Cell;
use std::cmp::Ordering;
use std::collections::BinaryHeap;

#[derive(Clone, Copy, Debug)]
struct FrontierEntry {
    priority: u32,
    sequence: u64,
    cell: Cell,
}

impl Eq for FrontierEntry {}

impl PartialEq for FrontierEntry {
    fn eq(&self, other: &Self) -> bool {
        self.priority == other.priority && self.sequence == other.sequence
    }
}

impl PartialOrd for FrontierEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for FrontierEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        // BinaryHeap is a max-heap, so both keys are reversed: lowest priority first, and
        // among equal priorities the entry inserted first.
        other
            .priority
            .cmp(&self.priority)
            .then_with(|| other.sequence.cmp(&self.sequence))
    }
}

/// Orders cells by ascending priority, then by ascending insertion sequence. The sequence
/// counter makes the pop order fully deterministic among equal priorities.
#[derive(Clone, Debug, Default)]
pub struct Frontier {
    heap: BinaryHeap<FrontierEntry>,
    next_sequence: u64,
}

impl Frontier {
    pub fn new() -> Frontier {
        Frontier::default()
    }

    /// Inserts `cell` and returns the sequence number it was assigned.
    pub fn push(&mut self, priority: u32, cell: Cell) -> u64 {
        let sequence = self.next_sequence;
        self.next_sequence += 1;
        self.heap.push(FrontierEntry {
            priority,
            sequence,
            cell,
        });
        sequence
    }

    /// Removes the entry with the smallest `(priority, sequence)` and returns its priority and
    /// cell.
    pub fn pop_min(&mut self) -> Result<(u32, Cell)> {
        self.heap
            .pop()
            .map(|e| (e.priority, e.cell))
            .ok_or(Error::EmptyFrontier)
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    pub fn len(&self) -> usize {
        self.heap.len()
    }

    /// Cells currently queued, in no particular order.
    pub fn cells(&self) -> impl Iterator<Item = Cell> + '_ {
        self.heap.iter().map(|e| e.cell)
    }
}
