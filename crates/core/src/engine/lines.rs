//! Bounded table of the best lines seen for the current position

use super::analysis::EvaluationLine;

/// Outcome of offering a line to the table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableUpdate {
    Inserted,
    Replaced,
    /// The table was full and the line was new
    Dropped,
}

/// Lines keyed by their rendered move sequence, in insertion order.
/// A line whose moves are already present overwrites that entry in place.
#[derive(Debug, Clone)]
pub struct BestLineTable {
    lines: Vec<EvaluationLine>,
    capacity: usize,
}

impl BestLineTable {
    pub fn new(capacity: usize) -> Self {
        Self {
            lines: Vec::with_capacity(capacity),
            capacity,
        }
    }

    pub fn update(&mut self, line: EvaluationLine) -> TableUpdate {
        let key = line.moves_text();

        if let Some(existing) = self.lines.iter_mut().find(|l| l.moves_text() == key) {
            *existing = line;
            return TableUpdate::Replaced;
        }

        if self.lines.len() < self.capacity {
            self.lines.push(line);
            TableUpdate::Inserted
        } else {
            TableUpdate::Dropped
        }
    }

    pub fn clear(&mut self) {
        self.lines.clear();
    }

    pub fn lines(&self) -> &[EvaluationLine] {
        &self.lines
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}
