use crate::{Result, ScrobbleError};
use serde::{Deserialize, Serialize};

/// A list row with the flags the UI binds to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Selectable<T> {
    pub item: T,
    /// Marked for submission
    pub selected: bool,
    /// Highlighted in the UI grid
    pub checked: bool,
    /// Whether the row may be selected at all
    pub enabled: bool,
}

/// Bulk selection operations offered to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SelectionOp {
    SelectAll,
    DeselectAll,
    /// Select only the rows currently checked in the grid
    SelectChecked,
    /// Deselect only the rows currently checked in the grid
    DeselectChecked,
}

/// Rows whose selection state lives for one UI session.
///
/// Every operation leaves disabled rows untouched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectableList<T> {
    rows: Vec<Selectable<T>>,
}

impl<T> Default for SelectableList<T> {
    fn default() -> Self {
        Self { rows: Vec::new() }
    }
}

impl<T> SelectableList<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a list where every row is enabled and nothing is selected.
    pub fn from_items(items: impl IntoIterator<Item = T>) -> Self {
        let mut list = Self::new();
        for item in items {
            list.push(item, true);
        }
        list
    }

    pub fn push(&mut self, item: T, enabled: bool) {
        self.rows.push(Selectable {
            item,
            selected: false,
            checked: false,
            enabled,
        });
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn clear(&mut self) {
        self.rows.clear();
    }

    pub fn rows(&self) -> &[Selectable<T>] {
        &self.rows
    }

    pub fn get(&self, index: usize) -> Option<&Selectable<T>> {
        self.rows.get(index)
    }

    /// Mutable access to the wrapped item, for per-row edits such as durations.
    pub fn item_mut(&mut self, index: usize) -> Result<&mut T> {
        let len = self.rows.len();
        self.rows
            .get_mut(index)
            .map(|row| &mut row.item)
            .ok_or(ScrobbleError::OutOfRange { index, len })
    }

    /// Mark or unmark one row for submission.
    ///
    /// Returns `false` without changing anything when the row is disabled.
    pub fn set_selected(&mut self, index: usize, selected: bool) -> Result<bool> {
        let row = self.row_mut(index)?;
        if !row.enabled {
            return Ok(false);
        }
        row.selected = selected;
        Ok(true)
    }

    /// Check or uncheck one row in the grid.
    pub fn set_checked(&mut self, index: usize, checked: bool) -> Result<bool> {
        let row = self.row_mut(index)?;
        if !row.enabled {
            return Ok(false);
        }
        row.checked = checked;
        Ok(true)
    }

    /// Apply a bulk operation and return how many rows changed.
    pub fn apply(&mut self, op: SelectionOp) -> usize {
        let mut changed = 0;
        for row in self.rows.iter_mut().filter(|row| row.enabled) {
            let target = match op {
                SelectionOp::SelectAll => true,
                SelectionOp::DeselectAll => false,
                SelectionOp::SelectChecked if row.checked => true,
                SelectionOp::DeselectChecked if row.checked => false,
                SelectionOp::SelectChecked | SelectionOp::DeselectChecked => continue,
            };
            if row.selected != target {
                row.selected = target;
                changed += 1;
            }
        }
        changed
    }

    /// Items currently marked for submission, in list order.
    pub fn selected_items(&self) -> impl Iterator<Item = &T> {
        self.rows
            .iter()
            .filter(|row| row.selected && row.enabled)
            .map(|row| &row.item)
    }

    pub fn selected_count(&self) -> usize {
        self.selected_items().count()
    }

    fn row_mut(&mut self, index: usize) -> Result<&mut Selectable<T>> {
        let len = self.rows.len();
        self.rows
            .get_mut(index)
            .ok_or(ScrobbleError::OutOfRange { index, len })
    }
}
