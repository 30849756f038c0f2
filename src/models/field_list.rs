use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};

/// Ordered list of form rows (headers, query params, body fields, form data).
///
/// Edits never mutate in place: every operation consumes the list and
/// returns the next state, so a caller holding the previous value keeps an
/// intact snapshot (undo, conflict detection).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldList<T>(Vec<T>);

impl<T> FieldList<T> {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    /// Append a row at the end
    pub fn push(mut self, item: T) -> Self {
        self.0.push(item);
        self
    }

    /// Remove the row at `index`
    pub fn remove(mut self, index: usize) -> AppResult<Self> {
        self.check_index(index)?;
        self.0.remove(index);
        Ok(self)
    }

    /// Replace the row at `index`
    pub fn replace(mut self, index: usize, item: T) -> AppResult<Self> {
        self.check_index(index)?;
        self.0[index] = item;
        Ok(self)
    }

    /// Move the row at `from` so that it ends up at position `to`
    pub fn move_item(mut self, from: usize, to: usize) -> AppResult<Self> {
        self.check_index(from)?;
        self.check_index(to)?;
        let item = self.0.remove(from);
        self.0.insert(to, item);
        Ok(self)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.0.iter()
    }

    pub fn as_slice(&self) -> &[T] {
        &self.0
    }

    pub fn into_vec(self) -> Vec<T> {
        self.0
    }

    fn check_index(&self, index: usize) -> AppResult<()> {
        if index >= self.0.len() {
            return Err(AppError::Validation(format!(
                "row index {} out of range (len {})",
                index,
                self.0.len()
            )));
        }
        Ok(())
    }
}

impl<T> Default for FieldList<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> From<Vec<T>> for FieldList<T> {
    fn from(items: Vec<T>) -> Self {
        Self(items)
    }
}

impl<T> FromIterator<T> for FieldList<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl<T> IntoIterator for FieldList<T> {
    type Item = T;
    type IntoIter = std::vec::IntoIter<T>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a, T> IntoIterator for &'a FieldList<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}
