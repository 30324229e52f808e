//! In-memory tables.
//!
//! A [`Store`] is the authoritative, insertion-ordered collection of one
//! record type. Lookups are linear; tables are small and order matters for
//! the on-disk layout.

use crate::error::{DeskError, DeskResult};
use crate::model::Record;

/// An ordered collection of records of one kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Store<T> {
    records: Vec<T>,
}

impl<T> Default for Store<T> {
    fn default() -> Self {
        Self {
            records: Vec::new(),
        }
    }
}

impl<T: Record> Store<T> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn from_records(records: Vec<T>) -> Self {
        Self { records }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.records.iter()
    }

    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, T> {
        self.records.iter_mut()
    }

    #[must_use]
    pub fn as_slice(&self) -> &[T] {
        &self.records
    }

    #[must_use]
    pub fn get(&self, id: u32) -> Option<&T> {
        self.records.iter().find(|r| r.id() == id)
    }

    pub fn get_mut(&mut self, id: u32) -> Option<&mut T> {
        self.records.iter_mut().find(|r| r.id() == id)
    }

    /// Like [`get`](Self::get), but a missing id is a
    /// [`DeskError::NotFound`] naming this store's record kind.
    ///
    /// # Errors
    ///
    /// [`DeskError::NotFound`] if no record has this id.
    pub fn require(&self, id: u32) -> DeskResult<&T> {
        self.get(id).ok_or_else(|| DeskError::not_found(T::KIND, id))
    }

    /// # Errors
    ///
    /// [`DeskError::NotFound`] if no record has this id.
    pub fn require_mut(&mut self, id: u32) -> DeskResult<&mut T> {
        self.get_mut(id).ok_or_else(|| DeskError::not_found(T::KIND, id))
    }

    #[must_use]
    pub fn contains(&self, id: u32) -> bool {
        self.get(id).is_some()
    }

    pub fn find(&self, mut pred: impl FnMut(&T) -> bool) -> Option<&T> {
        self.records.iter().find(|r| pred(r))
    }

    pub fn find_mut(&mut self, mut pred: impl FnMut(&T) -> bool) -> Option<&mut T> {
        self.records.iter_mut().find(|r| pred(r))
    }

    /// Append a record and return a reference to it.
    pub fn push(&mut self, record: T) -> &mut T {
        let index = self.records.len();
        self.records.push(record);
        &mut self.records[index]
    }

    /// Remove the record with `id`, returning it.
    pub fn remove(&mut self, id: u32) -> Option<T> {
        let index = self.records.iter().position(|r| r.id() == id)?;
        Some(self.records.remove(index))
    }

    /// Remove every record matching `pred`, returning the removed ones in
    /// their original order.
    pub fn remove_where(&mut self, mut pred: impl FnMut(&T) -> bool) -> Vec<T> {
        let (removed, kept) = std::mem::take(&mut self.records)
            .into_iter()
            .partition(|r| pred(r));
        self.records = kept;
        removed
    }
}

impl<'a, T: Record> IntoIterator for &'a Store<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use crate::model::{Attendee, GENERIC_EVENT_ID, RecordKind};

    fn attendee(id: u32, event_id: u32) -> Attendee {
        Attendee {
            id,
            name: format!("a{id}"),
            contact_info: String::new(),
            event_id,
            checked_in: false,
        }
    }

    #[test]
    fn lookup_and_remove_by_id() {
        let mut store = Store::from_records(vec![attendee(1, 1), attendee(4, 2)]);
        assert!(store.contains(4));
        let removed = store.remove(1).expect("present");
        assert_eq!(removed.id, 1);
        assert!(store.remove(1).is_none());
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn remove_where_preserves_order_of_survivors() {
        let mut store = Store::from_records(vec![
            attendee(1, 5),
            attendee(2, GENERIC_EVENT_ID),
            attendee(3, 5),
            attendee(4, 6),
        ]);
        let removed = store.remove_where(|a| a.event_id == 5);
        assert_eq!(removed.iter().map(|a| a.id).collect::<Vec<_>>(), vec![1, 3]);
        assert_eq!(store.iter().map(|a| a.id).collect::<Vec<_>>(), vec![2, 4]);
    }

    #[test]
    fn require_names_the_record_kind() {
        let mut store = Store::from_records(vec![attendee(2, 1)]);
        assert_eq!(store.require(2).expect("present").event_id, 1);
        store.require_mut(2).expect("present").checked_in = true;
        assert!(store.require(2).expect("present").checked_in);

        let err = store.require(7).expect_err("missing");
        assert_eq!(err.code(), ErrorCode::RecordNotFound);
        assert!(matches!(
            err,
            DeskError::NotFound { kind: RecordKind::Attendee, ref id } if id == "7"
        ));
    }
}
