use serde::Serialize;

use super::{Record, RecordKind};
use crate::error::Violation;

/// A pool of identical items that events draw from.
///
/// `allocated_quantity <= total_quantity` holds between operations. Only the
/// allocation engine moves `allocated_quantity`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InventoryItem {
    pub id: u32,
    pub name: String,
    pub total_quantity: u32,
    pub allocated_quantity: u32,
    pub description: String,
}

impl InventoryItem {
    #[must_use]
    pub const fn new(id: u32, name: String, total_quantity: u32, description: String) -> Self {
        Self {
            id,
            name,
            total_quantity,
            allocated_quantity: 0,
            description,
        }
    }

    #[must_use]
    pub const fn available(&self) -> u32 {
        self.total_quantity.saturating_sub(self.allocated_quantity)
    }

    /// Item-side half of an allocation.
    pub(crate) fn take(&mut self, quantity: u32) -> Result<(), Violation> {
        if quantity == 0 {
            return Err(Violation::NonPositiveQuantity);
        }
        let available = self.available();
        if quantity > available {
            return Err(Violation::OverAllocation {
                requested: quantity,
                available,
            });
        }
        self.allocated_quantity += quantity;
        Ok(())
    }

    /// Item-side half of a deallocation. Never drops below zero.
    pub(crate) fn give_back(&mut self, quantity: u32) {
        self.allocated_quantity = self.allocated_quantity.saturating_sub(quantity);
    }

    /// Replace the total, refusing to go below what is already allocated.
    ///
    /// # Errors
    ///
    /// Returns [`Violation::TotalBelowAllocated`] and leaves the item
    /// untouched if `new_total < allocated_quantity`.
    pub fn set_total_quantity(&mut self, new_total: u32) -> Result<(), Violation> {
        if new_total < self.allocated_quantity {
            return Err(Violation::TotalBelowAllocated {
                requested: new_total,
                allocated: self.allocated_quantity,
            });
        }
        self.total_quantity = new_total;
        Ok(())
    }
}

impl Record for InventoryItem {
    const KIND: RecordKind = RecordKind::InventoryItem;

    fn id(&self) -> u32 {
        self.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chairs() -> InventoryItem {
        InventoryItem::new(1, "Chairs".into(), 100, "Standard chairs".into())
    }

    #[test]
    fn take_respects_available() {
        let mut item = chairs();
        assert_eq!(item.take(60), Ok(()));
        assert_eq!(item.available(), 40);
        assert_eq!(
            item.take(41),
            Err(Violation::OverAllocation {
                requested: 41,
                available: 40
            })
        );
        assert_eq!(item.allocated_quantity, 60);
        assert_eq!(item.take(0), Err(Violation::NonPositiveQuantity));
    }

    #[test]
    fn give_back_saturates() {
        let mut item = chairs();
        item.allocated_quantity = 5;
        item.give_back(9);
        assert_eq!(item.allocated_quantity, 0);
    }

    #[test]
    fn total_cannot_drop_below_allocated() {
        let mut item = chairs();
        item.allocated_quantity = 70;
        assert!(item.set_total_quantity(69).is_err());
        assert_eq!(item.total_quantity, 100);
        assert_eq!(item.set_total_quantity(70), Ok(()));
        assert_eq!(item.available(), 0);
    }
}
