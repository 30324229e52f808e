//! Allocation engine.
//!
//! An allocation has two halves: the item's `allocated_quantity` and the
//! event's `allocated_inventory` entry. [`allocate`] and [`deallocate`] move
//! both halves together and are the only code that does. Between runs the
//! halves can still drift (a crash between the inventory and events saves,
//! or a hand edit), so [`reconcile`] rebuilds every item's allocated
//! quantity from the events table after each load.

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::error::{DeskError, DeskResult, Violation};
use crate::model::{Event, InventoryItem};
use crate::state::DeskState;
use crate::store::Store;

/// Move `quantity` units of `item` into `event`.
///
/// # Errors
///
/// [`Violation::NonPositiveQuantity`] for zero and
/// [`Violation::OverAllocation`] when `quantity` exceeds what is available.
/// Neither side changes on error.
pub fn allocate(
    item: &mut InventoryItem,
    event: &mut Event,
    quantity: u32,
) -> Result<(), Violation> {
    item.take(quantity)?;
    event.record_allocation(item.id, quantity);
    debug!(
        item_id = item.id,
        event_id = event.id,
        quantity,
        available = item.available(),
        "allocated"
    );
    Ok(())
}

/// Return up to `quantity` units of `item` from `event` to the pool.
///
/// Asking for more than the event holds returns exactly what it holds.
/// Returns the amount actually moved.
///
/// # Errors
///
/// [`Violation::NonPositiveQuantity`] for zero and
/// [`Violation::NotAllocated`] when the event holds none of the item.
pub fn deallocate(
    item: &mut InventoryItem,
    event: &mut Event,
    quantity: u32,
) -> Result<u32, Violation> {
    if quantity == 0 {
        return Err(Violation::NonPositiveQuantity);
    }
    if event.allocated(item.id) == 0 {
        return Err(Violation::NotAllocated {
            item_id: item.id,
            event_id: event.id,
        });
    }
    let released = event.release_allocation(item.id, quantity);
    item.give_back(released);
    debug!(
        item_id = item.id,
        event_id = event.id,
        requested = quantity,
        released,
        "deallocated"
    );
    Ok(released)
}

/// An item whose allocated quantity did not match the events table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Drift {
    pub item_id: u32,
    pub stored: u32,
    pub derived: u32,
}

/// An event allocation pointing at an item id that does not exist.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DanglingAllocation {
    pub event_id: u32,
    pub item_id: u32,
    pub quantity: u32,
}

/// An item whose events together hold more than its total.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Overcommit {
    pub item_id: u32,
    pub total: u32,
    pub allocated: u32,
}

/// What [`reconcile`] found and changed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ReconcileReport {
    pub drift: Vec<Drift>,
    pub dangling: Vec<DanglingAllocation>,
    pub overcommitted: Vec<Overcommit>,
}

impl ReconcileReport {
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.drift.is_empty() && self.dangling.is_empty() && self.overcommitted.is_empty()
    }
}

/// Recompute every item's allocated quantity as the sum of the events'
/// allocations of it.
///
/// Allocations of unknown items are ignored. An item whose derived
/// quantity exceeds its total is reported and left that way; nothing is
/// taken back from any event.
pub fn reconcile(inventory: &mut Store<InventoryItem>, events: &Store<Event>) -> ReconcileReport {
    let mut report = ReconcileReport::default();

    let stored: Vec<(u32, u32)> = inventory
        .iter()
        .map(|item| (item.id, item.allocated_quantity))
        .collect();
    for item in inventory.iter_mut() {
        item.allocated_quantity = 0;
    }

    for event in events {
        for (&item_id, &quantity) in &event.allocated_inventory {
            if let Some(item) = inventory.get_mut(item_id) {
                item.allocated_quantity = item.allocated_quantity.saturating_add(quantity);
            } else {
                warn!(
                    event_id = event.id,
                    item_id, quantity, "allocation references unknown item"
                );
                report.dangling.push(DanglingAllocation {
                    event_id: event.id,
                    item_id,
                    quantity,
                });
            }
        }
    }

    for (item_id, stored) in stored {
        let Some(item) = inventory.get(item_id) else {
            continue;
        };
        if item.allocated_quantity != stored {
            info!(
                item_id,
                stored,
                derived = item.allocated_quantity,
                "reconciled allocated quantity"
            );
            report.drift.push(Drift {
                item_id,
                stored,
                derived: item.allocated_quantity,
            });
        }
        if item.allocated_quantity > item.total_quantity {
            warn!(
                item_id,
                total = item.total_quantity,
                allocated = item.allocated_quantity,
                "events hold more than the item's total"
            );
            report.overcommitted.push(Overcommit {
                item_id,
                total: item.total_quantity,
                allocated: item.allocated_quantity,
            });
        }
    }

    report
}

impl DeskState {
    /// Allocate `quantity` of item `item_id` to event `event_id`.
    ///
    /// # Errors
    ///
    /// [`DeskError::NotFound`] for a missing event or item, or the
    /// violations of [`allocate`].
    pub fn allocate(&mut self, event_id: u32, item_id: u32, quantity: u32) -> DeskResult<()> {
        // Field-level borrows: the event and the item live in different stores.
        let event = self.events.require_mut(event_id)?;
        let item = self.inventory.require_mut(item_id)?;
        allocate(item, event, quantity)?;
        Ok(())
    }

    /// Deallocate up to `quantity` of item `item_id` from event `event_id`.
    /// Returns the amount actually returned to the pool.
    ///
    /// # Errors
    ///
    /// [`DeskError::NotFound`] for a missing event or item, or the
    /// violations of [`deallocate`].
    pub fn deallocate(&mut self, event_id: u32, item_id: u32, quantity: u32) -> DeskResult<u32> {
        let event = self.events.require_mut(event_id)?;
        let item = self.inventory.require_mut(item_id)?;
        Ok(deallocate(item, event, quantity)?)
    }

    /// Replace an item's total.
    ///
    /// # Errors
    ///
    /// [`DeskError::NotFound`], [`Violation::NonPositiveQuantity`] for zero,
    /// or [`Violation::TotalBelowAllocated`].
    pub fn set_total_quantity(&mut self, item_id: u32, new_total: u32) -> DeskResult<()> {
        if new_total == 0 {
            return Err(Violation::NonPositiveQuantity.into());
        }
        let item = self.item_mut(item_id)?;
        item.set_total_quantity(new_total)?;
        info!(item_id, new_total, "set total quantity");
        Ok(())
    }

    /// Rebuild allocated quantities from the events table.
    pub fn reconcile_from_events(&mut self) -> ReconcileReport {
        reconcile(&mut self.inventory, &self.events)
    }
}
