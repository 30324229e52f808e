use std::collections::BTreeMap;

use tracing::warn;

use super::{DecodeError, LineCodec, parse_id, parse_ordinal, parse_u32, split_fields};
use crate::model::{Event, EventStatus};
use crate::repo::Table;

/// Fields 1–8 are required; attendees and allocations trail them.
const FIXED_FIELDS: usize = 8;
const ALL_FIELDS: usize = 10;

impl LineCodec for Event {
    const TABLE: Table = Table::Events;
    const MIN_FIELDS: usize = FIXED_FIELDS;

    fn encode(&self) -> String {
        format!(
            "{},{},{},{},{},{},{},{},{},{}",
            self.id,
            self.name,
            self.date,
            self.time,
            self.location,
            self.description,
            self.category,
            self.status.ordinal(),
            encode_attendees(&self.attendee_ids),
            encode_allocations(&self.allocated_inventory),
        )
    }

    fn decode(line: &str) -> Result<Self, DecodeError> {
        let fields = split_fields(line, Self::MIN_FIELDS, ALL_FIELDS)?;

        let id = parse_id(fields[0])?;
        let ordinal = parse_ordinal("status", fields[7])?;
        let status = EventStatus::from_ordinal(ordinal)
            .ok_or_else(|| DecodeError::UnknownStatus(fields[7].to_string()))?;

        // `None` = field omitted, `Some("")` = present but empty. Both
        // decode to an empty collection.
        let attendees_raw = fields.get(8).copied();
        let allocations_raw = fields.get(9).copied();

        let mut event = Self {
            id,
            name: fields[1].to_string(),
            date: fields[2].to_string(),
            time: fields[3].to_string(),
            location: fields[4].to_string(),
            description: fields[5].to_string(),
            category: fields[6].to_string(),
            status,
            attendee_ids: Vec::new(),
            allocated_inventory: BTreeMap::new(),
        };

        if let Some(raw) = attendees_raw {
            for attendee_id in decode_attendees(raw)? {
                event.add_attendee(attendee_id);
            }
        }
        if let Some(raw) = allocations_raw {
            event.allocated_inventory = decode_allocations(id, raw);
        }

        Ok(event)
    }
}

fn encode_attendees(ids: &[u32]) -> String {
    ids.iter()
        .map(u32::to_string)
        .collect::<Vec<_>>()
        .join(";")
}

fn encode_allocations(allocations: &BTreeMap<u32, u32>) -> String {
    allocations
        .iter()
        .map(|(item_id, quantity)| format!("{item_id}:{quantity}"))
        .collect::<Vec<_>>()
        .join(";")
}

/// A bad attendee id makes the whole line malformed.
fn decode_attendees(raw: &str) -> Result<Vec<u32>, DecodeError> {
    raw.split(';')
        .filter(|segment| !segment.trim().is_empty())
        .map(|segment| parse_u32("attendee_ids", segment))
        .collect()
}

/// A bad allocation pair is dropped on its own; the rest of the event
/// still loads. Later duplicates of an item id replace earlier ones, and
/// zero quantities are not kept.
fn decode_allocations(event_id: u32, raw: &str) -> BTreeMap<u32, u32> {
    let mut allocations = BTreeMap::new();
    for segment in raw.split(';').filter(|s| !s.trim().is_empty()) {
        let Some((item_raw, quantity_raw)) = segment.split_once(':') else {
            warn!(event_id, segment, "skipping allocation without ':'");
            continue;
        };
        match (
            parse_u32("allocation item id", item_raw),
            parse_u32("allocation quantity", quantity_raw),
        ) {
            (Ok(item_id), Ok(0)) => {
                allocations.remove(&item_id);
            }
            (Ok(item_id), Ok(quantity)) => {
                allocations.insert(item_id, quantity);
            }
            (Err(err), _) | (_, Err(err)) => {
                warn!(event_id, segment, error = %err, "skipping malformed allocation");
            }
        }
    }
    allocations
}
