use super::{DecodeError, LineCodec, parse_id, parse_u32, split_fields};
use crate::model::InventoryItem;
use crate::repo::Table;

impl LineCodec for InventoryItem {
    const TABLE: Table = Table::Inventory;
    const MIN_FIELDS: usize = 4;

    fn encode(&self) -> String {
        format!(
            "{},{},{},{},{}",
            self.id, self.name, self.total_quantity, self.allocated_quantity, self.description
        )
    }

    /// The description runs to the end of the line and may hold commas.
    /// The stored allocated quantity is provisional: the repository
    /// recomputes it from the events table after every load.
    fn decode(line: &str) -> Result<Self, DecodeError> {
        let fields = split_fields(line, Self::MIN_FIELDS, 5)?;

        Ok(Self {
            id: parse_id(fields[0])?,
            name: fields[1].to_string(),
            total_quantity: parse_u32("total_quantity", fields[2])?,
            allocated_quantity: parse_u32("allocated_quantity", fields[3])?,
            description: fields.get(4).map_or_else(String::new, |d| (*d).to_string()),
        })
    }
}
