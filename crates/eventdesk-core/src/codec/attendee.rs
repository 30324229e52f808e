use super::{DecodeError, LineCodec, parse_id, parse_u32, split_fields_truncating};
use crate::model::Attendee;
use crate::repo::Table;

impl LineCodec for Attendee {
    const TABLE: Table = Table::Attendees;
    const MIN_FIELDS: usize = 4;

    fn encode(&self) -> String {
        format!(
            "{},{},{},{},{}",
            self.id,
            self.name,
            self.contact_info,
            self.event_id,
            u8::from(self.checked_in)
        )
    }

    /// The check-in flag is `1` for true; anything else, or a missing fifth
    /// field, reads as not checked in.
    fn decode(line: &str) -> Result<Self, DecodeError> {
        let fields = split_fields_truncating(line, Self::MIN_FIELDS, 5)?;

        Ok(Self {
            id: parse_id(fields[0])?,
            name: fields[1].to_string(),
            contact_info: fields[2].to_string(),
            event_id: parse_u32("event_id", fields[3])?,
            checked_in: fields.get(4).is_some_and(|flag| flag.trim() == "1"),
        })
    }
}
