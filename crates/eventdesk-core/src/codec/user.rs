use super::{DecodeError, LineCodec, parse_id, parse_ordinal, parse_u32, split_fields_truncating};
use crate::model::{Role, User};
use crate::repo::Table;

impl LineCodec for User {
    const TABLE: Table = Table::Users;
    const MIN_FIELDS: usize = 4;

    fn encode(&self) -> String {
        format!(
            "{},{},{},{}",
            self.id,
            self.username,
            self.password,
            self.role.ordinal()
        )
    }

    /// A line with an unknown role (including ordinal `2`, "no role") has
    /// no user to restore and is rejected outright.
    fn decode(line: &str) -> Result<Self, DecodeError> {
        let fields = split_fields_truncating(line, Self::MIN_FIELDS, Self::MIN_FIELDS)?;

        let id = parse_id(fields[0])?;
        let ordinal = parse_ordinal("role", fields[3])?;
        let role = Role::from_ordinal(ordinal)
            .ok_or_else(|| DecodeError::UnknownRole(fields[3].to_string()))?;

        Ok(Self {
            id,
            username: fields[1].to_string(),
            password: fields[2].to_string(),
            role,
        })
    }
}
