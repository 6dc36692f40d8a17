//! Presence tracking for remote users.

use crate::error::ChoError;
use crate::flags::Privileges;
use crate::packets::PacketReader;

// ── Presence ─────────────────────────────────────────────────────

/// A snapshot of another connected user's public state as broadcast by
/// the server. Identity is `user_id`; there is no partial-field update,
/// only replacement.
#[derive(Debug, Clone, PartialEq)]
pub struct Presence {
    pub user_id: i32,
    pub username: String,
    /// Hours from UTC. The wire carries this biased by +24.
    pub utc_offset: i8,
    pub country: u8,
    pub privileges: Privileges,
    pub latitude: f32,
    pub longitude: f32,
    pub rank: i32,
}

impl Presence {
    /// Decode one presence payload from the reader.
    pub fn from_reader(reader: &mut PacketReader<'_>) -> Result<Self, ChoError> {
        Ok(Self {
            user_id: reader.read_i32()?,
            username: reader.read_str()?,
            utc_offset: (i16::from(reader.read_u8()?) - 24) as i8,
            country: reader.read_u8()?,
            privileges: Privileges::from_bits_truncate(u32::from(reader.read_u8()?)),
            latitude: reader.read_f32()?,
            longitude: reader.read_f32()?,
            rank: reader.read_i32()?,
        })
    }
}

// ── PresenceRegistry ─────────────────────────────────────────────

/// In-memory set of currently-known presences, keyed by user id.
///
/// Insertion order is preserved for iteration. The registry never
/// holds two entries with the same user id.
#[derive(Debug, Default)]
pub struct PresenceRegistry {
    entries: Vec<Presence>,
}

impl PresenceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a presence. First-seen wins: if an entry with the same
    /// user id already exists, the incoming one is dropped and no
    /// fields are updated.
    pub fn add(&mut self, presence: Presence) {
        if self.get(presence.user_id).is_some() {
            return;
        }
        self.entries.push(presence);
    }

    /// Remove the entry with the given user id, reporting whether a
    /// removal occurred.
    pub fn remove(&mut self, user_id: i32) -> bool {
        match self.entries.iter().position(|p| p.user_id == user_id) {
            Some(index) => {
                self.entries.remove(index);
                true
            }
            None => false,
        }
    }

    pub fn get(&self, user_id: i32) -> Option<&Presence> {
        self.entries.iter().find(|p| p.user_id == user_id)
    }

    /// Number of tracked presences.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &Presence> {
        self.entries.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::packets::{HEADER_SIZE, PacketId, PacketWriter};

    fn presence(user_id: i32, username: &str) -> Presence {
        Presence {
            user_id,
            username: username.to_owned(),
            utc_offset: 2,
            country: 192,
            privileges: Privileges::NORMAL,
            latitude: 52.2,
            longitude: 21.0,
            rank: 1337,
        }
    }

    #[test]
    fn add_is_idempotent_and_first_seen_wins() {
        let mut registry = PresenceRegistry::new();
        registry.add(presence(1, "alice"));
        registry.add(presence(2, "bob"));
        assert_eq!(registry.len(), 2);

        // same id, different fields: the original entry is preserved
        registry.add(presence(1, "impostor"));
        assert_eq!(registry.len(), 2);
        assert_eq!(registry.get(1).unwrap().username, "alice");
    }

    #[test]
    fn remove_reports_whether_anything_was_removed() {
        let mut registry = PresenceRegistry::new();
        registry.add(presence(1, "alice"));

        assert!(!registry.remove(99));
        assert_eq!(registry.len(), 1);

        assert!(registry.remove(1));
        assert!(registry.is_empty());
        assert!(!registry.remove(1));
    }

    #[test]
    fn iteration_preserves_insertion_order() {
        let mut registry = PresenceRegistry::new();
        for id in [5, 3, 9] {
            registry.add(presence(id, "user"));
        }
        let ids: Vec<i32> = registry.iter().map(|p| p.user_id).collect();
        assert_eq!(ids, [5, 3, 9]);
    }

    #[test]
    fn from_reader_decodes_the_wire_layout() {
        let packet = PacketWriter::new()
            .write_i32(1001)
            .write_str("peppy")
            .write_u8(24 + 9) // utc+9 on the wire
            .write_u8(111)
            .write_u8((Privileges::NORMAL | Privileges::SUPPORTER).bits() as u8)
            .write_f32(35.6)
            .write_f32(139.6)
            .write_i32(1)
            .finish(PacketId::UserPresence);

        let mut reader = PacketReader::new(&packet[HEADER_SIZE..]);
        let decoded = Presence::from_reader(&mut reader).unwrap();
        assert!(reader.is_empty());

        assert_eq!(decoded.user_id, 1001);
        assert_eq!(decoded.username, "peppy");
        assert_eq!(decoded.utc_offset, 9);
        assert_eq!(decoded.country, 111);
        assert_eq!(
            decoded.privileges,
            Privileges::NORMAL | Privileges::SUPPORTER
        );
        assert_eq!(decoded.latitude, 35.6);
        assert_eq!(decoded.longitude, 139.6);
        assert_eq!(decoded.rank, 1);
    }
}
