//! Slot number to wall-clock time.
//!
//! Two linear schedules: the Byron era starting at slot 0 with 20 second
//! slots, and the Shelley era from slot 4492800 with 1 second slots. The
//! schedules meet exactly at the transition slot.

use chrono::{DateTime, SecondsFormat, Utc};

pub const BYRON_SLOT: u64 = 0;
pub const BYRON_UNIX: i64 = 1_506_203_091;
pub const BYRON_SLOT_LENGTH: i64 = 20;

pub const SHELLEY_SLOT: u64 = 4_492_800;
pub const SHELLEY_UNIX: i64 = 1_596_059_091;
pub const SHELLEY_SLOT_LENGTH: i64 = 1;

fn linear_timestamp(known_slot: u64, known_time: i64, slot_length: i64, slot: u64) -> i64 {
    let elapsed = i64::try_from(slot - known_slot).unwrap_or(i64::MAX);
    known_time.saturating_add(elapsed.saturating_mul(slot_length))
}

/// Unix time (seconds) at the start of `slot`
pub fn slot_to_unix(slot: u64) -> i64 {
    if slot < SHELLEY_SLOT {
        linear_timestamp(BYRON_SLOT, BYRON_UNIX, BYRON_SLOT_LENGTH, slot)
    } else {
        linear_timestamp(SHELLEY_SLOT, SHELLEY_UNIX, SHELLEY_SLOT_LENGTH, slot)
    }
}

pub fn slot_to_datetime(slot: u64) -> DateTime<Utc> {
    DateTime::<Utc>::from_timestamp(slot_to_unix(slot), 0).unwrap_or(DateTime::<Utc>::MAX_UTC)
}

/// RFC 3339 rendering with millisecond precision, e.g. `2020-07-29T21:44:51.000Z`
pub fn slot_to_timestamp(slot: u64) -> String {
    slot_to_datetime(slot).to_rfc3339_opts(SecondsFormat::Millis, true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_byron_genesis() {
        assert_eq!(slot_to_unix(0), BYRON_UNIX);
        assert_eq!(slot_to_timestamp(0), "2017-09-23T21:44:51.000Z");
    }

    #[test]
    fn test_byron_slots_are_twenty_seconds() {
        assert_eq!(slot_to_unix(10) - slot_to_unix(9), 20);
        assert_eq!(slot_to_unix(SHELLEY_SLOT - 1), SHELLEY_UNIX - 20);
    }

    #[test]
    fn test_shelley_transition() {
        assert_eq!(slot_to_unix(SHELLEY_SLOT), SHELLEY_UNIX);
        assert_eq!(slot_to_timestamp(SHELLEY_SLOT), "2020-07-29T21:44:51.000Z");
        assert_eq!(slot_to_unix(SHELLEY_SLOT + 1) - slot_to_unix(SHELLEY_SLOT), 1);
    }

    #[test]
    fn test_schedules_meet_at_transition() {
        let byron_extrapolated =
            linear_timestamp(BYRON_SLOT, BYRON_UNIX, BYRON_SLOT_LENGTH, SHELLEY_SLOT);
        assert_eq!(byron_extrapolated, slot_to_unix(SHELLEY_SLOT));
    }

    #[test]
    fn test_absurd_slot_does_not_panic() {
        assert_eq!(slot_to_unix(u64::MAX), i64::MAX);
        assert_eq!(slot_to_datetime(u64::MAX), DateTime::<Utc>::MAX_UTC);
    }
}
