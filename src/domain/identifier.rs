//! Short, time-derived identifiers for usernames and repository names
//!
//! Identifiers encode the number of milliseconds since [`ID_EPOCH`] as a
//! zig-zag varint, hex encoded. They are not unique on their own: two calls
//! within the same millisecond return the same token, and callers are
//! expected to retry on collision.

use chrono::{DateTime, TimeZone, Utc};

/// Fixed epoch all identifiers are measured from (2019-12-19T12:00:00Z)
pub const ID_EPOCH_SECS: i64 = 1_576_756_800;

/// Maximum encoded length of a 64-bit varint
const MAX_VARINT_LEN: usize = 10;

/// Source of candidate identifiers
pub trait IdGenerator: Send + Sync + std::fmt::Debug {
    fn generate(&self) -> String;
}

/// Identifier generator driven by the system clock
#[derive(Debug, Clone, Copy, Default)]
pub struct TimeIdGenerator;

impl IdGenerator for TimeIdGenerator {
    fn generate(&self) -> String {
        id_at(Utc::now())
    }
}

/// The identifier epoch as a timestamp
pub fn id_epoch() -> DateTime<Utc> {
    Utc.timestamp_opt(ID_EPOCH_SECS, 0)
        .single()
        .unwrap_or(DateTime::<Utc>::MIN_UTC)
}

/// Identifier for a given instant
pub fn id_at(now: DateTime<Utc>) -> String {
    let millis = now.signed_duration_since(id_epoch()).num_milliseconds();
    hex::encode(encode_varint(millis))
}

/// Zig-zag signed varint encoding (the same layout as protobuf `sint64`)
pub fn encode_varint(value: i64) -> Vec<u8> {
    let mut zigzag = ((value << 1) ^ (value >> 63)) as u64;
    let mut out = Vec::with_capacity(MAX_VARINT_LEN);

    while zigzag >= 0x80 {
        out.push((zigzag as u8) | 0x80);
        zigzag >>= 7;
    }
    out.push(zigzag as u8);

    out
}

/// Hands out `01`, `02`, ... so every call yields a fresh name
#[cfg(test)]
#[derive(Debug, Default)]
pub struct SequenceIds(std::sync::atomic::AtomicU32);

#[cfg(test)]
impl IdGenerator for SequenceIds {
    fn generate(&self) -> String {
        let n = self.0.fetch_add(1, std::sync::atomic::Ordering::SeqCst) + 1;
        format!("{:02x}", n)
    }
}
