// ABOUTME: Per-cell integrity checksum shared by the save and restore pipelines
// ABOUTME: CRC-32 over key, family, column, value and formatted timestamp

use chrono::{SecondsFormat, TimeZone, Utc};
use crc32fast::Hasher;

/// Format a nanosecond timestamp the way the checksum consumes it
///
/// Always UTC with exactly nine fractional digits, e.g.
/// `2017-07-14T02:40:00.123456789Z`.
pub fn format_timestamp(timestamp_nanos: i64) -> String {
    Utc.timestamp_nanos(timestamp_nanos)
        .to_rfc3339_opts(SecondsFormat::Nanos, true)
}

/// Compute the checksum of one cell
///
/// Fields are hashed in a fixed order: row key, column family, column,
/// raw value bytes, then the formatted timestamp. Changing the order or the
/// timestamp format invalidates every snapshot written so far.
pub fn compute_checksum(
    row_key: &str,
    column_family: &str,
    column: &str,
    value: &[u8],
    timestamp_nanos: i64,
) -> u32 {
    let mut hasher = Hasher::new();
    hasher.update(row_key.as_bytes());
    hasher.update(column_family.as_bytes());
    hasher.update(column.as_bytes());
    hasher.update(value);
    hasher.update(format_timestamp(timestamp_nanos).as_bytes());
    hasher.finalize()
}
