//! Text encoding of the lock state and its placement in a host record list.
//!
//! A record has the form `TAG,<ignored prefix>,<base64 payload>`. The payload
//! packs one bit per slot into `ceil(N / 8)` bytes.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::{Deserialize, Serialize};

use crate::bitset::LockBitset;
use crate::config::{ConfigError, LockConfig};
use crate::store::RecordStore;

/// Tag of the lock record written by the loot container UI.
pub const DEFAULT_TAG: &str = "$varQuartzLootContainerLockedSlots";

const SEPARATOR: char = ',';

/// Position of a slot's bit within its payload byte.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BitOrder {
    /// Slot `8k` is the most significant bit of byte `k`.
    #[default]
    Msb0,
    /// Slot `8k` is the least significant bit of byte `k`.
    Lsb0,
}

impl BitOrder {
    fn mask(self, index: usize) -> u8 {
        match self {
            BitOrder::Msb0 => 0x80 >> (index % 8),
            BitOrder::Lsb0 => 1 << (index % 8),
        }
    }
}

impl std::str::FromStr for BitOrder {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "msb0" | "msb" => Ok(BitOrder::Msb0),
            "lsb0" | "lsb" => Ok(BitOrder::Lsb0),
            _ => Err(format!("unknown bit order: {}", s)),
        }
    }
}

impl std::fmt::Display for BitOrder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BitOrder::Msb0 => write!(f, "msb0"),
            BitOrder::Lsb0 => write!(f, "lsb0"),
        }
    }
}

/// Reasons a located lock record could not be parsed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MalformedRecord {
    #[error("expected 3 fields, found {0}")]
    FieldCount(usize),
    #[error("tag mismatch: {0:?}")]
    TagMismatch(String),
    #[error("invalid ignored prefix {0:?}")]
    Prefix(String),
    #[error("ignored prefix {prefix} exceeds {len} slots")]
    PrefixOutOfRange { prefix: usize, len: usize },
    #[error("invalid payload: {0}")]
    Payload(#[from] base64::DecodeError),
}

/// Encodes lock state to and from its record string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LockRecordCodec {
    tag: String,
    bit_order: BitOrder,
}

impl LockRecordCodec {
    pub fn new(tag: impl Into<String>, bit_order: BitOrder) -> Result<Self, ConfigError> {
        let tag = tag.into();
        if tag.is_empty() {
            return Err(ConfigError::EmptyTag);
        }
        if tag.contains(SEPARATOR) {
            return Err(ConfigError::TagComma(tag));
        }
        Ok(LockRecordCodec { tag, bit_order })
    }

    pub fn from_config(config: &LockConfig) -> Result<Self, ConfigError> {
        Self::new(config.tag.clone(), config.bit_order)
    }

    pub fn tag(&self) -> &str {
        &self.tag
    }

    pub fn bit_order(&self) -> BitOrder {
        self.bit_order
    }

    /// Encodes the bitset and its ignored prefix as a record string.
    pub fn encode(&self, bitset: &LockBitset) -> String {
        let mut bytes = vec![0u8; bitset.len().div_ceil(8)];
        for index in bitset.locked_indices() {
            bytes[index / 8] |= self.bit_order.mask(index);
        }
        format!(
            "{}{SEPARATOR}{}{SEPARATOR}{}",
            self.tag,
            bitset.ignored_prefix(),
            STANDARD.encode(&bytes)
        )
    }

    /// Decodes a record into a bitset over exactly `len` slots.
    ///
    /// Payload bits past `len` are ignored; slots the payload does not cover
    /// decode as unlocked.
    pub fn decode(&self, record: &str, len: usize) -> Result<LockBitset, MalformedRecord> {
        let fields: Vec<&str> = record.split(SEPARATOR).collect();
        let [tag, prefix, payload] = fields[..] else {
            return Err(MalformedRecord::FieldCount(fields.len()));
        };
        if tag != self.tag {
            return Err(MalformedRecord::TagMismatch(tag.to_string()));
        }

        let prefix = parse_prefix(prefix)?;
        if prefix > len {
            return Err(MalformedRecord::PrefixOutOfRange { prefix, len });
        }

        let bytes = STANDARD.decode(payload)?;
        let locked = (0..len).filter(|&index| {
            bytes
                .get(index / 8)
                .is_some_and(|byte| byte & self.bit_order.mask(index) != 0)
        });
        LockBitset::from_locked(len, prefix, locked)
            .map_err(|_| MalformedRecord::PrefixOutOfRange { prefix, len })
    }

    /// Returns true if `entry` is a lock record, i.e. its first field is the tag.
    pub fn is_lock_record(&self, entry: &str) -> bool {
        entry.split(SEPARATOR).next() == Some(self.tag.as_str())
    }

    /// Returns the first lock record in the store, if any.
    pub fn find<S: RecordStore>(&self, store: &S) -> Result<Option<String>, S::Error> {
        Ok(store
            .find(&|entry| self.is_lock_record(entry))?
            .map(|(_, record)| record))
    }

    /// Overwrites the existing lock record in place, or inserts `record` at the
    /// head of the list when there is none.
    pub fn find_and_replace<S: RecordStore>(
        &self,
        store: &mut S,
        record: String,
    ) -> Result<(), S::Error> {
        match store.find(&|entry| self.is_lock_record(entry))? {
            Some((index, _)) => store.replace(index, record),
            None => store.insert_front(record),
        }
    }
}

impl Default for LockRecordCodec {
    fn default() -> Self {
        LockRecordCodec {
            tag: DEFAULT_TAG.to_string(),
            bit_order: BitOrder::default(),
        }
    }
}

fn parse_prefix(field: &str) -> Result<usize, MalformedRecord> {
    if field.is_empty() || !field.bytes().all(|b| b.is_ascii_digit()) {
        return Err(MalformedRecord::Prefix(field.to_string()));
    }
    field
        .parse()
        .map_err(|_| MalformedRecord::Prefix(field.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryRecords;

    fn codec() -> LockRecordCodec {
        LockRecordCodec::new("LOCKS", BitOrder::Msb0).unwrap()
    }

    #[test]
    fn encode_two_byte_payload() {
        let bits = LockBitset::from_locked(10, 2, [3, 7]).unwrap();
        assert_eq!(codec().encode(&bits), "LOCKS,2,EQA=");
    }

    #[test]
    fn encode_lsb0_payload() {
        let codec = LockRecordCodec::new("LOCKS", BitOrder::Lsb0).unwrap();
        let bits = LockBitset::from_locked(10, 2, [3, 7]).unwrap();
        assert_eq!(codec.encode(&bits), "LOCKS,2,iAA=");
    }

    #[test]
    fn encode_empty_bitset() {
        assert_eq!(codec().encode(&LockBitset::new(0)), "LOCKS,0,");
        assert_eq!(codec().encode(&LockBitset::new(1)), "LOCKS,0,AA==");
    }

    #[test]
    fn decode_round_trip() {
        let codec = codec();
        let bits = LockBitset::from_locked(27, 4, [0, 1, 2, 3, 9, 26]).unwrap();
        let decoded = codec.decode(&codec.encode(&bits), 27).unwrap();
        assert_eq!(decoded, bits);
    }

    #[test]
    fn decode_ignores_bits_past_len() {
        // 0xFF covers eight slots, only five exist.
        let decoded = codec().decode("LOCKS,0,/w==", 5).unwrap();
        assert_eq!(decoded.total_locked_count(), 5);
        assert_eq!(decoded.len(), 5);
    }

    #[test]
    fn decode_short_payload_defaults_to_unlocked() {
        let decoded = codec().decode("LOCKS,1,gA==", 20).unwrap();
        assert_eq!(decoded.len(), 20);
        assert_eq!(decoded.ignored_prefix(), 1);
        assert_eq!(decoded.locked_indices().collect::<Vec<_>>(), vec![0]);
    }

    #[test]
    fn decode_rejects_field_count() {
        assert_eq!(
            codec().decode("LOCKS,1", 8),
            Err(MalformedRecord::FieldCount(2))
        );
        assert_eq!(
            codec().decode("LOCKS,1,AA==,extra", 8),
            Err(MalformedRecord::FieldCount(4))
        );
    }

    #[test]
    fn decode_rejects_other_tag() {
        assert_eq!(
            codec().decode("OTHER,1,AA==", 8),
            Err(MalformedRecord::TagMismatch("OTHER".to_string()))
        );
    }

    #[test]
    fn decode_rejects_bad_prefix() {
        for prefix in ["x", "", "-1", "+1", "1.5"] {
            let record = format!("LOCKS,{prefix},AA==");
            assert_eq!(
                codec().decode(&record, 8),
                Err(MalformedRecord::Prefix(prefix.to_string())),
                "prefix {prefix:?}"
            );
        }
    }

    #[test]
    fn decode_rejects_prefix_past_len() {
        assert_eq!(
            codec().decode("LOCKS,9,AA==", 8),
            Err(MalformedRecord::PrefixOutOfRange { prefix: 9, len: 8 })
        );
    }

    #[test]
    fn decode_rejects_bad_payload() {
        assert!(matches!(
            codec().decode("LOCKS,0,A*==", 8),
            Err(MalformedRecord::Payload(_))
        ));
        assert!(matches!(
            codec().decode("LOCKS,0,AA", 8),
            Err(MalformedRecord::Payload(_))
        ));
    }

    #[test]
    fn bit_order_from_str() {
        assert_eq!("MSB0".parse::<BitOrder>(), Ok(BitOrder::Msb0));
        assert_eq!("lsb".parse::<BitOrder>(), Ok(BitOrder::Lsb0));
        assert!("middle".parse::<BitOrder>().is_err());
        assert_eq!(BitOrder::Lsb0.to_string(), "lsb0");
    }

    #[test]
    fn tag_validation() {
        assert_eq!(
            LockRecordCodec::new("", BitOrder::Msb0),
            Err(ConfigError::EmptyTag)
        );
        assert_eq!(
            LockRecordCodec::new("a,b", BitOrder::Msb0),
            Err(ConfigError::TagComma("a,b".to_string()))
        );
    }

    #[test]
    fn is_lock_record_checks_first_field_only() {
        let codec = codec();
        assert!(codec.is_lock_record("LOCKS,0,AA=="));
        assert!(codec.is_lock_record("LOCKS"));
        assert!(!codec.is_lock_record("LOCKSMITH,0,AA=="));
        assert!(!codec.is_lock_record("steam_123,LOCKS"));
    }

    #[test]
    fn find_and_replace_inserts_into_empty_list() {
        let codec = codec();
        let mut store = MemoryRecords::new();
        codec
            .find_and_replace(&mut store, "LOCKS,0,AA==".to_string())
            .unwrap();
        assert_eq!(store.as_slice(), &["LOCKS,0,AA=="]);
    }

    #[test]
    fn find_and_replace_overwrites_in_place() {
        let codec = codec();
        let mut store = MemoryRecords::from(vec![
            "player_a".to_string(),
            "LOCKS,0,AA==".to_string(),
            "player_b".to_string(),
        ]);
        codec
            .find_and_replace(&mut store, "LOCKS,1,gA==".to_string())
            .unwrap();
        assert_eq!(store.as_slice(), &["player_a", "LOCKS,1,gA==", "player_b"]);
        assert_eq!(
            codec.find(&store).unwrap(),
            Some("LOCKS,1,gA==".to_string())
        );
    }

    #[test]
    fn find_and_replace_prepends_when_absent() {
        let codec = codec();
        let mut store = MemoryRecords::from(vec!["player_a".to_string()]);
        codec
            .find_and_replace(&mut store, "LOCKS,0,AA==".to_string())
            .unwrap();
        assert_eq!(store.as_slice(), &["LOCKS,0,AA==", "player_a"]);
    }

    #[test]
    fn find_absent() {
        let store = MemoryRecords::from(vec!["player_a".to_string()]);
        assert_eq!(codec().find(&store).unwrap(), None);
    }
}
