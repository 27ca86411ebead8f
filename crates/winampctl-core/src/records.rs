//! Wire layouts for the media-library query structs
//!
//! The target hands out `itemRecord` arrays and mutates an `mlQueryStruct`
//! in place. Both are 32-bit packed layouts; the field order below is part
//! of the wire contract and must not be reordered.
//!
//! ```text
//! itemRecord:    filename* title* album* artist* comment* genre*
//!                year:i32 track:i32 length:i32 extended_info*   (40 bytes)
//! mlQueryStruct: query* max_results:i32
//!                results { items* size:i32 alloc:i32 }          (20 bytes)
//! ```

use crate::marshal::{FieldKind, FieldValue, PtrWidth, RecordDescriptor, ResolvedRecord};
use winampctl_common::{Error, ItemRecord, RemoteAddress, Result};

/// Wire size of one itemRecord in the 32-bit layout.
pub const ITEM_RECORD_SIZE: usize = 40;

/// Wire size of the query struct in the 32-bit layout.
pub const QUERY_DESCRIPTOR_SIZE: usize = 20;

/// Descriptor for the target's `itemRecord` layout.
pub fn item_record_descriptor() -> RecordDescriptor {
    let desc = RecordDescriptor::packed(
        "itemRecord",
        PtrWidth::Four,
        vec![
            ("filename", FieldKind::CStringPtr),
            ("title", FieldKind::CStringPtr),
            ("album", FieldKind::CStringPtr),
            ("artist", FieldKind::CStringPtr),
            ("comment", FieldKind::CStringPtr),
            ("genre", FieldKind::CStringPtr),
            ("year", FieldKind::Int32),
            ("track", FieldKind::Int32),
            ("length", FieldKind::Int32),
            ("extended_info", FieldKind::BytesPtr),
        ],
    );
    debug_assert_eq!(desc.size, ITEM_RECORD_SIZE);
    desc
}

/// Conversion from a marshaled record to an owned snapshot type.
pub trait FromResolved {
    fn from_resolved(record: &ResolvedRecord) -> Self;
}

impl FromResolved for ItemRecord {
    fn from_resolved(record: &ResolvedRecord) -> ItemRecord {
        ItemRecord {
            filename: record.text("filename").map(str::to_string),
            title: record.text("title").map(str::to_string),
            album: record.text("album").map(str::to_string),
            artist: record.text("artist").map(str::to_string),
            comment: record.text("comment").map(str::to_string),
            genre: record.text("genre").map(str::to_string),
            year: record.int("year").unwrap_or(0),
            track: record.int("track").unwrap_or(0),
            length: record.int("length").unwrap_or(0),
            extended_info: match record.get("extended_info") {
                Some(FieldValue::Blob(Some(b))) => Some(b.clone()),
                _ => None,
            },
        }
    }
}

/// The `itemRecordList` the target embeds in the query struct. Owned by the
/// target; `alloc` is its internal capacity and unused here.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ItemRecordList {
    pub items: RemoteAddress,
    pub size: i32,
    pub alloc: i32,
}

impl ItemRecordList {
    pub fn empty() -> Self {
        ItemRecordList {
            items: RemoteAddress::NULL,
            size: 0,
            alloc: 0,
        }
    }
}

/// The `mlQueryStruct` written into the target and mutated by it in place:
/// the controller writes it with an empty result list, the target
/// overwrites the embedded list with the populated one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueryDescriptor {
    pub query: RemoteAddress,
    pub max_results: i32,
    pub results: ItemRecordList,
}

impl QueryDescriptor {
    pub fn new(query: RemoteAddress, max_results: i32) -> Self {
        QueryDescriptor {
            query,
            max_results,
            results: ItemRecordList::empty(),
        }
    }

    /// Encode in the 32-bit wire layout.
    pub fn encode(&self) -> [u8; QUERY_DESCRIPTOR_SIZE] {
        let mut out = [0u8; QUERY_DESCRIPTOR_SIZE];
        out[0..4].copy_from_slice(&(self.query.raw() as u32).to_le_bytes());
        out[4..8].copy_from_slice(&self.max_results.to_le_bytes());
        out[8..12].copy_from_slice(&(self.results.items.raw() as u32).to_le_bytes());
        out[12..16].copy_from_slice(&self.results.size.to_le_bytes());
        out[16..20].copy_from_slice(&self.results.alloc.to_le_bytes());
        out
    }

    /// Decode the struct the target mutated in place.
    pub fn decode(raw: &[u8]) -> Result<Self> {
        if raw.len() < QUERY_DESCRIPTOR_SIZE {
            return Err(Error::Marshal(format!(
                "query struct window is {} bytes, need {}",
                raw.len(),
                QUERY_DESCRIPTOR_SIZE
            )));
        }
        let u32_at = |off: usize| {
            u32::from_le_bytes(raw[off..off + 4].try_into().expect("4-byte slice"))
        };
        let i32_at = |off: usize| {
            i32::from_le_bytes(raw[off..off + 4].try_into().expect("4-byte slice"))
        };
        Ok(QueryDescriptor {
            query: RemoteAddress::new(u32_at(0) as usize),
            max_results: i32_at(4),
            results: ItemRecordList {
                items: RemoteAddress::new(u32_at(8) as usize),
                size: i32_at(12),
                alloc: i32_at(16),
            },
        })
    }
}
