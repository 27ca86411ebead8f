//! Record marshaling
//!
//! Reconstructs locally owned values from fixed-size byte windows read out
//! of the target, following embedded pointers with secondary remote reads.
//! Descriptors carry explicit per-field offsets so a padding mismatch with
//! the target's real layout is an authoring decision, never an implicit
//! assumption.

use crate::memory::RemoteMemoryChannel;
use crate::traits::RemoteIo;
use winampctl_common::{Error, RemoteAddress, Result, MAX_TEXT_LEN};

/// Pointer width of the target's structs. The wire contract here is the
/// 32-bit layout; the width is descriptor data so a 64-bit target is a
/// descriptor change, not a code change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PtrWidth {
    Four,
    Eight,
}

impl PtrWidth {
    pub fn bytes(self) -> usize {
        match self {
            PtrWidth::Four => 4,
            PtrWidth::Eight => 8,
        }
    }
}

/// How one field of a remote record is interpreted.
pub enum FieldKind {
    /// Little-endian i32 copied directly from the record bytes
    Int32,
    /// Pointer to a NUL-terminated string, read bounded by [`MAX_TEXT_LEN`]
    CStringPtr,
    /// Pointer to a NUL-terminated UTF-16 string
    WideStringPtr,
    /// Pointer to an opaque blob, read bounded by [`MAX_TEXT_LEN`]
    BytesPtr,
    /// Pointer to a nested record, resolved recursively
    StructPtr(Box<RecordDescriptor>),
}

pub struct FieldDesc {
    pub name: &'static str,
    pub kind: FieldKind,
    pub offset: usize,
}

/// Layout of one remote record kind: ordered fields with explicit offsets
/// and the record's total wire size.
pub struct RecordDescriptor {
    pub name: &'static str,
    pub fields: Vec<FieldDesc>,
    pub size: usize,
    pub ptr_width: PtrWidth,
}

impl RecordDescriptor {
    /// Build a descriptor for a packed layout: offsets are cumulative sums
    /// of the preceding field sizes, no padding between fields.
    pub fn packed(
        name: &'static str,
        ptr_width: PtrWidth,
        fields: Vec<(&'static str, FieldKind)>,
    ) -> Self {
        let mut offset = 0usize;
        let fields = fields
            .into_iter()
            .map(|(name, kind)| {
                let desc = FieldDesc { name, kind, offset };
                offset += field_size(&desc.kind, ptr_width);
                desc
            })
            .collect();
        RecordDescriptor {
            name,
            fields,
            size: offset,
            ptr_width,
        }
    }
}

fn field_size(kind: &FieldKind, ptr_width: PtrWidth) -> usize {
    match kind {
        FieldKind::Int32 => 4,
        _ => ptr_width.bytes(),
    }
}

/// A field recovered from the target. Pointer-typed fields holding the
/// null address resolve to the `None` variant of their value.
#[derive(Debug)]
pub enum FieldValue {
    Int(i32),
    Text(Option<String>),
    Blob(Option<Vec<u8>>),
    Record(Option<Box<ResolvedRecord>>),
}

#[derive(Debug)]
pub struct ResolvedRecord {
    pub name: &'static str,
    pub fields: Vec<(&'static str, FieldValue)>,
}

impl ResolvedRecord {
    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.fields
            .iter()
            .find(|(n, _)| *n == name)
            .map(|(_, v)| v)
    }

    pub fn int(&self, name: &str) -> Option<i32> {
        match self.get(name) {
            Some(FieldValue::Int(v)) => Some(*v),
            _ => None,
        }
    }

    pub fn text(&self, name: &str) -> Option<&str> {
        match self.get(name) {
            Some(FieldValue::Text(Some(s))) => Some(s.as_str()),
            _ => None,
        }
    }
}

/// Resolve every field of `desc` against the raw record bytes, issuing
/// secondary remote reads for pointer-typed fields. Null pointers are never
/// dereferenced.
pub fn resolve_pointers<I: RemoteIo>(
    channel: &RemoteMemoryChannel<I>,
    raw: &[u8],
    desc: &RecordDescriptor,
) -> Result<ResolvedRecord> {
    let mut fields = Vec::with_capacity(desc.fields.len());

    for field in &desc.fields {
        let size = field_size(&field.kind, desc.ptr_width);
        let end = field.offset + size;
        if end > raw.len() {
            return Err(Error::Marshal(format!(
                "field {}.{} at {}..{} exceeds record window of {} bytes",
                desc.name,
                field.name,
                field.offset,
                end,
                raw.len()
            )));
        }
        let bytes = &raw[field.offset..end];

        let value = match &field.kind {
            FieldKind::Int32 => {
                let v = i32::from_le_bytes(bytes.try_into().expect("4-byte slice"));
                FieldValue::Int(v)
            }
            FieldKind::CStringPtr => {
                let addr = read_ptr(bytes, desc.ptr_width);
                if addr.is_null() {
                    FieldValue::Text(None)
                } else {
                    FieldValue::Text(Some(channel.read_cstring(addr)?))
                }
            }
            FieldKind::WideStringPtr => {
                let addr = read_ptr(bytes, desc.ptr_width);
                if addr.is_null() {
                    FieldValue::Text(None)
                } else {
                    FieldValue::Text(Some(channel.read_wide_string(addr)?))
                }
            }
            FieldKind::BytesPtr => {
                let addr = read_ptr(bytes, desc.ptr_width);
                if addr.is_null() {
                    FieldValue::Blob(None)
                } else {
                    FieldValue::Blob(Some(channel.read_bytes(addr, MAX_TEXT_LEN)?))
                }
            }
            FieldKind::StructPtr(nested) => {
                let addr = read_ptr(bytes, desc.ptr_width);
                if addr.is_null() {
                    FieldValue::Record(None)
                } else {
                    let nested_raw = channel.read_bytes(addr, nested.size)?;
                    let record = resolve_pointers(channel, &nested_raw, nested)?;
                    FieldValue::Record(Some(Box::new(record)))
                }
            }
        };

        fields.push((field.name, value));
    }

    Ok(ResolvedRecord {
        name: desc.name,
        fields,
    })
}

fn read_ptr(bytes: &[u8], width: PtrWidth) -> RemoteAddress {
    let raw = match width {
        PtrWidth::Four => u32::from_le_bytes(bytes.try_into().expect("4-byte slice")) as usize,
        PtrWidth::Eight => u64::from_le_bytes(bytes.try_into().expect("8-byte slice")) as usize,
    };
    RemoteAddress::new(raw)
}
