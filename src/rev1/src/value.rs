//! In-memory representation of decoded level values.

use crate::tag::Tag;
use serde::Serialize;
use uuid::Uuid;

/// A single decoded field value.
///
/// `Null` stands in for every "absent" encoding the format has: a string
/// with length `-1`, an array with length `-1`, or a record whose presence
/// byte is zero. Writing is always driven by the declared field tag, so a
/// `Null` re-encodes as whichever absent form that tag uses.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Value {
    Null,
    Bool(bool),
    Byte(u8),
    Int(i32),
    UInt(u32),
    Float(f32),
    Str(String),
    Guid(Uuid),
    /// An enum transported through the polymorphic slot; carries the
    /// original fully-qualified enum name next to the underlying value
    /// (an `Int`, or an `Int` array for enum arrays).
    Enum { name: String, value: Box<Value> },
    /// A composite record; `tag` is the record kind, `fields` follow the
    /// registry schema in order.
    Record { tag: Tag, fields: Vec<Value> },
    /// A homogeneous array; `tag` is the full array tag (element tag with
    /// the array bit, or the jagged-int-array tag).
    Array { tag: Tag, items: Vec<Value> },
    /// A Color32 array, stored as its flat 4-bytes-per-element blob.
    Bytes(Vec<u8>),
    Mesh(Box<Mesh>),
}

impl Value {
    /// Short kind name for error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Byte(_) => "byte",
            Value::Int(_) => "int",
            Value::UInt(_) => "uint",
            Value::Float(_) => "float",
            Value::Str(_) => "string",
            Value::Guid(_) => "guid",
            Value::Enum { .. } => "enum",
            Value::Record { .. } => "record",
            Value::Array { .. } => "array",
            Value::Bytes(_) => "bytes",
            Value::Mesh(_) => "mesh",
        }
    }

    /// True for a present, non-empty array value. Drives the mesh flags
    /// word.
    pub(crate) fn is_non_empty_array(&self) -> bool {
        match self {
            Value::Array { items, .. } => !items.is_empty(),
            Value::Bytes(bytes) => !bytes.is_empty(),
            Value::Null => false,
            _ => true,
        }
    }

    pub fn as_guid(&self) -> Option<Uuid> {
        match self {
            Value::Guid(id) => Some(*id),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }
}

/// A mesh asset payload.
///
/// Which of the optional arrays are present on the wire depends on the
/// file version and, for version 4 files, on a flags word computed from
/// the color arrays (see [`MeshLayout`]). Absent arrays are `Null`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Mesh {
    pub name: Option<String>,
    /// Vector3 array.
    pub verts: Value,
    /// Vector2 arrays.
    pub uv: Value,
    pub uv2: Value,
    pub uv3: Value,
    /// Vector3 array.
    pub norms: Value,
    /// Vector4 array.
    pub tangs: Value,
    /// Color array; only on the wire when the flags word has bit 0.
    pub colors: Value,
    /// Color32 blob; only on the wire when the flags word has bit 1.
    pub colors32: Value,
    /// BoneWeight array; version 4 files only.
    pub bone_weights: Value,
    /// Matrix4x4 array; version 4 files only.
    pub bindposes: Value,
    /// Jagged int array of triangle indices, one inner array per submesh.
    pub tris: Value,
}

/// Wire layout of a mesh for a given `(file version, flags word)` pair.
///
/// Read and write must derive the layout from the same rule or a rewritten
/// file would not round-trip: version 3 files have no flags word and always
/// carry `colors`; version 4 files store a flags word whose bits mirror
/// which color arrays are present and non-empty.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct MeshLayout {
    pub colors: bool,
    pub colors32: bool,
    pub skinning: bool,
}

impl MeshLayout {
    pub fn from_flags(version: i32, flags: i32) -> Self {
        MeshLayout {
            colors: flags & 1 != 0,
            colors32: flags & 2 != 0,
            skinning: version >= 4,
        }
    }

    /// The canonical flags word a writer emits for `mesh`.
    pub fn flags_for(version: i32, mesh: &Mesh) -> i32 {
        if version == 3 {
            1
        } else {
            (mesh.colors.is_non_empty_array() as i32) | ((mesh.colors32.is_non_empty_array() as i32) << 1)
        }
    }
}
