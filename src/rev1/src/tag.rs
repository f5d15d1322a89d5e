//! Wire type tags for level command streams.
//!
//! Every value in a level file is described by a 16-bit tag. The tag space
//! has three orthogonal bit regions layered over a base kind:
//!
//! - bit 7 (`ARRAY_FLAG`): the value is a length-prefixed homogeneous
//!   sequence of the base kind (length `-1` encodes an absent array)
//! - bit 6 (`OBJECT_FLAG`): the base kind is a composite record with a
//!   schema entry; records carry a one-byte presence flag on the wire
//! - bit 5 (`EXISTING_OBJECT_FLAG`): decode the record body in place,
//!   without the presence flag
//! - bit 8 (`CMD_FLAG`): the tag names a command rather than a value
//!
//! The numbering is fixed by the file format and must not be changed.

use serde::Serializer;
use std::fmt;

/// A 16-bit wire type tag.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Tag(pub u16);

impl Tag {
    pub const ARRAY_FLAG: u16 = 128;
    pub const OBJECT_FLAG: u16 = 64;
    pub const EXISTING_OBJECT_FLAG: u16 = 32;
    pub const CMD_FLAG: u16 = 256;

    // Scalar kinds
    pub const STRING: Tag = Tag(0);
    pub const BOOL: Tag = Tag(1);
    pub const BYTE: Tag = Tag(2);
    pub const UINT: Tag = Tag(7);
    pub const INT: Tag = Tag(8);
    pub const FLOAT: Tag = Tag(11);
    pub const GUID: Tag = Tag(13);

    // Fixed-shape composites
    pub const VECTOR2: Tag = Tag(14);
    pub const VECTOR3: Tag = Tag(15);
    pub const VECTOR4: Tag = Tag(16);
    pub const COLOR: Tag = Tag(17);
    pub const QUATERNION: Tag = Tag(18);
    pub const ENUM: Tag = Tag(19);
    pub const OBJECT: Tag = Tag(20);
    pub const VECTOR3B: Tag = Tag(21);
    pub const MATRIX4X4: Tag = Tag(22);
    pub const COLOR32: Tag = Tag(23);
    pub const BONE_WEIGHT: Tag = Tag(24);

    // Schema-dependent placeholders; never stored as a value tag
    pub const FROM_ASSET: Tag = Tag(62);
    pub const UNKNOWN: Tag = Tag(63);

    // Level geometry records (all carry OBJECT_FLAG)
    pub const SEGMENT_LIGHT_INFO: Tag = Tag(65);
    pub const SEGMENT_REFLECTION_PROBE_INFO: Tag = Tag(66);
    pub const LEVEL_DATA_PORTAL_DOOR_CONNECTION: Tag = Tag(67);
    pub const LEVEL_DATA_SPAWN_POINT: Tag = Tag(68);
    pub const LEVEL_GEOMETRY: Tag = Tag(69);
    pub const MESH: Tag = Tag(70);
    pub const PORTAL_POLYGON_DATA: Tag = Tag(71);
    pub const PORTAL_DATA: Tag = Tag(72);
    pub const SEGMENT_DATA: Tag = Tag(73);
    pub const BSP_TREE_NODE: Tag = Tag(74);
    pub const AABB: Tag = Tag(75);
    pub const AABB_TREE_NODE: Tag = Tag(76);
    pub const CHUNK_DATA: Tag = Tag(77);
    pub const CHUNK_PORTAL: Tag = Tag(78);
    pub const PORTAL_GEOM_TRIANGLE: Tag = Tag(79);
    pub const PORTAL_GEOM_DATA: Tag = Tag(80);
    pub const PATH_DISTANCE_DATA: Tag = Tag(81);

    /// Mesh decoded in place (no presence flag), as produced by asset-type
    /// resolution.
    pub const MESH_EXISTING: Tag = Tag(Tag::MESH.0 | Tag::EXISTING_OBJECT_FLAG);

    // Common array tags
    pub const STRING_ARRAY: Tag = Tag::STRING.array_of();
    pub const INT_ARRAY: Tag = Tag(Tag::INT.0 | Tag::ARRAY_FLAG);
    pub const FLOAT_ARRAY: Tag = Tag::FLOAT.array_of();
    pub const VECTOR2_ARRAY: Tag = Tag::VECTOR2.array_of();
    pub const VECTOR3_ARRAY: Tag = Tag::VECTOR3.array_of();
    pub const VECTOR4_ARRAY: Tag = Tag::VECTOR4.array_of();
    pub const COLOR_ARRAY: Tag = Tag::COLOR.array_of();
    pub const COLOR32_ARRAY: Tag = Tag::COLOR32.array_of();
    pub const BONE_WEIGHT_ARRAY: Tag = Tag::BONE_WEIGHT.array_of();
    pub const MATRIX4X4_ARRAY: Tag = Tag::MATRIX4X4.array_of();

    // Record array tags referenced by the schema tables
    pub const SEGMENT_LIGHT_INFO_ARRAY: Tag = Tag::SEGMENT_LIGHT_INFO.array_of();
    pub const SEGMENT_REFLECTION_PROBE_INFO_ARRAY: Tag =
        Tag::SEGMENT_REFLECTION_PROBE_INFO.array_of();
    pub const PORTAL_POLYGON_DATA_ARRAY: Tag = Tag::PORTAL_POLYGON_DATA.array_of();
    pub const PORTAL_DATA_ARRAY: Tag = Tag::PORTAL_DATA.array_of();
    pub const SEGMENT_DATA_ARRAY: Tag = Tag::SEGMENT_DATA.array_of();
    pub const BSP_TREE_NODE_ARRAY: Tag = Tag::BSP_TREE_NODE.array_of();
    pub const AABB_TREE_NODE_ARRAY: Tag = Tag::AABB_TREE_NODE.array_of();
    pub const CHUNK_DATA_ARRAY: Tag = Tag::CHUNK_DATA.array_of();
    pub const CHUNK_PORTAL_ARRAY: Tag = Tag::CHUNK_PORTAL.array_of();
    pub const PORTAL_GEOM_TRIANGLE_ARRAY: Tag = Tag::PORTAL_GEOM_TRIANGLE.array_of();
    pub const PORTAL_GEOM_DATA_ARRAY: Tag = Tag::PORTAL_GEOM_DATA.array_of();
    pub const PATH_DISTANCE_DATA_ARRAY: Tag = Tag::PATH_DISTANCE_DATA.array_of();

    /// Jagged int array. Occupies the one leftover byte value; its element
    /// type is `INT_ARRAY`, not `Tag(255 & !ARRAY_FLAG)`.
    pub const INT_ARRAY_ARRAY: Tag = Tag(255);

    // Commands (2-byte opcode on the wire, CMD_FLAG set in memory)
    pub const CMD_DONE: Tag = Tag(Tag::CMD_FLAG);
    pub const CMD_CREATE_ASSET_FILE: Tag = Tag(1 | Tag::CMD_FLAG);
    pub const CMD_ADD_ASSET_TO_ASSET_FILE: Tag = Tag(2 | Tag::CMD_FLAG);
    pub const CMD_INITIALIZE_GAME_MANAGER: Tag = Tag(3 | Tag::CMD_FLAG);
    pub const CMD_CREATE_GAME_OBJECT: Tag = Tag(4 | Tag::CMD_FLAG);
    pub const CMD_TRANSFORM_SET_PARENT: Tag = Tag(5 | Tag::CMD_FLAG);
    pub const CMD_GAME_OBJECT_SET_NAME: Tag = Tag(6 | Tag::CMD_FLAG);
    pub const CMD_GAME_OBJECT_SET_TAG: Tag = Tag(7 | Tag::CMD_FLAG);
    pub const CMD_GAME_OBJECT_SET_LAYER: Tag = Tag(8 | Tag::CMD_FLAG);
    pub const CMD_GAME_OBJECT_ADD_COMPONENT: Tag = Tag(9 | Tag::CMD_FLAG);
    pub const CMD_GAME_OBJECT_SET_COMPONENT_PROPERTY: Tag = Tag(10 | Tag::CMD_FLAG);
    pub const CMD_ASSET_REGISTER_MATERIAL: Tag = Tag(11 | Tag::CMD_FLAG);
    pub const CMD_FIND_PREFAB_REFERENCE: Tag = Tag(12 | Tag::CMD_FLAG);
    pub const CMD_INSTANTIATE_PREFAB: Tag = Tag(13 | Tag::CMD_FLAG);
    pub const CMD_GET_COMPONENT_AT_RUNTIME: Tag = Tag(14 | Tag::CMD_FLAG);
    pub const CMD_SAVE_ASSET: Tag = Tag(15 | Tag::CMD_FLAG);
    pub const CMD_LOAD_ASSET_BUNDLE: Tag = Tag(16 | Tag::CMD_FLAG);
    pub const CMD_LOAD_ASSET_FROM_ASSET_BUNDLE: Tag = Tag(17 | Tag::CMD_FLAG);
    pub const CMD_CREATE_MATERIAL: Tag = Tag(18 | Tag::CMD_FLAG);
    pub const CMD_MATERIAL_SET_COLOR: Tag = Tag(21 | Tag::CMD_FLAG);
    pub const CMD_MATERIAL_SET_TEXTURE: Tag = Tag(29 | Tag::CMD_FLAG);
    pub const CMD_CREATE_TEXTURE2D: Tag = Tag(33 | Tag::CMD_FLAG);

    #[inline]
    pub const fn is_array(self) -> bool {
        self.0 & Self::ARRAY_FLAG != 0
    }

    #[inline]
    pub const fn is_command(self) -> bool {
        self.0 & Self::CMD_FLAG != 0
    }

    #[inline]
    pub const fn is_record(self) -> bool {
        self.0 & Self::OBJECT_FLAG != 0 && !self.is_command()
    }

    /// The element tag of an array tag.
    #[inline]
    pub const fn element(self) -> Tag {
        if self.0 == Self::INT_ARRAY_ARRAY.0 {
            Self::INT_ARRAY
        } else {
            Tag(self.0 & !Self::ARRAY_FLAG)
        }
    }

    /// The array tag whose elements are `self`.
    #[inline]
    pub const fn array_of(self) -> Tag {
        if self.0 == Self::INT.0 | Self::ARRAY_FLAG {
            Self::INT_ARRAY_ARRAY
        } else {
            Tag(self.0 | Self::ARRAY_FLAG)
        }
    }

    /// Strips the existing-object bit from a record tag.
    #[inline]
    pub const fn without_existing(self) -> Tag {
        Tag(self.0 & !Self::EXISTING_OBJECT_FLAG)
    }

    /// Resolves a type name to a tag. Nested-type names arrive from the
    /// wire with `+` separators already normalized to `__`.
    pub fn by_name(name: &str) -> Option<Tag> {
        Some(match name {
            "String" => Self::STRING,
            "Bool" => Self::BOOL,
            "Byte" => Self::BYTE,
            "UInt" => Self::UINT,
            "Int" => Self::INT,
            "Float" => Self::FLOAT,
            "Guid" => Self::GUID,
            "Vector2" => Self::VECTOR2,
            "Vector3" => Self::VECTOR3,
            "Vector4" => Self::VECTOR4,
            "Color" => Self::COLOR,
            "Quaternion" => Self::QUATERNION,
            "Vector3b" => Self::VECTOR3B,
            "Matrix4x4" => Self::MATRIX4X4,
            "Color32" => Self::COLOR32,
            "BoneWeight" => Self::BONE_WEIGHT,
            "SegmentLightInfo" => Self::SEGMENT_LIGHT_INFO,
            "SegmentReflectionProbeInfo" => Self::SEGMENT_REFLECTION_PROBE_INFO,
            "LevelData__PortalDoorConnection" => Self::LEVEL_DATA_PORTAL_DOOR_CONNECTION,
            "LevelData__SpawnPoint" => Self::LEVEL_DATA_SPAWN_POINT,
            "LevelGeometry" => Self::LEVEL_GEOMETRY,
            "Mesh" => Self::MESH,
            "PortalPolygonData" => Self::PORTAL_POLYGON_DATA,
            "PortalData" => Self::PORTAL_DATA,
            "SegmentData" => Self::SEGMENT_DATA,
            "BSPTreeNode" => Self::BSP_TREE_NODE,
            "AABB" => Self::AABB,
            "AABBTreeNode" => Self::AABB_TREE_NODE,
            "ChunkData" => Self::CHUNK_DATA,
            "ChunkPortal" => Self::CHUNK_PORTAL,
            "PortalGeomTriangle" => Self::PORTAL_GEOM_TRIANGLE,
            "PortalGeomData" => Self::PORTAL_GEOM_DATA,
            "PathDistanceData" => Self::PATH_DISTANCE_DATA,
            _ => return None,
        })
    }

    /// The canonical name of a non-array tag, if it has one.
    pub fn name(self) -> Option<&'static str> {
        Some(match self {
            Self::STRING => "String",
            Self::BOOL => "Bool",
            Self::BYTE => "Byte",
            Self::UINT => "UInt",
            Self::INT => "Int",
            Self::FLOAT => "Float",
            Self::GUID => "Guid",
            Self::VECTOR2 => "Vector2",
            Self::VECTOR3 => "Vector3",
            Self::VECTOR4 => "Vector4",
            Self::COLOR => "Color",
            Self::QUATERNION => "Quaternion",
            Self::ENUM => "Enum",
            Self::OBJECT => "Object",
            Self::VECTOR3B => "Vector3b",
            Self::MATRIX4X4 => "Matrix4x4",
            Self::COLOR32 => "Color32",
            Self::BONE_WEIGHT => "BoneWeight",
            Self::SEGMENT_LIGHT_INFO => "SegmentLightInfo",
            Self::SEGMENT_REFLECTION_PROBE_INFO => "SegmentReflectionProbeInfo",
            Self::LEVEL_DATA_PORTAL_DOOR_CONNECTION => "LevelData__PortalDoorConnection",
            Self::LEVEL_DATA_SPAWN_POINT => "LevelData__SpawnPoint",
            Self::LEVEL_GEOMETRY => "LevelGeometry",
            Self::MESH => "Mesh",
            Self::PORTAL_POLYGON_DATA => "PortalPolygonData",
            Self::PORTAL_DATA => "PortalData",
            Self::SEGMENT_DATA => "SegmentData",
            Self::BSP_TREE_NODE => "BSPTreeNode",
            Self::AABB => "AABB",
            Self::AABB_TREE_NODE => "AABBTreeNode",
            Self::CHUNK_DATA => "ChunkData",
            Self::CHUNK_PORTAL => "ChunkPortal",
            Self::PORTAL_GEOM_TRIANGLE => "PortalGeomTriangle",
            Self::PORTAL_GEOM_DATA => "PortalGeomData",
            Self::PATH_DISTANCE_DATA => "PathDistanceData",
            Self::INT_ARRAY_ARRAY => "IntArrayArray",
            Self::CMD_DONE => "CmdDone",
            Self::CMD_CREATE_ASSET_FILE => "CmdCreateAssetFile",
            Self::CMD_ADD_ASSET_TO_ASSET_FILE => "CmdAddAssetToAssetFile",
            Self::CMD_INITIALIZE_GAME_MANAGER => "CmdInitializeGameManager",
            Self::CMD_CREATE_GAME_OBJECT => "CmdCreateGameObject",
            Self::CMD_TRANSFORM_SET_PARENT => "CmdTransformSetParent",
            Self::CMD_GAME_OBJECT_SET_NAME => "CmdGameObjectSetName",
            Self::CMD_GAME_OBJECT_SET_TAG => "CmdGameObjectSetTag",
            Self::CMD_GAME_OBJECT_SET_LAYER => "CmdGameObjectSetLayer",
            Self::CMD_GAME_OBJECT_ADD_COMPONENT => "CmdGameObjectAddComponent",
            Self::CMD_GAME_OBJECT_SET_COMPONENT_PROPERTY => "CmdGameObjectSetComponentProperty",
            Self::CMD_ASSET_REGISTER_MATERIAL => "CmdAssetRegisterMaterial",
            Self::CMD_FIND_PREFAB_REFERENCE => "CmdFindPrefabReference",
            Self::CMD_INSTANTIATE_PREFAB => "CmdInstantiatePrefab",
            Self::CMD_GET_COMPONENT_AT_RUNTIME => "CmdGetComponentAtRuntime",
            Self::CMD_SAVE_ASSET => "CmdSaveAsset",
            Self::CMD_LOAD_ASSET_BUNDLE => "CmdLoadAssetBundle",
            Self::CMD_LOAD_ASSET_FROM_ASSET_BUNDLE => "CmdLoadAssetFromAssetBundle",
            Self::CMD_CREATE_MATERIAL => "CmdCreateMaterial",
            Self::CMD_MATERIAL_SET_COLOR => "CmdMaterialSetColor",
            Self::CMD_MATERIAL_SET_TEXTURE => "CmdMaterialSetTexture",
            Self::CMD_CREATE_TEXTURE2D => "CmdCreateTexture2D",
            _ => return None,
        })
    }
}

impl fmt::Debug for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.name() {
            Some(name) => f.write_str(name),
            None if self.is_array() => match self.element().name() {
                Some(name) => write!(f, "{name}Array"),
                None => write!(f, "Tag({})", self.0),
            },
            None => write!(f, "Tag({})", self.0),
        }
    }
}

impl serde::Serialize for Tag {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&format!("{self:?}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn array_element_round_trip() {
        assert_eq!(Tag::VECTOR3_ARRAY.element(), Tag::VECTOR3);
        assert_eq!(Tag::VECTOR3.array_of(), Tag::VECTOR3_ARRAY);
        // The jagged int array does not follow the flag arithmetic.
        assert_eq!(Tag::INT_ARRAY_ARRAY.element(), Tag::INT_ARRAY);
        assert_eq!(Tag::INT_ARRAY.array_of(), Tag::INT_ARRAY_ARRAY);
    }

    #[test]
    fn name_lookup_is_inverse() {
        for raw in 0..=Tag::SEGMENT_LIGHT_INFO.0 + 20 {
            let tag = Tag(raw);
            if let Some(name) = tag.name() {
                if tag != Tag::ENUM && tag != Tag::OBJECT {
                    assert_eq!(Tag::by_name(name), Some(tag), "{name}");
                }
            }
        }
    }

    #[test]
    fn command_opcodes() {
        assert_eq!(Tag::CMD_MATERIAL_SET_TEXTURE.0 & !Tag::CMD_FLAG, 29);
        assert_eq!(Tag::CMD_CREATE_TEXTURE2D.0 & !Tag::CMD_FLAG, 33);
        assert!(Tag::CMD_DONE.is_command());
        assert!(!Tag::CMD_DONE.is_record());
    }
}
