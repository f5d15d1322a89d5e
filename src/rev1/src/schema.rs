//! Hand-authored field schemas for every record and command kind.
//!
//! These tables are fixed by the file format. The field-name tables are
//! debug metadata only; they drive the human-readable dump and are allowed
//! to be shorter than the type tables where the original format left gaps.

use crate::tag::Tag;

/// Ordered field types of a record or command tag.
pub fn field_types(tag: Tag) -> Option<&'static [Tag]> {
    use Tag as T;
    Some(match tag {
        // Fixed-shape composites
        T::VECTOR2 => &[T::FLOAT, T::FLOAT],
        T::VECTOR3 | T::VECTOR3B => &[T::FLOAT, T::FLOAT, T::FLOAT],
        T::VECTOR4 | T::COLOR | T::QUATERNION => &[T::FLOAT, T::FLOAT, T::FLOAT, T::FLOAT],
        T::MATRIX4X4 => &[T::VECTOR4, T::VECTOR4, T::VECTOR4, T::VECTOR4],
        T::BONE_WEIGHT => &[
            T::INT,
            T::INT,
            T::INT,
            T::INT,
            T::FLOAT,
            T::FLOAT,
            T::FLOAT,
            T::FLOAT,
        ],

        // Level geometry records. The enum-typed fields (light type, probe
        // type, pathfinding, exit segment) are plain ints on the wire.
        T::SEGMENT_LIGHT_INFO => &[T::INT, T::INT, T::GUID],
        T::SEGMENT_REFLECTION_PROBE_INFO => &[T::INT, T::INT, T::GUID],
        T::LEVEL_DATA_PORTAL_DOOR_CONNECTION => &[T::INT, T::GUID],
        T::LEVEL_DATA_SPAWN_POINT => &[T::VECTOR3, T::QUATERNION, T::INT, T::INT],
        T::PORTAL_POLYGON_DATA => &[T::VECTOR3, T::FLOAT, T::INT_ARRAY],
        T::PORTAL_DATA => &[
            T::INT,
            T::INT,
            T::INT,
            T::INT,
            T::PORTAL_POLYGON_DATA_ARRAY,
        ],
        T::SEGMENT_DATA => &[
            T::INT_ARRAY,
            T::VECTOR3,
            T::VECTOR3,
            T::VECTOR3,
            T::VECTOR4_ARRAY,
            T::INT_ARRAY,
            T::INT,
            T::UINT,
            T::UINT,
            T::BOOL,
            T::INT,
            T::INT,
            T::FLOAT_ARRAY,
            T::INT_ARRAY,
        ],
        T::BSP_TREE_NODE => &[T::VECTOR4, T::INT, T::INT],
        T::AABB => &[T::VECTOR3, T::VECTOR3],
        T::AABB_TREE_NODE => &[T::AABB, T::INT, T::INT, T::INT],
        T::CHUNK_DATA => &[T::INT_ARRAY, T::INT_ARRAY, T::BOOL],
        T::CHUNK_PORTAL => &[T::INT, T::INT, T::INT, T::INT, T::INT, T::INT, T::INT],
        T::PORTAL_GEOM_TRIANGLE => &[T::INT],
        T::PORTAL_GEOM_DATA => &[T::INT, T::INT],
        T::PATH_DISTANCE_DATA => &[T::FLOAT, T::INT, T::INT, T::INT],
        T::LEVEL_GEOMETRY => &[
            T::STRING,
            T::STRING,
            T::SEGMENT_DATA_ARRAY,
            T::PORTAL_DATA_ARRAY,
            T::VECTOR3_ARRAY,
            T::INT_ARRAY,
            T::BSP_TREE_NODE_ARRAY,
            T::AABB_TREE_NODE_ARRAY,
            T::CHUNK_DATA_ARRAY,
            T::CHUNK_PORTAL_ARRAY,
            T::VECTOR3_ARRAY,
            T::PORTAL_GEOM_TRIANGLE_ARRAY,
            T::PORTAL_GEOM_DATA_ARRAY,
            T::STRING,
            T::INT_ARRAY,
            T::PATH_DISTANCE_DATA_ARRAY,
            T::STRING,
            T::STRING,
        ],

        // Commands
        T::CMD_DONE => &[],
        T::CMD_CREATE_ASSET_FILE => &[T::STRING, T::GUID],
        T::CMD_ADD_ASSET_TO_ASSET_FILE => &[T::GUID, T::GUID, T::STRING],
        T::CMD_INITIALIZE_GAME_MANAGER => &[T::STRING, T::GUID],
        T::CMD_CREATE_GAME_OBJECT => &[T::GUID, T::GUID],
        T::CMD_TRANSFORM_SET_PARENT => &[T::GUID, T::GUID],
        T::CMD_GAME_OBJECT_SET_NAME => &[T::GUID, T::STRING],
        T::CMD_GAME_OBJECT_SET_TAG => &[T::GUID, T::STRING],
        T::CMD_GAME_OBJECT_SET_LAYER => &[T::GUID, T::INT],
        T::CMD_GAME_OBJECT_ADD_COMPONENT => &[T::GUID, T::GUID, T::STRING],
        T::CMD_GAME_OBJECT_SET_COMPONENT_PROPERTY => {
            &[T::GUID, T::STRING, T::BYTE, T::BYTE, T::UNKNOWN]
        }
        T::CMD_ASSET_REGISTER_MATERIAL => &[T::GUID, T::INT, T::STRING],
        T::CMD_FIND_PREFAB_REFERENCE => &[T::STRING, T::GUID],
        T::CMD_INSTANTIATE_PREFAB => &[T::GUID, T::GUID, T::GUID],
        T::CMD_GET_COMPONENT_AT_RUNTIME => &[T::BOOL, T::STRING, T::GUID, T::GUID],
        T::CMD_SAVE_ASSET => &[T::GUID, T::FROM_ASSET],
        T::CMD_LOAD_ASSET_BUNDLE => &[T::STRING, T::STRING, T::GUID],
        T::CMD_LOAD_ASSET_FROM_ASSET_BUNDLE => &[T::STRING, T::GUID, T::GUID],
        T::CMD_CREATE_MATERIAL => &[
            T::GUID,
            T::GUID,
            T::COLOR,
            T::BOOL,
            T::GUID,
            T::VECTOR2,
            T::VECTOR2,
            T::INT,
            T::STRING_ARRAY,
            T::STRING,
        ],
        T::CMD_MATERIAL_SET_COLOR => &[T::GUID, T::STRING, T::COLOR],
        T::CMD_MATERIAL_SET_TEXTURE => &[T::GUID, T::STRING, T::GUID],
        T::CMD_CREATE_TEXTURE2D => &[
            T::GUID,
            T::INT,
            T::INT,
            T::STRING,
            T::BOOL,
            T::STRING,
            T::STRING,
            T::COLOR32_ARRAY,
        ],
        _ => return None,
    })
}

/// Debug field names used by the dump formatter.
pub fn field_names(tag: Tag) -> Option<&'static [&'static str]> {
    use Tag as T;
    Some(match tag {
        T::SEGMENT_LIGHT_INFO => &["lightType", "segIdx"],
        T::SEGMENT_REFLECTION_PROBE_INFO => &["probeType", "segIdx"],
        T::LEVEL_DATA_PORTAL_DOOR_CONNECTION => &["portalIdx"],
        T::LEVEL_DATA_SPAWN_POINT => &["pos", "orient", "seg", "team_mask"],
        T::PORTAL_POLYGON_DATA => &["normal", "planeEqD", "vertIdxs"],
        T::PORTAL_DATA => &["primSeg", "primSide", "secSeg", "secSide", "polygons"],
        T::SEGMENT_DATA => &[
            "vertIdxs",
            "center",
            "minPos",
            "maxPos",
            "sidePlaneEq",
            "portals",
            "chunkIdx",
            "decalFlags",
            "doorFlags",
            "dark",
            "pathfinding",
            "exitSeg",
            "deformHeights",
            "warpDestSegs",
        ],
        T::BSP_TREE_NODE => &["plantEq", "backNodeIdx", "frontNodeIdx"],
        T::AABB => &["min", "max"],
        T::AABB_TREE_NODE => &["bounds", "minChild", "maxChild", "seg"],
        T::CHUNK_DATA => &["portalIdxs", "segIdxs", "isEnergy"],
        T::CHUNK_PORTAL => &[
            "num",
            "chunk",
            "seg",
            "side",
            "connectedChunk",
            "connectedPortal",
            "portalGeom",
        ],
        T::PORTAL_GEOM_TRIANGLE => &["firstVertIdx"],
        T::PORTAL_GEOM_DATA => &["numTri", "startIdx"],
        T::PATH_DISTANCE_DATA => &["dist", "pathLen", "secSeg", "secLastSeg"],
        T::LEVEL_GEOMETRY => &[
            "name",
            "file",
            "segments",
            "portals",
            "segVerts",
            "segBSPIdx",
            "segBSPData",
            "segAABBTree",
            "chunks",
            "chunkPortals",
            "portalVerts",
            "portalTris",
            "portalData",
            "cmText",
            "segSegVis",
            "pathDist",
            "geomHash",
            "robotSpawnHash",
        ],
        T::MESH => &[
            "name",
            "verts",
            "uv",
            "uv2",
            "uv3",
            "norms",
            "tangs",
            "colors",
            "colors32",
            "boneWeights",
            "bindposes",
            "tris",
        ],
        T::CMD_DONE => &[],
        T::CMD_CREATE_ASSET_FILE => &["path", "newFileId"],
        T::CMD_ADD_ASSET_TO_ASSET_FILE => &["fileId", "newAssetId", "type"],
        T::CMD_INITIALIZE_GAME_MANAGER => &["name", "levelDataId"],
        T::CMD_CREATE_GAME_OBJECT => &["newObjId", "newTransId"],
        T::CMD_TRANSFORM_SET_PARENT => &["transId", "parentTransId"],
        T::CMD_GAME_OBJECT_SET_NAME => &["objId", "name"],
        T::CMD_GAME_OBJECT_SET_TAG => &["objId", "tag"],
        T::CMD_GAME_OBJECT_SET_LAYER => &["objId", "layer"],
        T::CMD_GAME_OBJECT_ADD_COMPONENT => &["objId", "newCompId", "type"],
        T::CMD_GAME_OBJECT_SET_COMPONENT_PROPERTY => {
            &["compId", "propName", "map", "array", "value"]
        }
        T::CMD_ASSET_REGISTER_MATERIAL => &["newMatId", "geomType", "name"],
        T::CMD_FIND_PREFAB_REFERENCE => &["name", "newPrefabId"],
        T::CMD_INSTANTIATE_PREFAB => &["prefabId", "newObjId", "newTransId"],
        T::CMD_GET_COMPONENT_AT_RUNTIME => &["alsoChild", "name", "objId", "newCompId"],
        T::CMD_SAVE_ASSET => &["id", "value"],
        T::CMD_LOAD_ASSET_BUNDLE => &["dir", "file", "newBundleId"],
        T::CMD_LOAD_ASSET_FROM_ASSET_BUNDLE => &["name", "bundleId", "newObjId"],
        T::CMD_CREATE_MATERIAL => &[
            "newMatId",
            "shaderId",
            "color",
            "gpuInst",
            "texId",
            "texOfs",
            "texScale",
            "queue",
            "kws",
            "name",
        ],
        T::CMD_MATERIAL_SET_COLOR => &["matId", "propName", "color"],
        T::CMD_MATERIAL_SET_TEXTURE => &["matId", "propName", "texId"],
        T::CMD_CREATE_TEXTURE2D => &[
            "newTexId",
            "width",
            "height",
            "fmt",
            "mipmap",
            "filter",
            "name",
            "pixels",
        ],
        _ => return None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_command_has_a_schema() {
        let mut found = 0;
        for op in 0..64u16 {
            let tag = Tag(op | Tag::CMD_FLAG);
            if let Some(types) = field_types(tag) {
                found += 1;
                let names = field_names(tag).expect("command without field names");
                assert!(names.len() <= types.len(), "{tag:?}");
            }
        }
        assert_eq!(found, 22);
    }

    #[test]
    fn record_schemas_reference_known_tags() {
        for raw in [
            Tag::SEGMENT_LIGHT_INFO.0..=Tag::PATH_DISTANCE_DATA.0,
            Tag::VECTOR2.0..=Tag::BONE_WEIGHT.0,
        ]
        .into_iter()
        .flatten()
        {
            let Some(types) = field_types(Tag(raw)) else {
                continue;
            };
            for &t in types {
                let base = t.element();
                assert!(
                    matches!(
                        base,
                        Tag::STRING
                            | Tag::BOOL
                            | Tag::BYTE
                            | Tag::UINT
                            | Tag::INT
                            | Tag::FLOAT
                            | Tag::GUID
                            | Tag::INT_ARRAY
                    ) || field_types(base).is_some(),
                    "unresolvable field type {t:?} in {:?}",
                    Tag(raw)
                );
            }
        }
    }
}
