//! Serialized asset file: header, type metadata, object table, and the
//! type-tree-driven value decoder.

use crate::bundle::BundleNames;
use crate::{Error, Result};
use byteorder::{ReadBytesExt, BE, LE};
use std::collections::HashMap;
use std::io::{self, Read, Seek, SeekFrom};

/// Names shared by every build of the engine. Type-tree string references
/// with the sign bit set index into this blob instead of the tree's own
/// string data.
const COMMON_STRINGS: &[u8] =
    b"AABB\0AnimationClip\0AnimationCurve\0AnimationState\0Array\0Base\0BitField\0bitset\0bool\0\
char\0ColorRGBA\0Component\0data\0deque\0double\0dynamic_array\0FastPropertyName\0first\0float\0\
Font\0GameObject\0Generic Mono\0GradientNEW\0GUID\0GUIStyle\0int\0list\0long long\0map\0\
Matrix4x4f\0MdFour\0MonoBehaviour\0MonoScript\0m_ByteSize\0m_Curve\0m_EditorClassIdentifier\0\
m_EditorHideFlags\0m_Enabled\0m_ExtensionPtr\0m_GameObject\0m_Index\0m_IsArray\0m_IsStatic\0\
m_MetaFlag\0m_Name\0m_ObjectHideFlags\0m_PrefabInternal\0m_PrefabParentObject\0m_Script\0\
m_StaticEditorFlags\0m_Type\0m_Version\0Object\0pair\0PPtr<Component>\0PPtr<GameObject>\0\
PPtr<Material>\0PPtr<MonoBehaviour>\0PPtr<MonoScript>\0PPtr<Object>\0PPtr<Prefab>\0\
PPtr<Sprite>\0PPtr<TextAsset>\0PPtr<Texture>\0PPtr<Texture2D>\0PPtr<Transform>\0Prefab\0\
Quaternionf\0Rectf\0RectInt\0RectOffset\0second\0set\0short\0size\0SInt16\0SInt32\0SInt64\0\
SInt8\0staticvector\0string\0TextAsset\0TextMesh\0Texture\0Texture2D\0Transform\0TypelessData\0\
UInt16\0UInt32\0UInt64\0UInt8\0unsigned int\0unsigned long long\0unsigned short\0vector\0\
Vector2f\0Vector3f\0Vector4f\0m_ScriptingClassIdentifier\0Gradient\0Gradient\0Type*\0\
int2_storage\0int3_storage\0BoundsInt\0";

const CLASS_GAME_OBJECT: i32 = 1;
const CLASS_MATERIAL: i32 = 21;

#[derive(Clone, Copy, PartialEq, Eq)]
pub(crate) enum Endian {
    Big,
    Little,
}

/// Byte reader with switchable endianness. Serialized files start
/// big-endian and may flip to little-endian after the header.
pub(crate) struct EndianReader<S> {
    inner: S,
    pub endian: Endian,
}

impl<S: Read + Seek> EndianReader<S> {
    pub fn new(inner: S, endian: Endian) -> Self {
        EndianReader { inner, endian }
    }

    pub fn read_u8(&mut self) -> io::Result<u8> {
        self.inner.read_u8()
    }

    pub fn read_i8(&mut self) -> io::Result<i8> {
        self.inner.read_i8()
    }

    pub fn read_u16(&mut self) -> io::Result<u16> {
        match self.endian {
            Endian::Big => self.inner.read_u16::<BE>(),
            Endian::Little => self.inner.read_u16::<LE>(),
        }
    }

    pub fn read_i16(&mut self) -> io::Result<i16> {
        match self.endian {
            Endian::Big => self.inner.read_i16::<BE>(),
            Endian::Little => self.inner.read_i16::<LE>(),
        }
    }

    pub fn read_u32(&mut self) -> io::Result<u32> {
        match self.endian {
            Endian::Big => self.inner.read_u32::<BE>(),
            Endian::Little => self.inner.read_u32::<LE>(),
        }
    }

    pub fn read_i32(&mut self) -> io::Result<i32> {
        match self.endian {
            Endian::Big => self.inner.read_i32::<BE>(),
            Endian::Little => self.inner.read_i32::<LE>(),
        }
    }

    pub fn read_u64(&mut self) -> io::Result<u64> {
        match self.endian {
            Endian::Big => self.inner.read_u64::<BE>(),
            Endian::Little => self.inner.read_u64::<LE>(),
        }
    }

    pub fn read_i64(&mut self) -> io::Result<i64> {
        match self.endian {
            Endian::Big => self.inner.read_i64::<BE>(),
            Endian::Little => self.inner.read_i64::<LE>(),
        }
    }

    pub fn read_f32(&mut self) -> io::Result<f32> {
        match self.endian {
            Endian::Big => self.inner.read_f32::<BE>(),
            Endian::Little => self.inner.read_f32::<LE>(),
        }
    }

    pub fn read_f64(&mut self) -> io::Result<f64> {
        match self.endian {
            Endian::Big => self.inner.read_f64::<BE>(),
            Endian::Little => self.inner.read_f64::<LE>(),
        }
    }

    pub fn read_bytes(&mut self, len: usize) -> io::Result<Vec<u8>> {
        let mut buf = vec![0u8; len];
        self.inner.read_exact(&mut buf)?;
        Ok(buf)
    }

    pub fn read_cstr(&mut self) -> Result<String> {
        let mut buf = Vec::new();
        loop {
            let b = self.read_u8()?;
            if b == 0 {
                break;
            }
            buf.push(b);
        }
        Ok(String::from_utf8(buf)?)
    }

    /// Reads `len` bytes and pads the cursor to a four-byte boundary.
    pub fn read_aligned_string(&mut self, len: i32) -> Result<String> {
        if len < 0 {
            return Err(Error::InvalidLength(len));
        }
        let s = String::from_utf8(self.read_bytes(len as usize)?)?;
        self.align(4)?;
        Ok(s)
    }

    /// Alignment is relative to the start of the stream, which for a
    /// bundle part is the start of the part.
    pub fn align(&mut self, to: u64) -> io::Result<()> {
        let pos = self.inner.stream_position()?;
        let rem = pos % to;
        if rem != 0 {
            self.inner.seek(SeekFrom::Current((to - rem) as i64))?;
        }
        Ok(())
    }

    pub fn seek(&mut self, from: SeekFrom) -> io::Result<u64> {
        self.inner.seek(from)
    }

    pub fn stream_position(&mut self) -> io::Result<u64> {
        self.inner.stream_position()
    }

    pub fn into_inner(self) -> S {
        self.inner
    }
}

/// One node of a type tree: a field's type name, field name, and layout
/// flags, with its sub-fields as children.
#[derive(Debug, Default)]
pub(crate) struct TreeNode {
    pub type_name: String,
    pub name: String,
    pub is_array: bool,
    pub flags: i32,
    pub children: Vec<TreeNode>,
}

impl TreeNode {
    /// Pad to four bytes after this field's value.
    fn post_align(&self) -> bool {
        self.flags & 0x4000 != 0
    }
}

fn type_string(data: &[u8], ofs: i32) -> Result<String> {
    let (data, ofs) = if ofs < 0 {
        (COMMON_STRINGS, (ofs & 0x7fff_ffff) as usize)
    } else {
        (data, ofs as usize)
    };
    let tail = data
        .get(ofs..)
        .ok_or(Error::MalformedTypeTree("string offset out of range"))?;
    let end = tail
        .iter()
        .position(|&b| b == 0)
        .ok_or(Error::MalformedTypeTree("unterminated string"))?;
    Ok(String::from_utf8(tail[..end].to_vec())?)
}

/// Reads one type tree: a flat array of 24-byte node records plus a string
/// blob, renested by each record's depth byte.
pub(crate) fn load_tree<S: Read + Seek>(es: &mut EndianReader<S>) -> Result<TreeNode> {
    let num_nodes = es.read_i32()?;
    let data_size = es.read_i32()?;
    if num_nodes <= 0 || data_size < 0 {
        return Err(Error::MalformedTypeTree("bad node or data count"));
    }
    let node_data = es.read_bytes(num_nodes as usize * 24)?;
    let strings = es.read_bytes(data_size as usize)?;

    let mut nodes = EndianReader::new(io::Cursor::new(node_data), es.endian);
    // Stack of open nodes; the node at index d is the current ancestor at
    // depth d.
    let mut stack: Vec<TreeNode> = Vec::new();
    for i in 0..num_nodes {
        let _version = nodes.read_u16()?;
        let depth = usize::from(nodes.read_u8()?);
        let is_array = nodes.read_u8()? != 0;
        let type_name = type_string(&strings, nodes.read_i32()?)?;
        let name = type_string(&strings, nodes.read_i32()?)?;
        let _size = nodes.read_i32()?;
        let _index = nodes.read_i32()?;
        let flags = nodes.read_i32()?;

        if i == 0 && depth != 0 {
            return Err(Error::MalformedTypeTree("root node has nonzero depth"));
        }
        if i > 0 && (depth == 0 || depth > stack.len()) {
            return Err(Error::MalformedTypeTree("bad node depth"));
        }
        while stack.len() > depth {
            let done = stack.pop().ok_or(Error::MalformedTypeTree("bad node depth"))?;
            match stack.last_mut() {
                Some(parent) => parent.children.push(done),
                None => return Err(Error::MalformedTypeTree("multiple roots")),
            }
        }
        stack.push(TreeNode {
            type_name,
            name,
            is_array,
            flags,
            children: Vec::new(),
        });
    }
    while stack.len() > 1 {
        let done = stack.pop().ok_or(Error::MalformedTypeTree("bad node depth"))?;
        if let Some(parent) = stack.last_mut() {
            parent.children.push(done);
        }
    }
    stack.pop().ok_or(Error::MalformedTypeTree("empty tree"))
}

/// Per-file type table: the class id of each type slot and the type tree
/// for each class, when the file carries trees.
pub(crate) struct TypeMeta {
    pub class_ids: Vec<i32>,
    pub trees: HashMap<i32, TreeNode>,
}

impl TypeMeta {
    pub fn load<S: Read + Seek>(es: &mut EndianReader<S>, format: i32) -> Result<Self> {
        let _version = es.read_cstr()?;
        let _target = es.read_i32()?;
        let mut meta = TypeMeta {
            class_ids: Vec::new(),
            trees: HashMap::new(),
        };
        if format < 13 {
            return Ok(meta);
        }
        let has_trees = es.read_u8()? != 0;
        let num = es.read_i32()?;
        for _ in 0..num {
            let mut class_id = es.read_i32()?;
            if format >= 17 {
                let _unknown = es.read_u8()?;
                let script_id = es.read_i16()?;
                if class_id == 114 {
                    class_id = if script_id >= 0 {
                        -2 - i32::from(script_id)
                    } else {
                        -1
                    };
                }
            }
            meta.class_ids.push(class_id);
            // Script types carry a 32-byte hash, engine types 16.
            es.read_bytes(if class_id < 0 { 32 } else { 16 })?;
            if has_trees {
                meta.trees.insert(class_id, load_tree(es)?);
            }
        }
        Ok(meta)
    }
}

/// One object-table entry.
pub(crate) struct ObjectInfo {
    pub data_ofs: u32,
    pub class_id: i32,
}

impl ObjectInfo {
    pub fn load<S: Read + Seek>(
        es: &mut EndianReader<S>,
        format: i32,
        meta: &TypeMeta,
    ) -> Result<Self> {
        let _path_id = es.read_u64()?;
        let data_ofs = es.read_u32()?;
        let _size = es.read_u32()?;
        let type_id = es.read_i32()?;
        let class_id = if format < 17 {
            i32::from(es.read_i16()?)
        } else {
            *meta
                .class_ids
                .get(usize::try_from(type_id).unwrap_or(usize::MAX))
                .ok_or(Error::UnknownTypeIndex(type_id))?
        };
        if format <= 16 {
            es.read_i16()?;
        }
        if format == 15 || format == 16 {
            es.read_u8()?;
        }
        Ok(ObjectInfo { data_ofs, class_id })
    }
}

/// A decoded object value. Field order follows the type tree.
#[derive(Debug, PartialEq)]
pub enum ObjectValue {
    Bool(bool),
    I8(i8),
    U8(u8),
    I16(i16),
    U16(u16),
    I32(i32),
    U32(u32),
    I64(i64),
    U64(u64),
    F32(f32),
    F64(f64),
    Str(String),
    /// A `char`/`UInt8` array, kept as raw bytes.
    Bytes(Vec<u8>),
    Array(Vec<ObjectValue>),
    Pair(Box<(ObjectValue, ObjectValue)>),
    /// A `PPtr<T>` reference into another file.
    Ptr { file_id: i32, path_id: i64 },
    Object(Vec<(String, ObjectValue)>),
}

impl ObjectValue {
    pub fn field(&self, name: &str) -> Option<&ObjectValue> {
        match self {
            ObjectValue::Object(fields) => {
                fields.iter().find(|(n, _)| n == name).map(|(_, v)| v)
            }
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            ObjectValue::Str(s) => Some(s),
            _ => None,
        }
    }
}

/// Decodes one value as described by a type-tree node.
pub(crate) fn read_value<S: Read + Seek>(
    es: &mut EndianReader<S>,
    node: &TreeNode,
) -> Result<ObjectValue> {
    let v = match node.type_name.as_str() {
        "bool" => ObjectValue::Bool(es.read_u8()? != 0),
        "SInt8" => ObjectValue::I8(es.read_i8()?),
        "UInt8" => ObjectValue::U8(es.read_u8()?),
        "SInt16" | "short" => ObjectValue::I16(es.read_i16()?),
        "UInt16" | "unsigned short" => ObjectValue::U16(es.read_u16()?),
        "SInt32" | "int" => ObjectValue::I32(es.read_i32()?),
        "UInt32" | "unsigned int" => ObjectValue::U32(es.read_u32()?),
        "SInt64" | "long long" => ObjectValue::I64(es.read_i64()?),
        "UInt64" | "unsigned long long" => ObjectValue::U64(es.read_u64()?),
        "float" => {
            es.align(4)?;
            ObjectValue::F32(es.read_f32()?)
        }
        "double" => {
            es.align(4)?;
            ObjectValue::F64(es.read_f64()?)
        }
        "string" => {
            let len = es.read_i32()?;
            if len < 0 {
                return Err(Error::InvalidLength(len));
            }
            let s = String::from_utf8(es.read_bytes(len as usize)?)?;
            if node.children.first().is_some_and(TreeNode::post_align) {
                es.align(4)?;
            }
            ObjectValue::Str(s)
        }
        t => {
            let array_node = if node.is_array {
                Some(node)
            } else {
                node.children.first().filter(|c| c.is_array)
            };
            if t.starts_with("PPtr<") {
                ObjectValue::Ptr {
                    file_id: es.read_i32()?,
                    path_id: es.read_i64()?,
                }
            } else if let Some(array_node) = array_node {
                let len = es.read_i32()?;
                if len < 0 {
                    return Err(Error::InvalidLength(len));
                }
                let element = array_node
                    .children
                    .get(1)
                    .ok_or(Error::MalformedTypeTree("array without element type"))?;
                let v = if element.type_name == "char" || element.type_name == "UInt8" {
                    ObjectValue::Bytes(es.read_bytes(len as usize)?)
                } else {
                    let mut items = Vec::with_capacity(len as usize);
                    for _ in 0..len {
                        items.push(read_value(es, element)?);
                    }
                    ObjectValue::Array(items)
                };
                if array_node.post_align() {
                    es.align(4)?;
                }
                v
            } else if t == "pair" {
                let [first, second] = node.children.as_slice() else {
                    return Err(Error::MalformedTypeTree("pair without two fields"));
                };
                ObjectValue::Pair(Box::new((read_value(es, first)?, read_value(es, second)?)))
            } else {
                let mut fields = Vec::with_capacity(node.children.len());
                for child in &node.children {
                    fields.push((child.name.clone(), read_value(es, child)?));
                }
                ObjectValue::Object(fields)
            }
        }
    };
    if node.post_align() {
        es.align(4)?;
    }
    Ok(v)
}

/// Walks a serialized asset file and collects material and game-object
/// names.
pub(crate) fn harvest<S: Read + Seek>(part: S) -> Result<BundleNames> {
    let mut es = EndianReader::new(part, Endian::Big);
    let _meta_size = es.read_u32()?;
    let _file_size = es.read_u32()?;
    let format = es.read_i32()?;
    let data_offset = es.read_u32()?;
    if format >= 9 && es.read_u32()? == 0 {
        es.endian = Endian::Little;
    }

    let meta = TypeMeta::load(&mut es, format)?;
    let _long_object_ids = format >= 14 || (format >= 7 && es.read_i32()? != 0);

    let count = es.read_u32()?;
    let mut objects = Vec::with_capacity(count as usize);
    for _ in 0..count {
        if format >= 14 {
            es.align(4)?;
        }
        objects.push(ObjectInfo::load(&mut es, format, &meta)?);
    }

    let mut names = BundleNames::default();
    for obj in &objects {
        match obj.class_id {
            // Materials start with their name; no tree walk needed.
            CLASS_MATERIAL => {
                es.seek(SeekFrom::Start(
                    u64::from(data_offset) + u64::from(obj.data_ofs),
                ))?;
                let len = es.read_i32()?;
                names.materials.push(es.read_aligned_string(len)?);
            }
            CLASS_GAME_OBJECT => {
                es.seek(SeekFrom::Start(
                    u64::from(data_offset) + u64::from(obj.data_ofs),
                ))?;
                let tree = meta
                    .trees
                    .get(&CLASS_GAME_OBJECT)
                    .ok_or(Error::MissingTypeTree(CLASS_GAME_OBJECT))?;
                let value = read_value(&mut es, tree)?;
                if let Some(name) = value.field("m_Name").and_then(ObjectValue::as_str) {
                    names.game_objects.push(name.to_owned());
                }
            }
            _ => {}
        }
    }
    Ok(names)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// Byte builder for synthetic serialized files. Defaults to big-endian,
    /// the container byte order.
    pub struct Builder {
        pub bytes: Vec<u8>,
        pub endian: Endian,
    }

    impl Default for Builder {
        fn default() -> Self {
            Builder {
                bytes: Vec::new(),
                endian: Endian::Big,
            }
        }
    }

    impl Builder {
        pub fn u8(&mut self, v: u8) -> &mut Self {
            self.bytes.push(v);
            self
        }

        fn multi(&mut self, be: &[u8]) -> &mut Self {
            match self.endian {
                Endian::Big => self.bytes.extend_from_slice(be),
                Endian::Little => self.bytes.extend(be.iter().rev()),
            }
            self
        }

        pub fn i16(&mut self, v: i16) -> &mut Self {
            self.multi(&v.to_be_bytes())
        }

        pub fn u16(&mut self, v: u16) -> &mut Self {
            self.multi(&v.to_be_bytes())
        }

        pub fn i32(&mut self, v: i32) -> &mut Self {
            self.multi(&v.to_be_bytes())
        }

        pub fn u32(&mut self, v: u32) -> &mut Self {
            self.multi(&v.to_be_bytes())
        }

        pub fn u64(&mut self, v: u64) -> &mut Self {
            self.multi(&v.to_be_bytes())
        }

        pub fn raw(&mut self, v: &[u8]) -> &mut Self {
            self.bytes.extend_from_slice(v);
            self
        }

        pub fn cstr(&mut self, s: &str) -> &mut Self {
            self.raw(s.as_bytes()).u8(0)
        }

        pub fn align(&mut self) -> &mut Self {
            while self.bytes.len() % 4 != 0 {
                self.bytes.push(0);
            }
            self
        }
    }

    /// String blob plus name-to-offset resolution for tree building.
    struct StringTable {
        blob: Vec<u8>,
    }

    impl StringTable {
        fn new(names: &[&str]) -> Self {
            let mut blob = Vec::new();
            for name in names {
                blob.extend_from_slice(name.as_bytes());
                blob.push(0);
            }
            StringTable { blob }
        }

        fn offset(&self, name: &str) -> i32 {
            let needle: Vec<u8> = name.bytes().chain([0]).collect();
            self.blob
                .windows(needle.len())
                .position(|w| w == needle)
                .map(|p| p as i32)
                .expect("name not in table")
        }
    }

    /// A 24-byte tree node record.
    fn node(b: &mut Builder, depth: u8, is_array: bool, type_ref: i32, name_ref: i32, flags: i32) {
        b.u16(1)
            .u8(depth)
            .u8(u8::from(is_array))
            .i32(type_ref)
            .i32(name_ref)
            .i32(-1)
            .i32(0)
            .i32(flags);
    }

    /// The GameObject tree used by the fixtures:
    ///
    /// ```text
    /// GameObject Base
    ///   string m_Name
    ///     Array Array   (array, post-align)
    ///       int size
    ///       char data
    ///   int m_Layer
    ///   float m_Scale   (type name via the shared string table)
    /// ```
    pub fn game_object_tree(b: &mut Builder) {
        let strings = StringTable::new(&[
            "GameObject",
            "Base",
            "string",
            "m_Name",
            "Array",
            "int",
            "size",
            "char",
            "data",
            "m_Layer",
            "m_Scale",
        ]);
        let float_ref = COMMON_STRINGS
            .windows(6)
            .position(|w| w == b"float\0")
            .unwrap() as i32
            | i32::MIN;
        b.i32(7).i32(strings.blob.len() as i32);
        let s = |name: &str| strings.offset(name);
        node(b, 0, false, s("GameObject"), s("Base"), 0);
        node(b, 1, false, s("string"), s("m_Name"), 0);
        node(b, 2, true, s("Array"), s("Array"), 0x4000);
        node(b, 3, false, s("int"), s("size"), 0);
        node(b, 3, false, s("char"), s("data"), 0);
        node(b, 1, false, s("int"), s("m_Layer"), 0);
        node(b, 1, false, float_ref, s("m_Scale"), 0);
        b.raw(&strings.blob);
    }

    /// A complete format-15 serialized file holding one game object and
    /// one material.
    pub fn sample_asset_file() -> Vec<u8> {
        sample_asset_file_with(Endian::Big)
    }

    /// The header up to the endianness word is always big-endian; the
    /// metadata, object table, and object data follow `endian`.
    pub fn sample_asset_file_with(endian: Endian) -> Vec<u8> {
        let mut b = Builder::default();
        b.u32(0).u32(0).i32(15);
        let data_offset_at = b.bytes.len();
        b.u32(0);
        b.u32(u32::from(endian == Endian::Big));
        b.endian = endian;

        // Type metadata: one tree, for GameObject.
        b.cstr("5.3.5f1").i32(5);
        b.u8(1).i32(1);
        b.i32(1).raw(&[0u8; 16]);
        game_object_tree(&mut b);

        // Object table, format 15: aligned entries of
        // (path id, offset, size, type id, class id, i16 pad, u8 pad).
        b.u32(2);
        b.align();
        b.u64(100).u32(0).u32(0).i32(0).i16(1).i16(0).u8(0);
        b.align();
        b.u64(101).u32(32).u32(0).i32(0).i16(21).i16(0).u8(0);

        // Object data.
        b.align();
        let data_offset = b.bytes.len() as u32;
        b.bytes[data_offset_at..data_offset_at + 4].copy_from_slice(&data_offset.to_be_bytes());

        // GameObject at offset 0: name, layer, scale.
        let start = b.bytes.len();
        b.i32(10).raw(b"door_frame").align();
        b.i32(7);
        b.u32(0x3f80_0000);
        assert_eq!(b.bytes.len() - start, 24);
        b.raw(&[0u8; 8]);

        // Material at offset 32: aligned name.
        assert_eq!(b.bytes.len() - start, 32);
        b.i32(14).raw(b"entity_rock_01").align();
        b.bytes
    }

    #[test]
    fn game_object_tree_fixture_uses_real_node_layout() {
        let mut fix = Builder::default();
        game_object_tree(&mut fix);
        let mut es = EndianReader::new(io::Cursor::new(fix.bytes), Endian::Big);
        let tree = load_tree(&mut es).unwrap();

        assert_eq!(tree.type_name, "GameObject");
        assert_eq!(tree.children.len(), 3);
        assert_eq!(tree.children[0].name, "m_Name");
        assert_eq!(tree.children[0].type_name, "string");
        let array = &tree.children[0].children[0];
        assert!(array.is_array);
        assert!(array.post_align());
        assert_eq!(array.children[1].type_name, "char");
    }

    #[test]
    fn endianness_switch_flips_multibyte_reads() {
        let bytes = [0x12, 0x34, 0x56, 0x78];
        let mut es = EndianReader::new(io::Cursor::new(bytes), Endian::Big);
        assert_eq!(es.read_u32().unwrap(), 0x1234_5678);

        let mut es = EndianReader::new(io::Cursor::new(bytes), Endian::Little);
        assert_eq!(es.read_u16().unwrap(), 0x3412);
        es.endian = Endian::Big;
        assert_eq!(es.read_u16().unwrap(), 0x5678);
    }

    #[test]
    fn shared_string_references_resolve() {
        assert_eq!(type_string(&[], i32::MIN).unwrap(), "AABB");
        let name_ofs = COMMON_STRINGS
            .windows(7)
            .position(|w| w == b"m_Name\0")
            .unwrap() as i32;
        let from_shared = type_string(&[], name_ofs | i32::MIN).unwrap();
        assert_eq!(from_shared, "m_Name");
        assert_eq!(type_string(b"local\0", 0).unwrap(), "local");
    }

    #[test]
    fn depth_renesting_rejects_orphans() {
        let mut b = Builder::default();
        let strings = b"A\0B\0";
        b.i32(2).i32(strings.len() as i32);
        node(&mut b, 0, false, 0, 0, 0);
        node(&mut b, 2, false, 2, 2, 0); // depth jump past its parent
        b.raw(strings);
        let mut es = EndianReader::new(io::Cursor::new(b.bytes), Endian::Big);
        assert!(matches!(
            load_tree(&mut es),
            Err(Error::MalformedTypeTree("bad node depth"))
        ));
    }

    #[test]
    fn decodes_strings_arrays_and_alignment() {
        let mut fix = Builder::default();
        game_object_tree(&mut fix);
        let mut es = EndianReader::new(io::Cursor::new(fix.bytes), Endian::Big);
        let tree = load_tree(&mut es).unwrap();

        let mut data = Builder::default();
        data.i32(3).raw(b"abc").align().i32(-5).u32(0x4000_0000);
        let mut es = EndianReader::new(io::Cursor::new(data.bytes), Endian::Big);
        let v = read_value(&mut es, &tree).unwrap();

        assert_eq!(v.field("m_Name").and_then(ObjectValue::as_str), Some("abc"));
        assert_eq!(v.field("m_Layer"), Some(&ObjectValue::I32(-5)));
        assert_eq!(v.field("m_Scale"), Some(&ObjectValue::F32(2.0)));
    }

    #[test]
    fn harvest_collects_material_and_game_object_names() {
        let names = harvest(io::Cursor::new(sample_asset_file())).unwrap();
        assert_eq!(names.game_objects, ["door_frame"]);
        assert_eq!(names.materials, ["entity_rock_01"]);
    }

    #[test]
    fn harvest_switches_to_little_endian_object_data() {
        let names = harvest(io::Cursor::new(sample_asset_file_with(Endian::Little))).unwrap();
        assert_eq!(names.game_objects, ["door_frame"]);
        assert_eq!(names.materials, ["entity_rock_01"]);
    }
}
