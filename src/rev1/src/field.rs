//! Field-level wire codec.
//!
//! Reads and writes one value of a given [`Tag`] from a byte stream,
//! recursing into composites and arrays. All scalars are little-endian.
//! The declared tag fully determines the wire layout except for the
//! polymorphic `Unknown` slot, which carries its own runtime tag byte.

use crate::schema;
use crate::tag::Tag;
use crate::value::{Mesh, MeshLayout, Value};
use crate::{Error, Result};
use byteorder::{ReadBytesExt, WriteBytesExt, LE};
use std::io::{Read, Write};
use uuid::Uuid;

pub(crate) struct FieldCodec<S> {
    pub stream: S,
    pub version: i32,
}

impl<S> FieldCodec<S> {
    pub fn new(stream: S, version: i32) -> Self {
        FieldCodec { stream, version }
    }
}

impl<R: Read> FieldCodec<R> {
    pub fn read_field(&mut self, tag: Tag) -> Result<Value> {
        if tag.is_array() {
            let n = self.stream.read_i32::<LE>()?;
            if n == -1 {
                return Ok(Value::Null);
            }
            if n < 0 {
                return Err(Error::InvalidLength(n));
            }
            if tag == Tag::COLOR32_ARRAY {
                let mut blob = vec![0u8; n as usize * 4];
                self.stream.read_exact(&mut blob)?;
                return Ok(Value::Bytes(blob));
            }
            let element = tag.element();
            let mut items = Vec::with_capacity(n as usize);
            for _ in 0..n {
                items.push(self.read_field(element)?);
            }
            return Ok(Value::Array { tag, items });
        }
        match tag {
            Tag::GUID => {
                let mut buf = [0u8; 16];
                self.stream.read_exact(&mut buf)?;
                Ok(Value::Guid(Uuid::from_bytes_le(buf)))
            }
            Tag::INT => Ok(Value::Int(self.stream.read_i32::<LE>()?)),
            Tag::UINT => Ok(Value::UInt(self.stream.read_u32::<LE>()?)),
            Tag::FLOAT => Ok(Value::Float(self.stream.read_f32::<LE>()?)),
            Tag::STRING => Ok(match self.read_str()? {
                Some(s) => Value::Str(s),
                None => Value::Null,
            }),
            Tag::BOOL => Ok(Value::Bool(self.stream.read_u8()? != 0)),
            Tag::BYTE => Ok(Value::Byte(self.stream.read_u8()?)),
            Tag::UNKNOWN => self.read_unknown(),
            Tag::MESH => {
                if self.stream.read_u8()? == 0 {
                    Ok(Value::Null)
                } else {
                    Ok(Value::Mesh(Box::new(self.read_mesh()?)))
                }
            }
            Tag::MESH_EXISTING => Ok(Value::Mesh(Box::new(self.read_mesh()?))),
            _ => {
                let mut tag = tag;
                if tag.is_record() {
                    if tag.0 & Tag::EXISTING_OBJECT_FLAG == 0 {
                        if self.stream.read_u8()? == 0 {
                            return Ok(Value::Null);
                        }
                    } else {
                        tag = tag.without_existing();
                    }
                }
                let types = schema::field_types(tag).ok_or(Error::UnknownTag(tag))?;
                let mut fields = Vec::with_capacity(types.len());
                for &field_tag in types {
                    fields.push(self.read_field(field_tag)?);
                }
                Ok(Value::Record { tag, fields })
            }
        }
    }

    /// Resolves the polymorphic slot: a one-byte runtime tag, plus an
    /// auxiliary name string for enums and record types.
    fn read_unknown(&mut self) -> Result<Value> {
        let raw = u16::from(self.stream.read_u8()?);
        let array_bit = raw & Tag::ARRAY_FLAG;
        let base = Tag(raw & !Tag::ARRAY_FLAG);

        if base == Tag::ENUM {
            let name = self.read_str()?.ok_or(Error::AbsentString)?;
            let value = self.read_field(Tag(Tag::INT.0 | array_bit))?;
            return Ok(Value::Enum {
                name,
                value: Box::new(value),
            });
        }
        if base == Tag::OBJECT {
            let mut name = self.read_str()?.ok_or(Error::AbsentString)?;
            if name.contains('+') {
                name = name.replace('+', "__");
            }
            let resolved = Tag::by_name(&name).ok_or(Error::UnknownTypeName(name))?;
            return self.read_field(Tag(resolved.0 | array_bit));
        }
        self.read_field(Tag(raw))
    }

    fn read_mesh(&mut self) -> Result<Mesh> {
        let flags = if self.version == 3 {
            1
        } else {
            self.stream.read_i32::<LE>()?
        };
        let layout = MeshLayout::from_flags(self.version, flags);
        Ok(Mesh {
            name: self.read_str()?,
            verts: self.read_field(Tag::VECTOR3_ARRAY)?,
            uv: self.read_field(Tag::VECTOR2_ARRAY)?,
            uv2: self.read_field(Tag::VECTOR2_ARRAY)?,
            uv3: self.read_field(Tag::VECTOR2_ARRAY)?,
            norms: self.read_field(Tag::VECTOR3_ARRAY)?,
            tangs: self.read_field(Tag::VECTOR4_ARRAY)?,
            colors: if layout.colors {
                self.read_field(Tag::COLOR_ARRAY)?
            } else {
                Value::Null
            },
            colors32: if layout.colors32 {
                self.read_field(Tag::COLOR32_ARRAY)?
            } else {
                Value::Null
            },
            bone_weights: if layout.skinning {
                self.read_field(Tag::BONE_WEIGHT_ARRAY)?
            } else {
                Value::Null
            },
            bindposes: if layout.skinning {
                self.read_field(Tag::MATRIX4X4_ARRAY)?
            } else {
                Value::Null
            },
            tris: self.read_field(Tag::INT_ARRAY_ARRAY)?,
        })
    }

    fn read_str(&mut self) -> Result<Option<String>> {
        let n = self.stream.read_i32::<LE>()?;
        if n == -1 {
            return Ok(None);
        }
        if n < 0 {
            return Err(Error::InvalidLength(n));
        }
        let mut buf = vec![0u8; n as usize];
        self.stream.read_exact(&mut buf)?;
        Ok(Some(String::from_utf8(buf)?))
    }
}

impl<W: Write> FieldCodec<W> {
    pub fn write_field(&mut self, tag: Tag, value: &Value) -> Result<()> {
        if tag.is_array() {
            return match value {
                Value::Null => Ok(self.stream.write_i32::<LE>(-1)?),
                Value::Bytes(blob) if tag == Tag::COLOR32_ARRAY => {
                    self.stream.write_i32::<LE>((blob.len() >> 2) as i32)?;
                    self.stream.write_all(blob)?;
                    Ok(())
                }
                Value::Array { items, .. } => {
                    self.stream.write_i32::<LE>(items.len() as i32)?;
                    let element = tag.element();
                    for item in items {
                        self.write_field(element, item)?;
                    }
                    Ok(())
                }
                other => Err(Error::TypeMismatch {
                    expected: tag,
                    found: other.kind(),
                }),
            };
        }
        match tag {
            Tag::GUID => match value {
                Value::Guid(id) => Ok(self.stream.write_all(&id.to_bytes_le())?),
                other => Err(self.mismatch(tag, other)),
            },
            Tag::INT => match value {
                Value::Int(v) => Ok(self.stream.write_i32::<LE>(*v)?),
                other => Err(self.mismatch(tag, other)),
            },
            Tag::UINT => match value {
                Value::UInt(v) => Ok(self.stream.write_u32::<LE>(*v)?),
                other => Err(self.mismatch(tag, other)),
            },
            Tag::FLOAT => match value {
                Value::Float(v) => Ok(self.stream.write_f32::<LE>(*v)?),
                other => Err(self.mismatch(tag, other)),
            },
            Tag::STRING => match value {
                Value::Str(s) => self.write_str(Some(s)),
                Value::Null => self.write_str(None),
                other => Err(self.mismatch(tag, other)),
            },
            Tag::BOOL => match value {
                Value::Bool(v) => Ok(self.stream.write_u8(u8::from(*v))?),
                other => Err(self.mismatch(tag, other)),
            },
            Tag::BYTE => match value {
                Value::Byte(v) => Ok(self.stream.write_u8(*v)?),
                other => Err(self.mismatch(tag, other)),
            },
            Tag::UNKNOWN => self.write_unknown(value),
            Tag::MESH => match value {
                Value::Null => Ok(self.stream.write_u8(0)?),
                Value::Mesh(mesh) => {
                    self.stream.write_u8(1)?;
                    self.write_mesh(mesh)
                }
                other => Err(self.mismatch(tag, other)),
            },
            Tag::MESH_EXISTING => match value {
                Value::Mesh(mesh) => self.write_mesh(mesh),
                other => Err(self.mismatch(tag, other)),
            },
            _ => {
                let mut tag = tag;
                if tag.is_record() {
                    if tag.0 & Tag::EXISTING_OBJECT_FLAG == 0 {
                        if matches!(value, Value::Null) {
                            return Ok(self.stream.write_u8(0)?);
                        }
                        self.stream.write_u8(1)?;
                    } else {
                        tag = tag.without_existing();
                    }
                }
                let types = schema::field_types(tag).ok_or(Error::UnknownTag(tag))?;
                let Value::Record { fields, .. } = value else {
                    return Err(self.mismatch(tag, value));
                };
                if fields.len() != types.len() {
                    return Err(Error::FieldCount {
                        tag,
                        expected: types.len(),
                        found: fields.len(),
                    });
                }
                for (&field_tag, field) in types.iter().zip(fields) {
                    self.write_field(field_tag, field)?;
                }
                Ok(())
            }
        }
    }

    /// Writes a value into the polymorphic slot: infer the runtime tag
    /// from the value itself, emit the tag byte (plus the auxiliary name
    /// for enums and record types), then the body.
    fn write_unknown(&mut self, value: &Value) -> Result<()> {
        let tag = value_tag(value)?;
        if tag.0 & Tag::OBJECT_FLAG != 0 {
            let base = tag.element();
            let name = base.name().ok_or(Error::UnknownTag(base))?;
            self.stream
                .write_u8((Tag::OBJECT.0 | (tag.0 & Tag::ARRAY_FLAG)) as u8)?;
            self.write_str(Some(&name.replace("__", "+")))?;
            return self.write_field(tag, value);
        }
        if let Value::Enum { name, value: inner } = value {
            self.stream.write_u8(tag.0 as u8)?;
            self.write_str(Some(name))?;
            return self.write_field(Tag(Tag::INT.0 | (tag.0 & Tag::ARRAY_FLAG)), inner);
        }
        self.stream.write_u8(tag.0 as u8)?;
        self.write_field(tag, value)
    }

    fn write_mesh(&mut self, mesh: &Mesh) -> Result<()> {
        let flags = MeshLayout::flags_for(self.version, mesh);
        if self.version != 3 {
            self.stream.write_i32::<LE>(flags)?;
        }
        let layout = MeshLayout::from_flags(self.version, flags);
        self.write_str(mesh.name.as_deref())?;
        self.write_field(Tag::VECTOR3_ARRAY, &mesh.verts)?;
        self.write_field(Tag::VECTOR2_ARRAY, &mesh.uv)?;
        self.write_field(Tag::VECTOR2_ARRAY, &mesh.uv2)?;
        self.write_field(Tag::VECTOR2_ARRAY, &mesh.uv3)?;
        self.write_field(Tag::VECTOR3_ARRAY, &mesh.norms)?;
        self.write_field(Tag::VECTOR4_ARRAY, &mesh.tangs)?;
        if layout.colors {
            self.write_field(Tag::COLOR_ARRAY, &mesh.colors)?;
        }
        if layout.colors32 {
            self.write_field(Tag::COLOR32_ARRAY, &mesh.colors32)?;
        }
        if layout.skinning {
            self.write_field(Tag::BONE_WEIGHT_ARRAY, &mesh.bone_weights)?;
            self.write_field(Tag::MATRIX4X4_ARRAY, &mesh.bindposes)?;
        }
        self.write_field(Tag::INT_ARRAY_ARRAY, &mesh.tris)
    }

    fn write_str(&mut self, s: Option<&str>) -> Result<()> {
        match s {
            None => self.stream.write_i32::<LE>(-1)?,
            Some(s) => {
                self.stream.write_i32::<LE>(s.len() as i32)?;
                self.stream.write_all(s.as_bytes())?;
            }
        }
        Ok(())
    }

    fn mismatch(&self, expected: Tag, found: &Value) -> Error {
        Error::TypeMismatch {
            expected,
            found: found.kind(),
        }
    }
}

/// The runtime tag a value carries into the polymorphic slot.
fn value_tag(value: &Value) -> Result<Tag> {
    Ok(match value {
        Value::Bool(_) => Tag::BOOL,
        Value::Byte(_) => Tag::BYTE,
        Value::Int(_) => Tag::INT,
        Value::UInt(_) => Tag::UINT,
        Value::Float(_) => Tag::FLOAT,
        Value::Str(_) => Tag::STRING,
        Value::Guid(_) => Tag::GUID,
        Value::Record { tag, .. } => *tag,
        Value::Array { tag, .. } => *tag,
        Value::Bytes(_) => Tag::COLOR32_ARRAY,
        Value::Mesh(_) => Tag::MESH,
        Value::Enum { value, .. } => {
            if matches!(**value, Value::Array { .. }) {
                Tag(Tag::ENUM.0 | Tag::ARRAY_FLAG)
            } else {
                Tag::ENUM
            }
        }
        Value::Null => return Err(Error::CannotInferTag),
    })
}
