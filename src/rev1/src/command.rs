//! Command-level codec.
//!
//! A level is a sequence of commands. Each command starts with a two-byte
//! little-endian opcode (the command tag without its command bit) followed
//! by its fields per the registry schema. Commands are stateful to decode:
//! `AddAssetToAssetFile` registers an asset id with a type name, and the
//! `FromAsset` placeholder in a later command's schema resolves against
//! that registry using the guid field immediately before it.

use crate::field::FieldCodec;
use crate::schema;
use crate::tag::Tag;
use crate::value::Value;
use crate::{Error, Result};
use byteorder::{ReadBytesExt, WriteBytesExt, LE};
use serde::Serialize;
use std::collections::HashMap;
use std::io::{Read, Write};
use uuid::Uuid;

/// One decoded command: its tag and its field values in schema order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Command {
    pub tag: Tag,
    pub fields: Vec<Value>,
}

impl Command {
    pub fn new(tag: Tag, fields: Vec<Value>) -> Self {
        Command { tag, fields }
    }

    pub fn is_done(&self) -> bool {
        self.tag == Tag::CMD_DONE
    }
}

pub(crate) struct CommandCodec<S> {
    fields: FieldCodec<S>,
    asset_types: HashMap<Uuid, String>,
}

impl<S> CommandCodec<S> {
    pub fn new(stream: S, version: i32) -> Self {
        CommandCodec {
            fields: FieldCodec::new(stream, version),
            asset_types: HashMap::new(),
        }
    }

    /// Resolves a registered asset id to the existing-object tag a
    /// `FromAsset` field decodes as. The registered type name comes from
    /// the asset bundle, so `UnityEngine.Mesh` and plain `Mesh` both
    /// resolve to the mesh tag.
    fn asset_type(&self, id: Uuid) -> Result<Tag> {
        let name = self
            .asset_types
            .get(&id)
            .ok_or(Error::UnknownAsset(id))?
            .as_str();
        let name = name.strip_prefix("UnityEngine.").unwrap_or(name);
        let tag = Tag::by_name(name).ok_or_else(|| Error::UnknownTypeName(name.to_owned()))?;
        Ok(Tag(tag.0 | Tag::EXISTING_OBJECT_FLAG))
    }

    /// The asset id a `FromAsset` field at position `index` resolves with:
    /// the guid decoded immediately before it.
    fn preceding_asset_id(&self, tag: Tag, fields: &[Value], index: usize) -> Result<Uuid> {
        index
            .checked_sub(1)
            .and_then(|prev| fields.get(prev))
            .and_then(Value::as_guid)
            .ok_or(Error::MisplacedFromAsset(tag))
    }

    /// `AddAssetToAssetFile` carries `(fileId, newAssetId, type)`; record
    /// the id-to-type mapping for later `FromAsset` fields. A re-registered
    /// id keeps the latest type.
    fn register_assets(&mut self, cmd: &Command) {
        if cmd.tag != Tag::CMD_ADD_ASSET_TO_ASSET_FILE {
            return;
        }
        if let (Some(id), Some(name)) = (
            cmd.fields.get(1).and_then(Value::as_guid),
            cmd.fields.get(2).and_then(Value::as_str),
        ) {
            self.asset_types.insert(id, name.to_owned());
        }
    }
}

impl<R: Read> CommandCodec<R> {
    pub fn read_command(&mut self) -> Result<Command> {
        let tag = Tag(self.fields.stream.read_u16::<LE>()? | Tag::CMD_FLAG);
        let types = schema::field_types(tag).ok_or(Error::UnknownCommand(tag))?;
        let mut fields = Vec::with_capacity(types.len());
        for (i, &field_tag) in types.iter().enumerate() {
            let field_tag = if field_tag == Tag::FROM_ASSET {
                let id = self.preceding_asset_id(tag, &fields, i)?;
                self.asset_type(id)?
            } else {
                field_tag
            };
            fields.push(self.fields.read_field(field_tag)?);
        }
        let cmd = Command { tag, fields };
        self.register_assets(&cmd);
        Ok(cmd)
    }
}

impl<W: Write> CommandCodec<W> {
    pub fn write_command(&mut self, cmd: &Command) -> Result<()> {
        let types = schema::field_types(cmd.tag).ok_or(Error::UnknownCommand(cmd.tag))?;
        if cmd.fields.len() != types.len() {
            return Err(Error::FieldCount {
                tag: cmd.tag,
                expected: types.len(),
                found: cmd.fields.len(),
            });
        }
        self.fields
            .stream
            .write_u16::<LE>(cmd.tag.0 & !Tag::CMD_FLAG)?;
        for (i, (&field_tag, field)) in types.iter().zip(&cmd.fields).enumerate() {
            let field_tag = if field_tag == Tag::FROM_ASSET {
                let id = self.preceding_asset_id(cmd.tag, &cmd.fields, i)?;
                self.asset_type(id)?
            } else {
                field_tag
            };
            self.fields.write_field(field_tag, field)?;
        }
        self.register_assets(cmd);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn add_asset(id: Uuid, type_name: &str) -> Command {
        Command::new(
            Tag::CMD_ADD_ASSET_TO_ASSET_FILE,
            vec![
                Value::Guid(Uuid::from_u128(0x11)),
                Value::Guid(id),
                Value::Str(type_name.into()),
            ],
        )
    }

    fn save_asset(id: Uuid, value: Value) -> Command {
        Command::new(Tag::CMD_SAVE_ASSET, vec![Value::Guid(id), value])
    }

    fn round_trip(cmds: &[Command]) -> Vec<u8> {
        let mut writer = CommandCodec::new(Vec::new(), 4);
        for cmd in cmds {
            writer.write_command(cmd).unwrap();
        }
        let bytes = writer.fields.stream;

        let mut reader = CommandCodec::new(Cursor::new(&bytes), 4);
        for cmd in cmds {
            assert_eq!(&reader.read_command().unwrap(), cmd);
        }
        assert_eq!(reader.fields.stream.position() as usize, bytes.len());
        bytes
    }

    #[test]
    fn opcode_drops_the_command_bit() {
        let bytes = round_trip(&[Command::new(Tag::CMD_DONE, vec![])]);
        assert_eq!(bytes, [0, 0]);
    }

    #[test]
    fn from_asset_resolves_registered_type() {
        let id = Uuid::from_u128(0x77);
        let triangle = Value::Record {
            tag: Tag::PORTAL_GEOM_TRIANGLE,
            fields: vec![Value::Int(9)],
        };
        let bytes = round_trip(&[
            add_asset(id, "PortalGeomTriangle"),
            save_asset(id, triangle),
            Command::new(Tag::CMD_DONE, vec![]),
        ]);

        // The saved value is typed as an existing object: no presence byte,
        // just the command opcode, the guid, and the one int field.
        let save_at = bytes.len() - 2 - (2 + 16 + 4);
        assert_eq!(&bytes[save_at..save_at + 2], [15, 0]);
        assert_eq!(&bytes[save_at + 18..save_at + 22], 9i32.to_le_bytes());
    }

    #[test]
    fn from_asset_strips_engine_namespace() {
        let id = Uuid::from_u128(0x99);
        let mut codec = CommandCodec::new(Vec::new(), 4);
        codec.write_command(&add_asset(id, "UnityEngine.Mesh")).unwrap();
        assert_eq!(codec.asset_type(id).unwrap(), Tag::MESH_EXISTING);
    }

    #[test]
    fn save_of_unregistered_asset_fails() {
        let id = Uuid::from_u128(0xab);
        let mut codec = CommandCodec::new(Vec::new(), 4);
        let err = codec
            .write_command(&save_asset(id, Value::Int(0)))
            .unwrap_err();
        assert!(matches!(err, Error::UnknownAsset(bad) if bad == id));
    }

    #[test]
    fn reregistered_asset_keeps_latest_type() {
        let id = Uuid::from_u128(0xcd);
        let mut codec = CommandCodec::new(Vec::new(), 4);
        codec.write_command(&add_asset(id, "PortalData")).unwrap();
        codec
            .write_command(&add_asset(id, "PortalGeomTriangle"))
            .unwrap();
        assert_eq!(
            codec.asset_type(id).unwrap(),
            Tag(Tag::PORTAL_GEOM_TRIANGLE.0 | Tag::EXISTING_OBJECT_FLAG)
        );
    }

    #[test]
    fn unknown_opcode_is_rejected() {
        let mut reader = CommandCodec::new(Cursor::new([0xff, 0x00]), 4);
        assert!(matches!(
            reader.read_command(),
            Err(Error::UnknownCommand(Tag(0x1ff)))
        ));
    }
}
