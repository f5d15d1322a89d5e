//! Human-readable one-line rendering of commands, for level dumps.

use crate::command::Command;
use crate::schema;
use crate::tag::Tag;
use crate::value::Value;
use std::fmt::Write;

/// Renders a whole level's command list, one line per command (two for
/// `SaveAsset`, whose payload gets its own indented line).
pub fn dump_lines(cmds: &[Command]) -> Vec<String> {
    cmds.iter().map(format_command).collect()
}

pub fn format_command(cmd: &Command) -> String {
    if cmd.is_done() {
        return "CmdDone".to_owned();
    }
    let name = cmd.tag.name().unwrap_or("Cmd?");
    let mut line = format!("{name} {}", format_fields(cmd.tag, &cmd.fields));
    if cmd.tag == Tag::CMD_SAVE_ASSET {
        match cmd.fields.get(1) {
            Some(Value::Record { tag, fields }) => {
                let _ = write!(line, "\n {}", format_fields(*tag, fields));
            }
            Some(Value::Mesh(mesh)) => {
                let name = mesh.name.clone().map_or(Value::Null, Value::Str);
                let fields = [
                    &name,
                    &mesh.verts,
                    &mesh.uv,
                    &mesh.uv2,
                    &mesh.uv3,
                    &mesh.norms,
                    &mesh.tangs,
                    &mesh.colors,
                    &mesh.colors32,
                    &mesh.bone_weights,
                    &mesh.bindposes,
                    &mesh.tris,
                ];
                let names = schema::field_names(Tag::MESH).unwrap_or(&[]);
                let parts: Vec<String> = names
                    .iter()
                    .zip(fields)
                    .map(|(name, field)| format!("{name}:{}", format_value(field)))
                    .collect();
                let _ = write!(line, "\n {}", parts.join(", "));
            }
            _ => {}
        }
    }
    line
}

fn format_fields(tag: Tag, fields: &[Value]) -> String {
    let names = schema::field_names(tag).unwrap_or(&[]);
    let mut out = String::new();
    for (i, field) in fields.iter().enumerate() {
        if i > 0 {
            out.push_str(", ");
        }
        if let Some(name) = names.get(i) {
            let _ = write!(out, "{name}:");
        }
        out.push_str(&format_value(field));
    }
    out
}

/// Scalars print their value; vector-like records print bracketed
/// components; arrays print as `Element[count]` rather than their contents,
/// except a single-submesh jagged array which also shows the inner length.
fn format_value(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::Bool(v) => v.to_string(),
        Value::Byte(v) => v.to_string(),
        Value::Int(v) => v.to_string(),
        Value::UInt(v) => v.to_string(),
        Value::Float(v) => v.to_string(),
        Value::Str(s) => s.clone(),
        Value::Guid(id) => id.to_string(),
        Value::Enum { name, value } => format!("({name}){}", format_value(value)),
        Value::Record { tag, fields } => match *tag {
            Tag::VECTOR2 | Tag::VECTOR3 | Tag::VECTOR3B | Tag::VECTOR4 | Tag::QUATERNION
            | Tag::COLOR => {
                let parts: Vec<String> = fields.iter().map(format_value).collect();
                format!("[{}]", parts.join(", "))
            }
            _ => format!("{tag:?}"),
        },
        Value::Array { tag, items } => {
            if *tag == Tag::INT_ARRAY_ARRAY {
                if let [Value::Array { items: inner, .. }] = items.as_slice() {
                    return format!("IntArray[1][{}]", inner.len());
                }
                return format!("IntArray[{}]", items.len());
            }
            format!("{:?}[{}]", tag.element(), items.len())
        }
        Value::Bytes(blob) => format!("Color32[{}]", blob.len() / 4),
        Value::Mesh(_) => "Mesh".to_owned(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn done_is_bare() {
        assert_eq!(format_command(&Command::new(Tag::CMD_DONE, vec![])), "CmdDone");
    }

    #[test]
    fn fields_are_labelled() {
        let cmd = Command::new(
            Tag::CMD_GAME_OBJECT_SET_NAME,
            vec![Value::Guid(Uuid::nil()), Value::Str("pilot".into())],
        );
        assert_eq!(
            format_command(&cmd),
            "CmdGameObjectSetName objId:00000000-0000-0000-0000-000000000000, name:pilot"
        );
    }

    #[test]
    fn vectors_and_enums_inline() {
        let cmd = Command::new(
            Tag::CMD_GAME_OBJECT_SET_COMPONENT_PROPERTY,
            vec![
                Value::Guid(Uuid::nil()),
                Value::Str("center".into()),
                Value::Byte(0),
                Value::Byte(0),
                Value::Record {
                    tag: Tag::VECTOR3,
                    fields: vec![Value::Float(1.0), Value::Float(2.5), Value::Float(-3.0)],
                },
            ],
        );
        let line = format_command(&cmd);
        assert!(line.ends_with("value:[1, 2.5, -3]"), "{line}");

        // The type name goes in the parentheses, the raw value after.
        let enum_value = Value::Enum {
            name: "UnityEngine.Rendering.ShadowCastingMode".into(),
            value: Box::new(Value::Int(2)),
        };
        assert_eq!(
            format_value(&enum_value),
            "(UnityEngine.Rendering.ShadowCastingMode)2"
        );
    }

    #[test]
    fn arrays_summarize_by_count() {
        let arr = Value::Array {
            tag: Tag::VECTOR3_ARRAY,
            items: vec![
                Value::Record {
                    tag: Tag::VECTOR3,
                    fields: vec![Value::Float(0.0); 3],
                };
                7
            ],
        };
        assert_eq!(format_value(&arr), "Vector3[7]");

        let single_submesh = Value::Array {
            tag: Tag::INT_ARRAY_ARRAY,
            items: vec![Value::Array {
                tag: Tag::INT_ARRAY,
                items: vec![Value::Int(0); 9],
            }],
        };
        assert_eq!(format_value(&single_submesh), "IntArray[1][9]");
    }

    #[test]
    fn save_asset_payload_gets_a_second_line() {
        let cmd = Command::new(
            Tag::CMD_SAVE_ASSET,
            vec![
                Value::Guid(Uuid::nil()),
                Value::Record {
                    tag: Tag::PORTAL_GEOM_TRIANGLE,
                    fields: vec![Value::Int(12)],
                },
            ],
        );
        let line = format_command(&cmd);
        let (first, second) = line.split_once('\n').unwrap();
        assert!(first.starts_with("CmdSaveAsset id:"));
        assert_eq!(second, " firstVertIdx:12");
    }
}
