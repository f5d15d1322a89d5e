//! Whole-file level read and write.

use crate::command::{Command, CommandCodec};
use crate::tag::Tag;
use crate::{Error, Result};
use byteorder::{ReadBytesExt, WriteBytesExt, LE};
use serde::Serialize;
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

/// `Rev1` as a little-endian i32.
pub const LEVEL_MAGIC: i32 = 0x5265_7631;

/// A fully decoded level file: the header version plus every command up to
/// and including the terminating `Done`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Level {
    pub version: i32,
    pub cmds: Vec<Command>,
}

/// Decodes a level from a byte stream. Stops after the first `Done`
/// command; trailing bytes are left unread.
pub fn read_level<R: Read>(reader: R) -> Result<Level> {
    let mut reader = reader;
    let magic = reader.read_i32::<LE>()?;
    if magic != LEVEL_MAGIC {
        return Err(Error::InvalidHeader(magic));
    }
    let version = reader.read_i32::<LE>()?;
    if version != 3 && version != 4 {
        return Err(Error::UnsupportedVersion(version));
    }
    reader.read_i32::<LE>()?; // reserved

    let mut codec = CommandCodec::new(reader, version);
    let mut cmds = Vec::new();
    loop {
        let cmd = codec.read_command()?;
        let done = cmd.is_done();
        cmds.push(cmd);
        if done {
            break;
        }
    }
    Ok(Level { version, cmds })
}

/// Encodes a level to a byte stream. If the command list does not already
/// end with `Done`, a single `Done` is appended so the output always
/// terminates.
pub fn write_level<W: Write>(writer: W, level: &Level) -> Result<()> {
    let mut writer = writer;
    writer.write_i32::<LE>(LEVEL_MAGIC)?;
    writer.write_i32::<LE>(level.version)?;
    writer.write_i32::<LE>(1)?;

    let mut codec = CommandCodec::new(writer, level.version);
    for cmd in &level.cmds {
        codec.write_command(cmd)?;
    }
    if !level.cmds.last().is_some_and(Command::is_done) {
        codec.write_command(&Command::new(Tag::CMD_DONE, vec![]))?;
    }
    Ok(())
}

pub fn read_level_file<P: AsRef<Path>>(path: P) -> Result<Level> {
    read_level(BufReader::new(File::open(path)?))
}

/// Writes the level to a sibling `.tmp` file first, then swaps it into
/// place, so an encode failure never leaves a truncated level behind.
pub fn write_level_file<P: AsRef<Path>>(path: P, level: &Level) -> Result<()> {
    let path = path.as_ref();
    let tmp = {
        let mut name = path.as_os_str().to_owned();
        name.push(".tmp");
        std::path::PathBuf::from(name)
    };
    {
        let mut writer = BufWriter::new(File::create(&tmp)?);
        write_level(&mut writer, level)?;
        writer.flush()?;
    }
    if path.exists() {
        fs::remove_file(path)?;
    }
    fs::rename(&tmp, path)?;
    Ok(())
}
