//! Codec for Overload level files (Rev1 command streams)
//!
//! A level file is a short header followed by a stream of commands that
//! rebuild the level's Unity objects at load time.
//!
//! # Format Overview
//!
//! ## Header
//!
//! - Bytes 0-3: `Rev1` magic (0x52657631, little-endian)
//! - Bytes 4-7: File version (3 or 4)
//! - Bytes 8-11: Reserved word (written as 1)
//!
//! ## Command Stream
//!
//! Each command is a two-byte opcode followed by schema-typed fields; the
//! stream ends at the `Done` command. Field layouts are self-describing
//! only through the registry in [`schema`]; see [`tag::Tag`] for the tag
//! bit regions.

mod command;
mod dump;
mod field;
mod level;
pub mod schema;
pub mod tag;
mod value;

pub use command::Command;
pub use dump::{dump_lines, format_command};
pub use level::{
    read_level, read_level_file, write_level, write_level_file, Level, LEVEL_MAGIC,
};
pub use tag::Tag;
pub use value::{Mesh, Value};

/// Errors from level decoding and encoding
#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("Invalid file header: expected 0x52657631, got 0x{0:08x}")]
    InvalidHeader(i32),

    #[error("Unknown file version {0}")]
    UnsupportedVersion(i32),

    #[error("Unknown command {:?}", .0)]
    UnknownCommand(Tag),

    #[error("Unknown type {0:?}")]
    UnknownTag(Tag),

    #[error("Unknown type name {0:?}")]
    UnknownTypeName(String),

    #[error("Unknown asset {0}")]
    UnknownAsset(uuid::Uuid),

    #[error("Asset-typed field of {0:?} is not preceded by an asset id")]
    MisplacedFromAsset(Tag),

    #[error("Expected {expected:?}, got {found} value")]
    TypeMismatch { expected: Tag, found: &'static str },

    #[error("{tag:?} takes {expected} fields, got {found}")]
    FieldCount {
        tag: Tag,
        expected: usize,
        found: usize,
    },

    #[error("Invalid length prefix {0}")]
    InvalidLength(i32),

    #[error("Missing required string")]
    AbsentString,

    #[error("Cannot infer a wire type for a null value")]
    CannotInferTag,

    #[error("Invalid string data: {0}")]
    InvalidString(#[from] std::string::FromUtf8Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
