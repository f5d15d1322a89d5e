//! UnityFS asset-bundle reader
//!
//! Reads just enough of a UnityFS container to harvest the names of the
//! materials and game objects inside, so levels can be checked against the
//! bundles they reference.
//!
//! # Format Overview
//!
//! ## Container (`UnityFS`)
//!
//! Big-endian throughout:
//! - NUL-terminated `UnityFS` signature, container format, two version
//!   strings
//! - Bundle size, compressed/uncompressed directory sizes, flags
//! - Flags bits 0-5 select the directory compression, bit 7 moves the
//!   directory to the end of the file
//!
//! ## Directory
//!
//! A 16-byte GUID, the block list (decompressed and compressed sizes plus
//! per-block compression flags), and the part list (offset, size, status,
//! name). The first part is the serialized asset file.
//!
//! ## Serialized file
//!
//! Header, type metadata with optional type trees, then the object table.
//! Material names (class 21) sit at the start of their object data; game
//! object names (class 1) come from decoding the object through its type
//! tree and taking `m_Name`.

mod block;
mod bundle;
mod compress;
mod serialized;

pub use block::{BlockInfo, BlockStorage, StreamPart};
pub use bundle::{read_bundle, read_bundle_file, BundleNames};
pub use compress::decompress;
pub use serialized::ObjectValue;

/// Errors from bundle parsing
#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("Unknown container signature {0:?}")]
    UnsupportedContainer(String),

    #[error("Unknown compression {0}")]
    UnknownCompression(u32),

    #[error("LZ4 decompression error: {0}")]
    Lz4(#[from] lz4_flex::block::DecompressError),

    #[error("LZMA decompression error: {0}")]
    Lzma(#[from] xz2::stream::Error),

    #[error("Decompression size mismatch: expected {expected}, got {actual}")]
    DecompressionSize { expected: usize, actual: usize },

    #[error("Bundle directory lists no parts")]
    NoParts,

    #[error("Malformed type tree: {0}")]
    MalformedTypeTree(&'static str),

    #[error("No type tree for class {0}")]
    MissingTypeTree(i32),

    #[error("Object references unknown type slot {0}")]
    UnknownTypeIndex(i32),

    #[error("Invalid length prefix {0}")]
    InvalidLength(i32),

    #[error("Invalid string data: {0}")]
    InvalidString(#[from] std::string::FromUtf8Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
