//! UnityFS container parsing.

use crate::block::{BlockInfo, BlockStorage, StreamPart};
use crate::compress::decompress;
use crate::serialized::{self, Endian, EndianReader};
use crate::{Error, Result};
use serde::Serialize;
use std::fs::File;
use std::io::{BufReader, Cursor, Read, Seek, SeekFrom};
use std::path::Path;

/// Names harvested from the first part of a bundle.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
pub struct BundleNames {
    pub materials: Vec<String>,
    pub game_objects: Vec<String>,
}

pub fn read_bundle_file<P: AsRef<Path>>(path: P) -> Result<BundleNames> {
    read_bundle(BufReader::new(File::open(path)?))
}

/// Parses a UnityFS container and harvests names from its first part.
pub fn read_bundle<R: Read + Seek>(reader: R) -> Result<BundleNames> {
    let mut es = EndianReader::new(reader, Endian::Big);
    let signature = es.read_cstr()?;
    if signature != "UnityFS" {
        return Err(Error::UnsupportedContainer(signature));
    }

    let container_format = es.read_i32()?;
    let _player_version = es.read_cstr()?;
    let _engine_version = es.read_cstr()?;
    let _bundle_size = if container_format < 6 {
        i64::from(es.read_i32()?)
    } else {
        es.read_i64()?
    };

    let compressed_dir_size = es.read_i32()?;
    let uncompressed_dir_size = es.read_i32()?;
    let flags = es.read_i32()?;
    let compression = (flags as u32) & 0x3f;
    let dir_at_eof = flags & 0x80 != 0;

    // The directory either follows the header or sits at the end of the
    // file; either way the data blocks start right after the header.
    let directory = if dir_at_eof {
        let data_start = es.stream_position()?;
        es.seek(SeekFrom::End(-i64::from(compressed_dir_size)))?;
        let raw = es.read_bytes(compressed_dir_size as usize)?;
        es.seek(SeekFrom::Start(data_start))?;
        raw
    } else {
        es.read_bytes(compressed_dir_size as usize)?
    };
    let directory = decompress(&directory, uncompressed_dir_size as usize, compression)?;

    let mut dir = EndianReader::new(Cursor::new(directory), Endian::Big);
    let _guid = dir.read_bytes(16)?;

    let num_blocks = dir.read_i32()?;
    let mut blocks = Vec::with_capacity(num_blocks.max(0) as usize);
    for _ in 0..num_blocks {
        let u_size = dir.read_i32()? as u32;
        let c_size = dir.read_i32()? as u32;
        let flags = dir.read_i16()? as u16;
        blocks.push(BlockInfo {
            u_size,
            c_size,
            flags,
        });
    }

    let num_parts = dir.read_i32()?;
    let mut first_part = None;
    for i in 0..num_parts {
        let ofs = dir.read_i64()?;
        let size = dir.read_i64()?;
        let _status = dir.read_i32()?;
        let _name = dir.read_cstr()?;
        if i == 0 {
            first_part = Some((ofs as u64, size as u64));
        }
    }
    let (ofs, size) = first_part.ok_or(Error::NoParts)?;

    let storage = BlockStorage::new(blocks, es.into_inner())?;
    serialized::harvest(StreamPart::new(storage, ofs, size))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compress::{COMP_LZ4, COMP_NONE};
    use crate::serialized::tests::{sample_asset_file, Builder};

    struct Layout {
        block_compression: u32,
        dir_at_eof: bool,
    }

    /// Wraps a serialized asset file in a single-block UnityFS container.
    fn build_bundle(asset: &[u8], layout: &Layout) -> Vec<u8> {
        let packed_block = match layout.block_compression {
            COMP_NONE => asset.to_vec(),
            COMP_LZ4 => lz4_flex::block::compress(asset),
            other => panic!("no fixture for compression {other}"),
        };

        let mut dir = Builder::default();
        dir.raw(&[0u8; 16]);
        dir.i32(1)
            .i32(asset.len() as i32)
            .i32(packed_block.len() as i32)
            .i16(layout.block_compression as i16);
        dir.i32(1)
            .u64(0)
            .u64(asset.len() as u64)
            .i32(4)
            .cstr("CAB-5a1a2b3c4d");

        let mut b = Builder::default();
        b.cstr("UnityFS")
            .i32(6)
            .cstr("5.x.x")
            .cstr("2017.4.1f1");
        let size_at = b.bytes.len();
        b.u64(0);
        b.i32(dir.bytes.len() as i32).i32(dir.bytes.len() as i32);
        let mut flags = COMP_NONE as i32;
        if layout.dir_at_eof {
            flags |= 0x80;
        }
        b.i32(flags);
        if layout.dir_at_eof {
            b.raw(&packed_block).raw(&dir.bytes);
        } else {
            b.raw(&dir.bytes).raw(&packed_block);
        }
        let total = b.bytes.len() as u64;
        b.bytes[size_at..size_at + 8].copy_from_slice(&total.to_be_bytes());
        b.bytes
    }

    #[test]
    fn reads_an_uncompressed_bundle() {
        let bundle = build_bundle(
            &sample_asset_file(),
            &Layout {
                block_compression: COMP_NONE,
                dir_at_eof: false,
            },
        );
        let names = read_bundle(Cursor::new(bundle)).unwrap();
        assert_eq!(names.game_objects, ["door_frame"]);
        assert_eq!(names.materials, ["entity_rock_01"]);
    }

    #[test]
    fn reads_lz4_blocks() {
        let bundle = build_bundle(
            &sample_asset_file(),
            &Layout {
                block_compression: COMP_LZ4,
                dir_at_eof: false,
            },
        );
        let names = read_bundle(Cursor::new(bundle)).unwrap();
        assert_eq!(names.materials, ["entity_rock_01"]);
    }

    #[test]
    fn reads_a_directory_stored_at_end_of_file() {
        let bundle = build_bundle(
            &sample_asset_file(),
            &Layout {
                block_compression: COMP_LZ4,
                dir_at_eof: true,
            },
        );
        let names = read_bundle(Cursor::new(bundle)).unwrap();
        assert_eq!(names.game_objects, ["door_frame"]);
    }

    #[test]
    fn rejects_foreign_containers() {
        let mut b = Builder::default();
        b.cstr("UnityWeb").raw(&[0u8; 32]);
        assert!(matches!(
            read_bundle(Cursor::new(b.bytes)),
            Err(Error::UnsupportedContainer(sig)) if sig == "UnityWeb"
        ));
    }
}
