//! Flat little-endian layout shared with the baking tools.
//!
//! ```text
//! SdfMap:          i32 width, i32 height, f32 grain, f32 scale,
//!                  f32 origin_x, f32 origin_y, i32 len, i16[len]
//! DynamicObstacle: string name, i32 width, i32 height, i32 x, i32 y, i32 len, i16[len]
//! SdfScene:        SdfMap, i16 count, DynamicObstacle[count]
//! ```
//!
//! Strings use a 7-bit varint byte length followed by UTF-8. The compressed
//! variants wrap the same bytes in a zlib stream.

use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

use bevy::math::Vec2;
use bincode::Options;
use flate2::read::ZlibDecoder;
use flate2::write::ZlibEncoder;
use flate2::Compression;
use serde::{Deserialize, Serialize};

use super::error::{SdfError, SdfResult};
use super::map::{validate_header, SdfMap};
use super::scene::{DynamicObstacle, SdfScene};

#[derive(Serialize, Deserialize, Debug, Clone, Copy)]
struct MapHeader {
    width: i32,
    height: i32,
    grain: f32,
    scale: f32,
    origin_x: f32,
    origin_y: f32,
    len: i32,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy)]
struct ObstacleHeader {
    width: i32,
    height: i32,
    x: i32,
    y: i32,
    len: i32,
}

fn codec() -> impl Options {
    bincode::DefaultOptions::new()
        .with_fixint_encoding()
        .with_little_endian()
        .allow_trailing_bytes()
}

fn write_i16s<W: Write>(writer: &mut W, values: &[i16]) -> SdfResult<()> {
    let mut bytes = Vec::with_capacity(values.len() * 2);
    for v in values {
        bytes.extend_from_slice(&v.to_le_bytes());
    }
    writer.write_all(&bytes)?;
    Ok(())
}

fn read_i16s<R: Read>(reader: &mut R, len: usize) -> SdfResult<Vec<i16>> {
    let mut bytes = vec![0u8; len * 2];
    reader.read_exact(&mut bytes)?;
    Ok(bytes
        .chunks_exact(2)
        .map(|c| i16::from_le_bytes([c[0], c[1]]))
        .collect())
}

fn checked_len(len: i32, expected: usize) -> SdfResult<usize> {
    if len < 0 || len as usize != expected {
        return Err(SdfError::DataLength {
            expected,
            actual: len as i64,
        });
    }
    Ok(expected)
}

fn write_string<W: Write>(writer: &mut W, s: &str) -> SdfResult<()> {
    let mut len = s.len();
    let mut prefix = Vec::with_capacity(5);
    loop {
        let byte = (len & 0x7f) as u8;
        len >>= 7;
        if len == 0 {
            prefix.push(byte);
            break;
        }
        prefix.push(byte | 0x80);
    }
    writer.write_all(&prefix)?;
    writer.write_all(s.as_bytes())?;
    Ok(())
}

fn read_string<R: Read>(reader: &mut R) -> SdfResult<String> {
    let mut len: usize = 0;
    let mut shift = 0;
    loop {
        let mut byte = [0u8; 1];
        reader.read_exact(&mut byte)?;
        len |= ((byte[0] & 0x7f) as usize) << shift;
        if byte[0] & 0x80 == 0 {
            break;
        }
        shift += 7;
        if shift > 28 {
            return Err(SdfError::InvalidString("length prefix too long".into()));
        }
    }
    let mut bytes = vec![0u8; len];
    reader.read_exact(&mut bytes)?;
    String::from_utf8(bytes).map_err(|e| SdfError::InvalidString(e.to_string()))
}

impl SdfMap {
    pub fn read<R: Read>(reader: &mut R) -> SdfResult<Self> {
        let header: MapHeader = codec().deserialize_from(&mut *reader)?;
        validate_header(header.width, header.height, header.grain, header.scale)?;
        let expected = (header.width as usize) * (header.height as usize);
        let len = checked_len(header.len, expected)?;
        let data = read_i16s(reader, len)?;
        SdfMap::new(
            header.width,
            header.height,
            header.grain,
            header.scale,
            Vec2::new(header.origin_x, header.origin_y),
            data,
        )
    }

    pub fn write<W: Write>(&self, writer: &mut W) -> SdfResult<()> {
        let header = MapHeader {
            width: self.width(),
            height: self.height(),
            grain: self.grain(),
            scale: self.scale(),
            origin_x: self.origin().x,
            origin_y: self.origin().y,
            len: self.data().len() as i32,
        };
        codec().serialize_into(&mut *writer, &header)?;
        write_i16s(writer, self.data())
    }

    pub fn from_bytes(bytes: &[u8]) -> SdfResult<Self> {
        let mut cursor = bytes;
        Self::read(&mut cursor)
    }

    pub fn to_bytes(&self) -> SdfResult<Vec<u8>> {
        let mut out = Vec::with_capacity(28 + self.data().len() * 2);
        self.write(&mut out)?;
        Ok(out)
    }
}

impl DynamicObstacle {
    pub fn read<R: Read>(reader: &mut R) -> SdfResult<Self> {
        let name = read_string(reader)?;
        let header: ObstacleHeader = codec().deserialize_from(&mut *reader)?;
        if header.width <= 0 || header.height <= 0 {
            return Err(SdfError::InvalidDimensions {
                width: header.width,
                height: header.height,
            });
        }
        let expected = (header.width as usize) * (header.height as usize);
        let len = checked_len(header.len, expected)?;
        let data = read_i16s(reader, len)?;
        DynamicObstacle::new(name, header.width, header.height, header.x, header.y, data)
    }

    pub fn write<W: Write>(&self, writer: &mut W) -> SdfResult<()> {
        write_string(writer, &self.name)?;
        let header = ObstacleHeader {
            width: self.width(),
            height: self.height(),
            x: self.x,
            y: self.y,
            len: self.data().len() as i32,
        };
        codec().serialize_into(&mut *writer, &header)?;
        write_i16s(writer, self.data())
    }
}

impl SdfScene {
    pub fn read<R: Read>(reader: &mut R) -> SdfResult<Self> {
        let map = SdfMap::read(reader)?;
        let mut count = [0u8; 2];
        reader.read_exact(&mut count)?;
        let count = i16::from_le_bytes(count);
        if count < 0 {
            return Err(SdfError::ObstacleCount(count));
        }
        let mut obstacles = Vec::with_capacity(count as usize);
        for _ in 0..count {
            obstacles.push(DynamicObstacle::read(reader)?);
        }
        Ok(SdfScene { map, obstacles })
    }

    pub fn write<W: Write>(&self, writer: &mut W) -> SdfResult<()> {
        self.map.write(writer)?;
        let count = self.obstacles.len().min(i16::MAX as usize) as i16;
        writer.write_all(&count.to_le_bytes())?;
        for obstacle in self.obstacles.iter().take(count as usize) {
            obstacle.write(writer)?;
        }
        Ok(())
    }

    pub fn from_bytes(bytes: &[u8]) -> SdfResult<Self> {
        let mut cursor = bytes;
        Self::read(&mut cursor)
    }

    pub fn to_bytes(&self) -> SdfResult<Vec<u8>> {
        let mut out = Vec::new();
        self.write(&mut out)?;
        Ok(out)
    }
}

pub fn write_compressed<W: Write>(writer: W, scene: &SdfScene) -> SdfResult<()> {
    let mut encoder = ZlibEncoder::new(writer, Compression::default());
    scene.write(&mut encoder)?;
    encoder.finish()?;
    Ok(())
}

pub fn read_compressed<R: Read>(reader: R) -> SdfResult<SdfScene> {
    let mut decoder = ZlibDecoder::new(reader);
    SdfScene::read(&mut decoder)
}

/// Writes a scene to `path`, zlib-compressed when the extension is `z`.
pub fn save_scene(path: impl AsRef<Path>, scene: &SdfScene) -> SdfResult<()> {
    let path = path.as_ref();
    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);
    if is_compressed_path(path) {
        write_compressed(&mut writer, scene)?;
    } else {
        scene.write(&mut writer)?;
    }
    writer.flush()?;
    Ok(())
}

/// Reads a scene written by [`save_scene`] or the baking tools.
pub fn load_scene(path: impl AsRef<Path>) -> SdfResult<SdfScene> {
    let path = path.as_ref();
    let file = File::open(path)?;
    let mut reader = BufReader::new(file);
    if is_compressed_path(path) {
        read_compressed(reader)
    } else {
        SdfScene::read(&mut reader)
    }
}

fn is_compressed_path(path: &Path) -> bool {
    path.extension().map_or(false, |ext| ext == "z")
}
