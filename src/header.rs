use crate::error::{CipherError, Result};
use crate::mode::PayloadLayout;

/// BITMAPFILEHEADER (14) + BITMAPINFOHEADER (40)
pub const BMP_HEADER_SIZE: usize = 54;

/// Byte offset of the little-endian u32 pixel data offset
pub const PIXEL_OFFSET_FIELD: usize = 10;

/// A payload divided into the verbatim header prefix and the body to transform
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SplitPayload<'a> {
    pub header: &'a [u8],
    pub body: &'a [u8],
}

/// Split a payload according to its layout
///
/// For bitmaps the body starts at the offset stored in the header, which must
/// lie within `BMP_HEADER_SIZE..=payload.len()`.
pub fn split(payload: &[u8], layout: PayloadLayout) -> Result<SplitPayload<'_>> {
    let offset = match layout {
        PayloadLayout::Raw => 0,
        PayloadLayout::Bitmap => body_offset(payload)?,
    };
    let (header, body) = payload.split_at(offset);
    Ok(SplitPayload { header, body })
}

/// Exact inverse of `split`: header bytes followed by the body, both unmodified
pub fn join(header: &[u8], body: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(header.len() + body.len());
    out.extend_from_slice(header);
    out.extend_from_slice(body);
    out
}

/// Read and validate the pixel data offset of a bitmap payload
pub fn body_offset(payload: &[u8]) -> Result<usize> {
    if payload.len() < BMP_HEADER_SIZE {
        return Err(CipherError::MalformedHeader(format!(
            "payload is {} bytes, smaller than the {}-byte bitmap header",
            payload.len(),
            BMP_HEADER_SIZE
        )));
    }
    let offset = read_u32_le(payload, PIXEL_OFFSET_FIELD) as usize;
    if offset < BMP_HEADER_SIZE {
        return Err(CipherError::MalformedHeader(format!(
            "pixel data offset {} lies inside the {}-byte header",
            offset, BMP_HEADER_SIZE
        )));
    }
    if offset > payload.len() {
        return Err(CipherError::MalformedHeader(format!(
            "pixel data offset {} is past the end of a {}-byte payload",
            offset,
            payload.len()
        )));
    }
    Ok(offset)
}

fn read_u32_le(data: &[u8], at: usize) -> u32 {
    let mut buf = [0u8; 4];
    buf.copy_from_slice(&data[at..at + 4]);
    u32::from_le_bytes(buf)
}

fn read_i32_le(data: &[u8], at: usize) -> i32 {
    read_u32_le(data, at) as i32
}

/// Descriptive fields of a bitmap header, for diagnostics only
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BitmapSummary {
    pub signature: [u8; 2],
    pub file_size: u32,
    pub pixel_offset: u32,
    pub width: i32,
    pub height: i32,
    pub bits_per_pixel: u16,
}

impl BitmapSummary {
    pub fn parse(payload: &[u8]) -> Result<Self> {
        if payload.len() < BMP_HEADER_SIZE {
            return Err(CipherError::MalformedHeader("bitmap header too short".into()));
        }
        Ok(Self {
            signature: [payload[0], payload[1]],
            file_size: read_u32_le(payload, 2),
            pixel_offset: read_u32_le(payload, PIXEL_OFFSET_FIELD),
            width: read_i32_le(payload, 18),
            height: read_i32_le(payload, 22),
            bits_per_pixel: u16::from_le_bytes([payload[28], payload[29]]),
        })
    }

    /// Whether the file starts with the usual `BM` magic
    pub fn has_bm_signature(&self) -> bool {
        &self.signature == b"BM"
    }
}

impl std::fmt::Display for BitmapSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}x{} @ {} bpp, pixel data at {}, declared size {}",
            self.width, self.height, self.bits_per_pixel, self.pixel_offset, self.file_size
        )
    }
}

/// Minimal 24-bit bitmap with the given pixel bytes
#[cfg(test)]
pub(crate) fn build_bitmap(width: i32, height: i32, pixels: &[u8]) -> Vec<u8> {
    let offset = BMP_HEADER_SIZE as u32;
    let pixel_len = u32::try_from(pixels.len()).expect("pixel data exceeds u32");
    let file_size = offset
        .checked_add(pixel_len)
        .expect("bitmap size exceeds u32");
    let mut out = Vec::with_capacity(file_size as usize);
    out.extend_from_slice(b"BM");
    out.extend_from_slice(&file_size.to_le_bytes());
    out.extend_from_slice(&[0u8; 4]);
    out.extend_from_slice(&offset.to_le_bytes());
    out.extend_from_slice(&40u32.to_le_bytes());
    out.extend_from_slice(&width.to_le_bytes());
    out.extend_from_slice(&height.to_le_bytes());
    out.extend_from_slice(&1u16.to_le_bytes());
    out.extend_from_slice(&24u16.to_le_bytes());
    out.extend_from_slice(&0u32.to_le_bytes());
    out.extend_from_slice(&pixel_len.to_le_bytes());
    out.extend_from_slice(&2835i32.to_le_bytes());
    out.extend_from_slice(&2835i32.to_le_bytes());
    out.extend_from_slice(&0u32.to_le_bytes());
    out.extend_from_slice(&0u32.to_le_bytes());
    out.extend_from_slice(pixels);
    out
}
