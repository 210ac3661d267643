use bmpcipher::header::BMP_HEADER_SIZE;

/// Minimal 24-bit bitmap: 54-byte header followed by `pixels`
pub fn build_bitmap(width: i32, height: i32, pixels: &[u8]) -> Vec<u8> {
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
    out.extend_from_slice(&[0u8; 4]);
    out.extend_from_slice(&pixel_len.to_le_bytes());
    out.extend_from_slice(&2835i32.to_le_bytes());
    out.extend_from_slice(&2835i32.to_le_bytes());
    out.extend_from_slice(&[0u8; 8]);
    out.extend_from_slice(pixels);
    debug_assert_eq!(out.len(), file_size as usize);
    out
}
