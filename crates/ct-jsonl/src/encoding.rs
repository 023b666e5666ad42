use std::fs::File;
use std::io::{self, Read};
use std::path::Path;

pub const UTF8_BOM: [u8; 3] = [0xEF, 0xBB, 0xBF];

/// Whether `bytes` begin with the UTF-8 byte-order mark.
pub fn starts_with_bom(bytes: &[u8]) -> bool {
    bytes.starts_with(&UTF8_BOM)
}

/// Read at most the first three bytes of `path` and compare them to the BOM.
pub fn has_bom(path: &Path) -> io::Result<bool> {
    let mut head = Vec::with_capacity(UTF8_BOM.len());
    File::open(path)?
        .take(UTF8_BOM.len() as u64)
        .read_to_end(&mut head)?;
    Ok(starts_with_bom(&head))
}
