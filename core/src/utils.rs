use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::constants::{DICT_HEADER_LEN, DICT_MAGIC};

/// True when `content` opens with the zstd dictionary magic number.
pub fn has_dict_magic(content: &[u8]) -> bool {
    content.len() >= 4 && read_le32(&content[..4]) == DICT_MAGIC
}

/// Dictionary id stored in a zstd dictionary header.
/// Returns 0 for raw content or anything shorter than the header.
pub fn read_dict_id(content: &[u8]) -> u32 {
    if content.len() < DICT_HEADER_LEN || !has_dict_magic(content) {
        return 0;
    }
    read_le32(&content[4..DICT_HEADER_LEN])
}

fn read_le32(bytes: &[u8]) -> u32 {
    let mut word = [0u8; 4];
    word.copy_from_slice(&bytes[..4]);
    u32::from_le_bytes(word)
}

// Guarded state is only ever an Option swap, so a poisoned lock is still consistent.
pub(crate) fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn header(id: u32) -> Vec<u8> {
        let mut d = DICT_MAGIC.to_le_bytes().to_vec();
        d.extend_from_slice(&id.to_le_bytes());
        d
    }

    #[test]
    fn dict_id_read_from_header() {
        let mut d = header(0x1234_5678);
        d.extend_from_slice(b"tables");
        assert!(has_dict_magic(&d));
        assert_eq!(read_dict_id(&d), 0x1234_5678);
    }

    #[test]
    fn raw_content_has_no_id() {
        assert_eq!(read_dict_id(b"plain old bytes"), 0);
        assert_eq!(read_dict_id(b""), 0);
        assert!(!has_dict_magic(b"abc"));
    }

    #[test]
    fn truncated_header_has_no_id() {
        let d = header(7);
        assert_eq!(read_dict_id(&d[..6]), 0);
        assert!(has_dict_magic(&d[..6]));
    }
}
