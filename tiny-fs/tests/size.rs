use std::mem;

use tiny_fs::{
    DirEntry, BLOCK_SIZE, INDIRECT_REFS, MAX_BYTES, MAX_BYTES_DIRECT, MAX_DIR_ENTRIES,
};

#[test]
fn layout() {
    assert_eq!(44, mem::size_of::<DirEntry>());
    assert_eq!(44, DirEntry::SIZE);
    assert_eq!(23, MAX_DIR_ENTRIES);
    assert_eq!(256, INDIRECT_REFS);
    assert_eq!(10 * BLOCK_SIZE, MAX_BYTES_DIRECT);
    assert_eq!(272_384, MAX_BYTES);
}
