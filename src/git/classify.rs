use crate::models::EntryKind;

const MODE_TYPE_MASK: i32 = 0o170000;
const MODE_TREE: i32 = 0o040000;
const MODE_BLOB: i32 = 0o100000;
const MODE_LINK: i32 = 0o120000;
const MODE_GITLINK: i32 = 0o160000;

/// Map a tree entry's filemode to its entry kind.
///
/// Regular, executable and group-writable blobs are all files. Unknown modes
/// yield `None` and are left out of listings.
pub fn classify(filemode: i32) -> Option<EntryKind> {
    match filemode & MODE_TYPE_MASK {
        MODE_TREE => Some(EntryKind::Directory),
        MODE_BLOB => Some(EntryKind::File),
        MODE_LINK => Some(EntryKind::Symlink),
        MODE_GITLINK => Some(EntryKind::Submodule),
        _ => None,
    }
}
