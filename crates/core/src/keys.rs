//! Remote key naming
//!
//! A remote key is a user nickname, optionally carrying the extension of the
//! file it was made from. Packed directories are marked with [`ARCHIVE_SUFFIX`].

use std::path::Path;

/// Suffix marking a key (or downloaded file) as a packed directory
pub const ARCHIVE_SUFFIX: &str = ".zip";

/// Extension of the final path component, including the leading dot
///
/// Everything from the last `.` of the final component counts, so `.env`
/// yields `.env` and `config.prod.env` yields `.env`. Returns an empty string
/// when the component has no dot.
pub fn extension(name: &str) -> &str {
    let file = name.rsplit(['/', '\\']).next().unwrap_or(name);
    match file.rfind('.') {
        Some(pos) => &file[pos..],
        None => "",
    }
}

/// Whether `name` carries a file-extension-like suffix
pub fn has_extension(name: &str) -> bool {
    !extension(name).is_empty()
}

/// Compute the remote key for uploading `source` under `nickname`
///
/// A nickname that already declares an extension is used verbatim. Otherwise
/// the source's extension (if any) is appended.
pub fn derive_key(nickname: &str, source: impl AsRef<Path>) -> String {
    if has_extension(nickname) {
        return nickname.to_string();
    }

    let source = source.as_ref().to_string_lossy();
    format!("{nickname}{}", extension(&source))
}

/// Compute the key an object moves to when `old_key` is renamed to `new_name`
pub fn rename_key(old_key: &str, new_name: &str) -> String {
    derive_key(new_name, old_key)
}

/// Whether a key or file name marks a packed directory
pub fn is_archive(name: &str) -> bool {
    name.ends_with(ARCHIVE_SUFFIX)
}

/// Append [`ARCHIVE_SUFFIX`] unless already present
pub fn with_archive_suffix(nickname: &str) -> String {
    if is_archive(nickname) {
        nickname.to_string()
    } else {
        format!("{nickname}{ARCHIVE_SUFFIX}")
    }
}

/// Remove [`ARCHIVE_SUFFIX`], returning `None` if the name doesn't carry it
pub fn strip_archive_suffix(name: &str) -> Option<&str> {
    name.strip_suffix(ARCHIVE_SUFFIX)
}
