//! Directory archiving
//!
//! Packs a directory tree into a single zip bundle for upload, and unpacks a
//! downloaded bundle back into a directory without letting any entry escape
//! the destination.

use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Component, Path, PathBuf};

use tempfile::TempDir;
use walkdir::WalkDir;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

use crate::error::{Error, Result};

/// File name of the bundle inside its scratch directory
const SCRATCH_BUNDLE_NAME: &str = "bundle.zip";

/// Prefix for scratch directories created by [`pack_to_scratch`]
const SCRATCH_PREFIX: &str = "denv";

/// A packed bundle living in its own temporary directory
///
/// Dropping it removes both the bundle and the directory.
#[derive(Debug)]
pub struct ScratchBundle {
    dir: TempDir,
    path: PathBuf,
}

impl ScratchBundle {
    /// Path to the bundle file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Directory holding the bundle
    pub fn dir(&self) -> &Path {
        self.dir.path()
    }
}

/// Pack `source_dir` into a bundle in a fresh scratch directory
pub fn pack_to_scratch(source_dir: &Path) -> Result<ScratchBundle> {
    let dir = tempfile::Builder::new().prefix(SCRATCH_PREFIX).tempdir()?;
    let path = dir.path().join(SCRATCH_BUNDLE_NAME);

    // On failure `dir` drops here and takes the half-written bundle with it
    pack(source_dir, &path)?;

    Ok(ScratchBundle { dir, path })
}

/// Pack the tree under `source_dir` into a zip bundle at `bundle_path`
///
/// Entries are named relative to `source_dir` with `/` separators; the root
/// itself is not recorded. Directories get a trailing `/`. Symlinks are
/// followed, so a linked file is stored with its target's content and mode.
/// Any entry that cannot be read aborts the pack.
pub fn pack(source_dir: &Path, bundle_path: &Path) -> Result<()> {
    if !source_dir.is_dir() {
        return Err(Error::InvalidInput(format!(
            "{} is not a directory",
            source_dir.display()
        )));
    }

    let file = File::create(bundle_path)?;
    let mut writer = ZipWriter::new(file);

    let mut entries = 0usize;
    for entry in WalkDir::new(source_dir).min_depth(1).follow_links(true) {
        let entry = entry?;
        let relative = entry
            .path()
            .strip_prefix(source_dir)
            .map_err(|e| Error::Archive(e.to_string()))?;
        let name = entry_name(relative);
        let options = entry_options(permissions(&entry.metadata()?));

        if entry.file_type().is_dir() {
            writer.add_directory(format!("{name}/"), options)?;
        } else {
            let mut source = File::open(entry.path())?;
            writer.start_file(name, options)?;
            io::copy(&mut source, &mut writer)?;
        }
        entries += 1;
    }

    writer.finish()?;
    tracing::debug!(
        source = %source_dir.display(),
        bundle = %bundle_path.display(),
        entries,
        "packed directory"
    );

    Ok(())
}

/// Unpack the bundle at `bundle_path` into `dest_dir`
///
/// `dest_dir` and any missing parents are created. Every entry name is checked
/// before anything is extracted; one that would resolve outside `dest_dir`
/// fails the whole unpack with [`Error::PathTraversal`]. Existing files are
/// truncated and overwritten. The first entry that fails to extract aborts
/// the unpack.
pub fn unpack(bundle_path: &Path, dest_dir: &Path) -> Result<()> {
    if dest_dir.as_os_str().is_empty() {
        return Err(Error::InvalidInput(
            "unpack destination must name a directory".into(),
        ));
    }

    let mut archive = ZipArchive::new(File::open(bundle_path)?)?;

    let mut targets = Vec::with_capacity(archive.len());
    for index in 0..archive.len() {
        let entry = archive.by_index(index)?;
        let target = resolve_entry(dest_dir, entry.name())?;
        targets.push((target, entry.is_dir()));
    }

    fs::create_dir_all(dest_dir)?;

    for (index, (target, is_dir)) in targets.into_iter().enumerate() {
        if is_dir {
            fs::create_dir_all(&target)?;
            continue;
        }

        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent)?;
        }

        let mut entry = archive.by_index(index)?;
        let mode = entry.unix_mode().map(|m| m & 0o777).filter(|m| *m != 0);

        let mut out = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(&target)?;
        io::copy(&mut entry, &mut out)?;
        out.flush()?;

        // `OpenOptions::mode` only applies to new files
        if let Some(mode) = mode {
            set_mode(&target, mode)?;
        }
    }

    tracing::debug!(
        bundle = %bundle_path.display(),
        dest = %dest_dir.display(),
        "unpacked bundle"
    );

    Ok(())
}

/// Resolve a bundle entry name to a path strictly inside `dest_dir`
///
/// Works lexically: absolute names, drive prefixes and `..` segments that climb
/// above the destination are rejected, as is a name that resolves to the
/// destination itself.
pub fn resolve_entry(dest_dir: &Path, name: &str) -> Result<PathBuf> {
    let normalized = name.replace('\\', "/");
    let mut parts: Vec<&str> = Vec::new();

    for component in Path::new(&normalized).components() {
        match component {
            Component::Normal(part) => match part.to_str() {
                Some(part) => parts.push(part),
                None => return Err(Error::PathTraversal(name.to_string())),
            },
            Component::CurDir => {}
            Component::ParentDir => {
                if parts.pop().is_none() {
                    return Err(Error::PathTraversal(name.to_string()));
                }
            }
            Component::RootDir | Component::Prefix(_) => {
                return Err(Error::PathTraversal(name.to_string()));
            }
        }
    }

    if parts.is_empty() {
        return Err(Error::PathTraversal(name.to_string()));
    }

    Ok(parts.iter().fold(dest_dir.to_path_buf(), |acc, part| acc.join(part)))
}

fn entry_options(mode: Option<u32>) -> SimpleFileOptions {
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
    match mode {
        Some(mode) => options.unix_permissions(mode),
        None => options,
    }
}

/// Bundle entry name for a path relative to the packed root
fn entry_name(relative: &Path) -> String {
    relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

#[cfg(unix)]
fn permissions(metadata: &fs::Metadata) -> Option<u32> {
    use std::os::unix::fs::PermissionsExt;
    Some(metadata.permissions().mode() & 0o777)
}

#[cfg(not(unix))]
fn permissions(_metadata: &fs::Metadata) -> Option<u32> {
    None
}

#[cfg(unix)]
fn set_mode(path: &Path, mode: u32) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(path, fs::Permissions::from_mode(mode))?;
    Ok(())
}

#[cfg(not(unix))]
fn set_mode(_path: &Path, _mode: u32) -> Result<()> {
    Ok(())
}
