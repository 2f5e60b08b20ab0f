//! Output archive packaging.
//!
//! After a batch run, the whole output tree (per-category directories of
//! generated certificates) is packed into a single ZIP for download or
//! hand-off. Entry names are relative to the output root with forward
//! slashes, so the archive unpacks to the same layout everywhere.

use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

use delibex_core::{DelibexError, Result};
use log::debug;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

fn collect_files(dir: &Path, files: &mut Vec<PathBuf>) -> Result<()> {
    let mut entries: Vec<_> =
        std::fs::read_dir(dir)?.collect::<std::result::Result<Vec<_>, _>>()?;
    // Deterministic archive layout regardless of directory iteration order.
    entries.sort_by_key(std::fs::DirEntry::path);

    for entry in entries {
        let path = entry.path();
        if path.is_dir() {
            collect_files(&path, files)?;
        } else {
            files.push(path);
        }
    }
    Ok(())
}

/// Pack every file under `root` into a ZIP archive at `archive_path`.
///
/// The archive itself may live inside `root`; it is skipped while packing.
/// Returns the number of files packed.
///
/// # Errors
/// Returns an archive error if the ZIP cannot be written.
pub fn pack_directory(root: &Path, archive_path: &Path) -> Result<usize> {
    let mut files = Vec::new();
    collect_files(root, &mut files)?;

    let file = File::create(archive_path)?;
    let mut zip = ZipWriter::new(file);
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    let mut packed = 0usize;
    for path in files {
        if path == archive_path {
            continue;
        }
        let name = path
            .strip_prefix(root)
            .map_err(|e| DelibexError::Archive(format!("{}: {e}", path.display())))?
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/");

        zip.start_file(name.as_str(), options)
            .map_err(|e| DelibexError::Archive(format!("cannot add {name}: {e}")))?;
        zip.write_all(&std::fs::read(&path)?)?;
        packed += 1;
    }

    zip.finish()
        .map_err(|e| DelibexError::Archive(format!("cannot finish {}: {e}", archive_path.display())))?;

    debug!("packed {packed} files into {}", archive_path.display());
    Ok(packed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Read;
    use zip::ZipArchive;

    #[test]
    fn test_pack_directory_recursive() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        std::fs::create_dir_all(root.join("Individuelles")).unwrap();
        std::fs::create_dir_all(root.join("Collectives")).unwrap();
        std::fs::write(root.join("Individuelles/Extrait_PI_42.docx"), b"indiv").unwrap();
        std::fs::write(root.join("Collectives/Extrait_PC_7.docx"), b"coll").unwrap();

        let archive_path = root.join("Resultats_Extraits.zip");
        let packed = pack_directory(root, &archive_path).unwrap();
        assert_eq!(packed, 2);

        let mut archive = ZipArchive::new(File::open(&archive_path).unwrap()).unwrap();
        let mut names: Vec<String> = (0..archive.len())
            .map(|i| archive.by_index(i).unwrap().name().to_string())
            .collect();
        names.sort();
        assert_eq!(
            names,
            ["Collectives/Extrait_PC_7.docx", "Individuelles/Extrait_PI_42.docx"]
        );

        let mut contents = String::new();
        archive
            .by_name("Individuelles/Extrait_PI_42.docx")
            .unwrap()
            .read_to_string(&mut contents)
            .unwrap();
        assert_eq!(contents, "indiv");
    }

    #[test]
    fn test_archive_inside_root_not_self_packed() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        std::fs::write(root.join("a.docx"), b"a").unwrap();

        let archive_path = root.join("out.zip");
        // Pre-existing archive from a previous run must not be packed either.
        std::fs::write(&archive_path, b"stale").unwrap();

        let packed = pack_directory(root, &archive_path).unwrap();
        assert_eq!(packed, 1);
    }
}
