//! Release archive extraction.
//!
//! Bun release assets are ZIP files holding a single folder such as
//! `bun-linux-x64/` with the `bun` executable inside.

use std::path::{Component, Path, PathBuf};

use anyhow::{Context, Result, bail};

/// Extracts a ZIP archive to the destination directory.
///
/// Creates the destination directory if it does not exist. If all archive
/// entries share a common root folder, it is stripped during extraction
/// (`bun-linux-x64/bun` becomes `bun`).
///
/// # Errors
///
/// Returns an error if:
/// - The archive cannot be opened or is not a valid ZIP file
/// - An entry has an absolute path or a `..` component
/// - Directory or file creation fails
pub fn extract_zip(archive_path: &Path, dest_dir: &Path) -> Result<()> {
    let file = std::fs::File::open(archive_path)
        .with_context(|| format!("Failed to open archive: {}", archive_path.display()))?;

    let mut archive = zip::ZipArchive::new(file)
        .with_context(|| format!("Failed to read ZIP archive: {}", archive_path.display()))?;

    std::fs::create_dir_all(dest_dir)
        .with_context(|| format!("Failed to create directory: {}", dest_dir.display()))?;

    let strip_prefix = find_common_root_folder(&mut archive);

    for i in 0..archive.len() {
        let mut entry = archive
            .by_index(i)
            .with_context(|| format!("Failed to read archive entry {i}"))?;

        let Some(entry_path) = entry.enclosed_name() else {
            bail!("Refusing to extract unsafe path: {}", entry.name());
        };

        if entry_path.is_absolute()
            || entry_path
                .components()
                .any(|c| matches!(c, Component::ParentDir))
        {
            bail!(
                "Refusing to extract path with parent directory or absolute reference: {}",
                entry_path.display()
            );
        }

        let relative_path = match &strip_prefix {
            Some(prefix) => match entry_path.strip_prefix(prefix) {
                Ok(p) if p.as_os_str().is_empty() => continue,
                Ok(p) => p.to_path_buf(),
                Err(_) => entry_path.clone(),
            },
            None => entry_path.clone(),
        };

        let output_path = dest_dir.join(&relative_path);

        if entry.is_dir() {
            std::fs::create_dir_all(&output_path).with_context(|| {
                format!("Failed to create directory: {}", output_path.display())
            })?;
        } else {
            if let Some(parent) = output_path.parent() {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
            }

            let mut outfile = std::fs::File::create(&output_path)
                .with_context(|| format!("Failed to create file: {}", output_path.display()))?;

            std::io::copy(&mut entry, &mut outfile)
                .with_context(|| format!("Failed to extract: {}", output_path.display()))?;
        }
    }

    Ok(())
}

/// Finds a common root folder shared by all archive entries.
///
/// Returns `Some(prefix)` only if every entry starts with the same first
/// component and at least one entry is nested below it, so a lone flat file
/// is never mistaken for a folder.
fn find_common_root_folder<R: std::io::Read + std::io::Seek>(
    archive: &mut zip::ZipArchive<R>,
) -> Option<PathBuf> {
    if archive.is_empty() {
        return None;
    }

    let mut common_root: Option<PathBuf> = None;
    let mut has_nested_entries = false;

    for i in 0..archive.len() {
        let entry = archive.by_index(i).ok()?;
        let path = entry.enclosed_name()?;

        if path.components().count() > 1 {
            has_nested_entries = true;
        }

        let root = PathBuf::from(path.components().next()?.as_os_str());

        match &common_root {
            None => common_root = Some(root),
            Some(existing) if existing != &root => return None,
            Some(_) => {}
        }
    }

    if has_nested_entries { common_root } else { None }
}

/// Searches `dir` recursively for a regular file named `file_name`.
///
/// Shallower matches win; within one level, entries are visited in name
/// order.
#[must_use]
pub fn find_file(dir: &Path, file_name: &str) -> Option<PathBuf> {
    let mut level = vec![dir.to_path_buf()];

    while !level.is_empty() {
        let mut next = Vec::new();
        for current in level {
            let Ok(entries) = std::fs::read_dir(&current) else {
                continue;
            };
            let mut paths: Vec<PathBuf> =
                entries.filter_map(Result::ok).map(|e| e.path()).collect();
            paths.sort();

            for path in paths {
                if path.is_dir() {
                    next.push(path);
                } else if path.file_name().is_some_and(|n| n == file_name) {
                    return Some(path);
                }
            }
        }
        level = next;
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn temp_test_dir(name: &str) -> PathBuf {
        let dir =
            std::env::temp_dir().join(format!("bunenv_test_{}_{}", name, rand::random::<u64>()));
        std::fs::create_dir_all(&dir).expect("Should create temp dir");
        dir
    }

    fn write_zip(archive_path: &Path, files: &[(&str, &[u8])]) {
        let file = std::fs::File::create(archive_path).expect("Should create file");
        let mut zip = zip::ZipWriter::new(file);
        let options = zip::write::SimpleFileOptions::default();

        for (name, contents) in files {
            zip.start_file(*name, options).expect("Should start file");
            zip.write_all(contents).expect("Should write");
        }

        zip.finish().expect("Should finish");
    }

    #[test]
    fn release_folder_is_stripped() {
        let temp_dir = temp_test_dir("archive_release");
        let archive_path = temp_dir.join("bun-linux-x64.zip");
        let dest_dir = temp_dir.join("output");
        write_zip(&archive_path, &[("bun-linux-x64/bun", b"binary content")]);

        extract_zip(&archive_path, &dest_dir).expect("Should extract");

        assert_eq!(std::fs::read(dest_dir.join("bun")).unwrap(), b"binary content");
        assert!(!dest_dir.join("bun-linux-x64").exists());

        let _ = std::fs::remove_dir_all(&temp_dir);
    }

    #[test]
    fn mixed_roots_are_preserved() {
        let temp_dir = temp_test_dir("archive_mixed");
        let archive_path = temp_dir.join("test.zip");
        let dest_dir = temp_dir.join("output");
        write_zip(
            &archive_path,
            &[("bin/bun", b"binary"), ("docs/README.md", b"docs")],
        );

        extract_zip(&archive_path, &dest_dir).expect("Should extract");

        assert!(dest_dir.join("bin").join("bun").exists());
        assert!(dest_dir.join("docs").join("README.md").exists());

        let _ = std::fs::remove_dir_all(&temp_dir);
    }

    #[test]
    fn flat_single_file_is_not_stripped() {
        let temp_dir = temp_test_dir("archive_flat");
        let archive_path = temp_dir.join("test.zip");
        let dest_dir = temp_dir.join("output");
        write_zip(&archive_path, &[("bun", b"binary")]);

        extract_zip(&archive_path, &dest_dir).expect("Should extract");

        assert!(dest_dir.join("bun").is_file());

        let _ = std::fs::remove_dir_all(&temp_dir);
    }

    #[test]
    fn traversal_entries_are_rejected() {
        let temp_dir = temp_test_dir("archive_traversal");
        let archive_path = temp_dir.join("evil.zip");
        let dest_dir = temp_dir.join("output");
        write_zip(&archive_path, &[("../escape", b"gotcha")]);

        let result = extract_zip(&archive_path, &dest_dir);

        assert!(result.is_err());
        assert!(!temp_dir.join("escape").exists());

        let _ = std::fs::remove_dir_all(&temp_dir);
    }

    #[test]
    fn corrupt_archive_fails() {
        let temp_dir = temp_test_dir("archive_corrupt");
        let archive_path = temp_dir.join("broken.zip");
        std::fs::write(&archive_path, b"this is not a zip").unwrap();

        assert!(extract_zip(&archive_path, &temp_dir.join("output")).is_err());

        let _ = std::fs::remove_dir_all(&temp_dir);
    }

    #[test]
    fn find_file_prefers_shallowest_match() {
        let temp_dir = temp_test_dir("archive_find");
        std::fs::create_dir_all(temp_dir.join("a").join("deep")).unwrap();
        std::fs::write(temp_dir.join("a").join("deep").join("bun"), "deep").unwrap();
        std::fs::create_dir_all(temp_dir.join("b")).unwrap();
        std::fs::write(temp_dir.join("b").join("bun"), "shallow").unwrap();

        let found = find_file(&temp_dir, "bun").expect("Should find bun");

        assert_eq!(found, temp_dir.join("b").join("bun"));
        assert!(find_file(&temp_dir, "missing").is_none());

        let _ = std::fs::remove_dir_all(&temp_dir);
    }
}
