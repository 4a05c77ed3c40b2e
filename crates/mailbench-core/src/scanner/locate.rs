use crate::config::AnalysisConfig;
use crate::error::{Error, Result};
use glob::Pattern;
use std::path::{Path, PathBuf};
use tracing::{debug, error};
use walkdir::WalkDir;

/// Resolve an output location to the ordered list of result tables to analyze.
///
/// A file path is returned as-is. A directory is listed one level deep, sorted by
/// file name, and filtered to names matching `*{marker}.{ext}` for each allowed
/// extension.
pub fn locate_result_files(out_path: &Path, config: &AnalysisConfig) -> Result<Vec<PathBuf>> {
    if !out_path.exists() {
        return Err(Error::PathNotFound(out_path.to_path_buf()));
    }

    if out_path.is_file() {
        return Ok(vec![out_path.to_path_buf()]);
    }

    let patterns = result_patterns(config);

    let mut files = Vec::new();
    for entry in WalkDir::new(out_path)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
    {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) if err.depth() == 0 => return Err(Error::Io(err.into())),
            Err(err) => {
                error!("Error reading entry in {}: {}", out_path.display(), err);
                continue;
            }
        };

        // Symlinked result files count; the link name is the result name.
        if !entry.path().is_file() {
            continue;
        }

        let name = entry.file_name().to_string_lossy();
        if patterns.iter().any(|pattern| pattern.matches(&name)) {
            files.push(entry.into_path());
        }
    }

    if files.is_empty() {
        return Err(Error::NoResultFiles(out_path.to_path_buf()));
    }

    debug!("Found {} result file(s) in {}", files.len(), out_path.display());
    Ok(files)
}

fn result_patterns(config: &AnalysisConfig) -> Vec<Pattern> {
    let marker = Pattern::escape(&config.result_marker);
    config
        .result_extensions
        .iter()
        .filter_map(|ext| {
            let glob = format!("*{}.{}", marker, Pattern::escape(ext.trim_start_matches('.')));
            match Pattern::new(&glob) {
                Ok(p) => Some(p),
                Err(e) => {
                    error!("Invalid result file pattern '{}': {}", glob, e);
                    None
                }
            }
        })
        .collect()
}

/// Name of the source file a result file was produced from.
///
/// `desk_A_result.csv` becomes `desk_A.csv`. Names whose stem does not end with
/// the marker are returned unchanged.
pub fn source_name_for(file_name: &str, marker: &str) -> String {
    let (stem, extension) = match file_name.rfind('.') {
        Some(dot) if dot > 0 => (&file_name[..dot], &file_name[dot..]),
        _ => (file_name, ""),
    };

    match stem.strip_suffix(marker) {
        Some(source_stem) if !marker.is_empty() => format!("{}{}", source_stem, extension),
        _ => file_name.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_source_name_strips_marker_before_extension() {
        assert_eq!(source_name_for("desk_A_result.csv", "_result"), "desk_A.csv");
        assert_eq!(source_name_for("desk_A_result.xlsx", "_result"), "desk_A.xlsx");
        assert_eq!(source_name_for("desk_A.csv", "_result"), "desk_A.csv");
        assert_eq!(source_name_for("my_results.csv", "_result"), "my_results.csv");
        assert_eq!(source_name_for("noext_result", "_result"), "noext");
    }

    #[test]
    fn test_missing_path_is_not_found() {
        let dir = tempdir().unwrap();
        let missing = dir.path().join("nope");
        match locate_result_files(&missing, &AnalysisConfig::default()) {
            Err(Error::PathNotFound(p)) => assert_eq!(p, missing),
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn test_directory_without_matches_is_an_error() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("desk_A.csv"), "x\n").unwrap();
        fs::write(dir.path().join("notes_result.txt"), "x\n").unwrap();
        assert!(matches!(
            locate_result_files(dir.path(), &AnalysisConfig::default()),
            Err(Error::NoResultFiles(_))
        ));
    }

    #[test]
    fn test_directory_matches_are_sorted_and_filtered() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("b_result.xlsx"), "x").unwrap();
        fs::write(dir.path().join("a_result.csv"), "x\n").unwrap();
        fs::write(dir.path().join("a.csv"), "x\n").unwrap();
        fs::create_dir(dir.path().join("c_result.csv")).unwrap();

        let files = locate_result_files(dir.path(), &AnalysisConfig::default()).unwrap();
        let names: Vec<String> = files
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["a_result.csv", "b_result.xlsx"]);
    }

    #[test]
    fn test_single_file_is_used_regardless_of_name() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("predictions.csv");
        fs::write(&path, "x\n").unwrap();
        let files = locate_result_files(&path, &AnalysisConfig::default()).unwrap();
        assert_eq!(files, vec![path]);
    }

    #[cfg(unix)]
    #[test]
    fn test_symlinked_result_files_are_kept() {
        let dir = tempdir().unwrap();
        let target = dir.path().join("stored.csv");
        fs::write(&target, "x\n").unwrap();
        let out = dir.path().join("out");
        fs::create_dir(&out).unwrap();
        std::os::unix::fs::symlink(&target, out.join("desk_result.csv")).unwrap();
        std::os::unix::fs::symlink(dir.path().join("gone.csv"), out.join("dangling_result.csv"))
            .unwrap();

        let files = locate_result_files(&out, &AnalysisConfig::default()).unwrap();
        assert_eq!(files, vec![out.join("desk_result.csv")]);
    }

    #[cfg(unix)]
    #[test]
    fn test_unreadable_directory_is_an_io_error() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempdir().unwrap();
        let out = dir.path().join("locked");
        fs::create_dir(&out).unwrap();
        fs::write(out.join("desk_result.csv"), "x\n").unwrap();
        fs::set_permissions(&out, fs::Permissions::from_mode(0o000)).unwrap();

        // Privileged users can still list the directory.
        let readable = fs::read_dir(&out).is_ok();
        let result = locate_result_files(&out, &AnalysisConfig::default());
        fs::set_permissions(&out, fs::Permissions::from_mode(0o755)).unwrap();

        if readable {
            assert!(result.is_ok());
        } else {
            assert!(matches!(result, Err(Error::Io(_))), "unexpected: {:?}", result);
        }
    }
}
