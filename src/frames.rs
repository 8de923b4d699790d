//! Extracted frame discovery.
//!
//! Frames are found by extension in a single directory and ordered by file
//! name. The order of the names is taken as the order of extraction, which
//! holds for zero-padded numbering (`frame_000009.jpg`, `frame_000010.jpg`)
//! but not for unpadded names, where `frame_10.jpg` sorts before
//! `frame_9.jpg`.

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::FlightSrtError;

/// List the files in `directory` whose extension is exactly `extension`
/// (a leading dot is ignored), sorted lexicographically by file name.
///
/// # Errors
///
/// - [`FlightSrtError::DirectoryNotFound`] if `directory` is not a directory.
/// - [`FlightSrtError::IoError`] if it cannot be listed.
pub fn list_frames<P: AsRef<Path>>(directory: P, extension: &str) -> Result<Vec<PathBuf>, FlightSrtError> {
    let directory = directory.as_ref();
    if !directory.is_dir() {
        return Err(FlightSrtError::DirectoryNotFound(directory.to_path_buf()));
    }

    let wanted = extension.trim_start_matches('.');
    let mut frames = Vec::new();
    for entry in fs::read_dir(directory)? {
        let path = entry?.path();
        let matches = path.is_file()
            && path
                .extension()
                .is_some_and(|found| found.to_string_lossy() == wanted);
        if matches {
            frames.push(path);
        }
    }

    frames.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    Ok(frames)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn touch(directory: &Path, name: &str) {
        fs::write(directory.join(name), b"").unwrap();
    }

    #[test]
    fn filters_and_sorts_by_name() {
        let directory = tempfile::tempdir().unwrap();
        for name in ["frame_0002.jpg", "frame_0001.jpg", "frame_0003.png", "notes.txt", "frame_0010.jpg"] {
            touch(directory.path(), name);
        }
        fs::create_dir(directory.path().join("nested.jpg")).unwrap();

        let frames = list_frames(directory.path(), ".jpg").unwrap();
        let names: Vec<_> = frames
            .iter()
            .map(|path| path.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["frame_0001.jpg", "frame_0002.jpg", "frame_0010.jpg"]);
    }

    #[test]
    fn unpadded_names_sort_lexicographically() {
        let directory = tempfile::tempdir().unwrap();
        for name in ["f_9.jpg", "f_10.jpg"] {
            touch(directory.path(), name);
        }
        let frames = list_frames(directory.path(), "jpg").unwrap();
        assert!(frames[0].ends_with("f_10.jpg"));
    }

    #[test]
    fn extension_match_is_case_sensitive() {
        let directory = tempfile::tempdir().unwrap();
        touch(directory.path(), "a.JPG");
        assert!(list_frames(directory.path(), "jpg").unwrap().is_empty());
    }

    #[test]
    fn missing_directory_is_an_error() {
        assert!(matches!(
            list_frames("/nonexistent/frames-for-tests", "jpg"),
            Err(FlightSrtError::DirectoryNotFound(_))
        ));
    }
}
