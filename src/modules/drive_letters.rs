//! Windows drive letters as mount points.
//!
//! Drive letters are represented as paths of the form `X:\`.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use super::constants::{FIRST_DRIVE_LETTER, LAST_DRIVE_LETTER};

pub trait DriveLetterRegistry: Send + Sync {
    /// First drive letter that is not occupied.
    fn first_available(&self) -> Option<PathBuf>;

    /// Drive letters currently in use.
    fn occupied(&self) -> BTreeSet<PathBuf>;
}

/// Returns the mount point path for a drive letter, e.g. `X:\` for `'x'`.
pub fn drive_letter_path(letter: char) -> PathBuf {
    PathBuf::from(format!("{}:\\", letter.to_ascii_uppercase()))
}

/// Returns true if `path` is exactly a drive letter root like `X:\`.
pub fn is_drive_letter(path: &Path) -> bool {
    match path.to_str().map(str::as_bytes) {
        Some([letter, b':', b'\\']) => letter.is_ascii_uppercase(),
        _ => false,
    }
}

/// Drive letters `D:\` to `Z:\` of the local machine. Empty on non-Windows
/// platforms.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemDriveLetters;

impl SystemDriveLetters {
    /// All drive letters that may be handed out to vaults.
    pub fn all(&self) -> Vec<PathBuf> {
        if cfg!(windows) {
            (FIRST_DRIVE_LETTER..=LAST_DRIVE_LETTER)
                .map(drive_letter_path)
                .collect()
        } else {
            Vec::new()
        }
    }

    /// Drive letters not in use.
    pub fn available(&self) -> Vec<PathBuf> {
        let occupied = self.occupied();
        self.all()
            .into_iter()
            .filter(|letter| !occupied.contains(letter))
            .collect()
    }
}

impl DriveLetterRegistry for SystemDriveLetters {
    fn first_available(&self) -> Option<PathBuf> {
        self.available().into_iter().next()
    }

    fn occupied(&self) -> BTreeSet<PathBuf> {
        self.all()
            .into_iter()
            .filter(|letter| letter.exists())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_drive_letter() {
        assert!(is_drive_letter(Path::new("X:\\")));
        assert!(is_drive_letter(&drive_letter_path('d')));
        assert!(!is_drive_letter(Path::new("x:\\")));
        assert!(!is_drive_letter(Path::new("X:")));
        assert!(!is_drive_letter(Path::new("X:\\vault")));
        assert!(!is_drive_letter(Path::new("/mnt/X")));
        assert!(!is_drive_letter(Path::new("")));
    }

    #[test]
    fn test_available_letters_exclude_occupied() {
        let letters = SystemDriveLetters;
        let occupied = letters.occupied();
        for letter in letters.available() {
            assert!(!occupied.contains(&letter));
            assert!(is_drive_letter(&letter));
        }
        if cfg!(not(windows)) {
            assert!(letters.all().is_empty());
            assert_eq!(letters.first_available(), None);
        }
    }
}
