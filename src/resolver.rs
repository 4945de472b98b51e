use std::io;
use std::path::Path;

/// Outcome of resolving a declared path against the content root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    Found,
    /// Parent directory was listed but holds no entry with this exact name.
    Missing,
    DirectoryNotFound,
    Unreadable(String),
}

impl Resolution {
    pub fn is_found(&self) -> bool {
        matches!(self, Self::Found)
    }

    pub fn describe(&self) -> String {
        match self {
            Self::Found => "found".to_owned(),
            Self::Missing => "no file with this exact name".to_owned(),
            Self::DirectoryNotFound => "parent directory does not exist".to_owned(),
            Self::Unreadable(reason) => format!("parent directory unreadable: {reason}"),
        }
    }
}

/// Resolves `relative` under `root` by listing the parent directory and
/// comparing the final segment byte-for-byte, so a file that differs only in
/// case is reported as `Missing` even on case-insensitive filesystems.
pub fn resolve(root: &Path, relative: &str) -> Resolution {
    if relative.is_empty() {
        return Resolution::Missing;
    }

    let full = root.join(relative);
    let Some(name) = full.file_name() else {
        return Resolution::Missing;
    };
    let Some(parent) = full.parent() else {
        return Resolution::Missing;
    };

    let entries = match std::fs::read_dir(parent) {
        Ok(entries) => entries,
        Err(err) if err.kind() == io::ErrorKind::NotFound => {
            return Resolution::DirectoryNotFound;
        }
        Err(err) => return Resolution::Unreadable(err.to_string()),
    };

    for entry in entries {
        match entry {
            Ok(entry) if entry.file_name() == name => return Resolution::Found,
            Ok(_) => {}
            Err(err) => return Resolution::Unreadable(err.to_string()),
        }
    }

    Resolution::Missing
}
