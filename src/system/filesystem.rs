use std::io;

/// Abstraction for filesystem access to enable testing without real files
pub trait FilesystemReader: Send + Sync {
    fn read_to_string(&self, path: &str) -> io::Result<String>;

    /// File names (not paths) of the entries in a directory
    fn read_dir(&self, path: &str) -> io::Result<Vec<String>>;
}

/// Real filesystem reader using std::fs
pub struct RealFilesystemReader;

impl FilesystemReader for RealFilesystemReader {
    fn read_to_string(&self, path: &str) -> io::Result<String> {
        std::fs::read_to_string(path)
    }

    fn read_dir(&self, path: &str) -> io::Result<Vec<String>> {
        let mut names = Vec::new();
        for entry in std::fs::read_dir(path)? {
            names.push(entry?.file_name().to_string_lossy().into_owned());
        }
        Ok(names)
    }
}

/// In-memory filesystem holding fixture files
#[cfg(test)]
#[derive(Default)]
pub struct FakeFilesystemReader {
    files: std::collections::BTreeMap<String, String>,
}

#[cfg(test)]
impl FakeFilesystemReader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_file(mut self, path: &str, content: &str) -> Self {
        self.files.insert(path.to_string(), content.to_string());
        self
    }
}

#[cfg(test)]
impl FilesystemReader for FakeFilesystemReader {
    fn read_to_string(&self, path: &str) -> io::Result<String> {
        self.files
            .get(path)
            .cloned()
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, format!("Fake: no file {}", path)))
    }

    fn read_dir(&self, path: &str) -> io::Result<Vec<String>> {
        let prefix = format!("{}/", path.trim_end_matches('/'));
        let names: Vec<String> = self
            .files
            .keys()
            .filter_map(|file| file.strip_prefix(&prefix))
            .filter(|rest| !rest.contains('/'))
            .map(str::to_string)
            .collect();
        if names.is_empty() {
            Err(io::Error::new(io::ErrorKind::NotFound, format!("Fake: no directory {}", path)))
        } else {
            Ok(names)
        }
    }
}
