use std::io::ErrorKind;
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnvFile {
    Loaded,
    Missing,
}

/// Loads `path` into the process environment. Variables already set are kept.
pub fn load(path: &Path) -> Result<EnvFile, dotenv::Error> {
    match dotenv::from_path(path) {
        Ok(()) => Ok(EnvFile::Loaded),
        Err(dotenv::Error::Io(error)) if error.kind() == ErrorKind::NotFound => {
            Ok(EnvFile::Missing)
        }
        Err(error) => Err(error),
    }
}
