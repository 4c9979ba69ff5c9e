//! Plain-text training log.

use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::core::errors::SrError;

/// File name of the log inside the experiment directory.
pub const LOG_FILE_NAME: &str = "training_log.txt";

/// Append-only log written to `<experiment_dir>/<name>/training_log.txt`.
///
/// Every [`TrainingLog::write`] opens the file, appends one line and closes it
/// again, so lines already written survive an abrupt termination. The log
/// assumes a single writer.
#[derive(Debug, Clone)]
pub struct TrainingLog {
    path: PathBuf,
}

impl TrainingLog {
    /// Creates (or truncates) the log file, creating its directory if needed.
    pub fn create(experiment_dir: impl AsRef<Path>, name: &str) -> Result<Self, SrError> {
        let dir = experiment_dir.as_ref().join(name);
        fs::create_dir_all(&dir)?;
        let path = dir.join(LOG_FILE_NAME);
        File::create(&path)?;
        debug!(path = %path.display(), "created training log");
        Ok(Self { path })
    }

    /// Path of the log file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Prints `line` to stdout and appends it to the log file.
    pub fn write(&self, line: &str) -> Result<(), SrError> {
        println!("{line}");
        append_line(&self.path, line)
    }
}

/// Appends `line` and a newline to the file at `path`.
///
/// The handle is dropped before returning on every path.
pub fn append_line(path: &Path, line: &str) -> Result<(), SrError> {
    let mut file = OpenOptions::new().append(true).create(true).open(path)?;
    writeln!(file, "{line}")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_composes_path_and_truncates() {
        let dir = tempfile::tempdir().unwrap();
        let log = TrainingLog::create(dir.path(), "edsr_x4").unwrap();
        assert_eq!(log.path(), dir.path().join("edsr_x4").join(LOG_FILE_NAME));

        log.write("stale").unwrap();
        let log = TrainingLog::create(dir.path(), "edsr_x4").unwrap();
        assert_eq!(fs::read_to_string(log.path()).unwrap(), "");
    }

    #[test]
    fn test_write_appends_lines_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let log = TrainingLog::create(dir.path(), "run").unwrap();
        log.write("[Epoch 1] loss 0.5").unwrap();
        log.write("[Epoch 2] loss 0.4").unwrap();
        assert_eq!(
            fs::read_to_string(log.path()).unwrap(),
            "[Epoch 1] loss 0.5\n[Epoch 2] loss 0.4\n"
        );
    }

    #[test]
    fn test_write_fails_when_directory_removed() {
        let dir = tempfile::tempdir().unwrap();
        let log = TrainingLog::create(dir.path(), "gone").unwrap();
        fs::remove_dir_all(dir.path().join("gone")).unwrap();
        assert!(matches!(log.write("lost"), Err(SrError::Io(_))));
    }
}
