//! Destinations for converted readings.

use crate::types::PhysicalReading;

/// Receives each reading the monitor produces
pub trait ReadingSink {
    /// Error returned when the reading could not be stored
    type Error;

    /// Publish a reading, replacing the previous one
    fn emit(&mut self, reading: &PhysicalReading) -> Result<(), Self::Error>;
}

#[cfg(feature = "std")]
pub use file::FileSink;

#[cfg(feature = "std")]
mod file {
    use std::fs::{self, File};
    use std::io::{self, Write};
    use std::path::{Path, PathBuf};

    use super::ReadingSink;
    use crate::types::PhysicalReading;

    /// Rewrites a text file with the three-line report of each reading.
    ///
    /// The report is written to a sibling `.tmp` file, flushed, and renamed over the target, so
    /// readers see either the previous report or the new one, never a partial file.
    #[derive(Debug)]
    pub struct FileSink {
        path: PathBuf,
        staging: PathBuf,
    }

    impl FileSink {
        /// Sink writing to `path`
        pub fn new(path: impl Into<PathBuf>) -> Self {
            let path = path.into();
            let mut staging = path.clone().into_os_string();
            staging.push(".tmp");
            Self { path, staging: staging.into() }
        }

        /// Target file
        pub fn path(&self) -> &Path {
            &self.path
        }

        fn write_staging(&self, reading: &PhysicalReading) -> io::Result<()> {
            let mut file = File::create(&self.staging)?;
            write!(file, "{}", reading)?;
            file.sync_all()
        }
    }

    impl ReadingSink for FileSink {
        type Error = io::Error;

        fn emit(&mut self, reading: &PhysicalReading) -> Result<(), Self::Error> {
            let result = self
                .write_staging(reading)
                .and_then(|()| fs::rename(&self.staging, &self.path));
            if result.is_err() {
                let _ = fs::remove_file(&self.staging);
            }
            result
        }
    }

    #[cfg(test)]
    mod tests {
        use std::process;
        use std::string::String;

        use super::*;

        fn scratch(name: &str) -> PathBuf {
            let dir = std::env::temp_dir().join(std::format!("hts221-sink-{}-{}", process::id(), name));
            fs::create_dir_all(&dir).unwrap();
            dir
        }

        #[test]
        fn writes_three_lines_and_replaces() {
            let dir = scratch("replace");
            let path = dir.join("ambient_data");
            let mut sink = FileSink::new(&path);

            sink.emit(&PhysicalReading { humidity_pct: 104.3, temp_c: 25.0, temp_f: 77.0 }).unwrap();
            sink.emit(&PhysicalReading { humidity_pct: 45.678, temp_c: -4.5, temp_f: 23.9 }).unwrap();

            let content = fs::read_to_string(&path).unwrap();
            assert_eq!(
                content,
                "Relative Humidity : 45.68 %\nTemperature in C: -4.50 C\nTemperature in F: 23.90 F\n"
            );
            assert!(!dir.join("ambient_data.tmp").exists());
            fs::remove_dir_all(&dir).unwrap();
        }

        #[test]
        fn failed_write_keeps_previous_report() {
            let dir = scratch("missing");
            let path = dir.join("ambient_data");
            let mut sink = FileSink::new(&path);
            sink.emit(&PhysicalReading { humidity_pct: 50.0, temp_c: 20.0, temp_f: 68.0 }).unwrap();
            let before: String = fs::read_to_string(&path).unwrap();

            // a directory where the staging file should go makes File::create fail
            fs::create_dir(dir.join("ambient_data.tmp")).unwrap();
            assert!(sink.emit(&PhysicalReading { humidity_pct: 60.0, temp_c: 21.0, temp_f: 69.8 }).is_err());
            assert_eq!(fs::read_to_string(&path).unwrap(), before);
            fs::remove_dir_all(&dir).unwrap();
        }

        #[test]
        fn failed_rename_removes_staging_file() {
            let dir = scratch("rename");
            let path = dir.join("ambient_data");
            // a file cannot be renamed over a non-empty directory
            fs::create_dir(&path).unwrap();
            fs::write(path.join("keep"), "x").unwrap();
            let mut sink = FileSink::new(&path);

            assert!(sink.emit(&PhysicalReading { humidity_pct: 50.0, temp_c: 20.0, temp_f: 68.0 }).is_err());
            assert!(!dir.join("ambient_data.tmp").exists());
            assert!(path.join("keep").exists());
            fs::remove_dir_all(&dir).unwrap();
        }
    }
}
