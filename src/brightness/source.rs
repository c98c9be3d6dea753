use std::{
    fs::{self, OpenOptions},
    io::Write,
    path::{Path, PathBuf},
};

use tracing::{debug, instrument};

use crate::{config::DeviceConfig, error::BacklightError};

use super::Reading;

pub trait BacklightSource {
    // Read from the device (every call goes back to the device)
    /// # Errors
    /// Returns an error if the current brightness can't be read or parsed
    fn read_current(&self) -> Result<Reading, BacklightError>;
    /// # Errors
    /// Returns an error if the maximum brightness can't be read or parsed
    fn read_max(&self) -> Result<Reading, BacklightError>;

    // Change the value of the device
    /// # Errors
    /// Returns an error if the current-value file can't be opened or written
    fn write_current(&self, value: i64) -> Result<(), BacklightError>;
}

// ---------------- Sysfs Source ----------------

#[derive(Debug, Clone)]
pub struct SysfsBacklight {
    brightness: PathBuf,
    max_brightness: PathBuf,
}

impl SysfsBacklight {
    pub fn new<P: Into<PathBuf>, Q: Into<PathBuf>>(brightness: P, max_brightness: Q) -> Self {
        Self {
            brightness: brightness.into(),
            max_brightness: max_brightness.into(),
        }
    }

    #[must_use]
    pub fn from_config(device: &DeviceConfig) -> Self {
        Self::new(&device.brightness, &device.max_brightness)
    }
}

impl BacklightSource for SysfsBacklight {
    #[instrument]
    fn read_current(&self) -> Result<Reading, BacklightError> {
        read_sysfs_value(&self.brightness)
    }

    #[instrument]
    fn read_max(&self) -> Result<Reading, BacklightError> {
        read_sysfs_value(&self.max_brightness)
    }

    #[instrument]
    fn write_current(&self, value: i64) -> Result<(), BacklightError> {
        write_sysfs_value(&self.brightness, value)
    }
}

fn read_sysfs_value(path: &Path) -> Result<Reading, BacklightError> {
    let contents = fs::read_to_string(path).map_err(|source| BacklightError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    let reading = Reading::parse(path, &contents)?;
    debug!("Read {} from {}", reading.value, path.display());

    Ok(reading)
}

fn write_sysfs_value(path: &Path, value: i64) -> Result<(), BacklightError> {
    // The device file must already exist, never create it
    let mut file = OpenOptions::new()
        .write(true)
        .truncate(true)
        .open(path)
        .map_err(|source| BacklightError::Open {
            path: path.to_path_buf(),
            source,
        })?;

    // Handle is closed when `file` drops, on success or failure
    file.write_all(format!("{value}\n").as_bytes())
        .map_err(|source| BacklightError::Write {
            path: path.to_path_buf(),
            source,
        })?;

    debug!("Wrote {value} to {}", path.display());

    Ok(())
}

#[cfg(test)]
pub mod tests {
    use std::{cell::RefCell, fs, path::PathBuf};

    use uuid::Uuid;

    use super::*;

    /// A scratch pair of device files under the temp directory
    pub struct ScratchDevice {
        pub dir: PathBuf,
        pub source: SysfsBacklight,
    }

    impl ScratchDevice {
        pub fn new(current: &str, max: &str) -> Self {
            let dir = std::env::temp_dir().join(format!("mbbacklight-{}", Uuid::new_v4()));
            fs::create_dir_all(&dir).unwrap();

            let brightness = dir.join("brightness");
            let max_brightness = dir.join("max_brightness");
            fs::write(&brightness, current).unwrap();
            fs::write(&max_brightness, max).unwrap();

            Self {
                source: SysfsBacklight::new(brightness, max_brightness),
                dir,
            }
        }

        pub fn contents(&self) -> String {
            fs::read_to_string(self.dir.join("brightness")).unwrap()
        }
    }

    impl Drop for ScratchDevice {
        fn drop(&mut self) {
            let _ = fs::remove_dir_all(&self.dir);
        }
    }

    /// In-memory device which records every write
    #[derive(Debug)]
    pub struct RecordingSource {
        pub current: Reading,
        pub max: Reading,
        pub writes: RefCell<Vec<i64>>,
    }

    impl RecordingSource {
        pub fn new(current: i64, max: i64) -> Self {
            Self {
                current: Reading {
                    path: PathBuf::from("brightness"),
                    raw: current.to_string(),
                    value: current,
                },
                max: Reading {
                    path: PathBuf::from("max_brightness"),
                    raw: max.to_string(),
                    value: max,
                },
                writes: RefCell::new(Vec::new()),
            }
        }
    }

    impl BacklightSource for RecordingSource {
        fn read_current(&self) -> Result<Reading, BacklightError> {
            Ok(self.current.clone())
        }

        fn read_max(&self) -> Result<Reading, BacklightError> {
            Ok(self.max.clone())
        }

        fn write_current(&self, value: i64) -> Result<(), BacklightError> {
            self.writes.borrow_mut().push(value);
            Ok(())
        }
    }

    #[test]
    fn reads_trimmed_values() {
        let device = ScratchDevice::new("  37\n", "255\n");

        let current = device.source.read_current().unwrap();
        let max = device.source.read_max().unwrap();

        assert_eq!(current.raw, "37");
        assert_eq!(current.value, 37);
        assert_eq!(max.value, 255);
    }

    #[test]
    fn write_truncates_and_appends_newline() {
        let device = ScratchDevice::new("1000\n", "2000\n");

        device.source.write_current(5).unwrap();

        assert_eq!(device.contents(), "5\n");
    }

    #[test]
    fn missing_file_is_read_error() {
        let device = ScratchDevice::new("10\n", "100\n");
        let source = SysfsBacklight::new(device.dir.join("nope"), device.dir.join("max_brightness"));

        assert!(matches!(source.read_current(), Err(BacklightError::Read { .. })));
    }

    #[test]
    fn write_never_creates_the_file() {
        let device = ScratchDevice::new("10\n", "100\n");
        let missing = device.dir.join("nope");
        let source = SysfsBacklight::new(&missing, device.dir.join("max_brightness"));

        assert!(matches!(source.write_current(3), Err(BacklightError::Open { .. })));
        assert!(!missing.exists());
    }
}
