//! JSON files in the per-user data directory (`<data_local_dir>/gurukul-admin/`).

use std::{
    fs,
    path::{
        Path,
        PathBuf,
    },
};

use serde::{
    de::DeserializeOwned,
    Serialize,
};
use tracing::{
    debug,
    warn,
};

const APP_NAME: &str = "gurukul-admin";

/// The app's data directory, created on demand. Falls back to the working directory
/// when the platform has no local data directory.
pub fn app_data_dir() -> PathBuf {
    let Some(base) = dirs::data_local_dir() else {
        warn!("no local data directory on this platform, using the working directory");
        return PathBuf::from(".");
    };

    let dir = base.join(APP_NAME);
    if let Err(e) = fs::create_dir_all(&dir) {
        warn!(path = %dir.display(), error = %e, "could not create data directory");
    }
    dir
}

fn data_file(filename: &str) -> PathBuf {
    app_data_dir().join(filename)
}

pub fn save_json<T: Serialize>(data: &T, filename: &str) -> Result<(), Box<dyn std::error::Error>> {
    write_json(&data_file(filename), data)
}

pub fn load_json<T: DeserializeOwned + Default>(
    filename: &str,
) -> Result<T, Box<dyn std::error::Error>> {
    read_json(&data_file(filename))
}

/// Missing or unreadable files yield `T::default()`; the cause is logged.
pub fn load_json_or_default<T: DeserializeOwned + Default>(filename: &str) -> T {
    load_json(filename).unwrap_or_else(|e| {
        warn!("Failed to load {}: {}. Using defaults.", filename, e);
        T::default()
    })
}

fn write_json<T: Serialize>(path: &Path, data: &T) -> Result<(), Box<dyn std::error::Error>> {
    let json = serde_json::to_string_pretty(data)?;
    fs::write(path, json)?;
    debug!(path = %path.display(), "saved");
    Ok(())
}

fn read_json<T: DeserializeOwned + Default>(path: &Path) -> Result<T, Box<dyn std::error::Error>> {
    if !path.exists() {
        return Ok(T::default());
    }
    let data = serde_json::from_str(&fs::read_to_string(path)?)?;
    debug!(path = %path.display(), "loaded");
    Ok(data)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde::Deserialize;

    use super::*;

    #[derive(Debug, Default, PartialEq, Serialize, Deserialize)]
    struct Sample {
        name: String,
        count: u32,
    }

    fn scratch(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("gurukul-admin-{}-{}", std::process::id(), name))
    }

    #[test]
    fn missing_file_reads_as_default() {
        let loaded: Sample = read_json(&scratch("missing.json")).unwrap();
        assert_eq!(loaded, Sample::default());
    }

    #[test]
    fn written_file_reads_back() {
        let path = scratch("sample.json");
        let sample = Sample { name: "North".into(), count: 3 };

        write_json(&path, &sample).unwrap();
        let loaded: Sample = read_json(&path).unwrap();
        let _ = fs::remove_file(&path);

        assert_eq!(loaded, sample);
    }

    #[test]
    fn corrupt_file_is_an_error() {
        let path = scratch("corrupt.json");
        fs::write(&path, "{ not json").unwrap();

        let loaded = read_json::<Sample>(&path);
        let _ = fs::remove_file(&path);

        assert!(loaded.is_err());
    }

    #[test]
    fn unwritable_path_is_an_error() {
        let path = scratch("no-such-dir").join("nested").join("sample.json");
        assert!(write_json(&path, &Sample::default()).is_err());
    }
}
