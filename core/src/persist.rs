use crate::error::{IndexError, Result};
use crate::index::{Index, FORMAT_VERSION};
use std::ffi::OsString;
use std::fs::{self, File};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

/// Serialize `index` as JSON to `path`, replacing any existing file.
///
/// The bytes go to a sibling temporary file first and are renamed into place,
/// so readers never observe a half-written artifact. Returns the byte count.
pub fn save_index<P: AsRef<Path>>(path: P, index: &Index, pretty: bool) -> Result<u64> {
    let path = path.as_ref();
    if path.as_os_str().is_empty() {
        return Err(IndexError::MissingOutputPath);
    }
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| IndexError::io(parent, e))?;
    }

    let bytes = if pretty { serde_json::to_vec_pretty(index)? } else { serde_json::to_vec(index)? };
    let tmp = temp_path(path);
    let written = File::create(&tmp)
        .and_then(|mut f| {
            f.write_all(&bytes)?;
            f.sync_all()
        })
        .and_then(|_| fs::rename(&tmp, path));
    if let Err(e) = written {
        let _ = fs::remove_file(&tmp);
        return Err(IndexError::io(path, e));
    }
    tracing::info!(path = %path.display(), bytes = bytes.len(), "index written");
    Ok(bytes.len() as u64)
}

/// Read an artifact back, refusing layouts this build does not understand.
pub fn load_index<P: AsRef<Path>>(path: P) -> Result<Index> {
    let path = path.as_ref();
    let mut f = File::open(path).map_err(|e| IndexError::io(path, e))?;
    let mut buf = String::new();
    f.read_to_string(&mut buf).map_err(|e| IndexError::io(path, e))?;
    let json: serde_json::Value = serde_json::from_str(&buf)?;
    let version = json.get("version").and_then(|v| v.as_u64()).unwrap_or(0) as u32;
    if version != FORMAT_VERSION {
        return Err(IndexError::UnsupportedVersion { expected: FORMAT_VERSION, actual: version });
    }
    Ok(serde_json::from_value(json)?)
}

fn temp_path(path: &Path) -> PathBuf {
    let mut name = OsString::from(".");
    name.push(path.file_name().unwrap_or_default());
    name.push(".tmp");
    path.with_file_name(name)
}
