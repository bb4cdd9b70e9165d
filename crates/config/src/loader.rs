//! Parse and load configuration and firmware images from RON.

use std::{ffi::OsStr, fs, path::Path};

use ron::{Options, extensions::Extensions};
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::{
    Config, Error, FirmwareImage, error::excerpt_at, firmware::RawFirmware, scheme::RawConfig,
};

/// Load a validated `Config` from a `.ron` file at `path`.
pub fn load_from_path(path: &Path) -> Result<Config, Error> {
    let source = read_ron(path)?;
    load_from_str(&source, Some(path))
}

/// Parse and validate a `Config` from RON text. `path` is only used in error reports.
pub fn load_from_str(source: &str, path: Option<&Path>) -> Result<Config, Error> {
    let raw: RawConfig = parse(source, path)?;
    let cfg = raw.validate().map_err(|e| attach(e, path))?;
    debug!(
        schemes = cfg.schemes.len(),
        actions = cfg.actions.len(),
        "config loaded"
    );
    Ok(cfg)
}

/// Load a firmware image from a `.ron` file at `path`.
pub fn load_firmware_from_path(path: &Path) -> Result<FirmwareImage, Error> {
    let source = read_ron(path)?;
    load_firmware_from_str(&source, Some(path))
}

/// Parse and validate a firmware image from RON text.
pub fn load_firmware_from_str(source: &str, path: Option<&Path>) -> Result<FirmwareImage, Error> {
    let raw: RawFirmware = parse(source, path)?;
    raw.validate().map_err(|e| attach(e, path))
}

fn read_ron(path: &Path) -> Result<String, Error> {
    if path.extension() != Some(OsStr::new("ron")) {
        return Err(Error::Read {
            path: Some(path.to_path_buf()),
            message: "Unsupported config format (expected a .ron file)".to_string(),
        });
    }
    fs::read_to_string(path).map_err(|e| Error::Read {
        path: Some(path.to_path_buf()),
        message: e.to_string(),
    })
}

fn attach(err: Error, path: Option<&Path>) -> Error {
    match path {
        Some(p) => err.with_path(p),
        None => err,
    }
}

/// RON options shared by every loader. Optional fields take bare values.
pub(crate) fn ron_options() -> Options {
    Options::default().with_default_extension(Extensions::IMPLICIT_SOME)
}

/// Deserialize `source`, converting RON errors into located parse errors.
fn parse<T: DeserializeOwned>(source: &str, path: Option<&Path>) -> Result<T, Error> {
    ron_options().from_str(source).map_err(|e| {
        let line = e.span.start.line.max(1);
        let col = e.span.start.col.max(1);
        Error::Parse {
            path: path.map(Path::to_path_buf),
            line,
            col,
            message: e.code.to_string(),
            excerpt: excerpt_at(source, line, col),
        }
    })
}
