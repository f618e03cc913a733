//! Module implement common utility functions.

use std::{ffi, fs, path};

use crate::Result;

// open file for reading.
pub fn open_file_r(file: &ffi::OsStr) -> Result<fs::File> {
    let os_file = path::Path::new(file);
    Ok(err_at!(
        IOError,
        fs::OpenOptions::new().read(true).open(os_file)
    )?)
}

// create a file, truncating any existing content, for writing.
pub fn create_file_w(file: &ffi::OsStr) -> Result<fs::File> {
    let os_file = path::Path::new(file);

    if let Some(parent) = os_file.parent() {
        err_at!(IOError, fs::create_dir_all(parent))?;
    }

    let mut opts = fs::OpenOptions::new();
    Ok(err_at!(
        IOError,
        opts.create(true).truncate(true).write(true).open(os_file)
    )?)
}
