use std::{fs, path::PathBuf};

use directories::ProjectDirs;

use crate::error::{Error, Result};

pub fn data_directory() -> Result<PathBuf> {
    let project_dirs = ProjectDirs::from("com", "steve", "productrecommender").ok_or_else(|| {
        Error::Config("Failed to resolve a home directory for application data".to_string())
    })?;
    let data_local_dir = project_dirs.data_local_dir();
    fs::create_dir_all(data_local_dir)?;
    Ok(data_local_dir.to_path_buf())
}

pub fn catalog_path() -> Result<PathBuf> {
    Ok(data_directory()?.join("products.json"))
}

pub fn config_path() -> Result<PathBuf> {
    Ok(data_directory()?.join("config.json"))
}
