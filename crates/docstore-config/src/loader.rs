// SPDX-FileCopyrightText: 2026 Docstore Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Layered loading of [`DocStoreConfig`].
//!
//! Each layer overrides the one before it: built-in defaults, the system file,
//! the per-user file, `./docstore.toml`, and finally `DOCSTORE_*` variables.
//! Missing files contribute nothing.

#![allow(clippy::result_large_err)]

use std::path::{Path, PathBuf};

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};

use crate::model::DocStoreConfig;

pub(crate) const SYSTEM_CONFIG_FILE: &str = "/etc/docstore/docstore.toml";
pub(crate) const LOCAL_CONFIG_FILE: &str = "docstore.toml";

/// Reads every layer and extracts the store configuration.
pub fn load_config() -> Result<DocStoreConfig, figment::Error> {
    build_figment().extract()
}

/// Defaults overlaid with `toml_content`. Files and the environment are ignored.
pub fn load_config_from_str(toml_content: &str) -> Result<DocStoreConfig, figment::Error> {
    defaults()
        .merge(Toml::string(toml_content))
        .extract()
}

/// Defaults, then the file at `path`, then `DOCSTORE_*` variables.
pub fn load_config_from_path(path: &Path) -> Result<DocStoreConfig, figment::Error> {
    defaults()
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// The unextracted layer stack behind [`load_config`].
pub fn build_figment() -> Figment {
    let mut figment = defaults().merge(Toml::file(SYSTEM_CONFIG_FILE));
    if let Some(user_file) = user_config_file() {
        figment = figment.merge(Toml::file(user_file));
    }
    figment
        .merge(Toml::file(LOCAL_CONFIG_FILE))
        .merge(env_provider())
}

/// `docstore/docstore.toml` under the platform's per-user config directory.
pub(crate) fn user_config_file() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("docstore").join("docstore.toml"))
}

fn defaults() -> Figment {
    Figment::from(Serialized::defaults(DocStoreConfig::default()))
}

/// `DOCSTORE_<SECTION>_<KEY>` variables. Only the first underscore after the
/// section name nests, so `DOCSTORE_STORAGE_DATABASE_PATH` lands on
/// `storage.database_path`.
fn env_provider() -> Env {
    Env::prefixed("DOCSTORE_").map(|key| {
        let mapped = key
            .as_str()
            .replacen("storage_", "storage.", 1)
            .replacen("subscriptions_", "subscriptions.", 1);
        mapped.into()
    })
}
