// Copyright (c) The casework Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use camino::{Utf8Path, Utf8PathBuf};

/// Writes `contents` to `.config/casework.toml` under `workspace_dir`, returning the path.
pub(super) fn write_config(workspace_dir: &Utf8Path, contents: &str) -> Utf8PathBuf {
    let config_dir = workspace_dir.join(".config");
    std::fs::create_dir_all(&config_dir).expect("created config dir");
    let config_path = config_dir.join("casework.toml");
    std::fs::write(&config_path, contents).expect("wrote config file");
    config_path
}
