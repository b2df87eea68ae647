#![allow(dead_code)]

use std::fs;
use std::path::PathBuf;

use tempfile::TempDir;

pub struct Workspace {
    pub dir: TempDir,
}

impl Workspace {
    pub fn new() -> Self {
        Self {
            dir: TempDir::new().expect("create temp dir"),
        }
    }

    pub fn state_path(&self) -> PathBuf {
        self.dir.path().join("state.json")
    }

    pub fn store_path(&self) -> PathBuf {
        self.dir.path().join("chains")
    }

    pub fn cmd(&self) -> assert_cmd::Command {
        let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("fatechain");
        cmd.current_dir(self.dir.path())
            .env_remove("RUST_LOG")
            .arg("--state")
            .arg(self.state_path())
            .arg("--store")
            .arg(self.store_path());
        cmd
    }

    pub fn write_state(&self, json: &str) {
        fs::write(self.state_path(), json).expect("write state");
    }

    pub fn write_config(&self, toml: &str) {
        fs::write(self.dir.path().join("fatechain.toml"), toml).expect("write config");
    }

    pub fn state(&self) -> serde_json::Value {
        let content = fs::read_to_string(self.state_path()).expect("read state");
        serde_json::from_str(&content).expect("parse state")
    }
}
