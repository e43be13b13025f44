#![allow(dead_code)]

use assert_cmd::Command;
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

pub const DICT: &str = "# test dictionary\n繁體\t繁体\n體\t体\n測\t测\n試\t试\n後\t后\n來\t来\n";

/// 隔离的工作目录：dict.txt + 若干顶层文件夹
pub struct TestEnv {
    _tmp: TempDir,
    pub root: PathBuf,
    pub dict: PathBuf,
}

impl TestEnv {
    pub fn new() -> Self {
        let tmp = TempDir::new().expect("create temp dir");
        let root = tmp.path().join("work");
        fs::create_dir_all(&root).expect("create work dir");
        let dict = tmp.path().join("dict.txt");
        fs::write(&dict, DICT).expect("write dictionary");
        Self { _tmp: tmp, root, dict }
    }

    pub fn put(&self, rel: &str, body: &str) -> PathBuf {
        let path = self.root.join(rel);
        fs::create_dir_all(path.parent().expect("parent")).expect("create parent");
        fs::write(&path, body).expect("write fixture");
        path
    }

    pub fn read(&self, rel: &str) -> String {
        fs::read_to_string(self.root.join(rel)).expect("read fixture")
    }

    /// 以进程内词典运行，工作目录为 root
    pub fn cmd(&self) -> Command {
        let mut cmd = Command::cargo_bin("hantscan").expect("binary built");
        cmd.current_dir(&self.root).env("RUST_LOG", "off").arg("--dict").arg(&self.dict);
        cmd
    }

    pub fn bare_cmd(&self) -> Command {
        let mut cmd = Command::cargo_bin("hantscan").expect("binary built");
        cmd.current_dir(&self.root).env("RUST_LOG", "off");
        cmd
    }

    pub fn stdout(&self, args: &[&str]) -> String {
        let out = self.cmd().args(args).assert().success().get_output().stdout.clone();
        String::from_utf8(out).expect("utf8 stdout")
    }
}
