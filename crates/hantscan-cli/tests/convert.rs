mod common;

use common::TestEnv;
use predicates::str::contains;

#[test]
fn converts_and_reports_each_file() {
    let env = TestEnv::new();
    env.put("data/a.json", r#"{"a":"繁體"}"#);
    env.put("data/b.json", r#"{"b":"简体"}"#);
    env.put("data/.hidden.json", r#"{"h":"體"}"#);
    env.put(".cache/c.json", r#"{"c":"體"}"#);

    let out = env.stdout(&["convert"]);
    assert_eq!(out, "UPDATED data/a.json\nOK data/b.json\n");
    assert_eq!(env.read("data/a.json"), r#"{"a":"繁体"}"#);
    assert_eq!(env.read("data/.hidden.json"), r#"{"h":"體"}"#);
    assert_eq!(env.read(".cache/c.json"), r#"{"c":"體"}"#);

    // 第二次运行：已是简体
    assert_eq!(env.stdout(&["convert"]), "OK data/a.json\nOK data/b.json\n");
}

#[test]
fn dry_run_does_not_write() {
    let env = TestEnv::new();
    env.put("data/a.json", r#"["後來"]"#);
    assert_eq!(env.stdout(&["convert", "--dry-run"]), "WOULD-UPDATE data/a.json\n");
    assert_eq!(env.read("data/a.json"), r#"["後來"]"#);
}

#[test]
fn include_hidden_and_explicit_paths() {
    let env = TestEnv::new();
    env.put("data/.hidden.json", r#"{"h":"體"}"#);
    env.put("other/x.json", r#"{"x":"測試"}"#);

    assert_eq!(env.stdout(&["convert", "--include-hidden", "data"]), "UPDATED data/.hidden.json\n");
    assert_eq!(env.stdout(&["convert", "other/x.json"]), "UPDATED other/x.json\n");
    assert_eq!(env.read("other/x.json"), r#"{"x":"测试"}"#);
}

#[test]
fn crlf_preserving_conversion_updates() {
    let env = TestEnv::new();
    env.put("data/a.json", "{\r\n  \"a\": \"體\"\r\n}\r\n");
    assert_eq!(env.stdout(&["convert"]), "UPDATED data/a.json\n");
    assert_eq!(env.read("data/a.json"), "{\r\n  \"a\": \"体\"\r\n}\r\n");
}

#[test]
fn no_json_files_message() {
    let env = TestEnv::new();
    env.put("data/readme.txt", "體");
    env.cmd().args(["convert"]).assert().success().stdout(contains("No JSON files found."));
}

#[test]
fn missing_opencc_aborts_before_any_file() {
    let env = TestEnv::new();
    env.put("data/a.json", r#"{"a":"體"}"#);
    env.bare_cmd().args(["--opencc-bin", "/nonexistent/bin/opencc", "convert"]).assert().code(2);
    assert_eq!(env.read("data/a.json"), r#"{"a":"體"}"#);
}
