use assert_cmd::Command;
use predicates::prelude::*;
use std::io::Write;

fn source_file(contents: &str) -> tempfile::NamedTempFile {
    let mut f = tempfile::NamedTempFile::new().expect("create temp source file");
    f.write_all(contents.as_bytes()).expect("write source");
    f
}

#[test]
fn compiles_hello_world_to_c_on_stdout() {
    let file = source_file(r#"fn main(): int { print("Hello, World!"); return 0; }"#);

    Command::cargo_bin("classc")
        .unwrap()
        .arg(file.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("int main(void)"))
        .stdout(predicate::str::contains(r#"printf("%s\n", "Hello, World!")"#));
}

#[test]
fn reports_missing_main_and_exits_nonzero() {
    let file = source_file("fn helper(): int { return 0; }");

    Command::cargo_bin("classc")
        .unwrap()
        .arg(file.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("[semantic]"))
        .stderr(predicate::str::contains("main"));
}

#[test]
fn reports_unreadable_source_file() {
    Command::cargo_bin("classc")
        .unwrap()
        .arg("/nonexistent/path/does-not-exist.cls")
        .assert()
        .failure()
        .stderr(predicate::str::contains("could not read"));
}

#[test]
fn writes_generated_c_to_output_file() {
    let file = source_file(r#"fn main(): int { return 0; }"#);
    let out_dir = tempfile::tempdir().unwrap();
    let out_path = out_dir.path().join("program.c");

    Command::cargo_bin("classc")
        .unwrap()
        .arg(file.path())
        .arg("-o")
        .arg(&out_path)
        .assert()
        .success();

    let contents = std::fs::read_to_string(&out_path).expect("output file written");
    assert!(contents.contains("__classc_main"));
}
