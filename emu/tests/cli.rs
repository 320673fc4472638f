use std::path::Path;
use std::process::{Command, Output};

fn build(dir: &Path, source: &str, input: &str) {
    let program = acasm::assemble(source).unwrap();
    acasm::emit(&program, &dir.join("prog.json")).unwrap();
    std::fs::write(dir.join("input.txt"), input).unwrap();
}

fn acemu(dir: &Path, extra: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_acemu"))
        .current_dir(dir)
        .args(["prog.json", "input.txt"])
        .args(extra)
        .output()
        .unwrap()
}

const ECHO_ONE: &str = "IN 0\nIN 0\nOUT 0\nHALT\n";

#[test]
fn halt_exits_zero_and_appends_log() {
    let dir = tempfile::tempdir().unwrap();
    build(dir.path(), ECHO_ONE, "q");

    let out = acemu(dir.path(), &[]);
    assert_eq!(out.status.code(), Some(0));
    assert_eq!(out.stdout, b"q");

    let log = std::fs::read_to_string(dir.path().join("cpu.log")).unwrap();
    assert_eq!(log.lines().count(), 4);
    assert!(log.ends_with("[0003] 0003: HALT             HALTED\n"));

    acemu(dir.path(), &[]);
    let log = std::fs::read_to_string(dir.path().join("cpu.log")).unwrap();
    assert_eq!(log.lines().count(), 8);

    acemu(dir.path(), &["--truncate-log"]);
    let log = std::fs::read_to_string(dir.path().join("cpu.log")).unwrap();
    assert_eq!(log.lines().count(), 4);
}

#[test]
fn fault_exits_two() {
    let dir = tempfile::tempdir().unwrap();
    build(dir.path(), ECHO_ONE, "");

    let out = acemu(dir.path(), &["-l", "run.log"]);
    assert_eq!(out.status.code(), Some(2));
    assert!(out.stdout.is_empty());
    assert_eq!(
        std::fs::read_to_string(dir.path().join("run.log")).unwrap(),
        "[0000] 0000: IN 0             IN[0]=0x00000000 AC=0x00000000\n\
         [0001] 0001: FAULT input exhausted\n"
    );
}

#[test]
fn tick_limit_from_flag_and_config() {
    let dir = tempfile::tempdir().unwrap();
    build(dir.path(), "spin: JUMP spin\n", "");

    let out = acemu(dir.path(), &["-t", "5", "--truncate-log"]);
    assert_eq!(out.status.code(), Some(2));
    let log = std::fs::read_to_string(dir.path().join("cpu.log")).unwrap();
    assert_eq!(log.lines().count(), 6);

    std::fs::write(dir.path().join("cfg.yml"), "tmax: 2\ntruncate_log: true\n").unwrap();
    let out = acemu(dir.path(), &["-c", "cfg.yml"]);
    assert_eq!(out.status.code(), Some(2));
    let log = std::fs::read_to_string(dir.path().join("cpu.log")).unwrap();
    assert_eq!(
        log.lines().last(),
        Some("[0002] 0000: FAULT tick limit of 2 instructions reached")
    );
}

#[test]
fn load_errors_exit_one() {
    let dir = tempfile::tempdir().unwrap();
    build(dir.path(), "ORG 100\nHALT\n", "");

    std::fs::write(dir.path().join("small.yml"), "memory_size: 64\n").unwrap();
    let out = acemu(dir.path(), &["-c", "small.yml"]);
    assert_eq!(out.status.code(), Some(1));

    std::fs::write(dir.path().join("bad.yml"), "memory: 64\n").unwrap();
    let out = acemu(dir.path(), &["-c", "bad.yml"]);
    assert_eq!(out.status.code(), Some(1));

    let out = Command::new(env!("CARGO_BIN_EXE_acemu"))
        .current_dir(dir.path())
        .args(["missing.json", "input.txt"])
        .output()
        .unwrap();
    assert_eq!(out.status.code(), Some(1));
    assert!(!dir.path().join("cpu.log").exists());
}

#[test]
fn dump_goes_to_stderr() {
    let dir = tempfile::tempdir().unwrap();
    build(dir.path(), ECHO_ONE, "z");
    let out = acemu(dir.path(), &["-a"]);
    assert_eq!(out.status.code(), Some(0));
    assert_eq!(out.stdout, b"z");
    let stderr = String::from_utf8_lossy(&out.stderr);
    assert!(stderr.contains("AC=0x0000007A"));
}
