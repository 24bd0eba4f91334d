//! CLI 端到端测试
//!
//! 通过真实二进制验证：
//! 1. translate 的指令文本与退出码
//! 2. check 的诊断报告
//! 3. run 在仿真端口上的执行汇总
//!
//! 所有用例都显式传 --config，避免读到宿主机的用户配置。

use std::fs;
use std::path::PathBuf;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

const TEST_CONFIG: &str = r#"
[translator]
pulse_length = 0.02
max_feedrate = 20.0

[motion]
pulse_length = 0.02
tick_hz = 1000
pulse_width_us = 0
flush_gap_us = 10
poll_interval_us = 10
"#;

fn write_file(dir: &TempDir, name: &str, content: &str) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, content).unwrap();
    path
}

fn kerf() -> Command {
    Command::cargo_bin("kerf").unwrap()
}

#[test]
fn test_translate_golden_output() {
    let dir = TempDir::new().unwrap();
    let config = write_file(&dir, "machine.toml", TEST_CONFIG);
    let job = write_file(&dir, "job.gcode", "G1 X10 Y5 F100 S50\nG1 Y-2\n");

    kerf()
        .args([
            "translate",
            job.to_str().unwrap(),
            "--config",
            config.to_str().unwrap(),
        ])
        .assert()
        .success()
        .stdout("POWER 50\nMOVE 500 250 100\nMOVE 0 -100 100\n");
}

#[test]
fn test_translate_to_file() {
    let dir = TempDir::new().unwrap();
    let config = write_file(&dir, "machine.toml", TEST_CONFIG);
    let job = write_file(&dir, "job.gcode", "; top edge\nG1 X1 F10\n");
    let out = dir.path().join("job.cmd");

    kerf()
        .args([
            "translate",
            job.to_str().unwrap(),
            "--output",
            out.to_str().unwrap(),
            "--config",
            config.to_str().unwrap(),
        ])
        .assert()
        .success();

    let text = fs::read_to_string(&out).unwrap();
    assert_eq!(text, "#  top edge\nMOVE 50 0 10\n");
}

/// 致命诊断：中止行之前的指令照常输出，进程以失败退出
#[test]
fn test_translate_aborts_on_absolute_positioning() {
    let dir = TempDir::new().unwrap();
    let config = write_file(&dir, "machine.toml", TEST_CONFIG);
    let job = write_file(&dir, "job.gcode", "G1 X1 F10\nG90\nG1 X9\n");

    kerf()
        .args([
            "translate",
            job.to_str().unwrap(),
            "--config",
            config.to_str().unwrap(),
        ])
        .assert()
        .failure()
        .stdout("MOVE 50 0 10\n")
        .stderr(predicate::str::contains("Absolute positioning"));
}

#[test]
fn test_check_reports_all_diagnostics() {
    let dir = TempDir::new().unwrap();
    let config = write_file(&dir, "machine.toml", TEST_CONFIG);
    let job = write_file(&dir, "job.gcode", "G90\nG99\nnot gcode\n");

    kerf()
        .args([
            "check",
            job.to_str().unwrap(),
            "--config",
            config.to_str().unwrap(),
        ])
        .assert()
        .failure()
        .stdout(predicate::str::contains("Absolute positioning"))
        .stdout(predicate::str::contains("Unknown G code: 99"))
        .stdout(predicate::str::contains("Unknown line"))
        .stdout(predicate::str::contains("❌"));
}

#[test]
fn test_check_clean_file() {
    let dir = TempDir::new().unwrap();
    let config = write_file(&dir, "machine.toml", TEST_CONFIG);
    let job = write_file(&dir, "job.gcode", "; header\nG91\nG1 X1 F10\nM5\n");

    kerf()
        .args([
            "check",
            job.to_str().unwrap(),
            "--config",
            config.to_str().unwrap(),
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("✅ 无诊断"));
}

#[test]
fn test_run_small_program() {
    let dir = TempDir::new().unwrap();
    let config = write_file(&dir, "machine.toml", TEST_CONFIG);
    let job = write_file(&dir, "job.gcode", "G1 X0.1 Y-0.04 F50 S30\n");

    kerf()
        .args([
            "run",
            job.to_str().unwrap(),
            "--config",
            config.to_str().unwrap(),
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("🔆 功率 30"))
        .stdout(predicate::str::contains("X 轴脉冲: 5"))
        .stdout(predicate::str::contains("Y 轴脉冲: 2"))
        .stdout(predicate::str::contains("✅ 完成"));
}

/// run 在致命诊断处停：之前的运动已执行，进程以失败退出
#[test]
fn test_run_stops_at_fatal_diagnostic() {
    let dir = TempDir::new().unwrap();
    let config = write_file(&dir, "machine.toml", TEST_CONFIG);
    let job = write_file(&dir, "job.gcode", "G1 X0.1 F50\nG90\nG1 X9\n");

    kerf()
        .args([
            "run",
            job.to_str().unwrap(),
            "--config",
            config.to_str().unwrap(),
        ])
        .assert()
        .failure()
        .stdout(predicate::str::contains("X 轴脉冲: 5"))
        .stdout(predicate::str::contains("在第 2 行中止"));
}

#[test]
fn test_config_path_prints_location() {
    kerf()
        .args(["config", "path"])
        .assert()
        .success()
        .stdout(predicate::str::contains("kerf"))
        .stdout(predicate::str::contains("config.toml"));
}
