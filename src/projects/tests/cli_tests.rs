//! Tests for CLI command parsing and validation.

use super::{Command, Flag, get_command, get_flags};
use std::path::PathBuf;

fn args(values: &[&str]) -> Vec<String> {
    values.iter().map(|value| value.to_string()).collect()
}

#[test]
fn translate_command_uses_defaults() {
    let command = get_command(&args(&["translate", "program.json"])).expect("command should parse");
    assert_eq!(
        command,
        Command::Translate {
            program: PathBuf::from("program.json"),
            config: None,
            out: None,
        }
    );
}

#[test]
fn translate_command_parses_config_and_output() {
    let command = get_command(&args(&[
        "translate",
        "--config",
        "build/j2cpp.toml",
        "program.json",
        "--out",
        "generated",
    ]))
    .expect("command should parse");

    assert_eq!(
        command,
        Command::Translate {
            program: PathBuf::from("program.json"),
            config: Some(PathBuf::from("build/j2cpp.toml")),
            out: Some(PathBuf::from("generated")),
        }
    );
}

#[test]
fn translate_command_requires_a_program() {
    let error = get_command(&args(&["translate", "--out", "generated"]))
        .expect_err("missing program should fail");
    assert!(error.contains("Missing program document"));
}

#[test]
fn translate_command_rejects_flag_without_value() {
    let error = get_command(&args(&["translate", "program.json", "--out"]))
        .expect_err("missing value should fail");
    assert!(error.contains("Missing value for --out"));

    let error = get_command(&args(&["translate", "program.json", "--config", "--out", "x"]))
        .expect_err("flag as value should fail");
    assert!(error.contains("Missing value for --config"));
}

#[test]
fn translate_command_rejects_unknown_flags() {
    let error = get_command(&args(&["translate", "program.json", "--wat"]))
        .expect_err("unknown flag should fail");
    assert!(error.contains("Unknown translate flag"));
}

#[test]
fn translate_command_rejects_a_second_program() {
    let error = get_command(&args(&["translate", "a.json", "b.json"]))
        .expect_err("two programs should fail");
    assert!(error.contains("exactly one program document"));
}

#[test]
fn timers_flag_is_accepted_by_translate() {
    let all_args = args(&["j2cpp", "translate", "program.json", "--hide-timers"]);
    assert!(get_command(&all_args[1..]).is_ok());
    assert_eq!(get_flags(&all_args), vec![Flag::DisableTimers]);
}

#[test]
fn help_and_invalid_commands() {
    assert_eq!(get_command(&args(&["help"])), Ok(Command::Help));

    let error = get_command(&args(&["compile"])).expect_err("unknown command should fail");
    assert!(error.contains("Invalid command: 'compile'"));
}
