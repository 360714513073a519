//! Flag and environment handling of `LogConfig`, checked in child processes
//!
//! Each case re-runs this test binary with a controlled environment. The
//! child parses the configuration through `LogConfig::parse_args_or_exit`
//! and prints it, so both the parsed values and the exit status are visible.

use pllog::LogConfig;
use std::process::{Command, Output};

const CHILD_ARGS: &str = "PLLOG_TEST_CHILD_ARGS";
const ARG_SEPARATOR: &str = "\u{1f}";
const LOG_VARS: [&str; 6] = [
    "LOG_HOST_URL",
    "LOG_SNIFF",
    "LOG_INDEX_PREFIX",
    "LOG_HOST_NAME",
    "LOG_ENABLE",
    "LOG_LEVEL",
];

/// Child side: does nothing unless started by `run_child`
#[test]
fn config_child_entry() {
    let Ok(joined) = std::env::var(CHILD_ARGS) else {
        return;
    };
    let args: Vec<&str> = std::iter::once("app")
        .chain(joined.split(ARG_SEPARATOR).filter(|a| !a.is_empty()))
        .collect();

    let config = LogConfig::parse_args_or_exit(args);
    println!(
        "CONFIG enable={} sniff={} host_url={} prefix={} host_name={} level={}",
        config.enable,
        config.sniff,
        config.host_url,
        config.index_prefix,
        config.host_name,
        config.level.to_str()
    );
}

fn run_child(args: &[&str], env: &[(&str, &str)]) -> Output {
    let exe = std::env::current_exe().expect("test binary path");
    let mut cmd = Command::new(exe);
    cmd.args(["config_child_entry", "--exact", "--nocapture", "--test-threads=1"])
        .env(CHILD_ARGS, args.join(ARG_SEPARATOR));

    for var in LOG_VARS {
        cmd.env_remove(var);
    }
    for (key, value) in env {
        cmd.env(key, value);
    }

    cmd.output().expect("spawn child test process")
}

fn parsed(output: &Output) -> Option<String> {
    String::from_utf8_lossy(&output.stdout)
        .lines()
        .find_map(|line| line.find("CONFIG ").map(|i| line[i..].to_string()))
}

fn parsed_ok(output: &Output) -> String {
    assert!(
        output.status.success(),
        "child failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    parsed(output).expect("child printed its configuration")
}

#[test]
fn test_configuration_from_environment_only() {
    let output = run_child(
        &[],
        &[
            ("LOG_HOST_URL", "http://es.internal:9200"),
            ("LOG_SNIFF", "yes"),
            ("LOG_INDEX_PREFIX", "orders"),
            ("LOG_HOST_NAME", "web-1"),
            ("LOG_ENABLE", "1"),
            ("LOG_LEVEL", "warning"),
        ],
    );

    assert_eq!(
        parsed_ok(&output),
        "CONFIG enable=true sniff=true host_url=http://es.internal:9200 \
         prefix=orders host_name=web-1 level=WARN"
    );
}

#[test]
fn test_defaults_without_flags_or_environment() {
    let output = run_child(&[], &[]);

    assert_eq!(
        parsed_ok(&output),
        "CONFIG enable=false sniff=false host_url= prefix= host_name= level=DEBUG"
    );
}

#[test]
fn test_flags_win_over_environment() {
    let output = run_child(
        &["--log-prefix", "from-flag", "--log-level=info", "--log-enable"],
        &[
            ("LOG_INDEX_PREFIX", "from-env"),
            ("LOG_LEVEL", "error"),
            ("LOG_ENABLE", "false"),
            ("LOG_HOST_NAME", "env-host"),
        ],
    );

    let line = parsed_ok(&output);
    assert!(line.contains("prefix=from-flag"), "{}", line);
    assert!(line.contains("level=INFO"), "{}", line);
    assert!(line.contains("enable=true"), "{}", line);
    assert!(line.contains("host_name=env-host"), "{}", line);
}

#[test]
fn test_boolean_environment_spellings() {
    for (value, expected) in [
        ("1", true),
        ("true", true),
        ("yes", true),
        ("on", true),
        ("y", true),
        ("t", true),
        ("0", false),
        ("false", false),
        ("no", false),
        ("off", false),
        ("n", false),
        ("f", false),
    ] {
        let output = run_child(&[], &[("LOG_ENABLE", value), ("LOG_SNIFF", value)]);
        let line = parsed_ok(&output);

        assert!(
            line.contains(&format!("enable={} sniff={}", expected, expected)),
            "LOG_ENABLE={:?} gave {}",
            value,
            line
        );
    }
}

#[test]
fn test_empty_boolean_environment_is_rejected() {
    let output = run_child(&[], &[("LOG_ENABLE", "")]);

    assert_eq!(output.status.code(), Some(1));
    assert!(parsed(&output).is_none());
}

#[test]
fn test_help_exits_with_zero() {
    let output = run_child(&["--help"], &[]);

    assert_eq!(output.status.code(), Some(0));
    assert!(parsed(&output).is_none());
    assert!(String::from_utf8_lossy(&output.stdout).contains("--log-host-url"));
}

#[test]
fn test_invalid_flag_value_exits_with_one() {
    let output = run_child(&["--log-level", "loud"], &[]);

    assert_eq!(output.status.code(), Some(1));
    assert!(parsed(&output).is_none());
    assert!(String::from_utf8_lossy(&output.stderr).contains("loud"));
}

#[test]
fn test_invalid_environment_value_exits_with_one() {
    let output = run_child(&[], &[("LOG_LEVEL", "loud")]);

    assert_eq!(output.status.code(), Some(1));
    assert!(parsed(&output).is_none());
}
