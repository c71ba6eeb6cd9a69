use std::ffi::OsStr;

mod seq;

/// The current date that every test runs at. It's a Friday.
const TODAY: &str = "2024-03-15";

/// Return a command for the `period` binary and no argument.
///
/// Any `PERIOD_*` settings in the environment running the tests are removed,
/// so that only the ones a test sets explicitly take effect.
fn period_bare() -> crate::command::Command {
    crate::command::bin("period")
        .env("PERIOD_TODAY", TODAY)
        .env_remove("PERIOD_WEEK_START")
        .env_remove("PERIOD_INPUT_FORMAT")
        .env_remove("PERIOD_DATE_FORMAT")
        .env_remove("PERIOD_LOG")
}

/// Return a command for the `period` binary with the given arguments appended
/// to it.
fn period<T: AsRef<OsStr>>(
    args: impl IntoIterator<Item = T>,
) -> crate::command::Command {
    period_bare().args(args)
}

/// Test that calling `period` with no arguments prints the list of commands
/// and fails.
#[test]
fn no_args() {
    crate::command::assert_cmd_snapshot!(
        period_bare(),
        @r"
    success: false
    exit_code: 1
    ----- stdout -----

    ----- stderr -----
    A simple utility for computing calendar periods from expressions like
    `every 2 weeks`, `last month` or `monthly from 2023 to 2023-06`.

    USAGE:
        period <command> ...

    COMMANDS:
        find   Find the period containing each of a sequence of dates
        parse  Show the interval described by an expression
        seq    Generate the sequence of periods described by an expression
    ",
    );
}

#[test]
fn unknown_command() {
    crate::command::assert_cmd_snapshot!(
        period(["list"]),
        @r"
    success: false
    exit_code: 1
    ----- stdout -----

    ----- stderr -----
    unrecognized command 'list'
    ",
    );
}

/// An invalid environment setting is reported as a warning when logging is
/// enabled, and otherwise ignored in favor of the default.
#[test]
fn invalid_env_falls_back() {
    crate::command::assert_cmd_snapshot!(
        period(["parse", "weekly"]).env("PERIOD_WEEK_START", "someday"),
        @r"
    success: true
    exit_code: 0
    ----- stdout -----
    start: none, end: none, duration: 1 weeks

    ----- stderr -----
    ",
    );
}
