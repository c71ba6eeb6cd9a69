use crate::{command::assert_cmd_snapshot, period};

#[test]
fn bounded() {
    assert_cmd_snapshot!(
        period(["seq", "monthly from 2023 to 2023-06"]),
        @r"
    success: true
    exit_code: 0
    ----- stdout -----
    [2023-01-01, 2023-02-01)
    [2023-02-01, 2023-03-01)
    [2023-03-01, 2023-04-01)
    [2023-04-01, 2023-05-01)
    [2023-05-01, 2023-06-01)

    ----- stderr -----
    ",
    );
}

#[test]
fn count() {
    assert_cmd_snapshot!(
        period(["seq", "-c", "3", "every 2 weeks"]),
        @r"
    success: true
    exit_code: 0
    ----- stdout -----
    [2024-03-10, 2024-03-24)
    [2024-03-24, 2024-04-07)
    [2024-04-07, 2024-04-21)

    ----- stderr -----
    ",
    );
    assert_cmd_snapshot!(
        period(["seq", "-c", "0", "daily"]),
        @r"
    success: true
    exit_code: 0
    ----- stdout -----

    ----- stderr -----
    ",
    );
}

#[test]
fn until() {
    assert_cmd_snapshot!(
        period(["seq", "quarterly", "--from", "2024-02", "--until", "2024-12-31"]),
        @r"
    success: true
    exit_code: 0
    ----- stdout -----
    [2024-01-01, 2024-04-01)
    [2024-04-01, 2024-07-01)
    [2024-07-01, 2024-10-01)
    [2024-10-01, 2025-01-01)

    ----- stderr -----
    ",
    );
}

/// A `--from` date before the start of the expression starts the sequence at
/// the beginning, and one after its end produces nothing.
#[test]
fn from_outside_bounds() {
    assert_cmd_snapshot!(
        period(["seq", "--from", "2022-05", "monthly from 2023 to 2023-03"]),
        @r"
    success: true
    exit_code: 0
    ----- stdout -----
    [2023-01-01, 2023-02-01)
    [2023-02-01, 2023-03-01)

    ----- stderr -----
    ",
    );
    assert_cmd_snapshot!(
        period(["seq", "--from", "2024", "monthly from 2023 to 2023-03"]),
        @r"
    success: true
    exit_code: 0
    ----- stdout -----

    ----- stderr -----
    ",
    );
}

/// Monthly periods that start on the last day of a month stay on month ends,
/// rather than drifting to the 29th after February.
#[test]
fn month_ends() {
    assert_cmd_snapshot!(
        period(["seq", "-c", "4", "every month from 2024-01-31"]),
        @r"
    success: true
    exit_code: 0
    ----- stdout -----
    [2024-01-31, 2024-02-29)
    [2024-02-29, 2024-03-31)
    [2024-03-31, 2024-04-30)
    [2024-04-30, 2024-05-31)

    ----- stderr -----
    ",
    );
}

#[test]
fn fixed_windows() {
    assert_cmd_snapshot!(
        period(["seq", "since 2024-03"]),
        @r"
    success: true
    exit_code: 0
    ----- stdout -----
    [2024-03-01, ..)

    ----- stderr -----
    ",
    );
    assert_cmd_snapshot!(
        period(["seq", "in 2023"]),
        @r"
    success: true
    exit_code: 0
    ----- stdout -----
    [2023-01-01, 2024-01-01]

    ----- stderr -----
    ",
    );
}

#[test]
fn format() {
    assert_cmd_snapshot!(
        period(["seq", "-c", "2", "-f", "%d/%m/%Y", "monthly"]),
        @r"
    success: true
    exit_code: 0
    ----- stdout -----
    [01/03/2024, 01/04/2024)
    [01/04/2024, 01/05/2024)

    ----- stderr -----
    ",
    );
}

/// The sequence stops quietly at the last period that fits in the supported
/// range of dates.
#[test]
fn maximum_date() {
    assert_cmd_snapshot!(
        period(["seq", "yearly", "--from", "9997-06-01"]),
        @r"
    success: true
    exit_code: 0
    ----- stdout -----
    [9997-04-27, 9998-04-27)
    [9998-04-27, 9999-04-27)

    ----- stderr -----
    ",
    );
}

#[test]
fn errors() {
    assert_cmd_snapshot!(
        period(["seq", "-c", "3", "-u", "2024-12-31", "monthly"]),
        @r"
    success: false
    exit_code: 1
    ----- stdout -----

    ----- stderr -----
    the -u/--until flag cannot be used with -c/--count
    ",
    );
    assert_cmd_snapshot!(
        period(["seq"]),
        @r"
    success: false
    exit_code: 1
    ----- stdout -----

    ----- stderr -----
    missing required <expression>
    ",
    );
    assert_cmd_snapshot!(
        period(["seq", "every 2 fortnights"]),
        @r"
    success: false
    exit_code: 1
    ----- stdout -----

    ----- stderr -----
    invalid date interval: neither start, nor end, nor duration
    ",
    );
    assert_cmd_snapshot!(
        period(["seq", "monthly", "--from", "soon"]),
        @r"
    success: false
    exit_code: 1
    ----- stdout -----

    ----- stderr -----
    invalid --from date `soon`: could not parse date mask: soon
    ",
    );
}
