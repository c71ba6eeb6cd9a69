use {bstr::ByteSlice, jiff::civil};

use crate::{
    args::{self, Configurable, Usage},
    context::Context,
    parse::{BytesExt, FromBytes},
};

/// The flags that configure how dates are read and written.
///
/// Anything not given on the command line falls back to the corresponding
/// `PERIOD_*` environment variable, and then to a default.
#[derive(Clone, Debug, Default)]
pub struct ContextFlags {
    week_start: Option<Weekday>,
    input_format: Option<String>,
    date_format: Option<String>,
}

impl ContextFlags {
    const USAGE_INPUT_FORMAT: Usage = Usage::flag(
        "--input-format <strptime>",
        "Try this format first when parsing dates.",
        r#"
Try this format first when parsing dates.

Dates in expressions and dates given to `period find` are normally parsed by
trying a fixed list of formats, like `%Y-%m-%d`, `%m/%d` and `%b`. When this
flag is given, its `strptime`-style format is tried before any of them. For
example, `--input-format %d.%m.%Y` makes `15.03.2024` a valid date.

This may also be set with the `PERIOD_INPUT_FORMAT` environment variable.
"#,
    );

    const USAGE_FORMAT: Usage = Usage::flag(
        "-f, --format <strftime>",
        "Print dates in this format.",
        r#"
Print dates in this format.

The value is a `strftime`-style format string. The default is `%Y-%m-%d`. For
example, `-f '%b %-d, %Y'` prints dates like `Mar 1, 2024`.

This may also be set with the `PERIOD_DATE_FORMAT` environment variable.
"#,
    );

    /// Build the context that expressions and dates are interpreted in.
    pub fn context(&self) -> Context {
        let week_start = match self.week_start {
            Some(ref weekday) => weekday.get(),
            None => *crate::WEEK_START,
        };
        let input_format =
            self.input_format.clone().or_else(|| crate::INPUT_FORMAT.clone());
        let date_format =
            self.date_format.clone().unwrap_or_else(|| crate::DATE_FORMAT.clone());

        let mut ctx = Context::new(*crate::TODAY);
        ctx.week_start(week_start)
            .input_format(input_format)
            .date_format(date_format);
        ctx
    }
}

impl Configurable for ContextFlags {
    fn configure(
        &mut self,
        p: &mut lexopt::Parser,
        arg: &mut lexopt::Arg,
    ) -> anyhow::Result<bool> {
        match *arg {
            lexopt::Arg::Long("week-start") => {
                self.week_start = Some(args::value(p, "--week-start")?);
            }
            lexopt::Arg::Long("input-format") => {
                self.input_format = Some(args::value(p, "--input-format")?);
            }
            lexopt::Arg::Short('f') | lexopt::Arg::Long("format") => {
                self.date_format = Some(args::value(p, "-f/--format")?);
            }
            _ => return Ok(false),
        }
        Ok(true)
    }

    fn usage(&self) -> &[Usage] {
        &[
            Weekday::USAGE_WEEK_START,
            ContextFlags::USAGE_INPUT_FORMAT,
            ContextFlags::USAGE_FORMAT,
        ]
    }
}

/// Provides parsing for Jiff's civil `Weekday` type.
#[derive(Clone, Debug)]
pub struct Weekday {
    weekday: civil::Weekday,
}

impl Weekday {
    pub const USAGE_WEEK_START: Usage = Usage::flag(
        "--week-start <weekday>",
        "The weekday on which weeks start (defaults to Sunday).",
        r#"
The weekday on which weeks start (defaults to Sunday).

This only matters for expressions that recur in weeks, like `weekly` or
`every 2 weeks`, without a starting date. Their periods are aligned so that
each one begins on this weekday.

Any day of the week may be given. They can be specified in the following way
(without regard for case):

Sunday, Sun, SU, 0

Monday, Mon, MO, 1

Tuesday, Tues, Tue, TU, 2

Wednesday, Wed, WE, 3

Thursday, Thurs, Thu, TH, 4

Friday, Fri, FR, 5

Saturday, Sat, SA, 6

This may also be set with the `PERIOD_WEEK_START` environment variable.
"#,
    );

    /// Return the parsed weekday.
    pub fn get(&self) -> civil::Weekday {
        self.weekday
    }
}

impl std::str::FromStr for Weekday {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<Weekday> {
        s.as_bytes().parse()
    }
}

impl FromBytes for Weekday {
    type Err = anyhow::Error;

    fn from_bytes(s: &[u8]) -> anyhow::Result<Weekday> {
        use jiff::civil::Weekday::*;

        let weekday = match &*s.to_ascii_lowercase() {
            b"sunday" | b"sun" | b"su" | b"0" => Sunday,
            b"monday" | b"mon" | b"mo" | b"1" => Monday,
            b"tuesday" | b"tues" | b"tue" | b"tu" | b"2" => Tuesday,
            b"wednesday" | b"wed" | b"we" | b"3" => Wednesday,
            b"thursday" | b"thurs" | b"thu" | b"th" | b"4" => Thursday,
            b"friday" | b"fri" | b"fr" | b"5" => Friday,
            b"saturday" | b"sat" | b"sa" | b"6" => Saturday,
            unk => anyhow::bail!(
                "unrecognized weekday: `{unk}`",
                unk = unk.as_bstr()
            ),
        };
        Ok(Weekday { weekday })
    }
}
