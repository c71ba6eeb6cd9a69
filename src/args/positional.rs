use {
    anyhow::Context as _,
    bstr::{BStr, BString, ByteSlice, ByteVec},
    jiff::civil::Date,
};

use crate::{
    args::{Configurable, Usage},
    context::Context,
    mask,
    parse::{BufReadExt, Line, OsStrExt},
};

/// The usage docs for the `<expression>` argument shared by all commands.
pub const EXPRESSION: Usage = Usage::arg(
    "<expression>",
    "A period expression, e.g., `every 2 weeks` or `last month`.",
    r#"
A period expression, e.g., `every 2 weeks` or `last month`.

An expression is a sequence of clauses. Words are matched without regard for
case and a later clause overrides an earlier one.

Recurrence: `every <count> <unit>`, `every <unit>`, or one of `daily`,
`weekly`, `biweekly`, `monthly`, `bimonthly`, `quarterly` or `yearly`. Units
are `day`, `week`, `month`, `quarter` or `year` and may be plural.

Relative windows: `this`, `last` or `next` followed by `year`, `month`, `day`,
`today` or a date. When nothing follows, `month` is assumed. `today` on its
own is the current day.

Bounds: `in` or `on` followed by a date sets both the start and end. `from` or
`since` sets only the start and `to` or `until` sets only the end. These may
be followed by `this`, `last` or `next` too, as in `from last month`.

Dates: anything else is a date, like `2024`, `2024-05`, `05/01` or `may`. A
date covers a year, month or day depending on how much of it is given.
"#,
);

/// The usage docs for the `<date>` arguments of `period find`.
const DATE: Usage = Usage::arg(
    "<date>",
    "A date, e.g., `2024-03-15`, `2024-03` or `03/15`.",
    r#"
A date, e.g., `2024-03-15`, `2024-03` or `03/15`.

Dates can either be passed as positional arguments or as line delimited data
on stdin, but not both. That is, dates will only be read from stdin when
there are no dates provided as positional arguments.

Any date accepted in an expression is accepted here. Missing fields are
filled in: a missing day is the first of the month and a missing month is
January. A missing year is the current year, unless the month is later than
the current month, in which case it's the year before.
"#,
);

/// The CLI parsing configuration for the single period expression that
/// leads the positional arguments of `period find` and `period seq`.
///
/// This takes the first positional argument only. Anything after it is left
/// for the next target.
#[derive(Clone, Debug, Default)]
pub struct Expression(Option<String>);

impl Expression {
    /// Return the expression, or an error if none was given.
    pub fn get(&self) -> anyhow::Result<&str> {
        self.0.as_deref().context("missing required <expression>")
    }
}

impl Configurable for Expression {
    fn configure(
        &mut self,
        _: &mut lexopt::Parser,
        arg: &mut lexopt::Arg,
    ) -> anyhow::Result<bool> {
        match *arg {
            lexopt::Arg::Value(ref v) if self.0.is_none() => {
                self.0 = Some(v.to_str()?.to_string());
            }
            _ => return Ok(false),
        }
        Ok(true)
    }

    fn usage(&self) -> &[Usage] {
        &[EXPRESSION]
    }
}

/// The CLI parsing configuration for reading dates.
///
/// This will greedily consume all remaining positional arguments as dates.
///
/// When there are no positional arguments to consume, then this will read
/// dates from `stdin` in a line delimited fashion.
#[derive(Clone, Debug, Default)]
pub struct Dates(Arguments);

impl Dates {
    /// Run the given function over each date read from the CLI.
    ///
    /// If there were no positional dates, then this tries to read them
    /// from stdin, one per line.
    ///
    /// Iteration stops when the closure returns false or returns an error.
    pub fn try_map(
        self,
        ctx: &Context,
        mut f: impl FnMut(Date) -> anyhow::Result<bool>,
    ) -> anyhow::Result<()> {
        self.0.try_map(|arg| f(arg.to_date(ctx)?))
    }
}

impl Configurable for Dates {
    fn configure(
        &mut self,
        p: &mut lexopt::Parser,
        arg: &mut lexopt::Arg,
    ) -> anyhow::Result<bool> {
        self.0.configure(p, arg)
    }

    fn usage(&self) -> &[Usage] {
        &[DATE]
    }
}

/// The parsing configuration for reading arguments either as positional
/// arguments on the CLI, or as line-delimited data on `stdin`.
///
/// This will greedily consume all remaining positional arguments. That is,
/// this is generally intended for use cases where a variable number of
/// arguments can be given.
///
/// When there are _zero_ positional arguments, then this will read lines from
/// stdin instead.
#[derive(Clone, Debug, Default)]
pub struct Arguments {
    positional: Vec<Argument<'static>>,
}

impl Arguments {
    /// Run the given function over each argument read from the CLI.
    ///
    /// If there were no positional arguments, then this tries to read them
    /// from stdin, one per line. Stated differently, the argument given
    /// to the closure is either always `Positional` or always `StdinLine`.
    /// You can never get a mix.
    ///
    /// Iteration stops when the closure returns false or returns an error.
    pub fn try_map(
        self,
        mut f: impl FnMut(Argument<'_>) -> anyhow::Result<bool>,
    ) -> anyhow::Result<()> {
        if !self.positional.is_empty() {
            for arg in self.positional {
                if !f(arg)? {
                    return Ok(());
                }
            }
            return Ok(());
        }
        std::io::stdin().lock().for_byte_line(|line| {
            f(Argument::StdinLine(line))
                .with_context(|| format!("line {} of <stdin>", line.number()))
        })
    }
}

impl Configurable for Arguments {
    fn configure(
        &mut self,
        _: &mut lexopt::Parser,
        arg: &mut lexopt::Arg,
    ) -> anyhow::Result<bool> {
        match *arg {
            lexopt::Arg::Value(ref mut v) => {
                let v = std::mem::take(v);
                let bytes = Vec::from_os_string(v).map_err(|arg| {
                    anyhow::anyhow!(
                        "period requires that positional arguments \
                         be valid UTF-8 in non-Unix environments, \
                         but `{arg:?}` is not valid UTF-8",
                    )
                })?;
                self.positional
                    .push(Argument::Positional(BString::from(bytes)));
            }
            _ => return Ok(false),
        }
        Ok(true)
    }
}

/// A generic argument parsed from either positional args on the CLI, or
/// as a single line from stdin.
#[derive(Clone, Debug)]
pub enum Argument<'a> {
    /// Just arbitrary bytes.
    ///
    /// On Windows, we require that this is valid UTF-8.
    Positional(BString),
    /// A line containing arbitrary ASCII compatible bytes.
    StdinLine(Line<'a>),
}

impl<'a> Argument<'a> {
    /// Return the raw argument value, without any line terminator.
    pub fn raw(&self) -> &BStr {
        match *self {
            Argument::Positional(ref arg) => arg.as_bstr(),
            Argument::StdinLine(line) => line.content(),
        }
    }

    /// Return the argument as a string with surrounding whitespace removed.
    pub fn to_str(&self) -> anyhow::Result<&str> {
        let raw = self.raw();
        let text = raw
            .to_str()
            .with_context(|| format!("`{raw}` is not valid UTF-8"))?;
        Ok(text.trim())
    }

    /// Parse this argument as a date.
    ///
    /// Anything accepted as a date mask is accepted here, with missing
    /// fields filled in. So `2024-03` is `2024-03-01`.
    pub fn to_date(&self, ctx: &Context) -> anyhow::Result<Date> {
        let text = self.to_str()?;
        mask::parse_date(ctx, text)
            .with_context(|| format!("invalid date `{text}`"))
    }
}

#[cfg(test)]
mod tests {
    use jiff::civil::date;

    use super::*;

    #[test]
    fn positional_dates() {
        let ctx = Context::new(date(2024, 3, 15));
        let arg = Argument::Positional(BString::from(" 2024-02 "));
        assert_eq!(arg.to_str().unwrap(), "2024-02");
        assert_eq!(arg.to_date(&ctx).unwrap(), date(2024, 2, 1));

        let arg = Argument::StdinLine(Line::new(1, b"03/01\r\n"));
        assert_eq!(arg.raw(), "03/01");
        assert_eq!(arg.to_date(&ctx).unwrap(), date(2024, 3, 1));
    }

    #[test]
    fn expression_takes_first_value_only() {
        let mut p = lexopt::Parser::from_args(Vec::<String>::new());
        let mut expr = Expression::default();
        assert!(expr.get().is_err());

        let mut arg = lexopt::Arg::Value("every 2 weeks".into());
        assert!(expr.configure(&mut p, &mut arg).unwrap());
        let mut arg = lexopt::Arg::Value("2024-06-10".into());
        assert!(!expr.configure(&mut p, &mut arg).unwrap());
        assert_eq!(expr.get().unwrap(), "every 2 weeks");

        let err = Expression::default().get().unwrap_err();
        insta::assert_snapshot!(err, @"missing required <expression>");
    }

    #[test]
    fn invalid_date() {
        let ctx = Context::new(date(2024, 3, 15));
        let arg = Argument::Positional(BString::from("whenever"));
        let err = arg.to_date(&ctx).unwrap_err();
        insta::assert_snapshot!(
            format!("{err:#}"),
            @"invalid date `whenever`: could not parse date mask: whenever"
        );
    }
}
