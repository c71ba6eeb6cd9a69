use std::io::Write;

use anyhow::Context as _;

use crate::{
    args::{self, Example, Usage, flags, positional},
    error::DateError,
    expr,
    interval::Location,
    mask,
};

const PAGE: args::Page = args::Page {
    about: "Generate the sequence of periods described by a period expression.",
    details: r#"
Periods are generated in chronological order, starting with the period that
contains `--from`. When `--from` isn't given, the sequence starts at the
beginning of the expression, or at the current date if the expression has no
start.

Unless the expression has an end or the `-c/--count` or `-u/--until` flags
are used, this command will generate periods until the maximum supported
date is reached. In lieu of `-c/--count`, users may also choose to use
programs like `head` to limit the output.

An expression without a duration, like `2024` or `since 2024-03`, is a single
fixed window. It's printed on its own.
"#,
    synopsis: &["period seq <expression>"],
    examples: &[
        Example::new(
            "Print the months from January through May 2023",
            "period seq 'monthly from 2023 to 2023-06'",
            "[2023-01-01, 2023-02-01)\n\
             [2023-02-01, 2023-03-01)\n\
             [2023-03-01, 2023-04-01)\n\
             [2023-04-01, 2023-05-01)\n\
             [2023-05-01, 2023-06-01)",
        ),
        Example::new(
            "Print the next three fortnights, with weeks starting on Sunday",
            "PERIOD_TODAY=2024-03-15 period seq -c 3 'every 2 weeks'",
            "[2024-03-10, 2024-03-24)\n\
             [2024-03-24, 2024-04-07)\n\
             [2024-04-07, 2024-04-21)",
        )
        .long_only(),
        Example::new(
            "Months that start on the last day of a month stay on month ends",
            "period seq -c 3 'every month from 2024-01-31'",
            "[2024-01-31, 2024-02-29)\n\
             [2024-02-29, 2024-03-31)\n\
             [2024-03-31, 2024-04-30)",
        )
        .long_only(),
        Example::new(
            "Print the quarters starting no later than the end of the year",
            "period seq quarterly --from 2024-02 --until 2024-12-31",
            "[2024-01-01, 2024-04-01)\n\
             [2024-04-01, 2024-07-01)\n\
             [2024-07-01, 2024-10-01)\n\
             [2024-10-01, 2025-01-01)",
        )
        .long_only(),
    ],
};

pub fn run(p: &mut lexopt::Parser) -> anyhow::Result<()> {
    let mut expression = positional::Expression::default();
    let mut config = Config::default();
    let mut date_flags = flags::ContextFlags::default();
    args::configure(
        p,
        &PAGE,
        &mut [&mut expression, &mut config, &mut date_flags],
    )?;

    let ctx = date_flags.context();
    let week_start = ctx.get_week_start();
    let mut interval = expr::parse(&ctx, expression.get()?)?;
    let until = match config.terminates {
        Termination::Until(ref until) => Some(
            mask::parse_date(&ctx, until)
                .with_context(|| format!("invalid -u/--until date `{until}`"))?,
        ),
        _ => None,
    };
    let anchor = match config.from {
        Some(ref from) => mask::parse_date(&ctx, from)
            .with_context(|| format!("invalid --from date `{from}`"))?,
        None => interval.start().unwrap_or(ctx.today()),
    };

    let mut location = interval.find_period(anchor, week_start, None)?;
    if location == Location::NoPeriod {
        // A date before the start of the interval just means the sequence
        // starts with the first period.
        if let Some(start) = interval.start().filter(|&start| anchor < start) {
            location = interval.find_period(start, week_start, None)?;
        }
    }
    if location == Location::NoPeriod {
        log::debug!("no period contains {anchor}, so the sequence is empty");
        return Ok(());
    }

    let mut wtr = std::io::stdout().lock();
    let mut emitted = 0;
    while let Some(period) = interval.period()? {
        if let Termination::Count(count) = config.terminates {
            if emitted >= count {
                break;
            }
        }
        if until.is_some_and(|until| period.start > until) {
            break;
        }
        writeln!(wtr, "{}", period.render(&ctx)?)?;
        emitted += 1;

        if interval.duration().is_none() {
            break;
        }
        match interval.advance() {
            Ok(()) => {}
            Err(err @ DateError::Arithmetic { .. }) => {
                log::debug!("stopping sequence: {err}");
                break;
            }
            Err(err) => return Err(err.into()),
        }
    }
    Ok(())
}

#[derive(Debug, Default)]
struct Config {
    from: Option<String>,
    terminates: Termination,
}

impl args::Configurable for Config {
    fn configure(
        &mut self,
        p: &mut lexopt::Parser,
        arg: &mut lexopt::Arg,
    ) -> anyhow::Result<bool> {
        use lexopt::Arg::*;

        match *arg {
            Short('u') | Long("until") => {
                anyhow::ensure!(
                    !matches!(self.terminates, Termination::Count(_)),
                    "the -u/--until flag cannot be used with -c/--count",
                );
                self.terminates =
                    Termination::Until(args::value(p, "-u/--until")?);
            }
            Short('c') | Long("count") => {
                anyhow::ensure!(
                    !matches!(self.terminates, Termination::Until(_)),
                    "the -c/--count flag cannot be used with -u/--until",
                );
                self.terminates =
                    Termination::Count(args::value(p, "-c/--count")?);
            }
            Long("from") => {
                self.from = Some(args::value(p, "--from")?);
            }
            _ => return Ok(false),
        }
        Ok(true)
    }

    fn usage(&self) -> &[Usage] {
        const COUNT: Usage = Usage::flag(
            "-c, --count <number>",
            "Generate at most this many periods.",
            r#"
Generate at most this many periods.

This cannot be used with -u/--until.
"#,
        );
        const UNTIL: Usage = Usage::flag(
            "-u, --until <date>",
            "Stop before the first period starting after this date.",
            r#"
Stop before the first period starting after this date.

Every period generated starts on or before this date. The last one may still
end after it.

This cannot be used with -c/--count.
"#,
        );
        const FROM: Usage = Usage::flag(
            "--from <date>",
            "Start with the period containing this date.",
            r#"
Start with the period containing this date.

When this date is before the start of the expression, the sequence starts at
the beginning of the expression instead. When it's after the end of the
expression, nothing is generated.

For expressions without a start, this also determines where periods are
aligned. For example, `every 2 weeks` starts its periods on a different
Sunday depending on the date given here.
"#,
        );
        &[COUNT, FROM, UNTIL]
    }
}

/// How a sequence of periods ends, apart from the end of the expression.
#[derive(Debug, Default)]
enum Termination {
    #[default]
    Never,
    Count(usize),
    Until(String),
}
