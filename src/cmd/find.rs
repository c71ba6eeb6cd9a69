use std::io::Write;

use anyhow::Context as _;

use crate::{
    args::{self, Example, Usage, flags, positional},
    expr,
    interval::{Location, PeriodState},
    style::Theme,
};

const PAGE: args::Page = args::Page {
    about: "Find the period containing each of a sequence of dates.",
    details: r#"
The first positional argument is a period expression. Every positional
argument after it is a date. When no dates are given, then line delimited
dates are read from stdin.

For each date, this prints the date followed by a tab and the period that
contains it. When no period contains the date, `none` is printed instead.
This happens when the date is before the start of the expression or after
its end.

Finding a period moves the interval forward, so dates must be given in
chronological order. Repeated dates are fine.
"#,
    synopsis: &[
        "period find <expression> <date>...",
        "period find <expression> < line delimited <date>",
    ],
    examples: &[
        Example::new(
            "Find which fortnight some dates fall into",
            "period find 'every 2 weeks from 2024-06-02' 2024-06-10 2024-06-20",
            "2024-06-10\t[2024-06-02, 2024-06-16)\n\
             2024-06-20\t[2024-06-16, 2024-06-30)",
        ),
        Example::new(
            "Group the dates in a file by month, showing the month that was \
             left behind each time a new one is entered",
            "period find --previous monthly < dates",
            "2024-01-15\t[2024-01-01, 2024-02-01)\t-\n\
             2024-01-20\t[2024-01-01, 2024-02-01)\t-\n\
             2024-03-02\t[2024-03-01, 2024-04-01)\t[2024-01-01, 2024-02-01)",
        )
        .long_only(),
    ],
};

pub fn run(p: &mut lexopt::Parser) -> anyhow::Result<()> {
    let mut expression = positional::Expression::default();
    let mut config = Config::default();
    let mut date_flags = flags::ContextFlags::default();
    let mut dates = positional::Dates::default();
    args::configure(
        p,
        &PAGE,
        &mut [&mut expression, &mut config, &mut date_flags, &mut dates],
    )?;

    let ctx = date_flags.context();
    let mut interval = expr::parse(&ctx, expression.get()?)?;
    let mut wtr = std::io::stdout().lock();
    let mut last = None;
    dates.try_map(&ctx, |date| {
        if let Some(last) = last {
            anyhow::ensure!(
                last <= date,
                "dates must be given in chronological order, \
                 but {date} was given after {last}",
            );
        }
        last = Some(date);

        let mut previous = PeriodState::default();
        let location = interval
            .find_period(date, ctx.get_week_start(), Some(&mut previous))
            .with_context(|| format!("failed to find period for {date}"))?;
        write!(wtr, "{}\t", ctx.format_date(date)?)?;
        match location {
            Location::InPeriod => {
                let period = interval.period()?.with_context(|| {
                    format!("no current period after finding {date}")
                })?;
                let rendered = period.render(&ctx)?;
                write!(wtr, "{}", Theme::stdout().highlight(rendered))?;
            }
            Location::NoPeriod => {
                write!(wtr, "none")?;
            }
        }
        if config.previous {
            match previous.period() {
                Some(period) => {
                    let rendered = period.render(&ctx)?;
                    write!(wtr, "\t{rendered}")?;
                }
                None => write!(wtr, "\t-")?,
            }
        }
        writeln!(wtr)?;
        Ok(true)
    })?;
    Ok(())
}

#[derive(Debug, Default)]
struct Config {
    previous: bool,
}

impl args::Configurable for Config {
    fn configure(
        &mut self,
        _: &mut lexopt::Parser,
        arg: &mut lexopt::Arg,
    ) -> anyhow::Result<bool> {
        match *arg {
            lexopt::Arg::Short('p') | lexopt::Arg::Long("previous") => {
                self.previous = true;
            }
            _ => return Ok(false),
        }
        Ok(true)
    }

    fn usage(&self) -> &[Usage] {
        const PREVIOUS: Usage = Usage::flag(
            "-p, --previous",
            "Also print the period that was left behind.",
            r#"
Also print the period that was left behind.

When a date moves the interval forward to a new period, the period it was in
before is printed in a third column. When the interval didn't move, `-` is
printed instead.
"#,
        );
        &[PREVIOUS]
    }
}
