use std::io::Write;

use crate::{
    args::{self, Example, Usage, flags, positional},
    context::Context,
    duration::Duration,
    expr,
    interval::Interval,
};

const PAGE: args::Page = args::Page {
    about: "Show the interval described by a period expression.",
    details: r#"
This accepts one or more expressions as positional arguments. When no
positional arguments are given, then line delimited expressions are read from
stdin.

For each expression, this prints the start and end of the interval along with
the length of each period. Any of these may be missing. An expression without
a start has its first period picked when it's used to find a date. An
expression without an end goes on forever. An expression without a duration
is a single fixed window.
"#,
    synopsis: &[
        "period parse <expression>...",
        "period parse < line delimited <expression>",
    ],
    examples: &[
        Example::new(
            "Show a recurring interval with bounds",
            "period parse 'every 2 weeks from 2024 to 2024-06'",
            "start: 2024-01-01, end: 2024-06-01, duration: 2 weeks",
        ),
        Example::new(
            "Relative windows are anchored at the current date",
            "PERIOD_TODAY=2024-03-15 period parse 'last month'",
            "start: 2024-02-01, end: 2024-03-01, duration: none",
        )
        .long_only(),
        Example::new(
            "Print JSON instead",
            "period parse --json quarterly",
            r#"{"expression":"quarterly","start":null,"end":null,"duration":{"unit":"months","quantity":3}}"#,
        )
        .long_only(),
    ],
};

pub fn run(p: &mut lexopt::Parser) -> anyhow::Result<()> {
    let mut config = Config::default();
    let mut date_flags = flags::ContextFlags::default();
    let mut exprs = positional::Arguments::default();
    args::configure(
        p,
        &PAGE,
        &mut [&mut config, &mut date_flags, &mut exprs],
    )?;

    let ctx = date_flags.context();
    let mut wtr = std::io::stdout().lock();
    exprs.try_map(|arg| {
        let text = arg.to_str()?;
        let interval = expr::parse(&ctx, text)?;
        let desc = Description::new(&ctx, text, &interval)?;
        if config.json {
            serde_json::to_writer(&mut wtr, &desc)?;
            writeln!(wtr)?;
        } else {
            desc.write(&mut wtr)?;
        }
        Ok(true)
    })?;
    Ok(())
}

#[derive(Debug, Default)]
struct Config {
    json: bool,
}

impl args::Configurable for Config {
    fn configure(
        &mut self,
        _: &mut lexopt::Parser,
        arg: &mut lexopt::Arg,
    ) -> anyhow::Result<bool> {
        match *arg {
            lexopt::Arg::Long("json") => {
                self.json = true;
            }
            _ => return Ok(false),
        }
        Ok(true)
    }

    fn usage(&self) -> &[Usage] {
        const JSON: Usage = Usage::flag(
            "--json",
            "Print each interval as a JSON object on its own line.",
            r#"
Print each interval as a JSON object on its own line.

Each object has the keys `expression`, `start`, `end` and `duration`. Dates
are strings in the output format and missing values are `null`. A duration is
an object with a `unit` (one of `days`, `weeks`, `months` or `years`) and a
`quantity`.
"#,
        );
        &[positional::EXPRESSION, JSON]
    }
}

/// The printable summary of a parsed interval.
#[derive(Debug)]
struct Description<'a> {
    expression: &'a str,
    start: Option<String>,
    end: Option<String>,
    duration: Option<Duration>,
}

impl<'a> Description<'a> {
    fn new(
        ctx: &Context,
        expression: &'a str,
        interval: &Interval,
    ) -> anyhow::Result<Description<'a>> {
        let start = interval.start().map(|d| ctx.format_date(d)).transpose()?;
        let end = interval.end().map(|d| ctx.format_date(d)).transpose()?;
        let duration = interval.duration();
        Ok(Description { expression, start, end, duration })
    }

    fn write<W: Write>(&self, mut wtr: W) -> anyhow::Result<()> {
        let start = self.start.as_deref().unwrap_or("none");
        let end = self.end.as_deref().unwrap_or("none");
        let duration = match self.duration {
            Some(duration) => duration.to_string(),
            None => "none".to_string(),
        };
        writeln!(wtr, "start: {start}, end: {end}, duration: {duration}")?;
        Ok(())
    }
}

impl<'a> serde::Serialize for Description<'a> {
    fn serialize<S: serde::Serializer>(
        &self,
        s: S,
    ) -> Result<S::Ok, S::Error> {
        use serde::ser::SerializeStruct;

        let mut state = s.serialize_struct("Description", 4)?;
        state.serialize_field("expression", self.expression)?;
        state.serialize_field("start", &self.start)?;
        state.serialize_field("end", &self.end)?;
        state.serialize_field("duration", &self.duration)?;
        state.end()
    }
}
