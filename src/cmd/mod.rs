mod find;
mod parse;
mod seq;

const USAGE: &'static str = "\
A simple utility for computing calendar periods from expressions like
`every 2 weeks`, `last month` or `monthly from 2023 to 2023-06`.

USAGE:
    period <command> ...

COMMANDS:
    find   Find the period containing each of a sequence of dates
    parse  Show the interval described by an expression
    seq    Generate the sequence of periods described by an expression
";

pub fn run(p: &mut lexopt::Parser) -> anyhow::Result<()> {
    let cmd = crate::args::command(p, USAGE)?;
    match &*cmd {
        "find" => find::run(p),
        "parse" => parse::run(p),
        "seq" => seq::run(p),
        unk => anyhow::bail!("unrecognized command '{}'", unk),
    }
}
