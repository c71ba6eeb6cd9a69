use std::{
    fmt::{Debug, Display, Write},
    str::FromStr,
};

use {
    anyhow::Context,
    lexopt::{Arg, Parser, ValueExt},
};

pub mod flags;
pub mod positional;

pub trait Configurable: Debug {
    fn configure(
        &mut self,
        p: &mut Parser,
        arg: &mut Arg,
    ) -> anyhow::Result<bool>;

    /// A list of `Usage` documentation for the flags/arguments that this
    /// implementation parses.
    ///
    /// This is optional because some implementations of this trait are
    /// pretty generic, and so callers should provide more concrete docs.
    fn usage(&self) -> &[Usage] {
        &[]
    }
}

/// Hands every argument left in `p` to the first of `targets` that accepts
/// it.
///
/// Targets are asked in order, so a command whose first positional argument
/// is a period expression lists `positional::Expression` first. It takes the
/// first value and leaves the rest for whatever follows it.
///
/// `-h` and `--help` render the given help page with the usage docs of all
/// targets. `--version` prints the version.
pub fn configure(
    p: &mut Parser,
    page: &Page,
    targets: &mut [&mut dyn Configurable],
) -> anyhow::Result<()> {
    while let Some(arg) = p.next()? {
        // Long flag names borrow from the parser, which every target needs
        // mutable access to. So they get copied somewhere else to live.
        let long: String;
        let mut arg = match arg {
            Arg::Short('h') => {
                return Err(Help::page(page, false, targets).into());
            }
            Arg::Long("help") => {
                return Err(Help::page(page, true, targets).into());
            }
            Arg::Long("version") => return Err(Version.into()),
            Arg::Long(name) => {
                long = name.to_string();
                Arg::Long(&long)
            }
            Arg::Short(c) => Arg::Short(c),
            Arg::Value(value) => Arg::Value(value),
        };
        let mut recognized = false;
        for t in targets.iter_mut() {
            if t.configure(p, &mut arg)? {
                recognized = true;
                break;
            }
        }
        if !recognized {
            return Err(arg.unexpected().into());
        }
    }
    Ok(())
}

/// Parses the next argument as the name of a command.
///
/// When there are no arguments at all, the given usage is returned as an
/// ordinary error. So it's printed to stderr and the process fails. Asking
/// for it with `-h/--help` prints it to stdout instead.
pub fn command(p: &mut Parser, usage: &str) -> anyhow::Result<String> {
    let usage = usage.trim();
    let Some(arg) = p.next()? else { anyhow::bail!("{usage}") };
    match arg {
        Arg::Value(cmd) => Ok(cmd.string()?),
        Arg::Short('h') | Arg::Long("help") => {
            Err(Help(usage.to_string()).into())
        }
        Arg::Long("version") => Err(Version.into()),
        arg => Err(arg.unexpected().into()),
    }
}

/// Parses the value of the flag just seen into `T`. Any error messages will
/// include the given flag name in them.
pub fn value<T>(p: &mut Parser, flag_name: &'static str) -> anyhow::Result<T>
where
    T: FromStr,
    <T as FromStr>::Err: Display + Debug + Send + Sync + 'static,
{
    // `anyhow::Error` doesn't impl `std::error::Error`, and that's what the
    // `FromStr` impls in this crate use. Hence `Error::msg`.
    let value = p.value().and_then(|v| v.string()).context(flag_name)?;
    value.parse().map_err(|err| anyhow::Error::msg(err).context(flag_name))
}

/// The help output of a single command.
///
/// `-h` shows the `about` text, the synopsis, the examples that aren't
/// marked `long_only` and one line per argument and flag. `--help` adds the
/// `details`, every example and the long description of each argument and
/// flag.
#[derive(Clone, Copy, Debug)]
pub struct Page {
    pub about: &'static str,
    pub details: &'static str,
    /// One line per way of invoking the command, without the indentation.
    pub synopsis: &'static [&'static str],
    pub examples: &'static [Example],
}

impl Page {
    fn render(&self, long: bool, args: &[Usage], flags: &[Usage]) -> String {
        let mut out = String::new();
        writeln!(out, "{}", self.about.trim()).unwrap();
        if long && !self.details.trim().is_empty() {
            writeln!(out, "\n{}", self.details.trim()).unwrap();
        }

        writeln!(out, "\nUSAGE:").unwrap();
        for line in self.synopsis.iter() {
            writeln!(out, "    {line}").unwrap();
        }
        writeln!(out, "\nTIP:").unwrap();
        writeln!(out, "    use -h for short docs and --help for long docs")
            .unwrap();

        let mut examples =
            self.examples.iter().filter(|ex| long || !ex.long_only).peekable();
        if examples.peek().is_some() {
            writeln!(out, "\nEXAMPLES:").unwrap();
            for (i, ex) in examples.enumerate() {
                if i > 0 {
                    writeln!(out).unwrap();
                }
                ex.render(&mut out);
            }
        }

        let (args, flags) = if long {
            (Usage::long(args), Usage::long(flags))
        } else {
            (Usage::short(args), Usage::short(flags))
        };
        if !args.is_empty() {
            write!(out, "\nREQUIRED ARGUMENTS:\n{args}").unwrap();
        }
        write!(out, "\nOPTIONS:\n{flags}").unwrap();
        out.trim_end().to_string()
    }
}

/// A shell session shown in a help page.
#[derive(Clone, Copy, Debug)]
pub struct Example {
    about: &'static str,
    shell: &'static str,
    output: &'static str,
    long_only: bool,
}

impl Example {
    /// Create an example that runs `shell` and prints `output`. `about` is
    /// a sentence introducing it.
    pub const fn new(
        about: &'static str,
        shell: &'static str,
        output: &'static str,
    ) -> Example {
        Example { about, shell, output, long_only: false }
    }

    /// Only show this example in the `--help` output.
    pub const fn long_only(self) -> Example {
        Example { long_only: true, ..self }
    }

    fn render(&self, out: &mut String) {
        let wrap_opts = textwrap::Options::new(79)
            .initial_indent("    ")
            .subsequent_indent("    ");
        let about = self.about.trim().replace("\n", " ");
        writeln!(out, "{}:\n", textwrap::fill(&about, &wrap_opts)).unwrap();
        writeln!(out, "        $ {}", self.shell).unwrap();
        for line in self.output.trim().lines() {
            writeln!(out, "        {line}").unwrap();
        }
    }
}

/// A type for expressing the documentation of a flag.
///
/// The `Usage::short` and `Usage::long` functions take a slice of usages and
/// format them into a human readable display. It does simple word wrapping and
/// column alignment for you.
#[derive(Clone, Copy, Debug)]
pub struct Usage {
    /// Whether this is docs for a flag (optional) or an argument (required).
    pub flag: bool,
    /// The format of the flag, for example, `-c, --count <number>`.
    pub format: &'static str,
    /// A very short description of the flag. Should fit on one line along with
    /// the format.
    pub short: &'static str,
    /// A longer form description of the flag. May be multiple paragraphs long
    /// (but doesn't have to be).
    pub long: &'static str,
}

impl Usage {
    /// Create a new usage for an optional flag from the given components.
    pub const fn flag(
        format: &'static str,
        short: &'static str,
        long: &'static str,
    ) -> Usage {
        Usage { flag: true, format, short, long }
    }

    /// Create a new usage for an required argument from the given components.
    pub const fn arg(
        format: &'static str,
        short: &'static str,
        long: &'static str,
    ) -> Usage {
        Usage { flag: false, format, short, long }
    }

    /// Format a two column table from the given usages, where the first
    /// column is the format and the second column is the short description.
    pub fn short(usages: &[Usage]) -> String {
        const MIN_SPACE: usize = 2;

        let mut result = String::new();
        let max_len = match usages.iter().map(|u| u.format.len()).max() {
            None => return result,
            Some(len) => len,
        };
        for usage in usages.iter() {
            let padlen = MIN_SPACE + (max_len - usage.format.len());
            let padding = " ".repeat(padlen);
            writeln!(result, "    {}{}{}", usage.format, padding, usage.short)
                .unwrap();
        }
        result
    }

    /// Print the format of each usage and its long description below the
    /// format. This also does appropriate indentation with the assumption that
    /// it is in an OPTIONS section of a bigger usage message.
    pub fn long(usages: &[Usage]) -> String {
        let wrap_opts = textwrap::Options::new(79)
            .initial_indent("        ")
            .subsequent_indent("        ");
        let mut result = String::new();
        for (i, usage) in usages.iter().enumerate() {
            if i > 0 {
                writeln!(result, "").unwrap();
            }
            writeln!(result, "    {}", usage.format).unwrap();
            for (i, paragraph) in usage.long.trim().split("\n\n").enumerate() {
                if i > 0 {
                    result.push('\n');
                }
                let flattened = paragraph.replace("\n", " ");
                for line in textwrap::wrap(&flattened, &wrap_opts) {
                    result.push_str(&line);
                    result.push('\n');
                }
            }
        }
        result
    }

    /// The key flags are listed by: the long name when there is one.
    fn sort_key(&self) -> &'static str {
        self.format.split_once(", ").map_or(self.format, |(_, long)| long)
    }
}

/// An error type indicating that the error is a `-h/--help` message.
///
/// In other words, it should be printed to stdout with a success exit code.
///
/// We sniff this out in `main` via downcasting an `anyhow::Error`.
#[derive(Debug)]
pub struct Help(String);

impl Help {
    const USAGE: Usage = Usage::flag(
        "-h, --help",
        "This flag prints the help output for period.",
        r#"
This flag prints the help output for period.

Unlike most other flags, the behavior of the short flag, -h, and the long flag,
--help, is different. The short flag will show a condensed help output while
the long flag will show a verbose help output. The verbose help output has
complete documentation, where as the condensed help output will show only a
single line for every flag.
"#,
    );

    /// Render a command's help page with the usage docs of its targets.
    ///
    /// Arguments keep the order their targets were given in, since that's
    /// the order they appear on the command line. Flags are sorted.
    fn page(
        page: &Page,
        long: bool,
        targets: &[&mut dyn Configurable],
    ) -> Help {
        let mut args = vec![];
        let mut flags = vec![Help::USAGE, Version::USAGE];
        for t in targets.iter() {
            for &usage in t.usage().iter() {
                if usage.flag {
                    flags.push(usage);
                } else {
                    args.push(usage);
                }
            }
        }
        flags.sort_by_key(Usage::sort_key);
        Help(page.render(long, &args, &flags))
    }
}

impl std::fmt::Display for Help {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        std::fmt::Display::fmt(&self.0, f)
    }
}

impl std::error::Error for Help {}

/// An error type indicating that the error is a `--version` message.
///
/// In other words, it should be printed to stdout with a success exit code.
///
/// We sniff this out in `main` via downcasting an `anyhow::Error`.
#[derive(Debug)]
pub struct Version;

impl Version {
    const USAGE: Usage = Usage::flag(
        "--version",
        "This flag prints the version of period.",
        r#"
This flag prints the version of period.
"#,
    );
}

impl std::fmt::Display for Version {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        let semver = option_env!("CARGO_PKG_VERSION").unwrap_or("N/A");
        let version = match option_env!("PERIOD_BUILD_GIT_HASH") {
            None => semver.to_string(),
            Some(hash) => format!("{semver} (rev {hash})"),
        };
        write!(f, "period {version}")
    }
}

impl std::error::Error for Version {}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: Page = Page {
        about: "Do a thing with a date.",
        details: "
The thing is done once per date.
",
        synopsis: &["period thing <date>"],
        examples: &[
            Example::new("Do it once", "period thing 2024", "done"),
            Example::new(
                "Do it twice, one per line",
                "period thing 2024 2025",
                "done\ndone",
            )
            .long_only(),
        ],
    };

    #[derive(Debug)]
    struct Thing;

    impl Configurable for Thing {
        fn configure(
            &mut self,
            _: &mut Parser,
            _: &mut Arg,
        ) -> anyhow::Result<bool> {
            Ok(false)
        }

        fn usage(&self) -> &[Usage] {
            const DATE: Usage = Usage::arg("<date>", "A date.", "A date.");
            const LOUD: Usage = Usage::flag(
                "-l, --loud",
                "Do it loudly.",
                "Do it loudly.\n\nVery loudly.",
            );
            &[DATE, LOUD]
        }
    }

    #[test]
    fn short_page() {
        let mut thing = Thing;
        let targets: [&mut dyn Configurable; 1] = [&mut thing];
        let help = Help::page(&PAGE, false, &targets);
        insta::assert_snapshot!(help, @r"
        Do a thing with a date.

        USAGE:
            period thing <date>

        TIP:
            use -h for short docs and --help for long docs

        EXAMPLES:
            Do it once:

                $ period thing 2024
                done

        REQUIRED ARGUMENTS:
            <date>  A date.

        OPTIONS:
            -h, --help  This flag prints the help output for period.
            -l, --loud  Do it loudly.
            --version   This flag prints the version of period.
        ");
    }

    #[test]
    fn long_page() {
        let mut thing = Thing;
        let targets: [&mut dyn Configurable; 1] = [&mut thing];
        let help = Help::page(&PAGE, true, &targets).to_string();
        assert!(help.contains("\n\nThe thing is done once per date.\n\n"));
        assert!(help.contains(
            "    Do it twice, one per line:\n\n\
             \x20       $ period thing 2024 2025\n\
             \x20       done\n\
             \x20       done\n"
        ));
        assert!(help.contains("    <date>\n        A date.\n"));
        assert!(help.contains(
            "    -l, --loud\n        Do it loudly.\n\n        Very loudly.\n"
        ));
        assert!(help.ends_with("This flag prints the version of period."));
    }
}
