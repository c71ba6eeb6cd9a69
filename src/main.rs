use std::{env, io::Write, process::ExitCode, sync::LazyLock};

use {
    anyhow::Context,
    jiff::{
        Zoned,
        civil::{Date, Weekday},
        tz::TimeZone,
    },
};

mod args;
mod cmd;
mod context;
mod duration;
mod error;
mod expr;
mod interval;
mod logger;
mod mask;
mod parse;
mod specifier;
mod style;

/// The date that relative expressions like `last month` are anchored at.
static TODAY: LazyLock<Date> = LazyLock::new(|| {
    env_or(
        "PERIOD_TODAY",
        |val| {
            val.parse::<Date>().context(
                "`PERIOD_TODAY` environment variable is not a valid \
                 `YYYY-MM-DD` date",
            )
        },
        || Zoned::now().date(),
    )
});

/// The default start of the week when `--week-start` isn't given.
static WEEK_START: LazyLock<Weekday> = LazyLock::new(|| {
    env_or(
        "PERIOD_WEEK_START",
        |val| {
            let weekday: args::flags::Weekday = val.parse()?;
            Ok(weekday.get())
        },
        || Weekday::Sunday,
    )
});

/// The default input format when `--input-format` isn't given.
static INPUT_FORMAT: LazyLock<Option<String>> = LazyLock::new(|| {
    env_or("PERIOD_INPUT_FORMAT", |val| Ok(Some(val.to_string())), || None)
});

/// The default output format when `-f/--format` isn't given.
static DATE_FORMAT: LazyLock<String> = LazyLock::new(|| {
    env_or(
        "PERIOD_DATE_FORMAT",
        |val| Ok(val.to_string()),
        || context::DEFAULT_DATE_FORMAT.to_string(),
    )
});

/// Then, as it was, then again it will be.
fn main() -> ExitCode {
    let err = match run() {
        Ok(code) => return code,
        Err(err) => err,
    };
    if let Some(help) = err.root_cause().downcast_ref::<args::Help>() {
        writeln!(&mut std::io::stdout(), "{help}").unwrap();
        return ExitCode::SUCCESS;
    }
    if let Some(version) = err.root_cause().downcast_ref::<args::Version>() {
        writeln!(&mut std::io::stdout(), "{version}").unwrap();
        return ExitCode::SUCCESS;
    }
    // Look for a broken pipe error. In this case, we generally want
    // to exit "gracefully" with a success exit code. This matches
    // existing Unix convention. We need to handle this explicitly
    // since the Rust runtime doesn't ask for PIPE signals, and thus
    // we get an I/O error instead. Traditional C Unix applications
    // quit by getting a PIPE signal that they don't handle, and thus
    // the unhandled signal causes the process to unceremoniously
    // terminate.
    for cause in err.chain() {
        if let Some(err) = cause.downcast_ref::<std::io::Error>() {
            if err.kind() == std::io::ErrorKind::BrokenPipe {
                return ExitCode::from(0);
            }
        }
        // `serde_json` for whatever reason swallows any
        // `std::io::Error` it may hit when serializing JSON
        // via `to_writer`. So to deal with broken pipe errors,
        // we need to explicitly check it.
        if let Some(err) = cause.downcast_ref::<serde_json::Error>() {
            if let Some(kind) = err.io_error_kind() {
                if kind == std::io::ErrorKind::BrokenPipe {
                    return ExitCode::from(0);
                }
            }
        }
    }
    if std::env::var("RUST_BACKTRACE").map_or(false, |v| v == "1")
        && std::env::var("RUST_LIB_BACKTRACE").map_or(true, |v| v == "1")
    {
        writeln!(&mut std::io::stderr(), "{:?}", err).unwrap();
    } else {
        writeln!(&mut std::io::stderr(), "{:#}", err).unwrap();
    }
    ExitCode::from(1)
}

fn run() -> anyhow::Result<ExitCode> {
    let rustlog = env::var("PERIOD_LOG").unwrap_or_else(|_| String::new());
    let level = match &*rustlog {
        "" | "off" => log::LevelFilter::Off,
        "error" => log::LevelFilter::Error,
        "warn" => log::LevelFilter::Warn,
        "info" => log::LevelFilter::Info,
        "debug" => log::LevelFilter::Debug,
        "trace" => log::LevelFilter::Trace,
        unk => anyhow::bail!("unrecognized log level '{}'", unk),
    };
    log::set_max_level(level);
    // Finding the system time zone can itself emit log messages, so the
    // logger starts out writing timestamps in UTC and only switches to local
    // time once the time zone is known.
    let logger = logger::Logger::init()?;
    logger.set_time_zone(TimeZone::system());
    cmd::run(&mut lexopt::Parser::from_env())?;
    Ok(ExitCode::SUCCESS)
}

/// Reads a setting from the environment, falling back to a default when
/// the variable isn't set or its value is invalid.
///
/// An invalid value is never fatal. It's reported as a warning instead.
fn env_or<T: std::fmt::Debug>(
    name: &str,
    parse: impl FnOnce(&str) -> anyhow::Result<T>,
    default: impl FnOnce() -> T,
) -> T {
    match read_env(name).and_then(|val| val.as_deref().map(parse).transpose())
    {
        Ok(Some(val)) => {
            log::trace!("using `{val:?}` from `{name}` environment variable");
            val
        }
        Ok(None) => {
            let val = default();
            log::trace!(
                "`{name}` environment variable not set, using `{val:?}`",
            );
            val
        }
        Err(err) => {
            let val = default();
            log::warn!("reading `{name}` failed, using `{val:?}`: {err:#}");
            val
        }
    }
}

fn read_env(name: &str) -> anyhow::Result<Option<String>> {
    let Some(val) = std::env::var_os(name) else { return Ok(None) };
    let Some(val) = val.to_str() else {
        anyhow::bail!(
            "`{name}` environment variable is not valid UTF-8: {val:?}"
        )
    };
    Ok(Some(val.to_string()))
}
