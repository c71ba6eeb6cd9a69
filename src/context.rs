use {
    anyhow::Context as _,
    jiff::{
        civil::{Date, Weekday},
        fmt::strtime,
    },
};

/// The default `strftime` format used when printing dates.
pub const DEFAULT_DATE_FORMAT: &str = "%Y-%m-%d";

/// The default `strftime` format used when printing datetimes.
///
/// Periods never have a time component, so this only shows up in log
/// records.
pub const DEFAULT_DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Everything about the environment that period computations depend on.
///
/// Nothing in the core reads ambient state. The current date, the first day
/// of the week and the date formats are all carried here and passed in
/// explicitly, which means the same expression always produces the same
/// interval for the same `Context`.
#[derive(Clone, Debug)]
pub struct Context {
    today: Date,
    week_start: Weekday,
    input_format: Option<String>,
    date_format: String,
}

impl Context {
    /// Create a new context anchored at the given date, with weeks starting
    /// on Sunday and the default date formats.
    pub fn new(today: Date) -> Context {
        Context {
            today,
            week_start: Weekday::Sunday,
            input_format: None,
            date_format: DEFAULT_DATE_FORMAT.to_string(),
        }
    }

    /// Set the weekday on which weeks start.
    ///
    /// This only affects how intervals with a duration in weeks are seeded.
    pub fn week_start(&mut self, weekday: Weekday) -> &mut Context {
        self.week_start = weekday;
        self
    }

    /// Set a `strptime` format that is tried before all of the built-in
    /// date mask formats.
    pub fn input_format(&mut self, format: Option<String>) -> &mut Context {
        self.input_format = format;
        self
    }

    /// Set the `strftime` format used when printing dates.
    pub fn date_format(&mut self, format: String) -> &mut Context {
        self.date_format = format;
        self
    }

    pub fn today(&self) -> Date {
        self.today
    }

    pub fn get_week_start(&self) -> Weekday {
        self.week_start
    }

    pub fn get_input_format(&self) -> Option<&str> {
        self.input_format.as_deref()
    }

    /// Render a date using this context's output format.
    pub fn format_date(&self, date: Date) -> anyhow::Result<String> {
        strtime::format(&self.date_format, date).with_context(|| {
            format!(
                "failed to format {date} with `{format}`",
                format = self.date_format,
            )
        })
    }
}
