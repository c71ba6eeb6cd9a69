use jiff::{civil::Date, fmt::strtime};

use crate::{context::Context, error::DateError};

/// The `strptime` formats tried, in order, when parsing a date mask.
///
/// A configured input format is always tried before any of these. The
/// first format that consumes the entire input wins, which is why the
/// two-digit year forms come before their four-digit counterparts: `%y`
/// only ever matches two digits.
const FORMATS: &[&str] = &[
    "%y/%m/%d", "%Y/%m/%d", "%m/%d", "%Y/%m", "%y.%m.%d", "%Y.%m.%d", "%m.%d",
    "%Y.%m", "%y-%m-%d", "%Y-%m-%d", "%m-%d", "%Y-%m", "%a", "%A", "%b", "%B",
    "%Y",
];

/// A date where any of the year, month or day may be missing.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub struct PartialDate {
    pub year: Option<i16>,
    pub month: Option<i8>,
    pub day: Option<i8>,
}

/// Parse a partial date from a mask like `2024`, `2024-05`, `05/01` or
/// `jan`.
///
/// Weekday names are accepted, but since a weekday doesn't pin down any
/// calendar field, they come back as an entirely empty partial date.
pub fn parse_mask(ctx: &Context, text: &str) -> Result<PartialDate, DateError> {
    // Month and weekday names are stored capitalized, and expression
    // tokens are always lowercase by the time they get here.
    let titled = title_case(text);
    let formats = ctx.get_input_format().into_iter().chain(FORMATS.iter().copied());
    for format in formats {
        match strtime::parse(format, &titled) {
            Ok(tm) => {
                let partial = PartialDate {
                    year: tm.year(),
                    month: tm.month(),
                    day: tm.day(),
                };
                log::trace!("parsed date mask `{text}` with `{format}`");
                return Ok(partial);
            }
            Err(err) => {
                log::trace!("date mask `{text}` does not match `{format}`: {err}");
            }
        }
    }
    Err(DateError::Mask { text: text.to_string() })
}

/// Parse a complete date from a date mask.
///
/// Missing days default to the first of the month and a missing month
/// defaults to January. A missing year is the current year, unless the mask
/// names a month that hasn't happened yet this year, in which case the year
/// before is used. So `12/24` parsed in March 2024 is `2023-12-24`.
pub fn parse_date(ctx: &Context, text: &str) -> Result<Date, DateError> {
    let partial = parse_mask(ctx, text)?;
    let today = ctx.today();
    let month = partial.month.unwrap_or(1);
    let day = partial.day.unwrap_or(1);
    let year = match partial.year {
        Some(year) => year,
        None if partial.month.is_some_and(|m| m > today.month()) => {
            today.year() - 1
        }
        None => today.year(),
    };
    Date::new(year, month, day)
        .map_err(|source| DateError::Invalid { text: text.to_string(), source })
}

fn title_case(text: &str) -> String {
    let lower = text.to_lowercase();
    let mut chars = lower.chars();
    match chars.next() {
        None => String::new(),
        Some(first) => first.to_uppercase().chain(chars).collect(),
    }
}
