use jiff::civil::Date;

use crate::{
    context::Context,
    duration::{Duration, add_duration},
    error::DateError,
    mask,
};

/// The span of time implied by a partial date.
///
/// The narrowest field present in the mask determines how wide the span
/// is. `2024` covers a year, `2024-05` a month and `05/01` a single day.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Inclusion {
    /// The first day of the span.
    pub begin: Date,
    /// The first day after the span.
    pub end: Date,
    /// The width of the span, i.e., `end = begin + granularity`.
    pub granularity: Duration,
}

/// Resolve a word like `2024`, `2024-05`, `05/01` or `may` to the span of
/// dates it refers to.
///
/// Missing fields are filled in with the first day, January and the current
/// year respectively.
pub fn resolve(ctx: &Context, word: &str) -> Result<Inclusion, DateError> {
    let partial = mask::parse_mask(ctx, word)?;
    let granularity = if partial.day.is_some() {
        Duration::Days(1)
    } else if partial.month.is_some() {
        Duration::Months(1)
    } else {
        Duration::Years(1)
    };
    let year = partial.year.unwrap_or_else(|| ctx.today().year());
    let month = partial.month.unwrap_or(1);
    let day = partial.day.unwrap_or(1);
    let begin = Date::new(year, month, day)
        .map_err(|source| DateError::Invalid { text: word.to_string(), source })?;
    let end = add_duration(begin, granularity)?;
    log::trace!("resolved `{word}` to [{begin}, {end}) by {granularity}");
    Ok(Inclusion { begin, end, granularity })
}

#[cfg(test)]
mod tests {
    use jiff::civil::date;

    use super::*;

    fn resolve(word: &str) -> Inclusion {
        super::resolve(&Context::new(date(2024, 3, 15)), word).unwrap()
    }

    #[test]
    fn year() {
        let inc = resolve("2023");
        assert_eq!(inc.begin, date(2023, 1, 1));
        assert_eq!(inc.end, date(2024, 1, 1));
        assert_eq!(inc.granularity, Duration::Years(1));
    }

    #[test]
    fn month() {
        let inc = resolve("2023-06");
        assert_eq!(inc.begin, date(2023, 6, 1));
        assert_eq!(inc.end, date(2023, 7, 1));
        assert_eq!(inc.granularity, Duration::Months(1));

        let inc = resolve("feb");
        assert_eq!(inc.begin, date(2024, 2, 1));
        assert_eq!(inc.end, date(2024, 3, 1));
    }

    #[test]
    fn day() {
        let inc = resolve("05/01");
        assert_eq!(inc.begin, date(2024, 5, 1));
        assert_eq!(inc.end, date(2024, 5, 2));
        assert_eq!(inc.granularity, Duration::Days(1));

        let inc = resolve("2023-12-31");
        assert_eq!(inc.begin, date(2023, 12, 31));
        assert_eq!(inc.end, date(2024, 1, 1));
    }

    #[test]
    fn weekday_names_cover_the_current_year() {
        let inc = resolve("tuesday");
        assert_eq!(inc.begin, date(2024, 1, 1));
        assert_eq!(inc.end, date(2025, 1, 1));
        assert_eq!(inc.granularity, Duration::Years(1));
    }

    #[test]
    fn failures() {
        let ctx = Context::new(date(2024, 3, 15));
        let err = super::resolve(&ctx, "soon").unwrap_err();
        assert_eq!(err.to_string(), "could not parse date mask: soon");

        assert!(super::resolve(&ctx, "02/30").is_err());
    }
}
