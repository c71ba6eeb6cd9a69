use jiff::{Span, civil::Date};

use crate::error::DateError;

/// A quantity of calendar units.
///
/// This is used both as the length of a period and as the step between the
/// starts of successive periods. The variant matters beyond the number of
/// days it covers: `Weeks(1)` gets week-aligned seeding in the period
/// locator where `Days(7)` does not.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Duration {
    Days(i32),
    Weeks(i32),
    Months(i32),
    Years(i32),
}

impl Duration {
    /// Returns the number of units in this duration.
    pub fn quantity(self) -> i32 {
        match self {
            Duration::Days(n)
            | Duration::Weeks(n)
            | Duration::Months(n)
            | Duration::Years(n) => n,
        }
    }

    /// Returns true when stepping by this duration doesn't move a date.
    pub fn is_zero(self) -> bool {
        self.quantity() == 0
    }

    fn to_span(self) -> Result<Span, jiff::Error> {
        let span = Span::new();
        match self {
            Duration::Days(n) => span.try_days(n),
            Duration::Weeks(n) => span.try_weeks(n),
            Duration::Months(n) => span.try_months(n),
            Duration::Years(n) => span.try_years(n),
        }
    }
}

impl std::fmt::Display for Duration {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match *self {
            Duration::Days(n) => write!(f, "{n} days"),
            Duration::Weeks(n) => write!(f, "{n} weeks"),
            Duration::Months(n) => write!(f, "{n} months"),
            Duration::Years(n) => write!(f, "{n} years"),
        }
    }
}

impl serde::Serialize for Duration {
    fn serialize<S: serde::Serializer>(
        &self,
        s: S,
    ) -> Result<S::Ok, S::Error> {
        use serde::ser::SerializeStruct;

        let unit = match *self {
            Duration::Days(_) => "days",
            Duration::Weeks(_) => "weeks",
            Duration::Months(_) => "months",
            Duration::Years(_) => "years",
        };
        let mut state = s.serialize_struct("Duration", 2)?;
        state.serialize_field("unit", unit)?;
        state.serialize_field("quantity", &self.quantity())?;
        state.end()
    }
}

/// Adds the given duration to a date.
///
/// Days and weeks are fixed offsets. Months and years are calendar units,
/// so the day of the month is clamped when it doesn't exist in the target
/// month. A date on the last day of its month stays on the last day of the
/// target month: January 31 plus one month is the last day of February, and
/// February 29 plus one month is March 31.
pub fn add_duration(date: Date, duration: Duration) -> Result<Date, DateError> {
    duration
        .to_span()
        .and_then(|span| date.checked_add(span))
        .map(|result| snap_to_month_end(date, duration, result))
        .map_err(|source| DateError::Arithmetic {
            op: "add",
            preposition: "to",
            duration,
            date,
            source,
        })
}

/// Subtracts the given duration from a date.
///
/// Month ends are kept in the same way as `add_duration`, so April 30 minus
/// one month is March 31.
pub fn subtract_duration(
    date: Date,
    duration: Duration,
) -> Result<Date, DateError> {
    duration
        .to_span()
        .and_then(|span| date.checked_sub(span))
        .map(|result| snap_to_month_end(date, duration, result))
        .map_err(|source| DateError::Arithmetic {
            op: "subtract",
            preposition: "from",
            duration,
            date,
            source,
        })
}

fn snap_to_month_end(date: Date, duration: Duration, result: Date) -> Date {
    match duration {
        Duration::Months(_) | Duration::Years(_)
            if date == date.last_of_month() =>
        {
            result.last_of_month()
        }
        _ => result,
    }
}
