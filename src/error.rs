use jiff::civil::Date;

use crate::duration::Duration;

/// The single error kind raised by period computations.
///
/// Everything in here is deterministic: a bad date mask, an impossible
/// interval or arithmetic that falls off the end of the supported calendar.
/// None of these are worth retrying, so callers are expected to stop and
/// report the message as-is.
#[derive(Debug, thiserror::Error)]
pub enum DateError {
    #[error("could not parse date mask: {text}")]
    Mask { text: String },

    #[error("invalid date `{text}`")]
    Invalid {
        text: String,
        #[source]
        source: jiff::Error,
    },

    #[error("invalid date interval: {0}")]
    Interval(&'static str),

    #[error("cannot advance an unstarted date interval")]
    Unstarted,

    #[error("cannot advance a date interval without a duration")]
    NoDuration,

    #[error(
        "cannot step through a date interval with a zero-length \
         duration ({0})"
    )]
    ZeroDuration(Duration),

    #[error("failed to {op} {duration} {preposition} {date}")]
    Arithmetic {
        op: &'static str,
        preposition: &'static str,
        duration: Duration,
        date: Date,
        #[source]
        source: jiff::Error,
    },

    #[error("invalid period expression `{expr}`: {reason}")]
    Syntax { expr: String, reason: String },
}

impl DateError {
    pub(crate) fn syntax(
        expr: impl Into<String>,
        reason: impl Into<String>,
    ) -> DateError {
        DateError::Syntax { expr: expr.into(), reason: reason.into() }
    }
}
