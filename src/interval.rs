use jiff::civil::{Date, Weekday};

use crate::{
    context::Context,
    duration::{Duration, add_duration, subtract_duration},
    error::DateError,
};

/// The result of asking an interval where a date falls.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Location {
    /// The date is inside the interval's current period. The interval may
    /// have moved forward to get there.
    InPeriod,
    /// The date isn't covered by any period. Either it's outside the
    /// interval's bounds, or it falls in a gap between periods.
    NoPeriod,
}

/// The cursor of an interval: where its current period starts, where it
/// ends and where the next one begins.
///
/// The period locator writes a copy of this for callers that want to know
/// which period was current before a date moved the interval forward.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct PeriodState {
    pub start: Option<Date>,
    pub next: Option<Date>,
    pub end_of_duration: Option<Date>,
}

impl PeriodState {
    /// Returns the recurring period this cursor points at, if any.
    pub fn period(&self) -> Option<Period> {
        let (start, end) = (self.start?, self.end_of_duration?);
        Some(Period { start, end: PeriodEnd::Exclusive(end) })
    }
}

/// How a period ends.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum PeriodEnd {
    /// The period of a recurring interval ends just before this date.
    Exclusive(Date),
    /// The period of a fixed window includes this date.
    Inclusive(Date),
    /// A fixed window without an end.
    Unbounded,
}

/// A single concrete period, e.g., the week starting on 2024-06-09.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Period {
    pub start: Date,
    pub end: PeriodEnd,
}

impl Period {
    /// Render this period with the dates in the context's output format.
    ///
    /// Recurring periods exclude their end, fixed windows include it and
    /// windows without an end are open.
    pub fn render(&self, ctx: &Context) -> anyhow::Result<String> {
        let start = ctx.format_date(self.start)?;
        let rendered = match self.end {
            PeriodEnd::Exclusive(end) => {
                format!("[{start}, {})", ctx.format_date(end)?)
            }
            PeriodEnd::Inclusive(end) => {
                format!("[{start}, {}]", ctx.format_date(end)?)
            }
            PeriodEnd::Unbounded => format!("[{start}, ..)"),
        };
        Ok(rendered)
    }
}

/// A possibly recurring, possibly bounded sequence of periods.
///
/// An interval without a duration is a single fixed window from `start`
/// to `end` (inclusive). An interval with a duration describes back-to-back
/// periods of that length, starting at `start` and stepping forward by the
/// skip duration (which defaults to the duration itself) until `end`.
///
/// When no start is given, one is picked the first time a date is located
/// in the interval. Locating dates is stateful: the interval moves its
/// current period forward to the one containing each date, so dates should
/// be given in non-decreasing order.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Interval {
    start: Option<Date>,
    end: Option<Date>,
    duration: Option<Duration>,
    skip_duration: Option<Duration>,
    // Cached `start + duration`.
    end_of_duration: Option<Date>,
    // Cached `start + skip_duration`.
    next: Option<Date>,
}

impl Interval {
    /// Create an empty interval: no bounds and no duration.
    pub fn new() -> Interval {
        Interval::default()
    }

    pub fn start(&self) -> Option<Date> {
        self.start
    }

    pub fn end(&self) -> Option<Date> {
        self.end
    }

    pub fn duration(&self) -> Option<Duration> {
        self.duration
    }

    /// Set the start of the current period.
    ///
    /// This discards the cached end of the current period and the start of
    /// the next one.
    pub fn set_start(&mut self, start: Option<Date>) -> &mut Interval {
        self.start = start;
        self.end_of_duration = None;
        self.next = None;
        self
    }

    /// Set the upper bound of the interval as a whole.
    pub fn set_end(&mut self, end: Option<Date>) -> &mut Interval {
        self.end = end;
        self
    }

    /// Set the length of each period.
    pub fn set_duration(&mut self, duration: Option<Duration>) -> &mut Interval {
        self.duration = duration;
        self.end_of_duration = None;
        self.next = None;
        self
    }

    /// Set the step between the starts of successive periods.
    ///
    /// No expression sets this. Periods with a skip longer than their
    /// duration leave gaps between them.
    #[cfg_attr(not(test), expect(dead_code))]
    pub fn set_skip_duration(
        &mut self,
        skip: Option<Duration>,
    ) -> &mut Interval {
        self.skip_duration = skip;
        self.next = None;
        self
    }

    /// Returns a copy of this interval's cursor.
    pub fn state(&self) -> PeriodState {
        PeriodState {
            start: self.start,
            next: self.next,
            end_of_duration: self.end_of_duration,
        }
    }

    /// Returns the period this interval currently points at.
    ///
    /// This returns `None` when the interval hasn't been seeded with a start
    /// yet, or when `advance` has moved it past its end.
    pub fn period(&self) -> Result<Option<Period>, DateError> {
        let Some(start) = self.start else { return Ok(None) };
        let end = match (self.duration, self.end) {
            (Some(duration), _) => {
                let end = match self.end_of_duration {
                    Some(end) => end,
                    None => add_duration(start, duration)?,
                };
                PeriodEnd::Exclusive(end)
            }
            (None, Some(end)) => PeriodEnd::Inclusive(end),
            (None, None) => PeriodEnd::Unbounded,
        };
        Ok(Some(Period { start, end }))
    }

    /// Find the period containing `date`, moving this interval forward to it
    /// if necessary.
    ///
    /// When the interval has no start yet, one is picked based on `date` and
    /// the kind of duration. For durations in weeks, `week_start` determines
    /// the weekday that periods begin on.
    ///
    /// When the interval moves to a later period and `previous` is given,
    /// the cursor as it was before the move is written to it.
    ///
    /// If `date` isn't in any period, then this returns
    /// `Location::NoPeriod` and the interval is left as it was (apart from a
    /// first-time seeding of its start).
    ///
    /// # Errors
    ///
    /// This fails when the interval has neither a start nor a duration, when
    /// the duration is zero-length, or when date arithmetic overflows.
    pub fn find_period(
        &mut self,
        date: Date,
        week_start: Weekday,
        previous: Option<&mut PeriodState>,
    ) -> Result<Location, DateError> {
        if self.end.is_some_and(|end| date > end) {
            return Ok(Location::NoPeriod);
        }
        let start = match self.start {
            Some(start) => start,
            None => {
                let Some(duration) = self.duration else {
                    return Err(DateError::Interval(if self.end.is_none() {
                        "neither start, nor end, nor duration"
                    } else {
                        "an end without a start or a duration"
                    }));
                };
                let start = seed(date, duration, week_start)?;
                log::debug!(
                    "seeded interval of {duration} at {start} \
                     for first date {date}",
                );
                self.set_start(Some(start));
                start
            }
        };
        if date < start {
            return Ok(Location::NoPeriod);
        }
        // With no duration, the end check above means the date is in the
        // fixed window.
        let Some(duration) = self.duration else {
            return Ok(Location::InPeriod);
        };
        let skip = self.skip_duration.unwrap_or(duration);
        if duration.is_zero() {
            return Err(DateError::ZeroDuration(duration));
        }
        if skip.is_zero() {
            return Err(DateError::ZeroDuration(skip));
        }

        let end_of_duration = match self.end_of_duration {
            Some(end_of_duration) => end_of_duration,
            None => {
                let end_of_duration = add_duration(start, duration)?;
                self.end_of_duration = Some(end_of_duration);
                end_of_duration
            }
        };
        let next = match self.next {
            Some(next) => next,
            None => {
                let next = add_duration(start, skip)?;
                self.next = Some(next);
                next
            }
        };
        if date < end_of_duration {
            return Ok(Location::InPeriod);
        }

        // The date is past the current period. Walk forward one step at a
        // time, but never past the date itself or the end of the interval.
        let mut scan = next;
        let mut end_of_scan = add_duration(scan, duration)?;
        let found = loop {
            if date < scan {
                log::trace!("{date} falls in the gap before {scan}");
                break None;
            }
            if let Some(end) = self.end {
                if scan >= end {
                    log::trace!("scan for {date} reached interval end {end}");
                    break None;
                }
            }
            if date < end_of_scan {
                break Some((scan, end_of_scan));
            }
            scan = add_duration(scan, skip)?;
            end_of_scan = add_duration(scan, duration)?;
        };
        let Some((scan, end_of_scan)) = found else {
            return Ok(Location::NoPeriod);
        };
        if let Some(previous) = previous {
            *previous = self.state();
        }
        log::debug!("moved period from {start} to [{scan}, {end_of_scan})");
        self.start = Some(scan);
        self.end_of_duration = Some(end_of_scan);
        self.next = None;
        Ok(Location::InPeriod)
    }

    /// Unconditionally move this interval to its next period.
    ///
    /// When the interval is bounded and the next period would start on or
    /// after its end, the interval becomes exhausted: its start is cleared
    /// and `period` returns `None`.
    ///
    /// # Errors
    ///
    /// This fails when the interval has no start, when it has neither a
    /// skip duration nor a duration, or when the step is zero-length.
    pub fn advance(&mut self) -> Result<(), DateError> {
        let Some(start) = self.start else {
            return Err(DateError::Unstarted);
        };
        let Some(skip) = self.skip_duration.or(self.duration) else {
            return Err(DateError::NoDuration);
        };
        if skip.is_zero() {
            return Err(DateError::ZeroDuration(skip));
        }
        let start = add_duration(start, skip)?;
        self.next = None;
        if self.end.is_some_and(|end| start >= end) {
            log::debug!("interval exhausted at {start}");
            self.start = None;
            self.end_of_duration = None;
            return Ok(());
        }
        self.start = Some(start);
        self.end_of_duration = match self.duration {
            Some(duration) => Some(add_duration(start, duration)?),
            None => None,
        };
        Ok(())
    }
}

/// Pick a first period start for an interval that wasn't given one.
///
/// The goal is a date early enough that the period containing `date` is
/// reachable by stepping forward, but late enough that getting there
/// doesn't take thousands of steps.
///
/// Months seed at January 1 of the date's year, so that quarters and
/// half-years line up with the calendar. Weeks don't seed there, even though
/// January 1 is the obvious place: the roll forward to `week_start` would
/// then never run, and weekly periods would begin on whatever weekday
/// January 1 falls on. Instead, weeks seed 400 days before the date and roll
/// forward to the next `week_start`, so every weekly period begins on it.
fn seed(
    date: Date,
    duration: Duration,
    week_start: Weekday,
) -> Result<Date, DateError> {
    match duration {
        Duration::Months(_) => Ok(date.first_of_year()),
        Duration::Weeks(_) => {
            let start = subtract_duration(date, Duration::Days(400))?;
            let offset = week_start.since(start.weekday());
            add_duration(start, Duration::Days(i32::from(offset)))
        }
        Duration::Days(_) | Duration::Years(_) => {
            subtract_duration(date, Duration::Days(400))
        }
    }
}

#[cfg(test)]
mod tests {
    use jiff::civil::{Weekday::*, date};

    use super::*;

    fn recurring(start: Option<Date>, duration: Duration) -> Interval {
        let mut interval = Interval::new();
        interval.set_start(start).set_duration(Some(duration));
        interval
    }

    fn render(period: Period) -> String {
        period.render(&Context::new(date(2024, 3, 15))).unwrap()
    }

    fn period(interval: &Interval) -> String {
        render(interval.period().unwrap().unwrap())
    }

    #[test]
    fn monthly_stays_then_moves() {
        let mut interval =
            recurring(Some(date(2024, 1, 1)), Duration::Months(1));
        let mut previous = PeriodState::default();

        let loc = interval
            .find_period(date(2024, 1, 15), Sunday, Some(&mut previous))
            .unwrap();
        assert_eq!(loc, Location::InPeriod);
        assert_eq!(period(&interval), "[2024-01-01, 2024-02-01)");
        // Nothing moved, so nothing is reported as previous.
        assert_eq!(previous, PeriodState::default());

        let loc = interval
            .find_period(date(2024, 3, 10), Sunday, Some(&mut previous))
            .unwrap();
        assert_eq!(loc, Location::InPeriod);
        assert_eq!(period(&interval), "[2024-03-01, 2024-04-01)");
        assert_eq!(interval.next, None);
        assert_eq!(
            previous,
            PeriodState {
                start: Some(date(2024, 1, 1)),
                next: Some(date(2024, 2, 1)),
                end_of_duration: Some(date(2024, 2, 1)),
            }
        );
        assert_eq!(
            render(previous.period().unwrap()),
            "[2024-01-01, 2024-02-01)",
        );
        assert_eq!(PeriodState::default().period(), None);
    }

    #[test]
    fn month_end_start_stays_on_month_ends() {
        let mut interval =
            recurring(Some(date(2024, 1, 31)), Duration::Months(1));
        let loc = interval.find_period(date(2024, 4, 30), Sunday, None);
        assert_eq!(loc.unwrap(), Location::InPeriod);
        assert_eq!(period(&interval), "[2024-04-30, 2024-05-31)");

        interval.advance().unwrap();
        assert_eq!(period(&interval), "[2024-05-31, 2024-06-30)");
    }

    #[test]
    fn before_start_is_no_period() {
        let mut interval =
            recurring(Some(date(2024, 1, 1)), Duration::Months(1));
        let loc = interval.find_period(date(2023, 12, 31), Sunday, None);
        assert_eq!(loc.unwrap(), Location::NoPeriod);
        assert_eq!(interval.start(), Some(date(2024, 1, 1)));
    }

    #[test]
    fn biweekly_seeds_on_week_start() {
        let mut interval = recurring(None, Duration::Weeks(2));
        let query = date(2024, 6, 15);
        assert_eq!(query.weekday(), Saturday);

        let loc = interval.find_period(query, Sunday, None).unwrap();
        assert_eq!(loc, Location::InPeriod);
        let start = interval.start().unwrap();
        assert_eq!(start.weekday(), Sunday);
        assert!(start <= query);
        // 400 days before the query, rolled forward to a Sunday.
        assert!(start >= date(2023, 5, 14));
        assert_eq!(period(&interval), "[2024-06-09, 2024-06-23)");
    }

    #[test]
    fn weekly_honors_configured_week_start() {
        let mut interval = recurring(None, Duration::Weeks(1));
        interval.find_period(date(2024, 6, 15), Monday, None).unwrap();
        assert_eq!(period(&interval), "[2024-06-10, 2024-06-17)");
    }

    #[test]
    fn quarterly_seeds_at_start_of_year() {
        let mut interval = recurring(None, Duration::Months(3));
        interval.find_period(date(2024, 5, 20), Sunday, None).unwrap();
        assert_eq!(period(&interval), "[2024-04-01, 2024-07-01)");
    }

    #[test]
    fn daily_seeds_in_the_past() {
        let mut interval = recurring(None, Duration::Days(1));
        interval.find_period(date(2024, 6, 15), Sunday, None).unwrap();
        assert_eq!(period(&interval), "[2024-06-15, 2024-06-16)");

        interval.find_period(date(2024, 6, 20), Sunday, None).unwrap();
        assert_eq!(period(&interval), "[2024-06-20, 2024-06-21)");
    }

    #[test]
    fn scan_stops_at_interval_end() {
        let mut interval =
            recurring(Some(date(2023, 1, 1)), Duration::Months(1));
        interval.set_end(Some(date(2023, 6, 1)));

        let loc = interval.find_period(date(2023, 6, 1), Sunday, None);
        assert_eq!(loc.unwrap(), Location::NoPeriod);
        assert_eq!(period(&interval), "[2023-01-01, 2023-02-01)");

        let loc = interval.find_period(date(2023, 5, 31), Sunday, None);
        assert_eq!(loc.unwrap(), Location::InPeriod);
        assert_eq!(period(&interval), "[2023-05-01, 2023-06-01)");

        let loc = interval.find_period(date(2023, 6, 2), Sunday, None);
        assert_eq!(loc.unwrap(), Location::NoPeriod);
    }

    #[test]
    fn gaps_between_periods() {
        // One day every week, starting on a Monday.
        let mut interval =
            recurring(Some(date(2024, 1, 1)), Duration::Days(1));
        interval.set_skip_duration(Some(Duration::Weeks(1)));

        let loc = interval.find_period(date(2024, 1, 1), Sunday, None);
        assert_eq!(loc.unwrap(), Location::InPeriod);
        let loc = interval.find_period(date(2024, 1, 3), Sunday, None);
        assert_eq!(loc.unwrap(), Location::NoPeriod);
        assert_eq!(interval.start(), Some(date(2024, 1, 1)));

        let loc = interval.find_period(date(2024, 1, 8), Sunday, None);
        assert_eq!(loc.unwrap(), Location::InPeriod);
        assert_eq!(period(&interval), "[2024-01-08, 2024-01-09)");
    }

    #[test]
    fn fixed_window_end_is_inclusive() {
        let mut interval = Interval::new();
        interval
            .set_start(Some(date(2023, 1, 1)))
            .set_end(Some(date(2024, 1, 1)));
        assert_eq!(period(&interval), "[2023-01-01, 2024-01-01]");

        let mut find = |d| interval.find_period(d, Sunday, None).unwrap();
        assert_eq!(find(date(2022, 12, 31)), Location::NoPeriod);
        assert_eq!(find(date(2023, 1, 1)), Location::InPeriod);
        assert_eq!(find(date(2023, 7, 4)), Location::InPeriod);
        assert_eq!(find(date(2024, 1, 1)), Location::InPeriod);
        assert_eq!(find(date(2024, 1, 2)), Location::NoPeriod);
    }

    #[test]
    fn end_without_start_or_duration() {
        let mut interval = Interval::new();
        interval.set_end(Some(date(2024, 1, 1)));

        let loc = interval.find_period(date(2024, 1, 2), Sunday, None);
        assert_eq!(loc.unwrap(), Location::NoPeriod);

        let err =
            interval.find_period(date(2024, 1, 1), Sunday, None).unwrap_err();
        assert_eq!(
            err.to_string(),
            "invalid date interval: an end without a start or a duration",
        );
        assert!(interval.find_period(date(2023, 6, 1), Sunday, None).is_err());
    }

    #[test]
    fn empty_interval_is_an_error() {
        let err = Interval::new()
            .find_period(date(2024, 1, 1), Sunday, None)
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "invalid date interval: neither start, nor end, nor duration",
        );
    }

    #[test]
    fn zero_duration_is_an_error() {
        let mut interval =
            recurring(Some(date(2024, 1, 1)), Duration::Days(0));
        let err =
            interval.find_period(date(2024, 1, 5), Sunday, None).unwrap_err();
        assert!(matches!(err, DateError::ZeroDuration(Duration::Days(0))));
        assert!(matches!(
            interval.advance(),
            Err(DateError::ZeroDuration(Duration::Days(0)))
        ));
    }

    #[test]
    fn advance_steps_and_exhausts() {
        let mut interval =
            recurring(Some(date(2024, 1, 1)), Duration::Months(1));
        interval.set_end(Some(date(2024, 3, 1)));

        interval.advance().unwrap();
        assert_eq!(period(&interval), "[2024-02-01, 2024-03-01)");
        assert_eq!(interval.end_of_duration, Some(date(2024, 3, 1)));

        interval.advance().unwrap();
        assert_eq!(interval.start(), None);
        assert_eq!(interval.period().unwrap(), None);
    }

    #[test]
    fn advance_errors() {
        let err = recurring(None, Duration::Weeks(1)).advance().unwrap_err();
        assert_eq!(err.to_string(), "cannot advance an unstarted date interval");

        let mut interval = Interval::new();
        interval.set_start(Some(date(2024, 1, 1)));
        let err = interval.advance().unwrap_err();
        assert_eq!(
            err.to_string(),
            "cannot advance a date interval without a duration",
        );
    }

    #[test]
    fn advance_uses_skip_duration() {
        let mut interval =
            recurring(Some(date(2024, 1, 1)), Duration::Days(2));
        interval.set_skip_duration(Some(Duration::Weeks(1)));
        interval.advance().unwrap();
        assert_eq!(period(&interval), "[2024-01-08, 2024-01-10)");
    }
    #[test]
    fn render_period_ends() {
        let mut ctx = Context::new(date(2024, 3, 15));
        let period = Period {
            start: date(2024, 3, 1),
            end: PeriodEnd::Exclusive(date(2024, 4, 1)),
        };
        insta::assert_snapshot!(
            period.render(&ctx).unwrap(),
            @"[2024-03-01, 2024-04-01)"
        );

        ctx.date_format("%b %-d, %Y".to_string());
        let period = Period {
            start: date(2024, 3, 1),
            end: PeriodEnd::Inclusive(date(2024, 3, 31)),
        };
        insta::assert_snapshot!(
            period.render(&ctx).unwrap(),
            @"[Mar 1, 2024, Mar 31, 2024]"
        );

        let period =
            Period { start: date(2024, 3, 1), end: PeriodEnd::Unbounded };
        insta::assert_snapshot!(
            period.render(&ctx).unwrap(),
            @"[Mar 1, 2024, ..)"
        );
    }
}
