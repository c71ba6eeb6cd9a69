/*!
Parsing of period expressions like `every 2 weeks from 2024` or `last month`.

An expression is a sequence of clauses, each introduced by its first token.
Clauses are applied left to right to an [`Interval`], and a later clause
overwrites whatever an earlier one set.
*/

use jiff::civil::Date;

use crate::{
    context::Context,
    duration::{Duration, add_duration, subtract_duration},
    error::DateError,
    interval::Interval,
    specifier,
};

use self::lex::{Keyword, Token, TokenKind, Tokens, Unit};

mod lex;

/// Parse a period expression into a fresh interval.
///
/// Matching is case insensitive. Relative words like `this` or `today` are
/// anchored at the context's current date.
pub fn parse(ctx: &Context, expr: &str) -> Result<Interval, DateError> {
    let mut interval = Interval::new();
    parse_into(ctx, expr, &mut interval)?;
    Ok(interval)
}

/// Parse a period expression and apply its clauses to an existing interval.
///
/// Fields that no clause mentions are left alone.
pub fn parse_into(
    ctx: &Context,
    expr: &str,
    interval: &mut Interval,
) -> Result<(), DateError> {
    let lowercase = expr.to_lowercase();
    let mut parser = Parser { ctx, expr, tokens: Tokens::new(&lowercase) };
    let Some(first) = parser.tokens.next() else {
        return Err(DateError::syntax(expr, "expression is empty"));
    };
    parser.clause(first, interval)?;
    while let Some(token) = parser.tokens.next() {
        parser.clause(token, interval)?;
    }
    log::debug!("parsed `{expr}` as {interval:?}");
    Ok(())
}

/// Which bounds of an interval a date clause writes.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum Sides {
    Both,
    Start,
    End,
}

/// How a `this`, `last` or `next` modifier moves a window.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum Shift {
    This,
    Last,
    Next,
}

impl Shift {
    fn from_keyword(kw: Keyword) -> Option<Shift> {
        match kw {
            Keyword::This => Some(Shift::This),
            Keyword::Last => Some(Shift::Last),
            Keyword::Next => Some(Shift::Next),
            _ => None,
        }
    }
}

struct Parser<'c, 'a> {
    ctx: &'c Context,
    expr: &'a str,
    tokens: Tokens<'a>,
}

impl<'c, 'a> Parser<'c, 'a> {
    fn clause(
        &mut self,
        token: Token<'a>,
        interval: &mut Interval,
    ) -> Result<(), DateError> {
        let TokenKind::Keyword(kw) = token.kind else {
            return self.dates(Shift::This, Some(token), Sides::Both, interval);
        };
        match kw {
            Keyword::Every => self.every(interval),
            Keyword::Daily
            | Keyword::Weekly
            | Keyword::Biweekly
            | Keyword::Monthly
            | Keyword::Bimonthly
            | Keyword::Quarterly
            | Keyword::Yearly => {
                interval.set_duration(kw.shorthand());
                Ok(())
            }
            Keyword::This => self.relative(Shift::This, Sides::Both, interval),
            Keyword::Last => self.relative(Shift::Last, Sides::Both, interval),
            Keyword::Next => self.relative(Shift::Next, Sides::Both, interval),
            Keyword::Today => {
                self.dates(Shift::This, Some(token), Sides::Both, interval)
            }
            Keyword::In | Keyword::On => {
                self.preposition(token, Sides::Both, interval)
            }
            Keyword::From | Keyword::Since => {
                self.preposition(token, Sides::Start, interval)
            }
            Keyword::To | Keyword::Until => {
                self.preposition(token, Sides::End, interval)
            }
        }
    }

    /// Handles the rest of `this|last|next [word]`.
    fn relative(
        &mut self,
        shift: Shift,
        sides: Sides,
        interval: &mut Interval,
    ) -> Result<(), DateError> {
        let word = self.tokens.next();
        self.dates(shift, word, sides, interval)
    }

    /// Handles the rest of `in|on|from|since|to|until <word>`, where the
    /// word may itself be `this`, `last` or `next`.
    fn preposition(
        &mut self,
        token: Token<'a>,
        sides: Sides,
        interval: &mut Interval,
    ) -> Result<(), DateError> {
        let Some(word) = self.tokens.next() else {
            return Err(DateError::syntax(
                self.expr,
                format!("expected a date after `{}`", token.text),
            ));
        };
        let shift = match word.kind {
            TokenKind::Keyword(kw) => Shift::from_keyword(kw),
            _ => None,
        };
        match shift {
            Some(shift) => self.relative(shift, sides, interval),
            None => self.dates(Shift::This, Some(word), sides, interval),
        }
    }

    fn dates(
        &mut self,
        shift: Shift,
        word: Option<Token<'a>>,
        sides: Sides,
        interval: &mut Interval,
    ) -> Result<(), DateError> {
        let (start, end) = self.window(shift, word, sides)?;
        match sides {
            Sides::Both => {
                interval.set_start(Some(start)).set_end(Some(end));
            }
            Sides::Start => {
                interval.set_start(Some(start));
            }
            Sides::End => {
                interval.set_end(Some(end));
            }
        }
        Ok(())
    }

    /// Resolves a date word to a `(start, end)` window, moved by `shift`.
    ///
    /// A missing word means `month`.
    fn window(
        &self,
        shift: Shift,
        word: Option<Token<'a>>,
        sides: Sides,
    ) -> Result<(Date, Date), DateError> {
        const MONTH: TokenKind =
            TokenKind::Unit { unit: Unit::Month, plural: false };

        let today = self.ctx.today();
        let (kind, text) = word.map_or((MONTH, "month"), |t| (t.kind, t.text));
        let (start, duration) = match kind {
            MONTH => (today.first_of_month(), Duration::Months(1)),
            TokenKind::Unit { unit: Unit::Year, plural: false } => {
                (today.first_of_year(), Duration::Years(1))
            }
            TokenKind::Unit { unit: Unit::Day, plural: false }
            | TokenKind::Keyword(Keyword::Today) => (today, Duration::Days(1)),
            _ => {
                let inc = specifier::resolve(self.ctx, text)?;
                // An end-only specifier stops where the specified span
                // begins, so `to 2023-06` excludes June.
                let end = if sides == Sides::End { inc.begin } else { inc.end };
                return shifted(shift, inc.begin, end, inc.granularity);
            }
        };
        let end = add_duration(start, duration)?;
        shifted(shift, start, end, duration)
    }

    fn every(&mut self, interval: &mut Interval) -> Result<(), DateError> {
        let Some(token) = self.tokens.next() else {
            return Err(DateError::syntax(
                self.expr,
                "expected a count or a unit after `every`",
            ));
        };
        let (count, unit) = match token.kind {
            TokenKind::Count(count) => {
                let Some(unit) = self.tokens.next() else {
                    return Err(DateError::syntax(
                        self.expr,
                        format!("expected a unit after `every {count}`"),
                    ));
                };
                (count, unit)
            }
            TokenKind::Unit { .. } => (1, token),
            TokenKind::Word
                if token.text.starts_with(|c: char| c.is_ascii_digit()) =>
            {
                return Err(DateError::syntax(
                    self.expr,
                    format!("invalid count `{}`", token.text),
                ));
            }
            _ => {
                log::warn!(
                    "ignoring `every {}` in `{}`: unrecognized unit",
                    token.text,
                    self.expr,
                );
                return Ok(());
            }
        };
        let TokenKind::Unit { unit: u, .. } = unit.kind else {
            log::warn!(
                "ignoring `every {count} {}` in `{}`: unrecognized unit",
                unit.text,
                self.expr,
            );
            return Ok(());
        };
        let duration = u.times(count).ok_or_else(|| {
            DateError::syntax(
                self.expr,
                format!("`every {count} {}` is too long", unit.text),
            )
        })?;
        interval.set_duration(Some(duration));
        Ok(())
    }
}

fn shifted(
    shift: Shift,
    start: Date,
    end: Date,
    by: Duration,
) -> Result<(Date, Date), DateError> {
    match shift {
        Shift::This => Ok((start, end)),
        Shift::Last => {
            Ok((subtract_duration(start, by)?, subtract_duration(end, by)?))
        }
        Shift::Next => Ok((add_duration(start, by)?, add_duration(end, by)?)),
    }
}
