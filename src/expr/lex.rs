use crate::duration::Duration;

/// A word with a fixed meaning in period expressions.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Keyword {
    Every,
    Daily,
    Weekly,
    Biweekly,
    Monthly,
    Bimonthly,
    Quarterly,
    Yearly,
    This,
    Last,
    Next,
    Today,
    In,
    On,
    From,
    Since,
    To,
    Until,
}

impl Keyword {
    fn from_word(word: &str) -> Option<Keyword> {
        use self::Keyword::*;

        let kw = match word {
            "every" => Every,
            "daily" => Daily,
            "weekly" => Weekly,
            "biweekly" => Biweekly,
            "monthly" => Monthly,
            "bimonthly" => Bimonthly,
            "quarterly" => Quarterly,
            "yearly" => Yearly,
            "this" => This,
            "last" => Last,
            "next" => Next,
            "today" => Today,
            "in" => In,
            "on" => On,
            "from" => From,
            "since" => Since,
            "to" => To,
            "until" => Until,
            _ => return None,
        };
        Some(kw)
    }

    /// Returns the duration for the single-word recurrences like `weekly`.
    pub fn shorthand(self) -> Option<Duration> {
        let duration = match self {
            Keyword::Daily => Duration::Days(1),
            Keyword::Weekly => Duration::Weeks(1),
            Keyword::Biweekly => Duration::Weeks(2),
            Keyword::Monthly => Duration::Months(1),
            Keyword::Bimonthly => Duration::Months(2),
            Keyword::Quarterly => Duration::Months(3),
            Keyword::Yearly => Duration::Years(1),
            _ => return None,
        };
        Some(duration)
    }
}

/// A calendar unit that can follow `every`.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Unit {
    Day,
    Week,
    Month,
    Quarter,
    Year,
}

impl Unit {
    /// Returns `(unit, plural)` for unit names like `day` or `weeks`.
    fn from_word(word: &str) -> Option<(Unit, bool)> {
        let unit = match word {
            "day" => (Unit::Day, false),
            "days" => (Unit::Day, true),
            "week" => (Unit::Week, false),
            "weeks" => (Unit::Week, true),
            "month" => (Unit::Month, false),
            "months" => (Unit::Month, true),
            "quarter" => (Unit::Quarter, false),
            "quarters" => (Unit::Quarter, true),
            "year" => (Unit::Year, false),
            "years" => (Unit::Year, true),
            _ => return None,
        };
        Some(unit)
    }

    /// Returns `count` of this unit as a duration. A quarter is 3 months.
    ///
    /// This returns `None` when the count overflows.
    pub fn times(self, count: i32) -> Option<Duration> {
        let duration = match self {
            Unit::Day => Duration::Days(count),
            Unit::Week => Duration::Weeks(count),
            Unit::Month => Duration::Months(count),
            Unit::Quarter => Duration::Months(count.checked_mul(3)?),
            Unit::Year => Duration::Years(count),
        };
        Some(duration)
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum TokenKind {
    Keyword(Keyword),
    Unit { unit: Unit, plural: bool },
    /// A non-negative integer made up of only ASCII digits.
    Count(i32),
    /// Anything else. In practice, a date mask like `2024-05` or `jan`.
    Word,
}

/// A single whitespace delimited token of a period expression.
///
/// The original text is always kept around, since a token that looks like
/// a count (e.g., `2024`) may also be used as a date mask.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Token<'a> {
    pub kind: TokenKind,
    pub text: &'a str,
}

impl<'a> Token<'a> {
    fn classify(text: &'a str) -> Token<'a> {
        let kind = if let Some(kw) = Keyword::from_word(text) {
            TokenKind::Keyword(kw)
        } else if let Some((unit, plural)) = Unit::from_word(text) {
            TokenKind::Unit { unit, plural }
        } else if text.bytes().all(|b| b.is_ascii_digit()) {
            match text.parse::<i32>() {
                Ok(count) => TokenKind::Count(count),
                Err(_) => TokenKind::Word,
            }
        } else {
            TokenKind::Word
        };
        Token { kind, text }
    }
}

/// An iterator over the tokens in a period expression.
///
/// The expression must already be lowercase. Keywords and units are only
/// recognized in lowercase form.
#[derive(Clone, Debug)]
pub struct Tokens<'a> {
    words: std::str::SplitWhitespace<'a>,
}

impl<'a> Tokens<'a> {
    pub fn new(lowercase: &'a str) -> Tokens<'a> {
        Tokens { words: lowercase.split_whitespace() }
    }
}

impl<'a> Iterator for Tokens<'a> {
    type Item = Token<'a>;

    fn next(&mut self) -> Option<Token<'a>> {
        self.words.next().map(Token::classify)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(expr: &str) -> Vec<TokenKind> {
        Tokens::new(expr).map(|t| t.kind).collect()
    }

    #[test]
    fn classification() {
        assert_eq!(
            kinds("every 2 weeks"),
            vec![
                TokenKind::Keyword(Keyword::Every),
                TokenKind::Count(2),
                TokenKind::Unit { unit: Unit::Week, plural: true },
            ],
        );
        assert_eq!(
            kinds("from 2023 to 2023-06"),
            vec![
                TokenKind::Keyword(Keyword::From),
                TokenKind::Count(2023),
                TokenKind::Keyword(Keyword::To),
                TokenKind::Word,
            ],
        );
        assert_eq!(
            kinds("  last\tmonth\n"),
            vec![
                TokenKind::Keyword(Keyword::Last),
                TokenKind::Unit { unit: Unit::Month, plural: false },
            ],
        );
        assert_eq!(kinds(""), vec![]);
    }

    #[test]
    fn huge_numbers_are_words() {
        let tokens: Vec<Token> = Tokens::new("99999999999").collect();
        assert_eq!(tokens[0].kind, TokenKind::Word);
        assert_eq!(tokens[0].text, "99999999999");
    }

    #[test]
    fn unit_multiples() {
        assert_eq!(Unit::Quarter.times(2), Some(Duration::Months(6)));
        assert_eq!(Unit::Week.times(3), Some(Duration::Weeks(3)));
        assert_eq!(Unit::Quarter.times(i32::MAX), None);
    }

    #[test]
    fn shorthands() {
        assert_eq!(Keyword::Biweekly.shorthand(), Some(Duration::Weeks(2)));
        assert_eq!(Keyword::Quarterly.shorthand(), Some(Duration::Months(3)));
        assert_eq!(Keyword::Since.shorthand(), None);
    }
}
