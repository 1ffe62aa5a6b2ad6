//! Purpose: Timestamp format adapters used by date-typed keyed fields.
//! Exports: `DateFormat`, `PatternFormat`, `Rfc3339Format`, `DateTransform`.
//! Role: Format/parse `OffsetDateTime` values as strings on the wire.
//! Invariants: The facade never needs to know which adapter is in use.
//! Invariants: A string that does not parse is `DataCorrupted`, never a generic error.
use time::format_description::well_known::Rfc3339;
use time::format_description::{self, OwnedFormatItem};
use time::{Date, OffsetDateTime, PrimitiveDateTime, UtcOffset};

use crate::core::error::{Error, ErrorKind};
use crate::core::transform::{DecodeTransform, EncodeTransform};

pub trait DateFormat {
    fn format(&self, value: &OffsetDateTime) -> Result<String, Error>;

    fn parse(&self, text: &str) -> Option<OffsetDateTime>;
}

impl<F: DateFormat + ?Sized> DateFormat for &F {
    fn format(&self, value: &OffsetDateTime) -> Result<String, Error> {
        (**self).format(value)
    }

    fn parse(&self, text: &str) -> Option<OffsetDateTime> {
        (**self).parse(text)
    }
}

/// RFC 3339 timestamps, e.g. `2024-03-15T09:30:00Z`.
#[derive(Clone, Copy, Debug, Default)]
pub struct Rfc3339Format;

impl DateFormat for Rfc3339Format {
    fn format(&self, value: &OffsetDateTime) -> Result<String, Error> {
        value.format(&Rfc3339).map_err(|err| {
            Error::new(ErrorKind::TransformFailure)
                .with_message("failed to format timestamp as rfc3339")
                .with_source(err)
        })
    }

    fn parse(&self, text: &str) -> Option<OffsetDateTime> {
        OffsetDateTime::parse(text, &Rfc3339).ok()
    }
}

/// Pattern-based format using `time` format descriptions such as
/// `[year]-[month]-[day]`.
///
/// Values are converted to the configured offset (UTC by default) before
/// formatting. When a pattern carries no offset the parsed value is
/// assumed to be in that offset, and a date-only pattern parses to
/// midnight.
#[derive(Clone, Debug)]
pub struct PatternFormat {
    pattern: String,
    items: OwnedFormatItem,
    offset: UtcOffset,
}

impl PatternFormat {
    pub fn new(pattern: &str) -> Result<Self, Error> {
        let items = format_description::parse_owned::<2>(pattern).map_err(|err| {
            Error::new(ErrorKind::Usage)
                .with_message(format!("invalid date pattern: {pattern}"))
                .with_hint("Use time format descriptions like `[year]-[month]-[day]`.")
                .with_source(err)
        })?;
        Ok(Self {
            pattern: pattern.to_string(),
            items,
            offset: UtcOffset::UTC,
        })
    }

    pub fn with_offset(mut self, offset: UtcOffset) -> Self {
        self.offset = offset;
        self
    }

    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    pub fn offset(&self) -> UtcOffset {
        self.offset
    }
}

impl DateFormat for PatternFormat {
    fn format(&self, value: &OffsetDateTime) -> Result<String, Error> {
        value.to_offset(self.offset).format(&self.items).map_err(|err| {
            Error::new(ErrorKind::TransformFailure)
                .with_message(format!("failed to format timestamp with `{}`", self.pattern))
                .with_source(err)
        })
    }

    fn parse(&self, text: &str) -> Option<OffsetDateTime> {
        if let Ok(value) = OffsetDateTime::parse(text, &self.items) {
            return Some(value);
        }
        if let Ok(value) = PrimitiveDateTime::parse(text, &self.items) {
            return Some(value.assume_offset(self.offset));
        }
        Date::parse(text, &self.items)
            .ok()
            .map(|date| date.midnight().assume_offset(self.offset))
    }
}

/// Adapts a `DateFormat` into a string-backed value transformer.
#[derive(Clone, Copy, Debug, Default)]
pub struct DateTransform<F>(pub F);

impl<F: DateFormat> EncodeTransform for DateTransform<F> {
    type Source = OffsetDateTime;
    type Target = String;

    fn encode(&self, value: &OffsetDateTime) -> Result<String, Error> {
        self.0.format(value)
    }
}

impl<F: DateFormat> DecodeTransform for DateTransform<F> {
    type Source = String;
    type Target = OffsetDateTime;

    fn decode(&self, value: String) -> Result<OffsetDateTime, Error> {
        self.0.parse(&value).ok_or_else(|| {
            Error::new(ErrorKind::DataCorrupted)
                .with_message(format!("date string {value:?} does not match format"))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::{DateFormat, DateTransform, PatternFormat, Rfc3339Format};
    use crate::core::error::ErrorKind;
    use crate::core::transform::DecodeTransform;
    use time::UtcOffset;
    use time::macros::datetime;

    #[test]
    fn date_only_pattern_drops_time_of_day() {
        let format = PatternFormat::new("[year]-[month]-[day]").expect("pattern");
        let value = datetime!(2024-03-15 17:45:12 UTC);
        let text = format.format(&value).expect("format");
        assert_eq!(text, "2024-03-15");

        let parsed = format.parse(&text).expect("parse");
        assert_eq!(parsed, datetime!(2024-03-15 0:00 UTC));
        assert_eq!(format.format(&parsed).expect("format"), text);
    }

    #[test]
    fn pattern_offset_applies_both_ways() {
        let offset = UtcOffset::from_hms(2, 0, 0).expect("offset");
        let format = PatternFormat::new("[year]-[month]-[day] [hour]:[minute]")
            .expect("pattern")
            .with_offset(offset);
        let value = datetime!(2024-03-15 23:30 UTC);
        let text = format.format(&value).expect("format");
        assert_eq!(text, "2024-03-16 01:30");
        assert_eq!(format.parse(&text), Some(value));
    }

    #[test]
    fn invalid_pattern_is_usage_error() {
        let err = PatternFormat::new("[year]-[nonsense]").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Usage);
    }

    #[test]
    fn rfc3339_round_trips_offsets() {
        let value = datetime!(2024-03-15 09:30:00 +05:30);
        let text = Rfc3339Format.format(&value).expect("format");
        assert_eq!(text, "2024-03-15T09:30:00+05:30");
        assert_eq!(Rfc3339Format.parse(&text), Some(value));
        assert_eq!(Rfc3339Format.parse("2024-03-15"), None);
    }

    #[test]
    fn unparseable_text_is_data_corrupted() {
        let transform = DateTransform(Rfc3339Format);
        let err = transform.decode("notADate".to_string()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::DataCorrupted);
    }
}
