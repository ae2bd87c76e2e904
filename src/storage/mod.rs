pub mod sel;

pub mod sdr;

/// A SEL timestamp: seconds since the epoch, in BMC-local time.
///
/// Reference: IPMI 2.0 Specification, Section 37 "Timestamp Format"
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Timestamp(u32);

/// A [`Timestamp`] shifted to a UTC offset, ready for display.
///
/// Only exists when the `time` feature is enabled.
#[cfg(feature = "time")]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimestampParts(time::OffsetDateTime);

#[cfg(not(feature = "time"))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TimestampParts {}

#[cfg(feature = "time")]
mod layout {
    use time::{format_description::FormatItem, macros::format_description};

    pub const DATE: &[FormatItem<'static>] = format_description!("[month]/[day]/[year]");
    pub const DATE_MONTH_STRING: &[FormatItem<'static>] =
        format_description!("[month repr:short]-[day]-[year]");
    pub const TIME: &[FormatItem<'static>] = format_description!("[hour]:[minute]:[second]");
}

impl TimestampParts {
    /// `MM/DD/YYYY`, or `Mon-DD-YYYY` if `month_string` is set.
    pub fn date(&self, month_string: bool) -> Option<String> {
        #[cfg(feature = "time")]
        {
            let layout = if month_string {
                layout::DATE_MONTH_STRING
            } else {
                layout::DATE
            };
            self.0.format(layout).ok()
        }

        #[cfg(not(feature = "time"))]
        {
            let _ = month_string;
            match *self {}
        }
    }

    /// `HH:MM:SS`, 24 hour clock.
    pub fn time(&self) -> Option<String> {
        #[cfg(feature = "time")]
        {
            self.0.format(layout::TIME).ok()
        }

        #[cfg(not(feature = "time"))]
        {
            match *self {}
        }
    }
}

impl Timestamp {
    /// The timestamp value for "unspecified".
    pub const UNSPECIFIED: Self = Self(0xFFFF_FFFF);

    /// Timestamps at or below this value count seconds since BMC
    /// initialization, not since the epoch.
    pub const POST_INIT_MAX: u32 = 0x2000_0000;

    pub fn value(&self) -> u32 {
        self.0
    }

    pub fn is_unspecified(&self) -> bool {
        *self == Self::UNSPECIFIED
    }

    pub fn is_post_init(&self) -> bool {
        self.0 <= Self::POST_INIT_MAX
    }

    /// Break the timestamp down, shifting it by `utc_offset_seconds`.
    ///
    /// Returns `None` for unspecified and post-initialization timestamps,
    /// and always when the `time` feature is disabled.
    pub fn parts(&self, utc_offset_seconds: i32) -> Option<TimestampParts> {
        if self.is_unspecified() || self.is_post_init() {
            return None;
        }

        #[cfg(feature = "time")]
        {
            let offset = time::UtcOffset::from_whole_seconds(utc_offset_seconds).ok()?;
            let dt = time::OffsetDateTime::from_unix_timestamp(i64::from(self.0))
                .ok()?
                .to_offset(offset);

            Some(TimestampParts(dt))
        }

        #[cfg(not(feature = "time"))]
        {
            let _ = utc_offset_seconds;
            None
        }
    }

    /// `MM/DD/YYYY - HH:MM:SS`, as used in SEL information displays.
    pub fn long_string(&self, utc_offset_seconds: i32) -> String {
        self.parts(utc_offset_seconds)
            .and_then(|parts| parts.date(false).zip(parts.time()))
            .map(|(date, time)| format!("{date} - {time}"))
            .unwrap_or_else(|| self.to_string())
    }
}

impl core::fmt::Display for Timestamp {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        if self.is_unspecified() {
            write!(f, "Unspecified")
        } else if self.is_post_init() {
            write!(f, "PostInit")
        } else {
            #[cfg(feature = "time")]
            {
                let formatted = time::OffsetDateTime::from_unix_timestamp(i64::from(self.0))
                    .ok()
                    .and_then(|t| {
                        t.format(&time::format_description::well_known::Rfc3339)
                            .ok()
                    });

                match formatted {
                    Some(formatted) => write!(f, "{formatted}"),
                    None => write!(f, "{}", self.0),
                }
            }

            #[cfg(not(feature = "time"))]
            write!(f, "{}", self.0)
        }
    }
}

impl From<u32> for Timestamp {
    fn from(value: u32) -> Self {
        Self(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn special_timestamps() {
        assert_eq!(Timestamp::UNSPECIFIED.to_string(), "Unspecified");
        assert_eq!(Timestamp::from(0x100).to_string(), "PostInit");
        assert!(Timestamp::from(0x2000_0000).is_post_init());
        assert!(Timestamp::from(0x100).parts(0).is_none());
    }

    #[cfg(feature = "time")]
    #[test]
    fn timestamp_parts() {
        // 2021-03-04T05:06:07Z
        let ts = Timestamp::from(1_614_834_367);
        let parts = ts.parts(0).unwrap();

        assert_eq!(parts.date(false).as_deref(), Some("03/04/2021"));
        assert_eq!(parts.date(true).as_deref(), Some("Mar-04-2021"));
        assert_eq!(parts.time().as_deref(), Some("05:06:07"));
        assert_eq!(ts.long_string(0), "03/04/2021 - 05:06:07");
        assert_eq!(ts.long_string(3600), "03/04/2021 - 06:06:07");
        assert_eq!(ts.to_string(), "2021-03-04T05:06:07Z");
    }

    #[cfg(feature = "time")]
    #[test]
    fn offset_crosses_into_the_next_year() {
        // 2021-12-31T23:30:00Z
        let ts = Timestamp::from(1_640_993_400);
        let parts = ts.parts(3600).unwrap();

        assert_eq!(parts.date(true).as_deref(), Some("Jan-01-2022"));
        assert_eq!(parts.date(false).as_deref(), Some("01/01/2022"));
        assert_eq!(parts.time().as_deref(), Some("00:30:00"));

        let parts = ts.parts(-7200).unwrap();
        assert_eq!(parts.time().as_deref(), Some("21:30:00"));
    }
}
