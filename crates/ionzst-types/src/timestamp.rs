use std::fmt;

use chrono::{Datelike, NaiveDate, TimeDelta, Timelike};

use crate::decimal::Decimal;
use crate::error::TypeError;

/// How many components of a [`Timestamp`] are significant.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Precision {
    Year,
    Month,
    Day,
    Minute,
    Second,
    Fraction,
}

/// An Ion timestamp, stored as the local wall-clock components shown in
/// text form plus the offset from UTC.
///
/// The binary encoding stores UTC components; [`Timestamp::from_utc`] and
/// [`Timestamp::utc_components`] convert between the two. An offset of
/// `None` is the "unknown local offset" `-00:00`, for which local and UTC
/// components coincide. Timestamps below minute precision never carry an
/// offset.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Timestamp {
    year: u16,
    month: u8,
    day: u8,
    hour: u8,
    minute: u8,
    second: u8,
    fraction: Option<Decimal>,
    offset: Option<i16>,
    precision: Precision,
}

/// UTC date and time-of-day components, as stored on the wire.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct UtcComponents {
    pub year: u16,
    pub month: u8,
    pub day: u8,
    pub hour: u8,
    pub minute: u8,
}

const MAX_OFFSET_MINUTES: i32 = 24 * 60 - 1;

impl Timestamp {
    /// Year precision, e.g. `2024T`.
    pub fn year(year: u16) -> Result<Self, TypeError> {
        Self::date_parts(Precision::Year, year, 1, 1)
    }

    /// Month precision, e.g. `2024-05T`.
    pub fn year_month(year: u16, month: u8) -> Result<Self, TypeError> {
        Self::date_parts(Precision::Month, year, month, 1)
    }

    /// Day precision, e.g. `2024-05-17`.
    pub fn date(year: u16, month: u8, day: u8) -> Result<Self, TypeError> {
        Self::date_parts(Precision::Day, year, month, day)
    }

    fn date_parts(precision: Precision, year: u16, month: u8, day: u8) -> Result<Self, TypeError> {
        if !(1..=9999).contains(&year) {
            return Err(TypeError::InvalidTimestamp {
                reason: "year must be in 1..=9999",
            });
        }
        if NaiveDate::from_ymd_opt(i32::from(year), u32::from(month), u32::from(day)).is_none() {
            return Err(TypeError::InvalidTimestamp {
                reason: "no such date",
            });
        }
        Ok(Self {
            year,
            month,
            day,
            hour: 0,
            minute: 0,
            second: 0,
            fraction: None,
            offset: None,
            precision,
        })
    }

    /// Extend a day-precision timestamp to minute precision in local time.
    pub fn at_minute(self, hour: u8, minute: u8, offset: Option<i16>) -> Result<Self, TypeError> {
        if hour > 23 || minute > 59 {
            return Err(TypeError::InvalidTimestamp {
                reason: "time of day out of range",
            });
        }
        if let Some(minutes) = offset {
            if i32::from(minutes).abs() > MAX_OFFSET_MINUTES {
                return Err(TypeError::InvalidOffset {
                    minutes: i32::from(minutes),
                });
            }
        }
        Ok(Self {
            hour,
            minute,
            offset,
            precision: Precision::Minute,
            ..self
        })
    }

    /// Extend to second precision in local time.
    pub fn at_second(
        self,
        hour: u8,
        minute: u8,
        second: u8,
        offset: Option<i16>,
    ) -> Result<Self, TypeError> {
        if second > 59 {
            return Err(TypeError::InvalidTimestamp {
                reason: "second out of range",
            });
        }
        Ok(Self {
            second,
            precision: Precision::Second,
            ..self.at_minute(hour, minute, offset)?
        })
    }

    /// Add fractional seconds to a second-precision timestamp.
    ///
    /// A zero fraction with a non-negative exponent carries no digits and
    /// leaves the precision at seconds.
    pub fn with_fraction(self, fraction: Decimal) -> Result<Self, TypeError> {
        if self.precision < Precision::Second {
            return Err(TypeError::InvalidTimestamp {
                reason: "fraction requires second precision",
            });
        }
        if fraction.coefficient.is_negative() && !fraction.coefficient.is_zero() {
            return Err(TypeError::InvalidFraction);
        }
        if fraction.exponent >= 0 {
            if fraction.coefficient.is_zero() {
                return Ok(self);
            }
            return Err(TypeError::InvalidFraction);
        }
        let width = usize::try_from(fraction.exponent.unsigned_abs()).unwrap_or(usize::MAX);
        if fraction.coefficient.magnitude_digits().len() > width && !fraction.coefficient.is_zero() {
            return Err(TypeError::InvalidFraction);
        }
        Ok(Self {
            fraction: Some(fraction),
            precision: Precision::Fraction,
            ..self
        })
    }

    /// Build from the UTC components stored in binary form, converting the
    /// time of day to local time using `offset`.
    pub fn from_utc(
        precision: Precision,
        utc: UtcComponents,
        second: u8,
        fraction: Option<Decimal>,
        offset: Option<i16>,
    ) -> Result<Self, TypeError> {
        match precision {
            Precision::Year => Self::year(utc.year),
            Precision::Month => Self::year_month(utc.year, utc.month),
            Precision::Day => Self::date(utc.year, utc.month, utc.day),
            Precision::Minute | Precision::Second | Precision::Fraction => {
                let delta = i64::from(offset.unwrap_or(0));
                let local = shift_minutes(utc, delta)?;
                let ts = Self::date(local.year, local.month, local.day)?;
                let ts = if precision == Precision::Minute {
                    ts.at_minute(local.hour, local.minute, offset)?
                } else {
                    ts.at_second(local.hour, local.minute, second, offset)?
                };
                match fraction {
                    Some(fraction) if precision == Precision::Fraction => ts.with_fraction(fraction),
                    _ => Ok(ts),
                }
            }
        }
    }

    /// The date and time of day in UTC, as written in binary form.
    pub fn utc_components(&self) -> Result<UtcComponents, TypeError> {
        let local = UtcComponents {
            year: self.year,
            month: self.month,
            day: self.day,
            hour: self.hour,
            minute: self.minute,
        };
        if self.precision < Precision::Minute {
            return Ok(local);
        }
        shift_minutes(local, -i64::from(self.offset.unwrap_or(0)))
    }

    pub fn precision(&self) -> Precision {
        self.precision
    }

    pub fn year_component(&self) -> u16 {
        self.year
    }

    pub fn month(&self) -> u8 {
        self.month
    }

    pub fn day(&self) -> u8 {
        self.day
    }

    pub fn hour(&self) -> u8 {
        self.hour
    }

    pub fn minute(&self) -> u8 {
        self.minute
    }

    pub fn second(&self) -> u8 {
        self.second
    }

    pub fn fraction(&self) -> Option<&Decimal> {
        self.fraction.as_ref()
    }

    /// Offset from UTC in minutes; `None` is the unknown offset.
    pub fn offset(&self) -> Option<i16> {
        self.offset
    }
}

fn shift_minutes(at: UtcComponents, delta: i64) -> Result<UtcComponents, TypeError> {
    let invalid = TypeError::InvalidTimestamp {
        reason: "no such date",
    };
    let shifted = NaiveDate::from_ymd_opt(i32::from(at.year), u32::from(at.month), u32::from(at.day))
        .and_then(|date| date.and_hms_opt(u32::from(at.hour), u32::from(at.minute), 0))
        .and_then(|time| time.checked_add_signed(TimeDelta::minutes(delta)))
        .ok_or(invalid)?;

    let year = u16::try_from(shifted.year())
        .ok()
        .filter(|year| (1..=9999).contains(year))
        .ok_or(TypeError::InvalidTimestamp {
            reason: "year must be in 1..=9999",
        })?;

    #[allow(clippy::cast_possible_truncation)]
    Ok(UtcComponents {
        year,
        month: shifted.month() as u8,
        day: shifted.day() as u8,
        hour: shifted.hour() as u8,
        minute: shifted.minute() as u8,
    })
}

impl fmt::Display for Timestamp {
    /// Ion text form: `2024T`, `2024-05T`, `2024-05-17`,
    /// `2024-05-17T09:30:15.250+02:00`, ...
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.precision {
            Precision::Year => return write!(f, "{:04}T", self.year),
            Precision::Month => return write!(f, "{:04}-{:02}T", self.year, self.month),
            Precision::Day => return write!(f, "{:04}-{:02}-{:02}", self.year, self.month, self.day),
            _ => {}
        }

        write!(
            f,
            "{:04}-{:02}-{:02}T{:02}:{:02}",
            self.year, self.month, self.day, self.hour, self.minute
        )?;
        if self.precision >= Precision::Second {
            write!(f, ":{:02}", self.second)?;
        }
        if let Some(fraction) = &self.fraction {
            let width = usize::try_from(fraction.exponent.unsigned_abs()).unwrap_or(0);
            let digits = fraction.coefficient.magnitude_digits();
            f.write_str(".")?;
            // Explicit padding: format widths are capped at u16::MAX.
            for _ in digits.len()..width {
                f.write_str("0")?;
            }
            f.write_str(&digits)?;
        }
        match self.offset {
            None => f.write_str("-00:00"),
            Some(0) => f.write_str("Z"),
            Some(minutes) => {
                let sign = if minutes < 0 { '-' } else { '+' };
                let minutes = minutes.unsigned_abs();
                write!(f, "{sign}{:02}:{:02}", minutes / 60, minutes % 60)
            }
        }
    }
}
