//! Date-indexed numeric series and calendar-month period keys.

use chrono::{DateTime, Datelike, NaiveDate, TimeZone};
use std::cmp::Ordering;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Observation {
    pub date: NaiveDate,
    pub value: f64,
}

impl Observation {
    pub fn new(date: NaiveDate, value: f64) -> Self {
        Self { date, value }
    }

    /// Chronological order, with the value as a total-order tie-break so that
    /// sorting is independent of the input order even for duplicate dates.
    pub fn chronological_cmp(&self, other: &Self) -> Ordering {
        self.date
            .cmp(&other.date)
            .then_with(|| self.value.total_cmp(&other.value))
    }
}

/// An ordered sequence of (date, value) pairs. May be empty.
///
/// Input order is preserved as given; consumers that need chronology call
/// [`TimeSeries::sorted`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TimeSeries {
    observations: Vec<Observation>,
}

impl TimeSeries {
    pub fn new(observations: Vec<Observation>) -> Self {
        Self { observations }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn from_pairs<I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (NaiveDate, f64)>,
    {
        Self::new(
            pairs
                .into_iter()
                .map(|(date, value)| Observation::new(date, value))
                .collect(),
        )
    }

    /// Build from timezone-aware timestamps. Each timestamp is reduced to the
    /// calendar date in its own offset; the offset itself is discarded.
    pub fn from_datetimes<Tz, I>(pairs: I) -> Self
    where
        Tz: TimeZone,
        I: IntoIterator<Item = (DateTime<Tz>, f64)>,
    {
        Self::from_pairs(pairs.into_iter().map(|(ts, v)| (ts.date_naive(), v)))
    }

    pub fn len(&self) -> usize {
        self.observations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observations.is_empty()
    }

    pub fn observations(&self) -> &[Observation] {
        &self.observations
    }

    pub fn iter(&self) -> impl Iterator<Item = &Observation> {
        self.observations.iter()
    }

    /// Finite observations in chronological order.
    pub fn sorted(&self) -> Vec<Observation> {
        let mut obs: Vec<Observation> = self
            .observations
            .iter()
            .copied()
            .filter(|o| !o.value.is_nan())
            .collect();
        obs.sort_by(Observation::chronological_cmp);
        obs
    }

    /// The chronologically last non-NaN observation.
    pub fn latest(&self) -> Option<Observation> {
        self.sorted().last().copied()
    }

    /// The last two non-NaN values as `(latest, previous)`.
    pub fn latest_pair(&self) -> Option<(f64, f64)> {
        let sorted = self.sorted();
        match sorted.as_slice() {
            [.., prev, last] => Some((last.value, prev.value)),
            _ => None,
        }
    }
}

impl FromIterator<Observation> for TimeSeries {
    fn from_iter<T: IntoIterator<Item = Observation>>(iter: T) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

/// Calendar-month identity used to join series of different frequency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PeriodKey {
    pub year: i32,
    pub month: u32,
}

impl PeriodKey {
    pub fn new(year: i32, month: u32) -> Self {
        Self { year, month }
    }

    pub fn from_date(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }
}

impl fmt::Display for PeriodKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

/// Native sampling frequency, inferred from the median gap between dates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Frequency {
    Daily,
    Weekly,
    Monthly,
    Quarterly,
    Annual,
    Unknown,
}

impl Frequency {
    pub fn infer(series: &TimeSeries) -> Self {
        let mut dates: Vec<NaiveDate> = series.iter().map(|o| o.date).collect();
        dates.sort();
        dates.dedup();
        if dates.len() < 2 {
            return Frequency::Unknown;
        }

        let mut gaps: Vec<i64> = dates
            .windows(2)
            .map(|w| (w[1] - w[0]).num_days())
            .collect();
        gaps.sort_unstable();
        let median = gaps[gaps.len() / 2];

        match median {
            0..=4 => Frequency::Daily,
            5..=10 => Frequency::Weekly,
            11..=45 => Frequency::Monthly,
            46..=120 => Frequency::Quarterly,
            121..=400 => Frequency::Annual,
            _ => Frequency::Unknown,
        }
    }

    /// True when this frequency samples more often than a calendar month.
    pub fn is_sub_monthly(&self) -> bool {
        matches!(self, Frequency::Daily | Frequency::Weekly)
    }
}

impl fmt::Display for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Frequency::Daily => "daily",
            Frequency::Weekly => "weekly",
            Frequency::Monthly => "monthly",
            Frequency::Quarterly => "quarterly",
            Frequency::Annual => "annual",
            Frequency::Unknown => "unknown",
        };
        write!(f, "{}", s)
    }
}
