use chrono::{DateTime, Duration, LocalResult, NaiveDate, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;

/// Half-open fetch window `[start, end)` over one calendar day in the
/// digest timezone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchWindow {
    start: DateTime<Tz>,
    end: DateTime<Tz>,
}

impl FetchWindow {
    /// Window covering the previous calendar day in `tz`, relative to `now`.
    #[must_use]
    pub fn previous_day(tz: Tz, now: DateTime<Utc>) -> Self {
        let today = now.with_timezone(&tz).date_naive();
        // pred_opt is None only at the calendar minimum, unreachable for
        // wall clocks
        let yesterday = today.pred_opt().unwrap_or(today);
        Self::for_day(tz, yesterday)
    }

    /// Window covering the whole of `day` in `tz`.
    #[must_use]
    pub fn for_day(tz: Tz, day: NaiveDate) -> Self {
        let next = day.succ_opt().unwrap_or(day);
        Self {
            start: local_midnight(tz, day),
            end: local_midnight(tz, next),
        }
    }

    /// Whether `instant` falls inside the window. Start is inclusive,
    /// end is exclusive.
    #[must_use]
    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        self.start_utc() <= instant && instant < self.end_utc()
    }

    #[must_use]
    pub fn start_utc(&self) -> DateTime<Utc> {
        self.start.with_timezone(&Utc)
    }

    #[must_use]
    pub fn end_utc(&self) -> DateTime<Utc> {
        self.end.with_timezone(&Utc)
    }

    /// The calendar day the window covers.
    #[must_use]
    pub fn day(&self) -> NaiveDate {
        self.start.date_naive()
    }

    #[must_use]
    pub fn timezone(&self) -> Tz {
        self.start.timezone()
    }
}

fn local_midnight(tz: Tz, day: NaiveDate) -> DateTime<Tz> {
    let mut naive = day.and_time(NaiveTime::MIN);
    // A DST gap can skip local midnight; the day then starts at the first
    // representable instant after it.
    loop {
        match naive.and_local_timezone(tz) {
            LocalResult::Single(dt) => return dt,
            LocalResult::Ambiguous(earliest, _) => return earliest,
            LocalResult::None => naive += Duration::hours(1),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono_tz::Asia::Seoul;

    #[test]
    fn previous_day_in_seoul() {
        // 2024-05-02 10:00 KST
        let now = Utc.with_ymd_and_hms(2024, 5, 2, 1, 0, 0).unwrap();
        let window = FetchWindow::previous_day(Seoul, now);

        assert_eq!(window.day(), NaiveDate::from_ymd_opt(2024, 5, 1).unwrap());
        // KST is UTC+9, so the day starts at 15:00 UTC the evening before
        assert_eq!(
            window.start_utc(),
            Utc.with_ymd_and_hms(2024, 4, 30, 15, 0, 0).unwrap()
        );
        assert_eq!(
            window.end_utc(),
            Utc.with_ymd_and_hms(2024, 5, 1, 15, 0, 0).unwrap()
        );
    }

    #[test]
    fn local_date_decides_which_day_is_yesterday() {
        // 23:30 UTC on May 1st is already May 2nd in Seoul, so the window
        // must cover May 1st
        let now = Utc.with_ymd_and_hms(2024, 5, 1, 23, 30, 0).unwrap();
        let window = FetchWindow::previous_day(Seoul, now);
        assert_eq!(window.day(), NaiveDate::from_ymd_opt(2024, 5, 1).unwrap());
    }

    #[test]
    fn window_is_half_open() {
        let day = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap();
        let window = FetchWindow::for_day(Seoul, day);

        assert!(window.contains(window.start_utc()), "start is inclusive");
        assert!(!window.contains(window.end_utc()), "end is exclusive");
        assert!(window.contains(window.end_utc() - Duration::seconds(1)));
        assert!(!window.contains(window.start_utc() - Duration::seconds(1)));
    }

    #[test]
    fn window_spans_exactly_one_day() {
        let day = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap();
        let window = FetchWindow::for_day(Seoul, day);
        assert_eq!(window.end_utc() - window.start_utc(), Duration::days(1));
    }
}
