use chrono::{Datelike, Duration, FixedOffset, NaiveDate, NaiveDateTime, Utc};

/// All scheduling decisions run on one fixed wall clock: Europe/Moscow,
/// UTC+3 without DST transitions. Never mix these values with the server's
/// local time.
pub fn moscow_offset() -> FixedOffset {
    FixedOffset::east_opt(3 * 3600).expect("UTC+3 is a valid offset")
}

/// Current Moscow wall-clock datetime.
pub fn now() -> NaiveDateTime {
    Utc::now().with_timezone(&moscow_offset()).naive_local()
}

/// Current Moscow date.
pub fn today() -> NaiveDate {
    now().date()
}

/// The Monday of the week containing `date`.
pub fn start_of_week(date: NaiveDate) -> NaiveDate {
    date - Duration::days(date.weekday().num_days_from_monday() as i64)
}

pub fn clamp_to_today(date: NaiveDate, today: NaiveDate) -> NaiveDate {
    date.max(today)
}

/// A slot stays offerable until it is more than two hours in the past.
/// The grace window is asymmetric on purpose: reminder scans use the same
/// threshold for filtering while the send windows stay strict.
pub fn is_near_term_or_future(slot: NaiveDateTime, now: NaiveDateTime) -> bool {
    slot.signed_duration_since(now) > Duration::hours(-2)
}

/// Next occurrence of the fixed local fire time: today if still ahead of
/// `now`, otherwise tomorrow.
pub fn next_daily_fire(now: NaiveDateTime, hour: u32, minute: u32) -> NaiveDateTime {
    let today_fire = now
        .date()
        .and_hms_opt(hour, minute, 0)
        .unwrap_or_else(|| now.date().and_hms_opt(18, 0, 0).expect("18:00 is valid"));

    if today_fire > now {
        today_fire
    } else {
        today_fire + Duration::days(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn start_of_week_is_monday() {
        // 2026-08-23 is a Sunday
        assert_eq!(start_of_week(date(2026, 8, 23)), date(2026, 8, 17));
        assert_eq!(start_of_week(date(2026, 8, 17)), date(2026, 8, 17));
        assert_eq!(start_of_week(date(2026, 8, 19)), date(2026, 8, 17));
    }

    #[test]
    fn clamp_never_returns_a_past_date() {
        let today = date(2026, 8, 23);
        assert_eq!(clamp_to_today(date(2026, 8, 17), today), today);
        assert_eq!(clamp_to_today(date(2026, 8, 30), today), date(2026, 8, 30));
    }

    #[test]
    fn near_term_grace_is_exactly_two_hours() {
        let now = date(2026, 8, 23).and_hms_opt(14, 0, 0).unwrap();

        // 3 hours in the past: gone
        assert!(!is_near_term_or_future(
            date(2026, 8, 23).and_hms_opt(11, 0, 0).unwrap(),
            now
        ));
        // exactly 2 hours in the past: boundary is exclusive
        assert!(!is_near_term_or_future(
            date(2026, 8, 23).and_hms_opt(12, 0, 0).unwrap(),
            now
        ));
        // 1 hour in the past: still offerable
        assert!(is_near_term_or_future(
            date(2026, 8, 23).and_hms_opt(13, 0, 0).unwrap(),
            now
        ));
        // any future slot
        assert!(is_near_term_or_future(
            date(2026, 8, 24).and_hms_opt(10, 0, 0).unwrap(),
            now
        ));
    }

    #[test]
    fn daily_fire_rolls_over_to_tomorrow() {
        let before = date(2026, 8, 23).and_hms_opt(17, 59, 0).unwrap();
        let after = date(2026, 8, 23).and_hms_opt(18, 0, 0).unwrap();

        assert_eq!(
            next_daily_fire(before, 18, 0),
            date(2026, 8, 23).and_hms_opt(18, 0, 0).unwrap()
        );
        assert_eq!(
            next_daily_fire(after, 18, 0),
            date(2026, 8, 24).and_hms_opt(18, 0, 0).unwrap()
        );
    }
}
