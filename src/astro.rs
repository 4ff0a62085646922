//! Time and astronomy math feeding the watch hands and subdials.
//!
//! Everything here is a pure function of a timestamp (plus the caller's
//! GMT offset). Angles are radians, clockwise, with zero pointing at the
//! 12 o'clock position; the rasterizer applies the screen rotation.

use chrono::{DateTime, Timelike, Utc};

/// Mean length of the synodic lunar month in days.
pub const SYNODIC_MONTH_DAYS: f64 = 29.53059;

/// Reference new moon: 2026-01-19T00:00:00Z, as unix milliseconds.
/// Every moon computation in the crate measures from this instant.
pub const NEW_MOON_EPOCH_UNIX_MS: i64 = 1_768_780_800_000;

/// Longitude adjustment applied to GMST, in degrees.
const SIDEREAL_LONGITUDE_DEG: f64 = -0.1278;

const MS_PER_DAY: f64 = 86_400_000.0;
const TAU: f64 = std::f64::consts::TAU;

/// Hand angles for one frame, radians clockwise from 12 o'clock.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClockAngles {
    pub hour: f64,
    pub minute: f64,
    pub second: f64,
    pub gmt: f64,
}

/// Decomposes a wall-clock time into continuous hand angles.
///
/// Fractions carry through: the second hand's sub-second fraction feeds the
/// minute hand, and the minute fraction feeds the hour hand, so every hand
/// sweeps smoothly instead of ticking. The GMT hand runs on a 24-hour
/// revolution; the offset is an unbounded whole number of hours, reduced
/// modulo 24 here.
pub fn clock_angles(now: &impl Timelike, gmt_offset_hours: i64) -> ClockAngles {
    let subsecond = f64::from(now.nanosecond()) / 1e9;
    let seconds = f64::from(now.second()) + subsecond;
    let minutes = f64::from(now.minute()) + seconds / 60.0;
    let hours = f64::from(now.hour() % 12) + minutes / 60.0;
    let gmt_hours =
        (i64::from(now.hour()) + gmt_offset_hours).rem_euclid(24) as f64 + minutes / 60.0;

    ClockAngles {
        hour: hours / 12.0 * TAU,
        minute: minutes / 60.0 * TAU,
        second: seconds / 60.0 * TAU,
        gmt: gmt_hours.rem_euclid(24.0) / 24.0 * TAU,
    }
}

/// Days since the reference new moon, wrapped into `[0, SYNODIC_MONTH_DAYS)`.
///
/// `rem_euclid` keeps the result non-negative for instants before the epoch.
pub fn moon_age(now: DateTime<Utc>) -> f64 {
    let days = (now.timestamp_millis() - NEW_MOON_EPOCH_UNIX_MS) as f64 / MS_PER_DAY;
    days.rem_euclid(SYNODIC_MONTH_DAYS)
}

/// Maps a moon age in days to one of the eight canonical phase slots.
///
/// The thresholds are deliberately uneven: the quarter phases look the same
/// for a much shorter stretch than the crescent and gibbous phases do.
pub fn moon_phase_index(age: f64) -> usize {
    match age {
        a if a < 1.84 => 0,  // new
        a if a < 7.38 => 1,  // waxing crescent
        a if a < 9.23 => 2,  // first quarter
        a if a < 14.77 => 3, // waxing gibbous
        a if a < 16.61 => 4, // full
        a if a < 22.15 => 5, // waning gibbous
        a if a < 23.99 => 6, // last quarter
        _ => 7,              // waning crescent
    }
}

/// Local sidereal angle in radians, `[0, 2pi)`.
///
/// Linear GMST approximation from days since J2000, adjusted by a fixed
/// longitude. No nutation or precession terms; the error is far below what
/// a subdial hand can show.
pub fn sidereal_angle(now: DateTime<Utc>) -> f64 {
    let julian_date = now.timestamp_millis() as f64 / MS_PER_DAY + 2_440_587.5;
    let days_since_j2000 = julian_date - 2_451_545.0;
    let gmst_deg = 280.460_618_37 + 360.985_647_366_29 * days_since_j2000;
    let local_deg = (gmst_deg.rem_euclid(360.0) + SIDEREAL_LONGITUDE_DEG).rem_euclid(360.0);
    local_deg / 360.0 * TAU
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, NaiveTime, TimeZone};

    fn time(h: u32, m: u32, s: u32, nano: u32) -> NaiveTime {
        NaiveTime::from_hms_nano_opt(h, m, s, nano).unwrap()
    }

    fn epoch() -> DateTime<Utc> {
        Utc.timestamp_millis_opt(NEW_MOON_EPOCH_UNIX_MS).unwrap()
    }

    #[test]
    fn gmt_angle_has_24_hour_period() {
        let t = time(10, 15, 30, 0);
        for k in [-49_i64, -1, 0, 5, 11, 23] {
            let a = clock_angles(&t, k).gmt;
            let b = clock_angles(&t, k + 24).gmt;
            assert!((a - b).abs() < 1e-12, "offset {k}: {a} vs {b}");
        }
    }

    #[test]
    fn negative_offset_matches_wrapped_positive() {
        let t = time(3, 0, 0, 0);
        let a = clock_angles(&t, -1).gmt;
        let b = clock_angles(&t, 23).gmt;
        assert!((a - b).abs() < 1e-12);
    }

    #[test]
    fn second_hand_advances_tau_over_60_per_second() {
        let a = clock_angles(&time(10, 15, 30, 0), 0);
        let b = clock_angles(&time(10, 15, 31, 0), 0);
        let step = (b.second - a.second).rem_euclid(TAU);
        assert!((step - TAU / 60.0).abs() < 1e-9);

        // across a minute boundary the wrap still yields one tick
        let c = clock_angles(&time(10, 15, 59, 0), 0);
        let d = clock_angles(&time(10, 16, 0, 0), 0);
        let step = (d.second - c.second).rem_euclid(TAU);
        assert!((step - TAU / 60.0).abs() < 1e-9);
    }

    #[test]
    fn minute_hand_advances_tau_over_3600_per_second() {
        let a = clock_angles(&time(7, 42, 10, 0), 0);
        let b = clock_angles(&time(7, 42, 11, 0), 0);
        let step = (b.minute - a.minute).rem_euclid(TAU);
        assert!((step - TAU / 3600.0).abs() < 1e-9);
    }

    #[test]
    fn subsecond_fraction_moves_the_second_hand() {
        let a = clock_angles(&time(0, 0, 0, 0), 0);
        let b = clock_angles(&time(0, 0, 0, 500_000_000), 0);
        assert!(b.second > a.second);
        assert!((b.second - a.second - TAU / 120.0).abs() < 1e-9);
    }

    #[test]
    fn moon_age_is_zero_at_reference_new_moon() {
        assert!(moon_age(epoch()) < 1e-9);
        assert_eq!(moon_phase_index(moon_age(epoch())), 0);
    }

    #[test]
    fn moon_age_stays_in_range_and_wraps() {
        // 29.53059 days expressed exactly in milliseconds
        let synodic_ms = (SYNODIC_MONTH_DAYS * MS_PER_DAY) as i64;
        for days in [-4000_i64, -31, -1, 0, 1, 17, 365, 10_000] {
            let t = epoch() + Duration::days(days);
            let age = moon_age(t);
            assert!((0.0..SYNODIC_MONTH_DAYS).contains(&age), "age {age}");
            let wrapped = moon_age(t + Duration::milliseconds(synodic_ms));
            assert!((wrapped - age).abs() < 1e-6, "{wrapped} vs {age}");
        }
    }

    #[test]
    fn phase_index_boundaries_are_exact() {
        let boundaries = [0.0, 1.84, 7.38, 9.23, 14.77, 16.61, 22.15, 23.99];
        for (expected, age) in boundaries.iter().enumerate() {
            assert_eq!(moon_phase_index(*age), expected, "at {age}");
            if *age > 0.0 {
                assert_eq!(moon_phase_index(age - 1e-9), expected - 1, "below {age}");
            }
        }
        assert_eq!(moon_phase_index(SYNODIC_MONTH_DAYS - 1e-9), 7);
    }

    #[test]
    fn gibbous_to_full_transition_near_half_month() {
        let t3 = epoch() + Duration::seconds((14.76 * 86_400.0) as i64);
        let t4 = epoch() + Duration::seconds((14.78 * 86_400.0) as i64);
        assert_eq!(moon_phase_index(moon_age(t3)), 3);
        assert_eq!(moon_phase_index(moon_age(t4)), 4);
    }

    #[test]
    fn sidereal_angle_drifts_forward_about_a_degree_per_day() {
        let t1 = epoch();
        let t2 = t1 + Duration::hours(24);
        let drift = (sidereal_angle(t2) - sidereal_angle(t1)).rem_euclid(TAU);
        // a sidereal day is ~3m56s shorter than a solar day
        let expected = 0.985_647_366_29_f64.to_radians();
        assert!((drift - expected).abs() < 1e-6, "drift {drift}");
    }

    #[test]
    fn sidereal_angle_is_normalized() {
        for days in [-100_000_i64, -1, 0, 1, 100_000] {
            let a = sidereal_angle(epoch() + Duration::days(days));
            assert!((0.0..TAU).contains(&a), "angle {a}");
            assert!(a.is_finite());
        }
    }
}
