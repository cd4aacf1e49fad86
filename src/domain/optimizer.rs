//! Lowest-emissions charging window search.
//!
//! [`ChargingWindowOptimizer`] walks hour-aligned start times inside the
//! request window, prices each feasible one against the intensity series,
//! and keeps the cheapest. The hour lookup it builds lives only for the
//! duration of one call.

use std::collections::HashMap;

use chrono::{DateTime, TimeDelta, Utc};

use super::{ChargingRecommendation, ChargingRequest, IntensityPoint, TimeRange};

/// Absolute floor of the tie tolerance, kg CO₂.
pub const TIE_ABS_TOLERANCE: f64 = 1e-9;

/// Relative tie tolerance, scaled by the larger of the two totals compared.
pub const TIE_REL_TOLERANCE: f64 = 1e-9;

/// Explanation attached to every recommendation.
pub const EXPLANATION: &str = "Start times are evaluated on hourly boundaries within the requested \
window using historical average grid carbon intensity; each full hour is charged at maximum power \
and a final partial hour is weighted by its fraction. Candidates overlapping hours without data are \
skipped. Ties within floating-point tolerance resolve to the earliest start.";

const MILLIS_PER_HOUR: f64 = 3_600_000.0;
const SECONDS_PER_HOUR: i64 = 3_600;

/// Remainders below this (hours) are treated as no partial hour.
const REMAINDER_EPSILON: f64 = 1e-9;

/// Failure outcomes of [`ChargingWindowOptimizer::optimize`].
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum OptimizerError {
    /// The request violates a precondition.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// No intensity data was supplied.
    #[error("intensity series is empty")]
    EmptySeries,

    /// No start time fits both the window and the available data.
    #[error(
        "infeasible: no feasible start time for {duration_hours} h in {window} \
         ({rejected_by_window} candidates overrun the window, {rejected_by_gap} hit data gaps)"
    )]
    Infeasible {
        /// Requested window.
        window: TimeRange,
        /// Required charging duration.
        duration_hours: f64,
        /// Candidates whose end would pass the window end.
        rejected_by_window: usize,
        /// Candidates needing an hour with no intensity data.
        rejected_by_gap: usize,
    },
}

/// Searches for the minimum-emissions hourly start time.
///
/// Stateless; one instance can serve any number of concurrent calls.
#[derive(Debug, Clone, Copy, Default)]
pub struct ChargingWindowOptimizer;

impl ChargingWindowOptimizer {
    /// Creates an optimizer.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Finds the start time in the request window that minimizes emissions.
    ///
    /// # Errors
    ///
    /// - [`OptimizerError::InvalidRequest`] if [`ChargingRequest::validate`]
    ///   rejects the request.
    /// - [`OptimizerError::EmptySeries`] if `series` has no points.
    /// - [`OptimizerError::Infeasible`] if no candidate fits the window with
    ///   full data coverage, or the session rounds to zero length.
    pub fn optimize(
        &self,
        request: &ChargingRequest,
        series: &[IntensityPoint],
    ) -> Result<ChargingRecommendation, OptimizerError> {
        let window = request.validate()?;
        if series.is_empty() {
            return Err(OptimizerError::EmptySeries);
        }

        let duration_hours = request.duration_hours();
        let infeasible = |rejected_by_window, rejected_by_gap| OptimizerError::Infeasible {
            window,
            duration_hours,
            rejected_by_window,
            rejected_by_gap,
        };

        #[allow(clippy::cast_precision_loss)]
        let window_hours = (window.end - window.start).num_milliseconds() as f64 / MILLIS_PER_HOUR;
        if duration_hours > window_hours {
            return Err(infeasible(0, 0));
        }
        #[allow(clippy::cast_possible_truncation)]
        let duration_ms = (duration_hours * MILLIS_PER_HOUR).round() as i64;
        // Sub-millisecond sessions would end where they start.
        let Some(duration) =
            TimeDelta::try_milliseconds(duration_ms).filter(|d| *d > TimeDelta::zero())
        else {
            return Err(infeasible(0, 0));
        };
        let full_hours = duration_hours.floor();
        let remainder = duration_hours - full_hours;
        #[allow(clippy::cast_possible_truncation)]
        let full_hours = full_hours as i64;

        let lookup = hourly_lookup(series);
        let one_hour = TimeDelta::hours(1);

        let Some(mut candidate) = floor_to_hour(window.start) else {
            return Err(infeasible(0, 0));
        };
        if candidate < window.start {
            let Some(next) = candidate.checked_add_signed(one_hour) else {
                return Err(infeasible(0, 0));
            };
            candidate = next;
        }

        let mut best: Option<(DateTime<Utc>, f64)> = None;
        let mut rejected_by_window = 0;
        let mut rejected_by_gap = 0;

        while candidate < window.end {
            let fits = candidate
                .checked_add_signed(duration)
                .is_some_and(|end| end <= window.end);
            if !fits {
                rejected_by_window += 1;
            } else if let Some(total) = session_emissions(
                &lookup,
                candidate,
                request.max_charging_kw,
                full_hours,
                remainder,
            ) {
                let improves = best.is_none_or(|(_, best_total)| is_better(total, best_total));
                if improves {
                    best = Some((candidate, total));
                }
            } else {
                tracing::trace!(%candidate, "candidate skipped: data gap");
                rejected_by_gap += 1;
            }
            let Some(next) = candidate.checked_add_signed(one_hour) else {
                break;
            };
            candidate = next;
        }

        let Some((start, end, total)) = best.and_then(|(start, total)| {
            start
                .checked_add_signed(duration)
                .map(|end| (start, end, total))
        }) else {
            return Err(infeasible(rejected_by_window, rejected_by_gap));
        };

        Ok(ChargingRecommendation {
            zone: request.zone.clone(),
            recommended_start: start,
            recommended_end: end,
            estimated_emissions_kg: total.max(0.0),
            explanation: EXPLANATION.to_string(),
        })
    }
}

/// Tie-aware comparison: `candidate` beats `incumbent` only by more than the
/// tolerance, so equal totals keep the earlier incumbent.
fn is_better(candidate: f64, incumbent: f64) -> bool {
    if !candidate.is_finite() {
        return false;
    }
    if !incumbent.is_finite() {
        return true;
    }
    let tolerance = TIE_ABS_TOLERANCE.max(TIE_REL_TOLERANCE * candidate.abs().max(incumbent.abs()));
    candidate < incumbent - tolerance
}

/// Hour bucket start to intensity. Sub-hourly points are averaged into their
/// bucket; negative or non-finite points are treated as missing data.
fn hourly_lookup(series: &[IntensityPoint]) -> HashMap<DateTime<Utc>, f64> {
    let mut sums: HashMap<DateTime<Utc>, (f64, u32)> = HashMap::with_capacity(series.len());
    for point in series {
        if !(point.kg_co2_per_kwh.is_finite() && point.kg_co2_per_kwh >= 0.0) {
            continue;
        }
        if let Some(bucket) = floor_to_hour(point.timestamp) {
            let entry = sums.entry(bucket).or_insert((0.0, 0));
            entry.0 += point.kg_co2_per_kwh;
            entry.1 += 1;
        }
    }
    sums.into_iter()
        .map(|(bucket, (sum, count))| (bucket, sum / f64::from(count)))
        .collect()
}

/// Total kg CO₂ for a session starting at `start`, or `None` on a data gap.
fn session_emissions(
    lookup: &HashMap<DateTime<Utc>, f64>,
    start: DateTime<Utc>,
    power_kw: f64,
    full_hours: i64,
    remainder_hours: f64,
) -> Option<f64> {
    let one_hour = TimeDelta::hours(1);
    // The starting hour is always charged in, however short the session.
    if !lookup.contains_key(&start) {
        return None;
    }
    let mut bucket = start;
    let mut total = 0.0;
    for _ in 0..full_hours {
        total += power_kw * lookup.get(&bucket)?;
        bucket = bucket.checked_add_signed(one_hour)?;
    }
    if remainder_hours > REMAINDER_EPSILON {
        total += power_kw * remainder_hours * lookup.get(&bucket)?;
    }
    total.is_finite().then_some(total)
}

fn floor_to_hour(instant: DateTime<Utc>) -> Option<DateTime<Utc>> {
    let secs = instant.timestamp();
    DateTime::from_timestamp(secs - secs.rem_euclid(SECONDS_PER_HOUR), 0)
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use crate::domain::{MAX_WINDOW_HOURS, ZoneId};
    use chrono::TimeZone;

    fn at(hour: u32, minute: u32) -> DateTime<Utc> {
        let Some(t) = Utc.with_ymd_and_hms(2024, 1, 15, hour, minute, 0).single() else {
            panic!("valid time");
        };
        t
    }

    fn request(start: DateTime<Utc>, end: DateTime<Utc>, kwh: f64, kw: f64) -> ChargingRequest {
        let Ok(zone) = ZoneId::new("TEST") else {
            panic!("valid zone");
        };
        ChargingRequest {
            zone,
            window_start: start,
            window_end: end,
            kwh_needed: kwh,
            max_charging_kw: kw,
        }
    }

    fn hourly(values: &[f64]) -> Vec<IntensityPoint> {
        values
            .iter()
            .zip(0u32..)
            .map(|(v, h)| IntensityPoint::new(at(h, 0), *v))
            .collect()
    }

    fn run(req: &ChargingRequest, series: &[IntensityPoint]) -> ChargingRecommendation {
        match ChargingWindowOptimizer::new().optimize(req, series) {
            Ok(rec) => rec,
            Err(err) => panic!("expected recommendation, got {err}"),
        }
    }

    #[test]
    fn flat_series_picks_earliest_start() {
        let req = request(at(0, 0), at(6, 0), 10.0, 5.0);
        let rec = run(&req, &hourly(&[0.5; 6]));
        assert_eq!(rec.recommended_start, at(0, 0));
        assert_eq!(rec.recommended_end, at(2, 0));
        assert!((rec.estimated_emissions_kg - 5.0).abs() < 1e-9);
    }

    #[test]
    fn avoids_intensity_spike() {
        let req = request(at(0, 0), at(6, 0), 10.0, 5.0);
        let rec = run(&req, &hourly(&[0.1, 5.0, 0.1, 0.1, 0.1, 0.1]));
        assert_eq!(rec.recommended_start, at(2, 0));
        assert_eq!(rec.recommended_end, at(4, 0));
        assert!((rec.estimated_emissions_kg - 1.0).abs() < 1e-9);
    }

    #[test]
    fn fractional_final_hour() {
        let req = request(at(0, 0), at(6, 0), 12.5, 5.0);
        let rec = run(&req, &hourly(&[1.0; 6]));
        assert_eq!(rec.recommended_start, at(0, 0));
        assert_eq!(rec.recommended_end, at(2, 30));
        assert!((rec.estimated_emissions_kg - 12.5).abs() < 1e-9);
    }

    #[test]
    fn fractional_hour_uses_its_own_bucket() {
        // 1.5 h: 5 kW × 1 h × 0.2 + 5 kW × 0.5 h × 0.8 = 3.0
        let req = request(at(0, 0), at(2, 0), 7.5, 5.0);
        let rec = run(&req, &hourly(&[0.2, 0.8]));
        assert!((rec.estimated_emissions_kg - 3.0).abs() < 1e-9);
    }

    #[test]
    fn window_too_short_is_infeasible() {
        let req = request(at(0, 0), at(1, 0), 10.0, 5.0);
        let result = ChargingWindowOptimizer::new().optimize(&req, &hourly(&[0.5; 6]));
        assert!(matches!(result, Err(OptimizerError::Infeasible { .. })));
    }

    #[test]
    fn tie_resolves_to_first_hour() {
        let req = request(at(0, 0), at(4, 0), 5.0, 5.0);
        let rec = run(&req, &hourly(&[0.3, 0.9, 0.3, 0.3]));
        assert_eq!(rec.recommended_start, at(0, 0));
        assert_eq!(rec.recommended_end, at(1, 0));
    }

    #[test]
    fn float_noise_is_a_tie() {
        let req = request(at(0, 0), at(2, 0), 5.0, 5.0);
        let series = vec![
            IntensityPoint::new(at(0, 0), 0.1 + 0.2),
            IntensityPoint::new(at(1, 0), 0.3),
        ];
        let rec = run(&req, &series);
        assert_eq!(rec.recommended_start, at(0, 0));
    }

    #[test]
    fn small_real_difference_is_not_a_tie() {
        let req = request(at(0, 0), at(2, 0), 5.0, 5.0);
        let rec = run(&req, &hourly(&[0.3001, 0.3]));
        assert_eq!(rec.recommended_start, at(1, 0));
    }

    #[test]
    fn unaligned_window_start_rounds_up() {
        let req = request(at(0, 30), at(6, 0), 5.0, 5.0);
        let rec = run(&req, &hourly(&[0.0, 0.5, 0.5, 0.5, 0.5, 0.5]));
        assert_eq!(rec.recommended_start, at(1, 0));
        assert!(rec.recommended_start >= req.window_start);
    }

    #[test]
    fn data_gap_skips_candidate() {
        let req = request(at(0, 0), at(4, 0), 10.0, 5.0);
        let series = vec![
            IntensityPoint::new(at(0, 0), 0.1),
            IntensityPoint::new(at(2, 0), 0.5),
            IntensityPoint::new(at(3, 0), 0.5),
        ];
        let rec = run(&req, &series);
        assert_eq!(rec.recommended_start, at(2, 0));
    }

    #[test]
    fn total_data_gap_is_infeasible() {
        let req = request(at(0, 0), at(4, 0), 10.0, 5.0);
        let series = vec![
            IntensityPoint::new(at(0, 0), 0.1),
            IntensityPoint::new(at(2, 0), 0.5),
        ];
        let result = ChargingWindowOptimizer::new().optimize(&req, &series);
        let Err(OptimizerError::Infeasible {
            rejected_by_window,
            rejected_by_gap,
            ..
        }) = result
        else {
            panic!("expected infeasible, got {result:?}");
        };
        assert_eq!(rejected_by_window, 1);
        assert_eq!(rejected_by_gap, 3);
    }

    #[test]
    fn rejects_invalid_requests() {
        let optimizer = ChargingWindowOptimizer::new();
        let series = hourly(&[0.5; 4]);
        for req in [
            request(at(2, 0), at(2, 0), 5.0, 5.0),
            request(at(3, 0), at(2, 0), 5.0, 5.0),
            request(at(0, 0), at(4, 0), 0.0, 5.0),
            request(at(0, 0), at(4, 0), 5.0, -1.0),
            request(at(0, 0), at(4, 0), f64::NAN, 5.0),
        ] {
            assert!(matches!(
                optimizer.optimize(&req, &series),
                Err(OptimizerError::InvalidRequest(_))
            ));
        }
    }

    #[test]
    fn empty_series_is_reported() {
        let req = request(at(0, 0), at(4, 0), 5.0, 5.0);
        assert_eq!(
            ChargingWindowOptimizer::new().optimize(&req, &[]),
            Err(OptimizerError::EmptySeries)
        );
    }

    #[test]
    fn window_longer_than_cap_is_invalid() {
        let optimizer = ChargingWindowOptimizer::new();
        let series = hourly(&[0.5]);
        let longest = request(
            at(0, 0),
            at(0, 0) + TimeDelta::hours(MAX_WINDOW_HOURS),
            1.0,
            1.0,
        );
        let Ok(rec) = optimizer.optimize(&longest, &series) else {
            panic!("window at the cap is accepted");
        };
        assert_eq!(rec.recommended_start, at(0, 0));

        let too_long = request(
            at(0, 0),
            at(0, 0) + TimeDelta::hours(MAX_WINDOW_HOURS + 1),
            1.0,
            1.0,
        );
        assert!(matches!(
            optimizer.optimize(&too_long, &series),
            Err(OptimizerError::InvalidRequest(_))
        ));
    }

    #[test]
    fn window_at_end_of_time_is_invalid() {
        let end = DateTime::<Utc>::MAX_UTC;
        let Some(start) = end.checked_sub_signed(TimeDelta::hours(5)) else {
            panic!("representable start");
        };
        let req = request(start, end, 5.0, 1.0);
        let series = [IntensityPoint::new(start, 0.5)];
        let result = ChargingWindowOptimizer::new().optimize(&req, &series);
        assert!(matches!(result, Err(OptimizerError::InvalidRequest(_))));
    }

    #[test]
    fn window_near_end_of_time_does_not_overflow() {
        let (Some(end), Some(start)) = (
            DateTime::<Utc>::MAX_UTC.checked_sub_signed(TimeDelta::hours(2)),
            DateTime::<Utc>::MAX_UTC.checked_sub_signed(TimeDelta::hours(8)),
        ) else {
            panic!("representable window");
        };
        let Some(bucket) = floor_to_hour(start) else {
            panic!("representable bucket");
        };
        let req = request(start, end, 6.0, 1.0);
        let series = [IntensityPoint::new(bucket + TimeDelta::hours(1), 0.5)];
        let result = ChargingWindowOptimizer::new().optimize(&req, &series);
        assert!(matches!(result, Err(OptimizerError::Infeasible { .. })));
    }

    #[test]
    fn sub_millisecond_session_is_infeasible() {
        let req = request(at(0, 0), at(4, 0), 1e-10, 1.0);
        let series = [IntensityPoint::new(at(0, 0) + TimeDelta::days(30), 0.5)];
        let result = ChargingWindowOptimizer::new().optimize(&req, &series);
        assert!(matches!(result, Err(OptimizerError::Infeasible { .. })));
    }

    #[test]
    fn short_session_needs_its_starting_hour() {
        let req = request(at(0, 0), at(2, 0), 0.01, 1.0);
        let rec = run(&req, &[IntensityPoint::new(at(1, 0), 0.4)]);
        assert_eq!(rec.recommended_start, at(1, 0));
        assert!((rec.estimated_emissions_kg - 0.004).abs() < 1e-12);
    }

    #[test]
    fn sub_hourly_points_are_averaged() {
        let req = request(at(0, 0), at(2, 0), 1.0, 1.0);
        let series = vec![
            IntensityPoint::new(at(0, 0), 1.0),
            IntensityPoint::new(at(0, 30), 0.0),
            IntensityPoint::new(at(1, 0), 0.6),
        ];
        let rec = run(&req, &series);
        assert_eq!(rec.recommended_start, at(0, 0));
        assert!((rec.estimated_emissions_kg - 0.5).abs() < 1e-12);
    }

    #[test]
    fn non_finite_points_are_missing_data() {
        let req = request(at(0, 0), at(3, 0), 1.0, 1.0);
        let series = vec![
            IntensityPoint::new(at(0, 0), f64::NAN),
            IntensityPoint::new(at(1, 0), 0.5),
            IntensityPoint::new(at(2, 0), f64::INFINITY),
        ];
        let rec = run(&req, &series);
        assert_eq!(rec.recommended_start, at(1, 0));
        assert!((rec.estimated_emissions_kg - 0.5).abs() < 1e-12);
    }

    #[test]
    fn non_finite_total_never_wins() {
        assert!(!is_better(f64::NAN, 1.0));
        assert!(is_better(1.0, f64::NAN));
        assert!(!is_better(f64::INFINITY, 1.0));
    }

    #[test]
    fn result_respects_window_and_duration() {
        let intensities = [0.7, 0.2, 0.9, 0.4, 0.1, 0.6, 0.3, 0.8];
        let series = hourly(&intensities);
        for (kwh, kw) in [(3.0, 7.0), (11.0, 3.5), (22.0, 11.0), (7.0, 2.0)] {
            let req = request(at(0, 0), at(8, 0), kwh, kw);
            let rec = run(&req, &series);
            assert!(rec.recommended_start >= req.window_start);
            assert!(rec.recommended_end <= req.window_end);
            #[allow(clippy::cast_precision_loss)]
            let hours = (rec.recommended_end - rec.recommended_start).num_milliseconds() as f64
                / MILLIS_PER_HOUR;
            assert!((hours - kwh / kw).abs() < 1e-6);
            assert!(rec.estimated_emissions_kg >= 0.0);
        }
    }
}
