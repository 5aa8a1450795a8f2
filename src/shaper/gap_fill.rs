use chrono::Duration;

use crate::models::Reading;

// ---

/// Cadence at which missing samples are flat-lined.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GapFillConfig {
    pub interval: Duration,
}

impl GapFillConfig {
    pub fn from_secs(secs: u32) -> Self {
        Self {
            interval: Duration::seconds(i64::from(secs)),
        }
    }
}

impl Default for GapFillConfig {
    fn default() -> Self {
        Self::from_secs(60)
    }
}

/// Insert zero-valued readings wherever two consecutive samples are more than
/// one interval apart.
///
/// For a gap `Δ > T`, `floor(Δ / T)` synthetic rows are placed at
/// `t + T, t + 2T, ...`. When `Δ` is an exact multiple of `T` the last
/// synthetic row shares its timestamp with the following real reading and is
/// kept in front of it.
///
/// `readings` must be sorted ascending by timestamp. Sequences of length 0 or
/// 1 come back unchanged, as does everything when the interval is not
/// positive.
pub fn fill_gaps(readings: &[Reading], config: GapFillConfig) -> Vec<Reading> {
    // ---
    let step = config.interval;
    if readings.len() < 2 || step <= Duration::zero() {
        return readings.to_vec();
    }

    let mut filled = Vec::with_capacity(readings.len());
    let mut inserted = 0usize;

    for pair in readings.windows(2) {
        let (current, next) = (&pair[0], &pair[1]);
        filled.push(current.clone());

        if next.timestamp - current.timestamp > step {
            // Every t + kT with kT <= Δ, i.e. k = 1..=floor(Δ / T).
            let mut at = current.timestamp + step;
            while at <= next.timestamp {
                filled.push(Reading::zeroed(at));
                inserted += 1;
                at += step;
            }
        }
    }

    if let Some(last) = readings.last() {
        filled.push(last.clone());
    }

    if inserted > 0 {
        tracing::debug!(
            "Gap filling inserted {} zero rows into {} readings",
            inserted,
            readings.len()
        );
    }
    filled
}
