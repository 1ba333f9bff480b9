use crate::signal::Sample;

/// Scan order of [`find_peaks`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PeakDirection {
    Forward,
    Backward,
}

/// Generic local-maximum finder used for the P and T candidate searches.
///
/// Tracks the lowest value seen since the last accepted peak. A plateau
/// that is entered from below and left downward yields a candidate at its
/// midpoint; the candidate is accepted when it rises at least `min_height`
/// over that trough and lies more than `min_distance` samples from the
/// previously accepted peak. Indices come back in scan order.
pub fn find_peaks(
    data: &[Sample],
    direction: PeakDirection,
    min_distance: usize,
    min_height: f64,
) -> Vec<usize> {
    let n = data.len();
    if n < 3 {
        return Vec::new();
    }
    let v = |i: usize| data[i].voltage;
    let mut peaks: Vec<usize> = Vec::new();
    let mut trough: Option<f64> = None;

    let order: Box<dyn Iterator<Item = usize>> = match direction {
        PeakDirection::Forward => Box::new(1..n - 1),
        PeakDirection::Backward => Box::new((1..n - 1).rev()),
    };
    for i in order {
        let low = trough.map_or(v(i), |t| t.min(v(i)));
        trough = Some(low);

        let plateau = match direction {
            PeakDirection::Forward if v(i) > v(i - 1) => {
                let mut j = i + 1;
                while j < n && v(j) == v(i) {
                    j += 1;
                }
                (j < n && v(j) < v(i)).then_some((i, j - 1))
            }
            PeakDirection::Backward if v(i) > v(i + 1) => {
                let mut j = i;
                while j > 0 && v(j - 1) == v(i) {
                    j -= 1;
                }
                (j > 0 && v(j - 1) < v(i)).then_some((j, i))
            }
            _ => None,
        };
        let Some((lo, hi)) = plateau else {
            continue;
        };
        let peak = (lo + hi + 1) / 2;
        if v(peak) - low < min_height {
            continue;
        }
        let far_enough = peaks
            .last()
            .map_or(true, |&prev| peak.abs_diff(prev) > min_distance);
        if far_enough {
            peaks.push(peak);
            trough = None;
        }
    }
    peaks
}
