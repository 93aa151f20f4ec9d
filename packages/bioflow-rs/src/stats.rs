//! Descriptive statistics over raw sample slices.
//!
//! All moments are population moments (divide by `n`), matching how the
//! physiological metrics (SDNN, RMSSD, EMG RMS) are conventionally defined.

pub fn mean(samples: &[f64]) -> Option<f64> {
    if samples.is_empty() {
        return None;
    }
    Some(samples.iter().sum::<f64>() / samples.len() as f64)
}

/// Population standard deviation
pub fn std(samples: &[f64]) -> Option<f64> {
    let mean = mean(samples)?;
    let variance =
        samples.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / samples.len() as f64;
    Some(variance.sqrt())
}

/// Population variance
pub fn variance(samples: &[f64]) -> Option<f64> {
    std(samples).map(|s| s * s)
}

pub fn min(samples: &[f64]) -> Option<f64> {
    if samples.is_empty() {
        return None;
    }
    Some(samples.iter().cloned().fold(f64::INFINITY, f64::min))
}

pub fn max(samples: &[f64]) -> Option<f64> {
    if samples.is_empty() {
        return None;
    }
    Some(samples.iter().cloned().fold(f64::NEG_INFINITY, f64::max))
}

pub fn sum_of_squares(samples: &[f64]) -> f64 {
    samples.iter().map(|x| x * x).sum()
}

/// First differences `x[i+1] - x[i]`
pub fn diff(samples: &[f64]) -> Vec<f64> {
    samples.windows(2).map(|w| w[1] - w[0]).collect()
}

/// Root mean square
pub fn rms(samples: &[f64]) -> Option<f64> {
    if samples.is_empty() {
        return None;
    }
    Some((sum_of_squares(samples) / samples.len() as f64).sqrt())
}

pub fn mean_abs(samples: &[f64]) -> Option<f64> {
    if samples.is_empty() {
        return None;
    }
    Some(samples.iter().map(|x| x.abs()).sum::<f64>() / samples.len() as f64)
}

pub fn max_abs(samples: &[f64]) -> Option<f64> {
    if samples.is_empty() {
        return None;
    }
    Some(samples.iter().map(|x| x.abs()).fold(f64::NEG_INFINITY, f64::max))
}

/// Index of the first maximum
pub fn argmax(samples: &[f64]) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;
    for (i, &value) in samples.iter().enumerate() {
        match best {
            Some((_, current)) if value <= current => {}
            _ => best = Some((i, value)),
        }
    }
    best.map(|(i, _)| i)
}

/// Pearson correlation coefficient.
///
/// Undefined (None) for mismatched lengths, fewer than two samples, or a
/// constant input on either side.
pub fn pearson(a: &[f64], b: &[f64]) -> Option<f64> {
    if a.len() != b.len() || a.len() < 2 {
        return None;
    }
    let mean_a = mean(a)?;
    let mean_b = mean(b)?;

    let mut cov = 0.0;
    let mut var_a = 0.0;
    let mut var_b = 0.0;
    for (x, y) in a.iter().zip(b) {
        let da = x - mean_a;
        let db = y - mean_b;
        cov += da * db;
        var_a += da * da;
        var_b += db * db;
    }

    if var_a < 1e-12 || var_b < 1e-12 {
        return None;
    }
    Some(cov / (var_a.sqrt() * var_b.sqrt()))
}
