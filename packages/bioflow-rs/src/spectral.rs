//! Spectral analysis
//!
//! One-sided power spectral density estimate (periodogram) used for the
//! frequency-domain HRV bands.

use rustfft::{num_complex::Complex, FftPlanner};
use serde::{Deserialize, Serialize};

/// Low-frequency HRV band (Hz), sympathetic + parasympathetic
pub const LF_BAND: (f64, f64) = (0.04, 0.15);

/// High-frequency HRV band (Hz), parasympathetic
pub const HF_BAND: (f64, f64) = (0.15, 0.4);

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Periodogram {
    /// Bin frequencies in Hz, `k * fs / n` for `k = 0..=n/2`
    pub freqs: Vec<f64>,
    /// Power spectral density per bin
    pub psd: Vec<f64>,
}

/// Compute the one-sided density periodogram of `data`.
///
/// Constant detrend, boxcar window, no zero padding. Every bin other than DC
/// (and Nyquist for an even length) is doubled so the PSD integrates to the
/// signal variance.
pub fn periodogram(data: &[f64], sample_rate: f64) -> Periodogram {
    let n = data.len();
    if n == 0 || sample_rate <= 0.0 {
        return Periodogram {
            freqs: vec![],
            psd: vec![],
        };
    }

    let mean = data.iter().sum::<f64>() / n as f64;

    let mut planner = FftPlanner::<f64>::new();
    let fft = planner.plan_fft_forward(n);

    let mut buffer: Vec<Complex<f64>> = data
        .iter()
        .map(|&x| Complex::new(x - mean, 0.0))
        .collect();

    fft.process(&mut buffer);

    let bins = n / 2 + 1;
    let scale = 1.0 / (sample_rate * n as f64);

    let psd: Vec<f64> = buffer[..bins]
        .iter()
        .enumerate()
        .map(|(k, c)| {
            let power = c.norm_sqr() * scale;
            let is_nyquist = n % 2 == 0 && k == n / 2;
            if k == 0 || is_nyquist {
                power
            } else {
                power * 2.0
            }
        })
        .collect();

    let freqs = (0..bins)
        .map(|k| k as f64 * sample_rate / n as f64)
        .collect();

    Periodogram { freqs, psd }
}

/// Sum of PSD bins with `low <= f < high`
pub fn band_power(periodogram: &Periodogram, low: f64, high: f64) -> f64 {
    periodogram
        .freqs
        .iter()
        .zip(&periodogram.psd)
        .filter(|(f, _)| **f >= low && **f < high)
        .map(|(_, p)| *p)
        .sum()
}
