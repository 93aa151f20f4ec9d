//! Organs of the biological flow
//!
//! Each organ analyzes the packets routed to it, records its findings in the
//! packet insights and consults the shared consciousness engine. The
//! integration organ sees every packet last and folds the per-organ
//! findings into one score.

use std::collections::hash_map::DefaultHasher;
use std::collections::BTreeMap;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use parking_lot::Mutex;
use serde_json::{Map, Value};

use crate::analysis::DataContent;
use crate::config::FlowConfig;
use crate::engine::ConsciousnessEngine;
use crate::error::{BioflowError, Result};
use crate::spectral::{self, HF_BAND, LF_BAND};
use crate::stats;
use crate::types::{
    AutonomicBalance, BandPower, BreathingPattern, ContractionType, EmgMetrics, HrvMetrics,
    MedicalPacket, Oxygenation, RespiratoryMetrics, SignalKind, StressLevel,
};

pub type SharedEngine = Arc<Mutex<ConsciousnessEngine>>;

pub trait Organ: Send + Sync {
    fn name(&self) -> &'static str;

    /// Analyze `packet` in place. The organ name is appended to the
    /// processing path even when the packet kind is not one it handles.
    fn process(&self, packet: &mut MedicalPacket) -> Result<()>;
}

fn series(packet: &MedicalPacket) -> Result<&[f64]> {
    let values = packet.data.as_series().ok_or_else(|| {
        BioflowError::InvalidParameter(format!("{} signal must be a numeric series", packet.kind))
    })?;
    if values.is_empty() {
        return Err(BioflowError::EmptySignal(packet.kind));
    }
    Ok(values)
}

fn empty_signal(kind: SignalKind) -> BioflowError {
    BioflowError::EmptySignal(kind)
}

/// EEG bands and cognitive tasks
pub struct BrainOrgan {
    engine: SharedEngine,
}

impl BrainOrgan {
    pub fn new(engine: SharedEngine) -> Self {
        Self { engine }
    }

    fn process_eeg(&self, packet: &mut MedicalPacket) -> Result<()> {
        let bands = packet.data.as_bands().ok_or_else(|| {
            BioflowError::InvalidParameter("eeg signal must be a map of bands".to_string())
        })?;

        let band_powers: BTreeMap<String, BandPower> = bands
            .iter()
            .filter_map(|(band, values)| {
                let mean = stats::mean(values)?;
                let std = stats::std(values)?;
                let peak = stats::max(values)?;
                Some((
                    band.clone(),
                    BandPower {
                        mean,
                        std,
                        power: stats::sum_of_squares(values),
                        peak,
                    },
                ))
            })
            .collect();
        if band_powers.is_empty() {
            return Err(empty_signal(SignalKind::Eeg));
        }

        let powers: Vec<f64> = band_powers.values().map(|bp| bp.power).collect();
        let dominant = stats::argmax(&powers)
            .and_then(|idx| band_powers.keys().nth(idx))
            .cloned();

        let structured: Map<String, Value> = bands
            .iter()
            .map(|(band, values)| (band.clone(), Value::from(values.clone())))
            .collect();
        let analysis = self
            .engine
            .lock()
            .read_and_analyze_data("eeg_brain", &DataContent::Structured(structured));
        packet.patterns_found.extend(analysis.pattern_names());

        if let (Some(alpha), Some(theta)) = (band_powers.get("alpha"), band_powers.get("theta")) {
            packet.insights.consciousness_coherence = Some(alpha.mean / (theta.mean + 0.001));
        }
        packet.insights.dominant_frequency = dominant;
        packet.insights.eeg_band_powers = Some(band_powers);
        Ok(())
    }

    fn process_cognitive(&self, packet: &mut MedicalPacket) -> Result<()> {
        let text = packet.data.as_text().ok_or_else(|| {
            BioflowError::InvalidParameter("cognitive signal must be text".to_string())
        })?;
        if text.is_empty() {
            return Err(empty_signal(SignalKind::Cognitive));
        }

        let baseline = text.chars().count() as f64;
        let result = self.engine.lock().optimize_computation(baseline, "ai", true)?;
        packet.insights.cognitive_enhancement = Some(result.improvement_percent);
        packet.insights.processing_efficiency =
            Some(result.optimized_performance / result.base_performance);
        Ok(())
    }
}

impl Organ for BrainOrgan {
    fn name(&self) -> &'static str {
        "brain"
    }

    fn process(&self, packet: &mut MedicalPacket) -> Result<()> {
        packet.processing_path.push(self.name().to_string());
        match packet.kind {
            SignalKind::Eeg => self.process_eeg(packet),
            SignalKind::Cognitive => self.process_cognitive(packet),
            _ => Ok(()),
        }
    }
}

/// Heart rate variability from RR intervals
pub struct HeartOrgan {
    engine: SharedEngine,
}

impl HeartOrgan {
    pub fn new(engine: SharedEngine) -> Self {
        Self { engine }
    }
}

pub fn hrv_metrics(rr: &[f64]) -> Option<HrvMetrics> {
    let mean_rr = stats::mean(rr)?;
    let sdnn = stats::std(rr)?;
    let diffs = stats::diff(rr);
    let rmssd = stats::rms(&diffs).unwrap_or(0.0);
    let successive = diffs.iter().filter(|d| d.abs() > 50.0).count();
    let pnn50 = if diffs.is_empty() {
        0.0
    } else {
        successive as f64 / rr.len() as f64 * 100.0
    };
    let heart_rate = if mean_rr > 0.0 { 60000.0 / mean_rr } else { 0.0 };

    Some(HrvMetrics {
        mean_rr,
        sdnn,
        rmssd,
        pnn50,
        heart_rate,
    })
}

/// LF/HF balance from the RR periodogram, sampled at 1 Hz
pub fn autonomic_balance(rr: &[f64]) -> AutonomicBalance {
    let pg = spectral::periodogram(rr, 1.0);
    let lf_power = spectral::band_power(&pg, LF_BAND.0, LF_BAND.1);
    let hf_power = spectral::band_power(&pg, HF_BAND.0, HF_BAND.1);
    AutonomicBalance {
        lf_power,
        hf_power,
        lf_hf_ratio: lf_power / (hf_power + 0.001),
    }
}

impl Organ for HeartOrgan {
    fn name(&self) -> &'static str {
        "heart"
    }

    fn process(&self, packet: &mut MedicalPacket) -> Result<()> {
        packet.processing_path.push(self.name().to_string());
        if packet.kind != SignalKind::Heart {
            return Ok(());
        }

        let rr = series(packet)?.to_vec();
        let metrics = hrv_metrics(&rr).ok_or_else(|| empty_signal(SignalKind::Heart))?;

        if rr.len() > 4 {
            packet.insights.autonomic_balance = Some(autonomic_balance(&rr));
        }

        let analysis = self
            .engine
            .lock()
            .read_and_analyze_data("hrv_heart", &DataContent::Numeric(rr));
        packet.patterns_found.extend(analysis.pattern_names());

        packet.insights.stress_level = Some(if metrics.sdnn < 50.0 {
            StressLevel::High
        } else if metrics.sdnn < 100.0 {
            StressLevel::Moderate
        } else {
            StressLevel::Low
        });
        packet.insights.hrv_metrics = Some(metrics);
        Ok(())
    }
}

/// Respiration rate and blood oxygen
pub struct LungOrgan {
    engine: SharedEngine,
    nine_beat_reference: Vec<f64>,
    nine_beat_threshold: f64,
    hypoxia_threshold: f64,
}

impl LungOrgan {
    pub fn new(engine: SharedEngine, config: &FlowConfig) -> Self {
        Self {
            engine,
            nine_beat_reference: config.nine_beat_reference.clone(),
            nine_beat_threshold: config.nine_beat_threshold,
            hypoxia_threshold: config.hypoxia_threshold,
        }
    }

    fn process_respiratory(&self, packet: &mut MedicalPacket) -> Result<()> {
        let rates = series(packet)?.to_vec();
        let (Some(rate), Some(variability)) = (stats::mean(&rates), stats::std(&rates)) else {
            return Err(empty_signal(SignalKind::Respiratory));
        };
        let pattern_regularity = if rate != 0.0 {
            1.0 / (variability / rate + 0.001)
        } else {
            0.0
        };
        packet.insights.respiratory_metrics = Some(RespiratoryMetrics {
            rate,
            variability,
            pattern_regularity,
        });

        packet.insights.breathing_pattern = Some(if rate < 8.0 {
            BreathingPattern::SlowDeep
        } else if rate > 20.0 {
            BreathingPattern::RapidShallow
        } else {
            BreathingPattern::Normal
        });

        if rates.len() >= 9 {
            let correlation = stats::pearson(&rates[..9], &self.nine_beat_reference);
            if correlation.is_some_and(|r| r > self.nine_beat_threshold) {
                packet.insights.nine_beat_detected = Some(true);
                packet.patterns_found.push("9-beat-breathing".to_string());
            }
        }

        if rate != 0.0 {
            let result = self
                .engine
                .lock()
                .optimize_computation(rate, "biofeedback", true)?;
            packet.insights.breathing_optimization = Some(result.improvement_percent);
        }
        Ok(())
    }

    fn process_spo2(&self, packet: &mut MedicalPacket) -> Result<()> {
        let values = series(packet)?;
        let (Some(mean_spo2), Some(min_spo2)) = (stats::mean(values), stats::min(values)) else {
            return Err(empty_signal(SignalKind::Spo2));
        };
        packet.insights.oxygenation = Some(Oxygenation {
            mean_spo2,
            min_spo2,
            hypoxia_risk: mean_spo2 < self.hypoxia_threshold,
        });
        Ok(())
    }
}

impl Organ for LungOrgan {
    fn name(&self) -> &'static str {
        "lungs"
    }

    fn process(&self, packet: &mut MedicalPacket) -> Result<()> {
        packet.processing_path.push(self.name().to_string());
        match packet.kind {
            SignalKind::Respiratory => self.process_respiratory(packet),
            SignalKind::Spo2 => self.process_spo2(packet),
            _ => Ok(()),
        }
    }
}

/// EMG analysis for prosthetic control
pub struct MuscleOrgan {
    engine: SharedEngine,
    full_scale_mv: f64,
}

impl MuscleOrgan {
    pub fn new(engine: SharedEngine, config: &FlowConfig) -> Self {
        Self {
            engine,
            full_scale_mv: config.emg_full_scale_mv,
        }
    }
}

/// Stable identifier for the first three samples rounded to 0.1 mV
pub fn gesture_hash(samples: &[f64]) -> u64 {
    let mut hasher = DefaultHasher::new();
    for value in samples.iter().take(3) {
        ((value * 10.0).round() as i64).hash(&mut hasher);
    }
    hasher.finish()
}

impl Organ for MuscleOrgan {
    fn name(&self) -> &'static str {
        "muscle"
    }

    fn process(&self, packet: &mut MedicalPacket) -> Result<()> {
        packet.processing_path.push(self.name().to_string());
        if packet.kind != SignalKind::Muscle {
            return Ok(());
        }

        let emg = series(packet)?.to_vec();
        let (Some(amplitude), Some(rms), Some(peak)) =
            (stats::mean_abs(&emg), stats::rms(&emg), stats::max_abs(&emg))
        else {
            return Err(empty_signal(SignalKind::Muscle));
        };
        let activation_level = amplitude / self.full_scale_mv;

        packet.insights.contraction_type = Some(if activation_level < 0.1 {
            ContractionType::Rest
        } else if activation_level < 0.3 {
            ContractionType::Light
        } else if activation_level < 0.6 {
            ContractionType::Moderate
        } else {
            ContractionType::Maximum
        });
        packet.insights.emg_metrics = Some(EmgMetrics {
            amplitude,
            rms,
            peak,
            activation_level,
        });

        if amplitude != 0.0 {
            let result = self
                .engine
                .lock()
                .optimize_computation(amplitude, "prosthetic", true)?;
            packet.insights.prosthetic_control_enhancement = Some(result.improvement_percent);
        }

        if emg.len() >= 3 {
            packet
                .patterns_found
                .push(format!("gesture_pattern_{}", gesture_hash(&emg)));
        }
        Ok(())
    }
}

/// Combines what the other organs found into one consciousness score
pub struct IntegrationOrgan {
    engine: SharedEngine,
}

impl IntegrationOrgan {
    pub fn new(engine: SharedEngine) -> Self {
        Self { engine }
    }
}

impl Organ for IntegrationOrgan {
    fn name(&self) -> &'static str {
        "integration_cortex"
    }

    fn process(&self, packet: &mut MedicalPacket) -> Result<()> {
        packet.processing_path.push(self.name().to_string());

        let insights = &packet.insights;
        let mut factors = Vec::new();
        if let Some(coherence) = insights.consciousness_coherence {
            factors.push(coherence);
        }
        if let Some(balance) = &insights.autonomic_balance {
            // LF/HF around 1.5-2.0 scores best
            factors.push(1.0 / (1.0 + (balance.lf_hf_ratio - 1.75).abs()));
        }
        if let Some(resp) = &insights.respiratory_metrics {
            factors.push(resp.pattern_regularity.min(1.0));
        }
        if let Some(oxygen) = &insights.oxygenation {
            factors.push(oxygen.mean_spo2 / 100.0);
        }

        let Some(score) = stats::mean(&factors) else {
            return Ok(());
        };
        packet.insights.integrated_consciousness_score = Some(score);

        if let Some(summary) = self.engine.lock().learning_summary() {
            packet.insights.ac_consciousness_level = Some(summary.current_level);
            packet.insights.ac_learning_iterations = Some(summary.learning_iterations);
        }
        Ok(())
    }
}
