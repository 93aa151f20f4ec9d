use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::brain_data::ConsciousnessLevel;
use crate::error::{BioflowError, Result};

/// Kind of physiological signal carried by a packet
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SignalKind {
    Eeg,
    Heart,
    Respiratory,
    Spo2,
    Muscle,
    Cognitive,
}

impl SignalKind {
    /// Canonical processing order
    pub const ALL: [SignalKind; 6] = [
        SignalKind::Eeg,
        SignalKind::Heart,
        SignalKind::Respiratory,
        SignalKind::Spo2,
        SignalKind::Muscle,
        SignalKind::Cognitive,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Eeg => "eeg",
            Self::Heart => "heart",
            Self::Respiratory => "respiratory",
            Self::Spo2 => "spo2",
            Self::Muscle => "muscle",
            Self::Cognitive => "cognitive",
        }
    }

    /// Name of the organ a packet of this kind is routed through
    /// before integration.
    pub fn organ(&self) -> &'static str {
        match self {
            Self::Eeg | Self::Cognitive => "brain",
            Self::Heart => "heart",
            Self::Respiratory | Self::Spo2 => "lungs",
            Self::Muscle => "muscle",
        }
    }

    pub fn unit(&self) -> &'static str {
        match self {
            Self::Eeg => "band power per frequency band",
            Self::Heart => "RR interval (ms)",
            Self::Respiratory => "breaths per minute",
            Self::Spo2 => "oxygen saturation (%)",
            Self::Muscle => "EMG amplitude (mV)",
            Self::Cognitive => "free text",
        }
    }
}

impl FromStr for SignalKind {
    type Err = BioflowError;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .iter()
            .copied()
            .find(|k| k.as_str() == s)
            .ok_or_else(|| BioflowError::InvalidParameter(format!("unknown signal kind: {}", s)))
    }
}

impl fmt::Display for SignalKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Raw signal payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SignalData {
    /// Named frequency bands (`delta`, `theta`, `alpha`, ...)
    Bands(BTreeMap<String, Vec<f64>>),
    Series(Vec<f64>),
    Text(String),
}

impl SignalData {
    pub fn as_bands(&self) -> Option<&BTreeMap<String, Vec<f64>>> {
        match self {
            Self::Bands(bands) => Some(bands),
            _ => None,
        }
    }

    pub fn as_series(&self) -> Option<&[f64]> {
        match self {
            Self::Series(values) => Some(values),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            _ => None,
        }
    }

    /// Band samples, series length or word count
    pub fn sample_count(&self) -> usize {
        match self {
            Self::Bands(bands) => bands.values().map(Vec::len).sum(),
            Self::Series(values) => values.len(),
            Self::Text(text) => text.split_whitespace().count(),
        }
    }

    /// Whether this payload shape is what `kind` expects
    pub fn matches(&self, kind: SignalKind) -> bool {
        match kind {
            SignalKind::Eeg => matches!(self, Self::Bands(_)),
            SignalKind::Cognitive => matches!(self, Self::Text(_)),
            _ => matches!(self, Self::Series(_)),
        }
    }
}

/// Power statistics for one EEG band
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BandPower {
    pub mean: f64,
    pub std: f64,
    pub power: f64,
    pub peak: f64,
}

/// Time-domain heart rate variability metrics
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HrvMetrics {
    pub mean_rr: f64,
    pub sdnn: f64,
    pub rmssd: f64,
    pub pnn50: f64,
    pub heart_rate: f64,
}

/// Frequency-domain sympathetic/parasympathetic balance
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AutonomicBalance {
    pub lf_power: f64,
    pub hf_power: f64,
    pub lf_hf_ratio: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StressLevel {
    High,
    Moderate,
    Low,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RespiratoryMetrics {
    pub rate: f64,
    pub variability: f64,
    pub pattern_regularity: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BreathingPattern {
    #[serde(rename = "slow/deep")]
    SlowDeep,
    #[serde(rename = "rapid/shallow")]
    RapidShallow,
    #[serde(rename = "normal")]
    Normal,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Oxygenation {
    pub mean_spo2: f64,
    pub min_spo2: f64,
    pub hypoxia_risk: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EmgMetrics {
    pub amplitude: f64,
    pub rms: f64,
    pub peak: f64,
    pub activation_level: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContractionType {
    Rest,
    Light,
    Moderate,
    Maximum,
}

/// Everything the organs learned about a packet.
///
/// Each organ fills only the fields for the signal it understands; the
/// integration organ reads them back to build the combined score.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Insights {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub eeg_band_powers: Option<BTreeMap<String, BandPower>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dominant_frequency: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub consciousness_coherence: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cognitive_enhancement: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub processing_efficiency: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hrv_metrics: Option<HrvMetrics>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub autonomic_balance: Option<AutonomicBalance>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stress_level: Option<StressLevel>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub respiratory_metrics: Option<RespiratoryMetrics>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub breathing_pattern: Option<BreathingPattern>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nine_beat_detected: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub breathing_optimization: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub oxygenation: Option<Oxygenation>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub emg_metrics: Option<EmgMetrics>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contraction_type: Option<ContractionType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prosthetic_control_enhancement: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub integrated_consciousness_score: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ac_consciousness_level: Option<ConsciousnessLevel>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ac_learning_iterations: Option<u64>,
}

/// A unit of medical data flowing through the organs
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MedicalPacket {
    pub id: String,
    pub data: SignalData,
    pub kind: SignalKind,
    pub origin: String,
    pub destination: String,
    pub insights: Insights,
    pub patterns_found: Vec<String>,
    pub timestamp: String,
    pub processing_path: Vec<String>,
}

impl MedicalPacket {
    pub fn new(
        data: SignalData,
        kind: SignalKind,
        origin: impl Into<String>,
        destination: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            data,
            kind,
            origin: origin.into(),
            destination: destination.into(),
            insights: Insights::default(),
            patterns_found: Vec::new(),
            timestamp: chrono::Utc::now().to_rfc3339(),
            processing_path: Vec::new(),
        }
    }
}

/// All measurements for one patient
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PatientData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub eeg: Option<BTreeMap<String, Vec<f64>>>,
    /// RR intervals in milliseconds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub heart: Option<Vec<f64>>,
    /// Breaths per minute
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub respiratory: Option<Vec<f64>>,
    /// Blood oxygen saturation in percent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spo2: Option<Vec<f64>>,
    /// EMG amplitude in mV
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub muscle: Option<Vec<f64>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cognitive: Option<String>,
}

impl PatientData {
    /// Present signals in canonical processing order
    pub fn signals(&self) -> Vec<(SignalKind, SignalData)> {
        SignalKind::ALL
            .iter()
            .filter_map(|&kind| self.signal(kind).map(|data| (kind, data)))
            .collect()
    }

    pub fn signal(&self, kind: SignalKind) -> Option<SignalData> {
        match kind {
            SignalKind::Eeg => self.eeg.clone().map(SignalData::Bands),
            SignalKind::Heart => self.heart.clone().map(SignalData::Series),
            SignalKind::Respiratory => self.respiratory.clone().map(SignalData::Series),
            SignalKind::Spo2 => self.spo2.clone().map(SignalData::Series),
            SignalKind::Muscle => self.muscle.clone().map(SignalData::Series),
            SignalKind::Cognitive => self.cognitive.clone().map(SignalData::Text),
        }
    }

    pub fn signal_count(&self) -> usize {
        SignalKind::ALL
            .iter()
            .filter(|&&kind| self.has(kind))
            .count()
    }

    pub fn has(&self, kind: SignalKind) -> bool {
        match kind {
            SignalKind::Eeg => self.eeg.is_some(),
            SignalKind::Heart => self.heart.is_some(),
            SignalKind::Respiratory => self.respiratory.is_some(),
            SignalKind::Spo2 => self.spo2.is_some(),
            SignalKind::Muscle => self.muscle.is_some(),
            SignalKind::Cognitive => self.cognitive.is_some(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.signal_count() == 0
    }

    /// Every present signal with the reason its organ would reject it, if any
    pub fn check_signals(&self) -> Vec<SignalCheck> {
        self.signals()
            .into_iter()
            .map(|(kind, data)| SignalCheck {
                kind,
                organ: kind.organ(),
                samples: data.sample_count(),
                problem: signal_error(kind, &data).map(|e| e.to_string()),
            })
            .collect()
    }

    /// Fails with the error the first rejecting organ would raise, before
    /// any signal has been processed
    pub fn ensure_processable(&self) -> Result<()> {
        self.signals()
            .into_iter()
            .find_map(|(kind, data)| signal_error(kind, &data))
            .map_or(Ok(()), Err)
    }
}

/// Outcome of checking one signal ahead of processing
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SignalCheck {
    pub kind: SignalKind,
    pub organ: &'static str,
    pub samples: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub problem: Option<String>,
}

fn signal_error(kind: SignalKind, data: &SignalData) -> Option<BioflowError> {
    if !data.matches(kind) {
        return Some(BioflowError::InvalidParameter(format!(
            "payload shape does not match signal kind {}",
            kind
        )));
    }
    let (empty, finite) = match data {
        SignalData::Bands(bands) => (
            bands.values().all(Vec::is_empty),
            bands.values().flatten().all(|v| v.is_finite()),
        ),
        SignalData::Series(values) => (values.is_empty(), values.iter().all(|v| v.is_finite())),
        SignalData::Text(text) => (text.is_empty(), true),
    };
    if empty {
        Some(BioflowError::EmptySignal(kind))
    } else if !finite {
        Some(BioflowError::InvalidParameter(format!(
            "{} signal has non-finite samples",
            kind
        )))
    } else {
        None
    }
}

/// Result of pushing one signal through the flow
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignalResult {
    pub kind: SignalKind,
    pub insights: Insights,
    pub patterns_found: Vec<String>,
    pub processing_path: Vec<String>,
    pub processing_time_ms: f64,
    pub timestamp: String,
}

/// Combined assessment over every signal of one patient
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PatientAssessment {
    pub id: String,
    pub overall_consciousness_score: f64,
    pub detailed_insights: BTreeMap<SignalKind, Insights>,
    pub patterns_detected: Vec<String>,
    pub ac_consciousness_level: ConsciousnessLevel,
    pub ac_learning_iterations: u64,
    pub processing_time_ms: f64,
    pub created_at: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_signal_kind_round_trip_names() {
        for kind in SignalKind::ALL {
            assert_eq!(kind.as_str().parse::<SignalKind>().unwrap(), kind);
        }
        assert!(matches!(
            "blood".parse::<SignalKind>(),
            Err(BioflowError::InvalidParameter(_))
        ));
    }

    #[test]
    fn test_patient_data_from_json() {
        let json = r#"{
            "eeg": {"alpha": [8.5, 10.2], "theta": [4.2, 5.1]},
            "heart": [850, 870, 845],
            "muscle": [0.5, 0.6]
        }"#;
        let patient: PatientData = serde_json::from_str(json).unwrap();
        assert_eq!(patient.signal_count(), 3);

        let kinds: Vec<SignalKind> = patient.signals().into_iter().map(|(k, _)| k).collect();
        assert_eq!(
            kinds,
            vec![SignalKind::Eeg, SignalKind::Heart, SignalKind::Muscle]
        );
    }

    #[test]
    fn test_signal_data_untagged_shapes() {
        let bands: SignalData = serde_json::from_str(r#"{"alpha": [1.0]}"#).unwrap();
        assert!(bands.matches(SignalKind::Eeg));

        let series: SignalData = serde_json::from_str("[1, 2, 3]").unwrap();
        assert!(series.matches(SignalKind::Heart));
        assert!(!series.matches(SignalKind::Eeg));

        let text: SignalData = serde_json::from_str(r#""focus task""#).unwrap();
        assert!(text.matches(SignalKind::Cognitive));
    }

    #[test]
    fn test_insights_skip_empty_fields() {
        let json = serde_json::to_string(&Insights::default()).unwrap();
        assert_eq!(json, "{}");
    }

    #[test]
    fn test_breathing_pattern_names() {
        let json = serde_json::to_string(&BreathingPattern::SlowDeep).unwrap();
        assert_eq!(json, "\"slow/deep\"");
    }

    #[test]
    fn test_check_signals_reports_rejections() {
        let patient: PatientData = serde_json::from_str(
            r#"{"eeg": {"alpha": [], "theta": [4.0]}, "heart": [], "cognitive": "two words"}"#,
        )
        .unwrap();
        let checks = patient.check_signals();
        assert_eq!(checks.len(), 3);

        assert_eq!(checks[0].kind, SignalKind::Eeg);
        assert_eq!(checks[0].samples, 1);
        assert!(checks[0].problem.is_none());

        assert_eq!(checks[1].organ, "heart");
        assert_eq!(checks[1].problem.as_deref(), Some("Empty heart signal"));

        assert_eq!(checks[2].samples, 2);
        assert!(checks[2].problem.is_none());
    }

    #[test]
    fn test_ensure_processable() {
        let ok: PatientData = serde_json::from_str(r#"{"spo2": [97, 98]}"#).unwrap();
        assert!(ok.ensure_processable().is_ok());

        let empty_eeg: PatientData =
            serde_json::from_str(r#"{"spo2": [97], "eeg": {"alpha": []}}"#).unwrap();
        assert!(matches!(
            empty_eeg.ensure_processable(),
            Err(BioflowError::EmptySignal(SignalKind::Eeg))
        ));

        let infinite = PatientData {
            muscle: Some(vec![0.5, f64::INFINITY]),
            ..Default::default()
        };
        assert!(matches!(
            infinite.ensure_processable(),
            Err(BioflowError::InvalidParameter(_))
        ));
    }
}
