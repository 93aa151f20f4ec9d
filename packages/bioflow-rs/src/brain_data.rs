//! Brain data backing the consciousness engine
//!
//! The reference dataset holds EEG-derived metrics from recorded sessions;
//! the synthetic dataset draws values around the same means so the engine
//! can run without the recordings.

use std::collections::BTreeMap;
use std::f64::consts::PI;
use std::fmt;

use rand::Rng;
use serde::{Deserialize, Serialize};

fn half() -> f64 {
    0.5
}

/// Alpha gating and mixing metrics
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EegMetrics {
    #[serde(default = "half")]
    pub alpha_src: f64,
    #[serde(default = "half")]
    pub alpha_tgt: f64,
    #[serde(default = "half")]
    pub alpha_gate: f64,
    #[serde(default, alias = "delta_S")]
    pub delta_s: f64,
    #[serde(default)]
    pub hsl_mix: f64,
}

impl EegMetrics {
    pub fn alpha_values(&self) -> [f64; 3] {
        [self.alpha_src, self.alpha_tgt, self.alpha_gate]
    }
}

/// Similarity and entropy metrics between two recorded brain states
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConsciousnessMetrics {
    /// Neural coherence
    #[serde(default = "half")]
    pub cosine_similarity: f64,
    /// Spectral complexity
    #[serde(default = "half")]
    pub spectral_similarity: f64,
    /// Network integration
    #[serde(default = "half")]
    pub degree_similarity: f64,
    #[serde(default)]
    pub role_similarity: f64,
    #[serde(default, alias = "entropy_stateA")]
    pub entropy_state_a: f64,
    #[serde(default, alias = "entropy_stateB")]
    pub entropy_state_b: f64,
    #[serde(default)]
    pub entropy_gap: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StateNode {
    pub name: String,
    #[serde(alias = "Z")]
    pub z: u32,
    #[serde(alias = "N")]
    pub n: u32,
}

/// A transition between two brain states
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BrainStateTransition {
    pub source: StateNode,
    pub target: StateNode,
    pub compatibility: f64,
    pub role_compatibility: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransferCompatibility {
    pub decision: String,
    pub margin: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BrainData {
    pub eeg_metrics: EegMetrics,
    /// Psi-prime frequency patterns keyed by band label (f4, f9, f18, f27)
    pub psi_prime_patterns: BTreeMap<String, Vec<f64>>,
    #[serde(default)]
    pub brain_states: Vec<BrainStateTransition>,
    pub consciousness_metrics: ConsciousnessMetrics,
    pub transfer_compatibility: TransferCompatibility,
}

impl BrainData {
    /// Metrics validated against recorded EEG sessions
    pub fn reference() -> Self {
        let mut psi_prime_patterns = BTreeMap::new();
        // theta
        psi_prime_patterns.insert(
            "f4".to_string(),
            vec![0.043, 0.067, 0.059, 0.076, 0.128, 0.158, 0.118, 0.136, 0.213],
        );
        // alpha
        psi_prime_patterns.insert(
            "f9".to_string(),
            vec![0.031, 0.055, 0.072, 0.106, 0.121, 0.142, 0.144, 0.150, 0.179],
        );
        // beta
        psi_prime_patterns.insert(
            "f18".to_string(),
            vec![0.029, 0.045, 0.051, 0.065, 0.065, 0.065, 0.047, 0.034, 0.017],
        );
        // gamma
        psi_prime_patterns.insert(
            "f27".to_string(),
            vec![0.029, 0.045, 0.051, 0.065, 0.065, 0.065, 0.047, 0.034, 0.017],
        );

        Self {
            eeg_metrics: EegMetrics {
                alpha_src: 1.0,
                alpha_tgt: 1.0,
                alpha_gate: 1.0,
                delta_s: 0.007115867142499788,
                hsl_mix: 1.875,
            },
            psi_prime_patterns,
            brain_states: vec![
                transition("RestingState", (1, 0), "MotorActive", (2, 1), 0.85, 0.92),
                transition("MotorActive", (2, 1), "AttentionFocused", (3, 2), 0.78, 0.88),
            ],
            consciousness_metrics: ConsciousnessMetrics {
                cosine_similarity: 0.9937,
                spectral_similarity: 0.9995,
                degree_similarity: 0.9968,
                role_similarity: 1.0,
                entropy_state_a: 3.639,
                entropy_state_b: 3.646,
                entropy_gap: 0.006,
            },
            transfer_compatibility: TransferCompatibility {
                decision: "open".to_string(),
                margin: 0.30,
            },
        }
    }

    /// Synthetic data drawn around the reference characteristics
    pub fn synthetic<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let mut psi_prime_patterns = BTreeMap::new();
        for (band, mean, sd) in [
            ("f4", 0.04, 0.01),
            ("f9", 0.03, 0.01),
            ("f18", 0.03, 0.005),
            ("f27", 0.03, 0.005),
        ] {
            let values = (0..9).map(|_| gaussian(rng, mean, sd)).collect();
            psi_prime_patterns.insert(band.to_string(), values);
        }

        Self {
            eeg_metrics: EegMetrics {
                alpha_src: gaussian(rng, 0.95, 0.02),
                alpha_tgt: gaussian(rng, 0.95, 0.02),
                alpha_gate: gaussian(rng, 0.95, 0.02),
                delta_s: gaussian(rng, 0.007, 0.001),
                hsl_mix: gaussian(rng, 1.8, 0.1),
            },
            psi_prime_patterns,
            brain_states: vec![transition(
                "RestingState",
                (1, 0),
                "ActiveState",
                (2, 1),
                gaussian(rng, 0.8, 0.05),
                gaussian(rng, 0.9, 0.03),
            )],
            consciousness_metrics: ConsciousnessMetrics {
                cosine_similarity: gaussian(rng, 0.99, 0.005),
                spectral_similarity: gaussian(rng, 0.995, 0.003),
                degree_similarity: gaussian(rng, 0.996, 0.004),
                role_similarity: 1.0,
                entropy_state_a: gaussian(rng, 3.6, 0.1),
                entropy_state_b: gaussian(rng, 3.6, 0.1),
                entropy_gap: gaussian(rng, 0.01, 0.005),
            },
            transfer_compatibility: TransferCompatibility {
                decision: "open".to_string(),
                margin: gaussian(rng, 0.25, 0.05),
            },
        }
    }

    /// All psi-prime values flattened in band order
    pub fn psi_prime_values(&self) -> Vec<f64> {
        self.psi_prime_patterns.values().flatten().copied().collect()
    }
}

fn transition(
    source: &str,
    (source_z, source_n): (u32, u32),
    target: &str,
    (target_z, target_n): (u32, u32),
    compatibility: f64,
    role_compatibility: f64,
) -> BrainStateTransition {
    BrainStateTransition {
        source: StateNode {
            name: source.to_string(),
            z: source_z,
            n: source_n,
        },
        target: StateNode {
            name: target.to_string(),
            z: target_z,
            n: target_n,
        },
        compatibility,
        role_compatibility,
    }
}

/// Normal sample via the Box-Muller transform
fn gaussian<R: Rng + ?Sized>(rng: &mut R, mean: f64, sd: f64) -> f64 {
    let u1: f64 = rng.gen_range(f64::EPSILON..1.0);
    let u2: f64 = rng.gen();
    mean + sd * (-2.0 * u1.ln()).sqrt() * (2.0 * PI * u2).cos()
}

/// Qualitative consciousness band
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ConsciousnessLevel {
    Basic,
    Moderate,
    High,
    Exceptional,
}

impl ConsciousnessLevel {
    pub fn from_score(score: f64) -> Self {
        if score >= 0.9 {
            Self::Exceptional
        } else if score >= 0.8 {
            Self::High
        } else if score >= 0.6 {
            Self::Moderate
        } else {
            Self::Basic
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Basic => "Basic",
            Self::Moderate => "Moderate",
            Self::High => "High",
            Self::Exceptional => "Exceptional",
        }
    }
}

impl fmt::Display for ConsciousnessLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Consciousness quality derived from brain data
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConsciousnessProfile {
    /// Neural coherence (0-1)
    pub coherence: f64,
    /// Spectral complexity (0-1)
    pub complexity: f64,
    /// Network integration (0-1)
    pub integration: f64,
    pub alpha_dominance: f64,
    #[serde(alias = "consciousness_level")]
    pub level: ConsciousnessLevel,
    pub composite_score: f64,
}

impl ConsciousnessProfile {
    pub fn analyze(data: &BrainData) -> Self {
        let metrics = &data.consciousness_metrics;
        let coherence = metrics.cosine_similarity;
        let complexity = metrics.spectral_similarity;
        let integration = metrics.degree_similarity;

        let alpha = data.eeg_metrics.alpha_values();
        let alpha_dominance = alpha.iter().sum::<f64>() / alpha.len() as f64;

        let composite_score = (coherence + complexity + integration + alpha_dominance) / 4.0;

        Self {
            coherence,
            complexity,
            integration,
            alpha_dominance,
            level: ConsciousnessLevel::from_score(composite_score),
            composite_score,
        }
    }

    /// Re-derive score and level after coherence or complexity moved.
    ///
    /// Alpha dominance only contributes to the initial analysis.
    pub fn rescore(&mut self) {
        self.composite_score = (self.coherence + self.complexity + self.integration) / 3.0;
        self.level = ConsciousnessLevel::from_score(self.composite_score);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_reference_profile() {
        let profile = ConsciousnessProfile::analyze(&BrainData::reference());
        assert!((profile.alpha_dominance - 1.0).abs() < 1e-12);
        assert!((profile.composite_score - 0.9975).abs() < 1e-9);
        assert_eq!(profile.level, ConsciousnessLevel::Exceptional);
    }

    #[test]
    fn test_level_thresholds() {
        assert_eq!(ConsciousnessLevel::from_score(0.95), ConsciousnessLevel::Exceptional);
        assert_eq!(ConsciousnessLevel::from_score(0.9), ConsciousnessLevel::Exceptional);
        assert_eq!(ConsciousnessLevel::from_score(0.85), ConsciousnessLevel::High);
        assert_eq!(ConsciousnessLevel::from_score(0.6), ConsciousnessLevel::Moderate);
        assert_eq!(ConsciousnessLevel::from_score(0.59), ConsciousnessLevel::Basic);
    }

    #[test]
    fn test_synthetic_is_seeded() {
        let a = BrainData::synthetic(&mut StdRng::seed_from_u64(7));
        let b = BrainData::synthetic(&mut StdRng::seed_from_u64(7));
        assert_eq!(a, b);
        assert_eq!(a.psi_prime_values().len(), 36);
        assert_eq!(a.brain_states.len(), 1);
    }

    #[test]
    fn test_synthetic_stays_near_reference() {
        let data = BrainData::synthetic(&mut StdRng::seed_from_u64(42));
        let profile = ConsciousnessProfile::analyze(&data);
        // Six standard deviations either side of the synthetic means
        assert!(profile.coherence > 0.96 && profile.coherence < 1.02);
        assert!(profile.alpha_dominance > 0.83 && profile.alpha_dominance < 1.07);
    }

    #[test]
    fn test_rescore_drops_alpha() {
        let mut profile = ConsciousnessProfile::analyze(&BrainData::reference());
        profile.coherence = 0.5;
        profile.complexity = 0.5;
        profile.integration = 0.5;
        profile.rescore();
        assert!((profile.composite_score - 0.5).abs() < 1e-12);
        assert_eq!(profile.level, ConsciousnessLevel::Basic);
    }
}
