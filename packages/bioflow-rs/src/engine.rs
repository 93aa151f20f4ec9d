//! Hybrid consciousness model (HCM) engine
//!
//! Turns a consciousness profile derived from brain data into multipliers
//! for computational workloads, and learns from every optimization it
//! performs: per-task memory, adaptation weights and a bounded store of
//! analyzed data patterns.

use std::collections::{BTreeMap, VecDeque};
use std::path::Path;
use std::time::Instant;

use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

use crate::analysis::{DataAnalysis, DataContent};
use crate::brain_data::{
    BrainData, BrainStateTransition, ConsciousnessLevel, ConsciousnessMetrics,
    ConsciousnessProfile, EegMetrics, TransferCompatibility,
};
use crate::config::FlowConfig;
use crate::error::{BioflowError, Result};
use crate::stats;

const LEARNING_RATE: f64 = 0.1;
const PROFILE_LEARNING_RATE: f64 = 0.05;
const WEIGHT_BOUNDS: (f64, f64) = (0.5, 2.0);

/// Base multiplier for a task type
pub fn task_multiplier(task: &str) -> f64 {
    match task {
        "mining" => 1.234,
        "ai" => 1.18,
        "general" => 1.15,
        "nuclear" => 1.22,
        _ => 1.15,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AdaptationWeights {
    pub consciousness_multiplier: f64,
    pub task_multiplier: f64,
    pub eeg_boost: f64,
}

impl Default for AdaptationWeights {
    fn default() -> Self {
        Self {
            consciousness_multiplier: 1.0,
            task_multiplier: 1.0,
            eeg_boost: 1.0,
        }
    }
}

impl AdaptationWeights {
    fn scale(&mut self, consciousness: f64, task: f64, eeg: f64) {
        self.consciousness_multiplier *= consciousness;
        self.task_multiplier *= task;
        self.eeg_boost *= eeg;
    }

    fn clamp(&mut self) {
        let (lo, hi) = WEIGHT_BOUNDS;
        self.consciousness_multiplier = self.consciousness_multiplier.clamp(lo, hi);
        self.task_multiplier = self.task_multiplier.clamp(lo, hi);
        self.eeg_boost = self.eeg_boost.clamp(lo, hi);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Enhancements {
    pub consciousness_multiplier: f64,
    pub task_multiplier: f64,
    pub eeg_boost: f64,
    pub adaptation_weights: AdaptationWeights,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptimizationResult {
    pub base_performance: f64,
    pub optimized_performance: f64,
    pub improvement_percent: f64,
    pub consciousness_level: ConsciousnessLevel,
    pub consciousness_score: f64,
    pub task_type: String,
    /// Seconds
    pub execution_time: f64,
    pub learning_iteration: u64,
    pub enhancements: Enhancements,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerformanceRecord {
    pub timestamp: String,
    pub task_type: String,
    pub baseline_performance: f64,
    pub actual_performance: f64,
    pub improvement_ratio: f64,
    pub execution_time: f64,
    pub efficiency_score: f64,
    pub consciousness_level: ConsciousnessLevel,
    pub consciousness_score: f64,
    pub learning_iteration: u64,
}

/// Conditions under which a task reached a new best improvement
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SuccessfulPattern {
    pub consciousness_score: f64,
    pub eeg_pattern: EegMetrics,
    pub improvement: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskMemory {
    pub best_improvement: f64,
    pub average_improvement: f64,
    pub total_runs: u64,
    #[serde(default)]
    pub successful_patterns: Vec<SuccessfulPattern>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LearnedPattern {
    pub key: String,
    pub source: String,
    pub analysis: DataAnalysis,
    pub consciousness_state: f64,
    pub learned_at: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TaskPerformance {
    pub best_improvement: f64,
    pub average_improvement: f64,
    pub total_runs: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LearningSummary {
    pub learning_iterations: u64,
    pub total_performance_records: usize,
    pub patterns_learned: usize,
    pub task_types_optimized: Vec<String>,
    pub current_adaptation_weights: AdaptationWeights,
    pub current_level: ConsciousnessLevel,
    pub current_score: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recent_average_improvement: Option<f64>,
    pub task_performance: BTreeMap<String, TaskPerformance>,
}

/// Persisted engine state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineSnapshot {
    pub consciousness_profile: ConsciousnessProfile,
    pub eeg_metrics: EegMetrics,
    pub psi_prime_patterns: BTreeMap<String, Vec<f64>>,
    pub consciousness_metrics: ConsciousnessMetrics,
    pub transfer_compatibility: TransferCompatibility,
    pub timestamp: String,
    #[serde(default = "default_use_real_data")]
    pub use_real_data: bool,
    #[serde(default)]
    pub brain_states: Vec<BrainStateTransition>,
    #[serde(default)]
    pub adaptation_weights: AdaptationWeights,
    #[serde(default)]
    pub learning_iterations: u64,
    #[serde(default)]
    pub optimization_memory: BTreeMap<String, TaskMemory>,
    #[serde(default)]
    pub performance_history: Vec<PerformanceRecord>,
    #[serde(default)]
    pub learned_patterns: Vec<LearnedPattern>,
    /// Next learned-pattern key suffix
    #[serde(default)]
    pub patterns_stored: u64,
}

fn default_use_real_data() -> bool {
    true
}

/// Last `limit` items of `items`, oldest first
fn newest<T>(items: Vec<T>, limit: usize) -> VecDeque<T> {
    let mut items: VecDeque<T> = items.into();
    while items.len() > limit {
        items.pop_front();
    }
    items
}

pub struct ConsciousnessEngine {
    use_real_data: bool,
    learning_enabled: bool,
    history_limit: usize,
    brain_data: BrainData,
    profile: ConsciousnessProfile,
    weights: AdaptationWeights,
    optimization_memory: BTreeMap<String, TaskMemory>,
    performance_history: VecDeque<PerformanceRecord>,
    patterns: VecDeque<LearnedPattern>,
    patterns_stored: u64,
    learning_iterations: u64,
}

impl ConsciousnessEngine {
    pub fn new(config: &FlowConfig) -> Self {
        let brain_data = if config.use_real_data {
            log::info!("Loading reference brain data");
            BrainData::reference()
        } else {
            let mut rng = match config.synthetic_seed {
                Some(seed) => StdRng::seed_from_u64(seed),
                None => StdRng::from_entropy(),
            };
            log::info!("Generating synthetic brain data");
            BrainData::synthetic(&mut rng)
        };
        let profile = ConsciousnessProfile::analyze(&brain_data);
        log::info!(
            "Consciousness profile: {} ({:.4})",
            profile.level,
            profile.composite_score
        );

        Self {
            use_real_data: config.use_real_data,
            learning_enabled: config.learning_enabled,
            history_limit: config.pattern_history_limit,
            brain_data,
            profile,
            weights: AdaptationWeights::default(),
            optimization_memory: BTreeMap::new(),
            performance_history: VecDeque::new(),
            patterns: VecDeque::new(),
            patterns_stored: 0,
            learning_iterations: 0,
        }
    }

    pub fn profile(&self) -> &ConsciousnessProfile {
        &self.profile
    }

    pub fn brain_data(&self) -> &BrainData {
        &self.brain_data
    }

    pub fn weights(&self) -> AdaptationWeights {
        self.weights
    }

    pub fn learning_enabled(&self) -> bool {
        self.learning_enabled
    }

    pub fn learning_iterations(&self) -> u64 {
        self.learning_iterations
    }

    pub fn task_memory(&self, task: &str) -> Option<&TaskMemory> {
        self.optimization_memory.get(task)
    }

    pub fn performance_history(&self) -> impl Iterator<Item = &PerformanceRecord> {
        self.performance_history.iter()
    }

    pub fn learned_patterns(&self) -> impl Iterator<Item = &LearnedPattern> {
        self.patterns.iter()
    }

    /// Boost from psi-prime pattern coherence and alpha dominance, capped at 1.5
    pub fn eeg_boost(&self) -> f64 {
        let values = self.brain_data.psi_prime_values();
        let pattern_coherence = match (stats::mean(&values), stats::std(&values)) {
            (Some(mean), Some(std)) => 1.0 - std / mean,
            _ => 1.0,
        };
        (1.0 + pattern_coherence * self.profile.alpha_dominance * 0.1).min(1.5)
    }

    pub fn optimize_computation(
        &mut self,
        base: f64,
        task: &str,
        learn: bool,
    ) -> Result<OptimizationResult> {
        if !base.is_finite() || base == 0.0 {
            return Err(BioflowError::InvalidParameter(format!(
                "base performance must be finite and non-zero, got {}",
                base
            )));
        }
        let start = Instant::now();

        let consciousness_multiplier =
            (1.0 + self.profile.composite_score * 0.25) * self.weights.consciousness_multiplier;

        let base_task = task_multiplier(task);
        let task_multiplier = match self.optimization_memory.get(task) {
            Some(memory) => {
                let learning_boost = (memory.best_improvement * 0.1).min(1.2);
                base_task * learning_boost * self.weights.task_multiplier
            }
            None => base_task * self.weights.task_multiplier,
        };

        let eeg_boost = self.eeg_boost() * self.weights.eeg_boost;

        let optimized = base * consciousness_multiplier * task_multiplier * eeg_boost;
        let improvement_percent = (optimized - base) / base * 100.0;
        let execution_time = start.elapsed().as_secs_f64();
        let enhancements = Enhancements {
            consciousness_multiplier,
            task_multiplier,
            eeg_boost,
            adaptation_weights: self.weights,
        };

        if learn && self.learning_enabled {
            self.learn_from_performance(task, base, optimized, execution_time);
        }

        log::debug!(
            "Optimized {} task: {:.3} -> {:.3} ({:+.1}%)",
            task,
            base,
            optimized,
            improvement_percent
        );

        Ok(OptimizationResult {
            base_performance: base,
            optimized_performance: optimized,
            improvement_percent,
            consciousness_level: self.profile.level,
            consciousness_score: self.profile.composite_score,
            task_type: task.to_string(),
            execution_time,
            learning_iteration: self.learning_iterations,
            enhancements,
        })
    }

    pub fn learn_from_performance(
        &mut self,
        task: &str,
        baseline: f64,
        actual: f64,
        execution_time: f64,
    ) {
        if !self.learning_enabled {
            return;
        }

        let ratio = if baseline > 0.0 { actual / baseline } else { 1.0 };
        let efficiency_score = if execution_time > 0.0 {
            actual / execution_time
        } else {
            0.0
        };

        self.performance_history.push_back(PerformanceRecord {
            timestamp: chrono::Utc::now().to_rfc3339(),
            task_type: task.to_string(),
            baseline_performance: baseline,
            actual_performance: actual,
            improvement_ratio: ratio,
            execution_time,
            efficiency_score,
            consciousness_level: self.profile.level,
            consciousness_score: self.profile.composite_score,
            learning_iteration: self.learning_iterations,
        });
        while self.performance_history.len() > self.history_limit {
            self.performance_history.pop_front();
        }

        match self.optimization_memory.get_mut(task) {
            None => {
                self.optimization_memory.insert(
                    task.to_string(),
                    TaskMemory {
                        best_improvement: ratio,
                        average_improvement: ratio,
                        total_runs: 1,
                        successful_patterns: Vec::new(),
                    },
                );
            }
            Some(memory) => {
                memory.total_runs += 1;
                let runs = memory.total_runs as f64;
                memory.average_improvement =
                    (memory.average_improvement * (runs - 1.0) + ratio) / runs;
                if ratio > memory.best_improvement {
                    memory.best_improvement = ratio;
                    memory.successful_patterns.push(SuccessfulPattern {
                        consciousness_score: self.profile.composite_score,
                        eeg_pattern: self.brain_data.eeg_metrics.clone(),
                        improvement: ratio,
                    });
                }
            }
        }

        self.adapt_weights(ratio);
        self.learning_iterations += 1;
        log::info!("Learned from {} performance: {:.3}x improvement", task, ratio);
    }

    fn adapt_weights(&mut self, ratio: f64) {
        if ratio > 1.1 {
            self.weights.scale(
                1.0 + LEARNING_RATE * 0.5,
                1.0 + LEARNING_RATE * 0.3,
                1.0 + LEARNING_RATE * 0.2,
            );
        } else if ratio < 0.9 {
            self.weights.scale(
                1.0 - LEARNING_RATE * 0.3,
                1.0 - LEARNING_RATE * 0.2,
                1.0 - LEARNING_RATE * 0.1,
            );
        }
        self.weights.clamp();
    }

    /// Analyze external data and fold what it shows into the profile
    pub fn read_and_analyze_data(&mut self, source: &str, content: &DataContent) -> DataAnalysis {
        if !self.learning_enabled {
            return DataAnalysis::disabled(source);
        }

        let analysis = DataAnalysis::of(source, content);

        self.patterns.push_back(LearnedPattern {
            key: format!("{}_{}", source, self.patterns_stored),
            source: source.to_string(),
            analysis: analysis.clone(),
            consciousness_state: self.profile.composite_score,
            learned_at: chrono::Utc::now().to_rfc3339(),
        });
        self.patterns_stored += 1;
        while self.patterns.len() > self.history_limit {
            self.patterns.pop_front();
        }

        if let Some(insights) = &analysis.consciousness_insights {
            let keep = 1.0 - PROFILE_LEARNING_RATE;
            self.profile.coherence =
                self.profile.coherence * keep + insights.coherence * PROFILE_LEARNING_RATE;
            self.profile.complexity = self.profile.complexity * keep
                + insights.complexity.min(1.0) * PROFILE_LEARNING_RATE;
            self.profile.rescore();
            log::debug!(
                "Profile updated from {}: {} ({:.4})",
                source,
                self.profile.level,
                self.profile.composite_score
            );
        }

        analysis
    }

    /// None when learning is disabled
    pub fn learning_summary(&self) -> Option<LearningSummary> {
        if !self.learning_enabled {
            return None;
        }

        let recent_average_improvement = if self.performance_history.is_empty() {
            None
        } else {
            let recent: Vec<f64> = self
                .performance_history
                .iter()
                .rev()
                .take(10)
                .map(|r| r.improvement_ratio)
                .collect();
            stats::mean(&recent)
        };

        let task_performance = self
            .optimization_memory
            .iter()
            .map(|(task, memory)| {
                (
                    task.clone(),
                    TaskPerformance {
                        best_improvement: memory.best_improvement,
                        average_improvement: memory.average_improvement,
                        total_runs: memory.total_runs,
                    },
                )
            })
            .collect();

        Some(LearningSummary {
            learning_iterations: self.learning_iterations,
            total_performance_records: self.performance_history.len(),
            patterns_learned: self.patterns.len(),
            task_types_optimized: self.optimization_memory.keys().cloned().collect(),
            current_adaptation_weights: self.weights,
            current_level: self.profile.level,
            current_score: self.profile.composite_score,
            recent_average_improvement,
            task_performance,
        })
    }

    /// Markdown report for one optimization
    pub fn optimization_report(&self, result: &OptimizationResult) -> String {
        let p = &self.profile;
        let eeg = &self.brain_data.eeg_metrics;
        let transfer = &self.brain_data.transfer_compatibility;
        let e = &result.enhancements;

        format!(
            "# HCM Optimization Report\n\
             Generated: {generated}\n\
             \n\
             ## Consciousness Profile\n\
             - **Level**: {level}\n\
             - **Composite Score**: {composite:.3}\n\
             - **Neural Coherence**: {coherence:.3}\n\
             - **Spectral Complexity**: {complexity:.3}\n\
             - **Network Integration**: {integration:.3}\n\
             - **Alpha Dominance**: {alpha:.3}\n\
             \n\
             ## Performance Results\n\
             - **Task Type**: {task}\n\
             - **Base Performance**: {base:.2}\n\
             - **Optimized Performance**: {optimized:.2}\n\
             - **Improvement**: {improvement:.1}%\n\
             \n\
             ## Enhancement Breakdown\n\
             - **Consciousness Multiplier**: {cm:.3}x\n\
             - **Task Multiplier**: {tm:.3}x\n\
             - **EEG Boost**: {boost:.3}x\n\
             \n\
             ## EEG Metrics\n\
             - **Alpha Source**: {alpha_src:.3}\n\
             - **Alpha Target**: {alpha_tgt:.3}\n\
             - **Alpha Gate**: {alpha_gate:.3}\n\
             - **Delta S**: {delta_s:.6}\n\
             - **HSL Mix**: {hsl_mix:.3}\n\
             \n\
             ## Transfer Compatibility\n\
             - **Decision**: {decision}\n\
             - **Margin**: {margin:.3}\n",
            generated = chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
            level = p.level,
            composite = p.composite_score,
            coherence = p.coherence,
            complexity = p.complexity,
            integration = p.integration,
            alpha = p.alpha_dominance,
            task = result.task_type,
            base = result.base_performance,
            optimized = result.optimized_performance,
            improvement = result.improvement_percent,
            cm = e.consciousness_multiplier,
            tm = e.task_multiplier,
            boost = e.eeg_boost,
            alpha_src = eeg.alpha_src,
            alpha_tgt = eeg.alpha_tgt,
            alpha_gate = eeg.alpha_gate,
            delta_s = eeg.delta_s,
            hsl_mix = eeg.hsl_mix,
            decision = transfer.decision,
            margin = transfer.margin,
        )
    }

    pub fn snapshot(&self) -> EngineSnapshot {
        EngineSnapshot {
            consciousness_profile: self.profile.clone(),
            eeg_metrics: self.brain_data.eeg_metrics.clone(),
            psi_prime_patterns: self.brain_data.psi_prime_patterns.clone(),
            consciousness_metrics: self.brain_data.consciousness_metrics.clone(),
            transfer_compatibility: self.brain_data.transfer_compatibility.clone(),
            timestamp: chrono::Utc::now().to_rfc3339(),
            use_real_data: self.use_real_data,
            brain_states: self.brain_data.brain_states.clone(),
            adaptation_weights: self.weights,
            learning_iterations: self.learning_iterations,
            optimization_memory: self.optimization_memory.clone(),
            performance_history: self.performance_history.iter().cloned().collect(),
            learned_patterns: self.patterns.iter().cloned().collect(),
            patterns_stored: self.patterns_stored,
        }
    }

    pub fn restore(&mut self, snapshot: EngineSnapshot) {
        self.profile = snapshot.consciousness_profile;
        self.brain_data = BrainData {
            eeg_metrics: snapshot.eeg_metrics,
            psi_prime_patterns: snapshot.psi_prime_patterns,
            brain_states: snapshot.brain_states,
            consciousness_metrics: snapshot.consciousness_metrics,
            transfer_compatibility: snapshot.transfer_compatibility,
        };
        self.use_real_data = snapshot.use_real_data;
        self.weights = snapshot.adaptation_weights;
        self.weights.clamp();
        self.learning_iterations = snapshot.learning_iterations;
        self.optimization_memory = snapshot.optimization_memory;

        self.performance_history = newest(snapshot.performance_history, self.history_limit);
        self.patterns = newest(snapshot.learned_patterns, self.history_limit);
        // Older snapshots carry patterns but no counter
        self.patterns_stored = snapshot
            .patterns_stored
            .max(self.patterns.len() as u64);
    }

    pub fn save_snapshot<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let json = serde_json::to_string_pretty(&self.snapshot())?;
        std::fs::write(path, json)?;
        log::info!("Engine state saved to {}", path.display());
        Ok(())
    }

    pub fn load_snapshot<P: AsRef<Path>>(&mut self, path: P) -> Result<()> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(BioflowError::FileNotFound(path.display().to_string()));
        }
        let content = std::fs::read_to_string(path)?;
        let snapshot: EngineSnapshot = serde_json::from_str(&content)?;
        self.restore(snapshot);
        log::info!("Engine state loaded from {}", path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-9;

    fn engine() -> ConsciousnessEngine {
        ConsciousnessEngine::new(&FlowConfig::default())
    }

    #[test]
    fn test_first_general_optimization() {
        let mut engine = engine();
        let boost = engine.eeg_boost();
        let result = engine.optimize_computation(100.0, "general", true).unwrap();

        let consciousness = 1.0 + 0.9975 * 0.25;
        assert!((result.enhancements.consciousness_multiplier - consciousness).abs() < EPS);
        assert!((result.enhancements.task_multiplier - 1.15).abs() < EPS);
        assert!((result.enhancements.eeg_boost - boost).abs() < EPS);

        let expected = 100.0 * consciousness * 1.15 * boost;
        assert!((result.optimized_performance - expected).abs() < 1e-6);
        assert!((result.improvement_percent - (expected - 100.0)).abs() < 1e-6);
        assert_eq!(result.consciousness_level, ConsciousnessLevel::Exceptional);
        assert_eq!(result.learning_iteration, 1);
    }

    #[test]
    fn test_eeg_boost_from_reference_patterns() {
        let engine = engine();
        let values = engine.brain_data().psi_prime_values();
        let coherence = 1.0 - stats::std(&values).unwrap() / stats::mean(&values).unwrap();
        assert!((engine.eeg_boost() - (1.0 + coherence * 0.1)).abs() < EPS);
        assert!(engine.eeg_boost() <= 1.5);
    }

    #[test]
    fn test_learning_adapts_weights_and_memory() {
        let mut engine = engine();
        engine.optimize_computation(100.0, "general", true).unwrap();

        let weights = engine.weights();
        assert!((weights.consciousness_multiplier - 1.05).abs() < EPS);
        assert!((weights.task_multiplier - 1.03).abs() < EPS);
        assert!((weights.eeg_boost - 1.02).abs() < EPS);

        let memory = engine.task_memory("general").unwrap();
        assert_eq!(memory.total_runs, 1);
        assert!(memory.best_improvement > 1.1);
        assert!(memory.successful_patterns.is_empty());

        // Second run applies the capped memory boost
        let best = memory.best_improvement;
        let second = engine.optimize_computation(100.0, "general", false).unwrap();
        let expected = 1.15 * (best * 0.1).min(1.2) * 1.03;
        assert!((second.enhancements.task_multiplier - expected).abs() < EPS);
        assert_eq!(engine.learning_iterations(), 1);
    }

    #[test]
    fn test_poor_performance_shrinks_weights() {
        let mut engine = engine();
        engine.learn_from_performance("ai", 100.0, 50.0, 0.0);
        let w = engine.weights();
        assert!((w.consciousness_multiplier - 0.97).abs() < EPS);
        assert!((w.task_multiplier - 0.98).abs() < EPS);
        assert!((w.eeg_boost - 0.99).abs() < EPS);

        let record = engine.performance_history().next().unwrap();
        assert_eq!(record.efficiency_score, 0.0);
        assert!((record.improvement_ratio - 0.5).abs() < EPS);
    }

    #[test]
    fn test_weights_are_clamped() {
        let mut engine = engine();
        for _ in 0..100 {
            engine.learn_from_performance("mining", 1.0, 10.0, 1.0);
        }
        let w = engine.weights();
        assert_eq!(w.consciousness_multiplier, 2.0);
        assert_eq!(w.task_multiplier, 2.0);
        assert_eq!(w.eeg_boost, 2.0);

        let memory = engine.task_memory("mining").unwrap();
        assert_eq!(memory.total_runs, 100);
        assert!((memory.average_improvement - 10.0).abs() < EPS);
    }

    #[test]
    fn test_new_best_records_successful_pattern() {
        let mut engine = engine();
        engine.learn_from_performance("nuclear", 100.0, 110.0, 1.0);
        engine.learn_from_performance("nuclear", 100.0, 130.0, 1.0);
        engine.learn_from_performance("nuclear", 100.0, 120.0, 1.0);
        let memory = engine.task_memory("nuclear").unwrap();
        assert_eq!(memory.successful_patterns.len(), 1);
        assert!((memory.best_improvement - 1.3).abs() < EPS);
        assert!((memory.average_improvement - 1.2).abs() < EPS);
    }

    #[test]
    fn test_invalid_base_is_rejected() {
        let mut engine = engine();
        assert!(engine.optimize_computation(0.0, "general", true).is_err());
        assert!(engine.optimize_computation(f64::NAN, "general", true).is_err());
        assert_eq!(engine.learning_iterations(), 0);
    }

    #[test]
    fn test_learning_disabled() {
        let config = FlowConfig {
            learning_enabled: false,
            ..Default::default()
        };
        let mut engine = ConsciousnessEngine::new(&config);
        engine.optimize_computation(10.0, "ai", true).unwrap();
        assert_eq!(engine.learning_iterations(), 0);
        assert!(engine.learning_summary().is_none());

        let analysis = engine.read_and_analyze_data("x", &DataContent::Numeric(vec![1.0]));
        assert_eq!(analysis.status, crate::analysis::AnalysisStatus::LearningDisabled);
        assert_eq!(engine.learned_patterns().count(), 0);
    }

    #[test]
    fn test_analysis_blends_profile() {
        let mut engine = engine();
        let before = engine.profile().clone();
        let values: Vec<f64> = (1..=12).map(|v| v as f64).collect();
        let analysis = engine.read_and_analyze_data("ramp", &DataContent::Numeric(values));
        let insights = analysis.consciousness_insights.unwrap();

        let profile = engine.profile();
        let coherence = before.coherence * 0.95 + insights.coherence * 0.05;
        let complexity = before.complexity * 0.95 + insights.complexity.min(1.0) * 0.05;
        assert!((profile.coherence - coherence).abs() < EPS);
        assert!((profile.complexity - complexity).abs() < EPS);
        let composite = (coherence + complexity + before.integration) / 3.0;
        assert!((profile.composite_score - composite).abs() < EPS);
        assert_eq!(profile.level, ConsciousnessLevel::from_score(composite));

        let stored = engine.learned_patterns().next().unwrap();
        assert_eq!(stored.key, "ramp_0");
    }

    #[test]
    fn test_pattern_store_is_bounded() {
        let config = FlowConfig {
            pattern_history_limit: 2,
            ..Default::default()
        };
        let mut engine = ConsciousnessEngine::new(&config);
        for _ in 0..3 {
            engine.read_and_analyze_data("s", &DataContent::Text("mind".to_string()));
        }
        let keys: Vec<&str> = engine.learned_patterns().map(|p| p.key.as_str()).collect();
        assert_eq!(keys, vec!["s_1", "s_2"]);
    }

    #[test]
    fn test_learning_summary() {
        let mut engine = engine();
        engine.learn_from_performance("ai", 100.0, 120.0, 1.0);
        engine.learn_from_performance("ai", 100.0, 100.0, 1.0);
        let summary = engine.learning_summary().unwrap();
        assert_eq!(summary.learning_iterations, 2);
        assert_eq!(summary.total_performance_records, 2);
        assert_eq!(summary.task_types_optimized, vec!["ai".to_string()]);
        assert!((summary.recent_average_improvement.unwrap() - 1.1).abs() < EPS);
        assert_eq!(summary.task_performance["ai"].total_runs, 2);
    }

    #[test]
    fn test_report_sections() {
        let mut engine = engine();
        let result = engine.optimize_computation(50.0, "mining", false).unwrap();
        let report = engine.optimization_report(&result);
        assert!(report.starts_with("# HCM Optimization Report"));
        assert!(report.contains("- **Task Type**: mining"));
        assert!(report.contains("- **Level**: Exceptional"));
        assert!(report.contains("- **Delta S**: 0.007116"));
        assert!(report.contains("- **Decision**: open"));
    }

    #[test]
    fn test_snapshot_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state").join("engine.json");

        let mut engine = engine();
        engine.optimize_computation(100.0, "general", true).unwrap();
        engine.save_snapshot(&path).unwrap();

        let mut restored = ConsciousnessEngine::new(&FlowConfig::synthetic(1));
        restored.load_snapshot(&path).unwrap();
        assert_eq!(restored.learning_iterations(), 1);
        assert!(
            (restored.weights().task_multiplier - engine.weights().task_multiplier).abs() < EPS
        );
        assert!(
            (restored.profile().composite_score - engine.profile().composite_score).abs() < EPS
        );
        assert_eq!(restored.profile().level, engine.profile().level);
        assert!(restored.task_memory("general").is_some());
        assert!(
            (restored.brain_data().eeg_metrics.hsl_mix - engine.brain_data().eeg_metrics.hsl_mix)
                .abs()
                < EPS
        );
    }

    #[test]
    fn test_legacy_snapshot_loads_with_defaults() {
        let engine = engine();
        let mut value = serde_json::to_value(engine.snapshot()).unwrap();
        let object = value.as_object_mut().unwrap();
        object.remove("adaptation_weights");
        object.remove("learning_iterations");
        object.remove("optimization_memory");
        object.remove("brain_states");
        object.remove("performance_history");
        object.remove("learned_patterns");
        object.remove("patterns_stored");

        let snapshot: EngineSnapshot = serde_json::from_value(value).unwrap();
        assert_eq!(snapshot.adaptation_weights, AdaptationWeights::default());
        assert_eq!(snapshot.learning_iterations, 0);
        assert!(snapshot.brain_states.is_empty());
        assert!(snapshot.performance_history.is_empty());
        assert_eq!(snapshot.patterns_stored, 0);
    }

    #[test]
    fn test_snapshot_keeps_learning_history() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("engine.json");

        let mut engine = engine();
        engine.optimize_computation(10.0, "ai", true).unwrap();
        engine.read_and_analyze_data("cli", &DataContent::Text("brain focus".to_string()));
        engine.save_snapshot(&path).unwrap();

        let mut restored = ConsciousnessEngine::new(&FlowConfig::default());
        restored.load_snapshot(&path).unwrap();
        let summary = restored.learning_summary().unwrap();
        assert_eq!(summary.learning_iterations, 1);
        assert_eq!(summary.total_performance_records, 1);
        assert_eq!(summary.patterns_learned, 1);
        assert!(summary.recent_average_improvement.is_some());

        restored.read_and_analyze_data("cli", &DataContent::Text("neural".to_string()));
        let keys: Vec<&str> = restored.learned_patterns().map(|p| p.key.as_str()).collect();
        assert_eq!(keys, vec!["cli_0", "cli_1"]);
    }

    #[test]
    fn test_restore_trims_history_to_limit() {
        let mut engine = engine();
        for _ in 0..5 {
            engine.learn_from_performance("ai", 100.0, 110.0, 1.0);
            engine.read_and_analyze_data("s", &DataContent::Numeric(vec![1.0, 2.0]));
        }
        let snapshot = engine.snapshot();

        let config = FlowConfig {
            pattern_history_limit: 2,
            ..Default::default()
        };
        let mut small = ConsciousnessEngine::new(&config);
        small.restore(snapshot);
        assert_eq!(small.performance_history().count(), 2);
        let keys: Vec<&str> = small.learned_patterns().map(|p| p.key.as_str()).collect();
        assert_eq!(keys, vec!["s_3", "s_4"]);

        small.read_and_analyze_data("s", &DataContent::Numeric(vec![3.0]));
        assert_eq!(small.learned_patterns().last().unwrap().key, "s_5");
    }

    #[test]
    fn test_load_hcm_configuration_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("hcm_config.json");
        let config = r#"{
            "consciousness_profile": {
                "coherence": 0.9937,
                "complexity": 0.9995,
                "integration": 0.9968,
                "alpha_dominance": 1.0,
                "consciousness_level": "Exceptional",
                "composite_score": 0.9975
            },
            "eeg_metrics": {
                "alpha_src": 1.0, "alpha_tgt": 1.0, "alpha_gate": 1.0,
                "delta_S": 0.007115867142499788, "hsl_mix": 1.875
            },
            "psi_prime_patterns": {"f4": [0.043, 0.067], "f9": [0.031, 0.055]},
            "consciousness_metrics": {
                "cosine_similarity": 0.9937, "spectral_similarity": 0.9995,
                "degree_similarity": 0.9968, "role_similarity": 1.0,
                "entropy_stateA": 3.639, "entropy_stateB": 3.646, "entropy_gap": 0.006
            },
            "transfer_compatibility": {"decision": "open", "margin": 0.3},
            "timestamp": "2025-01-01T12:00:00",
            "use_real_data": true
        }"#;
        std::fs::write(&path, config).unwrap();

        let mut engine = ConsciousnessEngine::new(&FlowConfig::synthetic(3));
        engine.load_snapshot(&path).unwrap();
        assert_eq!(engine.profile().level, ConsciousnessLevel::Exceptional);
        let eeg = &engine.brain_data().eeg_metrics;
        assert!((eeg.delta_s - 0.007115867142499788).abs() < EPS);
        let metrics = &engine.brain_data().consciousness_metrics;
        assert!((metrics.entropy_state_a - 3.639).abs() < EPS);
        assert!((metrics.entropy_state_b - 3.646).abs() < EPS);
        assert_eq!(engine.learning_iterations(), 0);
        assert!(engine.learning_summary().unwrap().recent_average_improvement.is_none());
    }

    #[test]
    fn test_report_ends_with_transfer_section() {
        let mut engine = engine();
        let result = engine.optimize_computation(10.0, "ai", false).unwrap();
        let report = engine.optimization_report(&result);
        assert!(report.contains("\n\n## Enhancement Breakdown\n- **Consciousness Multiplier**: "));
        assert!(report.ends_with("- **Margin**: 0.300\n"));
    }

    #[test]
    fn test_load_missing_snapshot() {
        let mut engine = engine();
        let result = engine.load_snapshot("/nonexistent/engine_state.json");
        assert!(matches!(result, Err(BioflowError::FileNotFound(_))));
    }
}
