//! Biological flow orchestration
//!
//! Routes each medical signal through the organ responsible for it and
//! then through the integration organ, and combines the per-signal results
//! of a patient into one assessment.

use std::collections::{BTreeMap, BTreeSet, VecDeque};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;

use parking_lot::Mutex;
use rayon::prelude::*;
use uuid::Uuid;

use crate::config::FlowConfig;
use crate::engine::ConsciousnessEngine;
use crate::error::{BioflowError, Result};
use crate::organs::{
    BrainOrgan, HeartOrgan, IntegrationOrgan, LungOrgan, MuscleOrgan, Organ, SharedEngine,
};
use crate::profile_scope;
use crate::stats;
use crate::types::{
    Insights, MedicalPacket, PatientAssessment, PatientData, SignalData, SignalKind, SignalResult,
};

pub struct BiologicalFlow {
    config: FlowConfig,
    engine: SharedEngine,
    brain: BrainOrgan,
    heart: HeartOrgan,
    lungs: LungOrgan,
    muscle: MuscleOrgan,
    integration: IntegrationOrgan,
    packets_processed: AtomicU64,
    history: Mutex<VecDeque<SignalResult>>,
}

impl BiologicalFlow {
    pub fn new(config: FlowConfig) -> Self {
        let engine = Arc::new(Mutex::new(ConsciousnessEngine::new(&config)));
        Self {
            brain: BrainOrgan::new(engine.clone()),
            heart: HeartOrgan::new(engine.clone()),
            lungs: LungOrgan::new(engine.clone(), &config),
            muscle: MuscleOrgan::new(engine.clone(), &config),
            integration: IntegrationOrgan::new(engine.clone()),
            engine,
            config,
            packets_processed: AtomicU64::new(0),
            history: Mutex::new(VecDeque::new()),
        }
    }

    pub fn config(&self) -> &FlowConfig {
        &self.config
    }

    pub fn engine(&self) -> &SharedEngine {
        &self.engine
    }

    pub fn total_packets_processed(&self) -> u64 {
        self.packets_processed.load(Ordering::Relaxed)
    }

    /// Most recent signal results, oldest first
    pub fn history(&self) -> Vec<SignalResult> {
        self.history.lock().iter().cloned().collect()
    }

    fn organ_for(&self, kind: SignalKind) -> &dyn Organ {
        match kind {
            SignalKind::Eeg | SignalKind::Cognitive => &self.brain,
            SignalKind::Heart => &self.heart,
            SignalKind::Respiratory | SignalKind::Spo2 => &self.lungs,
            SignalKind::Muscle => &self.muscle,
        }
    }

    /// Push one signal through its organ and the integration organ
    pub fn process_medical_data(&self, data: SignalData, kind: SignalKind) -> Result<SignalResult> {
        if !data.matches(kind) {
            return Err(BioflowError::InvalidParameter(format!(
                "payload shape does not match signal kind {}",
                kind
            )));
        }
        let start = Instant::now();

        let mut packet = MedicalPacket::new(data, kind, "external", "integration");
        self.organ_for(kind).process(&mut packet)?;
        self.integration.process(&mut packet)?;

        let result = SignalResult {
            kind,
            insights: packet.insights,
            patterns_found: packet.patterns_found,
            processing_path: packet.processing_path,
            processing_time_ms: start.elapsed().as_secs_f64() * 1000.0,
            timestamp: packet.timestamp,
        };

        self.packets_processed.fetch_add(1, Ordering::Relaxed);
        let mut history = self.history.lock();
        history.push_back(result.clone());
        while history.len() > self.config.pattern_history_limit {
            history.pop_front();
        }
        log::debug!(
            "Processed {} packet via {}",
            kind,
            result.processing_path.join(" -> ")
        );

        Ok(result)
    }

    /// Process every signal of one patient in canonical order
    pub fn process_patient_complete(&self, patient: &PatientData) -> Result<PatientAssessment> {
        profile_scope!("process_patient_complete");
        // Reject the whole patient before any organ learns from it
        patient.ensure_processable()?;
        let start = Instant::now();

        let mut detailed_insights: BTreeMap<SignalKind, Insights> = BTreeMap::new();
        let mut patterns: BTreeSet<String> = BTreeSet::new();
        let mut scores = Vec::new();

        for (kind, data) in patient.signals() {
            let result = self.process_medical_data(data, kind)?;
            if let Some(score) = result.insights.integrated_consciousness_score {
                scores.push(score);
            }
            patterns.extend(result.patterns_found);
            detailed_insights.insert(kind, result.insights);
        }

        let (level, iterations) = {
            let engine = self.engine.lock();
            (engine.profile().level, engine.learning_iterations())
        };

        let assessment = PatientAssessment {
            id: Uuid::new_v4().to_string(),
            overall_consciousness_score: stats::mean(&scores).unwrap_or(0.0),
            detailed_insights,
            patterns_detected: patterns.into_iter().collect(),
            ac_consciousness_level: level,
            ac_learning_iterations: iterations,
            processing_time_ms: start.elapsed().as_secs_f64() * 1000.0,
            created_at: chrono::Utc::now().to_rfc3339(),
        };
        log::info!(
            "Patient assessed: {} signals, score {:.4}, level {}",
            assessment.detailed_insights.len(),
            assessment.overall_consciousness_score,
            assessment.ac_consciousness_level
        );
        Ok(assessment)
    }

    /// Process patients in parallel; results keep the input order
    pub fn process_batch(&self, patients: &[PatientData]) -> Vec<Result<PatientAssessment>> {
        profile_scope!(format!("process_batch ({} patients)", patients.len()));
        patients
            .par_iter()
            .map(|patient| self.process_patient_complete(patient))
            .collect()
    }
}
