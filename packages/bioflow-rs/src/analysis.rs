//! Content analysis used by the consciousness engine to learn from data
//!
//! Numeric series, structured JSON objects and free text are each scanned
//! for a small set of patterns. Long enough numeric series also yield
//! coherence, rhythmicity and complexity insights that feed back into the
//! engine's consciousness profile.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{BioflowError, Result};
use crate::stats;

const CONSCIOUSNESS_KEYS: [&str; 5] = ["consciousness", "awareness", "attention", "focus", "coherence"];

const CONSCIOUSNESS_TERMS: [&str; 7] = [
    "consciousness",
    "awareness",
    "mind",
    "brain",
    "neural",
    "cognitive",
    "intelligence",
];

const OPTIMIZATION_TERMS: [&str; 6] = [
    "optimize",
    "improve",
    "enhance",
    "performance",
    "efficiency",
    "speed",
];

/// Numeric series shorter than this carry no insights
const MIN_INSIGHT_LEN: usize = 11;

/// Data handed to the engine for analysis
#[derive(Debug, Clone, PartialEq)]
pub enum DataContent {
    Numeric(Vec<f64>),
    Structured(Map<String, Value>),
    Text(String),
}

impl DataContent {
    /// Classify an arbitrary JSON value
    pub fn from_json(value: Value) -> Result<Self> {
        match value {
            Value::Array(items) => items
                .iter()
                .map(|v| {
                    v.as_f64().ok_or_else(|| {
                        BioflowError::ParseError(format!("non-numeric array element: {}", v))
                    })
                })
                .collect::<Result<Vec<f64>>>()
                .map(Self::Numeric),
            Value::Object(map) => Ok(Self::Structured(map)),
            Value::String(text) => Ok(Self::Text(text)),
            other => Err(BioflowError::ParseError(format!(
                "expected an array, object or string, got {}",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnalysisStatus {
    Analyzed,
    LearningDisabled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DataType {
    Numerical,
    Structured,
    Text,
}

/// A pattern recognised in analyzed data
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Pattern {
    /// Values sitting at indices divisible by 3
    #[serde(rename = "tesla_369")]
    Tesla369 { count: usize, values: Vec<f64> },
    ConsciousnessKeywords { keys: Vec<String> },
    ConsciousnessTerms { terms: Vec<String> },
    OptimizationTerms { terms: Vec<String> },
}

impl Pattern {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Tesla369 { .. } => "tesla_369",
            Self::ConsciousnessKeywords { .. } => "consciousness_keywords",
            Self::ConsciousnessTerms { .. } => "consciousness_terms",
            Self::OptimizationTerms { .. } => "optimization_terms",
        }
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NumericSummary {
    pub size: usize,
    pub mean: f64,
    pub std: f64,
    pub min: f64,
    pub max: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TextSummary {
    pub length: usize,
    pub word_count: usize,
}

/// Consciousness-related measures of a numeric series
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DataInsights {
    pub coherence: f64,
    pub rhythmicity: f64,
    pub complexity: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataAnalysis {
    pub status: AnalysisStatus,
    pub data_source: String,
    pub timestamp: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_type: Option<DataType>,
    #[serde(default)]
    pub patterns_found: Vec<Pattern>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub numeric: Option<NumericSummary>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub keys: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub structure_complexity: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<TextSummary>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub consciousness_insights: Option<DataInsights>,
}

impl DataAnalysis {
    fn empty(source: &str, status: AnalysisStatus) -> Self {
        Self {
            status,
            data_source: source.to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
            data_type: None,
            patterns_found: Vec::new(),
            numeric: None,
            keys: None,
            structure_complexity: None,
            text: None,
            consciousness_insights: None,
        }
    }

    pub fn disabled(source: &str) -> Self {
        Self::empty(source, AnalysisStatus::LearningDisabled)
    }

    /// Analyze `content` without touching any engine state
    pub fn of(source: &str, content: &DataContent) -> Self {
        let mut analysis = Self::empty(source, AnalysisStatus::Analyzed);
        match content {
            DataContent::Numeric(values) => {
                if !values.is_empty() {
                    analysis.data_type = Some(DataType::Numerical);
                    analysis.add_numeric(values);
                }
            }
            DataContent::Structured(map) => analysis.add_structured(map),
            DataContent::Text(text) => analysis.add_text(text),
        }
        analysis
    }

    pub fn pattern_names(&self) -> Vec<String> {
        self.patterns_found.iter().map(|p| p.to_string()).collect()
    }

    fn add_numeric(&mut self, values: &[f64]) {
        let (Some(mean), Some(std), Some(min), Some(max)) = (
            stats::mean(values),
            stats::std(values),
            stats::min(values),
            stats::max(values),
        ) else {
            return;
        };
        self.numeric = Some(NumericSummary {
            size: values.len(),
            mean,
            std,
            min,
            max,
        });

        let aligned: Vec<f64> = values.iter().step_by(3).copied().collect();
        if !aligned.is_empty() {
            self.patterns_found.push(Pattern::Tesla369 {
                count: aligned.len(),
                values: aligned.into_iter().take(10).collect(),
            });
        }

        if values.len() >= MIN_INSIGHT_LEN {
            let complexity = if mean != 0.0 { std / mean } else { 0.0 };
            self.consciousness_insights = Some(DataInsights {
                coherence: 1.0 - std / (mean + 0.001),
                rhythmicity: rhythmicity(values),
                complexity,
            });
        }
    }

    fn add_structured(&mut self, map: &Map<String, Value>) {
        self.data_type = Some(DataType::Structured);
        self.keys = Some(map.keys().cloned().collect());
        self.structure_complexity = Some(map.len());

        let found: Vec<String> = map
            .keys()
            .filter(|key| {
                let lower = key.to_lowercase();
                CONSCIOUSNESS_KEYS.iter().any(|ck| lower.contains(ck))
            })
            .cloned()
            .collect();
        if !found.is_empty() {
            self.patterns_found
                .push(Pattern::ConsciousnessKeywords { keys: found });
        }

        // Only top-level numbers; nested arrays and objects are not descended into.
        // A numeric view supersedes the keyword patterns and the data type.
        let numbers: Vec<f64> = map.values().filter_map(Value::as_f64).collect();
        if !numbers.is_empty() {
            self.data_type = Some(DataType::Numerical);
            self.patterns_found.clear();
            self.add_numeric(&numbers);
        }
    }

    fn add_text(&mut self, text: &str) {
        self.data_type = Some(DataType::Text);
        self.text = Some(TextSummary {
            length: text.chars().count(),
            word_count: text.split_whitespace().count(),
        });

        let lower = text.to_lowercase();
        let consciousness = matching_terms(&lower, &CONSCIOUSNESS_TERMS);
        if !consciousness.is_empty() {
            self.patterns_found
                .push(Pattern::ConsciousnessTerms { terms: consciousness });
        }
        let optimization = matching_terms(&lower, &OPTIMIZATION_TERMS);
        if !optimization.is_empty() {
            self.patterns_found
                .push(Pattern::OptimizationTerms { terms: optimization });
        }
    }
}

fn matching_terms(lower: &str, terms: &[&str]) -> Vec<String> {
    terms
        .iter()
        .filter(|term| lower.contains(*term))
        .map(|term| term.to_string())
        .collect()
}

/// Consistency of step sizes: `1 / (1 + var(|diff|))`, capped at 1
pub fn rhythmicity(values: &[f64]) -> f64 {
    if values.len() < 4 {
        return 0.0;
    }
    let steps: Vec<f64> = stats::diff(values).iter().map(|d| d.abs()).collect();
    match stats::variance(&steps) {
        Some(variance) => (1.0 / (1.0 + variance)).min(1.0),
        None => 0.0,
    }
}
