pub mod analysis;
pub mod brain_data;
pub mod config;
pub mod engine;
pub mod error;
pub mod flow;
pub mod input;
pub mod organs;
pub mod profiling;
pub mod spectral;
pub mod stats;
pub mod types;

pub use analysis::{DataAnalysis, DataContent, Pattern};
pub use brain_data::{BrainData, ConsciousnessLevel, ConsciousnessProfile};
pub use config::{default_state_path, FlowConfig};
pub use engine::{ConsciousnessEngine, EngineSnapshot, LearningSummary, OptimizationResult};
pub use error::{BioflowError, Result};
pub use flow::BiologicalFlow;
pub use input::{load_patient_file, validate_patient_file, FileType};
pub use organs::{Organ, SharedEngine};
pub use types::*;
