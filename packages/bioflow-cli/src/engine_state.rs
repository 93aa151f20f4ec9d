use std::path::PathBuf;

use bioflow_rs::{default_state_path, BiologicalFlow, FlowConfig};

use crate::cli::EngineArgs;

/// A flow whose engine is restored from, and saved back to, a state file
pub struct Session {
    pub flow: BiologicalFlow,
    state_path: Option<PathBuf>,
}

impl Session {
    pub fn open(args: &EngineArgs) -> Result<Self, String> {
        let config = match &args.config {
            Some(path) => FlowConfig::from_file(path)
                .map_err(|e| format!("Failed to load config '{}': {}", path.display(), e))?,
            None => FlowConfig::default(),
        };
        let flow = BiologicalFlow::new(config);

        let state_path = resolve_state_path(args);
        if let Some(path) = state_path.as_ref().filter(|p| p.exists()) {
            flow.engine()
                .lock()
                .load_snapshot(path)
                .map_err(|e| format!("Failed to restore engine state '{}': {}", path.display(), e))?;
        }

        Ok(Self { flow, state_path })
    }

    pub fn state_path(&self) -> Option<&PathBuf> {
        self.state_path.as_ref()
    }

    pub fn save(&self) -> Result<(), String> {
        let Some(path) = &self.state_path else {
            return Ok(());
        };
        self.flow
            .engine()
            .lock()
            .save_snapshot(path)
            .map_err(|e| format!("Failed to save engine state '{}': {}", path.display(), e))
    }
}

pub fn resolve_state_path(args: &EngineArgs) -> Option<PathBuf> {
    if args.no_state {
        None
    } else {
        Some(args.state.clone().unwrap_or_else(default_state_path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_state_disables_persistence() {
        let args = EngineArgs {
            no_state: true,
            ..Default::default()
        };
        assert!(resolve_state_path(&args).is_none());
    }

    #[test]
    fn test_state_saved_and_restored() {
        let dir = tempfile::tempdir().unwrap();
        let args = EngineArgs {
            state: Some(dir.path().join("engine.json")),
            ..Default::default()
        };

        let session = Session::open(&args).unwrap();
        session
            .flow
            .engine()
            .lock()
            .optimize_computation(10.0, "ai", true)
            .unwrap();
        session.save().unwrap();

        let restored = Session::open(&args).unwrap();
        assert_eq!(restored.flow.engine().lock().learning_iterations(), 1);
    }

    #[test]
    fn test_missing_config_fails() {
        let args = EngineArgs {
            config: Some(PathBuf::from("/nonexistent/bioflow.json")),
            no_state: true,
            ..Default::default()
        };
        assert!(Session::open(&args).is_err());
    }
}
