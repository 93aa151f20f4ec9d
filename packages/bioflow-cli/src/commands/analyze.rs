use bioflow_rs::{BioflowError, DataContent};

use crate::cli::AnalyzeArgs;
use crate::engine_state::Session;
use crate::exit_codes;
use crate::output;

fn read_content(args: &AnalyzeArgs) -> Result<DataContent, BioflowError> {
    if let Some(ref values) = args.values {
        return Ok(DataContent::Numeric(values.clone()));
    }
    if let Some(ref text) = args.text {
        return Ok(DataContent::Text(text.clone()));
    }
    match args.json_file {
        Some(ref path) => {
            if !std::path::Path::new(path).exists() {
                return Err(BioflowError::FileNotFound(path.clone()));
            }
            let content = std::fs::read_to_string(path)?;
            let value: serde_json::Value = serde_json::from_str(&content)
                .map_err(|e| BioflowError::ParseError(format!("{}: {}", path, e)))?;
            DataContent::from_json(value)
        }
        None => Err(BioflowError::InvalidParameter(
            "One of --values, --text or --json-file must be specified".to_string(),
        )),
    }
}

pub fn execute(args: AnalyzeArgs) -> i32 {
    let content = match read_content(&args) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error: {}", e);
            return exit_codes::for_error(&e);
        }
    };

    let session = match Session::open(&args.engine) {
        Ok(s) => s,
        Err(msg) => {
            eprintln!("Error: {}", msg);
            return exit_codes::INPUT_ERROR;
        }
    };

    let analysis = session
        .flow
        .engine()
        .lock()
        .read_and_analyze_data(&args.source, &content);

    let code = output::emit(&analysis, args.compact, None);
    if code != exit_codes::SUCCESS {
        return code;
    }

    if let Err(msg) = session.save() {
        eprintln!("Error: {}", msg);
        return exit_codes::EXECUTION_ERROR;
    }
    exit_codes::SUCCESS
}
