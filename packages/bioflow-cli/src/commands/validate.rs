use std::path::Path;

use bioflow_rs::input::{parse_patient_data, validate_patient_file};
use bioflow_rs::{BioflowError, FileType, SignalCheck};
use serde::Serialize;

use crate::cli::ValidateArgs;
use crate::exit_codes;
use crate::output;

#[derive(Serialize)]
struct ValidationReport {
    file: String,
    supported: bool,
    size_bytes: Option<u64>,
    signals: Vec<SignalCheck>,
    error: Option<String>,
}

pub fn execute(args: ValidateArgs) -> i32 {
    let path = Path::new(&args.file);
    let report = check_file(&args.file, path);

    if args.json {
        let code = output::emit(&report, false, None);
        if code != exit_codes::SUCCESS {
            return code;
        }
    } else if let Some(ref err) = report.error {
        eprintln!("Error: {}", err);
    } else {
        println!("{}: ok ({} bytes)", report.file, report.size_bytes.unwrap_or(0));
        for check in &report.signals {
            match check.problem {
                Some(ref problem) => println!("  {:<12} {}", check.kind, problem),
                None => println!(
                    "  {:<12} {} samples -> {}",
                    check.kind, check.samples, check.organ
                ),
            }
        }
    }

    let rejected = report.signals.iter().any(|c| c.problem.is_some());
    if report.error.is_some() || rejected {
        exit_codes::INPUT_ERROR
    } else {
        exit_codes::SUCCESS
    }
}

fn check_file(name: &str, path: &Path) -> ValidationReport {
    let mut report = ValidationReport {
        file: name.to_string(),
        supported: false,
        size_bytes: None,
        signals: Vec::new(),
        error: None,
    };

    if let Err(e) = validate_patient_file(path) {
        report.error = Some(match e {
            BioflowError::FileNotFound(_) => format!("File not found: {}", name),
            BioflowError::UnsupportedFileType(ext) => format!(
                "Unsupported file extension '{}'. Supported: {}",
                ext,
                FileType::supported_extensions().join(", ")
            ),
            other => other.to_string(),
        });
        return report;
    }
    report.supported = true;
    report.size_bytes = std::fs::metadata(path).ok().map(|m| m.len());

    let content = match std::fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) => {
            report.error = Some(format!("File is not readable: {}", e));
            return report;
        }
    };
    match parse_patient_data(&content) {
        Ok(patient) => report.signals = patient.check_signals(),
        Err(e) => report.error = Some(e.to_string()),
    }
    report
}
