use std::path::{Path, PathBuf};
use std::time::Instant;

use bioflow_rs::{load_patient_file, PatientAssessment, PatientData};
use serde::Serialize;

use crate::cli::BatchArgs;
use crate::engine_state::Session;
use crate::exit_codes;
use crate::output;

/// One line of the JSONL stream written when no output directory is given
#[derive(Serialize)]
struct BatchLine<'a> {
    file: &'a str,
    assessment: &'a PatientAssessment,
}

#[derive(Default)]
struct Tally {
    assessed: usize,
    failed: usize,
}

impl Tally {
    fn exit_code(&self, total: usize) -> i32 {
        match (self.assessed, self.failed) {
            (n, 0) if n == total => exit_codes::SUCCESS,
            (0, _) => exit_codes::EXECUTION_ERROR,
            _ => exit_codes::PARTIAL_FAILURE,
        }
    }
}

pub async fn execute(args: BatchArgs) -> i32 {
    let files = match patient_files(&args) {
        Ok(files) if files.is_empty() => {
            eprintln!("Error: no patient files matched");
            return exit_codes::INPUT_ERROR;
        }
        Ok(files) => files,
        Err(msg) => {
            eprintln!("Error: {}", msg);
            return exit_codes::INPUT_ERROR;
        }
    };

    if args.dry_run {
        files.iter().for_each(|f| println!("{}", f));
        if !args.quiet {
            eprintln!("{} patient file(s) would be assessed", files.len());
        }
        return exit_codes::SUCCESS;
    }

    let session = match Session::open(&args.engine) {
        Ok(s) => s,
        Err(msg) => {
            eprintln!("Error: {}", msg);
            return exit_codes::INPUT_ERROR;
        }
    };
    if let Some(ref dir) = args.output_dir {
        if let Err(e) = std::fs::create_dir_all(dir) {
            eprintln!("Error: cannot create output directory {}: {}", dir, e);
            return exit_codes::EXECUTION_ERROR;
        }
    }

    let started = Instant::now();
    let mut tally = Tally::default();

    let patients = load_patients(&files, &args, &mut tally).await;
    let stop_early = tally.failed > 0 && !args.continue_on_error;

    if !stop_early {
        let data: Vec<PatientData> = patients.iter().map(|(_, p)| p.clone()).collect();
        let assessments = session.flow.process_batch(&data);

        for ((file, _), assessment) in patients.iter().zip(assessments) {
            let outcome = assessment
                .map_err(|e| format!("{}: assessment failed: {}", file, e))
                .and_then(|a| {
                    write_assessment(file, &a, &args)
                        .map_err(|e| format!("{}: cannot write assessment: {}", file, e))
                });
            match outcome {
                Ok(()) => tally.assessed += 1,
                Err(msg) => {
                    eprintln!("  {}", msg);
                    tally.failed += 1;
                    if !args.continue_on_error {
                        break;
                    }
                }
            }
        }
    }

    if let Err(msg) = session.save() {
        eprintln!("Error: {}", msg);
        return exit_codes::EXECUTION_ERROR;
    }

    if !args.quiet {
        eprintln!(
            "Batch complete: {}/{} succeeded, {} failed in {:.1}s",
            tally.assessed,
            files.len(),
            tally.failed,
            started.elapsed().as_secs_f64()
        );
    }
    tally.exit_code(files.len())
}

/// Read patient files one by one; the flow assesses them in parallel afterwards
async fn load_patients<'a>(
    files: &'a [String],
    args: &BatchArgs,
    tally: &mut Tally,
) -> Vec<(&'a str, PatientData)> {
    let mut patients = Vec::with_capacity(files.len());
    for (i, file) in files.iter().enumerate() {
        if !args.quiet {
            eprintln!("[{}/{}] loading {}", i + 1, files.len(), file);
        }
        match load_patient_file(Path::new(file)).await {
            Ok(patient) => patients.push((file.as_str(), patient)),
            Err(e) => {
                eprintln!("  {}: {}", file, e);
                tally.failed += 1;
                if !args.continue_on_error {
                    break;
                }
            }
        }
    }
    patients
}

fn write_assessment(file: &str, assessment: &PatientAssessment, args: &BatchArgs) -> Result<(), String> {
    match args.output_dir {
        Some(ref dir) => {
            let target = assessment_path(Path::new(dir), file);
            let json = output::to_json(assessment, args.compact)?;
            output::write_output(&json, target.to_str())
        }
        None => {
            let line = BatchLine { file, assessment };
            output::write_output(&output::to_json(&line, true)?, None)
        }
    }
}

/// `{dir}/{stem}_assessment.json` for a patient file
fn assessment_path(dir: &Path, file: &str) -> PathBuf {
    let stem = Path::new(file)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("patient");
    dir.join(format!("{}_assessment.json", stem))
}

fn patient_files(args: &BatchArgs) -> Result<Vec<String>, String> {
    match (&args.glob, &args.files) {
        (Some(pattern), _) => expand_glob(pattern),
        (None, Some(files)) => Ok(files.clone()),
        (None, None) => Err("One of --glob or --files must be specified".to_string()),
    }
}

/// Regular files matching `pattern`, sorted by path
fn expand_glob(pattern: &str) -> Result<Vec<String>, String> {
    let entries =
        glob::glob(pattern).map_err(|e| format!("Invalid glob pattern '{}': {}", pattern, e))?;

    let mut files: Vec<String> = entries
        .filter_map(|entry| match entry {
            Ok(path) => Some(path),
            Err(e) => {
                log::warn!("Skipping unreadable glob entry: {}", e);
                None
            }
        })
        .filter(|path| path.is_file())
        .filter_map(|path| path.to_str().map(str::to_string))
        .collect();
    files.sort();
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expand_glob_sorted_files_only() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("b.json"), "{}").unwrap();
        std::fs::write(dir.path().join("a.json"), "{}").unwrap();
        std::fs::create_dir(dir.path().join("c.json")).unwrap();

        let pattern = format!("{}/*.json", dir.path().display());
        let files = expand_glob(&pattern).unwrap();
        assert_eq!(files.len(), 2);
        assert!(files[0].ends_with("a.json"));
        assert!(files[1].ends_with("b.json"));
    }

    #[test]
    fn test_invalid_glob() {
        assert!(expand_glob("[").is_err());
    }

    #[test]
    fn test_assessment_path_uses_stem() {
        let path = assessment_path(Path::new("/out"), "data/patient_07.json");
        assert_eq!(path, Path::new("/out/patient_07_assessment.json"));
    }

    #[test]
    fn test_tally_exit_codes() {
        let all = Tally { assessed: 3, failed: 0 };
        assert_eq!(all.exit_code(3), exit_codes::SUCCESS);
        let some = Tally { assessed: 1, failed: 2 };
        assert_eq!(some.exit_code(3), exit_codes::PARTIAL_FAILURE);
        let none = Tally { assessed: 0, failed: 1 };
        assert_eq!(none.exit_code(3), exit_codes::EXECUTION_ERROR);
        // Early stop leaves files neither assessed nor failed
        let stopped = Tally { assessed: 0, failed: 0 };
        assert_eq!(stopped.exit_code(2), exit_codes::EXECUTION_ERROR);
    }
}
