use std::path::Path;

use bioflow_rs::load_patient_file;

use crate::cli::RunArgs;
use crate::engine_state::Session;
use crate::exit_codes;
use crate::output;

pub async fn execute(args: RunArgs) -> i32 {
    let patient = match load_patient_file(Path::new(&args.file)).await {
        Ok(p) => p,
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

    if !args.quiet {
        let kinds: Vec<String> = patient
            .signals()
            .iter()
            .map(|(kind, _)| kind.to_string())
            .collect();
        eprintln!("Assessing {}...", args.file);
        eprintln!("  Signals: {}", kinds.join(", "));
    }

    let assessment = match session.flow.process_patient_complete(&patient) {
        Ok(a) => a,
        Err(e) => {
            eprintln!("Assessment failed: {}", e);
            return exit_codes::for_error(&e);
        }
    };

    let code = output::emit(&assessment, args.compact, args.output.as_deref());
    if code != exit_codes::SUCCESS {
        return code;
    }
    if !args.quiet {
        if let Some(ref path) = args.output {
            eprintln!("Assessment written to {}", path);
        }
    }

    if let Err(msg) = session.save() {
        eprintln!("Error: {}", msg);
        return exit_codes::EXECUTION_ERROR;
    }
    exit_codes::SUCCESS
}
