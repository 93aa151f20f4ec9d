use crate::cli::OptimizeArgs;
use crate::engine_state::Session;
use crate::exit_codes;
use crate::output;

pub fn execute(args: OptimizeArgs) -> i32 {
    let session = match Session::open(&args.engine) {
        Ok(s) => s,
        Err(msg) => {
            eprintln!("Error: {}", msg);
            return exit_codes::INPUT_ERROR;
        }
    };

    let (result, report) = {
        let mut engine = session.flow.engine().lock();
        match engine.optimize_computation(args.base, &args.task, !args.no_learn) {
            Ok(result) => {
                let report = args.report.then(|| engine.optimization_report(&result));
                (result, report)
            }
            Err(e) => {
                eprintln!("Error: {}", e);
                return exit_codes::for_error(&e);
            }
        }
    };

    let code = match report {
        Some(markdown) => match output::write_output(markdown.trim_end(), None) {
            Ok(()) => exit_codes::SUCCESS,
            Err(e) => {
                eprintln!("Error: {}", e);
                exit_codes::EXECUTION_ERROR
            }
        },
        None => output::emit(&result, args.compact, None),
    };
    if code != exit_codes::SUCCESS {
        return code;
    }

    if let Err(msg) = session.save() {
        eprintln!("Error: {}", msg);
        return exit_codes::EXECUTION_ERROR;
    }
    exit_codes::SUCCESS
}
