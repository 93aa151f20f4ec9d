use crate::cli::SummaryArgs;
use crate::engine_state::Session;
use crate::exit_codes;
use crate::output;

pub fn execute(args: SummaryArgs) -> i32 {
    let session = match Session::open(&args.engine) {
        Ok(s) => s,
        Err(msg) => {
            eprintln!("Error: {}", msg);
            return exit_codes::INPUT_ERROR;
        }
    };

    let summary = session.flow.engine().lock().learning_summary();

    let Some(summary) = summary else {
        if args.json {
            return output::emit(&serde_json::json!({"status": "learning_disabled"}), false, None);
        }
        println!("Learning is disabled");
        return exit_codes::SUCCESS;
    };

    if args.json {
        return output::emit(&summary, false, None);
    }

    println!(
        "Consciousness: {} ({:.4})",
        summary.current_level, summary.current_score
    );
    println!("Learning iterations: {}", summary.learning_iterations);
    println!("Performance records: {}", summary.total_performance_records);
    println!("Patterns learned: {}", summary.patterns_learned);
    let w = summary.current_adaptation_weights;
    println!(
        "Adaptation weights: consciousness {:.3}, task {:.3}, eeg {:.3}",
        w.consciousness_multiplier, w.task_multiplier, w.eeg_boost
    );
    if let Some(avg) = summary.recent_average_improvement {
        println!("Recent average improvement: {:.3}x", avg);
    }
    if !summary.task_performance.is_empty() {
        println!();
        println!("{:<14} {:>8} {:>8} {:>6}", "Task", "Best", "Average", "Runs");
        println!("{}", "-".repeat(39));
        for (task, perf) in &summary.task_performance {
            println!(
                "{:<14} {:>8.3} {:>8.3} {:>6}",
                task, perf.best_improvement, perf.average_improvement, perf.total_runs
            );
        }
    }

    exit_codes::SUCCESS
}
