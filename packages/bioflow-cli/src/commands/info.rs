use bioflow_rs::{ConsciousnessProfile, FileType};
use serde::Serialize;

use crate::cli::InfoArgs;
use crate::engine_state::{resolve_state_path, Session};
use crate::exit_codes;
use crate::output;

#[derive(Serialize)]
struct InfoOutput {
    cli_version: String,
    platform: String,
    arch: String,
    config_path: Option<String>,
    state_path: Option<String>,
    state_exists: bool,
    supported_extensions: Vec<&'static str>,
    learning_iterations: u64,
    profile: ConsciousnessProfile,
}

pub fn execute(args: InfoArgs) -> i32 {
    let state_path = resolve_state_path(&args.engine);
    let session = match Session::open(&args.engine) {
        Ok(s) => s,
        Err(msg) => {
            eprintln!("Error: {}", msg);
            return exit_codes::INPUT_ERROR;
        }
    };

    let (profile, learning_iterations) = {
        let engine = session.flow.engine().lock();
        (engine.profile().clone(), engine.learning_iterations())
    };

    let info = InfoOutput {
        cli_version: env!("CARGO_PKG_VERSION").to_string(),
        platform: std::env::consts::OS.to_string(),
        arch: std::env::consts::ARCH.to_string(),
        config_path: args.engine.config.as_ref().map(|p| p.display().to_string()),
        state_exists: state_path.as_ref().is_some_and(|p| p.exists()),
        state_path: state_path.map(|p| p.display().to_string()),
        supported_extensions: FileType::supported_extensions().to_vec(),
        learning_iterations,
        profile,
    };

    if args.json {
        return output::emit(&info, false, None);
    }

    println!("bioflow CLI v{}", info.cli_version);
    println!("Platform: {} ({})", info.platform, info.arch);
    println!();
    println!(
        "Config: {}",
        info.config_path.as_deref().unwrap_or("built-in defaults")
    );
    match info.state_path {
        Some(ref path) if info.state_exists => println!("Engine state: {}", path),
        Some(ref path) => println!("Engine state: {} (not created yet)", path),
        None => println!("Engine state: disabled"),
    }
    println!();
    let p = &info.profile;
    println!("Consciousness level: {} ({:.4})", p.level, p.composite_score);
    println!(
        "  coherence {:.4}, complexity {:.4}, integration {:.4}, alpha dominance {:.4}",
        p.coherence, p.complexity, p.integration, p.alpha_dominance
    );
    println!("Learning iterations: {}", info.learning_iterations);

    exit_codes::SUCCESS
}
