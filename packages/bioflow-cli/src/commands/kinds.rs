use bioflow_rs::SignalKind;
use serde::Serialize;

use crate::cli::KindsArgs;
use crate::exit_codes;
use crate::output;

#[derive(Serialize)]
struct KindInfo {
    kind: &'static str,
    organ: &'static str,
    unit: &'static str,
}

pub fn execute(args: KindsArgs) -> i32 {
    let kinds: Vec<KindInfo> = SignalKind::ALL
        .iter()
        .map(|k| KindInfo {
            kind: k.as_str(),
            organ: k.organ(),
            unit: k.unit(),
        })
        .collect();

    if args.json {
        return output::emit(&kinds, false, None);
    }

    println!("{:<12} {:<8} Unit", "Kind", "Organ");
    println!("{}", "-".repeat(50));
    for k in &kinds {
        println!("{:<12} {:<8} {}", k.kind, k.organ, k.unit);
    }
    println!();
    println!("Every packet passes through integration_cortex after its organ.");

    exit_codes::SUCCESS
}
