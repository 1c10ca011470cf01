//! Device Report Example
//!
//! Prints the device identifier, the resolved model, and every source the
//! model resolution looked at.
//!
//! Run with: cargo run --example `device_report`
//! Set `RUST_LOG=device_identity=debug` to see the resolver's decisions.

use device_identity::model::ModelResolver;
use device_identity::{has_registry, query_system_property, DeviceIdentity};
use tracing_subscriber::EnvFilter;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    println!("╔════════════════════════════════════════════════════════════╗");
    println!("║          DEVICE IDENTITY - Report                          ║");
    println!("╚════════════════════════════════════════════════════════════╝");
    println!();
    println!("Library Version: {}", device_identity::VERSION);
    println!("Hardware registry compiled in: {}", if has_registry() { "yes" } else { "no" });
    println!();

    match DeviceIdentity::probe() {
        Ok(identity) => {
            println!("Device ID:    {}", identity.id);
            println!("Device Model: {}", identity.model);
        }
        Err(e) => {
            println!("Device ID:    unavailable ({e})");
            println!("Device Model: {}", device_identity::device_model());
        }
    }
    println!();

    let resolver = ModelResolver::new();
    println!("┌─────────────────────────────────────────────────────────────┐");
    println!("│ Model sources                                               │");
    println!("├─────────────────────────────────────────────────────────────┤");
    for candidate in [resolver.main_candidate(), resolver.fallback_candidate()] {
        println!(
            "│ {:<10} {:<48} │",
            candidate.source.to_string(),
            candidate.value.as_deref().unwrap_or("(absent)")
        );
    }
    println!("└─────────────────────────────────────────────────────────────┘");
    println!();

    println!("┌─────────────────────────────────────────────────────────────┐");
    println!("│ System properties                                           │");
    println!("├─────────────────────────────────────────────────────────────┤");
    for key in ["hw.machine", "hw.model", "kern.ostype", "kern.osrelease"] {
        println!(
            "│ {:<16} {:<42} │",
            key,
            query_system_property(key).as_deref().unwrap_or("(absent)")
        );
    }
    println!("└─────────────────────────────────────────────────────────────┘");
}
