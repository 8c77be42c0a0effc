// Demonstration of external fragmentation and how compaction resolves it
//
// Run with `RUST_LOG=debug cargo run --example fragmentation` to see the
// engine's own tracing output.

use partition_sim::{Operation, PlacementPolicy, Preset, Simulation};

fn print_layout(sim: &Simulation) {
    for seg in sim.snapshot().segments() {
        let label = match seg.job() {
            Some(job) => format!("job {}", job),
            None => "free".to_string(),
        };
        println!(
            "  [{:>6}, {:>6})  {:>6}  {}",
            seg.start,
            seg.end(),
            seg.length,
            label
        );
    }
    let stats = sim.stats();
    println!(
        "  free {} in {} blocks, largest {}, fragmentation {:.1}%\n",
        stats.total_free,
        stats.free_segment_count,
        stats.largest_free_block,
        stats.fragmentation * 100.0
    );
}

fn main() -> partition_sim::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .init();

    let mut sim = Simulation::builder()
        .total_memory(100_000)
        .policy(PlacementPolicy::FirstFit)
        .build()?;

    println!("=== Partition Fragmentation Demo ===\n");

    // Replay up to the compaction step
    let preset = Preset::fragmentation_demo();
    let upto = preset
        .operations
        .iter()
        .position(|op| *op == Operation::Compact)
        .unwrap_or(preset.operations.len());

    println!("{}: {}\n", preset.name, preset.description);
    for (op, outcome) in preset.operations.iter().zip(sim.run(&preset.operations[..upto])) {
        let status = if outcome.ok { "ok " } else { "ERR" };
        println!("{} {:?}: {}", status, op, outcome.message);
    }

    println!("\nLayout before compaction:");
    print_layout(&sim);

    let compaction = sim.compact();
    println!("{}", compaction.message);
    println!("\nLayout after compaction:");
    print_layout(&sim);

    let big = sim.allocate("BIG", 15000)?;
    println!("{} at address {}", big.message, big.segment.start);

    Ok(())
}
