#![no_main]
use libfuzzer_sys::{fuzz_target, arbitrary::{Arbitrary, Unstructured}};
use partition_sim::{Operation, PlacementPolicy, Simulation};

#[derive(Debug, Arbitrary)]
enum FuzzOp {
    Allocate { job: u8, size: u16, policy: u8 },
    Deallocate { job: u8 },
    Compact,
}

// Replays arbitrary operation sequences and checks the partition after each
fuzz_target!(|input: &[u8]| {
    let mut u = Unstructured::new(input);

    let ops: Vec<FuzzOp> = match u.arbitrary() {
        Ok(ops) => ops,
        Err(_) => return,
    };

    let mut sim = match Simulation::builder().total_memory(65_536).build() {
        Ok(sim) => sim,
        Err(_) => return,
    };

    for op in ops.iter().take(256) {
        let op = match op {
            FuzzOp::Allocate { job, size, policy } => Operation::Allocate {
                job: format!("J{}", job % 32),
                size: u64::from(*size),
                policy: Some(PlacementPolicy::ALL[usize::from(*policy) % 4]),
            },
            FuzzOp::Deallocate { job } => Operation::deallocate(format!("J{}", job % 32)),
            FuzzOp::Compact => Operation::Compact,
        };

        sim.apply(&op);
        assert!(sim.snapshot().verify_partition().is_ok(), "broken after {:?}", op);
        assert!((0.0..=1.0).contains(&sim.fragmentation()));
    }
});
