#![no_main]
use blockdelta::delta::{DeltaBuilder, Op, SignatureBuilder};
use blockdelta::hash::config::MatchStrategy;
use libfuzzer_sys::fuzz_target;
use std::num::NonZeroUsize;

fuzz_target!(|data: &[u8]| {
    if data.len() < 2 {
        return;
    }

    // First byte picks the block size, the rest splits into old and new.
    let Some(block_size) = NonZeroUsize::new(data[0] as usize % 32 + 1) else {
        return;
    };
    let payload = &data[1..];
    let split = payload.len() / 2;
    let (old, new) = payload.split_at(split);

    let sig = SignatureBuilder::new(block_size).build(old).unwrap();
    let scan = DeltaBuilder::new(&sig)
        .strategy(MatchStrategy::Scan)
        .build(new)
        .unwrap();
    let indexed = DeltaBuilder::new(&sig)
        .strategy(MatchStrategy::Indexed)
        .build(new)
        .unwrap();
    assert_eq!(scan, indexed);

    let matched = indexed.blocks.iter().filter(|b| b.is_match()).count();
    assert!(matched <= sig.len());
    for block in &indexed.blocks {
        if block.op == Op::Moved {
            assert!(block.to_end <= new.len());
        }
    }
});
