//! Benchmarks for `merge_and_rank`'s deduplicate-and-sort hot path (spec
//! §8 "Testing tooling").
//!
//! Run:
//! ```bash
//! cargo bench -p muhasibi-retrieval --bench fusion_bench
//! ```

#![forbid(unsafe_code)]

use std::hint::black_box;

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

use muhasibi_core::config::RetrievalWeights;
use muhasibi_core::models::{Chunk, ChunkKind};
use muhasibi_retrieval::fusion::merge_and_rank;

fn chunk(id: usize) -> Chunk {
    Chunk {
        id: format!("chunk.{id}"),
        entity_id: format!("entity.{}", id % 20),
        kind: ChunkKind::Evidence,
        text_ar: "نص تجريبي للقياس".to_string(),
        source_anchor: "bench".to_string(),
        scriptural_refs: vec![],
    }
}

fn bench_merge_and_rank(c: &mut Criterion) {
    let mut group = c.benchmark_group("merge_and_rank");

    for candidate_pool in [20usize, 200, 2_000] {
        let entity_exact: Vec<Chunk> = (0..candidate_pool / 10).map(chunk).collect();
        let vector_ranked: Vec<Chunk> = (candidate_pool / 10..candidate_pool).map(chunk).collect();
        let graph_expand: Vec<Chunk> = (0..candidate_pool / 20).map(chunk).collect();

        group.throughput(Throughput::Elements(candidate_pool as u64));
        group.bench_with_input(
            BenchmarkId::new("candidates", candidate_pool),
            &candidate_pool,
            |b, _| {
                b.iter(|| {
                    let packets = merge_and_rank(
                        black_box(&entity_exact),
                        black_box(&vector_ranked),
                        black_box(&graph_expand),
                        RetrievalWeights::default(),
                        40,
                    );
                    black_box(&packets);
                });
            },
        );
    }

    group.finish();
}

criterion_group!(fusion, bench_merge_and_rank);
criterion_main!(fusion);
