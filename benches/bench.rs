// Criterion benchmarks for SkillSwap Algo

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use skillswap_algo::core::{score_personality, score_skill_overlap, MatchEngine};
use skillswap_algo::models::{
    DailyRhythm, PersonalityType, Proficiency, SkillEntry, User,
};
use skillswap_algo::services::{MemoryStore, ProfileAnalysisService};
use std::sync::Arc;

const SKILL_POOL: &[&str] = &[
    "rust", "go", "python", "spanish", "french", "guitar", "piano", "chess",
    "cooking", "photography", "pottery", "juggling", "climbing", "yoga",
];

fn skill(name: &str) -> SkillEntry {
    SkillEntry::new(name, None, Proficiency::Intermediate)
}

fn candidate(id: usize) -> User {
    let teach = SKILL_POOL[id % SKILL_POOL.len()];
    let learn = SKILL_POOL[(id + 5) % SKILL_POOL.len()];
    User {
        user_id: format!("user-{}", id),
        name: format!("User {}", id),
        bio: format!("Profile {}", id),
        teach_skills: vec![skill(teach), skill(SKILL_POOL[(id + 1) % SKILL_POOL.len()])],
        learn_skills: vec![skill(learn)],
        personality_type: Some(if id % 2 == 0 {
            PersonalityType::Introvert
        } else {
            PersonalityType::Extrovert
        }),
        daily_rhythm: Some(if id % 3 == 0 {
            DailyRhythm::EarlyBird
        } else {
            DailyRhythm::NightOwl
        }),
        created_at: None,
    }
}

fn bench_skill_overlap(c: &mut Criterion) {
    let teach: Vec<SkillEntry> = SKILL_POOL.iter().map(|n| skill(n)).collect();
    let learn: Vec<SkillEntry> = SKILL_POOL.iter().rev().map(|n| skill(n)).collect();

    c.bench_function("skill_overlap", |b| {
        b.iter(|| score_skill_overlap(black_box(&teach), black_box(&learn)));
    });
}

fn bench_personality(c: &mut Criterion) {
    let a = candidate(0);
    let b_user = candidate(1);

    c.bench_function("personality_score", |b| {
        b.iter(|| score_personality(black_box(&a), black_box(&b_user)));
    });
}

fn bench_find_matches(c: &mut Criterion) {
    let runtime = tokio::runtime::Runtime::new().expect("tokio runtime");

    let mut group = c.benchmark_group("find_matches");

    for candidate_count in [10usize, 50, 100, 500].iter() {
        let store = Arc::new(MemoryStore::new());
        store.add_user(candidate(0));
        for i in 1..=*candidate_count {
            store.add_user(candidate(i));
        }
        let engine = MatchEngine::new(store, Arc::new(ProfileAnalysisService::disabled()));

        group.bench_with_input(
            BenchmarkId::from_parameter(candidate_count),
            candidate_count,
            |b, _| {
                b.iter(|| {
                    runtime
                        .block_on(engine.find_matches("user-0", 20, None, false))
                        .expect("matching should succeed")
                });
            },
        );
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_skill_overlap,
    bench_personality,
    bench_find_matches
);
criterion_main!(benches);
