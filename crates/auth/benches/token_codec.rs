use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use chrono::Utc;
use tenantgate_auth::{
    AccessPolicy, Evaluator, Identity, JwtConfig, Role, Scope, TokenCodec, TokenVerifier,
};
use tenantgate_core::{TenantId, UserId};

fn codec(algorithm: &str) -> TokenCodec {
    let mut config = JwtConfig::new("bench-secret-bench-secret-bench-secret");
    config.algorithm = algorithm.to_string();
    TokenCodec::new(&config).expect("valid bench config")
}

fn identity() -> Identity {
    Identity::new(UserId::new(), TenantId::new(7), "bench@example.com", Role::TenantAdmin)
        .with_email("bench@example.com")
}

fn bench_issue_verify(c: &mut Criterion) {
    let mut group = c.benchmark_group("token_codec");
    let id = identity();

    for algorithm in ["HS256", "HS384", "HS512"] {
        let codec = codec(algorithm);
        let token = codec.issue(&id).expect("issue");
        let now = Utc::now();

        group.bench_with_input(BenchmarkId::new("issue", algorithm), &codec, |b, codec| {
            b.iter(|| codec.issue_at(black_box(&id), now).expect("issue"))
        });
        group.bench_with_input(BenchmarkId::new("verify", algorithm), &codec, |b, codec| {
            b.iter(|| codec.verify_at(black_box(&token), now).expect("verify"))
        });
    }

    group.finish();
}

fn bench_decisions(c: &mut Criterion) {
    let policy = AccessPolicy::new(
        (0..64).map(|i| format!("/svc.Open/Method{i}")),
        (0..64).map(|i| format!("/svc.Public/Method{i}")),
    )
    .expect("disjoint sets");
    let eval = Evaluator::default();
    let id = identity();
    let scope = Scope::AnyOf(vec![
        Scope::User(UserId::new()),
        Scope::AllOf(vec![
            Scope::TenantAdmin(TenantId::new(7)),
            Scope::NoEscalation(Role::Artist),
        ]),
    ]);

    c.bench_function("policy_classify", |b| {
        b.iter(|| policy.classify(black_box("/user.ResonateUser/UpdateUserRestricted")))
    });
    c.bench_function("evaluator_check", |b| {
        b.iter(|| eval.check(black_box(&id), black_box(&scope)))
    });
}

criterion_group!(benches, bench_issue_verify, bench_decisions);
criterion_main!(benches);
