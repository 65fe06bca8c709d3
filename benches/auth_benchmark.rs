use chirpy::services::access_token;
use chirpy::services::{ContentModerator, PasswordVault};
use criterion::{criterion_group, criterion_main, Criterion};
use std::hint::black_box;
use std::time::Duration;
use uuid::Uuid;

fn benchmark_passwords(c: &mut Criterion) {
    let vault = PasswordVault::new();
    let hash = vault.hash("correct horse battery staple").expect("Failed to hash");

    let mut group = c.benchmark_group("password_vault");
    group.sample_size(10);

    group.bench_function("hash", |b| {
        b.iter(|| vault.hash(black_box("correct horse battery staple")))
    });

    group.bench_function("verify_match", |b| {
        b.iter(|| vault.verify(black_box("correct horse battery staple"), black_box(&hash)))
    });

    group.finish();
}

fn benchmark_access_tokens(c: &mut Criterion) {
    let secret = b"bench_signing_key_32_bytes_long!";
    let subject = Uuid::new_v4();
    let token = access_token::issue(subject, secret, Duration::from_secs(3600))
        .expect("Failed to issue token");

    let mut group = c.benchmark_group("access_token");

    group.bench_function("issue", |b| {
        b.iter(|| access_token::issue(black_box(subject), secret, Duration::from_secs(3600)))
    });

    group.bench_function("verify", |b| {
        b.iter(|| access_token::verify(black_box(&token), secret))
    });

    group.finish();
}

fn benchmark_moderation(c: &mut Criterion) {
    let moderator = ContentModerator::default();
    let clean = "I really need to share this opinion about the weather with everyone today";
    let dirty = "What a Kerfuffle, that sharbert was pure fornax and a total kerfuffle";

    let mut group = c.benchmark_group("content_moderator");

    group.bench_function("clean_body", |b| {
        b.iter(|| moderator.moderate(black_box(clean)))
    });

    group.bench_function("denylisted_body", |b| {
        b.iter(|| moderator.moderate(black_box(dirty)))
    });

    group.finish();
}

criterion_group!(
    benches,
    benchmark_passwords,
    benchmark_access_tokens,
    benchmark_moderation
);
criterion_main!(benches);
