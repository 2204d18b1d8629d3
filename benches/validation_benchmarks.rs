use std::hint::black_box;

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use lesson_check::core::{Document, Role};
use lesson_check::parser::parse_document;
use lesson_check::validation::{cross_reference, evaluate, LessonIndex};
use lesson_check::SchemaRegistry;

/// Generate an episode with `sections` challenge callouts between the
/// objectives and key points, according to a scenario
fn generate_episode(sections: usize, scenario: &str) -> String {
    let mut content = String::from(
        "---\nlayout: page\ntitle: Benchmark\nsubtitle: Generated\nminutes: 10\n---\n\
         > ## Learning Objectives {.objectives}\n>\n> *   Measure things.\n\n",
    );

    for i in 0..sections {
        match scenario {
            "all_valid" => {
                content.push_str(&format!(
                    "Paragraph {} about the [shell](reference.html#shell).\n\n\
                     ```bash\nls -l dir{}\n```\n\n\
                     > ## Exercise {} {{.challenge}}\n>\n> Try it.\n\n",
                    i, i, i
                ));
            }
            "mixed_errors" => match i % 4 {
                0 => content.push_str(&format!("## Stray heading {}\n\n", i)),
                1 => content.push_str(&format!("> ## Quiz {} {{.quiz}}\n>\n> What?\n\n", i)),
                2 => content.push_str(&format!("See [term {}](reference.html#term-{}).\n\n", i, i)),
                _ => content.push_str(&format!("Broken [link](missing-{}.html).\n\n", i)),
            },
            _ => content.push_str(&format!("Plain paragraph {}.\n\n", i)),
        }
    }

    content.push_str("> ## Key Points {.keypoints}\n>\n> *   Done.\n");
    content
}

/// Benchmark block parsing at different document sizes
fn bench_parsing(c: &mut Criterion) {
    let mut group = c.benchmark_group("parse_document");

    for &size in &[10, 100, 1_000] {
        let content = generate_episode(size, "all_valid");
        group.throughput(Throughput::Bytes(content.len() as u64));
        group.bench_with_input(BenchmarkId::new("sections", size), &content, |b, content| {
            b.iter(|| black_box(parse_document(black_box(content))))
        });
    }

    group.finish();
}

/// Benchmark per-document rule evaluation with different error densities
fn bench_evaluation(c: &mut Criterion) {
    let registry = SchemaRegistry::builtin().expect("built-in rules");
    let schema = registry.schema_for(Role::Episode).expect("episode schema");

    let mut group = c.benchmark_group("evaluate");

    for scenario in ["all_valid", "mixed_errors", "plain"] {
        let content = generate_episode(500, scenario);
        let document = Document::load("01-bench.md", Role::Episode, &content).expect("parse");

        group.throughput(Throughput::Elements(document.blocks.len() as u64));
        group.bench_with_input(
            BenchmarkId::new("scenario", scenario),
            &document,
            |b, document| b.iter(|| black_box(evaluate(black_box(document), schema))),
        );
    }

    group.finish();
}

/// Benchmark the cross-document pass over a growing lesson
fn bench_cross_reference(c: &mut Criterion) {
    let reference = Document::load(
        "reference.md",
        Role::Reference,
        "## Glossary\n\nShell\n:   Runs programs.\n",
    )
    .expect("parse");

    let mut group = c.benchmark_group("cross_reference");

    for &episodes in &[1, 10, 50] {
        let mut documents = vec![reference.clone()];
        for i in 0..episodes {
            let path = format!("{:02}-episode.md", i + 1);
            let content = generate_episode(50, "mixed_errors");
            documents.push(Document::load(path, Role::Episode, &content).expect("parse"));
        }
        let files: Vec<_> = documents.iter().map(|d| d.path.clone()).collect();
        let index = LessonIndex::new(&documents, &files, "reference");

        group.bench_with_input(
            BenchmarkId::new("episodes", episodes),
            &documents,
            |b, documents| b.iter(|| black_box(cross_reference(black_box(documents), &index))),
        );
    }

    group.finish();
}

criterion_group!(benches, bench_parsing, bench_evaluation, bench_cross_reference);
criterion_main!(benches);
