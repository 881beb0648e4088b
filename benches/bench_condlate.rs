#![allow(
    clippy::string_slice,
    clippy::tests_outside_test_module,
    clippy::unwrap_used,
    clippy::indexing_slicing,
    reason = "benchmark"
)]

use std::hint::black_box;

use condlate::{CondlateEngine, CondlateInterface, Context, VariableTy, tokenize};
use criterion::{Criterion, criterion_group, criterion_main};
use serde_json::Value;

mod utils;

fn condlate_benchmark(c: &mut Criterion) {
    // Create the Condlate engine
    let mut engine = CondlateEngine::new();

    // Load the template from file
    let template_content = include_str!("template_condlate.tmpl");

    // Add template to engine
    engine.add_template("profile", template_content).unwrap();

    // Generate 100 random contexts
    let json_contexts = utils::generate_random_contexts(100);

    // Convert JSON contexts to Condlate contexts
    let contexts: Vec<Context> = json_contexts.iter().map(create_condlate_context).collect();

    // Print binary size information
    utils::print_binary_size();

    // Setup benchmark group
    let mut group = c.benchmark_group("Template Rendering");
    group.sample_size(50);

    // Benchmark template rendering
    group.bench_function("condlate_render", |b| {
        b.iter(|| {
            for context in &contexts {
                black_box(engine.render("profile", Some(context)).unwrap());
            }
        });
    });

    // Lexing alone, to separate it from branch resolution
    group.bench_function("condlate_tokenize", |b| {
        b.iter(|| black_box(tokenize(black_box(template_content), "profile")));
    });

    group.finish();
}

// Convert JSON data to a flat Condlate context
fn create_condlate_context(json: &Value) -> Context<'static> {
    let mut context = Context::new();

    let user_name = json["user"]["name"].as_str().unwrap().to_owned();
    let user_age = json["user"]["age"].as_i64().unwrap();
    let user_active = json["user"]["active"].as_bool().unwrap();

    context.insert("user.name", VariableTy::String.with_data(user_name));
    context.insert("user.age", user_age.into());
    context.insert("user.active", user_active.into());

    context.insert("item_count", json["item_count"].as_i64().unwrap().into());
    context.insert(
        "special_count",
        json["special_count"].as_i64().unwrap().into(),
    );
    context.insert("show_details", json["show_details"].as_bool().unwrap().into());
    context.insert("has_access", json["has_access"].as_bool().unwrap().into());

    context
}

criterion_group!(benches, condlate_benchmark);
criterion_main!(benches);
