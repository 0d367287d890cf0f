use criterion::{black_box, criterion_group, criterion_main, Criterion};
use replyguy::prompt::{self, Mode, PromptContext};
use replyguy::providers::ScriptedProvider;
use replyguy::reply::format_reply;
use replyguy::{Persona, ReplyEngine};
use std::sync::Arc;

fn persona() -> Persona {
    let mut persona = Persona::new("Rook", "rook_bot", "primary");
    persona.bio = (0..20).map(|i| format!("bio line {i}")).collect();
    persona.lore = (0..20).map(|i| format!("lore line {i}")).collect();
    persona.post_directions = (0..10).map(|i| format!("direction {i}")).collect();
    persona.knowledge = vec!["The Sicilian is sharp.".into()];
    persona.posting_behavior.remove_periods = true;
    persona.posting_behavior.only_keep_first_sentence = true;
    persona
}

fn bench_prompt_rendering(c: &mut Criterion) {
    let persona = persona();
    let context = PromptContext::for_persona(&persona).with_original_post("what opening should I learn first?");

    c.bench_function("select_and_render_long_reply", |b| {
        b.iter(|| prompt::select_and_render(black_box(&context), Mode::Reply, 35));
    });
    c.bench_function("render_chat_mode", |b| {
        b.iter(|| prompt::select_and_render(black_box(&context), Mode::Chat, 35));
    });
}

fn bench_formatting(c: &mut Criterion) {
    let persona = persona();
    let reply = "Sure. Play e4.\\nThen pray.\\nThen resign.".repeat(4);

    c.bench_function("format_reply", |b| {
        b.iter(|| format_reply(black_box(&reply), &persona));
    });
}

fn bench_reply_pipeline(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();
    let persona = persona();

    c.bench_function("generate_reply_with_one_retry", |b| {
        b.to_async(&rt).iter(|| async {
            let provider = Arc::new(
                ScriptedProvider::new()
                    .with_replies(["first draft.", "second draft."])
                    .with_verdicts(["YES", "NO"]),
            );
            let engine = ReplyEngine::new(provider);
            engine
                .generate_reply(black_box("gm"), &persona, false, None)
                .await
                .unwrap()
        });
    });
}

criterion_group!(benches, bench_prompt_rendering, bench_formatting, bench_reply_pipeline);
criterion_main!(benches);
