//! End-to-end inversion behaviour with mocked collaborators


use antiprompt_core::{Complexity, EscalationMode, InversionRequest, SystemPromptChoice};
use antiprompt_engine::{template, Inverter, PromptAssembler};
use antiprompt_lexicon::{
    build_cascade, AntonymCascade, AntonymOverrides, ConceptExpander, LexicalDatabase,
    LexiconConfig, LexiconStore, LexiconTagger, MaskFiller, PartOfSpeech, PhraseMap,
    PhraseRewriter, StrengthMap, WordTokenizer,
};
use mock_capabilities::{
    FailingGraph, MockGraph, MockMaskFiller, MockSentiment, ScriptedTagger,
};
use std::sync::Arc;

fn builtin_database() -> Arc<dyn LexicalDatabase> {
    Arc::new(LexiconStore::builtin().unwrap())
}

fn builtin_rewriter() -> PhraseRewriter {
    PhraseRewriter::new(
        Arc::new(PhraseMap::builtin().unwrap()),
        WordTokenizer::new().unwrap(),
    )
}

fn cascade_with(
    database: Arc<dyn LexicalDatabase>,
    filler: Option<Arc<dyn MaskFiller>>,
) -> AntonymCascade {
    let tagger = Arc::new(LexiconTagger::new(database.clone()));
    build_cascade(&LexiconConfig::default(), database, filler, tagger).unwrap()
}

fn words(xs: &[&str]) -> Vec<String> {
    xs.iter().map(|s| s.to_string()).collect()
}

// ============================================================================
// Cascade
// ============================================================================

#[tokio::test]
async fn test_unknown_word_probes_model_once() {
    let filler = Arc::new(MockMaskFiller::new().with_default_answer(&["xyzzy", "a", "it", "42"]));
    let empty: Arc<dyn LexicalDatabase> = Arc::new(LexiconStore::default());
    let cascade = cascade_with(empty, Some(filler.clone() as Arc<dyn MaskFiller>));

    let result = cascade.resolve("xyzzy").await;

    assert_eq!(result.output, "xyzzy");
    assert!(!result.is_resolved());
    assert_eq!(filler.call_count(), 1);
}

#[tokio::test]
async fn test_model_resolves_what_the_lexicon_cannot() {
    let filler = Arc::new(MockMaskFiller::new().with_answer("gloomy", &["gloomy", "cheerful"]));
    let cascade = cascade_with(builtin_database(), Some(filler.clone() as Arc<dyn MaskFiller>));

    let result = cascade.resolve("gloomy").await;

    assert_eq!(result.output, "cheerful");
    assert_eq!(result.resolved_by.as_deref(), Some("masked_model"));
}

#[tokio::test]
async fn test_lexicon_hit_skips_model() {
    let filler = Arc::new(MockMaskFiller::new().with_default_answer(&["wrong"]));
    let cascade = cascade_with(builtin_database(), Some(filler.clone() as Arc<dyn MaskFiller>));

    assert_eq!(cascade.resolve("blurry").await.output, "sharp");
    assert_eq!(filler.call_count(), 0);
}

#[tokio::test]
async fn test_model_failure_degrades_to_unresolved() {
    let filler = Arc::new(MockMaskFiller::new().failing());
    let cascade = cascade_with(builtin_database(), Some(filler.clone() as Arc<dyn MaskFiller>));

    let result = cascade.resolve("xyzzytag").await;
    assert!(!result.is_resolved());
    assert_eq!(filler.call_count(), 1);
}

#[tokio::test]
async fn test_override_beats_lexicon() {
    let overrides: AntonymOverrides = [("bad", "wonderful")].into_iter().collect();
    let cascade = cascade_with(builtin_database(), None).with_overrides(Arc::new(overrides));

    let result = cascade.resolve("bad").await;
    assert_eq!(result.output, "wonderful");
    assert_eq!(result.resolved_by.as_deref(), Some("custom"));
}

#[tokio::test]
async fn test_multi_word_replaces_only_modifier() {
    let tagger = Arc::new(ScriptedTagger::new(&[
        ("bad", PartOfSpeech::Adjective),
        ("anatomy", PartOfSpeech::Noun),
    ]));
    // "anatomy" has a fallback antonym, so leaving it alone proves the noun rule
    let cascade = build_cascade(&LexiconConfig::default(), builtin_database(), None, tagger).unwrap();

    let result = cascade.resolve_multi(&words(&["bad", "anatomy"])).await;
    assert_eq!(result.output, "good anatomy");
}

#[tokio::test]
async fn test_multi_word_tries_next_modifier() {
    let tagger = Arc::new(ScriptedTagger::new(&[
        ("xyzzy", PartOfSpeech::Adjective),
        ("dark", PartOfSpeech::Adjective),
    ]));
    let cascade = build_cascade(&LexiconConfig::default(), builtin_database(), None, tagger).unwrap();

    let result = cascade.resolve_multi(&words(&["xyzzy", "dark", "room"])).await;
    assert_eq!(result.output, "xyzzy light room");
}

// ============================================================================
// Phrase rewriter
// ============================================================================

#[test]
fn test_rewriter_leaves_plain_text_alone() {
    let rewrite = builtin_rewriter().replace_phrases("a cat, on a mat");
    assert_eq!(rewrite.text, "a cat, on a mat");
    assert!(rewrite.handled.is_empty());
}

#[test]
fn test_rewriter_prefers_longest_idiom() {
    let rewriter = PhraseRewriter::new(
        Arc::new(PhraseMap::from_pairs([
            ("low quality", "high quality"),
            ("low", "high"),
        ])),
        WordTokenizer::new().unwrap(),
    );

    let rewrite = rewriter.replace_phrases("low quality, low resolution");
    assert!(rewrite.handled.contains("low quality"));
    assert_eq!(
        rewrite.replacements.get("low quality").map(String::as_str),
        Some("high quality")
    );
    assert!(rewrite.text.starts_with("high quality"));
}

// ============================================================================
// Assembly and escalation
// ============================================================================

#[tokio::test]
async fn test_basic_tier_dedups() {
    let assembler = PromptAssembler::new(None);
    let prompt = assembler
        .assemble(Complexity::Basic, "a cat", &words(&["sharp", "sharp", "clean"]))
        .await;
    assert_eq!(prompt, "a cat, sharp, clean");
}

#[tokio::test]
async fn test_fallback_payload_for_unresolved_tag() {
    let inverter = Inverter::from_config(&LexiconConfig::default(), None).unwrap();
    let request = InversionRequest::new("a cat", "xyzzytag")
        .with_llm_fallback(true)
        .with_system_prompt(SystemPromptChoice::Prompt1);

    let output = inverter.run(&request).await.unwrap();

    assert_eq!(output.escalation, Some(EscalationMode::Fallback));
    assert!(output.llm_input.starts_with(template(SystemPromptChoice::Prompt1)));
    assert!(output.llm_input.ends_with("xyzzytag"));
    assert_eq!(output.modified_prompt, "a cat, ");
}

#[tokio::test]
async fn test_full_escalation_carries_whole_prompt() {
    let inverter = Inverter::from_config(&LexiconConfig::default(), None).unwrap();
    let request = InversionRequest::new("a cat", "low quality, ugly")
        .with_llm_full(true)
        .with_custom_system_prompt("Rewrite positively:");

    let output = inverter.run(&request).await.unwrap();

    assert_eq!(output.escalation, Some(EscalationMode::Full));
    assert_eq!(output.llm_input, "Rewrite positively:\n\nlow quality, ugly");
}

#[tokio::test]
async fn test_no_escalation_when_everything_resolves() {
    let inverter = Inverter::from_config(&LexiconConfig::default(), None).unwrap();
    let request = InversionRequest::new("a cat", "ugly, blurry").with_llm_fallback(true);

    let output = inverter.run(&request).await.unwrap();

    assert_eq!(output.escalation, None);
    assert_eq!(output.llm_input, "");
    assert_eq!(output.modified_prompt, "a cat, beautiful, sharp");
}

// ============================================================================
// End to end
// ============================================================================

#[tokio::test]
async fn test_portrait_scenario() {
    let inverter = Inverter::from_config(&LexiconConfig::default(), None).unwrap();
    let request = InversionRequest::new("a portrait", "low quality, bad lighting, ugly")
        .with_strength(0.5)
        .with_complexity(Complexity::Basic);

    let (prompt, escalation) = inverter.run(&request).await.unwrap().into_pair();

    assert_eq!(prompt, "a portrait, beautiful");
    assert_eq!(escalation, "");
}

#[tokio::test]
async fn test_advanced_tier_uses_model_expansion() {
    let filler: Arc<dyn MaskFiller> = Arc::new(
        MockMaskFiller::new()
            .with_answer("beautiful", &["ugly", "a"])
            .with_answer("sharp", &["blurry", "dull"]),
    );
    let inverter = Inverter::builder(builtin_rewriter(), cascade_with(builtin_database(), None))
        .assembler(PromptAssembler::new(Some(filler)))
        .build();

    let request = InversionRequest::new("a cat", "ugly, blurry").with_complexity(Complexity::Advanced);
    let output = inverter.run(&request).await.unwrap();

    assert_eq!(output.modified_prompt, "a cat, beautiful, ugly, sharp, blurry, dull");
}

#[tokio::test]
async fn test_expert_tier_keeps_short_tokens() {
    let filler: Arc<dyn MaskFiller> =
        Arc::new(MockMaskFiller::new().with_default_answer(&["a", "a"]));
    let inverter = Inverter::builder(builtin_rewriter(), cascade_with(builtin_database(), None))
        .assembler(PromptAssembler::new(Some(filler)))
        .build();

    let request = InversionRequest::new("a cat", "ugly").with_complexity(Complexity::Expert);
    let output = inverter.run(&request).await.unwrap();

    assert_eq!(output.modified_prompt, "a cat, beautiful, a, a");
}

#[tokio::test]
async fn test_concept_expansion_adds_related_terms() {
    let graph = Arc::new(MockGraph::new().with_related("sharp", &["crisp", "sharp", "keen", "acute"]));
    let inverter = Inverter::builder(builtin_rewriter(), cascade_with(builtin_database(), None))
        .expander(ConceptExpander::new(graph.clone(), 3))
        .build();

    let request = InversionRequest::new("a cat", "blurry").with_conceptnet(true);
    let output = inverter.run(&request).await.unwrap();

    assert_eq!(output.modified_prompt, "a cat, sharp, crisp, keen");
    assert_eq!(graph.call_count(), 1);
}

#[tokio::test]
async fn test_concept_expansion_survives_graph_failure() {
    let graph = Arc::new(FailingGraph::new());
    let expander = ConceptExpander::new(graph.clone(), 3);
    assert_eq!(expander.expand(&words(&["sharp"])).await, vec!["sharp"]);

    let inverter = Inverter::builder(builtin_rewriter(), cascade_with(builtin_database(), None))
        .expander(ConceptExpander::new(graph.clone(), 3))
        .build();
    let request = InversionRequest::new("a cat", "blurry").with_conceptnet(true);

    let output = inverter.run(&request).await.unwrap();
    assert_eq!(output.modified_prompt, "a cat, sharp");
    assert_eq!(graph.call_count(), 2);
}

#[tokio::test]
async fn test_expansion_not_requested_skips_graph() {
    let graph = Arc::new(MockGraph::new());
    let inverter = Inverter::builder(builtin_rewriter(), cascade_with(builtin_database(), None))
        .expander(ConceptExpander::new(graph.clone(), 3))
        .build();

    inverter
        .run(&InversionRequest::new("a cat", "blurry"))
        .await
        .unwrap();
    assert_eq!(graph.call_count(), 0);
}

#[tokio::test]
async fn test_sentiment_failure_is_neutral() {
    let inverter = Inverter::builder(builtin_rewriter(), cascade_with(builtin_database(), None))
        .sentiment(Arc::new(MockSentiment::failing()))
        .build();

    let output = inverter
        .run(&InversionRequest::new("a cat", "ugly").with_strength(1.0))
        .await
        .unwrap();

    assert_eq!(output.sentiment, 0.0);
    assert_eq!(output.antonym_strength, 0.0);
    assert_eq!(output.modified_prompt, "a cat, beautiful");
}

#[tokio::test]
async fn test_antonym_strength_is_scaled_polarity() {
    let inverter = Inverter::builder(builtin_rewriter(), cascade_with(builtin_database(), None))
        .sentiment(Arc::new(MockSentiment::fixed(-0.8)))
        .strength(Arc::new(StrengthMap::from_entries([("ugly", 0.9)])))
        .build();

    let output = inverter
        .run(&InversionRequest::new("a cat", "ugly").with_strength(0.5))
        .await
        .unwrap();

    assert!((output.antonym_strength - 0.4).abs() < 1e-6);
    assert_eq!(output.intensities.len(), 1);
    assert_eq!(output.intensities[0].weight, 0.9);
}

#[tokio::test]
async fn test_concurrent_runs_keep_overrides_separate() {
    let inverter = Arc::new(Inverter::from_config(&LexiconConfig::default(), None).unwrap());

    let handles: Vec<_> = ["stunning", "gorgeous", "lovely"]
        .into_iter()
        .map(|antonym| {
            let inverter = inverter.clone();
            tokio::spawn(async move {
                let request = InversionRequest::new("a cat", "ugly")
                    .with_custom_antonyms(format!("ugly:{antonym}"));
                let output = inverter.run(&request).await.unwrap();
                (antonym, output.modified_prompt)
            })
        })
        .collect();

    for handle in handles {
        let (antonym, prompt) = handle.await.unwrap();
        assert_eq!(prompt, format!("a cat, {antonym}"));
    }
}
