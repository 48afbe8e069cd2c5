//! Single-pass inversion of a negative prompt
//!
//! Order of work for one request:
//! 1. Parse the custom overrides (the only user-facing failure)
//! 2. Substitute known idioms
//! 3. Split the rewritten text into tags
//! 4. Cascade every tag the rewriter did not already handle
//! 5. Optionally enrich the antonyms from the knowledge graph
//! 6. Score the sentiment of the original prompt (informational)
//! 7. Assemble the positive prompt for the requested tier
//! 8. Build the escalation payload when requested

use crate::assembler::PromptAssembler;
use crate::escalation::{escalation_mode, escalation_payload};
use antiprompt_core::{
    InversionOutput, InversionRequest, ResolutionState, Result, Tag, TagIntensity,
};
use antiprompt_lexicon::{
    build_cascade, AntonymCascade, AntonymOverrides, ConceptExpander, ConceptNetClient,
    LexicalDatabase, LexiconConfig, LexiconSentimentScorer, LexiconTagger, MaskFiller,
    PhraseRewriter, SentimentScorer, StrengthMap, WordTokenizer,
};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Drives one inversion per call; shares its read-only tables across calls
pub struct Inverter {
    rewriter: PhraseRewriter,
    cascade: AntonymCascade,
    strength: Arc<StrengthMap>,
    sentiment: Arc<dyn SentimentScorer>,
    expander: Option<ConceptExpander>,
    assembler: PromptAssembler,
}

impl Inverter {
    pub fn builder(rewriter: PhraseRewriter, cascade: AntonymCascade) -> InverterBuilder {
        InverterBuilder::new(rewriter, cascade)
    }

    /// Wire every component from configuration.
    ///
    /// Data tables come from the configured files or the built-in ones; the
    /// masked model is optional and only feeds the cascade and the
    /// expanding tiers.
    pub fn from_config(config: &LexiconConfig, filler: Option<Arc<dyn MaskFiller>>) -> Result<Self> {
        config.validate()?;

        let database: Arc<dyn LexicalDatabase> = Arc::new(config.load_lexicon()?);
        let tagger = Arc::new(LexiconTagger::new(database.clone()));
        let cascade = build_cascade(config, database, filler.clone(), tagger)?;

        let rewriter = PhraseRewriter::new(Arc::new(config.load_phrases()?), WordTokenizer::new()?)
            .with_max_words(config.max_phrase_words);

        let strength = config.load_strength()?;
        if !strength.redefined().is_empty() {
            debug!("Strength entries with several definitions: {:?}", strength.redefined());
        }

        let graph = Arc::new(ConceptNetClient::new(&config.conceptnet)?);

        let inverter = Self::builder(rewriter, cascade)
            .strength(Arc::new(strength))
            .sentiment(Arc::new(LexiconSentimentScorer::new()?))
            .expander(ConceptExpander::new(graph, config.conceptnet.max_related))
            .assembler(PromptAssembler::new(filler).with_expand_top_n(config.mask.expand_top_n))
            .build();

        info!(
            "Inverter ready: {} phrases, {} strength entries",
            inverter.rewriter.phrase_map().len(),
            inverter.strength.len()
        );
        Ok(inverter)
    }

    /// Run one inversion
    pub async fn run(&self, request: &InversionRequest) -> Result<InversionOutput> {
        info!(
            complexity = %request.complexity,
            strength = request.strength,
            "Inverting negative prompt"
        );

        let cascade = match request.custom_antonyms.as_deref() {
            Some(text) if !text.trim().is_empty() => {
                let overrides = AntonymOverrides::parse(text)?;
                debug!("Using {} custom antonyms", overrides.len());
                self.cascade.with_overrides(Arc::new(overrides))
            }
            _ => self.cascade.clone(),
        };

        let rewrite = self.rewriter.replace_phrases(&request.negative_prompt);
        let mut state = ResolutionState {
            handled_tags: rewrite.handled,
            replacements: rewrite.replacements,
            ..Default::default()
        };

        let tags = Tag::split(&rewrite.text);
        debug!("Tags: {:?}", tags);

        for tag in &tags {
            if state.is_handled(tag.as_str()) {
                debug!("Tag '{}' already handled by phrase rewriter", tag);
                continue;
            }

            let result = cascade.resolve(tag.as_str()).await;
            if result.is_resolved() {
                state.antonyms.push(result.output);
            } else {
                state.unresolved_tags.push(tag.to_string());
            }
        }

        debug!(
            "Antonyms: {:?}, unresolved: {:?}",
            state.antonyms, state.unresolved_tags
        );

        if request.use_conceptnet {
            match &self.expander {
                Some(expander) => state.antonyms = expander.expand(&state.antonyms).await,
                None => warn!("Concept expansion requested but no knowledge graph is configured"),
            }
        }

        let sentiment = match self.sentiment.polarity(&request.negative_prompt).await {
            Ok(polarity) => polarity.clamp(-1.0, 1.0),
            Err(e) => {
                warn!("Sentiment scorer '{}' failed: {}", self.sentiment.name(), e);
                0.0
            }
        };
        let antonym_strength = sentiment.abs() * request.strength.clamp(0.0, 1.0);
        let intensities = self.intensities(&request.negative_prompt);

        let modified_prompt = self
            .assembler
            .assemble(request.complexity, &request.positive_prompt, &state.antonyms)
            .await;

        let escalation = escalation_mode(request, &state.unresolved_tags);
        let llm_input = match escalation {
            Some(mode) => {
                metrics::counter!("antiprompt_escalations_total", "mode" => mode.as_str())
                    .increment(1);
                escalation_payload(request, mode, &state.unresolved_tags)
            }
            None => String::new(),
        };

        info!(
            antonyms = state.antonyms.len(),
            unresolved = state.unresolved_tags.len(),
            escalated = escalation.is_some(),
            sentiment,
            antonym_strength,
            "Inversion complete"
        );

        Ok(InversionOutput {
            modified_prompt,
            llm_input,
            escalation,
            state,
            sentiment,
            antonym_strength,
            intensities,
        })
    }

    /// Strength-table weight of each tag of the original prompt that has one
    fn intensities(&self, negative_prompt: &str) -> Vec<TagIntensity> {
        Tag::split(negative_prompt)
            .into_iter()
            .filter_map(|tag| {
                self.strength.intensity(tag.as_str()).map(|weight| TagIntensity {
                    tag: tag.into_string(),
                    weight,
                })
            })
            .collect()
    }
}

/// Builder for [`Inverter`]
pub struct InverterBuilder {
    rewriter: PhraseRewriter,
    cascade: AntonymCascade,
    strength: Arc<StrengthMap>,
    sentiment: Option<Arc<dyn SentimentScorer>>,
    expander: Option<ConceptExpander>,
    assembler: Option<PromptAssembler>,
}

impl InverterBuilder {
    pub fn new(rewriter: PhraseRewriter, cascade: AntonymCascade) -> Self {
        Self {
            rewriter,
            cascade,
            strength: Arc::new(StrengthMap::default()),
            sentiment: None,
            expander: None,
            assembler: None,
        }
    }

    pub fn strength(mut self, strength: Arc<StrengthMap>) -> Self {
        self.strength = strength;
        self
    }

    pub fn sentiment(mut self, sentiment: Arc<dyn SentimentScorer>) -> Self {
        self.sentiment = Some(sentiment);
        self
    }

    pub fn expander(mut self, expander: ConceptExpander) -> Self {
        self.expander = Some(expander);
        self
    }

    pub fn assembler(mut self, assembler: PromptAssembler) -> Self {
        self.assembler = Some(assembler);
        self
    }

    pub fn build(self) -> Inverter {
        Inverter {
            rewriter: self.rewriter,
            cascade: self.cascade,
            strength: self.strength,
            sentiment: self.sentiment.unwrap_or_else(|| Arc::new(NeutralSentiment)),
            expander: self.expander,
            assembler: self.assembler.unwrap_or_else(|| PromptAssembler::new(None)),
        }
    }
}

/// Scorer used when none is configured: every text is neutral
struct NeutralSentiment;

#[async_trait::async_trait]
impl SentimentScorer for NeutralSentiment {
    async fn polarity(&self, _text: &str) -> Result<f32> {
        Ok(0.0)
    }

    fn name(&self) -> &str {
        "neutral"
    }
}
