//! Pipeline assembly, word-id policies and shared use across threads

use lectern_core::{
    Grammar, MissingWordIdPolicy, Normalizer, NormalizerError, SentenceSplitter,
    VerbalizerOptions,
};
use std::path::Path;
use std::sync::Arc;
use std::thread;

/// Words become WORD tokens; `?x` becomes a WORD token without a word id
const TOKENIZER: &str = r#"
name = "policy_tokenizer"
order = ["TOKENIZE"]

[[rules.TOKENIZE.rewrites]]
pattern = "[a-z]+"
output = 'tokens { name: "${0}" wordid: "${0}" } '
weight = 1.0

[[rules.TOKENIZE.rewrites]]
pattern = '\?([a-z]+)'
output = 'tokens { name: "${1}" type: WORD } '
weight = 1.0

[[rules.TOKENIZE.rewrites]]
pattern = " +"
"#;

const VERBALIZER: &str = r#"
name = "policy_verbalizer"
order = ["VERBALIZE"]
[rules.VERBALIZE]
passthrough = true
"#;

fn normalizer_with(policy: MissingWordIdPolicy) -> Normalizer {
    Normalizer::builder()
        .tokenizer(Grammar::from_toml_str(TOKENIZER).unwrap())
        .verbalizer(Grammar::from_toml_str(VERBALIZER).unwrap())
        .verbalizer_options(VerbalizerOptions {
            missing_word_id: policy,
            ..VerbalizerOptions::default()
        })
        .build()
        .unwrap()
}

#[test]
fn test_missing_word_id_is_dropped_by_default() {
    let normalizer = normalizer_with(MissingWordIdPolicy::default());
    assert_eq!(normalizer.normalize("die ?koei wei").unwrap(), "die wei");

    let utt = normalizer.normalize_utterance("die ?koei wei").unwrap();
    assert_eq!(utt.tokens()[1].daughters, None);
    assert_eq!(utt.words()[1].parent, 2);
}

#[test]
fn test_missing_word_id_can_fail_the_sentence() {
    let normalizer = normalizer_with(MissingWordIdPolicy::Fail);
    let err = normalizer.normalize("die ?koei wei").unwrap_err();
    assert!(matches!(err, NormalizerError::MissingWordId { ref token } if token == "koei"));
    assert_eq!(normalizer.normalize("die koei wei").unwrap(), "die koei wei");
}

#[test]
fn test_missing_word_id_can_be_synthesized() {
    let normalizer = normalizer_with(MissingWordIdPolicy::Synthesize);
    assert_eq!(
        normalizer.normalize("die ?koei wei").unwrap(),
        "die koei wei"
    );
}

#[test]
fn test_builder_accepts_custom_splitter() {
    let mut splitter = SentenceSplitter::new("[.;] ").unwrap();
    splitter.add_exceptions("bv.");
    let normalizer = Normalizer::builder()
        .tokenizer(Grammar::from_toml_str(TOKENIZER).unwrap())
        .verbalizer(Grammar::from_toml_str(VERBALIZER).unwrap())
        .sentence_splitter(splitter)
        .build()
        .unwrap();

    assert_eq!(
        normalizer.split_sentences("een; twee bv. drie! vier"),
        vec!["een;", "twee bv. drie! vier"]
    );
}

#[test]
fn test_normalizer_is_shareable() {
    fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<Normalizer>();
}

#[test]
fn test_concurrent_normalization() {
    let normalizer = Arc::new(
        Normalizer::setup(
            Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/config.toml"),
            None,
        )
        .unwrap(),
    );
    let inputs = [
        ("4,3 - 5,7m", "vier komma drie tot vyf komma sewe meter"),
        ("Ja, nee", "Ja sil nee"),
        ("Daar is 3 koeie", "Daar is drie koeie"),
        ("Dit is 5,7km ver", "Dit is vyf komma sewe k m ver"),
    ];

    let handles: Vec<_> = (0..8)
        .map(|i| {
            let normalizer = Arc::clone(&normalizer);
            thread::spawn(move || {
                for round in 0..20 {
                    let (input, expected) = inputs[(i + round) % inputs.len()];
                    assert_eq!(normalizer.normalize(input).unwrap(), expected);
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }
}

#[test]
fn test_scoped_threads_share_a_borrowed_normalizer() {
    let normalizer = normalizer_with(MissingWordIdPolicy::Drop);
    let text = "een twee. drie vier. vyf ses.";

    let outputs: Vec<String> = thread::scope(|scope| {
        let handles: Vec<_> = normalizer
            .split_sentences(text)
            .into_iter()
            .map(|sentence| {
                let normalizer = &normalizer;
                scope.spawn(move || {
                    let words = sentence.trim_end_matches('.');
                    normalizer.normalize(words).unwrap()
                })
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    assert_eq!(outputs, vec!["een twee", "drie vier", "vyf ses"]);
}
