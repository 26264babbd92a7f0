//! Integration tests for the multinomial (text) classifier.

use bayes_classifiers::data_handling::FeatureEvent;
use bayes_classifiers::models::classifier_trait::ClassifierModel;
use bayes_classifiers::models::factory;
use bayes_classifiers::{
    ClassifierConfig, FeatureEncoding, Features, LabeledInstance, NaiveBayesError,
    NaiveBayesModel,
};

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn spam_corpus() -> Vec<LabeledInstance> {
    vec![
        LabeledInstance::text("spam", ["win", "money"]),
        LabeledInstance::text("ham", ["hello", "friend"]),
        LabeledInstance::text("spam", ["win", "prize"]),
    ]
}

fn sms_corpus() -> Vec<LabeledInstance> {
    vec![
        LabeledInstance::text("ham", ["are", "we", "meeting", "for", "lunch", "today"]),
        LabeledInstance::text("ham", ["call", "me", "when", "you", "get", "home"]),
        LabeledInstance::text("ham", ["see", "you", "at", "the", "meeting"]),
        LabeledInstance::text("spam", ["win", "a", "free", "prize", "now", "call"]),
        LabeledInstance::text("spam", ["free", "entry", "to", "win", "cash", "prize"]),
        LabeledInstance::text("spam", ["urgent", "claim", "your", "free", "cash", "prize"]),
        LabeledInstance::text("ham", ["lunch", "at", "home", "today"]),
    ]
}

fn trained(instances: &[LabeledInstance], alpha: f64) -> NaiveBayesModel {
    init_logging();
    let mut model = NaiveBayesModel::with_alpha(FeatureEncoding::Multinomial, alpha);
    model.train(instances).expect("training should succeed");
    model
}

// ---------------------------------------------------------------------------
// Worked example
// ---------------------------------------------------------------------------

#[test]
fn spam_scenario_conditional_and_prediction() {
    let model = trained(&spam_corpus(), 1.0);

    let vocabulary = model.tables().unwrap().domains.vocabulary();
    assert_eq!(vocabulary.len(), 5);

    let win = FeatureEvent::Token("win".to_string());
    let expected = ((2.0 + 1.0) / (4.0 + 1.0 * 5.0) as f64).ln();
    let actual = model.log_conditional("spam", &win).unwrap();
    assert!((actual - expected).abs() < 1e-12, "{} vs {}", actual, expected);

    assert_eq!(model.predict(&Features::tokens(["win", "prize"])).unwrap(), "spam");
    assert_eq!(model.predict(&Features::tokens(["hello"])).unwrap(), "ham");
}

#[test]
fn classes_are_frozen_and_sorted() {
    let model = trained(&spam_corpus(), 1.0);
    assert_eq!(model.classes().unwrap(), vec!["ham", "spam"]);

    let err = model.score(&Features::tokens(["win"]), "phishing").unwrap_err();
    assert_eq!(err, NaiveBayesError::UnknownClass("phishing".to_string()));
}

// ---------------------------------------------------------------------------
// Distribution properties
// ---------------------------------------------------------------------------

#[test]
fn priors_sum_to_one() {
    for alpha in [0.0, 0.5, 1.0, 3.0] {
        let model = trained(&sms_corpus(), alpha);
        let total: f64 = model
            .classes()
            .unwrap()
            .iter()
            .map(|label| model.log_prior(label).unwrap().exp())
            .sum();
        assert!((total - 1.0).abs() < 1e-9, "alpha {}: {}", alpha, total);
    }
}

#[test]
fn conditionals_sum_to_one_over_vocabulary() {
    for alpha in [0.1, 1.0, 2.5] {
        let model = trained(&sms_corpus(), alpha);
        let vocabulary = model.tables().unwrap().domains.vocabulary();
        for label in model.classes().unwrap() {
            let total: f64 = vocabulary
                .iter()
                .map(|token| {
                    let event = FeatureEvent::Token(token.clone());
                    model.log_conditional(label, &event).unwrap().exp()
                })
                .sum();
            assert!((total - 1.0).abs() < 1e-9, "{} / alpha {}: {}", label, alpha, total);
        }
    }
}

#[test]
fn observed_entries_are_finite_and_negative() {
    let model = trained(&sms_corpus(), 1.0);
    let tables = model.tables().unwrap();
    for (label, row) in &tables.log_conditionals {
        for (event, &value) in row {
            assert!(value.is_finite() && value < 0.0, "{} {:?} = {}", label, event, value);
        }
    }
    for &value in tables.log_priors.values() {
        assert!(value.is_finite());
    }
}

// ---------------------------------------------------------------------------
// Unseen tokens and smoothing boundaries
// ---------------------------------------------------------------------------

#[test]
fn out_of_vocabulary_tokens_are_scored_not_dropped() {
    let model = trained(&spam_corpus(), 1.0);
    let base = model.score(&Features::tokens(["win"]), "spam").unwrap();
    let with_unknown = model
        .score(&Features::tokens(["win", "zzz"]), "spam")
        .unwrap();
    // log(1 / (4 + 5))
    let fallback = (1.0f64 / 9.0).ln();
    assert!((with_unknown - (base + fallback)).abs() < 1e-12);
}

#[test]
fn zero_alpha_propagates_negative_infinity() {
    let model = trained(&spam_corpus(), 0.0);

    let score = model.score(&Features::tokens(["hello"]), "spam").unwrap();
    assert_eq!(score, f64::NEG_INFINITY);

    let ham = model.score(&Features::tokens(["hello"]), "ham").unwrap();
    assert!(ham.is_finite());
    assert_eq!(model.predict(&Features::tokens(["hello"])).unwrap(), "ham");
}

#[test]
fn dominant_token_decides_class() {
    let mut instances = sms_corpus();
    for _ in 0..5 {
        instances.push(LabeledInstance::text("spam", ["jackpot", "jackpot", "jackpot"]));
    }
    let model = trained(&instances, 1.0);
    let features = Features::tokens(["jackpot", "lunch"]);
    assert_eq!(model.predict(&features).unwrap(), "spam");
}

#[test]
fn repeated_tokens_count_individually() {
    let model = trained(&sms_corpus(), 1.0);
    let once = model.score(&Features::tokens(["free"]), "spam").unwrap();
    let thrice = model
        .score(&Features::tokens(["free", "free", "free"]), "spam")
        .unwrap();
    let prior = model.log_prior("spam").unwrap();
    assert!(((thrice - prior) - 3.0 * (once - prior)).abs() < 1e-9);
}

// ---------------------------------------------------------------------------
// Training lifecycle
// ---------------------------------------------------------------------------

#[test]
fn retraining_is_idempotent() {
    let mut model = trained(&sms_corpus(), 1.0);
    let first = model.tables().cloned().unwrap();
    model.train(&sms_corpus()).unwrap();
    let second = model.tables().cloned().unwrap();
    assert_eq!(first, second);
}

#[test]
fn retraining_discards_previous_state() {
    let mut model = trained(&sms_corpus(), 1.0);
    model.train(&spam_corpus()).unwrap();
    let fresh = trained(&spam_corpus(), 1.0);
    assert_eq!(model.tables(), fresh.tables());
    assert_eq!(model.tables().unwrap().domains.vocabulary().len(), 5);
}

#[test]
fn training_errors() {
    init_logging();
    let mut model = NaiveBayesModel::new(ClassifierConfig::default());
    assert_eq!(model.train(&[]), Err(NaiveBayesError::EmptyTrainingSet));

    let one_label = vec![
        LabeledInstance::text("ham", ["a"]),
        LabeledInstance::text("ham", ["b"]),
    ];
    assert_eq!(model.train(&one_label), Err(NaiveBayesError::SingleClass(1)));

    let wrong_kind = vec![
        LabeledInstance::text("ham", ["a"]),
        LabeledInstance::tabular("spam", [("a", "b")]),
    ];
    assert!(matches!(
        model.train(&wrong_kind),
        Err(NaiveBayesError::SchemaMismatch(_))
    ));
    assert!(!model.is_trained());
    assert_eq!(
        model.predict(&Features::tokens(["a"])),
        Err(NaiveBayesError::UntrainedModel)
    );
}

// ---------------------------------------------------------------------------
// Batch inference and factory
// ---------------------------------------------------------------------------

#[test]
fn predict_batch_matches_sequential() {
    let model = trained(&sms_corpus(), 1.0);
    let batch: Vec<Features> = sms_corpus()
        .into_iter()
        .map(|instance| instance.features)
        .chain(std::iter::once(Features::tokens(["free", "cash"])))
        .collect();

    let parallel = model.predict_batch(&batch).unwrap();
    let sequential: Vec<String> = batch.iter().map(|f| model.predict(f).unwrap()).collect();
    assert_eq!(parallel, sequential);
    assert_eq!(parallel.last().map(String::as_str), Some("spam"));
}

#[test]
fn predict_is_shareable_across_threads() {
    let model = std::sync::Arc::new(trained(&sms_corpus(), 1.0));
    let handles: Vec<_> = (0..4)
        .map(|_| {
            let model = std::sync::Arc::clone(&model);
            std::thread::spawn(move || model.predict(&Features::tokens(["free", "prize"])))
        })
        .collect();
    for handle in handles {
        assert_eq!(handle.join().unwrap().unwrap(), "spam");
    }
}

#[test]
fn factory_builds_and_predicts() {
    init_logging();
    let mut model = factory::build_model(ClassifierConfig::new(1.0, FeatureEncoding::Multinomial));
    assert_eq!(model.name(), "multinomial_naive_bayes");
    model.fit(&spam_corpus()).unwrap();
    assert_eq!(model.predict(&Features::tokens(["money"])).unwrap(), "spam");
    assert!(model.score(&Features::tokens(["money"]), "ham").unwrap().is_finite());
}
