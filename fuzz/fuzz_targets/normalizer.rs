#![no_main]

use libfuzzer_sys::fuzz_target;

use corpus_sieve::normalizer::MarkupStrategy;
use corpus_sieve::pipeline::{ContentFilterPipeline, Record};
use corpus_sieve::{TextNormalizer, WhitespaceMode};

fuzz_target!(|data: &[u8]| {
    let html = String::from_utf8_lossy(data).to_string();

    // Neither markup strategy may panic, and both are idempotent
    for strategy in [MarkupStrategy::Parser, MarkupStrategy::Regex] {
        let normalizer = TextNormalizer::new(WhitespaceMode::Spaced).with_strategy(strategy);
        let out = normalizer.normalize(&html);
        assert!(!out.contains("  "));
        assert_eq!(normalizer.normalize(&out), out);
    }

    let output = ContentFilterPipeline::default().process(&[Record::new(1, Some(html))]);
    assert_eq!(output.counts.total(), 1);
});
