//! Properties every parse of the flight grammar keeps.

use phoenix_parser::{ParserConfig, PhoenixParser};
use proptest::prelude::*;

use crate::fixtures::{FLIGHTS, compile};

const WORDS: &[&str] = &[
    "show", "me", "flights", "the", "list", "please", "from", "to", "boston", "denver", "san",
    "francisco", "xyzzy",
];

fn sentence() -> impl Strategy<Value = Vec<&'static str>> {
    prop::collection::vec(prop::sample::select(WORDS), 0..12)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn slots_are_ordered_and_account_for_every_token(words in sentence(), ignore_oov in any::<bool>()) {
        let grammar = compile(&["[List]", "[Depart]", "[Arrive]", "[Source]", "[City]"], FLIGHTS);
        let config = ParserConfig::default().with_ignore_oov(ignore_oov);
        let mut parser = PhoenixParser::new(&grammar, config);
        let outcome = parser.parse_words(&words);

        prop_assert_eq!(outcome.tokens.len(), words.len());
        prop_assert!(outcome.overflow.is_none());
        prop_assert!(outcome.parses.len() <= 10);

        for parse in &outcome.parses {
            let mut last_end = 0;
            let mut covered = 0;
            for slot in &parse.slots {
                prop_assert!(slot.tree.start >= last_end);
                prop_assert!(slot.tree.start < slot.tree.end);
                prop_assert!(slot.tree.end <= words.len());
                last_end = slot.tree.end;
                covered += slot.tree.words().len();
            }
            prop_assert_eq!(parse.score, covered);
            prop_assert_eq!(covered + parse.unparsed.len(), words.len());
        }

        let scores: Vec<_> = outcome.parses.iter().map(|p| (p.score, p.slots.len())).collect();
        prop_assert!(scores.windows(2).all(|w| w[0] == w[1]));
    }
}
