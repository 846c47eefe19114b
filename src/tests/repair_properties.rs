use crate::error::GrammarError;
use crate::grammar::Grammar;
use crate::repair::parse;
use crate::symbol::Symbol;
use proptest::prelude::*;
use std::collections::HashSet;

/// Renders small token ids as a word string, `[0, 2, 0]` -> `"t0 t2 t0"`.
fn words(ids: &[u8]) -> String {
    ids.iter()
        .map(|id| format!("t{id}"))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Number of times each rule's guard appears in the full derivation tree.
fn derivation_counts(grammar: &Grammar) -> Vec<usize> {
    let mut counts = vec![0usize; grammar.rules().len()];
    for symbol in grammar.r0() {
        if let Some(rule) = symbol.rule() {
            counts[rule.index()] += 1;
        }
    }
    // A rule only references earlier rules, so walk parents first
    for rule in grammar.rules().iter().rev() {
        let uses = counts[rule.id().index()];
        for child in [rule.first(), rule.second()] {
            if let Some(child_rule) = child.rule() {
                counts[child_rule.index()] += uses;
            }
        }
    }
    counts
}

fn r0_digrams(grammar: &Grammar) -> Vec<(String, String)> {
    grammar
        .r0()
        .windows(2)
        .map(|pair| (pair[0].to_string(), pair[1].to_string()))
        .collect()
}

proptest! {
    /// Property 1: Losslessness
    /// Expanding R0 reproduces the input tokens exactly.
    #[test]
    fn prop_lossless(ids in prop::collection::vec(0u8..4, 1..80)) {
        let input = words(&ids);
        let grammar = parse(&input).unwrap();

        prop_assert_eq!(grammar.expand(), input);
        prop_assert_eq!(grammar.iter().count(), ids.len());
        prop_assert_eq!(grammar.input_length(), ids.len());
    }

    /// Property 2: Convergence
    /// No adjacent pair of the final R0 occurs twice.
    #[test]
    fn prop_converged(ids in prop::collection::vec(0u8..4, 1..80)) {
        let grammar = parse(&words(&ids)).unwrap();

        let digrams = r0_digrams(&grammar);
        let distinct: HashSet<&(String, String)> = digrams.iter().collect();
        prop_assert_eq!(distinct.len(), digrams.len(), "R0 still repeats a digram: {}", grammar.r0_string());
    }

    /// Property 3: Determinism
    /// Two runs over the same input produce identical grammars.
    #[test]
    fn prop_deterministic(ids in prop::collection::vec(0u8..6, 1..80)) {
        let input = words(&ids);
        let first = parse(&input).unwrap();
        let second = parse(&input).unwrap();

        prop_assert_eq!(first.to_string(), second.to_string());
        prop_assert_eq!(first, second);
    }

    /// Property 4: Occurrence accounting
    /// Each rule's recorded occurrences match its uses in the derivation tree.
    #[test]
    fn prop_occurrences_match_derivation(ids in prop::collection::vec(0u8..3, 1..80)) {
        let grammar = parse(&words(&ids)).unwrap();
        let counts = derivation_counts(&grammar);

        for rule in grammar.rules() {
            prop_assert!(rule.frequency() >= 1, "{} never placed", rule.id());
            prop_assert_eq!(
                rule.frequency(),
                counts[rule.id().index()],
                "occurrence count of {} disagrees with derivation tree",
                rule.id()
            );
        }
    }

    /// Property 5: Intervals point at the rule's expansion
    /// Every occurrence interval spans exactly the tokens the rule expands to.
    #[test]
    fn prop_intervals_cover_expansion(ids in prop::collection::vec(0u8..3, 1..80)) {
        let input = words(&ids);
        let tokens: Vec<&str> = input.split(' ').collect();
        let grammar = parse(&input).unwrap();

        for (id, interval) in grammar.rule_intervals() {
            let rule = grammar.rule(id).unwrap();
            prop_assert!(interval.end <= tokens.len());
            prop_assert_eq!(tokens[interval.start..interval.end].join(" "), rule.expanded());
            prop_assert_eq!(interval.len(), rule.expanded_len());
        }
    }

    /// Property 6: R0 positions are running offsets
    /// Each symbol of R0 sits at the original position of its first terminal.
    #[test]
    fn prop_r0_positions(ids in prop::collection::vec(0u8..3, 1..80)) {
        let grammar = parse(&words(&ids)).unwrap();

        let mut offset = 0;
        for symbol in grammar.r0() {
            prop_assert_eq!(symbol.position(), offset);
            offset += match symbol {
                Symbol::Terminal(_) => 1,
                Symbol::Guard(guard) => grammar.rule(guard.rule()).unwrap().expanded_len(),
            };
        }
        prop_assert_eq!(offset, ids.len());
    }

    /// Property 7: Levels
    /// A rule's level is one more than its deepest child.
    #[test]
    fn prop_levels(ids in prop::collection::vec(0u8..3, 2..80)) {
        let grammar = parse(&words(&ids)).unwrap();

        for rule in grammar.rules() {
            let child_level = |symbol: &Symbol| {
                symbol.rule().map_or(0, |id| grammar.rule(id).unwrap().level())
            };
            let expected = child_level(rule.first()).max(child_level(rule.second())) + 1;
            prop_assert_eq!(rule.level(), expected);
        }
    }

    /// Property 8: Repeated patterns create rules
    #[test]
    fn prop_repeated_patterns_create_rules(pattern in prop::collection::vec(0u8..8, 2..5), reps in 2..10usize) {
        let ids: Vec<u8> = pattern.iter().copied().cycle().take(pattern.len() * reps).collect();
        let grammar = parse(&words(&ids)).unwrap();

        prop_assert!(
            !grammar.rules().is_empty(),
            "{} reps of {:?} created no rules",
            reps,
            pattern
        );
    }
}

/// Bolero fuzz test: No panics on arbitrary input
#[cfg(test)]
#[test]
fn fuzz_repair_no_panic() {
    bolero::check!().with_type::<Vec<u8>>().for_each(|input| {
        let ids: Vec<u8> = input.iter().map(|b| b % 5).collect();
        match parse(&words(&ids)) {
            Ok(grammar) => {
                let _ = grammar.stats();
                let _ = grammar.rule_intervals();
                assert_eq!(grammar.iter().count(), ids.len());
            }
            Err(e) => {
                assert!(ids.is_empty());
                assert_eq!(e, GrammarError::InvalidInput);
            }
        }
    });
}

/// Bolero fuzz test: Roundtrip correctness
#[cfg(test)]
#[test]
fn fuzz_repair_roundtrip() {
    bolero::check!().with_type::<Vec<u8>>().for_each(|input| {
        if input.is_empty() {
            return;
        }
        let text = words(input);
        let grammar = parse(&text).unwrap();
        assert_eq!(
            grammar.expand(),
            text,
            "Roundtrip failed for input of length {}",
            input.len()
        );
    });
}

#[cfg(test)]
mod unit_tests {
    use super::*;
    use crate::symbol::RuleId;

    const PAPER: &str = "abc abc cba cba bac XXX abc abc cba cba bac";

    #[test]
    fn test_paper_grammar() {
        let grammar = parse(PAPER).unwrap();

        assert!(grammar.r0_string().trim().eq_ignore_ascii_case("R4 XXX R4"));
        let r4 = grammar.rule(RuleId(4)).unwrap();
        assert_eq!(r4.expanded(), "abc abc cba cba bac");
        assert_eq!(r4.occurrences().iter().copied().collect::<Vec<_>>(), vec![0, 6]);
        assert_eq!(r4.level(), 3);
        assert_eq!(grammar.expand(), PAPER);
    }

    #[test]
    fn test_paper_intervals() {
        let grammar = parse(PAPER).unwrap();
        let r4: Vec<_> = grammar.rule(RuleId(4)).unwrap().intervals().collect();

        assert_eq!(r4.len(), 2);
        assert_eq!((r4[0].start, r4[0].end), (0, 5));
        assert_eq!((r4[1].start, r4[1].end), (6, 11));
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(parse(""), Err(GrammarError::InvalidInput));
        assert_eq!(parse("   "), Err(GrammarError::InvalidInput));
        // A tab is token content, not a separator
        assert_eq!(parse(" \t ").map(|g| g.r0_string()), Ok("\t".to_string()));
    }

    #[test]
    fn test_single_token() {
        let grammar = parse("abc").unwrap();
        assert!(grammar.rules().is_empty());
        assert_eq!(grammar.r0_string(), "abc");
    }

    #[test]
    fn test_two_distinct_tokens() {
        let grammar = parse("abc cba").unwrap();
        assert!(grammar.rules().is_empty());
        assert_eq!(grammar.r0_string(), "abc cba");
    }

    #[test]
    fn test_pair_of_same_token() {
        let grammar = parse("a a").unwrap();
        assert_eq!(grammar.rules().len(), 1);
        assert_eq!(grammar.r0_string(), "R1");
        assert_eq!(grammar.rules()[0].expanded(), "a a");
    }

    #[test]
    fn test_no_repetition() {
        let grammar = parse("a b c d e f g h").unwrap();
        assert!(grammar.rules().is_empty());
        assert_eq!(grammar.r0_string(), "a b c d e f g h");
    }

    #[test]
    fn test_self_overlap_is_left_to_right() {
        let grammar = parse("x x x").unwrap();

        assert_eq!(grammar.rules().len(), 1);
        let r1 = &grammar.rules()[0];
        assert_eq!(r1.expanded(), "x x");
        // The middle token is consumed by the first replacement only
        assert_eq!(r1.occurrences().iter().copied().collect::<Vec<_>>(), vec![0]);
        assert_eq!(grammar.r0_string(), "R1 x");
        assert_eq!(grammar.r0().len(), 2);
    }

    #[test]
    fn test_long_run_of_one_token() {
        let input = vec!["x"; 100].join(" ");
        let grammar = parse(&input).unwrap();

        assert_eq!(grammar.expand(), input);
        // Each level doubles the covered span: 2, 4, 8, 16, 32, 64
        let lens: Vec<usize> = grammar.rules().iter().map(|r| r.expanded_len()).collect();
        assert_eq!(lens, vec![2, 4, 8, 16, 32, 64]);
        assert_eq!(grammar.r0_string(), "R6 R5 R2");
    }

    #[test]
    fn test_long_repetition_compresses() {
        let input = vec!["h e l l o"; 100].join(" ");
        let grammar = parse(&input).unwrap();

        assert_eq!(grammar.expand(), input);
        let stats = grammar.stats();
        assert_eq!(stats.input_length, 500);
        assert!(
            stats.compression_ratio() < 20.0,
            "Should compress well: {}%",
            stats.compression_ratio()
        );
    }

    #[test]
    fn test_rule_children_reference_earlier_rules() {
        let grammar = parse(PAPER).unwrap();
        for rule in grammar.rules() {
            for child in [rule.first(), rule.second()] {
                if let Some(id) = child.rule() {
                    assert!(id < rule.id());
                }
            }
        }
    }
}
