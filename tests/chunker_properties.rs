//! Exhaustive checks of chunking guarantees over short strings.

use ryzn_tutor::tts::{chunk_text, ChunkRule};

const ALPHABET: [&str; 8] = ["a", "é", " ", "\n", ".", "!", "?", ","];

/// Every string of up to `max_len` symbols from `ALPHABET`.
fn all_strings(max_len: usize) -> Vec<String> {
    let mut out = vec![String::new()];
    let mut frontier = vec![String::new()];
    for _ in 0..max_len {
        let mut next = Vec::with_capacity(frontier.len() * ALPHABET.len());
        for prefix in &frontier {
            for symbol in ALPHABET {
                next.push(format!("{}{}", prefix, symbol));
            }
        }
        out.extend(next.iter().cloned());
        frontier = next;
    }
    out
}

#[test]
fn test_units_concatenate_to_input() {
    for text in all_strings(5) {
        let joined: String = chunk_text(&text)
            .units()
            .iter()
            .map(|u| u.text.as_str())
            .collect();
        assert_eq!(joined, text, "round trip failed for {:?}", text);
    }
}

#[test]
fn test_ranges_are_contiguous() {
    for text in all_strings(5) {
        let chunks = chunk_text(&text);
        let mut expected_start = 0;
        for (i, unit) in chunks.units().iter().enumerate() {
            assert_eq!(unit.index, i);
            assert_eq!(unit.range.start, expected_start, "gap in {:?}", text);
            assert_eq!(&text[unit.range.clone()], unit.text);
            expected_start = unit.range.end;
        }
        assert_eq!(expected_start, text.len());
    }
}

#[test]
fn test_speakable_input_yields_non_blank_units() {
    for text in all_strings(5) {
        if text.trim().is_empty() {
            continue;
        }
        let chunks = chunk_text(&text);
        assert!(!chunks.is_empty(), "no units for {:?}", text);
        for unit in chunks.units() {
            assert!(
                !unit.text.trim().is_empty(),
                "blank unit {:?} in {:?}",
                unit.text,
                text
            );
        }
    }
}

#[test]
fn test_non_empty_input_yields_at_least_one_unit() {
    for text in all_strings(4) {
        assert_eq!(chunk_text(&text).is_empty(), text.is_empty(), "{:?}", text);
    }
}

#[test]
fn test_clause_units_end_at_commas() {
    for text in all_strings(5) {
        let chunks = chunk_text(&text);
        if chunks.rule() == ChunkRule::Clause {
            assert!(!chunks.is_empty());
            for unit in &chunks.units()[..chunks.len() - 1] {
                assert!(unit.text.trim_end().ends_with(','), "{:?}", text);
            }
        }
    }
}

#[test]
fn test_lesson_paragraph() {
    let text = "Photosynthesis turns light into chemical energy. It happens in the \
chloroplast! Why does it matter? Plants feed almost every food chain.";
    let chunks = chunk_text(text);
    assert_eq!(chunks.rule(), ChunkRule::Sentence);
    assert_eq!(
        chunks.texts(),
        vec![
            "Photosynthesis turns light into chemical energy. ",
            "It happens in the chloroplast! ",
            "Why does it matter? ",
            "Plants feed almost every food chain.",
        ]
    );
}
