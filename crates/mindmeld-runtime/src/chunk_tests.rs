use super::*;
use crate::extract::ElementKind::{Heading, List, Paragraph};
use mindmeld_dom::Document;

/// Build candidates backed by throwaway nodes.
fn candidates(spec: &[(ElementKind, usize)]) -> Vec<Candidate> {
    let mut doc = Document::new();
    spec.iter()
        .enumerate()
        .map(|(i, &(kind, tokens))| Candidate {
            node: doc.create_element("p"),
            kind,
            text: format!("element {i}"),
            tokens,
        })
        .collect()
}

fn shape(chunks: &[Chunk]) -> Vec<Vec<String>> {
    chunks
        .iter()
        .map(|chunk| chunk.elements().iter().map(|c| c.text.clone()).collect())
        .collect()
}

#[test]
fn test_empty_input() {
    assert!(plan_chunks(Vec::new(), 600).is_empty());
}

#[test]
fn test_paragraphs_share_chunk_within_budget() {
    let chunks = plan_chunks(candidates(&[(Paragraph, 200), (Paragraph, 200), (Paragraph, 200)]), 600);
    assert_eq!(chunks.len(), 1);
    assert_eq!(chunks[0].elements().iter().map(|c| c.tokens).sum::<usize>(), 600);
}

#[test]
fn test_budget_overflow_starts_new_chunk() {
    let chunks = plan_chunks(
        candidates(&[(Paragraph, 300), (Paragraph, 300), (Paragraph, 1)]),
        600,
    );
    assert_eq!(
        shape(&chunks),
        vec![
            vec!["element 0", "element 1"],
            vec!["element 2"],
        ]
    );
}

#[test]
fn test_oversized_paragraph_gets_own_chunk() {
    let chunks = plan_chunks(
        candidates(&[(Paragraph, 10), (Paragraph, 900), (Paragraph, 10)]),
        600,
    );
    assert_eq!(
        shape(&chunks),
        vec![vec!["element 0"], vec!["element 1"], vec!["element 2"]]
    );
}

#[test]
fn test_headings_and_lists_stand_alone() {
    let chunks = plan_chunks(
        candidates(&[
            (Heading, 2),
            (Paragraph, 10),
            (Paragraph, 10),
            (List, 5),
            (Paragraph, 10),
            (Heading, 2),
        ]),
        600,
    );
    assert_eq!(
        shape(&chunks),
        vec![
            vec!["element 0"],
            vec!["element 1", "element 2"],
            vec!["element 3"],
            vec!["element 4"],
            vec!["element 5"],
        ]
    );
    assert!(chunks[0].is_heading_only());
    assert!(chunks[0].paragraphs().is_empty());
    assert!(!chunks[2].is_heading_only());
    assert!(chunks[2].paragraphs().is_empty());
    assert_eq!(chunks[1].paragraphs().len(), 2);
}

#[test]
fn test_chunk_invariants_hold() {
    let kinds = [Paragraph, Paragraph, Heading, Paragraph, List, Paragraph, Paragraph];
    for budget in [1usize, 5, 17, 40, 600] {
        for seed in 0..20usize {
            let spec: Vec<_> = (0..30)
                .map(|i| (kinds[(i * 7 + seed) % kinds.len()], (i * 13 + seed * 5) % 23))
                .collect();
            let input = candidates(&spec);
            let chunks = plan_chunks(input.clone(), budget);

            // Concatenation reproduces the input exactly.
            let flattened: Vec<Candidate> =
                chunks.iter().flat_map(|c| c.elements().to_vec()).collect();
            assert_eq!(flattened, input);

            for chunk in &chunks {
                assert!(!chunk.is_empty());
                if chunk.elements().iter().any(|c| c.kind.is_boundary()) {
                    assert_eq!(chunk.len(), 1);
                }
                let non_trigger: usize = chunk.elements()[1..].iter().map(|c| c.tokens).sum();
                assert!(non_trigger <= budget);
                let total: usize = chunk.elements().iter().map(|c| c.tokens).sum();
                if chunk.len() > 1 {
                    assert!(total <= budget);
                }
            }
        }
    }
}
