//! Prompt composition for answering, summarizing and quiz generation.
//!
//! All three tasks share one shape: gather the passages of the selected
//! documents, cap how much of each document enters the prompt, lay the
//! text out with document separators, and wrap it in a task-specific
//! instruction template.
//!
//! # Per-document budgeting
//!
//! Summaries and quizzes split a total character budget evenly across the
//! selected documents ([`per_document_budget`]) so that one long document
//! cannot crowd out the others. Each document is then packed greedily in
//! passage order ([`pack_document`]): a passage is taken while the running
//! total stays strictly below the document's share, and packing stops at
//! the first passage that does not fit.

use crate::models::{DocumentSummary, Passage};

/// Answer returned when the selection holds no passages at all.
pub const NO_CONTENT_ANSWER: &str = "No content found in selected sources.";

/// Answer returned when no retrieved passage belongs to the selection.
pub const NO_RELEVANT_ANSWER: &str = "No relevant information found in selected sources.";

/// Separator between passages in an answer prompt.
pub const PASSAGE_SEPARATOR: &str = "\n\n---\n\n";

/// Character budget available to each of `documents` documents.
///
/// `documents == 0` is treated as one document.
pub fn per_document_budget(total_chars: usize, documents: usize) -> usize {
    total_chars / documents.max(1)
}

/// How many quiz questions to request, and how they spread over documents.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuizPlan {
    pub per_document: usize,
    pub total: usize,
}

/// `max(1, target / documents)` questions per document.
///
/// With the default target of 5: one document gets 5 questions, two get 4
/// in total, three get 3, six get 6.
pub fn quiz_plan(target: usize, documents: usize) -> QuizPlan {
    let documents = documents.max(1);
    let per_document = (target / documents).max(1);
    QuizPlan {
        per_document,
        total: per_document * documents,
    }
}

/// Passages of one document, in insertion order.
#[derive(Debug, Clone)]
pub struct DocumentPassages {
    pub name: String,
    pub passages: Vec<String>,
}

/// Group `passages` under their owning documents.
///
/// Groups follow the order of `documents`; documents without passages are
/// left out, and passages owned by documents not listed are dropped.
pub fn group_by_document(
    documents: &[DocumentSummary],
    passages: Vec<Passage>,
) -> Vec<DocumentPassages> {
    let mut groups: Vec<DocumentPassages> = documents
        .iter()
        .map(|d| DocumentPassages {
            name: d.name.clone(),
            passages: Vec::new(),
        })
        .collect();

    for passage in passages {
        if let Some(pos) = documents.iter().position(|d| d.id == passage.document_id) {
            groups[pos].passages.push(passage.text);
        }
    }

    groups.retain(|g| !g.passages.is_empty());
    groups
}

/// The part of a document that fits its budget.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackedDocument<'a> {
    pub name: &'a str,
    pub passages: Vec<&'a str>,
    /// Characters used by `passages`.
    pub chars: usize,
}

/// Greedily take trimmed passages while the total stays below `budget`
/// characters.
pub fn pack_document(group: &DocumentPassages, budget: usize) -> PackedDocument<'_> {
    let mut packed = PackedDocument {
        name: &group.name,
        passages: Vec::new(),
        chars: 0,
    };

    for passage in &group.passages {
        let text = passage.trim();
        let len = text.chars().count();
        if packed.chars + len < budget {
            packed.passages.push(text);
            packed.chars += len;
        } else {
            break;
        }
    }

    packed
}

/// Pack every group against an even share of `total_chars`.
pub fn pack_documents(groups: &[DocumentPassages], total_chars: usize) -> Vec<PackedDocument<'_>> {
    let budget = per_document_budget(total_chars, groups.len());
    groups.iter().map(|g| pack_document(g, budget)).collect()
}

fn document_names(packed: &[PackedDocument<'_>]) -> String {
    packed.iter().map(|p| p.name).collect::<Vec<_>>().join(", ")
}

/// Prompt asking the model to answer `question` from `passages` only.
pub fn answer_prompt(question: &str, passages: &[&str]) -> String {
    let context = passages.join(PASSAGE_SEPARATOR);
    format!(
        "You are an assistant that answers questions using ONLY the context provided.

CONTEXT (drawn from all selected sources):
{context}

QUESTION:
{question}

INSTRUCTIONS:
- Use ALL relevant information from the context above
- If the answer is spread over several parts of the context, combine them
- If the information is not in the context, say so clearly

ANSWER:
"
    )
}

/// Prompt asking for a structured summary covering every packed document.
pub fn summary_prompt(packed: &[PackedDocument<'_>]) -> String {
    let mut blocks = Vec::new();
    for doc in packed {
        blocks.push(format!("\n=== Document: {} ===\n", doc.name));
        blocks.extend(doc.passages.iter().map(|p| p.to_string()));
    }
    let content = blocks.join("\n\n");

    format!(
        "Summarize the following content, which comes from {count} document(s): {names}

CONTENT TO SUMMARIZE:
{content}

INSTRUCTIONS:
- Write a complete, structured summary that covers EVERY document listed
- For each document, summarize its main points
- Organize the summary by document or by theme
- Name each document explicitly in the summary
- If the documents cover similar subjects, compare them

SUMMARY:
",
        count = packed.len(),
        names = document_names(packed),
    )
}

/// Prompt asking for `total_questions` multiple-choice questions drawn
/// strictly from the packed documents.
pub fn quiz_prompt(packed: &[PackedDocument<'_>], total_questions: usize) -> String {
    let rule = "=".repeat(60);
    let mut blocks = Vec::new();
    for doc in packed {
        blocks.push(format!("\n{}", rule));
        blocks.push(format!("DOCUMENT SOURCE: {}", doc.name));
        blocks.push(format!("{}\n", rule));
        for (i, passage) in doc.passages.iter().enumerate() {
            blocks.push(format!("[Section {}]", i + 1));
            blocks.push(passage.to_string());
            blocks.push(String::new());
        }
    }
    let content = blocks.join("\n\n");

    format!(
        "You are an expert quiz writer. Build a multiple-choice quiz based STRICTLY on the content below.

ABSOLUTE RULES:
1. Questions and answers must come DIRECTLY from the text provided
2. Do NOT invent information
3. Check that every correct answer matches a statement in the text exactly
4. Wrong answers must be plausible but clearly incorrect

SOURCE CONTENT ({count} document(s): {names}):
{content}

GENERATION INSTRUCTIONS:
- Generate exactly {total_questions} multiple-choice questions
- Spread the questions evenly across all documents
- For each question:
  * Cite the source document
  * Ask a clear question based on a factual statement in the text
  * Offer 4 options (A, B, C, D)
  * Exactly ONE correct answer that matches the text EXACTLY
  * 3 incorrect but plausible answers
  * Give the letter of the correct answer (A, B, C or D)

FORMAT EXAMPLE:
1. [Document: example.pdf] - How does the document define X?
   A) First incorrect definition
   B) Correct definition taken from the text
   C) Second incorrect definition
   D) Third incorrect definition
   Correct answer: B

GENERATE THE QUIZ NOW (follow the format above exactly):
",
        count = packed.len(),
        names = document_names(packed),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn group(name: &str, passages: &[&str]) -> DocumentPassages {
        DocumentPassages {
            name: name.to_string(),
            passages: passages.iter().map(|p| p.to_string()).collect(),
        }
    }

    fn summary(id: &str, name: &str) -> DocumentSummary {
        DocumentSummary {
            id: id.to_string(),
            name: name.to_string(),
            passage_count: 0,
        }
    }

    fn passage(doc: &str, global: usize, text: &str) -> Passage {
        Passage {
            document_id: doc.to_string(),
            index: 0,
            global_index: global,
            text: text.to_string(),
        }
    }

    #[test]
    fn test_per_document_budget() {
        assert_eq!(per_document_budget(10_000, 1), 10_000);
        assert_eq!(per_document_budget(10_000, 3), 3_333);
        assert_eq!(per_document_budget(12_000, 0), 12_000);
    }

    #[test]
    fn test_quiz_plan() {
        assert_eq!(quiz_plan(5, 1), QuizPlan { per_document: 5, total: 5 });
        assert_eq!(quiz_plan(5, 2), QuizPlan { per_document: 2, total: 4 });
        assert_eq!(quiz_plan(5, 3).total, 3);
        assert_eq!(quiz_plan(5, 5).total, 5);
        assert_eq!(quiz_plan(5, 6), QuizPlan { per_document: 1, total: 6 });
    }

    #[test]
    fn test_pack_stops_at_first_passage_that_does_not_fit() {
        let g = group("a", &["aaaa", "bbbbbbbb", "cc"]);
        let packed = pack_document(&g, 10);
        assert_eq!(packed.passages, vec!["aaaa"]);
        assert_eq!(packed.chars, 4);
    }

    #[test]
    fn test_pack_is_strictly_below_budget() {
        let g = group("a", &["12345", "12345"]);
        assert_eq!(pack_document(&g, 10).passages.len(), 1);
        assert_eq!(pack_document(&g, 11).passages.len(), 2);
    }

    #[test]
    fn test_pack_trims_and_counts_chars() {
        let g = group("a", &["  héllo  ", "wörld"]);
        let packed = pack_document(&g, 11);
        assert_eq!(packed.passages, vec!["héllo", "wörld"]);
        assert_eq!(packed.chars, 10);
    }

    #[test]
    fn test_no_document_exceeds_its_share() {
        let long: Vec<String> = (0..50).map(|i| format!("passage {:03} {}", i, "x".repeat(90))).collect();
        let long_refs: Vec<&str> = long.iter().map(String::as_str).collect();
        let groups = vec![group("big", &long_refs), group("small", &["tiny"])];
        let total = 1_000;
        let share = per_document_budget(total, groups.len());
        for packed in pack_documents(&groups, total) {
            assert!(packed.chars < share, "{} used {}", packed.name, packed.chars);
        }
        assert_eq!(pack_documents(&groups, total)[1].passages, vec!["tiny"]);
    }

    #[test]
    fn test_group_by_document_follows_document_order() {
        let docs = vec![summary("d1", "one.pdf"), summary("d2", "two.pdf"), summary("d3", "three.pdf")];
        let passages = vec![
            passage("d2", 0, "two-a"),
            passage("d1", 1, "one-a"),
            passage("d2", 2, "two-b"),
            passage("zz", 3, "stray"),
        ];
        let groups = group_by_document(&docs, passages);
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].name, "one.pdf");
        assert_eq!(groups[0].passages, vec!["one-a"]);
        assert_eq!(groups[1].passages, vec!["two-a", "two-b"]);
    }

    #[test]
    fn test_answer_prompt_layout() {
        let prompt = answer_prompt("What is X?", &["first", "second"]);
        assert!(prompt.contains("first\n\n---\n\nsecond"));
        assert!(prompt.contains("QUESTION:\nWhat is X?"));
    }

    #[test]
    fn test_summary_prompt_names_every_document() {
        let groups = vec![group("a.pdf", &["alpha text"]), group("b.pdf", &["beta text"])];
        let packed = pack_documents(&groups, 10_000);
        let prompt = summary_prompt(&packed);
        assert!(prompt.contains("from 2 document(s): a.pdf, b.pdf"));
        assert!(prompt.contains("=== Document: a.pdf ==="));
        assert!(prompt.contains("=== Document: b.pdf ==="));
        assert!(prompt.contains("beta text"));
    }

    #[test]
    fn test_quiz_prompt_requests_planned_questions() {
        let groups = vec![group("a.pdf", &["alpha", "more alpha"]), group("b.pdf", &["beta"])];
        let packed = pack_documents(&groups, 12_000);
        let plan = quiz_plan(5, packed.len());
        let prompt = quiz_prompt(&packed, plan.total);
        assert!(prompt.contains("Generate exactly 4 multiple-choice questions"));
        assert!(prompt.contains("DOCUMENT SOURCE: b.pdf"));
        assert!(prompt.contains("[Section 2]\n\nmore alpha"));
        assert!(prompt.contains("Correct answer: B"));
    }
}
