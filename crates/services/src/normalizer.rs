//! Turns raw bank records into playable questions: decodes HTML entities
//! and fixes a random choice order per question.

use rand::Rng;

use trivia_core::model::{NormalizedQuestion, QuestionError, QuestionRecord};

use crate::question_source::RawQuestion;

// Entities longer than this are left untouched rather than scanned forever.
const MAX_ENTITY_LEN: usize = 10;

/// Decode HTML character entities in `input`.
///
/// Handles the named entities the bank emits plus decimal (`&#39;`) and hex
/// (`&#x27;`) numeric references. Unrecognized sequences pass through
/// unchanged.
#[must_use]
pub fn decode_entities(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut rest = input;

    while let Some(start) = rest.find('&') {
        out.push_str(&rest[..start]);
        let tail = &rest[start..];

        match tail[1..].find(';') {
            Some(len) if len > 0 && len <= MAX_ENTITY_LEN => {
                let entity = &tail[1..=len];
                if let Some(decoded) = decode_entity(entity) {
                    out.push(decoded);
                    rest = &tail[len + 2..];
                } else {
                    out.push('&');
                    rest = &tail[1..];
                }
            }
            _ => {
                out.push('&');
                rest = &tail[1..];
            }
        }
    }

    out.push_str(rest);
    out
}

fn decode_entity(entity: &str) -> Option<char> {
    if let Some(num) = entity.strip_prefix('#') {
        let code = if let Some(hex) = num.strip_prefix(['x', 'X']) {
            u32::from_str_radix(hex, 16).ok()?
        } else {
            num.parse::<u32>().ok()?
        };
        return char::from_u32(code);
    }

    match entity {
        "amp" => Some('&'),
        "lt" => Some('<'),
        "gt" => Some('>'),
        "quot" => Some('"'),
        "apos" => Some('\''),
        "nbsp" => Some('\u{a0}'),
        "lsquo" => Some('\u{2018}'),
        "rsquo" => Some('\u{2019}'),
        "ldquo" => Some('\u{201c}'),
        "rdquo" => Some('\u{201d}'),
        "ndash" => Some('\u{2013}'),
        "mdash" => Some('\u{2014}'),
        "hellip" => Some('\u{2026}'),
        "deg" => Some('\u{b0}'),
        "eacute" => Some('\u{e9}'),
        "egrave" => Some('\u{e8}'),
        "auml" => Some('\u{e4}'),
        "ouml" => Some('\u{f6}'),
        "uuml" => Some('\u{fc}'),
        "aring" => Some('\u{e5}'),
        "ntilde" => Some('\u{f1}'),
        "pi" => Some('\u{3c0}'),
        _ => None,
    }
}

// Fisher-Yates: for i from the last index down to 1, draw j in [0, i].
fn shuffle_choices<R: Rng + ?Sized>(choices: &mut [String], rng: &mut R) {
    for i in (1..choices.len()).rev() {
        let j = rng.random_range(0..=i);
        choices.swap(i, j);
    }
}

/// Normalize one raw record: decode every text field, validate, and fix the
/// choice order.
///
/// # Errors
///
/// Returns `QuestionError` when any decoded field is blank or missing; the
/// record is rejected rather than repaired.
pub fn normalize_question<R: Rng + ?Sized>(
    raw: &RawQuestion,
    rng: &mut R,
) -> Result<NormalizedQuestion, QuestionError> {
    let record = QuestionRecord::new(
        decode_entities(&raw.question),
        decode_entities(&raw.correct_answer),
        raw.incorrect_answers
            .iter()
            .map(|answer| decode_entities(answer))
            .collect(),
        decode_entities(&raw.category),
        raw.difficulty,
    )?;
    normalize_record(record, rng)
}

/// Fix a choice order for an already-decoded record (local bank path).
///
/// # Errors
///
/// Returns `QuestionError::ChoiceMismatch` only if the shuffle broke the
/// permutation invariant, which the construction check rules out.
pub fn normalize_record<R: Rng + ?Sized>(
    record: QuestionRecord,
    rng: &mut R,
) -> Result<NormalizedQuestion, QuestionError> {
    let mut choices = Vec::with_capacity(record.choice_count());
    choices.push(record.correct_answer().to_owned());
    choices.extend(record.incorrect_answers().iter().cloned());
    shuffle_choices(&mut choices, rng);

    NormalizedQuestion::new(record, choices)
}

/// Normalize a whole batch, preserving order. The first bad record fails
/// the batch.
///
/// # Errors
///
/// Returns the `QuestionError` of the first record that fails validation.
pub fn normalize_batch<R: Rng + ?Sized>(
    batch: &[RawQuestion],
    rng: &mut R,
) -> Result<Vec<NormalizedQuestion>, QuestionError> {
    batch
        .iter()
        .map(|raw| normalize_question(raw, rng))
        .collect()
}
