//! emFEN: base FEN extended with love, anger and sadness sections.
//!
//! ```text
//! <base-FEN> | L: <a>-<b>,... | A: <sq>,... | S: <sq>,...
//! ```
//!
//! Squares are ordered lexicographically (file, then rank), the
//! lexicographically smaller member of a pair comes first, and empty
//! sections are left out.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use shakmaty::{Chess, Square};

use crate::domain::chess::parse_square;
use crate::domain::emotion::{EmotionState, EmotionSummary, LovePair, Timers};
use crate::domain::position::Position;
use crate::domain::rules::RulesAuthority;
use crate::error::{Error, Result};

const SECTION_SEPARATOR: &str = " | ";

fn lex_key(sq: Square) -> (u32, u32) {
    (sq.file().to_u32(), sq.rank().to_u32())
}

fn sorted_names(squares: impl Iterator<Item = Square>) -> Vec<String> {
    let mut squares: Vec<Square> = squares.collect();
    squares.sort_by_key(|&sq| lex_key(sq));
    squares.into_iter().map(|sq| sq.to_string()).collect()
}

/// Canonical emFEN for `position`
pub fn encode<R: RulesAuthority>(position: &Position<R>) -> String {
    let emotions = position.emotions();
    let mut sections = vec![position.rules().to_fen()];

    let mut pairs: Vec<(Square, Square)> = emotions
        .pairs()
        .map(|pair| {
            if lex_key(pair.a()) <= lex_key(pair.b()) {
                (pair.a(), pair.b())
            } else {
                (pair.b(), pair.a())
            }
        })
        .collect();
    pairs.sort_by_key(|&(x, y)| (lex_key(x), lex_key(y)));
    if !pairs.is_empty() {
        let body: Vec<String> = pairs.iter().map(|(x, y)| format!("{x}-{y}")).collect();
        sections.push(format!("L: {}", body.join(",")));
    }

    let angry = sorted_names(emotions.anger().squares());
    if !angry.is_empty() {
        sections.push(format!("A: {}", angry.join(",")));
    }

    let sad = sorted_names(emotions.sadness().squares());
    if !sad.is_empty() {
        sections.push(format!("S: {}", sad.join(",")));
    }

    sections.join(SECTION_SEPARATOR)
}

/// Parse emFEN into a standard chess position
pub fn decode(text: &str) -> Result<Position<Chess>> {
    decode_as(text)
}

/// Parse emFEN using any rules authority for the base FEN
pub fn decode_as<R: RulesAuthority>(text: &str) -> Result<Position<R>> {
    let mut sections = text.split('|').map(str::trim);
    let base = sections
        .next()
        .filter(|base| !base.is_empty())
        .ok_or_else(|| Error::MalformedInput("missing base FEN".to_string()))?;
    let rules = R::from_fen(base)?;

    let mut pairs = None;
    let mut anger = None;
    let mut sadness = None;
    for section in sections {
        let (label, body) = section
            .split_once(':')
            .ok_or_else(|| Error::MalformedInput(format!("section '{section}' has no label")))?;
        let slot = match label.trim() {
            "L" => {
                store(&mut pairs, parse_pairs(body)?, "L")?;
                continue;
            }
            "A" => &mut anger,
            "S" => &mut sadness,
            other => {
                return Err(Error::MalformedInput(format!(
                    "unknown section label '{other}'"
                )));
            }
        };
        store(slot, parse_timers(body)?, label.trim())?;
    }

    let emotions = EmotionState::from_parts(
        pairs.unwrap_or_default(),
        anger.unwrap_or_default(),
        sadness.unwrap_or_default(),
    );
    Position::from_parts(rules, emotions)
}

/// Whether `text` decodes to a consistent position
pub fn validate(text: &str) -> bool {
    decode(text).is_ok()
}

/// Affect counts of an emFEN string
pub fn summary_from_str(text: &str) -> Result<EmotionSummary> {
    decode(text).map(|position| position.emotion_summary())
}

fn store<T>(slot: &mut Option<T>, value: T, label: &str) -> Result<()> {
    if slot.is_some() {
        return Err(Error::MalformedInput(format!(
            "section '{label}' appears twice"
        )));
    }
    *slot = Some(value);
    Ok(())
}

fn items(body: &str) -> Result<Vec<&str>> {
    let body = body.trim();
    if body.is_empty() {
        return Ok(Vec::new());
    }
    body.split(',')
        .map(str::trim)
        .map(|item| {
            if item.is_empty() {
                Err(Error::MalformedInput("empty list item".to_string()))
            } else {
                Ok(item)
            }
        })
        .collect()
}

fn parse_pairs(body: &str) -> Result<BTreeSet<LovePair>> {
    let mut pairs = BTreeSet::new();
    let mut seen = BTreeSet::new();
    for item in items(body)? {
        let (x, y) = item
            .split_once('-')
            .ok_or_else(|| Error::MalformedInput(format!("bad love pair '{item}'")))?;
        let (x, y) = (parse_square(x.trim())?, parse_square(y.trim())?);
        if x == y || !seen.insert(x) || !seen.insert(y) {
            return Err(Error::MalformedInput(format!(
                "square repeated in love section at '{item}'"
            )));
        }
        pairs.insert(LovePair::new(x, y));
    }
    Ok(pairs)
}

fn parse_timers(body: &str) -> Result<Timers> {
    let mut timers = Timers::default();
    for item in items(body)? {
        let sq = parse_square(item)?;
        if timers.is_set(sq) {
            return Err(Error::MalformedInput(format!("duplicate square '{item}'")));
        }
        timers.arm(sq);
    }
    Ok(timers)
}

impl<R: RulesAuthority> fmt::Display for Position<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&encode(self))
    }
}

impl<R: RulesAuthority> FromStr for Position<R> {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        decode_as(s)
    }
}
