//! Lancaster (Paice/Husk) stemming algorithm.
//!
//! The stemmer repeatedly looks up rules by the last letter of the word. A rule
//! is written the way Paice published it, with the ending reversed:
//!
//! ```text
//! "gni3>"   word ends in "ing": remove 3 letters, keep going
//! "mu*2."   word ends in "um" and is still intact: remove 2, stop
//! "nois4j>" word ends in "sion": remove 4, append "j", keep going
//! "rae0."   word ends in "ear": leave it, stop
//! ```
//!
//! A rule only fires when the remaining stem is acceptable: words starting
//! with a vowel must keep at least two letters, others at least three with a
//! vowel (or `y`) in the second or third position.
//!
//! # Examples
//!
//! ```
//! use intent_cascade::analysis::token_filter::stem::Stemmer;
//! use intent_cascade::analysis::token_filter::stem::lancaster::LancasterStemmer;
//!
//! let stemmer = LancasterStemmer::new();
//!
//! assert_eq!(stemmer.stem("maximum"), "maxim");
//! assert_eq!(stemmer.stem("presumably"), "presum");
//! assert_eq!(stemmer.stem("provision"), "provid");
//! ```

use std::collections::HashMap;

use crate::analysis::token_filter::stem::Stemmer;
use crate::error::{IntentError, Result};

/// The standard Paice/Husk rule table.
pub const DEFAULT_RULES: &[&str] = &[
    "ai*2.", "a*1.", "bb1.", "city3s.", "ci2>", "cn1t>", "dd1.", "dei3y>", "deec2ss.", "dee1.",
    "de2>", "dooh4>", "e1>", "feil1v.", "fi2>", "gni3>", "gai3y.", "ga2>", "gg1.", "ht*2.",
    "hsiug5ct.", "hsi3>", "i*1.", "i1y>", "ji1d.", "juf1s.", "ju1d.", "jo1d.", "jeh1r.",
    "jrev1t.", "jsim2t.", "jn1d.", "j1s.", "lbaifi6.", "lbai4y.", "lba3>", "lbi3.", "lib2l>",
    "lc1.", "lufi4y.", "luf3>", "lu2.", "lai3>", "lau3>", "la2>", "ll1.", "mui3.", "mu*2.",
    "msi3>", "mm1.", "nois4j>", "noix4ct.", "noi3>", "nai3>", "na2>", "nee0.", "ne2>", "nn1.",
    "pihs4>", "pp1.", "re2>", "rae0.", "ra2.", "ro2>", "ru2>", "rr1.", "rt1>", "rei3y>",
    "sei3y>", "sis2.", "si2>", "ssen4>", "ss0.", "suo3>", "su*2.", "s*1>", "s0.", "tacilp4y.",
    "ta2>", "tnem4>", "tne3>", "tna3>", "tpir2b.", "tpro2b.", "tcud1.", "tpmus2.", "tpec2iv.",
    "tulo2v.", "tsis0.", "tsi3>", "tt1.", "uqi3.", "ugo1.", "vis3j>", "vie0.", "vi2>", "ylb1>",
    "yli3y>", "ylp0.", "yl2>", "ygo1.", "yhp1.", "ymo1.", "ypo1.", "yti3>", "yte3>", "ytl2.",
    "yrtsi5.", "yra3>", "yro3>", "yfi3.", "ycn2t>", "yca3>", "zi2>", "zy1s.",
];

/// A single parsed stemming rule.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Rule {
    /// Ending in reading order (the table stores it reversed).
    ending: Vec<char>,
    /// Only applies to a word no rule has touched yet.
    intact_only: bool,
    /// Letters removed from the end.
    remove: usize,
    /// Letters appended after removal.
    append: String,
    /// Whether stemming continues after this rule fires.
    proceed: bool,
}

impl Rule {
    fn parse(rule: &str) -> Result<Self> {
        let invalid = || IntentError::analysis(format!("Invalid stemming rule: {rule:?}"));

        let chars: Vec<char> = rule.chars().collect();
        let (last, body) = chars.split_last().ok_or_else(invalid)?;
        let proceed = match last {
            '>' => true,
            '.' => false,
            _ => return Err(invalid()),
        };

        let digit_at = body
            .iter()
            .position(|c| c.is_ascii_digit())
            .ok_or_else(invalid)?;
        let mut ending_end = digit_at;
        let intact_only = digit_at > 0 && body[digit_at - 1] == '*';
        if intact_only {
            ending_end -= 1;
        }
        if ending_end == 0 {
            return Err(invalid());
        }

        let reversed_ending = &body[..ending_end];
        if !reversed_ending.iter().all(|c| c.is_ascii_lowercase()) {
            return Err(invalid());
        }
        let append: String = body[digit_at + 1..].iter().collect();
        if !append.chars().all(|c| c.is_ascii_lowercase()) {
            return Err(invalid());
        }

        Ok(Rule {
            ending: reversed_ending.iter().rev().copied().collect(),
            intact_only,
            remove: body[digit_at].to_digit(10).ok_or_else(invalid)? as usize,
            append,
            proceed,
        })
    }

    fn matches(&self, word: &[char]) -> bool {
        word.ends_with(&self.ending)
    }
}

/// Lancaster stemmer.
///
/// More aggressive than Porter: "open" becomes "op", "running" becomes "run".
#[derive(Debug, Clone)]
pub struct LancasterStemmer {
    /// Rules keyed by the last letter of the ending, in table order.
    rules: HashMap<char, Vec<Rule>>,
}

impl LancasterStemmer {
    /// Create a stemmer with the standard rule table.
    pub fn new() -> Self {
        // The built-in table is covered by tests; parsing it cannot fail.
        Self::with_rules(DEFAULT_RULES).unwrap_or_else(|_| LancasterStemmer {
            rules: HashMap::new(),
        })
    }

    /// Create a stemmer with a custom rule table.
    pub fn with_rules(rules: &[&str]) -> Result<Self> {
        let mut indexed: HashMap<char, Vec<Rule>> = HashMap::new();
        for rule in rules {
            let parsed = Rule::parse(rule)?;
            let key = *parsed
                .ending
                .last()
                .ok_or_else(|| IntentError::analysis("Empty rule ending"))?;
            indexed.entry(key).or_default().push(parsed);
        }
        Ok(LancasterStemmer { rules: indexed })
    }

    fn is_vowel(c: char) -> bool {
        matches!(c, 'a' | 'e' | 'i' | 'o' | 'u' | 'y')
    }

    /// Whether removing `remove` letters leaves an acceptable stem.
    fn is_acceptable(word: &[char], remove: usize) -> bool {
        let Some(remaining) = word.len().checked_sub(remove) else {
            return false;
        };
        if Self::is_vowel(word[0]) {
            remaining >= 2
        } else {
            remaining >= 3 && (Self::is_vowel(word[1]) || Self::is_vowel(word[2]))
        }
    }

    /// Index of the last letter of the word's leading alphabetic run.
    fn last_letter(word: &[char]) -> Option<usize> {
        word.iter()
            .take_while(|c| c.is_alphabetic())
            .count()
            .checked_sub(1)
    }

    fn apply(&self, word: &str) -> String {
        let mut current: Vec<char> = word.chars().collect();
        let mut intact = true;

        loop {
            let Some(last) = Self::last_letter(&current) else {
                break;
            };
            let Some(candidates) = self.rules.get(&current[last]) else {
                break;
            };

            let fired = candidates.iter().find(|rule| {
                rule.matches(&current)
                    && (!rule.intact_only || intact)
                    && Self::is_acceptable(&current, rule.remove)
            });

            match fired {
                Some(rule) => {
                    current.truncate(current.len() - rule.remove);
                    current.extend(rule.append.chars());
                    intact = false;
                    if !rule.proceed {
                        break;
                    }
                }
                None => break,
            }
        }

        current.into_iter().collect()
    }
}

impl Default for LancasterStemmer {
    fn default() -> Self {
        Self::new()
    }
}

impl Stemmer for LancasterStemmer {
    fn stem(&self, word: &str) -> String {
        self.apply(&word.to_lowercase())
    }

    fn name(&self) -> &'static str {
        "lancaster"
    }
}
