//! Correction map and the literal substitution engine.
//!
//! Substitution is sequential: every pair is applied, in map order, to the
//! result of the pairs before it. A replacement that itself contains a later
//! key is therefore substituted again. That is long-standing behavior and is
//! kept as is.

use super::presets;
use crate::error::{HyokiError, HyokiResult};

/// Markup wrapped around each replacement in the display rendering.
const HIGHLIGHT_OPEN: &str = "<span style=\"color:red;\">";
const HIGHLIGHT_CLOSE: &str = "</span>";

/// Separator between key and value in free-form correction lines.
const FREEFORM_SEPARATOR: char = ':';

/// A single literal find/replace pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Correction {
    pub wrong: String,
    pub correct: String,
}

/// Ordered mapping from a literal "wrong" string to its "correct" form.
///
/// Keys are never empty. Inserting an existing key replaces its value but
/// keeps its original position.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CorrectionMap {
    entries: Vec<Correction>,
}

impl CorrectionMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds the map for one request: selected presets first, then free-form
    /// `key:value` lines.
    ///
    /// # Errors
    /// Returns `InvalidInput` if a selected preset key is not built in.
    pub fn from_selection(selected: &[String], freeform: &str) -> HyokiResult<Self> {
        let mut map = Self::new();
        map.extend_from_presets(selected)?;
        map.extend_from_lines(freeform);
        Ok(map)
    }

    /// Inserts a pair. Returns false (and stores nothing) for an empty key.
    pub fn insert(&mut self, wrong: impl Into<String>, correct: impl Into<String>) -> bool {
        let wrong = wrong.into();
        if wrong.is_empty() {
            return false;
        }
        let correct = correct.into();
        match self.entries.iter_mut().find(|c| c.wrong == wrong) {
            Some(existing) => existing.correct = correct,
            None => self.entries.push(Correction { wrong, correct }),
        }
        true
    }

    /// Adds the built-in presets named by `selected`, in selection order.
    pub fn extend_from_presets(&mut self, selected: &[String]) -> HyokiResult<()> {
        for key in selected {
            let preset = presets::find(key).ok_or_else(|| HyokiError::InvalidInput {
                parameter: "preset".to_string(),
                reason: format!("unknown preset '{}'", key),
            })?;
            self.insert(preset.wrong, preset.correct);
        }
        Ok(())
    }

    /// Adds every well-formed `key:value` line. Lines without a separator or
    /// with an empty key are dropped silently.
    ///
    /// Only the first two segments count, so `a:b:c` maps `a` to `b`.
    pub fn extend_from_lines(&mut self, lines: &str) -> usize {
        let mut added = 0;
        for line in lines.split('\n') {
            let line = line.strip_suffix('\r').unwrap_or(line);
            if !line.contains(FREEFORM_SEPARATOR) {
                continue;
            }
            let mut parts = line.split(FREEFORM_SEPARATOR);
            let wrong = parts.next().unwrap_or_default();
            let correct = parts.next().unwrap_or_default();
            if self.insert(wrong, correct) {
                added += 1;
            }
        }
        added
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, wrong: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|c| c.wrong == wrong)
            .map(|c| c.correct.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = &Correction> {
        self.entries.iter()
    }

    /// Applies every pair in order and returns the plain corrected text.
    pub fn apply_output(&self, text: &str) -> String {
        self.entries
            .iter()
            .fold(text.to_string(), |acc, c| acc.replace(&c.wrong, &c.correct))
    }

    /// Applies every pair in order, wrapping each replacement in highlight
    /// markup for display.
    pub fn apply_display(&self, text: &str) -> String {
        self.entries.iter().fold(text.to_string(), |acc, c| {
            let flagged = format!("{}{}{}", HIGHLIGHT_OPEN, c.correct, HIGHLIGHT_CLOSE);
            acc.replace(&c.wrong, &flagged)
        })
    }

    /// Counts the substitutions `apply_output` performs on `text`.
    pub fn count_matches(&self, text: &str) -> usize {
        let mut current = text.to_string();
        let mut count = 0;
        for c in &self.entries {
            let hits = current.matches(c.wrong.as_str()).count();
            if hits > 0 {
                count += hits;
                current = current.replace(&c.wrong, &c.correct);
            }
        }
        count
    }
}

impl<'a> IntoIterator for &'a CorrectionMap {
    type Item = &'a Correction;
    type IntoIter = std::slice::Iter<'a, Correction>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for CorrectionMap {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = Self::new();
        for (wrong, correct) in iter {
            map.insert(wrong, correct);
        }
        map
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_replaces_literal() {
        let map: CorrectionMap = [("下さ", "くださ")].into_iter().collect();
        assert_eq!(map.apply_output("お待ち下さい"), "お待ちください");
    }

    #[test]
    fn test_display_wraps_only_replacement() {
        let map: CorrectionMap = [("下さ", "くださ")].into_iter().collect();
        assert_eq!(
            map.apply_display("お待ち下さい"),
            "お待ち<span style=\"color:red;\">くださ</span>い"
        );
    }

    #[test]
    fn test_empty_key_rejected() {
        let mut map = CorrectionMap::new();
        assert!(!map.insert("", "x"));
        assert!(map.is_empty());
    }

    #[test]
    fn test_insert_existing_key_keeps_position() {
        let mut map = CorrectionMap::new();
        map.insert("a", "1");
        map.insert("b", "2");
        map.insert("a", "3");
        let keys: Vec<_> = map.iter().map(|c| c.wrong.as_str()).collect();
        assert_eq!(keys, vec!["a", "b"]);
        assert_eq!(map.get("a"), Some("3"));
    }

    #[test]
    fn test_freeform_lines() {
        let mut map = CorrectionMap::new();
        let added = map.extend_from_lines("内科:ナイカ\nno separator\n:empty key\na:b:c\r\n");
        assert_eq!(added, 2);
        assert_eq!(map.get("内科"), Some("ナイカ"));
        assert_eq!(map.get("a"), Some("b"));
        assert_eq!(map.len(), 2);
    }

    #[test]
    fn test_freeform_fullwidth_colon_is_not_a_separator() {
        let mut map = CorrectionMap::new();
        assert_eq!(map.extend_from_lines("内科：ナイカ"), 0);
    }

    #[test]
    fn test_sequential_rematch() {
        // "b" produced by the first pair is rewritten by the second.
        let map: CorrectionMap = [("a", "b"), ("b", "c")].into_iter().collect();
        assert_eq!(map.apply_output("a"), "c");
        assert_eq!(map.count_matches("ab"), 3);
    }

    #[test]
    fn test_unknown_preset() {
        let err = CorrectionMap::from_selection(&["存在しない".to_string()], "").unwrap_err();
        assert!(matches!(err, HyokiError::InvalidInput { .. }));
    }
}
