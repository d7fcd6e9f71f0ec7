//! Built-in orthographic variant presets.
//!
//! Each preset rewrites a kanji spelling to the form preferred in clinic and
//! customer-facing copy (e.g. "下さい" → "ください").

/// A built-in correction pair, selectable by its `wrong` key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Preset {
    pub wrong: &'static str,
    pub correct: &'static str,
}

/// Presets in display order.
pub const PRESETS: &[Preset] = &[
    Preset {
        wrong: "下さ",
        correct: "くださ",
    },
    Preset {
        wrong: "頂",
        correct: "いただ",
    },
    Preset {
        wrong: "虫歯",
        correct: "むし歯",
    },
    Preset {
        wrong: "出来",
        correct: "でき",
    },
    Preset {
        wrong: "致し",
        correct: "いたし",
    },
    Preset {
        wrong: "当クリニック",
        correct: "当院",
    },
];

/// Looks up a preset by its key.
pub fn find(key: &str) -> Option<&'static Preset> {
    PRESETS.iter().find(|p| p.wrong == key)
}

/// Returns every preset key, in display order.
pub fn keys() -> impl Iterator<Item = &'static str> {
    PRESETS.iter().map(|p| p.wrong)
}
