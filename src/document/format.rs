//! Character-level formatting of a run.
//!
//! Every field is optional: `None` means "inherit from the paragraph or
//! style", not "off". Copying a format onto another run only copies the
//! fields that are set.

/// Font faces for the four script slots of a run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FontFamily {
    pub ascii: Option<String>,
    pub h_ansi: Option<String>,
    pub east_asia: Option<String>,
    pub cs: Option<String>,
}

impl FontFamily {
    pub fn is_empty(&self) -> bool {
        self.ascii.is_none() && self.h_ansi.is_none() && self.east_asia.is_none() && self.cs.is_none()
    }

    fn apply_to(&self, dest: &mut FontFamily) {
        copy_set(&self.ascii, &mut dest.ascii);
        copy_set(&self.h_ansi, &mut dest.h_ansi);
        copy_set(&self.east_asia, &mut dest.east_asia);
        copy_set(&self.cs, &mut dest.cs);
    }
}

/// Subscript / superscript positioning.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerticalAlign {
    Baseline,
    Superscript,
    Subscript,
}

impl VerticalAlign {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "baseline" => Some(Self::Baseline),
            "superscript" => Some(Self::Superscript),
            "subscript" => Some(Self::Subscript),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Baseline => "baseline",
            Self::Superscript => "superscript",
            Self::Subscript => "subscript",
        }
    }
}

/// Run property that has no dedicated field, kept as its raw XML.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawProperty {
    /// Local element name, used to keep schema order on output
    pub name: String,
    pub xml: String,
}

/// Formatting record of a single run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunFormat {
    /// Character style id
    pub style: Option<String>,
    pub fonts: FontFamily,
    pub bold: Option<bool>,
    pub italic: Option<bool>,
    pub cs_bold: Option<bool>,
    pub cs_italic: Option<bool>,
    pub small_caps: Option<bool>,
    pub strike: Option<bool>,
    pub outline: Option<bool>,
    pub shadow: Option<bool>,
    /// Hex RGB such as `FF0000`, or `auto`
    pub color: Option<String>,
    /// Font size in half-points
    pub size: Option<u32>,
    pub highlight: Option<String>,
    /// Underline kind such as `single` or `double`
    pub underline: Option<String>,
    pub vertical_align: Option<VerticalAlign>,
    pub rtl: Option<bool>,
    pub extra: Vec<RawProperty>,
}

impl RunFormat {
    pub fn bold() -> Self {
        Self {
            bold: Some(true),
            ..Default::default()
        }
    }

    pub fn italic() -> Self {
        Self {
            italic: Some(true),
            ..Default::default()
        }
    }

    /// Returns true when no property is set.
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Primary font name, preferring the Latin slot as word processors do.
    pub fn font_name(&self) -> Option<&str> {
        self.fonts
            .ascii
            .as_deref()
            .or(self.fonts.east_asia.as_deref())
    }

    /// Copies every set field onto `dest`. Unset fields leave `dest` alone.
    pub fn apply_to(&self, dest: &mut RunFormat) {
        copy_set(&self.style, &mut dest.style);
        self.fonts.apply_to(&mut dest.fonts);
        copy_set(&self.bold, &mut dest.bold);
        copy_set(&self.italic, &mut dest.italic);
        copy_set(&self.cs_bold, &mut dest.cs_bold);
        copy_set(&self.cs_italic, &mut dest.cs_italic);
        copy_set(&self.small_caps, &mut dest.small_caps);
        copy_set(&self.strike, &mut dest.strike);
        copy_set(&self.outline, &mut dest.outline);
        copy_set(&self.shadow, &mut dest.shadow);
        copy_set(&self.color, &mut dest.color);
        copy_set(&self.size, &mut dest.size);
        copy_set(&self.highlight, &mut dest.highlight);
        copy_set(&self.underline, &mut dest.underline);
        copy_set(&self.vertical_align, &mut dest.vertical_align);
        copy_set(&self.rtl, &mut dest.rtl);
        for prop in &self.extra {
            match dest.extra.iter_mut().find(|p| p.name == prop.name) {
                Some(existing) => existing.xml = prop.xml.clone(),
                None => dest.extra.push(prop.clone()),
            }
        }
    }
}

fn copy_set<T: Clone>(src: &Option<T>, dest: &mut Option<T>) {
    if let Some(value) = src {
        *dest = Some(value.clone());
    }
}
