//! Embed color handling and the live preview shown next to the embed form.

use url::Url;

pub const DEFAULT_EMBED_COLOR_HEX: &str = "#00e5a8";
pub const DEFAULT_EMBED_COLOR: u32 = 0x00E5A8;
pub const PREVIEW_TITLE_FALLBACK: &str = "Embed title";
pub const PREVIEW_DESCRIPTION_FALLBACK: &str = "The embed description will appear here...";

/// True for `#RRGGBB`, case-insensitive.
pub fn is_hex_color(value: &str) -> bool {
    value
        .strip_prefix('#')
        .is_some_and(|digits| digits.len() == 6 && digits.bytes().all(|b| b.is_ascii_hexdigit()))
}

/// `#RRGGBB` to its base-10 value; `None` for anything else.
pub fn hex_to_decimal(value: &str) -> Option<u32> {
    if !is_hex_color(value) {
        return None;
    }
    u32::from_str_radix(&value[1..], 16).ok()
}

/// Color picker plus free-text hex entry, kept in sync both ways.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColorField {
    picker: String,
    hex_text: String,
}

impl Default for ColorField {
    fn default() -> Self {
        Self {
            picker: DEFAULT_EMBED_COLOR_HEX.to_string(),
            hex_text: DEFAULT_EMBED_COLOR_HEX.to_string(),
        }
    }
}

impl ColorField {
    pub fn picker(&self) -> &str {
        &self.picker
    }

    pub fn hex_text(&self) -> &str {
        &self.hex_text
    }

    /// A picker only ever produces valid colors; anything else is ignored.
    pub fn set_from_picker(&mut self, value: &str) -> bool {
        if !is_hex_color(value) {
            return false;
        }
        self.picker = value.to_string();
        self.hex_text = value.to_string();
        true
    }

    /// Text entry is free-form; the picker follows only once the text is a
    /// complete `#RRGGBB`.
    pub fn set_from_hex_text(&mut self, value: &str) -> bool {
        self.hex_text = value.to_string();
        if is_hex_color(value) {
            self.picker = value.to_string();
            true
        } else {
            false
        }
    }

    pub fn decimal(&self) -> u32 {
        hex_to_decimal(&self.picker).unwrap_or(DEFAULT_EMBED_COLOR)
    }
}

/// Raw embed form values as typed.
#[derive(Debug, Clone, Copy)]
pub struct EmbedFields<'a> {
    pub title: &'a str,
    pub description: &'a str,
    pub color: &'a str,
    pub footer: &'a str,
    pub image_url: &'a str,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmbedPreview {
    pub title: String,
    pub description: String,
    pub accent_color: String,
    pub footer: Option<String>,
    pub image: Option<Url>,
}

impl Default for EmbedPreview {
    fn default() -> Self {
        render_preview(&EmbedFields {
            title: "",
            description: "",
            color: DEFAULT_EMBED_COLOR_HEX,
            footer: "",
            image_url: "",
        })
    }
}

pub fn render_preview(fields: &EmbedFields<'_>) -> EmbedPreview {
    let or_fallback = |value: &str, fallback: &str| {
        if value.is_empty() {
            fallback.to_string()
        } else {
            value.to_string()
        }
    };

    EmbedPreview {
        title: or_fallback(fields.title, PREVIEW_TITLE_FALLBACK),
        description: or_fallback(fields.description, PREVIEW_DESCRIPTION_FALLBACK),
        accent_color: fields.color.to_string(),
        footer: (!fields.footer.is_empty()).then(|| fields.footer.to_string()),
        image: preview_image(fields.image_url),
    }
}

fn preview_image(raw: &str) -> Option<Url> {
    if raw.is_empty() {
        return None;
    }
    Url::parse(raw).ok()
}
