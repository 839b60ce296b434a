use serde::{Deserialize, Serialize};

/// Appended to every edit instruction so the provider keeps unmasked pixels intact.
pub const MASK_SCOPE_DIRECTIVE: &str = "Only modify the areas covered by the opaque regions \
of the mask; leave every transparent mask region exactly as in the original image.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StylePreset {
    #[default]
    None,
    Photorealistic,
    Cinematic,
    Anime,
    Watercolor,
    OilPainting,
    DigitalArt,
}

impl StylePreset {
    pub const ALL: [Self; 7] = [
        Self::None,
        Self::Photorealistic,
        Self::Cinematic,
        Self::Anime,
        Self::Watercolor,
        Self::OilPainting,
        Self::DigitalArt,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Photorealistic => "photorealistic",
            Self::Cinematic => "cinematic",
            Self::Anime => "anime",
            Self::Watercolor => "watercolor",
            Self::OilPainting => "oil-painting",
            Self::DigitalArt => "digital-art",
        }
    }

    const fn modifier(self) -> Option<&'static str> {
        match self {
            Self::None => None,
            Self::Photorealistic => Some("photorealistic style, natural lighting, fine detail"),
            Self::Cinematic => Some("cinematic style, dramatic lighting, film still"),
            Self::Anime => Some("anime style, clean line art, vibrant colors"),
            Self::Watercolor => Some("watercolor painting style, soft washes"),
            Self::OilPainting => Some("oil painting style, visible brush strokes"),
            Self::DigitalArt => Some("digital art style, crisp and detailed"),
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        let normalized = value.trim().to_ascii_lowercase().replace(['_', ' '], "-");
        Self::ALL
            .into_iter()
            .find(|preset| preset.as_str() == normalized)
    }
}

/// Builds the text sent to the edit service from the user's instruction.
pub fn compose_prompt(instruction: &str, style: StylePreset) -> String {
    let mut prompt = instruction.trim().to_string();
    if let Some(modifier) = style.modifier() {
        prompt.push_str(", ");
        prompt.push_str(modifier);
    }
    prompt.push_str(". ");
    prompt.push_str(MASK_SCOPE_DIRECTIVE);
    prompt
}
