/// One output quality variant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rendition {
    pub label: String,
    /// Output height in pixels; width follows the source aspect ratio.
    pub height: u32,
    pub video_kbps: u32,
    pub audio_kbps: u32,
}

impl Rendition {
    pub fn new(label: &str, height: u32, video_kbps: u32, audio_kbps: u32) -> Self {
        Self {
            label: label.to_string(),
            height,
            video_kbps,
            audio_kbps,
        }
    }

    /// Peak bandwidth advertised for this variant, in bits per second.
    pub fn bandwidth(&self) -> u64 {
        (self.video_kbps as u64 + self.audio_kbps as u64) * 1000
    }
}

/// The fixed adaptive-bitrate ladder, lowest quality first.
pub fn default_ladder() -> Vec<Rendition> {
    vec![
        Rendition::new("360p", 360, 800, 96),
        Rendition::new("480p", 480, 1400, 128),
        Rendition::new("720p", 720, 2800, 128),
        Rendition::new("1080p", 1080, 5000, 192),
    ]
}
