//! Minimal HLS playlist model: enough to write and read back the master and
//! variant playlists the engine produces.

use std::fmt::Write as _;
use std::path::Path;
use tokio::fs::File;
use tokio::io::AsyncWriteExt;

#[derive(Debug, Clone, PartialEq)]
pub struct VariantStream {
    pub bandwidth: u64,
    pub resolution: Option<String>,
    pub codecs: Option<String>,
    pub uri: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MasterPlaylist {
    pub version: u8,
    pub variants: Vec<VariantStream>,
}

impl MasterPlaylist {
    pub fn new() -> Self {
        Self {
            version: 3,
            variants: Vec::new(),
        }
    }

    pub fn add_variant(&mut self, bandwidth: u64, uri: String) {
        self.variants.push(VariantStream {
            bandwidth,
            resolution: None,
            codecs: None,
            uri,
        });
    }

    pub fn variant_uris(&self) -> Vec<&str> {
        self.variants.iter().map(|v| v.uri.as_str()).collect()
    }

    pub fn parse(content: &str) -> Result<Self, String> {
        let mut lines = content.lines().map(str::trim).filter(|l| !l.is_empty());
        if lines.next() != Some("#EXTM3U") {
            return Err("missing #EXTM3U header".to_string());
        }

        let mut playlist = MasterPlaylist::new();
        let mut pending: Option<VariantStream> = None;

        for line in lines {
            if let Some(version) = line.strip_prefix("#EXT-X-VERSION:") {
                playlist.version = version
                    .parse()
                    .map_err(|_| format!("bad version {:?}", version))?;
            } else if let Some(attrs) = line.strip_prefix("#EXT-X-STREAM-INF:") {
                let mut variant = VariantStream {
                    bandwidth: 0,
                    resolution: None,
                    codecs: None,
                    uri: String::new(),
                };
                for (name, value) in parse_attributes(attrs) {
                    match name {
                        "BANDWIDTH" => {
                            variant.bandwidth = value
                                .parse()
                                .map_err(|_| format!("bad BANDWIDTH {:?}", value))?
                        }
                        "RESOLUTION" => variant.resolution = Some(value.to_string()),
                        "CODECS" => variant.codecs = Some(value.to_string()),
                        _ => {}
                    }
                }
                pending = Some(variant);
            } else if !line.starts_with('#') {
                let mut variant = pending
                    .take()
                    .ok_or_else(|| format!("URI {:?} without #EXT-X-STREAM-INF", line))?;
                variant.uri = line.to_string();
                playlist.variants.push(variant);
            }
        }

        if pending.is_some() {
            return Err("#EXT-X-STREAM-INF without URI".to_string());
        }
        Ok(playlist)
    }

    pub fn render(&self) -> String {
        let mut out = String::from("#EXTM3U\n");
        let _ = writeln!(out, "#EXT-X-VERSION:{}", self.version);
        for variant in &self.variants {
            let _ = write!(out, "#EXT-X-STREAM-INF:BANDWIDTH={}", variant.bandwidth);
            if let Some(resolution) = &variant.resolution {
                let _ = write!(out, ",RESOLUTION={}", resolution);
            }
            if let Some(codecs) = &variant.codecs {
                let _ = write!(out, ",CODECS=\"{}\"", codecs);
            }
            let _ = writeln!(out);
            let _ = writeln!(out, "{}", variant.uri);
        }
        out
    }

    pub async fn write_to(&self, path: &Path) -> Result<(), std::io::Error> {
        let mut file = File::create(path).await?;
        file.write_all(self.render().as_bytes()).await?;
        file.flush().await
    }
}

impl Default for MasterPlaylist {
    fn default() -> Self {
        Self::new()
    }
}

pub struct MediaSegment {
    pub duration: f64,
    pub uri: String,
}

pub struct MediaPlaylist {
    pub version: u8,
    pub target_duration: u64,
    pub media_sequence: u64,
    pub segments: Vec<MediaSegment>,
    pub end_list: bool,
}

impl MediaPlaylist {
    pub fn new(target_duration: u64) -> Self {
        Self {
            version: 3,
            target_duration,
            media_sequence: 0,
            segments: Vec::new(),
            end_list: true,
        }
    }

    pub fn add_segment(&mut self, duration: f64, uri: String) {
        self.segments.push(MediaSegment { duration, uri });
    }

    pub fn parse(content: &str) -> Result<Self, String> {
        let mut lines = content.lines().map(str::trim).filter(|l| !l.is_empty());
        if lines.next() != Some("#EXTM3U") {
            return Err("missing #EXTM3U header".to_string());
        }

        let mut playlist = MediaPlaylist::new(0);
        playlist.end_list = false;
        let mut pending: Option<f64> = None;

        for line in lines {
            if let Some(value) = line.strip_prefix("#EXT-X-TARGETDURATION:") {
                playlist.target_duration = value
                    .parse()
                    .map_err(|_| format!("bad target duration {:?}", value))?;
            } else if let Some(value) = line.strip_prefix("#EXT-X-MEDIA-SEQUENCE:") {
                playlist.media_sequence = value
                    .parse()
                    .map_err(|_| format!("bad media sequence {:?}", value))?;
            } else if let Some(value) = line.strip_prefix("#EXT-X-VERSION:") {
                playlist.version = value
                    .parse()
                    .map_err(|_| format!("bad version {:?}", value))?;
            } else if let Some(value) = line.strip_prefix("#EXTINF:") {
                let duration = value.split(',').next().unwrap_or_default();
                pending = Some(
                    duration
                        .parse()
                        .map_err(|_| format!("bad segment duration {:?}", duration))?,
                );
            } else if line == "#EXT-X-ENDLIST" {
                playlist.end_list = true;
            } else if !line.starts_with('#') {
                let duration = pending
                    .take()
                    .ok_or_else(|| format!("segment {:?} without #EXTINF", line))?;
                playlist.add_segment(duration, line.to_string());
            }
        }

        Ok(playlist)
    }

    pub fn render(&self) -> String {
        let mut out = String::from("#EXTM3U\n");
        let _ = writeln!(out, "#EXT-X-VERSION:{}", self.version);
        let _ = writeln!(out, "#EXT-X-TARGETDURATION:{}", self.target_duration);
        let _ = writeln!(out, "#EXT-X-MEDIA-SEQUENCE:{}", self.media_sequence);
        for segment in &self.segments {
            let _ = writeln!(out, "#EXTINF:{:.6},", segment.duration);
            let _ = writeln!(out, "{}", segment.uri);
        }
        if self.end_list {
            out.push_str("#EXT-X-ENDLIST\n");
        }
        out
    }

    pub async fn write_to(&self, path: &Path) -> Result<(), std::io::Error> {
        let mut file = File::create(path).await?;
        file.write_all(self.render().as_bytes()).await?;
        file.flush().await
    }
}

/// Split an attribute list, honouring quoted values (`CODECS="a,b"`).
fn parse_attributes(attrs: &str) -> Vec<(&str, &str)> {
    let mut out = Vec::new();
    let mut rest = attrs;
    while !rest.is_empty() {
        let Some(eq) = rest.find('=') else { break };
        let name = rest[..eq].trim();
        let after = &rest[eq + 1..];
        let (value, remainder) = if let Some(quoted) = after.strip_prefix('"') {
            match quoted.find('"') {
                Some(end) => (&quoted[..end], &quoted[end + 1..]),
                None => (quoted, ""),
            }
        } else {
            match after.find(',') {
                Some(end) => (&after[..end], &after[end..]),
                None => (after, ""),
            }
        };
        out.push((name, value));
        rest = remainder.strip_prefix(',').unwrap_or(remainder);
    }
    out
}
