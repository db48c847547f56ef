//! Declarative encoding plan for a single multi-output ffmpeg invocation.
//!
//! The video stream is decoded once, split into one copy per rendition, then
//! scaled, encoded and segmented into HLS. Output layout:
//!
//! ```text
//! <output_dir>/master.m3u8
//! <output_dir>/<index>/playlist.m3u8
//! <output_dir>/<index>/segment<n>.ts
//! ```

use super::rendition::Rendition;
use std::ffi::OsString;
use std::path::{Path, PathBuf};

pub const SEGMENT_SECONDS: u32 = 6;
pub const MASTER_PLAYLIST: &str = "master.m3u8";
pub const VARIANT_PLAYLIST: &str = "playlist.m3u8";
pub const SEGMENT_PATTERN: &str = "segment%d.ts";

const VIDEO_CODEC: &str = "libx264";
const AUDIO_CODEC: &str = "aac";

#[derive(Debug, Clone)]
pub struct EncodingPlan {
    pub input: PathBuf,
    pub output_dir: PathBuf,
    pub renditions: Vec<Rendition>,
    pub segment_seconds: u32,
}

impl EncodingPlan {
    pub fn new(input: &Path, output_dir: &Path, renditions: Vec<Rendition>) -> Self {
        Self {
            input: input.to_path_buf(),
            output_dir: output_dir.to_path_buf(),
            renditions,
            segment_seconds: SEGMENT_SECONDS,
        }
    }

    /// Absolute path of the master playlist.
    pub fn master_playlist_path(&self) -> PathBuf {
        self.output_dir.join(MASTER_PLAYLIST)
    }

    /// Per-rendition output directories, in rendition order.
    pub fn variant_dirs(&self) -> Vec<PathBuf> {
        (0..self.renditions.len())
            .map(|idx| self.output_dir.join(idx.to_string()))
            .collect()
    }

    /// Variant playlist URIs as referenced from the master playlist.
    pub fn variant_playlists(&self) -> Vec<String> {
        (0..self.renditions.len())
            .map(|idx| format!("{}/{}", idx, VARIANT_PLAYLIST))
            .collect()
    }

    fn filter_graph(&self) -> String {
        let count = self.renditions.len();
        let splits: String = (0..count).map(|idx| format!("[v{}]", idx)).collect();
        let mut graph = format!("[0:v]split={}{}", count, splits);
        for (idx, rendition) in self.renditions.iter().enumerate() {
            // -2 keeps the aspect ratio with an even width
            graph.push_str(&format!(
                "; [v{idx}]scale=-2:{height}[out{idx}]",
                idx = idx,
                height = rendition.height
            ));
        }
        graph
    }

    fn var_stream_map(&self) -> String {
        (0..self.renditions.len())
            .map(|idx| format!("v:{idx},a:{idx}", idx = idx))
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Command-line arguments for the engine, excluding the program name.
    pub fn to_args(&self) -> Vec<OsString> {
        let mut args: Vec<OsString> = vec![
            "-hide_banner".into(),
            "-i".into(),
            self.input.clone().into(),
            "-filter_complex".into(),
            self.filter_graph().into(),
        ];

        for (idx, rendition) in self.renditions.iter().enumerate() {
            args.extend(
                [
                    "-map".to_string(),
                    format!("[out{}]", idx),
                    format!("-c:v:{}", idx),
                    VIDEO_CODEC.to_string(),
                    format!("-b:v:{}", idx),
                    format!("{}k", rendition.video_kbps),
                    "-map".to_string(),
                    "0:a:0".to_string(),
                    format!("-c:a:{}", idx),
                    AUDIO_CODEC.to_string(),
                    format!("-b:a:{}", idx),
                    format!("{}k", rendition.audio_kbps),
                ]
                .into_iter()
                .map(OsString::from),
            );
        }

        args.extend(
            [
                "-var_stream_map".to_string(),
                self.var_stream_map(),
                "-master_pl_name".to_string(),
                MASTER_PLAYLIST.to_string(),
                "-f".to_string(),
                "hls".to_string(),
                "-hls_time".to_string(),
                self.segment_seconds.to_string(),
                "-hls_list_size".to_string(),
                "0".to_string(),
                "-hls_segment_filename".to_string(),
            ]
            .into_iter()
            .map(OsString::from),
        );
        args.push(self.output_dir.join("%v").join(SEGMENT_PATTERN).into());
        args.push(self.output_dir.join("%v").join(VARIANT_PLAYLIST).into());
        args
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::rendition::default_ladder;

    fn plan() -> EncodingPlan {
        EncodingPlan::new(
            Path::new("/tmp/abc123.mp4"),
            Path::new("/tmp/processed_abc123"),
            default_ladder(),
        )
    }

    fn args(plan: &EncodingPlan) -> Vec<String> {
        plan.to_args()
            .into_iter()
            .map(|arg| arg.to_string_lossy().to_string())
            .collect()
    }

    fn value_after<'a>(args: &'a [String], flag: &str) -> Vec<&'a str> {
        args.windows(2)
            .filter(|pair| pair[0] == flag)
            .map(|pair| pair[1].as_str())
            .collect()
    }

    #[test]
    fn test_filter_graph_splits_once_per_rendition() {
        let plan = plan();
        assert_eq!(
            plan.filter_graph(),
            "[0:v]split=4[v0][v1][v2][v3]; \
             [v0]scale=-2:360[out0]; \
             [v1]scale=-2:480[out1]; \
             [v2]scale=-2:720[out2]; \
             [v3]scale=-2:1080[out3]"
        );
    }

    #[test]
    fn test_single_master_with_one_variant_per_rendition() {
        let plan = plan();
        let args = args(&plan);

        assert_eq!(value_after(&args, "-master_pl_name"), vec!["master.m3u8"]);
        assert_eq!(
            value_after(&args, "-var_stream_map"),
            vec!["v:0,a:0 v:1,a:1 v:2,a:2 v:3,a:3"]
        );
        assert_eq!(
            plan.variant_playlists(),
            vec![
                "0/playlist.m3u8",
                "1/playlist.m3u8",
                "2/playlist.m3u8",
                "3/playlist.m3u8"
            ]
        );
    }

    #[test]
    fn test_variant_count_follows_rendition_set() {
        let renditions = vec![
            Rendition::new("240p", 240, 400, 64),
            Rendition::new("720p", 720, 2800, 128),
        ];
        let plan = EncodingPlan::new(Path::new("in.mp4"), Path::new("out"), renditions);
        let args = args(&plan);

        assert_eq!(value_after(&args, "-master_pl_name").len(), 1);
        assert_eq!(value_after(&args, "-var_stream_map"), vec!["v:0,a:0 v:1,a:1"]);
        assert_eq!(plan.variant_dirs(), vec![PathBuf::from("out/0"), PathBuf::from("out/1")]);
        assert_eq!(value_after(&args, "-map").len(), 4);
    }

    #[test]
    fn test_encode_parameters() {
        let args = args(&plan());

        assert_eq!(value_after(&args, "-b:v:0"), vec!["800k"]);
        assert_eq!(value_after(&args, "-b:a:0"), vec!["96k"]);
        assert_eq!(value_after(&args, "-b:v:3"), vec!["5000k"]);
        assert_eq!(value_after(&args, "-b:a:3"), vec!["192k"]);
        assert_eq!(value_after(&args, "-c:v:2"), vec!["libx264"]);
        assert_eq!(value_after(&args, "-c:a:2"), vec!["aac"]);
    }

    #[test]
    fn test_segmenting_parameters() {
        let args = args(&plan());

        assert_eq!(value_after(&args, "-i"), vec!["/tmp/abc123.mp4"]);
        assert_eq!(value_after(&args, "-hls_time"), vec!["6"]);
        assert_eq!(value_after(&args, "-hls_list_size"), vec!["0"]);
        assert_eq!(
            value_after(&args, "-hls_segment_filename"),
            vec!["/tmp/processed_abc123/%v/segment%d.ts"]
        );
        assert_eq!(
            args.last().map(String::as_str),
            Some("/tmp/processed_abc123/%v/playlist.m3u8")
        );
    }
}
