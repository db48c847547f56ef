//! Test helpers standing in for the transcoding engine.

use crate::domain::hls::{MasterPlaylist, MediaPlaylist};
use crate::domain::plan::{EncodingPlan, VARIANT_PLAYLIST};
use std::fs;

pub const SEGMENTS_PER_VARIANT: usize = 2;

/// Write the tree the engine would produce for `plan`: a master playlist,
/// one playlist per rendition and `SEGMENTS_PER_VARIANT` segments each.
pub fn write_engine_output(plan: &EncodingPlan) {
    let mut master = MasterPlaylist::new();

    for ((dir, uri), rendition) in plan
        .variant_dirs()
        .into_iter()
        .zip(plan.variant_playlists())
        .zip(&plan.renditions)
    {
        fs::create_dir_all(&dir).unwrap();

        let mut playlist = MediaPlaylist::new(plan.segment_seconds as u64);
        for n in 0..SEGMENTS_PER_VARIANT {
            let name = format!("segment{}.ts", n);
            fs::write(dir.join(&name), format!("{} #{}", rendition.label, n)).unwrap();
            playlist.add_segment(plan.segment_seconds as f64, name);
        }
        fs::write(dir.join(VARIANT_PLAYLIST), playlist.render()).unwrap();

        master.add_variant(rendition.bandwidth(), uri);
    }

    fs::write(plan.master_playlist_path(), master.render()).unwrap();
}
