//! Music playstate merging.
//!
//! Attaches the playing track, an interpolated playhead position and a
//! "no music" flag to arbitrary timestamps, and maps playhead positions to
//! the sections of a track.

use serde::{Deserialize, Serialize};
use stridelab_common::clock::ms_to_ns;
use stridelab_common::error::StrideResult;
use stridelab_gait_model::record::{MusicPlaystate, MusicSection, TimestampNs};

use crate::asof::TemporalJoiner;
use crate::bout_window::{annotate_bouts_with, interpolate_bouts};
use crate::bouts::extract_bouts;

/// Music state at one target timestamp.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MusicAnnotation {
    /// Latest track announced at or before the timestamp.
    pub track_uri: Option<String>,
    /// Interpolated playhead position, NaN when no music is playing.
    pub position_ms: f64,
    /// No track yet, or playback paused.
    pub bad_no_music: bool,
}

/// Merge playstate information into the target timestamps.
///
/// Both `times` and `playstates` must be sorted by time.
pub fn merge_music_playstate(
    times: &[TimestampNs],
    playstates: &[MusicPlaystate],
) -> StrideResult<Vec<MusicAnnotation>> {
    let tracks = attach_tracks(times, playstates);

    let mut bad_no_music = vec![true; times.len()];
    let mut position_ms = vec![f64::NAN; times.len()];

    let songs = split_songs(playstates);
    let last_target = times.last().copied();
    for (idx, song) in songs.iter().enumerate() {
        let song_times: Vec<TimestampNs> = song.iter().map(|p| p.timestamp_ns).collect();
        let paused: Vec<bool> = song.iter().map(|p| p.paused).collect();
        let mut bouts = extract_bouts(&song_times, &paused, true)?;

        // The last state holds until the next song starts, or until the end
        // of the target series for the final song.
        let hold_until = match songs.get(idx + 1) {
            Some(next) => Some(next[0].timestamp_ns),
            None => last_target,
        };
        if let (Some(last), Some(end)) = (bouts.last_mut(), hold_until) {
            last.end_ns = end;
        }

        annotate_bouts_with(times, &bouts, &mut bad_no_music, |_, b| b.valid)?;

        let positions: Vec<f64> = song.iter().map(|p| p.position_ms).collect();
        if song.len() >= 2 {
            interpolate_bouts(times, &bouts, &song_times, &positions, &mut position_ms)?;
        } else {
            // A lone sample cannot be interpolated; hold its position.
            annotate_bouts_with(times, &bouts, &mut position_ms, |_, _| positions[0])?;
        }
    }

    for (pos, bad) in position_ms.iter_mut().zip(&bad_no_music) {
        if *bad {
            *pos = f64::NAN;
        }
    }

    tracing::debug!(
        rows = times.len(),
        songs = songs.len(),
        playing = bad_no_music.iter().filter(|b| !**b).count(),
        "Merged music playstate"
    );

    Ok(tracks
        .into_iter()
        .zip(position_ms)
        .zip(bad_no_music)
        .map(|((track_uri, position_ms), bad_no_music)| MusicAnnotation {
            track_uri,
            position_ms,
            bad_no_music,
        })
        .collect())
}

/// Backward join of target times against playstates that name a track.
fn attach_tracks(times: &[TimestampNs], playstates: &[MusicPlaystate]) -> Vec<Option<String>> {
    let named: Vec<&MusicPlaystate> = playstates
        .iter()
        .filter(|p| p.track_uri.is_some())
        .collect();
    let named_times: Vec<TimestampNs> = named.iter().map(|p| p.timestamp_ns).collect();

    TemporalJoiner::backward()
        .match_times(times, &named_times)
        .into_iter()
        .map(|m| m.and_then(|idx| named[idx].track_uri.clone()))
        .collect()
}

/// Split into consecutive runs with the same track. A track that plays
/// twice yields two songs.
fn split_songs(playstates: &[MusicPlaystate]) -> Vec<&[MusicPlaystate]> {
    let mut songs = Vec::new();
    let mut start = 0;
    for idx in 1..=playstates.len() {
        if idx == playstates.len() || playstates[idx].track_uri != playstates[idx - 1].track_uri {
            songs.push(&playstates[start..idx]);
            start = idx;
        }
    }
    songs
}

/// Section index of every annotation, found by a backward join of the
/// playhead position against section starts of the same track.
///
/// Rows without a track or position get `None`.
pub fn music_sections(
    annotations: &[MusicAnnotation],
    sections: &[MusicSection],
) -> StrideResult<Vec<Option<u32>>> {
    let mut sorted: Vec<&MusicSection> = sections.iter().collect();
    sorted.sort_by(|a, b| a.start_ms.total_cmp(&b.start_ms));
    let section_starts: Vec<TimestampNs> =
        sorted.iter().map(|s| ms_to_ns(s.start_ms)).collect();
    let section_keys: Vec<&str> = sorted.iter().map(|s| s.track_uri.as_str()).collect();

    let (rows, (positions, keys)): (Vec<usize>, (Vec<TimestampNs>, Vec<&str>)) = annotations
        .iter()
        .enumerate()
        .filter_map(|(idx, a)| {
            let track = a.track_uri.as_deref()?;
            (!a.position_ms.is_nan()).then(|| (idx, (ms_to_ns(a.position_ms), track)))
        })
        .unzip();

    let matches = TemporalJoiner::backward().match_times_by(
        &positions,
        &keys,
        &section_starts,
        &section_keys,
    )?;

    let mut out = vec![None; annotations.len()];
    for (row, m) in rows.into_iter().zip(matches) {
        out[row] = m.map(|idx| sorted[idx].section);
    }
    Ok(out)
}
