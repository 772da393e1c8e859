use std::fs::{self, File};
use std::io::BufReader;
use std::path::{Path, PathBuf};

use bracket_random::prelude::RandomNumberGenerator;
use rodio::{Decoder, OutputStream, OutputStreamHandle, Sink};
use tracing::{info, warn};

const BGM_VOLUME: f32 = 0.1;

/// Looped background music. Everything here degrades to silence with a
/// warning: no device, no folder, and no decodable file are all non-fatal.
pub struct AudioPlayer {
    _stream: OutputStream,
    handle: OutputStreamHandle,
    bgm_sink: Option<Sink>,
}

impl AudioPlayer {
    pub fn new() -> Option<Self> {
        match OutputStream::try_default() {
            Ok((stream, handle)) => Some(Self {
                _stream: stream,
                handle,
                bgm_sink: None,
            }),
            Err(err) => {
                warn!(%err, "audio device unavailable; running silent");
                None
            }
        }
    }

    /// Stops whatever is playing and loops a random track from `dir`.
    pub fn play_random_bgm(&mut self, dir: &Path, rng: &mut RandomNumberGenerator) {
        let Some(track) = pick_track(dir, rng) else {
            return;
        };

        let file = match File::open(&track) {
            Ok(file) => file,
            Err(err) => {
                warn!(track = %track.display(), %err, "cannot open bgm track");
                return;
            }
        };
        let decoder = match Decoder::new_looped(BufReader::new(file)) {
            Ok(decoder) => decoder,
            Err(err) => {
                warn!(track = %track.display(), %err, "cannot decode bgm track");
                return;
            }
        };

        if let Some(old) = self.bgm_sink.take() {
            old.stop();
        }
        match Sink::try_new(&self.handle) {
            Ok(sink) => {
                sink.append(decoder);
                sink.set_volume(BGM_VOLUME);
                info!(track = %track.display(), "bgm playing");
                self.bgm_sink = Some(sink);
            }
            Err(err) => {
                warn!(%err, "cannot open bgm sink");
            }
        }
    }
}

fn pick_track(dir: &Path, rng: &mut RandomNumberGenerator) -> Option<PathBuf> {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(err) => {
            warn!(dir = %dir.display(), %err, "bgm folder unavailable; skipping playback");
            return None;
        }
    };

    let mut tracks: Vec<PathBuf> = entries
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| {
            path.extension()
                .and_then(|ext| ext.to_str())
                .map(|ext| {
                    let lower = ext.to_lowercase();
                    matches!(lower.as_str(), "mp3" | "ogg" | "wav" | "flac")
                })
                .unwrap_or(false)
        })
        .collect();

    if tracks.is_empty() {
        warn!(dir = %dir.display(), "bgm folder has no playable tracks");
        return None;
    }

    tracks.sort();
    let idx = rng.range(0, tracks.len() as i32) as usize;
    Some(tracks.swap_remove(idx))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_folder_yields_no_track() {
        let mut rng = RandomNumberGenerator::seeded(1);
        assert!(pick_track(Path::new("no-such-bgm-dir"), &mut rng).is_none());
    }
}
