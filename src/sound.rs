use std::path::Path;
use tracing::warn;

/// Plays the chime on its own thread. A missing file or audio device only
/// logs; the reminder still fires.
pub fn play_chime(path: &Path) {
    if !path.is_file() {
        warn!(path = %path.display(), "reminder sound not found, skipping");
        return;
    }
    imp::play(path);
}

#[cfg(feature = "sound")]
mod imp {
    use anyhow::{Context, Result};
    use rodio::{Decoder, OutputStream, Sink};
    use std::fs::File;
    use std::io::BufReader;
    use std::path::Path;
    use std::thread;
    use tracing::{debug, warn};

    pub fn play(path: &Path) {
        let path = path.to_path_buf();
        let spawned = thread::Builder::new()
            .name("reminder-sound".to_string())
            .spawn(move || {
                if let Err(e) = play_blocking(&path) {
                    warn!(path = %path.display(), "Failed to play reminder sound: {:#}", e);
                }
            });
        if let Err(e) = spawned {
            warn!("Failed to spawn sound thread: {}", e);
        }
    }

    fn play_blocking(path: &Path) -> Result<()> {
        let file = File::open(path).context("Failed to open sound file")?;
        let (_stream, handle) = OutputStream::try_default().context("No audio output device")?;
        let sink = Sink::try_new(&handle).context("Failed to create audio sink")?;
        let source = Decoder::new(BufReader::new(file)).context("Failed to decode sound file")?;
        sink.append(source);
        sink.sleep_until_end();
        debug!("reminder sound finished");
        Ok(())
    }
}

#[cfg(not(feature = "sound"))]
mod imp {
    use std::path::Path;
    use tracing::debug;

    pub fn play(path: &Path) {
        debug!(path = %path.display(), "built without sound support");
    }
}
