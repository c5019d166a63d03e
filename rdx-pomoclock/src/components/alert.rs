//! The phase-completion tone.
//!
//! `ToneAlert` synthesizes a short decaying sine wave, writes it as a WAV file
//! once, and hands it to an external player on a background thread. Any
//! failure along the way degrades to the terminal bell and never reaches the
//! controller.

use std::f64::consts::PI;
use std::io::Write;
use std::path::PathBuf;
use std::process::{Command, Stdio};
use tracing::{debug, warn};

/// Fire-and-forget notification raised when a phase runs out.
pub trait Alert: Send {
    fn alert(&mut self);
}

pub const TONE_FREQUENCY_HZ: f64 = 880.0;
pub const TONE_SECONDS: f64 = 0.5;
pub const TONE_START_GAIN: f64 = 0.5;
pub const TONE_END_GAIN: f64 = 0.01;
pub const SAMPLE_RATE: u32 = 44_100;

/// Samples of an 880 Hz sine whose gain ramps exponentially from 0.5 to 0.01.
pub fn synthesize_tone(sample_rate: u32) -> Vec<i16> {
    let count = (f64::from(sample_rate) * TONE_SECONDS) as usize;
    (0..count)
        .map(|n| {
            let t = n as f64 / f64::from(sample_rate);
            let gain = TONE_START_GAIN * (TONE_END_GAIN / TONE_START_GAIN).powf(t / TONE_SECONDS);
            let sample = (2.0 * PI * TONE_FREQUENCY_HZ * t).sin() * gain;
            (sample * f64::from(i16::MAX)) as i16
        })
        .collect()
}

/// Encodes mono 16-bit PCM samples as a RIFF/WAVE byte stream.
pub fn encode_wav(samples: &[i16], sample_rate: u32) -> Vec<u8> {
    let data_len = (samples.len() * 2) as u32;
    let mut bytes = Vec::with_capacity(44 + data_len as usize);
    bytes.extend_from_slice(b"RIFF");
    bytes.extend_from_slice(&(36 + data_len).to_le_bytes());
    bytes.extend_from_slice(b"WAVE");
    bytes.extend_from_slice(b"fmt ");
    bytes.extend_from_slice(&16u32.to_le_bytes());
    bytes.extend_from_slice(&1u16.to_le_bytes()); // PCM
    bytes.extend_from_slice(&1u16.to_le_bytes()); // mono
    bytes.extend_from_slice(&sample_rate.to_le_bytes());
    bytes.extend_from_slice(&(sample_rate * 2).to_le_bytes());
    bytes.extend_from_slice(&2u16.to_le_bytes());
    bytes.extend_from_slice(&16u16.to_le_bytes());
    bytes.extend_from_slice(b"data");
    bytes.extend_from_slice(&data_len.to_le_bytes());
    for sample in samples {
        bytes.extend_from_slice(&sample.to_le_bytes());
    }
    bytes
}

/// Plays the synthesized tone through an external command such as `aplay`.
pub struct ToneAlert {
    player: String,
    wav_path: Option<PathBuf>,
}

impl ToneAlert {
    pub fn new(player: impl Into<String>) -> Self {
        Self {
            player: player.into(),
            wav_path: None,
        }
    }

    fn ensure_wav(&mut self) -> std::io::Result<PathBuf> {
        if let Some(path) = &self.wav_path {
            return Ok(path.clone());
        }
        let path = std::env::temp_dir().join(format!("pomoclock-alert-{}.wav", std::process::id()));
        std::fs::write(&path, encode_wav(&synthesize_tone(SAMPLE_RATE), SAMPLE_RATE))?;
        debug!("Alert tone written to {}", path.display());
        self.wav_path = Some(path.clone());
        Ok(path)
    }
}

fn ring_bell() {
    let mut out = std::io::stdout();
    out.write_all(b"\x07").and_then(|_| out.flush()).ok();
}

impl Alert for ToneAlert {
    fn alert(&mut self) {
        let path = match self.ensure_wav() {
            Ok(path) => path,
            Err(e) => {
                warn!("Could not prepare alert tone: {}", e);
                ring_bell();
                return;
            }
        };
        let player = self.player.clone();
        std::thread::spawn(move || {
            let status = Command::new(&player)
                .arg(&path)
                .stdout(Stdio::null())
                .stderr(Stdio::null())
                .status();
            match status {
                Ok(status) if status.success() => {}
                Ok(status) => {
                    warn!("'{}' exited with {}", player, status);
                    ring_bell();
                }
                Err(e) => {
                    warn!("Could not run '{}': {}", player, e);
                    ring_bell();
                }
            }
        });
    }
}

impl Drop for ToneAlert {
    fn drop(&mut self) {
        if let Some(path) = self.wav_path.take() {
            std::fs::remove_file(path).ok();
        }
    }
}

/// An alert that does nothing, for when sound is disabled.
#[derive(Debug, Default, Clone, Copy)]
pub struct SilentAlert;

impl Alert for SilentAlert {
    fn alert(&mut self) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tone_lasts_half_a_second_and_decays() {
        let samples = synthesize_tone(8_000);
        assert_eq!(samples.len(), 4_000);

        let peak = |window: &[i16]| window.iter().map(|s| s.unsigned_abs()).max().unwrap_or(0);
        let head = peak(&samples[..400]);
        let tail = peak(&samples[3_600..]);
        assert!(head > 10_000, "head peak {head}");
        assert!(tail < 1_000, "tail peak {tail}");
    }

    #[test]
    fn wav_header_describes_mono_pcm() {
        let bytes = encode_wav(&[0, 1, -1], 8_000);
        assert_eq!(bytes.len(), 44 + 6);
        assert_eq!(&bytes[0..4], b"RIFF");
        assert_eq!(&bytes[8..12], b"WAVE");
        assert_eq!(u16::from_le_bytes([bytes[22], bytes[23]]), 1);
        assert_eq!(u32::from_le_bytes([bytes[24], bytes[25], bytes[26], bytes[27]]), 8_000);
        assert_eq!(u32::from_le_bytes([bytes[40], bytes[41], bytes[42], bytes[43]]), 6);
    }

    #[test]
    fn missing_player_does_not_panic() {
        let mut alert = ToneAlert::new("pomoclock-no-such-player");
        alert.alert();
        alert.alert();
    }
}
