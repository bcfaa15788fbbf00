use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use crate::app::BackendEvent;

/// Play a WAV payload on the default output device. Spawns a thread and
/// returns immediately; a `PlaybackFinished` event is sent exactly once
/// when playback ends, whether or not it succeeded. Output faults are
/// logged and otherwise invisible to the user.
pub fn play_wav(wav: Vec<u8>, events: async_channel::Sender<BackendEvent>) {
    std::thread::spawn(move || {
        if let Err(e) = play_blocking(&wav) {
            log::warn!("Playback failed: {e}");
        }
        let _ = events.send_blocking(BackendEvent::PlaybackFinished);
    });
}

fn play_blocking(wav: &[u8]) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let reader = hound::WavReader::new(std::io::Cursor::new(wav))?;
    let source_rate = reader.spec().sample_rate;
    let samples: Vec<f32> = reader
        .into_samples::<i16>()
        .map(|s| s.map(|v| v as f32 / i16::MAX as f32))
        .collect::<Result<_, _>>()?;
    let duration_secs = samples.len() as f32 / source_rate as f32;

    let host = cpal::default_host();
    let device = host
        .default_output_device()
        .ok_or("No output device found")?;
    let config = device.default_output_config()?;
    let output_rate = config.sample_rate() as f32;
    let channels = config.channels() as usize;

    // Nearest-sample rate conversion; plenty for a fabricated payload.
    let step = source_rate as f32 / output_rate;
    let frame_idx = Arc::new(AtomicUsize::new(0));
    let frame_idx_cb = frame_idx.clone();
    let samples = Arc::new(samples);
    let samples_cb = samples.clone();

    let stream = device.build_output_stream(
        &config.into(),
        move |data: &mut [f32], _: &cpal::OutputCallbackInfo| {
            let mut idx = frame_idx_cb.load(Ordering::Relaxed);
            for frame in data.chunks_mut(channels) {
                let src = (idx as f32 * step) as usize;
                let value = samples_cb.get(src).copied().unwrap_or(0.0);
                for sample in frame.iter_mut() {
                    *sample = value;
                }
                idx += 1;
            }
            frame_idx_cb.store(idx, Ordering::Relaxed);
        },
        |err| log::error!("Audio output error: {err}"),
        None,
    )?;

    stream.play()?;

    // Wait for playback to finish + small buffer
    std::thread::sleep(std::time::Duration::from_secs_f32(duration_secs + 0.1));

    drop(stream);
    Ok(())
}
