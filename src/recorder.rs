use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use std::sync::{Arc, Mutex};

/// Capture rate the rest of the app assumes (mono f32).
pub const TARGET_SAMPLE_RATE: u32 = 16_000;

/// Open the default input device and start appending mono f32 samples
/// to the shared buffer. Returns the live stream and the effective
/// sample rate; dropping the stream releases the microphone.
///
/// Fails when no input device exists or the stream cannot be built —
/// the desktop equivalent of a denied microphone permission.
pub fn start_capture(
    buffer: Arc<Mutex<Vec<f32>>>,
) -> Result<(cpal::Stream, u32), Box<dyn std::error::Error>> {
    let host = cpal::default_host();
    let device = host
        .default_input_device()
        .ok_or("Microphone unavailable (no input device)")?;

    log::info!("Input device: {:?}", device.description());

    let chosen = choose_capture_config(&device)?;
    let channels = chosen.config.channels as usize;
    let decimation = chosen.decimation;

    let stream = device.build_input_stream(
        &chosen.config,
        move |data: &[f32], _: &cpal::InputCallbackInfo| {
            let mut buf = buffer.lock().unwrap();
            for (i, frame) in data.chunks(channels).enumerate() {
                if i % decimation == 0 {
                    buf.push(downmix(frame));
                }
            }
        },
        |err| log::error!("Input stream error: {err}"),
        None,
    )?;

    stream.play()?;
    Ok((stream, chosen.effective_rate))
}

/// A capture plan: the stream config to open plus how to thin its
/// frames down to the app's rate.
struct CaptureConfig {
    config: cpal::StreamConfig,
    effective_rate: u32,
    decimation: usize,
}

/// Pick the capture plan for a device. Native 16kHz mono f32 wins;
/// anything else falls back to the device default, decimated.
fn choose_capture_config(
    device: &cpal::Device,
) -> Result<CaptureConfig, Box<dyn std::error::Error>> {
    let supported: Vec<_> = device.supported_input_configs()?.collect();
    let native_mono = supported.iter().find(|c| {
        c.channels() == 1
            && c.min_sample_rate() <= TARGET_SAMPLE_RATE
            && c.max_sample_rate() >= TARGET_SAMPLE_RATE
            && c.sample_format() == cpal::SampleFormat::F32
    });

    if let Some(cfg) = native_mono {
        return Ok(CaptureConfig {
            config: cfg.with_sample_rate(TARGET_SAMPLE_RATE).config(),
            effective_rate: TARGET_SAMPLE_RATE,
            decimation: 1,
        });
    }

    let default_config = device.default_input_config()?;
    let native_rate = default_config.sample_rate();
    let (decimation, effective_rate) = decimation_for(native_rate);
    log::info!("Native rate {native_rate}Hz, decimating by {decimation}x to ~{effective_rate}Hz");
    Ok(CaptureConfig {
        config: default_config.config(),
        effective_rate,
        decimation,
    })
}

/// Keep-every-nth factor that lands a native rate at or just above the
/// target, and the rate that results.
fn decimation_for(native_rate: u32) -> (usize, u32) {
    let factor = (native_rate / TARGET_SAMPLE_RATE).max(1) as usize;
    (factor, native_rate / factor as u32)
}

/// Average an interleaved frame down to one mono sample.
fn downmix(frame: &[f32]) -> f32 {
    frame.iter().sum::<f32>() / frame.len() as f32
}

/// Encode f32 samples as a self-contained WAV payload (mono 16-bit PCM).
/// The synthesis stage uses this to fabricate its "speech" blob.
pub fn samples_to_wav(
    samples: &[f32],
    sample_rate: u32,
) -> Result<Vec<u8>, Box<dyn std::error::Error + Send + Sync>> {
    let mut cursor = std::io::Cursor::new(Vec::new());
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let mut writer = hound::WavWriter::new(&mut cursor, spec)?;
    for &s in samples {
        let clamped = s.clamp(-1.0, 1.0);
        writer.write_sample((clamped * i16::MAX as f32) as i16)?;
    }
    writer.finalize()?;
    Ok(cursor.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decimation_lands_at_or_above_the_target_rate() {
        assert_eq!(decimation_for(16_000), (1, 16_000));
        assert_eq!(decimation_for(48_000), (3, 16_000));
        assert_eq!(decimation_for(44_100), (2, 22_050));
        // Devices below the target are left alone.
        assert_eq!(decimation_for(8_000), (1, 8_000));
    }

    #[test]
    fn downmix_averages_interleaved_channels() {
        assert_eq!(downmix(&[0.5]), 0.5);
        assert_eq!(downmix(&[1.0, 0.0]), 0.5);
        assert_eq!(downmix(&[0.25, 0.25, 0.25, 0.25]), 0.25);
    }

    #[test]
    fn silent_samples_encode_as_silent_mono_wav() {
        let wav = samples_to_wav(&vec![0.0; 1600], TARGET_SAMPLE_RATE).unwrap();
        let reader = hound::WavReader::new(std::io::Cursor::new(wav)).unwrap();
        let spec = reader.spec();
        assert_eq!(spec.channels, 1);
        assert_eq!(spec.sample_rate, TARGET_SAMPLE_RATE);
        assert_eq!(spec.bits_per_sample, 16);
        for sample in reader.into_samples::<i16>() {
            assert_eq!(sample.unwrap(), 0);
        }
    }
}
