//! The simulated assistant pipeline. No model is ever invoked: each
//! stage sleeps for a plausible latency, then fabricates its output.

use std::time::{Duration, Instant, SystemTime};

use crate::app::{BackendEvent, Session};

type Error = Box<dyn std::error::Error + Send + Sync>;

/// Fixed transcript stand-in produced by the transcription stage.
const PLACEHOLDER_TRANSCRIPT: &str = "Simulated transcript";

/// Shown in the transcript pane while audio is still being captured.
const INTERIM_PHRASES: &[&str] = &[
    "I'm hearing…",
    "It sounds like…",
    "I think you said…",
    "Analyzing…",
    "Processing speech…",
];

/// The response stage picks one of these uniformly.
const CANNED_REPLIES: &[&str] = &[
    "I've processed your request and here's what I found...",
    "Based on my analysis, I recommend considering these options...",
    "That's an interesting question! Here's what I know about that...",
    "I understand you're asking about this topic. Here's my response...",
    "After consulting my knowledge base, here's the information you requested...",
];

/// Simulated network latency for the response stage, milliseconds.
const RESPONSE_DELAY_MS: (u64, u64) = (800, 1300);
/// Simulated synthesis latency, milliseconds.
const SYNTHESIS_DELAY_MS: (u64, u64) = (500, 800);
/// Length of the fabricated silent speech payload.
const SPEECH_PAYLOAD_MS: u64 = 600;

/// Run the four simulated stages against a finished capture session.
/// Stages execute strictly in order; each one reports through the event
/// channel before the next begins. Any failure aborts the remainder and
/// propagates to the caller.
pub async fn run_pipeline(
    session: Session,
    events: &async_channel::Sender<BackendEvent>,
) -> Result<(), Error> {
    // Stage 1: transcription. The capture itself was the "work", so the
    // elapsed time is measured from session start and the chunk contents
    // are ignored.
    let stt = session.started.elapsed();
    log::info!(
        "Transcribed {} chunks ({} samples) in {}ms",
        session.chunks.len(),
        session.sample_count(),
        stt.as_millis()
    );
    events
        .send(BackendEvent::TranscriptReady {
            text: PLACEHOLDER_TRANSCRIPT.to_string(),
            elapsed: stt,
        })
        .await
        .map_err(|_| "event channel closed")?;

    // Stage 2: response.
    let api_start = Instant::now();
    tokio::time::sleep(jitter(RESPONSE_DELAY_MS)).await;
    let reply = canned_reply().to_string();
    events
        .send(BackendEvent::ResponseReady {
            text: reply,
            elapsed: api_start.elapsed(),
        })
        .await
        .map_err(|_| "event channel closed")?;

    // Stage 3: synthesis. The payload is genuine WAV, just silent.
    let tts_start = Instant::now();
    tokio::time::sleep(jitter(SYNTHESIS_DELAY_MS)).await;
    let n_samples = (crate::recorder::TARGET_SAMPLE_RATE as u64 * SPEECH_PAYLOAD_MS / 1000) as usize;
    let wav = crate::recorder::samples_to_wav(
        &vec![0.0; n_samples],
        crate::recorder::TARGET_SAMPLE_RATE,
    )?;

    // Stage 4: finalization. Total is measured from session start; the
    // main thread flips to Speaking and back to Ready around playback.
    events
        .send(BackendEvent::SpeechReady {
            wav,
            elapsed: tts_start.elapsed(),
            total: session.started.elapsed(),
        })
        .await
        .map_err(|_| "event channel closed")?;

    Ok(())
}

/// One of the rotating capture-time placeholder phrases.
pub fn interim_phrase() -> &'static str {
    pick(INTERIM_PHRASES)
}

fn canned_reply() -> &'static str {
    pick(CANNED_REPLIES)
}

// No rand dependency anywhere in this stack; clock nanos are plenty of
// entropy for cosmetic jitter.
fn entropy_nanos() -> u64 {
    SystemTime::now()
        .duration_since(SystemTime::UNIX_EPOCH)
        .map(|d| d.subsec_nanos() as u64)
        .unwrap_or(0)
}

fn pick<'a>(choices: &[&'a str]) -> &'a str {
    choices[entropy_nanos() as usize % choices.len()]
}

fn jitter((lo, hi): (u64, u64)) -> Duration {
    Duration::from_millis(lo + entropy_nanos() % (hi - lo + 1))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canned_reply_is_always_from_the_fixed_set() {
        for _ in 0..64 {
            let reply = canned_reply();
            assert!(!reply.is_empty());
            assert!(CANNED_REPLIES.contains(&reply));
        }
    }

    #[test]
    fn interim_phrase_is_always_from_the_fixed_set() {
        for _ in 0..64 {
            assert!(INTERIM_PHRASES.contains(&interim_phrase()));
        }
    }

    #[test]
    fn jitter_stays_inside_the_requested_range() {
        for _ in 0..256 {
            let d = jitter(RESPONSE_DELAY_MS);
            assert!(d >= Duration::from_millis(800) && d <= Duration::from_millis(1300));
            let d = jitter(SYNTHESIS_DELAY_MS);
            assert!(d >= Duration::from_millis(500) && d <= Duration::from_millis(800));
        }
    }

    #[tokio::test]
    async fn pipeline_emits_stages_in_order_with_monotonic_timings() {
        let (tx, rx) = async_channel::unbounded();

        let mut session = Session::new(crate::recorder::TARGET_SAMPLE_RATE);
        session.chunks.push(vec![0.0; 4000]);
        session.chunks.push(vec![0.0; 4000]);
        session.chunks.push(vec![0.0; 4000]);
        std::thread::sleep(Duration::from_millis(50));

        run_pipeline(session, &tx).await.unwrap();

        let transcript = rx.try_recv().unwrap();
        let BackendEvent::TranscriptReady { text, elapsed: stt } = transcript else {
            panic!("expected TranscriptReady, got {transcript:?}");
        };
        assert_eq!(text, PLACEHOLDER_TRANSCRIPT);
        // Capture lasted at least 50ms before the pipeline ran.
        assert!(stt >= Duration::from_millis(50));

        let response = rx.try_recv().unwrap();
        let BackendEvent::ResponseReady { text, elapsed: api } = response else {
            panic!("expected ResponseReady, got {response:?}");
        };
        assert!(CANNED_REPLIES.contains(&text.as_str()));
        assert!(api >= Duration::from_millis(800));

        let speech = rx.try_recv().unwrap();
        let BackendEvent::SpeechReady { wav, elapsed: tts, total } = speech else {
            panic!("expected SpeechReady, got {speech:?}");
        };
        assert!(tts >= Duration::from_millis(500));
        // stt, api, and tts are disjoint subintervals of the run, so
        // the total can never undercut their sum.
        assert!(total >= stt + api + tts);

        // The payload is real, silent, mono WAV.
        let reader = hound::WavReader::new(std::io::Cursor::new(wav)).unwrap();
        assert_eq!(reader.spec().channels, 1);
        assert!(reader.into_samples::<i16>().all(|s| s.unwrap() == 0));

        assert!(rx.try_recv().is_err());
    }
}
