use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use clap::{Parser, Subcommand};
use secrecy::SecretString;
use tracing_subscriber::EnvFilter;

use triaid::voice::{self, AudioCapture, AudioPlayback, SpeechToText, TextToSpeech};
use triaid::{
    Config, Error, ImagePayload, InteractionController, RecognitionError, ResponseGenerator,
    Session, Speaker, TurnInput,
};

#[derive(Parser)]
#[command(
    name = "triaid",
    version,
    about = "TriAID - conversational medical assistant with voice"
)]
struct Cli {
    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Disable audio playback of replies
    #[arg(long, env = "TRIAID_MUTE")]
    mute: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Interactive chat session (default)
    Chat,
    /// One-shot question, optionally with an image
    Ask {
        /// Question text
        text: Option<String>,
        /// Image file to analyze (jpg, jpeg, png)
        #[arg(short, long)]
        image: Option<PathBuf>,
    },
    /// Test microphone input
    TestMic {
        /// Duration in seconds
        #[arg(short, long, default_value = "5")]
        duration: u64,
    },
    /// Test speaker output
    TestSpeaker,
    /// Test TTS output
    TestTts {
        /// Text to speak
        #[arg(default_value = "Hello! This is a test of the text to speech system.")]
        text: String,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => "info,triaid=info",
        1 => "info,triaid=debug",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("fatal: {e}");
            ExitCode::FAILURE
        }
    }
}

#[allow(clippy::future_not_send)]
async fn run(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Some(Command::TestMic { duration }) => return test_mic(duration).await,
        Some(Command::TestSpeaker) => return test_speaker(),
        Some(Command::TestTts { text }) => return test_tts(&text).await,
        Some(Command::Ask { text, image }) => return ask(cli.mute, text, image).await,
        Some(Command::Chat) | None => {}
    }

    chat(cli.mute).await
}

/// Build the pipeline pieces shared by chat and ask
fn build_pipeline(
    config: &Config,
) -> anyhow::Result<(InteractionController, Option<AudioPlayback>, Option<SpeechToText>)> {
    let client = reqwest::Client::new();

    let generator = ResponseGenerator::new(
        client.clone(),
        SecretString::from(config.api_keys.google.clone()),
        config.model.clone(),
    )?;

    let synthesizer = match (&config.api_keys.azure_speech, &config.api_keys.azure_speech_region) {
        (Some(key), Some(region)) => Some(TextToSpeech::new(
            client.clone(),
            SecretString::from(key.clone()),
            region.clone(),
            config.voice.tts_voice.clone(),
        )?),
        _ => {
            tracing::warn!("no speech key configured, replies will not be spoken");
            None
        }
    };

    let playback = if synthesizer.is_some() {
        match AudioPlayback::new() {
            Ok(p) => Some(p),
            Err(e) => {
                tracing::warn!(error = %e, "no audio output, replies will not be spoken");
                None
            }
        }
    } else {
        None
    };

    let stt = if config.voice.enabled {
        Some(SpeechToText::new(
            client,
            SecretString::from(config.api_keys.google.clone()),
            config.voice.locale.clone(),
        )?)
    } else {
        None
    };

    Ok((InteractionController::new(generator, synthesizer), playback, stt))
}

/// Interactive chat loop
///
/// One controller invocation per line of input, session state carried
/// across interactions by reference.
#[allow(clippy::future_not_send)]
async fn chat(mute: bool) -> anyhow::Result<()> {
    let config = Config::load()?;
    let wait_timeout = config.voice.wait_timeout;
    let (mut controller, playback, stt) = build_pipeline(&config)?;
    let mut session = Session::new();

    println!("TriAID - talk to your AI medical assistant.");
    println!("Type a message, or: /mic  /image <path> [text]  /history  /quit\n");

    loop {
        print!("you> ");
        std::io::stdout().flush()?;

        let mut line = String::new();
        if std::io::stdin().read_line(&mut line)? == 0 {
            break;
        }
        let line = line.trim();

        let input = if line == "/quit" {
            break;
        } else if line == "/history" {
            print_history(&session);
            continue;
        } else if line == "/mic" {
            let Some(stt) = &stt else {
                println!("voice input is disabled in config");
                continue;
            };
            match voice::capture_utterance(stt, wait_timeout).await {
                Ok(utterance) => {
                    println!("you said: {utterance}");
                    TurnInput::Text(utterance)
                }
                Err(Error::Recognition(e)) => {
                    println!("{}", recognition_hint(e));
                    continue;
                }
                Err(e) => return Err(e.into()),
            }
        } else if let Some(rest) = line.strip_prefix("/image ") {
            let mut parts = rest.splitn(2, ' ');
            let path = PathBuf::from(parts.next().unwrap_or_default());
            let accompanying = parts.next().map(ToString::to_string);
            match ImagePayload::from_path(&path) {
                Ok(payload) => TurnInput::Image {
                    payload,
                    accompanying_text: accompanying,
                },
                Err(e) => {
                    println!("could not read image: {e}");
                    continue;
                }
            }
        } else {
            TurnInput::Text(line.to_string())
        };

        let Some(outcome) = controller.handle(&mut session, input).await? else {
            continue;
        };

        println!("doctor> {}\n", outcome.reply);

        if !mute
            && let (Some(playback), Some(artifact)) = (&playback, &outcome.audio)
            && let Err(e) = playback.play_artifact(artifact).await
        {
            tracing::warn!(error = %e, "playback failed");
        }
        session.is_playing = false;
    }

    Ok(())
}

/// One-shot turn from the command line
#[allow(clippy::future_not_send)]
async fn ask(mute: bool, text: Option<String>, image: Option<PathBuf>) -> anyhow::Result<()> {
    let config = Config::load()?;
    let (mut controller, playback, _) = build_pipeline(&config)?;
    let mut session = Session::new();

    let input = match image {
        Some(path) => TurnInput::Image {
            payload: ImagePayload::from_path(&path)?,
            accompanying_text: text,
        },
        None => TurnInput::Text(text.unwrap_or_default()),
    };

    let Some(outcome) = controller.handle(&mut session, input).await? else {
        anyhow::bail!("nothing to ask: pass text or --image");
    };

    println!("{}", outcome.reply);

    if !mute
        && let (Some(playback), Some(artifact)) = (&playback, &outcome.audio)
    {
        playback.play_artifact(artifact).await?;
    }

    Ok(())
}

/// Render the session transcript
fn print_history(session: &Session) {
    if session.is_empty() {
        println!("(no conversation yet)");
        return;
    }
    for entry in session.all() {
        let who = match entry.speaker {
            Speaker::User => "you",
            Speaker::Assistant => "doctor",
        };
        println!("{who}> {}", entry.text);
    }
}

/// User-facing hint for a recognition failure
const fn recognition_hint(e: RecognitionError) -> &'static str {
    match e {
        RecognitionError::Unintelligible => "Sorry, I couldn't understand that.",
        RecognitionError::ServiceUnavailable => "Speech recognition service unavailable.",
        RecognitionError::NoSpeech => "No speech detected, please try again.",
    }
}

/// Test microphone input
#[allow(clippy::future_not_send)]
async fn test_mic(duration: u64) -> anyhow::Result<()> {
    println!("Testing microphone for {duration} seconds...");
    println!("Speak into your microphone!\n");

    let mut capture = AudioCapture::new()?;
    capture.start()?;

    for i in 0..duration {
        tokio::time::sleep(Duration::from_secs(1)).await;

        let samples = capture.take_buffer();
        let energy = rms(&samples);
        let peak = samples.iter().map(|s| s.abs()).fold(0.0f32, f32::max);

        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let meter_len = (energy * 100.0).min(50.0) as usize;
        let meter: String = "#".repeat(meter_len) + &" ".repeat(50 - meter_len);

        println!("[{:2}s] RMS: {energy:.4} | Peak: {peak:.4} | [{meter}]", i + 1);
    }

    capture.stop();

    println!("\nIf you saw movement in the meter, your mic is working.");
    Ok(())
}

#[allow(clippy::cast_precision_loss)]
fn rms(samples: &[f32]) -> f32 {
    if samples.is_empty() {
        return 0.0;
    }
    let sum_squares: f32 = samples.iter().map(|s| s * s).sum();
    (sum_squares / samples.len() as f32).sqrt()
}

/// Test speaker output with a sine wave
fn test_speaker() -> anyhow::Result<()> {
    println!("Testing speaker output...");
    println!("You should hear a 440Hz tone for 2 seconds\n");

    let playback = AudioPlayback::new()?;

    let sample_rate = 16_000_f32;
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let num_samples = (sample_rate * 2.0) as usize;

    #[allow(clippy::cast_precision_loss)]
    let samples: Vec<f32> = (0..num_samples)
        .map(|i| {
            let t = i as f32 / sample_rate;
            (2.0 * std::f32::consts::PI * 440.0 * t).sin() * 0.3
        })
        .collect();

    playback.play_samples(samples)?;

    println!("If you heard the tone, your speakers are working.");
    Ok(())
}

/// Test TTS synthesis and playback
#[allow(clippy::future_not_send)]
async fn test_tts(text: &str) -> anyhow::Result<()> {
    println!("Testing TTS with text: \"{text}\"\n");

    let key = std::env::var("AZURE_SPEECH_KEY")
        .map_err(|_| anyhow::anyhow!("AZURE_SPEECH_KEY not set"))?;
    let region = std::env::var("AZURE_SPEECH_REGION")
        .map_err(|_| anyhow::anyhow!("AZURE_SPEECH_REGION not set"))?;

    let tts = TextToSpeech::new(
        reqwest::Client::new(),
        SecretString::from(key),
        region,
        voice::DEFAULT_VOICE.to_string(),
    )?;

    println!("Synthesizing speech...");
    let artifact = tts.synthesize_to_file(text).await?;
    println!("Audio written to {}", artifact.path().display());

    println!("Playing audio...");
    let playback = AudioPlayback::new()?;
    playback.play_artifact(&artifact).await?;

    println!("\nIf you heard the speech, TTS is working.");
    Ok(())
}
