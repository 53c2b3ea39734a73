// Arabesque — CLI entry point.
//
// Generates the arpeggio arrangement, writes it to MIDI, then renders the
// MIDI to MP3 through fluidsynth and ffmpeg.
// The pipeline: config → arrangement → MIDI output → synthesis → encoding.
//
// Usage:
//   cargo run -p arabesque_music -- [--config FILE] [--progression "Em D G C"]
//     [--measures N] [--tempo BPM] [--midi PATH] [--mp3 PATH]
//     [--sound-font PATH] [--score-json PATH] [--midi-only] [--summary]
//
// Log verbosity follows RUST_LOG (default: info).

use anyhow::{Context, Result};
use arabesque_music::arrange::{generate_with, parse_progression};
use arabesque_music::config::ArrangementConfig;
use arabesque_music::midi::write_midi;
use arabesque_music::score::{MIN_TEMPO_BPM, NoteEvent};
use arabesque_render::{RenderJob, render_to_mp3};
use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "arabesque", about = "Generate a 9/8 arpeggio arrangement and render it to MP3")]
struct Cli {
    /// JSON config file; flags below override its values
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Whitespace-separated chord symbols (first 8 are used)
    #[arg(short, long)]
    progression: Option<String>,

    /// Number of measures to generate
    #[arg(long)]
    measures: Option<usize>,

    /// Tempo in quarter notes per minute
    #[arg(long, value_parser = clap::value_parser!(u16).range(MIN_TEMPO_BPM as i64..))]
    tempo: Option<u16>,

    /// Output MIDI file
    #[arg(long)]
    midi: Option<PathBuf>,

    /// Output MP3 file
    #[arg(long)]
    mp3: Option<PathBuf>,

    /// SoundFont used for synthesis
    #[arg(long)]
    sound_font: Option<PathBuf>,

    /// Also dump the generated score as JSON
    #[arg(long)]
    score_json: Option<PathBuf>,

    /// Stop after writing the MIDI file
    #[arg(long)]
    midi_only: bool,

    /// Print a per-measure summary of the melody
    #[arg(long)]
    summary: bool,
}

impl Cli {
    fn apply(&self, config: &mut ArrangementConfig) {
        if let Some(progression) = &self.progression {
            config.progression = progression.clone();
        }
        if let Some(measures) = self.measures {
            config.arrangement.measure_count = measures;
        }
        if let Some(tempo) = self.tempo {
            config.arrangement.tempo_bpm = tempo;
        }
        if let Some(midi) = &self.midi {
            config.midi_path = midi.clone();
        }
        if let Some(mp3) = &self.mp3 {
            config.mp3_path = mp3.clone();
        }
        if let Some(sound_font) = &self.sound_font {
            config.sound_font = sound_font.clone();
        }
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let mut config = match &cli.config {
        Some(path) => ArrangementConfig::load(path)?,
        None => ArrangementConfig::default(),
    };
    cli.apply(&mut config);

    let chords = parse_progression(&config.progression, config.arrangement.max_chords);
    println!("=== Arabesque ===");
    println!("Progression: {}", chords.join(" "));
    println!(
        "Measures: {} at {} BPM in 9/8",
        config.arrangement.measure_count, config.arrangement.tempo_bpm
    );
    println!();

    println!("[1/3] Arranging...");
    let score = generate_with(&chords, &config.arrangement).context("invalid arrangement options")?;
    let stats = score.stats();
    println!(
        "  {} melody notes, {} accompaniment notes",
        stats.melody_notes, stats.accompaniment_notes
    );
    let step = |notes: &[NoteEvent]| notes.first().map_or(0.0, NoteEvent::quarter_length);
    println!(
        "  Steps: melody {:.3}, accompaniment {:.3} quarter-lengths",
        step(&score.melody),
        step(&score.accompaniment)
    );
    println!(
        "  {} crescendos, {} diminuendos",
        stats.crescendos, stats.diminuendos
    );
    for skip in &score.skipped {
        println!("  {} not found in chord dictionary (measure {}).", skip.symbol, skip.measure + 1);
    }
    if cli.summary {
        print!("{}", score.summary());
    }
    if let Some(path) = &cli.score_json {
        let json = serde_json::to_string_pretty(&score).context("serializing score")?;
        std::fs::write(path, json)
            .with_context(|| format!("writing score JSON to {}", path.display()))?;
    }

    println!("[2/3] Writing MIDI to {}...", config.midi_path.display());
    write_midi(&score, &config.midi_path)?;
    println!("  Duration: {:.0}s", score.duration_seconds());

    if cli.midi_only {
        println!();
        println!("Play with: timidity {} (or any MIDI player)", config.midi_path.display());
        return Ok(());
    }

    println!("[3/3] Rendering audio...");
    let job = RenderJob {
        midi: &config.midi_path,
        sound_bank: &config.sound_font,
        output: &config.mp3_path,
        keep_wav: config.keep_wav,
    };
    let mp3 = render_to_mp3(&config.synth, &config.encoder, &job)
        .with_context(|| format!("rendering {}", config.midi_path.display()))?;

    println!("{} has been created.", mp3.display());
    Ok(())
}
