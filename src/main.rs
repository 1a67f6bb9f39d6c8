//! Daf Segment command line
//!
//! Offline audit tool: validates recorded generator payloads against their
//! source texts, replays boundary-marker passes and consensus runs, and
//! prints the prompts the library would send.

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use daf_segment::batch::validate_batch;
use daf_segment::candidate::{co_segmentation_json_schema, parse_candidate};
use daf_segment::align::validate_co_segmentation;
use daf_segment::consensus::run_consensus;
use daf_segment::generate::build_prompt;
use daf_segment::merge::post_process;
use daf_segment::models::{
    CoSegmentationInput, ConsensusParams, Language, PostProcessParams, SegmentationConfig, TextType,
};
use daf_segment::output::{
    format_talmud_parallels, print_batch_summary, print_co_segmentation, print_consensus_summary,
    print_result_summary, write_json_file, write_pairs_csv_file,
};
use daf_segment::service::segment_marked_text;

#[derive(Parser)]
#[command(name = "daf-segment")]
#[command(about = "Verified phrase segmentation and Hebrew/English alignment")]
#[command(version)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace); RUST_LOG overrides
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

/// Language of a single text (CLI version, mirrors models::Language)
#[derive(Clone, Copy, Debug, ValueEnum)]
enum CliLanguage {
    Hebrew,
    English,
}

impl From<CliLanguage> for Language {
    fn from(language: CliLanguage) -> Self {
        match language {
            CliLanguage::Hebrew => Language::Hebrew,
            CliLanguage::English => Language::English,
        }
    }
}

/// Text genre (CLI version, mirrors models::TextType)
#[derive(Clone, Copy, Debug, ValueEnum)]
enum CliTextType {
    /// Talmud: adds instructions for speech attributions and parallels
    Talmud,
    Biblical,
    Commentary,
}

impl From<CliTextType> for TextType {
    fn from(text_type: CliTextType) -> Self {
        match text_type {
            CliTextType::Talmud => TextType::Talmud,
            CliTextType::Biblical => TextType::Biblical,
            CliTextType::Commentary => TextType::Commentary,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Validate one recorded co-segmentation payload against its texts
    Validate {
        /// Hebrew source text file
        #[arg(long)]
        hebrew: PathBuf,

        /// English source text file
        #[arg(long)]
        english: PathBuf,

        /// Generator payload (JSON) file
        #[arg(long)]
        payload: PathBuf,

        /// Write the validated segmentation as JSON
        #[arg(long)]
        output: Option<PathBuf>,

        /// Also write aligned pairs as CSV
        #[arg(long)]
        csv: Option<PathBuf>,

        /// Suppress console output
        #[arg(long)]
        quiet: bool,
    },

    /// Validate a JSONL file of recorded payloads in parallel
    ///
    /// Each line: {"id"?, "hebrewText", "englishText", "payload"} where
    /// payload is the payload object or the raw response string.
    Batch {
        /// Input JSONL file
        #[arg(long)]
        input: PathBuf,

        /// Output JSON report
        #[arg(long)]
        output: PathBuf,

        /// Include accepted segmentations in the report
        #[arg(long)]
        include_results: bool,

        /// Number of rejected lines to print [default: 10]
        #[arg(long)]
        show_rejected: Option<usize>,

        /// Suppress progress output
        #[arg(long)]
        quiet: bool,
    },

    /// Segment a text from a recorded boundary-marker response
    Markers {
        /// Source text file
        #[arg(long)]
        text: PathBuf,

        /// Marked copy returned by the generator
        #[arg(long)]
        marked: PathBuf,

        /// Language of the text [default: english]
        #[arg(long, value_enum)]
        language: Option<CliLanguage>,

        /// Text genre [default: talmud]
        #[arg(long, value_enum)]
        text_type: Option<CliTextType>,

        /// Boundary marker character [default: |]
        #[arg(long)]
        marker: Option<char>,

        /// Skip parallel structure detection
        #[arg(long)]
        no_parallels: bool,

        /// Merge short and split long segments after parsing
        #[arg(long)]
        post_process: bool,

        /// Minimum segment length in chars for --post-process [default: 15]
        #[arg(long)]
        min_length: Option<usize>,

        /// Maximum segment length in chars for --post-process [default: 200]
        #[arg(long)]
        max_length: Option<usize>,

        /// Print segments with parallel pairs laid out as bullets
        #[arg(long)]
        format_parallels: bool,

        /// Write the result as JSON
        #[arg(long)]
        output: Option<PathBuf>,

        /// Suppress console output
        #[arg(long)]
        quiet: bool,
    },

    /// Reconcile several recorded boundary-marker passes by voting
    Consensus {
        /// Source text file
        #[arg(long)]
        text: PathBuf,

        /// Marked copies, one per pass [default: 3 passes expected]
        #[arg(long, required = true, num_args = 1..)]
        marked: Vec<PathBuf>,

        /// Language of the text [default: english]
        #[arg(long, value_enum)]
        language: Option<CliLanguage>,

        /// Model label recorded in the result [default: gpt-4]
        #[arg(long)]
        model: Option<String>,

        /// Write the consensus result as JSON
        #[arg(long)]
        output: Option<PathBuf>,

        /// Suppress console output
        #[arg(long)]
        quiet: bool,
    },

    /// Print the co-segmentation prompt for two texts
    Prompt {
        /// Hebrew source text file
        #[arg(long)]
        hebrew: PathBuf,

        /// English source text file
        #[arg(long)]
        english: PathBuf,

        /// Also print the response JSON schema
        #[arg(long)]
        schema: bool,
    },
}

/// Initialize logging based on verbosity level
fn init_logging(verbose: u8) {
    let log_level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level)).init();
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Validate {
            hebrew,
            english,
            payload,
            output,
            csv,
            quiet,
        } => {
            let input = CoSegmentationInput::new(
                std::fs::read_to_string(&hebrew)?,
                std::fs::read_to_string(&english)?,
            );
            let candidate = parse_candidate(&std::fs::read_to_string(&payload)?)?;
            let result = validate_co_segmentation(&input, &candidate)?;

            if let Some(path) = &output {
                write_json_file(&result, path)?;
                if !quiet {
                    eprintln!("Output: {}", path.display());
                }
            }
            if let Some(path) = &csv {
                write_pairs_csv_file(&result, path)?;
                if !quiet {
                    eprintln!("CSV output: {}", path.display());
                }
            }
            if !quiet {
                if result.raw != candidate {
                    eprintln!("Payload was repaired before acceptance");
                }
                print_co_segmentation(&result);
            }
        }

        Commands::Batch {
            input,
            output,
            include_results,
            show_rejected,
            quiet,
        } => {
            let content = std::fs::read_to_string(&input)?;
            let report = validate_batch(&content, include_results, !quiet);
            write_json_file(&report, &output)?;

            if !quiet {
                print_batch_summary(&report, show_rejected.unwrap_or(10));
                eprintln!("\nOutput: {}", output.display());
            }
        }

        Commands::Markers {
            text,
            marked,
            language,
            text_type,
            marker,
            no_parallels,
            post_process: apply_post_process,
            min_length,
            max_length,
            format_parallels,
            output,
            quiet,
        } => {
            let defaults = SegmentationConfig::default();
            let config = SegmentationConfig {
                language: language.map(Language::from).unwrap_or(defaults.language),
                text_type: text_type.map(TextType::from).unwrap_or(defaults.text_type),
                marker: marker.unwrap_or(defaults.marker),
                enable_parallel_detection: !no_parallels,
                ..defaults
            };

            let source = std::fs::read_to_string(&text)?;
            let mut result = segment_marked_text(&source, &std::fs::read_to_string(&marked)?, &config)?;

            if apply_post_process {
                let defaults = PostProcessParams::default();
                let params = PostProcessParams {
                    min_length: min_length.unwrap_or(defaults.min_length),
                    max_length: max_length.unwrap_or(defaults.max_length),
                };
                result = post_process(&result, &params);
            }

            if let Some(path) = &output {
                write_json_file(&result, path)?;
            }
            if format_parallels {
                println!("{}", format_talmud_parallels(&result.segments));
            }
            if !quiet {
                print_result_summary(&result);
                if let Some(path) = &output {
                    eprintln!("\nOutput: {}", path.display());
                }
            }
        }

        Commands::Consensus {
            text,
            marked,
            language,
            model,
            output,
            quiet,
        } => {
            let defaults = SegmentationConfig::default();
            let config = SegmentationConfig {
                language: language.map(Language::from).unwrap_or(defaults.language),
                model: model.unwrap_or(defaults.model.clone()),
                ..defaults
            };

            let source = std::fs::read_to_string(&text)?;
            let passes = marked
                .iter()
                .map(std::fs::read_to_string)
                .collect::<Result<Vec<_>, _>>()?;
            if !quiet && passes.len() != ConsensusParams::default().pass_count {
                eprintln!(
                    "Note: {} passes supplied (default run uses {})",
                    passes.len(),
                    ConsensusParams::default().pass_count
                );
            }

            let result = run_consensus(&source, &config, passes.len(), |i, pass_config| {
                segment_marked_text(&source, &passes[i], pass_config)
            })?;

            if let Some(path) = &output {
                write_json_file(&result, path)?;
            }
            if !quiet {
                print_consensus_summary(&result);
                if let Some(path) = &output {
                    eprintln!("\nOutput: {}", path.display());
                }
            }
        }

        Commands::Prompt {
            hebrew,
            english,
            schema,
        } => {
            let input = CoSegmentationInput::new(
                std::fs::read_to_string(&hebrew)?,
                std::fs::read_to_string(&english)?,
            );
            println!("{}", build_prompt(&input));
            if schema {
                println!("\n{}", serde_json::to_string_pretty(&co_segmentation_json_schema())?);
            }
        }
    }

    Ok(())
}
