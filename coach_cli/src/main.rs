use clap::{Parser, Subcommand};
use coach_core::catalog::validate_exercises;
use coach_core::store::StoredAs;
use coach_core::*;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "coach")]
#[command(about = "Workout program generator", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Override data directory
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a training day (default)
    Generate {
        /// Program type (two-day, three-day, four-day)
        #[arg(long, default_value = "four-day")]
        program: String,

        /// Day within the program, starting at 1
        #[arg(long, default_value_t = 1)]
        day: u8,

        /// User whose assessment drives the corrective slots
        #[arg(long, default_value = "default")]
        user: String,

        /// Exercise catalog CSV (built-in catalog when omitted)
        #[arg(long)]
        catalog: Option<PathBuf>,

        /// Seed for reproducible exercise selection
        #[arg(long)]
        seed: Option<u64>,

        /// Print the program as JSON
        #[arg(long)]
        json: bool,

        /// Dry run - show the program without saving it
        #[arg(long)]
        dry_run: bool,
    },

    /// Show how the catalog is sorted into movement buckets
    Buckets {
        /// Exercise catalog CSV (built-in catalog when omitted)
        #[arg(long)]
        catalog: Option<PathBuf>,
    },

    /// Show corrective recommendations from the latest assessment
    Recommend {
        #[arg(long, default_value = "default")]
        user: String,

        #[arg(long)]
        seed: Option<u64>,
    },

    /// Record a movement-screen assessment
    Assess {
        #[arg(long, default_value = "default")]
        user: String,

        /// Seven comma-separated scores (0-3) in screen order: deep squat,
        /// hurdle step, in-line lunge, shoulder mobility, active straight-leg
        /// raise, trunk stability push-up, rotary stability
        #[arg(long)]
        scores: String,

        #[arg(long)]
        notes: Option<String>,
    },

    /// List saved programs
    History {
        /// Only show the most recent N programs
        #[arg(long)]
        limit: Option<usize>,
    },
}

fn main() -> Result<()> {
    // Initialize logging
    coach_core::logging::init();

    let cli = Cli::parse();

    // Determine data directory
    let config = Config::load()?;
    let data_dir = cli.data_dir.unwrap_or_else(|| config.data.data_dir.clone());

    match cli.command {
        Some(Commands::Generate {
            program,
            day,
            user,
            catalog,
            seed,
            json,
            dry_run,
        }) => cmd_generate(
            &data_dir,
            &config,
            GenerateArgs {
                program,
                day,
                user,
                catalog,
                seed,
                json,
                dry_run,
            },
        ),
        Some(Commands::Buckets { catalog }) => cmd_buckets(catalog.as_deref()),
        Some(Commands::Recommend { user, seed }) => cmd_recommend(&data_dir, &user, seed),
        Some(Commands::Assess {
            user,
            scores,
            notes,
        }) => cmd_assess(&data_dir, &user, &scores, notes),
        Some(Commands::History { limit }) => cmd_history(&data_dir, limit),
        None => {
            // Default to "generate" with default options
            cmd_generate(&data_dir, &config, GenerateArgs::default())
        }
    }
}

struct GenerateArgs {
    program: String,
    day: u8,
    user: String,
    catalog: Option<PathBuf>,
    seed: Option<u64>,
    json: bool,
    dry_run: bool,
}

impl Default for GenerateArgs {
    fn default() -> Self {
        Self {
            program: ProgramType::FourDay.as_str().to_string(),
            day: 1,
            user: "default".to_string(),
            catalog: None,
            seed: None,
            json: false,
            dry_run: false,
        }
    }
}

fn make_rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    }
}

fn assessments_dir(data_dir: &Path) -> AssessmentDir {
    AssessmentDir::new(data_dir.join("assessments"))
}

fn workouts_path(data_dir: &Path) -> PathBuf {
    data_dir.join("workouts.jsonl")
}

/// Load and validate the catalog, from CSV or the built-in set
fn load_catalog(path: Option<&Path>) -> Result<Vec<CatalogExercise>> {
    let exercises = match path {
        Some(path) => {
            let store = CsvCatalog::new(path);
            store.list_active_exercises().map_err(|e| {
                Error::CatalogUnavailable(format!("{}: {}", store.path().display(), e))
            })?
        }
        None => get_default_catalog().list_active_exercises()?,
    };

    let errors = validate_exercises(&exercises);
    if !errors.is_empty() {
        eprintln!("Catalog validation errors:");
        for error in errors {
            eprintln!("  - {}", error);
        }
        return Err(Error::CatalogValidation("Invalid catalog".into()));
    }

    Ok(exercises)
}

fn cmd_generate(data_dir: &Path, config: &Config, args: GenerateArgs) -> Result<()> {
    let program_type: ProgramType = args.program.parse()?;
    // Reject bad days before touching the catalog file
    ProgramDay::new(program_type, args.day)?;

    let catalog = load_catalog(args.catalog.as_deref())?;
    let assessments = assessments_dir(data_dir);
    let mut rng = make_rng(args.seed);

    let request = GenerationRequest::new(args.user, program_type, args.day);
    let program = generate_program(&request, &catalog, &assessments, config, &mut rng)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&program)?);
    } else {
        display_program(&program);
    }

    if args.dry_run {
        if !args.json {
            println!("\n[Dry run - not saving program]");
        }
        return Ok(());
    }

    let mut sink = JsonlSink::new(workouts_path(data_dir))
        .with_structured_sections(config.store.structured_sections);
    let stored = save_program(&mut sink, &program, chrono::Utc::now())?;

    if !args.json {
        let form = match stored {
            StoredAs::Structured => "structured",
            StoredAs::Serialized => "serialized",
        };
        println!("\n✓ Program saved ({} sections)", form);
    }
    tracing::info!("Saved program {} to {:?}", program.id, sink.path());

    Ok(())
}

fn cmd_buckets(catalog: Option<&Path>) -> Result<()> {
    let exercises = load_catalog(catalog)?;
    let pools = categorize(&exercises);

    for bucket in MovementBucket::ALL {
        let pool = pools.get(bucket);
        if pool.is_empty() {
            println!("{:<28} (empty)", bucket);
        } else {
            let names: Vec<&str> = pool.iter().map(|e| e.name.as_str()).collect();
            println!("{:<28} {}", bucket, names.join(", "));
        }
    }

    let unclassified = exercises.len() - pools.total();
    println!();
    println!(
        "{} exercises classified, {} unclassified",
        pools.total(),
        unclassified
    );

    Ok(())
}

fn cmd_recommend(data_dir: &Path, user: &str, seed: Option<u64>) -> Result<()> {
    let assessment = assessments_dir(data_dir).latest_assessment(user)?;

    let Some(assessment) = assessment else {
        println!("No assessment on file for {}.", user);
        return Ok(());
    };

    let mut rng = make_rng(seed);
    let tags = coach_core::corrective::recommend(Some(&assessment), &mut rng);

    println!("Assessment from {}", assessment.assessed_at.format("%Y-%m-%d"));
    if tags.is_empty() {
        println!("All screens passed - no corrections needed.");
        return Ok(());
    }

    for (i, tag) in tags.iter().enumerate() {
        println!(
            "  {}. {} ({}: {})",
            i + 1,
            tag.text,
            tag.screen.label(),
            assessment.scores.score(tag.screen)
        );
    }

    Ok(())
}

fn parse_scores(input: &str) -> Result<ScreenScores> {
    let values: Vec<u8> = input
        .split(',')
        .map(|s| s.trim().parse::<u8>())
        .collect::<std::result::Result<_, _>>()
        .map_err(|e| Error::Other(format!("Invalid score list '{}': {}", input, e)))?;

    if values.len() != Screen::ALL.len() {
        return Err(Error::Other(format!(
            "Expected {} scores, got {}",
            Screen::ALL.len(),
            values.len()
        )));
    }

    let mut scores = ScreenScores::uniform(0);
    for (screen, value) in Screen::ALL.into_iter().zip(values) {
        scores.set(screen, value);
    }
    Ok(scores)
}

fn cmd_assess(data_dir: &Path, user: &str, scores: &str, notes: Option<String>) -> Result<()> {
    let assessment = AssessmentResult {
        scores: parse_scores(scores)?,
        notes,
        assessed_at: chrono::Utc::now(),
    };

    assessments_dir(data_dir).record(user, &assessment)?;

    println!("✓ Assessment recorded for {}", user);
    for screen in Screen::ALL {
        println!("  {:<26} {}", screen.label(), assessment.scores.score(screen));
    }

    Ok(())
}

fn cmd_history(data_dir: &Path, limit: Option<usize>) -> Result<()> {
    let records = read_programs(&workouts_path(data_dir))?;

    if records.is_empty() {
        println!("No saved programs.");
        return Ok(());
    }

    let skip = limit.map_or(0, |n| records.len().saturating_sub(n));
    for record in records.iter().skip(skip) {
        let exercises = match record.sections.sections() {
            Ok(sections) => sections.iter().map(|s| s.exercises.len()).sum::<usize>(),
            Err(e) => {
                tracing::warn!("Failed to read sections of program {}: {}", record.id, e);
                0
            }
        };
        println!(
            "{}  {}  ({} exercises, user {})",
            record.date, record.title, exercises, record.user_id
        );
    }

    Ok(())
}

fn display_program(program: &GeneratedProgram) {
    println!("\n╭─────────────────────────────────────────╮");
    println!("│  {}", program.title);
    println!("╰─────────────────────────────────────────╯");
    println!();
    println!("  {}", program.description);
    println!(
        "  Date: {}  Duration: ~{} min",
        program.date, program.duration_minutes
    );

    for section in &program.sections {
        println!();
        println!("  {}", section.name);
        for exercise in &section.exercises {
            let mut line = format!(
                "    → {}  {} x {}",
                exercise.name, exercise.sets, exercise.reps
            );
            if let Some(weight) = exercise.weight_kg {
                line.push_str(&format!(" @ {} kg", weight));
            }
            if exercise.rest_seconds > 0 {
                line.push_str(&format!(", rest {} s", exercise.rest_seconds));
            }
            if exercise.source == ExerciseSource::Placeholder {
                line.push_str("  [stand-in]");
            }
            println!("{}", line);

            if let Some(ref instruction) = exercise.instruction {
                println!("      ℹ {}", instruction);
            }
        }
    }

    if !program.summary.notes.is_empty() {
        println!();
        for note in &program.summary.notes {
            println!("  ! {}", note);
        }
    }

    println!();
}
