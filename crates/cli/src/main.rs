use clap::{Parser, Subcommand};
use hfr_core::{store, HhsAssessment, RecordId, DEFAULT_DATA_DIR};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "hfr")]
#[command(about = "HFR patient record registry CLI")]
struct Cli {
    /// Data directory (overrides HFR_DATA_DIR)
    #[arg(long)]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// List all patients
    List,
    /// Show one patient's full record as JSON
    Show {
        /// Record id (32 lowercase hex characters)
        id: String,
    },
    /// Compute the Harris Hip Score total for an assessment document
    Score {
        /// Path to a JSON file holding a structured assessment
        assessment: PathBuf,
    },
    /// Delete a patient record and its attachments
    Delete {
        /// Record id (32 lowercase hex characters)
        id: String,
    },
}

fn data_dir(cli: &Cli) -> PathBuf {
    cli.data_dir.clone().unwrap_or_else(|| {
        PathBuf::from(std::env::var("HFR_DATA_DIR").unwrap_or_else(|_| DEFAULT_DATA_DIR.into()))
    })
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    match &cli.command {
        Some(Commands::List) => {
            let store = store::open(&data_dir(&cli))?;
            let patients = store.list();
            if patients.is_empty() {
                println!("No patients found.");
            } else {
                for patient in patients {
                    println!(
                        "ID: {}, Name: {}, Surgery: {}, Created: {}",
                        patient.id,
                        patient.demographics.name,
                        patient.demographics.date_of_surgery,
                        patient.created_at.to_rfc3339()
                    );
                }
            }
        }
        Some(Commands::Show { id }) => {
            let store = store::open(&data_dir(&cli))?;
            let id = RecordId::parse(id)?;
            match store.get(&id) {
                Ok(record) => {
                    println!("{}", serde_json::to_string_pretty(&record.to_view())?);
                }
                Err(e) => eprintln!("Error reading record: {}", e),
            }
        }
        Some(Commands::Score { assessment }) => {
            let contents = std::fs::read_to_string(assessment)?;
            let assessment: HhsAssessment = serde_json::from_str(&contents)?;
            println!("Harris Hip Score total: {}", assessment.total());
        }
        Some(Commands::Delete { id }) => {
            let store = store::open(&data_dir(&cli))?;
            let id = RecordId::parse(id)?;
            match store.delete(&id) {
                Ok(()) => println!("Deleted record: {}", id),
                Err(e) => eprintln!("Error deleting record: {}", e),
            }
        }
        None => {
            println!("Use 'hfr --help' for commands");
        }
    }

    Ok(())
}
