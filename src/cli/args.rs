//! CLI argument definitions using clap
//!
//! Commands:
//! - chemspider datasources
//! - chemspider details <id> [--fields SMILES,Formula]
//! - chemspider batch <id>...
//! - chemspider compound <id>
//! - chemspider image <id> --output <path>
//! - chemspider mol <id> [--calc3d]
//! - chemspider refs <id> [--datasources PubChem,ZINC]
//! - chemspider search <name> [--order-by <key>] [--direction <dir>]
//! - chemspider formula <formula>
//! - chemspider mass <mass> [--range <amu>]
//! - chemspider status <query-id>
//! - chemspider convert <input> --from <format> --to <format>

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// chemspider - query the ChemSpider compound database
#[derive(Parser, Debug)]
#[command(name = "chemspider")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// API key; falls back to CHEMSPIDER_API_KEY
    #[arg(long, global = true)]
    pub api_key: Option<String>,

    /// Path to a JSON client configuration file
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Log to stderr (-v info, -vv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// List data source names
    Datasources,

    /// Show record details
    Details {
        id: u64,
        /// Comma-separated detail fields; all when omitted
        #[arg(long, value_delimiter = ',')]
        fields: Vec<String>,
    },

    /// Show details of many records
    Batch {
        #[arg(required = true)]
        ids: Vec<u64>,
    },

    /// Show every property of a compound
    Compound { id: u64 },

    /// Save the record image as PNG
    Image {
        id: u64,
        #[arg(long, short)]
        output: PathBuf,
    },

    /// Print the record molfile
    Mol {
        id: u64,
        /// 3D coordinates instead of 2D
        #[arg(long)]
        calc3d: bool,
    },

    /// List external references
    Refs {
        id: u64,
        /// Comma-separated data source names
        #[arg(long, value_delimiter = ',')]
        datasources: Vec<String>,
    },

    /// Search by name
    Search {
        query: String,
        /// recordId, massDefect, molecularWeight, referenceCount,
        /// dataSourceCount, pubMedCount or rscCount
        #[arg(long)]
        order_by: Option<String>,
        /// ascending or descending
        #[arg(long, default_value = "ascending")]
        direction: String,
    },

    /// Search by molecular formula
    Formula { formula: String },

    /// Search by monoisotopic mass
    Mass {
        mass: f64,
        /// Tolerance in atomic mass units; 0 for an exact match
        #[arg(long, default_value_t = 0.0)]
        range: f64,
    },

    /// Show the status of a submitted query
    Status { query_id: String },

    /// Convert a structure between InChI, InChIKey, Mol and SMILES
    Convert {
        input: String,
        #[arg(long)]
        from: String,
        #[arg(long)]
        to: String,
    },
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}
