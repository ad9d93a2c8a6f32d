#![deny(unused_variables)]
#![deny(dead_code)]
#![deny(unused_imports)]

use clap::{Args, CommandFactory, Parser, Subcommand, ValueEnum};
use std::fmt::Write as FmtWrite;
use std::path::PathBuf;
use std::process;

use gnomon_contrasts::config::CodingTable;
use gnomon_contrasts::{Coding, CodingKind, ContrastsConfig, ContrastsMatrix, Level};

#[derive(Clone, Copy, ValueEnum)]
pub enum SchemeCli {
    Dummy,
    Effects,
    Helmert,
    Seqdiff,
    Fulldummy,
    Custom,
}

impl From<SchemeCli> for CodingKind {
    fn from(scheme: SchemeCli) -> Self {
        match scheme {
            SchemeCli::Dummy => CodingKind::Dummy,
            SchemeCli::Effects => CodingKind::Effects,
            SchemeCli::Helmert => CodingKind::Helmert,
            SchemeCli::Seqdiff => CodingKind::SeqDiff,
            SchemeCli::Fulldummy => CodingKind::FullDummy,
            SchemeCli::Custom => CodingKind::Custom,
        }
    }
}

#[derive(Args)]
pub struct BuildArgs {
    /// Distinct levels observed in the data column, in order
    #[arg(required = true)]
    pub data_levels: Vec<Level>,

    /// Coding scheme to apply
    #[arg(long, value_enum, default_value_t = SchemeCli::Dummy)]
    pub scheme: SchemeCli,

    /// Reference level (defaults to the first level)
    #[arg(long)]
    pub base: Option<Level>,

    /// Expected levels and their order, comma separated
    #[arg(long, value_delimiter = ',')]
    pub levels: Option<Vec<Level>>,

    /// Custom contrasts matrix: rows separated by ';', values by ','
    #[arg(long, allow_hyphen_values = true)]
    pub matrix: Option<String>,

    /// TOML file with per-variable codings; replaces --scheme/--base/--levels/--matrix
    #[arg(long, requires = "variable", conflicts_with_all = ["base", "levels", "matrix"])]
    pub config: Option<PathBuf>,

    /// Variable to look up in --config
    #[arg(long, requires = "config")]
    pub variable: Option<String>,

    /// Print the full-rank (one column per level) equivalent instead
    #[arg(long)]
    pub full_rank: bool,

    /// Levels of a new data column to check against the built contrasts, comma separated
    #[arg(long, value_delimiter = ',')]
    pub scoring_levels: Option<Vec<Level>>,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the contrasts matrix for one categorical variable (outputs TSV on stdout)
    Build(BuildArgs),
}

#[derive(Parser)]
#[command(
    name = "gnomon-contrasts",
    version,
    about = "Build contrast matrices for categorical model terms"
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let Cli { command } = Cli::parse();
    let result = match command {
        Some(Commands::Build(args)) => build(args),
        None => {
            Cli::command().print_help().expect("print help");
            println!();
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

fn build(args: BuildArgs) -> Result<(), Box<dyn std::error::Error>> {
    let coding = resolve_coding(&args)?;
    let contrasts = ContrastsMatrix::build(&coding, &args.data_levels)?;
    log::info!(
        "Built {} contrasts: {} levels, {} terms",
        coding.kind(),
        contrasts.levels().len(),
        contrasts.term_names().len()
    );

    if let Some(scoring_levels) = &args.scoring_levels {
        contrasts.revalidate(scoring_levels)?;
        log::info!(
            "All {} scoring levels are covered by the contrasts",
            scoring_levels.len()
        );
    }

    let output = if args.full_rank {
        contrasts.to_full_rank()
    } else {
        contrasts
    };
    print!("{}", format_tsv(&output)?);
    Ok(())
}

fn resolve_coding(args: &BuildArgs) -> Result<Coding, Box<dyn std::error::Error>> {
    if let (Some(path), Some(variable)) = (&args.config, &args.variable) {
        log::info!("Loading codings from: {}", path.display());
        let config = ContrastsConfig::load(path)?;
        return Ok(config.coding_for(variable));
    }

    let table = CodingTable {
        scheme: args.scheme.into(),
        base: args.base.clone(),
        levels: args.levels.clone(),
        matrix: args.matrix.as_deref().map(parse_matrix).transpose()?,
    };
    Ok(table.to_coding("command line")?)
}

/// Parses `1,0;0,1;-1,-1` into rows. Row lengths are checked by the caller.
fn parse_matrix(text: &str) -> Result<Vec<Vec<f64>>, std::num::ParseFloatError> {
    text.split(';')
        .map(|row| {
            row.split(',')
                .map(|value| value.trim().parse::<f64>())
                .collect()
        })
        .collect()
}

/// One header line (`level` then the term names) and one line per level.
fn format_tsv(contrasts: &ContrastsMatrix) -> Result<String, std::fmt::Error> {
    let mut out = String::new();
    write!(out, "level")?;
    for name in contrasts.term_names() {
        write!(out, "\t{name}")?;
    }
    writeln!(out)?;

    for (level, row) in contrasts.levels().iter().zip(contrasts.matrix().rows()) {
        write!(out, "{level}")?;
        for value in row {
            write!(out, "\t{value}")?;
        }
        writeln!(out)?;
    }
    Ok(out)
}
