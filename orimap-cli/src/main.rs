use clap::Parser;
use nalgebra::Matrix3;
use orimap::{
    CrystalMapInput, Euler, MatchCandidate, MatchSet, PixelResult, ReduceConfig, ScanGrid,
    TemplateMatch, TemplateMatches, TemplateMatchingResults, VectorMatchingResults,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

const SCHEMA_JSON: &str = include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/config.schema.json"));
const EXAMPLE_JSON: &str =
    include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/config.example.json"));

#[derive(Parser, Debug)]
#[command(author, version, about = "orimap CLI (JSON config driven)")]
struct Cli {
    /// Path to the JSON configuration file.
    #[arg(short, long, value_name = "FILE", default_value = "config.json")]
    config: PathBuf,
    /// Print the JSON schema and exit.
    #[arg(long)]
    print_schema: bool,
    /// Print an example config and exit.
    #[arg(long)]
    print_example: bool,
    /// Enable tracing output.
    #[arg(long)]
    trace: bool,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
enum ResultsKind {
    #[default]
    Template,
    Vector,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
struct ReduceConfigJson {
    parallel: bool,
}

impl Default for ReduceConfigJson {
    fn default() -> Self {
        let cfg = ReduceConfig::default();
        Self {
            parallel: cfg.parallel,
        }
    }
}

impl From<ReduceConfigJson> for ReduceConfig {
    fn from(value: ReduceConfigJson) -> Self {
        Self {
            parallel: value.parallel,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Config {
    input_path: String,
    output_path: Option<String>,
    kind: ResultsKind,
    sort_candidates: bool,
    reduce: ReduceConfigJson,
}

#[derive(Debug, Deserialize)]
struct TemplateMatchRecord {
    phase: usize,
    euler_deg: [f64; 3],
    score: f64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "snake_case")]
enum OrientationRecord {
    EulerDeg([f64; 3]),
    /// Row-major crystal-to-lab rotation matrix.
    Matrix([[f64; 3]; 3]),
}

#[derive(Debug, Deserialize)]
struct CandidateRecord {
    phase: usize,
    orientation: OrientationRecord,
    total_error: f64,
    #[serde(default)]
    match_rate: f64,
    #[serde(default)]
    error_hkls: Vec<f64>,
}

/// Per-pixel records in row-major order.
#[derive(Debug, Deserialize)]
struct ScanInput<T> {
    width: usize,
    height: usize,
    pixels: Vec<Vec<T>>,
}

#[derive(Debug, Serialize)]
struct CrystalMapOutput {
    width: usize,
    height: usize,
    phase_id: Vec<usize>,
    /// Unit quaternions as `[w, x, y, z]`.
    rotations: Vec<[f64; 4]>,
    x: Vec<usize>,
    y: Vec<usize>,
    properties: BTreeMap<String, Vec<f64>>,
}

impl From<CrystalMapInput> for CrystalMapOutput {
    fn from(map: CrystalMapInput) -> Self {
        let (width, height) = map.scan_shape();
        Self {
            width,
            height,
            phase_id: map.phase_id().to_vec(),
            rotations: map.rotations().iter().map(|q| [q.w, q.i, q.j, q.k]).collect(),
            x: map.x().to_vec(),
            y: map.y().to_vec(),
            properties: map.properties().clone().into_columns(),
        }
    }
}

#[derive(Debug, Serialize)]
struct PixelRecord {
    phase: usize,
    euler_deg: [f64; 3],
    match_rate: f64,
    ehkls: Vec<f64>,
    total_error: f64,
    phase_reliability: Option<f64>,
    orientation_reliability: Option<f64>,
}

impl From<&PixelResult> for PixelRecord {
    fn from(result: &PixelResult) -> Self {
        let m = result.metrics();
        Self {
            phase: result.phase_index(),
            euler_deg: result.orientation().to_array(),
            match_rate: m.match_rate,
            ehkls: m.ehkls.clone(),
            total_error: m.total_error,
            phase_reliability: m.phase_reliability,
            orientation_reliability: m.orientation_reliability,
        }
    }
}

#[derive(Debug, Serialize)]
struct VectorOutput {
    width: usize,
    height: usize,
    pixels: Vec<PixelRecord>,
    /// Absent when pixels disagree on which reliabilities they carry.
    properties: Option<BTreeMap<String, Vec<f64>>>,
}

fn template_grid(
    input: ScanInput<TemplateMatchRecord>,
) -> orimap::OriMapResult<ScanGrid<TemplateMatches>> {
    let tables = input
        .pixels
        .iter()
        .map(|records| {
            let matches: Vec<TemplateMatch> = records
                .iter()
                .map(|r| TemplateMatch {
                    phase_index: r.phase,
                    euler: Euler::from_array(r.euler_deg),
                    score: r.score,
                })
                .collect();
            TemplateMatches::from_matches(&matches)
        })
        .collect::<orimap::OriMapResult<Vec<_>>>()?;
    ScanGrid::new(tables, input.width, input.height)
}

fn candidate(record: &CandidateRecord) -> orimap::OriMapResult<MatchCandidate> {
    let cand = match record.orientation {
        OrientationRecord::EulerDeg(angles) => {
            MatchCandidate::from_euler(record.phase, Euler::from_array(angles), record.total_error)?
        }
        OrientationRecord::Matrix(rows) => {
            let m = Matrix3::from_fn(|r, c| rows[r][c]);
            MatchCandidate::new(record.phase, m, record.total_error)?
        }
    };
    Ok(cand
        .with_match_rate(record.match_rate)?
        .with_error_hkls(record.error_hkls.clone()))
}

fn vector_grid(
    input: ScanInput<CandidateRecord>,
    sort_candidates: bool,
) -> orimap::OriMapResult<ScanGrid<MatchSet>> {
    let sets = input
        .pixels
        .iter()
        .map(|records| {
            let candidates = records
                .iter()
                .map(candidate)
                .collect::<orimap::OriMapResult<Vec<_>>>()?;
            if sort_candidates {
                MatchSet::sorted(candidates)
            } else {
                MatchSet::new(candidates)
            }
        })
        .collect::<orimap::OriMapResult<Vec<_>>>()?;
    ScanGrid::new(sets, input.width, input.height)
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    if cli.trace {
        tracing_subscriber::fmt()
            .with_env_filter(
                EnvFilter::from_default_env()
                    .add_directive("orimap=info".parse()?)
                    .add_directive("orimap_cli=info".parse()?),
            )
            .with_target(false)
            .init();
    }

    if cli.print_schema {
        println!("{SCHEMA_JSON}");
        return Ok(());
    }
    if cli.print_example {
        println!("{EXAMPLE_JSON}");
        return Ok(());
    }

    let config_text = fs::read_to_string(&cli.config)?;
    let config: Config = serde_json::from_str(&config_text)?;
    if config.input_path.is_empty() {
        return Err("input_path must be set in the config".into());
    }
    let input_text = fs::read_to_string(&config.input_path)?;
    let cfg = ReduceConfig::from(config.reduce);

    let json = match config.kind {
        ResultsKind::Template => {
            let input: ScanInput<TemplateMatchRecord> = serde_json::from_str(&input_text)?;
            let results = TemplateMatchingResults::new(template_grid(input)?).with_config(cfg);
            let map = results.to_crystal_map()?;
            tracing::info!(pixels = map.len(), "template results reduced");
            serde_json::to_string_pretty(&CrystalMapOutput::from(map))?
        }
        ResultsKind::Vector => {
            let input: ScanInput<CandidateRecord> = serde_json::from_str(&input_text)?;
            let results = VectorMatchingResults::new(vector_grid(input, config.sort_candidates)?)
                .with_config(cfg);
            let reduced = results.reduce();
            let properties = match results.properties() {
                Ok(table) => Some(table.into_columns()),
                Err(err) => {
                    tracing::warn!(%err, "property columns omitted");
                    None
                }
            };
            tracing::info!(pixels = reduced.len(), "vector results reduced");
            let output = VectorOutput {
                width: reduced.width(),
                height: reduced.height(),
                pixels: reduced.iter().map(PixelRecord::from).collect(),
                properties,
            };
            serde_json::to_string_pretty(&output)?
        }
    };

    match config.output_path {
        Some(path) => fs::write(path, json)?,
        None => println!("{json}"),
    }

    Ok(())
}
