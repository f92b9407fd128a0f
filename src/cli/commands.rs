//! CLI command implementations
//!
//! Each command maps to one public client operation and renders its result
//! as JSON. Errors are reported on stdout as an error envelope and on
//! stderr, and the process exits non-zero.

use std::env;
use std::path::Path;

use serde_json::{json, Value};

use crate::client::ChemSpider;
use crate::compound::Compound;
use crate::config::{ClientConfig, API_KEY_ENV};
use crate::errors::ChemSpiderResult;
use crate::models::{DetailField, OrderBy, QueryId, ResultOrder, SortDirection, StructureFormat};
use crate::observability::{log_event_with_fields, Event, Logger, Severity};
use crate::search::{Results, SearchMode, SearchRequest};

use super::args::{Cli, Command};
use super::errors::{CliError, CliResult};
use super::io::{write_error, write_file, write_response};

/// Parse arguments, run one command and print its result
pub fn run() -> CliResult<()> {
    let cli = Cli::parse_args();
    Logger::set_min_severity(match cli.verbose {
        0 => Severity::Warn,
        1 => Severity::Info,
        _ => Severity::Trace,
    });

    let outcome = connect(&cli).and_then(|client| run_command(&client, cli.command));
    match outcome {
        Ok(data) => write_response(data),
        Err(err) => {
            write_error(err.code_str(), err.message())?;
            Err(err)
        }
    }
}

/// Build a client from `--config`/environment and `--api-key`/environment
pub fn connect(cli: &Cli) -> CliResult<ChemSpider> {
    let config = load_config(cli.config.as_deref())?;
    let api_key = match &cli.api_key {
        Some(key) => key.clone(),
        None => env::var(API_KEY_ENV).map_err(|_| CliError::missing_api_key())?,
    };
    Ok(ChemSpider::with_config(api_key, config)?)
}

fn load_config(path: Option<&Path>) -> CliResult<ClientConfig> {
    let config = match path {
        Some(path) => {
            let config = ClientConfig::load(path)?.with_env_overrides()?;
            let source = path.display().to_string();
            log_event_with_fields(Event::ConfigLoaded, &[("source", source.as_str())]);
            config
        }
        None => ClientConfig::from_env()?,
    };
    Ok(config)
}

/// Run one command against `client`
pub fn run_command(client: &ChemSpider, cmd: Command) -> CliResult<Value> {
    match cmd {
        Command::Datasources => Ok(json!(client.get_datasources()?)),
        Command::Details { id, fields } => {
            let fields = parse_all::<DetailField>(&fields)?;
            Ok(serde_json::to_value(client.get_details(id, &fields)?)?)
        }
        Command::Batch { ids } => Ok(serde_json::to_value(
            client.get_details_batch(&ids, DetailField::COMMON)?,
        )?),
        Command::Compound { id } => Ok(describe(&client.get_compound(id))?),
        Command::Image { id, output } => {
            let bytes = client.get_image(id)?;
            write_file(&output, &bytes)?;
            Ok(json!({"path": output.display().to_string(), "bytes": bytes.len()}))
        }
        Command::Mol { id, calc3d } => Ok(json!(client.get_mol(id, calc3d)?)),
        Command::Refs { id, datasources } => Ok(serde_json::to_value(
            client.get_external_references(id, &datasources)?,
        )?),
        Command::Search {
            query,
            order_by,
            direction,
        } => {
            let mut request = SearchRequest::name(query);
            if let Some(order_by) = order_by {
                let by: OrderBy = order_by.parse()?;
                let direction: SortDirection = direction.parse()?;
                request = request.ordered(ResultOrder::new(by, direction));
            }
            render_results(&client.search_with(request, SearchMode::Blocking))
        }
        Command::Formula { formula } => render_results(&client.search_by_formula(&formula)),
        Command::Mass { mass, range } => render_results(&client.search_by_mass(mass, range)),
        Command::Status { query_id } => {
            let query_id: QueryId = query_id.parse()?;
            Ok(serde_json::to_value(client.filter_status(query_id)?)?)
        }
        Command::Convert { input, from, to } => {
            let from: StructureFormat = from.parse()?;
            let to: StructureFormat = to.parse()?;
            Ok(json!(client.convert(&input, from, to)?))
        }
    }
}

fn parse_all<T>(raw: &[String]) -> CliResult<Vec<T>>
where
    T: std::str::FromStr<Err = crate::errors::ChemSpiderError>,
{
    raw.iter()
        .map(|s| s.trim().parse::<T>().map_err(CliError::from))
        .collect()
}

fn render_results(results: &Results) -> CliResult<Value> {
    let ids = results.ids()?;
    Ok(json!({
        "query_id": results.query_id().map(|q| q.to_string()),
        "status": results.status().as_str(),
        "message": results.message(),
        "duration_ms": results.duration().map(|d| d.as_millis() as u64),
        "count": ids.len(),
        "results": ids,
    }))
}

fn describe(compound: &Compound) -> ChemSpiderResult<Value> {
    let details = compound.details()?;
    Ok(json!({
        "record_id": compound.record_id(),
        "common_name": details.common_name,
        "molecular_formula": details.formula,
        "smiles": details.smiles,
        "average_mass": details.average_mass,
        "molecular_weight": details.molecular_weight,
        "monoisotopic_mass": details.monoisotopic_mass,
        "nominal_mass": details.nominal_mass,
        "reference_count": details.reference_count,
        "datasource_count": details.data_source_count,
        "pubmed_count": details.pub_med_count,
        "rsc_count": details.rsc_count,
        "inchi": compound.inchi()?.as_str(),
        "inchikey": compound.inchikey()?.as_str(),
        "image_url": compound.image_url(),
    }))
}
