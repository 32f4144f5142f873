//! `flowplan`: inspect and maintain stored mutation logs offline

mod baseline;
mod report;

use anyhow::{bail, Context};
use baseline::Baseline;
use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use flowplan_core::{LogFormat, Roadmap, RoadmapConfig};
use flowplan_model::{Agent, Flow, Section};
use flowplan_overlay::{DurableStore, JsonFileStore};
use flowplan_roadmap::{can_enter_ready, SortColumn, SortDirection, SortSpec};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use tracing_subscriber::EnvFilter;

fn cli() -> Command {
    Command::new("flowplan")
        .version(flowplan_core::VERSION)
        .about("Flow roadmap prioritization: inspect stored mutation logs")
        .arg_required_else_help(true)
        .subcommand_required(true)
        .arg(
            Arg::new("config")
                .long("config")
                .short('c')
                .global(true)
                .value_parser(value_parser!(PathBuf))
                .help("TOML configuration file"),
        )
        .arg(
            Arg::new("store")
                .long("store")
                .global(true)
                .value_parser(value_parser!(PathBuf))
                .help("JSON log file (overrides store_path from config)"),
        )
        .arg(
            Arg::new("baseline")
                .long("baseline")
                .global(true)
                .value_parser(value_parser!(PathBuf))
                .help("Seed document with the static flows and agents"),
        )
        .subcommand(
            Command::new("merge")
                .about("Print merged flows and agents as JSON"),
        )
        .subcommand(
            Command::new("sections")
                .about("Print the three roadmap sections")
                .arg(
                    Arg::new("sort")
                        .long("sort")
                        .help("Display column (priority, name, usage, value, roi, opportunity, ...)"),
                )
                .arg(
                    Arg::new("desc")
                        .long("desc")
                        .action(ArgAction::SetTrue)
                        .help("Sort descending"),
                )
                .arg(
                    Arg::new("json")
                        .long("json")
                        .action(ArgAction::SetTrue)
                        .help("Output the snapshot as JSON"),
                ),
        )
        .subcommand(
            Command::new("metrics")
                .about("Show derived metrics for one flow")
                .arg(Arg::new("flow").required(true).help("Flow id")),
        )
        .subcommand(
            Command::new("check")
                .about("Verify section invariants and Ready completeness"),
        )
        .subcommand(
            Command::new("clear")
                .about("Delete every stored mutation record"),
        )
}

fn init_tracing(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    match format {
        LogFormat::Json => builder.json().init(),
        LogFormat::Pretty => builder.init(),
    }
}

async fn load_config(matches: &ArgMatches) -> anyhow::Result<RoadmapConfig> {
    let mut config = match matches.get_one::<PathBuf>("config") {
        Some(path) => RoadmapConfig::load(path).await?,
        None => RoadmapConfig::default(),
    };
    if let Some(path) = matches.get_one::<PathBuf>("store") {
        config = config.with_store_path(path);
    }
    Ok(config)
}

fn open_store(config: &RoadmapConfig) -> anyhow::Result<Arc<JsonFileStore>> {
    let Some(path) = &config.store_path else {
        bail!("no log file given; pass --store or set store_path in the config");
    };
    let mut store = JsonFileStore::new(path);
    if let Some(quota) = config.quota_bytes {
        store = store.with_quota(quota);
    }
    Ok(Arc::new(store))
}

async fn open_roadmap(
    matches: &ArgMatches,
    config: RoadmapConfig,
) -> anyhow::Result<Roadmap<JsonFileStore>> {
    let baseline = match matches.get_one::<PathBuf>("baseline") {
        Some(path) => Baseline::load(path).await?,
        None => Baseline::default(),
    };
    let store = open_store(&config)?;
    let roadmap = Roadmap::bootstrap(config, baseline.flows, baseline.agents, store)
        .await
        .context("failed to open roadmap")?;
    for warning in roadmap.warnings() {
        tracing::warn!("{}", warning.message);
    }
    Ok(roadmap)
}

fn sort_spec(args: &ArgMatches, default: SortSpec) -> anyhow::Result<SortSpec> {
    let column = match args.get_one::<String>("sort") {
        Some(name) => name.parse::<SortColumn>()?,
        None => default.column,
    };
    let direction = if args.get_flag("desc") {
        SortDirection::Desc
    } else {
        SortDirection::Asc
    };
    Ok(SortSpec::new(column, direction))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let matches = cli().get_matches();
    let config = load_config(&matches).await?;
    init_tracing(config.log_format);

    match matches.subcommand() {
        Some(("merge", _)) => {
            let mut roadmap = open_roadmap(&matches, config).await?;
            let flows: Vec<Flow> = roadmap.sections().flows().cloned().collect();
            let agents: Vec<Agent> = roadmap.agents().to_vec();
            let merged = serde_json::json!({ "flows": flows, "agents": agents });
            println!("{}", serde_json::to_string_pretty(&merged)?);
        }
        Some(("sections", args)) => {
            let spec = sort_spec(args, config.default_sort)?;
            let mut roadmap = open_roadmap(&matches, config).await?;
            roadmap.dispatch(flowplan_core::Command::Sort { spec }, Instant::now())?;
            let snapshot = roadmap.snapshot(Instant::now());
            if args.get_flag("json") {
                println!("{}", serde_json::to_string_pretty(&snapshot)?);
            } else {
                print!("{}", report::sections(&snapshot));
            }
        }
        Some(("metrics", args)) => {
            let Some(id) = args.get_one::<String>("flow") else {
                bail!("missing flow id");
            };
            let mut roadmap = open_roadmap(&matches, config).await?;
            let Some(flow) = roadmap.flow(id) else {
                bail!("no flow with id {id}");
            };
            print!("{}", report::metrics(flow));
        }
        Some(("check", _)) => {
            let mut roadmap = open_roadmap(&matches, config).await?;
            let sections = roadmap.sections();
            let mut problems = Vec::new();
            if let Err(violation) = sections.check_invariants() {
                problems.push(violation.to_string());
            }
            for flow in sections.section(Section::Ready) {
                if let Err(failure) = can_enter_ready(flow) {
                    problems.push(failure.to_string());
                }
            }
            if !problems.is_empty() {
                for problem in &problems {
                    eprintln!("{problem}");
                }
                bail!("{} problem(s) found", problems.len());
            }
            println!("ok: {} flows", sections.len());
        }
        Some(("clear", _)) => {
            let store = open_store(&config)?;
            store.clear().await?;
            tracing::info!(path = %store.path().display(), "cleared mutation logs");
        }
        Some((other, _)) => bail!("unknown subcommand {other}"),
        None => bail!("no subcommand given"),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn cli_definition_is_consistent() {
        cli().debug_assert();
    }

    #[test]
    fn parses_sort_options() {
        let matches = cli()
            .try_get_matches_from(["flowplan", "sections", "--sort", "roi", "--desc"])
            .unwrap();
        let (_, args) = matches.subcommand().unwrap();
        let spec = sort_spec(args, SortSpec::by_priority()).unwrap();
        assert_eq!(spec, SortSpec::new(SortColumn::Roi, SortDirection::Desc));
    }

    #[tokio::test]
    async fn config_file_sets_store_and_log_format() {
        let dir = tempfile::tempdir().unwrap();
        let config_path = dir.path().join("flowplan.toml");
        let store_path = dir.path().join("logs.json");
        tokio::fs::write(
            &config_path,
            format!("store_path = {:?}\nlog_format = \"json\"\n", store_path.display().to_string()),
        )
        .await
        .unwrap();

        let matches = cli()
            .try_get_matches_from(["flowplan", "--config", config_path.to_str().unwrap(), "clear"])
            .unwrap();
        let config = load_config(&matches).await.unwrap();
        assert_eq!(config.store_path, Some(store_path.clone()));
        assert_eq!(config.log_format, LogFormat::Json);

        let store = open_store(&config).unwrap();
        assert_eq!(store.path(), store_path.as_path());
        store.clear().await.unwrap();
    }

    #[tokio::test]
    async fn store_flag_overrides_config() {
        let matches = cli()
            .try_get_matches_from(["flowplan", "--store", "logs.json", "check"])
            .unwrap();
        let config = load_config(&matches).await.unwrap();
        assert_eq!(config.store_path, Some(PathBuf::from("logs.json")));
        assert!(open_store(&config).is_ok());
        assert!(open_store(&RoadmapConfig::default()).is_err());
    }
}
