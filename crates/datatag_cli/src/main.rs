//! `datatag` command-line entry point.
//!
//! # Responsibility
//! - Load configuration and catalogs, then wire the extractor and gateway
//!   the configuration selects.
//! - Expose taxonomy browsing, dataset filtering and annotation commands.

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use datatag_core::db::open_db;
use datatag_core::{
    filter_datasets, init_logging, load_config, load_datasets, load_taxonomy, Annotation,
    AnnotationExtractor, AnnotationSession, AppConfig, AppState, CandidateRouting, Dataset,
    ExtractorConfig, JsonFileGateway, LabelMatchExtractor, PersistenceGateway,
    SqliteAnnotationRepository, StoreConfig, SubprocessExtractor, TagList, Taxonomy,
    TaxonomyNode,
};
use log::info;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "datatag")]
#[command(
    version,
    about = "Tag dataset catalogs against a taxonomy and filter them by tag"
)]
struct Cli {
    #[command(flatten)]
    source: SourceArgs,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct SourceArgs {
    /// JSON configuration file.
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Taxonomy file; overrides the configured path.
    #[arg(long, global = true)]
    taxonomy: Option<PathBuf>,
    /// Dataset catalog file; overrides the configured path.
    #[arg(long, global = true)]
    datasets: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the taxonomy tree, optionally pruned to labels matching a query.
    Tree {
        #[arg(long)]
        search: Option<String>,
    },
    /// List datasets carrying every given tag.
    ///
    /// Exclusion tags are matched like the other lists: a dataset must list
    /// the tag among its exclusion terms to be shown.
    List {
        #[arg(long = "keyword")]
        keywords: Vec<String>,
        #[arg(long = "inclusion")]
        inclusions: Vec<String>,
        #[arg(long = "exclusion")]
        exclusions: Vec<String>,
    },
    /// Show one dataset with its tag sets.
    Show { dataset: String },
    /// Extract tags from free text and merge them into a dataset.
    ///
    /// Without `--commit` the merged lists are only printed.
    Annotate {
        dataset: String,
        #[arg(long)]
        text: String,
        #[arg(long)]
        commit: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    run(cli)
}

fn run(cli: Cli) -> Result<()> {
    let config = resolve_config(&cli.source)?;
    start_logging(&config)?;

    let taxonomy = load_taxonomy(&config.taxonomy_path)?;
    let mut datasets = load_datasets(&config.datasets_path)?;
    let mut store = match &config.store {
        StoreConfig::Json => None,
        StoreConfig::Sqlite { path } => {
            let mut conn = open_db(path)
                .with_context(|| format!("failed to open annotation store `{}`", path.display()))?;
            let applied =
                SqliteAnnotationRepository::try_new(&mut conn)?.apply_stored(&mut datasets)?;
            info!("event=catalog_load module=cli status=ok overlay=sqlite applied={applied}");
            Some(conn)
        }
    };
    let state = AppState::new(taxonomy, datasets);

    match cli.command {
        Commands::Tree { search } => {
            let nodes = match search.as_deref() {
                Some(query) => state.taxonomy().search(query),
                None => state.taxonomy().roots().to_vec(),
            };
            if nodes.is_empty() {
                println!("no matching taxonomy nodes");
            }
            for node in &nodes {
                print_node(node, 0);
            }
            Ok(())
        }
        Commands::List {
            keywords,
            inclusions,
            exclusions,
        } => {
            let visible = filter_datasets(
                state.datasets(),
                &as_tags(&keywords),
                &as_tags(&inclusions),
                &as_tags(&exclusions),
            );
            for dataset in &visible {
                println!("{}\t{}", dataset.id, dataset.label);
            }
            println!("{} of {} datasets", visible.len(), state.datasets().len());
            Ok(())
        }
        Commands::Show { dataset } => {
            let dataset = state
                .dataset(&dataset)
                .with_context(|| format!("dataset not found: {dataset}"))?;
            print_dataset(dataset, state.taxonomy());
            Ok(())
        }
        Commands::Annotate {
            dataset,
            text,
            commit,
        } => {
            let extractor = build_extractor(&config.extractor, state.taxonomy());
            let gateway: Box<dyn PersistenceGateway + '_> = match store.as_mut() {
                Some(conn) => Box::new(SqliteAnnotationRepository::try_new(conn)?),
                None => Box::new(JsonFileGateway::new(config.datasets_path.clone())),
            };
            let mut session = AnnotationSession::new(state, extractor, gateway);
            annotate(&mut session, &dataset, &text, commit)
        }
    }
}

fn resolve_config(args: &SourceArgs) -> Result<AppConfig> {
    let mut config = match (&args.config, &args.taxonomy, &args.datasets) {
        (Some(path), _, _) => load_config(path)
            .with_context(|| format!("failed to load config `{}`", path.display()))?,
        (None, Some(taxonomy), Some(datasets)) => {
            AppConfig::with_paths(taxonomy.clone(), datasets.clone())
        }
        _ => bail!("pass --config, or both --taxonomy and --datasets"),
    };
    if let Some(taxonomy) = &args.taxonomy {
        config.taxonomy_path = taxonomy.clone();
    }
    if let Some(datasets) = &args.datasets {
        config.datasets_path = datasets.clone();
    }
    config.validate()?;
    Ok(config)
}

fn start_logging(config: &AppConfig) -> Result<()> {
    let Some(dir) = &config.log_dir else {
        return Ok(());
    };
    let dir = std::path::absolute(dir)
        .with_context(|| format!("invalid log directory `{}`", dir.display()))?;
    let dir = dir.to_str().context("log directory must be valid UTF-8")?;
    init_logging(config.effective_log_level(), dir).map_err(anyhow::Error::msg)
}

fn build_extractor(config: &ExtractorConfig, taxonomy: &Taxonomy) -> Box<dyn AnnotationExtractor> {
    match config {
        ExtractorConfig::Subprocess {
            program,
            args,
            working_dir,
        } => {
            let mut extractor = SubprocessExtractor::new(program.clone(), args.clone());
            if let Some(dir) = working_dir {
                extractor = extractor.with_working_dir(dir.clone());
            }
            Box::new(extractor)
        }
        ExtractorConfig::LabelMatch {
            keyword,
            inclusion,
            exclusion,
        } => Box::new(LabelMatchExtractor::from_taxonomy(
            taxonomy,
            CandidateRouting {
                keyword: *keyword,
                inclusion: *inclusion,
                exclusion: *exclusion,
            },
        )),
    }
}

fn annotate<E, G>(
    session: &mut AnnotationSession<E, G>,
    dataset_id: &str,
    text: &str,
    commit: bool,
) -> Result<()>
where
    E: AnnotationExtractor,
    G: PersistenceGateway,
{
    session.begin_edit(dataset_id)?;
    let candidates = session.extract(text);
    let summary = if commit {
        session.submit_candidates(&candidates)?
    } else {
        session.add_candidates(&candidates)?
    };

    println!(
        "{} candidates, {} new tags (keywords +{}, inclusions +{}, exclusions +{})",
        candidates.len(),
        summary.total(),
        summary.keywords_added,
        summary.inclusions_added,
        summary.exclusions_added
    );
    if commit {
        let dataset = session
            .state()
            .dataset(dataset_id)
            .with_context(|| format!("dataset not found: {dataset_id}"))?;
        print_dataset(dataset, session.state().taxonomy());
        println!("committed");
    } else {
        let working = session.state().filter();
        for list in TagList::ALL {
            print_tags(list, working.list(list), session.state().taxonomy());
        }
        println!("not committed; rerun with --commit to save");
    }
    Ok(())
}

fn as_tags(ids: &[String]) -> Vec<Annotation> {
    ids.iter()
        .map(|id| Annotation::manual(id.clone(), id.clone()))
        .collect()
}

fn print_node(node: &TaxonomyNode, depth: usize) {
    println!("{}{} ({})", "  ".repeat(depth), node.label, node.id);
    for child in &node.children {
        print_node(child, depth + 1);
    }
}

fn print_dataset(dataset: &Dataset, taxonomy: &Taxonomy) {
    println!("{}\t{}", dataset.id, dataset.label);
    if !dataset.description.is_empty() {
        println!("  {}", dataset.description);
    }
    for list in TagList::ALL {
        print_tags(list, dataset.tags(list), taxonomy);
    }
}

fn print_tags(list: TagList, tags: &[Annotation], taxonomy: &Taxonomy) {
    println!("  {} ({})", list.as_str(), tags.len());
    for tag in tags {
        match taxonomy.path_to(&tag.id) {
            Some(path) => println!("    {}  [{}]", tag.id, path.join(" > ")),
            None => println!("    {}  [unmapped: {}]", tag.id, tag.label),
        }
    }
}
