//! Taxonomy Mapper CLI
//!
//! Resolves local taxonomy ids against the external catalog, or checks a
//! mapping configuration file.
//!
//! Usage:
//!   cargo run --features cli --bin taxonomy-mapper -- \
//!     --catalog config/local_catalog.yaml \
//!     resolve subject --org <ORG_ID> --program program2 "subject1,subject3"
//!
//!   cargo run --features cli --bin taxonomy-mapper -- \
//!     check-config --org <ORG_ID> --org <OTHER_ORG_ID>
//!
//! The access token is read from the variable named by `external.token_env`
//! (default `EXTERNAL_CATALOG_TOKEN`). A `.env` file is honoured.

use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use taxonomy_mapper::{
    CancellationToken, HttpCatalogClient, Mapper, MapperConfig, Operator, StaticCatalogStore,
    TaxonomyKind,
};

#[derive(Parser, Debug)]
#[command(name = "taxonomy-mapper")]
#[command(about = "Map local curriculum taxonomy ids to external catalog ids")]
struct Args {
    /// Mapping configuration (defaults to the built-in tables)
    #[arg(long, short = 'c', env = "TAXONOMY_MAPPER_CONFIG")]
    config: Option<String>,

    /// Local catalog YAML file
    #[arg(long, env = "TAXONOMY_MAPPER_CATALOG")]
    catalog: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Resolve a comma-joined list of local ids of one kind
    Resolve {
        /// program, subject, category (developmental), sub_category (skill), age or grade
        kind: TaxonomyKind,

        /// Organization the record belongs to
        #[arg(long)]
        org: String,

        /// Local program id (ignored when resolving programs)
        #[arg(long, default_value = "")]
        program: String,

        /// Local category id (sub-categories only)
        #[arg(long)]
        category: Option<String>,

        /// Operator user id sent with external requests
        #[arg(long, default_value = "taxonomy-mapper")]
        user: String,

        /// Output the result as JSON
        #[arg(long)]
        json: bool,

        /// Comma-joined local ids
        ids: String,
    },

    /// Validate the configuration and classify organizations
    CheckConfig {
        /// Organization ids to classify
        #[arg(long = "org")]
        orgs: Vec<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "taxonomy_mapper=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let args = Args::parse();

    let config = match &args.config {
        Some(path) => {
            tracing::info!(path = %path, "Loading configuration");
            MapperConfig::from_file(path).with_context(|| format!("loading {}", path))?
        }
        None => MapperConfig::builtin().context("loading built-in configuration")?,
    };

    match args.command {
        Command::CheckConfig { orgs } => {
            check_config(&config, &orgs);
            Ok(())
        }
        Command::Resolve {
            kind,
            org,
            program,
            category,
            user,
            json,
            ids,
        } => {
            let Some(catalog_path) = args.catalog else {
                bail!("--catalog (or TAXONOMY_MAPPER_CATALOG) is required for resolve");
            };
            let store = StaticCatalogStore::from_file(&catalog_path)
                .with_context(|| format!("loading local catalog {}", catalog_path))?;

            let token = std::env::var(&config.external.token_env).with_context(|| {
                format!("{} must hold the access token", config.external.token_env)
            })?;

            let client = HttpCatalogClient::new(&config.external)
                .context("building external catalog client")?;
            let operator = Operator::new(org.clone(), user, token);
            let mapper = Mapper::new(operator, Arc::new(client), Arc::new(store), &config);

            let cancel = CancellationToken::new();
            let ctrl_c = cancel.clone();
            tokio::spawn(async move {
                if tokio::signal::ctrl_c().await.is_ok() {
                    ctrl_c.cancel();
                }
            });

            let resolved = resolve(&mapper, &cancel, kind, &org, &program, category.as_deref(), &ids)
                .await?;

            if json {
                let output = serde_json::json!({
                    "kind": kind,
                    "local": ids,
                    "external": resolved,
                });
                println!("{}", serde_json::to_string_pretty(&output)?);
            } else {
                println!("{}", resolved);
            }
            Ok(())
        }
    }
}

async fn resolve(
    mapper: &Mapper,
    cancel: &CancellationToken,
    kind: TaxonomyKind,
    org: &str,
    program: &str,
    category: Option<&str>,
    ids: &str,
) -> Result<String> {
    if kind != TaxonomyKind::Program && program.is_empty() {
        bail!("--program is required for {}", kind);
    }

    let resolved = match kind {
        TaxonomyKind::Program => {
            taxonomy_mapper::map_joined(ids, move |id| async move {
                mapper.program(cancel, org, &id).await
            })
            .await?
        }
        TaxonomyKind::Subject => mapper.subjects_joined(cancel, org, program, ids).await?,
        TaxonomyKind::Category => mapper.categories_joined(cancel, org, program, ids).await?,
        TaxonomyKind::SubCategory => {
            let Some(category) = category else {
                bail!("--category is required for sub_category");
            };
            mapper
                .sub_categories_joined(cancel, org, program, category, ids)
                .await?
        }
        TaxonomyKind::Age => mapper.ages_joined(cancel, org, program, ids).await?,
        TaxonomyKind::Grade => mapper.grades_joined(cancel, org, program, ids).await?,
    };

    Ok(resolved)
}

fn check_config(config: &MapperConfig, orgs: &[String]) {
    println!("endpoint:              {}", config.external.endpoint);
    println!("default program:       {}", config.fallback.default_program);
    println!("program defaults:      {}", config.fallback.programs.len());
    println!(
        "headquarters orgs:     {}",
        config.organizations.headquarters.len()
    );
    println!(
        "headquarters programs: {}",
        config.organizations.headquarters_programs.join(",")
    );
    println!("age translations:      {}", config.age_names.len());

    let policy = taxonomy_mapper::OrganizationPolicy::from_config(&config.organizations);
    for org in orgs {
        println!("{}: {}", org, policy.organization_type(org));
    }
}
