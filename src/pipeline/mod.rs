//! The ingestion/merge/filter pipeline: fetch both sources, decide per
//! source whether reprocessing is needed, merge against prior state, filter
//! by reliability, optionally backfill hostnames, and persist.

mod enrich;
mod filter;

// Re-export public API
pub use enrich::{reverse_query_name, ReverseLookupEnricher};
pub use filter::MergeState;


use std::path::PathBuf;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use log::{debug, info};

use crate::config::{
    Config, DNS_TIMEOUT_SECS, FLAT_SOURCE_TAG, MIN_POOL_SIZE, STRUCTURED_SOURCE_TAG,
};
use crate::fetch;
use crate::initialization::init_client;
use crate::models::{Dataset, RunMetadata};
use crate::parse;
use crate::persist;
use crate::query::{HickoryExchange, ResolverPool};

/// Which output files a run should rewrite.
///
/// The dataset is rewritten only when at least one source was reprocessed,
/// so unchanged reruns leave it byte-identical on disk. The flat list
/// follows the same rule, plus a first-run exception: it is written when
/// absent even if nothing changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WritePlan {
    pub dataset: bool,
    pub flat: bool,
}

impl WritePlan {
    pub fn for_run(sources_processed: usize, flat_exists: bool) -> Self {
        WritePlan {
            dataset: sources_processed > 0,
            flat: sources_processed > 0 || !flat_exists,
        }
    }
}

/// Summary of one pipeline run.
#[derive(Debug, Clone)]
pub struct PipelineReport {
    /// Records that passed the reliability threshold.
    pub reliable: usize,
    /// Records rejected by the threshold.
    pub unreliable: usize,
    /// Sources whose content changed and were reprocessed.
    pub sources_processed: usize,
    /// Path of the structured JSON dataset.
    pub json_path: PathBuf,
    /// Path of the flat resolver list.
    pub flat_path: PathBuf,
    /// Elapsed time in seconds.
    pub elapsed_seconds: f64,
}

/// Runs the full pipeline with the provided configuration.
///
/// Fetch or parse failures abort the run with nothing persisted; per-record
/// reverse-lookup failures are recorded on the records and in the run
/// metadata instead.
pub async fn run_pipeline(config: &Config) -> Result<PipelineReport> {
    let started = Instant::now();

    let previous = persist::load_dataset(&config.output_json)
        .context("failed to load the previous dataset")?;
    let (mut meta, previous_records) = match previous {
        Some(dataset) => (
            RunMetadata::carried_over(Some(&dataset.meta)),
            dataset.nameservers,
        ),
        None => (RunMetadata::carried_over(None), Vec::new()),
    };
    debug!(
        "current metadata: {}",
        serde_json::to_string_pretty(&meta).unwrap_or_default()
    );

    let client = init_client(config.timeout_seconds).context("failed to build the HTTP client")?;

    // Structured source: fetched and digested every run; reprocessed only
    // when both digests changed.
    let fetched = fetch::fetch_source(&client, &config.structured_url).await?;
    let structured_records = parse::parse_structured(&fetched.bytes, &config.structured_url)?;
    let structured_changed = meta.structured.changed(&fetched.md5, &fetched.sha512);
    meta.structured.record_fetch(
        &config.structured_url,
        structured_records.len(),
        fetched.md5,
        fetched.sha512,
    );
    info!(
        "{} nameservers obtained from {}",
        structured_records.len(),
        config.structured_url
    );
    info!(
        "structured source {} reprocessing",
        if structured_changed {
            "requires"
        } else {
            "doesn't require"
        }
    );

    // Flat source: fetched even when disabled so the provenance metadata
    // stays current.
    let fetched = fetch::fetch_source(&client, &config.flat_url).await?;
    let flat_text = String::from_utf8_lossy(&fetched.bytes).into_owned();
    let flat_records = parse::parse_flat(&flat_text);
    let flat_changed = meta.flat.changed(&fetched.md5, &fetched.sha512);
    meta.flat
        .record_fetch(&config.flat_url, flat_records.len(), fetched.md5, fetched.sha512);
    info!(
        "{} nameservers obtained from {}",
        flat_records.len(),
        config.flat_url
    );
    info!(
        "flat source {} reprocessing",
        if flat_changed {
            "requires"
        } else {
            "doesn't require"
        }
    );

    let mut state = MergeState::new(config.normalized_threshold());
    let mut sources_processed = 0usize;

    if structured_changed {
        state.process_structured(structured_records);
        sources_processed += 1;
    } else {
        state.repopulate_from(&previous_records, STRUCTURED_SOURCE_TAG);
    }

    if config.flat_enabled {
        if flat_changed {
            if config.lookup_missing_names {
                let mut pool = match &config.resolver_seed {
                    Some(path) => ResolverPool::with_seed_file(path.clone(), MIN_POOL_SIZE),
                    None => ResolverPool::default(),
                };
                let exchange = HickoryExchange::new(Duration::from_secs(DNS_TIMEOUT_SECS));
                let mut enricher = ReverseLookupEnricher::new(&mut pool, &exchange);
                state.process_flat(flat_records, Some(&mut enricher)).await;
            } else {
                state.process_flat(flat_records, None).await;
            }
            sources_processed += 1;
        } else {
            state.repopulate_from(&previous_records, FLAT_SOURCE_TAG);
        }
    }

    state.log_statistics(sources_processed);
    info!(
        "{} nameservers pass the reliability threshold",
        state.reliable_count()
    );

    meta.errors.extend(state.soft_errors().iter().cloned());
    let unreliable = state.unreliable_count();
    let nameservers = state.into_reliable_records();

    let plan = WritePlan::for_run(sources_processed, config.output.exists());
    if plan.dataset {
        let dataset = Dataset {
            meta,
            nameservers: nameservers.clone(),
        };
        persist::write_dataset(&config.output_json, &dataset)?;
    } else {
        info!("no changes to write to disk");
    }

    if plan.flat {
        persist::write_flat_list(&config.output, &nameservers)?;
    } else {
        info!("skipped writing flat IP file to disk");
    }

    info!("done.");
    Ok(PipelineReport {
        reliable: nameservers.len(),
        unreliable,
        sources_processed,
        json_path: config.output_json.clone(),
        flat_path: config.output.clone(),
        elapsed_seconds: started.elapsed().as_secs_f64(),
    })
}
