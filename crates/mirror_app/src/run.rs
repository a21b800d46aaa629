use std::sync::Arc;

use anyhow::Context;
use mirror_core::{Catalog, LinkRewriteTable};
use mirror_engine::{
    ensure_output_dir, load_catalog, ArticlePipeline, BatchReport, BatchRunner, FetchSettings,
    PipelineSettings, ReqwestFetcher, RetryingFetcher,
};
use mirror_logging::{mirror_info, mirror_warn};
use tokio_util::sync::CancellationToken;

use crate::cli::Cli;
use crate::config::MirrorConfig;

pub async fn run(cli: Cli) -> anyhow::Result<BatchReport> {
    let mut config = MirrorConfig::load(&cli.config)?;
    if let Some(output) = cli.output {
        config.output_dir = output;
    }
    if let Some(mode) = cli.mode {
        config.source_mode = mode.into();
    }

    let catalog = load_catalog(&cli.catalog)?;
    mirror_info!(
        "{} article(s) from {} into {}",
        catalog.entries.len(),
        cli.catalog.display(),
        config.output_dir.display()
    );
    ensure_output_dir(&config.output_dir)
        .with_context(|| format!("cannot use output dir {}", config.output_dir.display()))?;

    let runner = build_runner(&config, &catalog)?;
    let cancel = runner.cancel_token();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            mirror_warn!("Ctrl-C received; finishing the current article before stopping");
            cancel.cancel();
        }
    });

    Ok(runner.run(catalog).await)
}

fn build_runner(config: &MirrorConfig, catalog: &Catalog) -> anyhow::Result<BatchRunner> {
    let links = LinkRewriteTable::from_prefix_swap(
        catalog.urls(),
        &config.source_prefix,
        &config.target_prefix,
    );
    mirror_info!("{} catalog link(s) will be rewritten", links.len());

    let settings = PipelineSettings {
        source_mode: config.source_mode,
        api_endpoint: config.api_endpoint.clone(),
        layout: config.layout(),
        cover: config.cover_policy(),
        post_type: config.post_type(),
        utc_offset: config.utc_offset()?,
    };

    let article_fetcher = RetryingFetcher::new(
        ReqwestFetcher::new(config.article_fetch.fetch_settings(FetchSettings::default())),
        config.article_fetch.retry_policy(),
    );
    let cover_fetcher = RetryingFetcher::new(
        ReqwestFetcher::new(config.cover_fetch.fetch_settings(FetchSettings::for_images())),
        config.cover_fetch.retry_policy(),
    );
    let pipeline = ArticlePipeline::new(
        settings,
        Arc::new(article_fetcher),
        Arc::new(cover_fetcher),
        Arc::new(links),
    );

    Ok(BatchRunner::new(
        pipeline,
        config.politeness_delays(),
        CancellationToken::new(),
    ))
}

/// One line per outcome plus totals, for stdout.
pub fn summary(report: &BatchReport) -> String {
    let mut lines: Vec<String> = report
        .view
        .jobs
        .iter()
        .map(|job| {
            let status = match &job.outcome {
                Some(mirror_core::JobResultKind::Success) => "ok".to_string(),
                Some(mirror_core::JobResultKind::Failed { reason }) => format!("FAILED ({reason})"),
                None => "skipped".to_string(),
            };
            format!("{:>4}  {}  {}", job.job_id, status, job.url)
        })
        .collect();
    lines.push(format!(
        "{} succeeded, {} failed, {} skipped",
        report.view.succeeded,
        report.view.failed,
        report.view.skipped()
    ));
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use mirror_core::{BatchViewModel, JobResultKind, JobRowView, SessionState, Stage, StopPolicy};
    use pretty_assertions::assert_eq;

    fn row(job_id: u64, url: &str, outcome: Option<JobResultKind>) -> JobRowView {
        JobRowView {
            job_id,
            url: url.to_string(),
            stage: Stage::Done,
            outcome,
        }
    }

    #[test]
    fn summary_lists_each_job_and_totals() {
        let report = BatchReport {
            view: BatchViewModel {
                session: SessionState::Finished,
                job_count: 3,
                pending: 1,
                succeeded: 1,
                failed: 1,
                jobs: vec![
                    row(1, "https://a/p/1", Some(JobResultKind::Success)),
                    row(
                        2,
                        "https://a/p/2",
                        Some(JobResultKind::Failed {
                            reason: "http status 404".to_string(),
                        }),
                    ),
                    row(3, "https://a/p/3", None),
                ],
            },
            outcomes: Vec::new(),
            stop: StopPolicy::Interrupted,
        };

        assert_eq!(
            summary(&report),
            "   1  ok  https://a/p/1\n   2  FAILED (http status 404)  https://a/p/2\n   3  skipped  https://a/p/3\n1 succeeded, 1 failed, 1 skipped"
        );
    }

    #[test]
    fn catalog_urls_under_the_source_prefix_are_rewritten() {
        let config = MirrorConfig {
            target_prefix: "/posts".to_string(),
            utc_offset_minutes: Some(0),
            ..MirrorConfig::default()
        };
        let catalog = Catalog {
            entries: vec![mirror_core::CatalogEntry::new("https://zhuanlan.zhihu.com/p/7")],
        };
        let links = LinkRewriteTable::from_prefix_swap(
            catalog.urls(),
            &config.source_prefix,
            &config.target_prefix,
        );
        assert_eq!(links.get("https://zhuanlan.zhihu.com/p/7"), Some("/posts/7"));
        assert!(build_runner(&config, &catalog).is_ok());
    }
}
