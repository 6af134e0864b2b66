//! Card build orchestration.
//!
//! Build phases:
//! - **Collect** - Content scan or page manifest
//! - **Plan** - Per-page request derivation, skip rules, duplicate outputs
//! - **Generate** - Parallel render + write of every planned card
//! - **Report** - Per-page outcomes, aggregated failure

use crate::{
    card::{CardRenderer, CardRequest, SkipReason, label, text::TextRasterizer},
    config::{PluginOptions, SiteConfig},
    debug, log,
    logger::ProgressLine,
    page::{ContentScanner, Manifest, PageNode, PageSource},
    utils::plural_count,
};
use anyhow::{Result, anyhow};
use rayon::prelude::*;
use rustc_hash::FxHashMap;
use std::path::PathBuf;

// ============================================================================
// Report
// ============================================================================

/// What happened to one page.
#[derive(Debug)]
pub enum CardOutcome {
    Created(PathBuf),
    Skipped(SkipReason),
    Failed(anyhow::Error),
}

/// One page's outcome, tagged by page.
#[derive(Debug)]
pub struct PageResult {
    /// Page identity (source path or manifest id).
    pub id: String,
    /// `{locale}/{slug}`, when the page has a slug.
    pub label: Option<String>,
    pub outcome: CardOutcome,
}

/// Outcomes of a build, in page order.
#[derive(Debug, Default)]
pub struct BuildReport {
    pub pages: Vec<PageResult>,
}

impl BuildReport {
    pub fn created(&self) -> usize {
        self.count(|o| matches!(o, CardOutcome::Created(_)))
    }

    pub fn skipped(&self) -> usize {
        self.count(|o| matches!(o, CardOutcome::Skipped(_)))
    }

    pub fn failed(&self) -> impl Iterator<Item = &PageResult> {
        self.pages
            .iter()
            .filter(|p| matches!(p.outcome, CardOutcome::Failed(_)))
    }

    pub fn has_failures(&self) -> bool {
        self.failed().next().is_some()
    }

    fn count(&self, pred: impl Fn(&CardOutcome) -> bool) -> usize {
        self.pages.iter().filter(|p| pred(&p.outcome)).count()
    }

    /// Log the created count and every failing page.
    pub fn log_summary(&self) {
        for page in self.failed() {
            if let CardOutcome::Failed(e) = &page.outcome {
                let name = page.label.as_deref().unwrap_or(&page.id);
                log!("error"; "{}: {:#}", name, e);
            }
        }
        log!("card"; "created {}", plural_count(self.created(), "social card"));
        debug!("card"; "skipped {}", plural_count(self.skipped(), "page"));
    }

    /// Fail with one aggregated error when any page failed.
    ///
    /// Cards already written for other pages stay on disk.
    pub fn into_result(self) -> Result<Self> {
        let failed = self.failed().count();
        if failed > 0 {
            return Err(anyhow!(
                "failed to create {}",
                plural_count(failed, "social card")
            ));
        }
        Ok(self)
    }
}

// ============================================================================
// Build
// ============================================================================

/// Run the `build` command: collect pages, generate cards, report.
pub fn run(config: &SiteConfig, rasterizer: &dyn TextRasterizer) -> Result<BuildReport> {
    let options = config.options()?;
    let pages = collect_pages(config)?;
    debug!("build"; "found {}", plural_count(pages.len(), "page"));

    let report = build_cards(&pages, &options, rasterizer, config, false)?;
    report.log_summary();
    report.into_result()
}

/// Pages from the manifest when configured, otherwise from the content scan.
pub fn collect_pages(config: &SiteConfig) -> Result<Vec<PageNode>> {
    match &config.site.manifest {
        Some(path) => Manifest::new(path).collect(),
        None => ContentScanner::new(&config.site.content).collect(),
    }
}

/// Generate cards for `pages`.
///
/// Every page is handled independently; failures are recorded in the
/// report rather than stopping the batch. Only setup problems (an
/// unreadable font file) return `Err` here.
pub fn build_cards(
    pages: &[PageNode],
    options: &PluginOptions,
    rasterizer: &dyn TextRasterizer,
    site: &SiteConfig,
    quiet: bool,
) -> Result<BuildReport> {
    let renderer = CardRenderer::new(options, rasterizer, site.get_root())?;
    let (planned, mut results) = plan(pages, options, site);

    let progress = (!quiet && !planned.is_empty())
        .then(|| ProgressLine::new(&[("cards", planned.len())]));

    let generated: Vec<PageResult> = planned
        .into_par_iter()
        .map(|(id, request)| {
            let outcome = match renderer.generate(&request) {
                Ok(()) => {
                    log!("card"; "created card for {}", request.label());
                    CardOutcome::Created(request.output)
                }
                Err(e) => CardOutcome::Failed(e),
            };
            if let Some(p) = &progress {
                p.inc("cards");
            }
            PageResult {
                id,
                label: Some(label(&request.locale, &request.slug)),
                outcome,
            }
        })
        .collect();

    if let Some(p) = progress {
        p.finish();
    }

    results.extend(generated);
    Ok(BuildReport { pages: results })
}

/// Split pages into card requests and skipped results.
fn plan(
    pages: &[PageNode],
    options: &PluginOptions,
    site: &SiteConfig,
) -> (Vec<(String, CardRequest)>, Vec<PageResult>) {
    let mut planned = Vec::new();
    let mut skipped = Vec::new();
    let mut claimed: FxHashMap<PathBuf, &str> = FxHashMap::default();

    for page in pages {
        let locale = page
            .locale
            .as_deref()
            .filter(|l| !l.is_empty())
            .unwrap_or(options.default_language.as_str());

        let request = match CardRequest::from_page(page, options, &site.site.public) {
            Ok(request) => request,
            Err(reason) => {
                match reason {
                    SkipReason::MissingSlug => {
                        log!("warning"; "page without slug: {} ({})", page.id, locale);
                    }
                    _ => {
                        let slug = page.slug.as_deref().unwrap_or_default();
                        log!("warning"; "page without title: {} ({})", slug, locale);
                    }
                }
                skipped.push(PageResult {
                    id: page.id.clone(),
                    label: page.slug.as_deref().map(|slug| label(locale, slug)),
                    outcome: CardOutcome::Skipped(reason),
                });
                continue;
            }
        };

        let reason = if request.output.is_file() {
            debug!("card"; "card exists for {}, skipping", request.label());
            Some(SkipReason::Exists)
        } else if let Some(first) = claimed.get(&request.output) {
            log!(
                "warning";
                "{} writes the same card as {}, skipping",
                page.id,
                first
            );
            Some(SkipReason::Duplicate {
                first: (*first).to_string(),
            })
        } else {
            claimed.insert(request.output.clone(), &page.id);
            None
        };

        match reason {
            Some(reason) => skipped.push(PageResult {
                id: page.id.clone(),
                label: Some(request.label()),
                outcome: CardOutcome::Skipped(reason),
            }),
            None => planned.push((page.id.clone(), request)),
        }
    }

    (planned, skipped)
}
