//! Opportunistic recomputation of stale cached prices.
//!
//! The catalog routes never recompute inline. They poke a `SweepHandle`, and a
//! single background worker owned by the runtime drains the signal channel and
//! runs one sweep at a time. The channel holds one pending signal, so a burst
//! of list requests coalesces into a single sweep instead of racing
//! duplicates.

use tokio::sync::mpsc;

use crate::repository::{ProductReader, ProductWriter, SpotPriceReader};
use crate::services::ServiceResult;
use crate::services::pricing::{self, SpotBoard};
use crate::{DEFAULT_PRICE_REFRESH_HOURS, DEFAULT_SWEEP_BATCH_SIZE};

/// Tuning for the sweep: how old a cached price may get and how many products
/// one run may touch.
#[derive(Debug, Clone)]
pub struct SweeperConfig {
    pub stale_after: chrono::Duration,
    pub batch_size: i64,
}

impl Default for SweeperConfig {
    fn default() -> Self {
        Self {
            stale_after: chrono::Duration::hours(DEFAULT_PRICE_REFRESH_HOURS),
            batch_size: DEFAULT_SWEEP_BATCH_SIZE,
        }
    }
}

/// Outcome of one sweep run, logged by the worker.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SweepReport {
    /// Products picked up by this run.
    pub scanned: usize,
    pub updated: usize,
    pub failed: usize,
}

/// Run one sweep: recompute and persist prices for up to `batch_size` stale
/// products. Per-product failures are logged and counted; the loop never
/// aborts early.
pub fn sweep_once<R>(repo: &R, config: &SweeperConfig) -> ServiceResult<SweepReport>
where
    R: ProductReader + ProductWriter + SpotPriceReader + ?Sized,
{
    let now = chrono::Local::now().naive_utc();
    let threshold = now - config.stale_after;

    if repo.count_stale_products(threshold)? == 0 {
        return Ok(SweepReport::default());
    }

    let products = repo.list_stale_products(threshold, config.batch_size)?;
    let board = SpotBoard::from_rows(repo.list_spot_prices()?);

    let mut report = SweepReport {
        scanned: products.len(),
        ..SweepReport::default()
    };

    for product in products {
        match refresh_product_price(repo, &product, &board, now) {
            Ok(()) => report.updated += 1,
            Err(err) => {
                report.failed += 1;
                log::error!("price sweep failed for product {}: {err}", product.id);
            }
        }
    }

    Ok(report)
}

/// Recompute one product and write back its base and variant totals. The
/// first breakdown doubles as the base price, rounded the same way as every
/// other persisted total.
fn refresh_product_price<R>(
    repo: &R,
    product: &crate::domain::product::Product,
    board: &SpotBoard,
    now: chrono::NaiveDateTime,
) -> ServiceResult<()>
where
    R: ProductWriter + ?Sized,
{
    let breakdowns = pricing::product_breakdowns(product, board);

    let Some(first) = breakdowns.first() else {
        return Ok(());
    };

    repo.set_product_price(product.id, first.rounded_total, now)?;

    for entry in &breakdowns {
        if let Some(variant_id) = entry.variant_id {
            repo.set_variant_price(product.id, variant_id, entry.rounded_total, now)?;
        }
    }

    Ok(())
}

/// Cheap, cloneable signal sender handed to route handlers.
#[derive(Clone)]
pub struct SweepHandle {
    tx: mpsc::Sender<()>,
}

impl SweepHandle {
    /// Request a sweep. Returns immediately; when a sweep is already pending
    /// the signal is dropped, which is exactly the coalescing we want.
    pub fn poke(&self) {
        if self.tx.try_send(()).is_err() {
            log::debug!("price sweep already pending");
        }
    }
}

/// Background worker that owns the receiving end of the signal channel.
pub struct PriceSweeper<R> {
    repo: R,
    config: SweeperConfig,
    rx: mpsc::Receiver<()>,
}

impl<R> PriceSweeper<R>
where
    R: ProductReader + ProductWriter + SpotPriceReader,
{
    pub fn new(repo: R, config: SweeperConfig) -> (Self, SweepHandle) {
        let (tx, rx) = mpsc::channel(1);
        (Self { repo, config, rx }, SweepHandle { tx })
    }

    /// Drain signals until every handle is dropped. Intended to be spawned as
    /// a detached task at startup.
    pub async fn run(mut self) {
        while self.rx.recv().await.is_some() {
            match sweep_once(&self.repo, &self.config) {
                Ok(report) if report.scanned > 0 => {
                    log::info!(
                        "price sweep: {} scanned, {} updated, {} failed",
                        report.scanned,
                        report.updated,
                        report.failed
                    );
                }
                Ok(_) => log::debug!("price sweep: nothing stale"),
                Err(err) => log::error!("price sweep aborted: {err}"),
            }
        }
    }
}
