//! Offset-driven pagination over a catalog listing.

use color_eyre::Result;
use std::future::Future;
use tracing::debug;

use crate::error::CatalogError;

use super::api_types::Page;

/// Totals gathered while walking a listing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WalkSummary {
  pub pages: u64,
  pub records: u64,
}

/// Walk a listing from offset 0 until the reported total is exhausted.
///
/// Each page's results go to `sink` before the next page is requested. The
/// total is re-read from every response; a listing that changes size while
/// it is being walked gives no ordering or completeness guarantee.
pub async fn walk<T, F, Fut, S>(mut fetch_page: F, mut sink: S) -> Result<WalkSummary>
where
  F: FnMut(u64) -> Fut,
  Fut: Future<Output = Result<Page<T>>>,
  S: FnMut(Vec<T>) -> Result<()>,
{
  let mut summary = WalkSummary::default();
  let mut offset = 0u64;

  loop {
    let page = fetch_page(offset).await?;
    let next_offset = page.next_offset();
    let last = page.is_last();

    debug!(
      offset = page.offset,
      count = page.count,
      total = page.total,
      "Fetched page"
    );

    summary.pages += 1;
    summary.records += page.results.len() as u64;
    sink(page.results)?;

    if last {
      break;
    }
    if page.count == 0 {
      return Err(
        CatalogError::StalledPagination {
          offset: next_offset,
          total: page.total,
        }
        .into(),
      );
    }
    offset = next_offset;
  }

  Ok(summary)
}

#[cfg(test)]
mod tests {
  use super::*;
  use color_eyre::eyre::eyre;
  use std::cell::RefCell;

  /// Serves `total` numbered records in pages of 100.
  fn listing(total: u64, offset: u64) -> Page<u64> {
    let count = total.saturating_sub(offset).min(100);
    Page {
      offset,
      count,
      total,
      results: (offset..offset + count).collect(),
    }
  }

  async fn walk_listing(total: u64) -> (Vec<u64>, Vec<u64>, WalkSummary) {
    let offsets = RefCell::new(Vec::new());
    let mut seen = Vec::new();

    let summary = walk(
      |offset| {
        offsets.borrow_mut().push(offset);
        async move { Ok(listing(total, offset)) }
      },
      |records| {
        seen.extend(records);
        Ok(())
      },
    )
    .await
    .unwrap();

    (offsets.into_inner(), seen, summary)
  }

  #[tokio::test]
  async fn test_walk_250_fetches_three_pages() {
    let (offsets, seen, summary) = walk_listing(250).await;

    assert_eq!(offsets, vec![0, 100, 200]);
    assert_eq!(seen, (0..250).collect::<Vec<_>>());
    assert_eq!(
      summary,
      WalkSummary {
        pages: 3,
        records: 250
      }
    );
  }

  #[tokio::test]
  async fn test_walk_fetch_count_is_ceil_of_total() {
    for total in [1u64, 99, 100, 101, 200, 999, 1000] {
      let (offsets, seen, _) = walk_listing(total).await;
      assert_eq!(offsets.len() as u64, total.div_ceil(100), "total {}", total);
      assert_eq!(seen.len() as u64, total);
    }
  }

  #[tokio::test]
  async fn test_walk_empty_listing_fetches_once() {
    let (offsets, seen, summary) = walk_listing(0).await;
    assert_eq!(offsets, vec![0]);
    assert!(seen.is_empty());
    assert_eq!(summary.pages, 1);
  }

  #[tokio::test]
  async fn test_walk_uses_total_from_each_response() {
    let calls = RefCell::new(0u64);

    let summary = walk(
      |offset| {
        *calls.borrow_mut() += 1;
        // total shrinks after the first page
        let total = if offset == 0 { 300 } else { 150 };
        async move {
          Ok(Page {
            offset,
            count: 100,
            total,
            results: vec![offset],
          })
        }
      },
      |_| Ok(()),
    )
    .await
    .unwrap();

    assert_eq!(*calls.borrow(), 2);
    assert_eq!(summary.pages, 2);
  }

  #[tokio::test]
  async fn test_walk_fetch_error_stops_and_keeps_earlier_pages() {
    let mut stored = Vec::new();

    let result = walk(
      |offset| async move {
        if offset == 0 {
          Ok(listing(250, 0))
        } else {
          Err(eyre!("boom"))
        }
      },
      |records| {
        stored.extend(records);
        Ok(())
      },
    )
    .await;

    assert!(result.is_err());
    assert_eq!(stored.len(), 100);
  }

  #[tokio::test]
  async fn test_walk_sink_error_stops_walk() {
    let calls = RefCell::new(0u64);

    let result = walk(
      |offset| {
        *calls.borrow_mut() += 1;
        async move { Ok(listing(250, offset)) }
      },
      |_| Err(eyre!("disk full")),
    )
    .await;

    assert!(result.is_err());
    assert_eq!(*calls.borrow(), 1);
  }

  #[tokio::test]
  async fn test_walk_empty_page_before_total_is_stall() {
    let result = walk(
      |offset| async move {
        Ok(Page::<u64> {
          offset,
          count: 0,
          total: 10,
          results: Vec::new(),
        })
      },
      |_| Ok(()),
    )
    .await;

    let err = result.unwrap_err();
    assert!(matches!(
      err.downcast_ref::<CatalogError>(),
      Some(CatalogError::StalledPagination {
        offset: 0,
        total: 10
      })
    ));
  }
}
