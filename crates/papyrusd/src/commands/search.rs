//! Module for the "search" command against the remote catalog.

use super::*;

/// Arguments for [`Commands::Search`]
#[derive(Args, Clone)]
pub struct SearchOptions {
  /// Free-text query
  pub query: String,

  /// Number of results to show
  #[arg(long, short = 'n', default_value_t = 10)]
  pub max_results: usize,

  /// Offset of the first result, for paging
  #[arg(long, default_value_t = 0)]
  pub start: usize,

  /// Ordering: relevance, updated or submitted
  #[arg(long, default_value = "relevance")]
  pub sort_by: SortBy,

  /// Direction: asc or desc
  #[arg(long, default_value = "desc")]
  pub sort_order: SortOrder,
}

/// Function for the [`Commands::Search`] in the CLI.
pub async fn search<I: UserInteraction, C: Catalog>(
  interaction: &I,
  catalog: &C,
  options: SearchOptions,
) -> Result<()> {
  let SearchOptions { query, max_results, start, sort_by, sort_order } = options;
  interaction.reply(ResponseContent::Info(&format!("Searching for: {query}")))?;

  let query = SearchQuery::new(query)
    .with_start(start)
    .with_max_results(max_results)
    .with_sort_by(sort_by)
    .with_sort_order(sort_order);
  let entries = catalog.search(&query).await?;

  interaction.reply(ResponseContent::Entries(&entries))
}
