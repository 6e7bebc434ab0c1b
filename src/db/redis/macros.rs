/// Read-through caching around an async computation.
///
/// Returns the cached value when `$key` is present. Otherwise awaits
/// `$block`, queues the result for the background writer with `$ttl`
/// seconds to live, and returns it. Errors from the cache lookup or the
/// block propagate with `?`, so the surrounding function must return
/// `AppResult`.
///
/// # Example
/// ```ignore
/// let rankings: Vec<ModelRanking> =
///     cached!(cache, CacheKey::Ranking(fp), ttl, self.request_rankings(prompt))?;
/// ```
#[macro_export]
macro_rules! cached {
    ($cache:expr, $key:expr, $ttl:expr, $block:expr) => {{
        if let Some(cached) = $cache.get_from_cache(&$key).await? {
            tracing::debug!(key = %$key, "Cache hit");
            Ok(cached)
        } else {
            let value = $block.await?;
            $cache.set_in_background(&$key, &value, $ttl);
            Ok(value)
        }
    }};
}
