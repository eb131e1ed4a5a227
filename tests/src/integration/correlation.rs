//! # Correlation Id Uniqueness
//!
//! Ids generated concurrently across tasks must never collide; a duplicate
//! would let one caller's reply resolve another caller's future.

#[cfg(test)]
mod tests {
    use futures::future::join_all;
    use qb_rpc_gateway::CorrelationIdGenerator;
    use std::collections::HashSet;
    use std::sync::Arc;

    const TASKS: usize = 8;
    const IDS_PER_TASK: usize = 1_250;

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_ten_thousand_concurrent_ids_are_unique() {
        let generator = Arc::new(CorrelationIdGenerator::new());

        let handles = (0..TASKS).map(|_| {
            let generator = Arc::clone(&generator);
            tokio::spawn(async move {
                (0..IDS_PER_TASK)
                    .map(|_| generator.next_id().into_string())
                    .collect::<Vec<_>>()
            })
        });

        let mut ids = HashSet::new();
        for batch in join_all(handles).await {
            for id in batch.expect("generator task") {
                ids.insert(id);
            }
        }

        assert_eq!(ids.len(), TASKS * IDS_PER_TASK);
        assert_eq!(generator.generated(), (TASKS * IDS_PER_TASK) as u64);
    }

    #[tokio::test]
    async fn test_generators_in_different_processes_would_not_collide() {
        // Two generators stand in for two process generations: the random
        // salt keeps their sequences apart even at equal timestamps.
        let first = CorrelationIdGenerator::new();
        let second = CorrelationIdGenerator::new();

        let a: HashSet<_> = (0..100).map(|_| first.next_id().into_string()).collect();
        let b: HashSet<_> = (0..100).map(|_| second.next_id().into_string()).collect();

        assert!(a.is_disjoint(&b));
    }
}
