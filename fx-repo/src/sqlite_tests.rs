//! SQLite repository integration tests.

#[cfg(test)]
mod tests {
    use fx_types::{ExchangeRateRepository, PairId, RepoError, SyncLogLevel};
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    use crate::SqliteRepo;

    async fn setup_repo() -> SqliteRepo {
        SqliteRepo::new("sqlite::memory:").await.unwrap()
    }

    fn pair(source: &str, target: &str) -> PairId {
        PairId::new(source, target)
    }

    #[tokio::test]
    async fn test_upsert_pair_creates_without_rate() {
        let repo = setup_repo().await;

        let created = repo.upsert_pair(&pair("USD", "EUR"), true).await.unwrap();

        assert_eq!(created.id, pair("USD", "EUR"));
        assert!(created.is_active);
        assert_eq!(created.middle_rate, None);
        assert_eq!(created.updated_at, None);
    }

    #[tokio::test]
    async fn test_upsert_pair_updates_active_flag() {
        let repo = setup_repo().await;

        repo.upsert_pair(&pair("USD", "EUR"), true).await.unwrap();
        let updated = repo.upsert_pair(&pair("USD", "EUR"), false).await.unwrap();

        assert!(!updated.is_active);
        assert_eq!(repo.list_pairs().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_list_active_pairs_filters_inactive() {
        let repo = setup_repo().await;

        repo.upsert_pair(&pair("USD", "EUR"), true).await.unwrap();
        repo.upsert_pair(&pair("GBP", "INR"), false).await.unwrap();
        repo.upsert_pair(&pair("CAD", "USD"), true).await.unwrap();

        let active: Vec<PairId> = repo
            .list_active_pairs()
            .await
            .unwrap()
            .into_iter()
            .map(|p| p.id)
            .collect();

        assert_eq!(active, vec![pair("CAD", "USD"), pair("USD", "EUR")]);
        assert_eq!(repo.list_pairs().await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_get_offset_defaults_to_zero() {
        let repo = setup_repo().await;

        let offset = repo.get_offset(&pair("USD", "EUR")).await.unwrap();

        assert_eq!(offset, Decimal::ZERO);
        assert!(repo.load_offsets().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_set_offset_overwrites() {
        let repo = setup_repo().await;
        let id = pair("USD", "EUR");

        repo.set_offset(&id, dec!(0.01)).await.unwrap();
        repo.set_offset(&id, dec!(-0.0025)).await.unwrap();

        assert_eq!(repo.get_offset(&id).await.unwrap(), dec!(-0.0025));
        let offsets = repo.load_offsets().await.unwrap();
        assert_eq!(offsets.len(), 1);
        assert_eq!(offsets[&id], dec!(-0.0025));
    }

    #[tokio::test]
    async fn test_save_default_offset_keeps_existing_value() {
        let repo = setup_repo().await;
        let configured = pair("USD", "EUR");
        let fresh = pair("USD", "GBP");

        repo.set_offset(&configured, dec!(0.5)).await.unwrap();

        assert_eq!(repo.save_default_offset(&configured).await.unwrap(), dec!(0.5));
        assert_eq!(repo.save_default_offset(&fresh).await.unwrap(), Decimal::ZERO);
        assert_eq!(repo.load_offsets().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_commit_persists_staged_rates() {
        let repo = setup_repo().await;
        repo.upsert_pair(&pair("USD", "EUR"), true).await.unwrap();
        repo.upsert_pair(&pair("EUR", "GBP"), true).await.unwrap();

        let mut tx = repo.begin_rate_update().await.unwrap();
        tx.stage_rate_update(&pair("USD", "EUR"), dec!(0.94)).await.unwrap();
        tx.stage_rate_update(&pair("EUR", "GBP"), dec!(0.840426)).await.unwrap();
        tx.commit().await.unwrap();

        let pairs = repo.list_pairs().await.unwrap();
        let eur_gbp = pairs.iter().find(|p| p.id == pair("EUR", "GBP")).unwrap();
        let usd_eur = pairs.iter().find(|p| p.id == pair("USD", "EUR")).unwrap();
        assert_eq!(eur_gbp.middle_rate, Some(dec!(0.840426)));
        assert_eq!(usd_eur.middle_rate, Some(dec!(0.94)));
        assert!(usd_eur.updated_at.is_some());
        assert_eq!(usd_eur.updated_at, eur_gbp.updated_at);
    }

    #[tokio::test]
    async fn test_rollback_discards_staged_rates() {
        let repo = setup_repo().await;
        repo.upsert_pair(&pair("USD", "EUR"), true).await.unwrap();

        let mut tx = repo.begin_rate_update().await.unwrap();
        tx.stage_rate_update(&pair("USD", "EUR"), dec!(0.94)).await.unwrap();
        tx.rollback().await.unwrap();

        let pairs = repo.list_pairs().await.unwrap();
        assert_eq!(pairs[0].middle_rate, None);
        assert_eq!(pairs[0].updated_at, None);
    }

    #[tokio::test]
    async fn test_dropped_transaction_discards_staged_rates() {
        let repo = setup_repo().await;
        repo.upsert_pair(&pair("USD", "EUR"), true).await.unwrap();

        {
            let mut tx = repo.begin_rate_update().await.unwrap();
            tx.stage_rate_update(&pair("USD", "EUR"), dec!(0.94)).await.unwrap();
        }

        let pairs = repo.list_pairs().await.unwrap();
        assert_eq!(pairs[0].middle_rate, None);
    }

    #[tokio::test]
    async fn test_stage_unknown_pair_is_not_found() {
        let repo = setup_repo().await;

        let mut tx = repo.begin_rate_update().await.unwrap();
        let err = tx
            .stage_rate_update(&pair("USD", "XXX"), dec!(1))
            .await
            .unwrap_err();
        tx.rollback().await.unwrap();

        assert!(matches!(err, RepoError::NotFound));
    }

    #[tokio::test]
    async fn test_sync_log_lists_newest_first() {
        let repo = setup_repo().await;

        repo.log_sync_warning("first").await.unwrap();
        repo.log_sync_warning("second").await.unwrap();
        let third = repo.log_sync_warning("third").await.unwrap();

        let entries = repo.list_sync_log(2).await.unwrap();

        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].id, third.id);
        assert_eq!(entries[0].message, "third");
        assert_eq!(entries[0].level, SyncLogLevel::Warning);
        assert_eq!(entries[1].message, "second");
    }

    #[tokio::test]
    async fn test_file_database_is_created() {
        let dir = tempfile::tempdir().unwrap();
        let url = format!("sqlite://{}/data/fx.db", dir.path().display());

        let repo = SqliteRepo::new(&url).await.unwrap();
        repo.upsert_pair(&pair("USD", "EUR"), true).await.unwrap();
        drop(repo);
        assert!(dir.path().join("data").join("fx.db").exists());

        let reopened = SqliteRepo::new(&url).await.unwrap();
        assert_eq!(reopened.list_pairs().await.unwrap().len(), 1);
        reopened.pool().close().await;
    }
}
