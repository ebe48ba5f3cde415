//! # FAQ Repository
//!
//! Knowledge-base storage. The bot only ever sees active entries, in
//! creation order, which is also the numbering of the menu it shows.

use super::models::{Faq, FaqCategory, FaqForCreate};
use super::DbPool;
use lib_utils::now_utc;
use sqlx::{query, query_as};

const FAQ_COLUMNS: &str = "id, question, answer, keywords, category, is_active, created_at, updated_at";

pub struct FaqRepository;

impl FaqRepository {
    /// Active entries in creation order.
    pub async fn list_active(pool: &DbPool) -> Result<Vec<Faq>, sqlx::Error> {
        query_as::<_, Faq>(&format!(
            "SELECT {FAQ_COLUMNS} FROM faqs WHERE is_active = 1 ORDER BY created_at ASC, id ASC"
        ))
        .fetch_all(pool)
        .await
    }

    /// Active entries filtered by category and/or a case-insensitive search
    /// over question, answer and keywords. Ordered by category, newest first.
    pub async fn search(
        pool: &DbPool,
        category: Option<FaqCategory>,
        search: Option<&str>,
    ) -> Result<Vec<Faq>, sqlx::Error> {
        let pattern = search
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|s| format!("%{}%", s.to_lowercase()));

        query_as::<_, Faq>(&format!(
            r#"
            SELECT {FAQ_COLUMNS} FROM faqs
            WHERE is_active = 1
              AND (?1 IS NULL OR category = ?1)
              AND (?2 IS NULL
                   OR LOWER(question) LIKE ?2
                   OR LOWER(answer) LIKE ?2
                   OR LOWER(keywords) LIKE ?2)
            ORDER BY category ASC, created_at DESC, id DESC
            "#
        ))
        .bind(category.map(FaqCategory::as_str))
        .bind(pattern)
        .fetch_all(pool)
        .await
    }

    /// Insert a new active entry.
    pub async fn create(pool: &DbPool, faq: FaqForCreate) -> Result<Faq, sqlx::Error> {
        let now = now_utc();
        query_as::<_, Faq>(&format!(
            r#"
            INSERT INTO faqs (question, answer, keywords, category, is_active, created_at, updated_at)
            VALUES (?, ?, ?, ?, 1, ?, ?)
            RETURNING {FAQ_COLUMNS}
            "#
        ))
        .bind(&faq.question)
        .bind(&faq.answer)
        .bind(&faq.keywords)
        .bind(faq.category.as_str())
        .bind(now)
        .bind(now)
        .fetch_one(pool)
        .await
    }

    pub async fn find_by_question(pool: &DbPool, question: &str) -> Result<Option<Faq>, sqlx::Error> {
        query_as::<_, Faq>(&format!("SELECT {FAQ_COLUMNS} FROM faqs WHERE question = ?"))
            .bind(question)
            .fetch_optional(pool)
            .await
    }

    pub async fn count(pool: &DbPool) -> Result<i64, sqlx::Error> {
        let (count,): (i64,) = query_as("SELECT COUNT(*) FROM faqs").fetch_one(pool).await?;
        Ok(count)
    }

    /// Toggle whether the bot may use an entry. Returns whether a row changed.
    pub async fn set_active(pool: &DbPool, id: i64, active: bool) -> Result<bool, sqlx::Error> {
        let result = query("UPDATE faqs SET is_active = ?, updated_at = ? WHERE id = ?")
            .bind(active)
            .bind(now_utc())
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::store::create_memory_pool;

    async fn seed(pool: &DbPool) -> Vec<Faq> {
        let entries = [
            FaqForCreate::new("How do I track my shipment?", "Use the tracking page.", "track,tracking", FaqCategory::Tracking),
            FaqForCreate::new("What are your shipping rates?", "Rates depend on weight.", "rates,price", FaqCategory::Pricing),
            FaqForCreate::new("How do I request a refund?", "Open a refund claim.", "refund,money back", FaqCategory::Refund),
        ];
        let mut created = Vec::new();
        for entry in entries {
            created.push(FaqRepository::create(pool, entry).await.unwrap());
        }
        created
    }

    #[tokio::test]
    async fn test_list_active_skips_inactive_in_creation_order() {
        let pool = create_memory_pool().await.unwrap();
        let created = seed(&pool).await;

        assert!(FaqRepository::set_active(&pool, created[1].id, false).await.unwrap());

        let active = FaqRepository::list_active(&pool).await.unwrap();
        let ids: Vec<_> = active.iter().map(|f| f.id).collect();
        assert_eq!(ids, vec![created[0].id, created[2].id]);
        assert_eq!(FaqRepository::count(&pool).await.unwrap(), 3);
    }

    #[tokio::test]
    async fn test_search_by_category_and_text() {
        let pool = create_memory_pool().await.unwrap();
        seed(&pool).await;

        let refunds = FaqRepository::search(&pool, Some(FaqCategory::Refund), None).await.unwrap();
        assert_eq!(refunds.len(), 1);

        let by_text = FaqRepository::search(&pool, None, Some("TRACKING")).await.unwrap();
        assert_eq!(by_text.len(), 1);
        assert_eq!(by_text[0].category, FaqCategory::Tracking);

        let blank = FaqRepository::search(&pool, None, Some("  ")).await.unwrap();
        assert_eq!(blank.len(), 3);

        let none = FaqRepository::search(&pool, Some(FaqCategory::Pickup), Some("track")).await.unwrap();
        assert!(none.is_empty());
    }

    #[tokio::test]
    async fn test_find_by_question() {
        let pool = create_memory_pool().await.unwrap();
        seed(&pool).await;

        let found = FaqRepository::find_by_question(&pool, "How do I request a refund?")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(found.keywords_list(), vec!["refund", "money back"]);
        assert!(FaqRepository::find_by_question(&pool, "Unknown?").await.unwrap().is_none());
    }
}
