use crate::cache::CacheTable;
use crate::entities::{events, prelude::*};
use crate::models::Event;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter, QueryOrder,
    Set, TransactionTrait,
};

pub struct EventRepository {
    conn: DatabaseConnection,
}

impl EventRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn list_for_location(&self, location_id: i32) -> Result<Vec<events::Model>, DbErr> {
        Events::find()
            .filter(events::Column::LocationId.eq(location_id))
            .order_by_asc(events::Column::Id)
            .all(&self.conn)
            .await
    }

    pub async fn insert_all(
        &self,
        location_id: i32,
        items: Vec<Event>,
    ) -> Result<Vec<events::Model>, DbErr> {
        let txn = self.conn.begin().await?;
        let mut rows = Vec::with_capacity(items.len());

        for event in items {
            let row = events::ActiveModel {
                link: Set(event.link),
                name: Set(event.name),
                event_date: Set(event.event_date),
                summary: Set(event.summary),
                location_id: Set(location_id),
                ..Default::default()
            }
            .insert(&txn)
            .await?;
            rows.push(row);
        }

        txn.commit().await?;
        Ok(rows)
    }
}

#[async_trait::async_trait]
impl CacheTable for EventRepository {
    type Key = i32;
    type Record = Vec<Event>;
    type Row = Vec<events::Model>;

    fn table(&self) -> &'static str {
        "events"
    }

    /// No rows is a miss, so an empty search is never cached.
    async fn select(&self, key: &i32) -> Result<Option<Self::Row>, DbErr> {
        let rows = self.list_for_location(*key).await?;
        Ok((!rows.is_empty()).then_some(rows))
    }

    async fn insert(&self, key: &i32, record: Vec<Event>) -> Result<Self::Row, DbErr> {
        self.insert_all(*key, record).await
    }
}

impl From<events::Model> for Event {
    fn from(model: events::Model) -> Self {
        Self {
            link: model.link,
            name: model.name,
            event_date: model.event_date,
            summary: model.summary,
        }
    }
}
