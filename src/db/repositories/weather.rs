use crate::cache::CacheTable;
use crate::entities::{prelude::*, weathers};
use crate::models::Weather;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter, QueryOrder,
    Set, TransactionTrait,
};

pub struct WeatherRepository {
    conn: DatabaseConnection,
}

impl WeatherRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn list_for_location(&self, location_id: i32) -> Result<Vec<weathers::Model>, DbErr> {
        Weathers::find()
            .filter(weathers::Column::LocationId.eq(location_id))
            .order_by_asc(weathers::Column::Id)
            .all(&self.conn)
            .await
    }

    /// Inserts all days in one transaction, preserving their order.
    pub async fn insert_all(
        &self,
        location_id: i32,
        days: Vec<Weather>,
    ) -> Result<Vec<weathers::Model>, DbErr> {
        let txn = self.conn.begin().await?;
        let mut rows = Vec::with_capacity(days.len());

        for day in days {
            let row = weathers::ActiveModel {
                forecast: Set(day.forecast),
                time: Set(day.time),
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
impl CacheTable for WeatherRepository {
    type Key = i32;
    type Record = Vec<Weather>;
    type Row = Vec<weathers::Model>;

    fn table(&self) -> &'static str {
        "weathers"
    }

    /// No rows is a miss, so an empty forecast is never cached.
    async fn select(&self, key: &i32) -> Result<Option<Self::Row>, DbErr> {
        let rows = self.list_for_location(*key).await?;
        Ok((!rows.is_empty()).then_some(rows))
    }

    async fn insert(&self, key: &i32, record: Vec<Weather>) -> Result<Self::Row, DbErr> {
        self.insert_all(*key, record).await
    }
}

impl From<weathers::Model> for Weather {
    fn from(model: weathers::Model) -> Self {
        Self {
            forecast: model.forecast,
            time: model.time,
        }
    }
}
