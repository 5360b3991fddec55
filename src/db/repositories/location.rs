use crate::cache::CacheTable;
use crate::entities::{locations, prelude::*};
use crate::models::Location;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, Set,
};

pub struct LocationRepository {
    conn: DatabaseConnection,
}

impl LocationRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    /// First stored row for `search_query`, oldest first.
    pub async fn find_by_query(&self, search_query: &str) -> Result<Option<locations::Model>, DbErr> {
        Locations::find()
            .filter(locations::Column::SearchQuery.eq(search_query))
            .order_by_asc(locations::Column::Id)
            .one(&self.conn)
            .await
    }

    pub async fn count_by_query(&self, search_query: &str) -> Result<u64, DbErr> {
        Locations::find()
            .filter(locations::Column::SearchQuery.eq(search_query))
            .count(&self.conn)
            .await
    }

    pub async fn insert_location(&self, location: Location) -> Result<locations::Model, DbErr> {
        locations::ActiveModel {
            search_query: Set(location.search_query),
            formatted_query: Set(location.formatted_query),
            latitude: Set(location.latitude),
            longitude: Set(location.longitude),
            ..Default::default()
        }
        .insert(&self.conn)
        .await
    }
}

#[async_trait::async_trait]
impl CacheTable for LocationRepository {
    type Key = str;
    type Record = Location;
    type Row = locations::Model;

    fn table(&self) -> &'static str {
        "locations"
    }

    async fn select(&self, key: &str) -> Result<Option<Self::Row>, DbErr> {
        self.find_by_query(key).await
    }

    async fn insert(&self, key: &str, record: Location) -> Result<Self::Row, DbErr> {
        let record = Location {
            search_query: key.to_string(),
            ..record
        };
        self.insert_location(record).await
    }
}

impl From<locations::Model> for Location {
    fn from(model: locations::Model) -> Self {
        Self {
            search_query: model.search_query,
            formatted_query: model.formatted_query,
            latitude: model.latitude,
            longitude: model.longitude,
        }
    }
}
