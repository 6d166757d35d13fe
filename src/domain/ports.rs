use crate::domain::model::{CountryTimeline, CustomRegion, RawEvent};
use crate::utils::error::Result;
use async_trait::async_trait;
use chrono::NaiveDate;

pub trait Storage: Send + Sync {
    fn read_file(&self, path: &str) -> impl std::future::Future<Output = Result<Vec<u8>>> + Send;
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}

pub trait ConfigProvider: Send + Sync {
    fn years(&self) -> &str;
    fn preferred_country(&self) -> Option<&str>;
    fn input_path(&self) -> &str;
    fn output_path(&self) -> &str;
    fn boundaries_path(&self) -> &str;
    fn output_formats(&self) -> &[String];
    fn summary_path(&self) -> Option<&str>;
    fn as_of(&self) -> Option<NaiveDate>;
    fn custom_regions(&self) -> Vec<CustomRegion>;
}

/// `lookup(lat, lng)`: candidate country codes ordered by ascending specificity.
pub trait ReverseGeocoder: Send + Sync {
    fn lookup(&self, lat: f64, lng: f64) -> Result<Vec<String>>;
}

pub trait CountryNameResolver: Send + Sync {
    fn resolve(&self, code: &str) -> Option<String>;
}

#[async_trait]
pub trait Pipeline: Send + Sync {
    async fn extract(&self) -> Result<Vec<RawEvent>>;
    async fn transform(&self, events: Vec<RawEvent>) -> Result<CountryTimeline>;
    async fn load(&self, result: CountryTimeline) -> Result<String>;
}
