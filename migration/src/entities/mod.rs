pub mod brand;
pub mod brand_list;
pub mod geo;
pub mod geo_brand_ranking;
pub mod sub_id;
pub mod website;

pub use brand::Entity as BrandEntity;
pub use brand_list::Entity as BrandListEntity;
pub use geo::Entity as GeoEntity;
pub use geo_brand_ranking::Entity as GeoBrandRankingEntity;
pub use sub_id::Entity as SubIdEntity;
pub use website::Entity as WebsiteEntity;
