use actix_web::{web, HttpResponse};
use entities::geo::GeoPoint;
use entities::stations::StationId;
use serde::Deserialize;

use crate::{errors::ApiError, use_case_app_container::UseCaseAppContainer};

#[derive(Deserialize)]
struct SearchQuery {
    query: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct NearbyQuery {
    longitude: f64,
    latitude: f64,
    max_distance: Option<f64>,
}

async fn list_stations(app: web::Data<UseCaseAppContainer>) -> Result<HttpResponse, ApiError> {
    let stations = app
        .get_client()
        .station_admin()
        .list()
        .await
        .map_err(ApiError::InternalServerError)?;
    Ok(HttpResponse::Ok().json(stations))
}

async fn get_station(
    id: web::Path<StationId>,
    app: web::Data<UseCaseAppContainer>,
) -> Result<HttpResponse, ApiError> {
    let station = app
        .get_client()
        .station_admin()
        .get(id.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(station))
}

async fn search_stations(
    query: web::Query<SearchQuery>,
    app: web::Data<UseCaseAppContainer>,
) -> Result<HttpResponse, ApiError> {
    let stations = app
        .get_client()
        .station_admin()
        .search(query.into_inner().query)
        .await
        .map_err(ApiError::InternalServerError)?;
    Ok(HttpResponse::Ok().json(stations))
}

async fn nearby_stations(
    query: web::Query<NearbyQuery>,
    app: web::Data<UseCaseAppContainer>,
) -> Result<HttpResponse, ApiError> {
    let query = query.into_inner();
    let stations = app
        .get_client()
        .station_admin()
        .nearby(
            GeoPoint::new(query.longitude, query.latitude),
            query.max_distance,
        )
        .await
        .map_err(ApiError::InternalServerError)?;
    Ok(HttpResponse::Ok().json(stations))
}

pub fn init_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/stations")
            .service(web::resource("").route(web::get().to(list_stations)))
            .service(web::resource("/search").route(web::get().to(search_stations)))
            .service(web::resource("/nearby").route(web::get().to(nearby_stations)))
            .service(web::resource("/{id}").route(web::get().to(get_station))),
    );
}
