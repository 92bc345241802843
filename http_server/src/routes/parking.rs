use actix_web::{web, HttpResponse};
use chrono::{DateTime, Utc};
use entities::parking::LotId;
use entities::stations::StationId;
use serde::Deserialize;

use crate::{errors::ApiError, use_case_app_container::UseCaseAppContainer};

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct AvailabilityQuery {
    start_time: DateTime<Utc>,
    end_time: DateTime<Utc>,
}

async fn list_lots(app: web::Data<UseCaseAppContainer>) -> Result<HttpResponse, ApiError> {
    let lots = app
        .get_client()
        .lot_admin()
        .list()
        .await
        .map_err(ApiError::InternalServerError)?;
    Ok(HttpResponse::Ok().json(lots))
}

async fn lots_for_station(
    station: web::Path<StationId>,
    app: web::Data<UseCaseAppContainer>,
) -> Result<HttpResponse, ApiError> {
    let lots = app
        .get_client()
        .lot_admin()
        .for_station(station.into_inner())
        .await
        .map_err(ApiError::InternalServerError)?;
    Ok(HttpResponse::Ok().json(lots))
}

async fn check_availability(
    lot: web::Path<LotId>,
    query: web::Query<AvailabilityQuery>,
    app: web::Data<UseCaseAppContainer>,
) -> Result<HttpResponse, ApiError> {
    let query = query.into_inner();
    let availability = app
        .get_client()
        .check_availability()
        .check(lot.into_inner(), query.start_time, query.end_time)
        .await?;
    Ok(HttpResponse::Ok().json(availability))
}

pub fn init_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/parking-lots")
            .service(web::resource("").route(web::get().to(list_lots)))
            .service(
                web::resource("/by-station/{stationId}").route(web::get().to(lots_for_station)),
            )
            .service(
                web::resource("/{lotId}/availability").route(web::get().to(check_availability)),
            ),
    );
}
