use actix_web::{web, HttpRequest, HttpResponse};
use chrono::{DateTime, Utc};
use entities::geo::GeoPoint;
use entities::payments::PaymentMethod;
use entities::rides::{RideId, RideStop, RideType};
use entities::vehicles::VehicleType;
use serde::Deserialize;
use serde_json::json;
use use_cases::actor::Actor;
use use_cases::rides::book_ride::RideRequest;
use use_cases::rides::vehicle_availability::VehicleAvailabilityQuery;

use crate::{
    authentication::AuthenticatedUserInfo, errors::ApiError,
    use_case_app_container::UseCaseAppContainer,
};

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct StopPayload {
    name: String,
    longitude: f64,
    latitude: f64,
}

impl From<StopPayload> for RideStop {
    fn from(value: StopPayload) -> Self {
        RideStop {
            name: value.name,
            point: GeoPoint::new(value.longitude, value.latitude),
        }
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct BookRidePayload {
    pickup_location: StopPayload,
    dropoff_location: StopPayload,
    ride_type: RideType,
    scheduled_time: Option<DateTime<Utc>>,
    vehicle_type: VehicleType,
    seats_required: u8,
    #[serde(default)]
    is_shared: bool,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CompleteRidePayload {
    payment_method: PaymentMethod,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct UpdateRidePayload {
    is_shared: bool,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct AvailabilityQuery {
    vehicle_type: VehicleType,
    seats_required: u8,
    #[serde(default)]
    is_shared: bool,
    ride_type: RideType,
    scheduled_time: Option<DateTime<Utc>>,
}

async fn book_ride(
    data: web::Json<BookRidePayload>,
    app: web::Data<UseCaseAppContainer>,
    req: HttpRequest,
) -> Result<HttpResponse, ApiError> {
    let user: AuthenticatedUserInfo = (&req).try_into()?;
    let data = data.into_inner();

    let ride = app
        .get_client()
        .book_ride()
        .book(
            user.user_id(),
            RideRequest {
                pickup: data.pickup_location.into(),
                dropoff: data.dropoff_location.into(),
                ride_type: data.ride_type,
                scheduled_time: data.scheduled_time,
                vehicle_type: data.vehicle_type,
                seats_required: data.seats_required,
                is_shared: data.is_shared,
            },
        )
        .await?;

    Ok(HttpResponse::Created().json(ride))
}

async fn list_rides(
    app: web::Data<UseCaseAppContainer>,
    req: HttpRequest,
) -> Result<HttpResponse, ApiError> {
    let user: AuthenticatedUserInfo = (&req).try_into()?;
    let rides = app
        .get_client()
        .ride_queries()
        .list_for_user(user.user_id())
        .await?;
    Ok(HttpResponse::Ok().json(rides))
}

async fn get_ride(
    id: web::Path<RideId>,
    app: web::Data<UseCaseAppContainer>,
    req: HttpRequest,
) -> Result<HttpResponse, ApiError> {
    let user: AuthenticatedUserInfo = (&req).try_into()?;
    let ride = app
        .get_client()
        .ride_queries()
        .get(user.user_id(), id.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(ride))
}

async fn cancel_ride(
    id: web::Path<RideId>,
    app: web::Data<UseCaseAppContainer>,
    req: HttpRequest,
) -> Result<HttpResponse, ApiError> {
    let user: AuthenticatedUserInfo = (&req).try_into()?;
    let outcome = app
        .get_client()
        .cancel_ride()
        .cancel(user.user_id(), id.into_inner())
        .await?;

    Ok(HttpResponse::Ok().json(json!({
        "ride": outcome.ride,
        "refundAmount": outcome.refund_amount,
        "refundReason": outcome.refund_description,
    })))
}

async fn complete_ride(
    id: web::Path<RideId>,
    data: web::Json<CompleteRidePayload>,
    app: web::Data<UseCaseAppContainer>,
    req: HttpRequest,
) -> Result<HttpResponse, ApiError> {
    let user: AuthenticatedUserInfo = (&req).try_into()?;
    let outcome = app
        .get_client()
        .complete_ride()
        .complete(user.user_id(), id.into_inner(), data.payment_method)
        .await?;

    Ok(HttpResponse::Ok().json(json!({
        "ride": outcome.ride,
        "loyaltyPointsAwarded": outcome.loyalty_points_awarded,
    })))
}

async fn update_ride(
    id: web::Path<RideId>,
    data: web::Json<UpdateRidePayload>,
    app: web::Data<UseCaseAppContainer>,
    req: HttpRequest,
) -> Result<HttpResponse, ApiError> {
    let user: AuthenticatedUserInfo = (&req).try_into()?;
    let ride = app
        .get_client()
        .update_ride()
        .set_sharing(user.user_id(), id.into_inner(), data.is_shared)
        .await?;
    Ok(HttpResponse::Ok().json(ride))
}

async fn check_vehicle_availability(
    query: web::Query<AvailabilityQuery>,
    app: web::Data<UseCaseAppContainer>,
) -> Result<HttpResponse, ApiError> {
    let query = query.into_inner();
    let availability = app
        .get_client()
        .vehicle_availability()
        .check(VehicleAvailabilityQuery {
            vehicle_type: query.vehicle_type,
            seats_required: query.seats_required,
            is_shared: query.is_shared,
            ride_type: query.ride_type,
            scheduled_time: query.scheduled_time,
        })
        .await?;
    Ok(HttpResponse::Ok().json(availability))
}

pub fn init_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/rides")
            .service(
                web::resource("")
                    .route(web::post().to(book_ride))
                    .route(web::get().to(list_rides)),
            )
            .service(
                web::resource("/availability")
                    .route(web::get().to(check_vehicle_availability)),
            )
            .service(
                web::resource("/{id}")
                    .route(web::get().to(get_ride))
                    .route(web::put().to(update_ride)),
            )
            .service(web::resource("/{id}/cancel").route(web::put().to(cancel_ride)))
            .service(web::resource("/{id}/complete").route(web::put().to(complete_ride))),
    );
}
