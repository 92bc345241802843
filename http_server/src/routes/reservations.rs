use actix_web::{web, HttpRequest, HttpResponse};
use chrono::{DateTime, Utc};
use entities::parking::{LotId, SlotId};
use entities::payments::PaymentMethod;
use entities::reservations::ReservationId;
use serde::Deserialize;
use serde_json::json;
use use_cases::actor::Actor;
use use_cases::parking::reserve_slot::ReserveSlotRequest;

use crate::{
    authentication::AuthenticatedUserInfo, errors::ApiError,
    use_case_app_container::UseCaseAppContainer,
};

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreateReservationRequest {
    parking_lot_id: LotId,
    parking_slot_id: SlotId,
    start_time: DateTime<Utc>,
    end_time: DateTime<Utc>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PaymentRequest {
    payment_method: PaymentMethod,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct UpdateTimeRequest {
    new_start_time: DateTime<Utc>,
    new_end_time: DateTime<Utc>,
}

async fn create_reservation(
    data: web::Json<CreateReservationRequest>,
    app: web::Data<UseCaseAppContainer>,
    req: HttpRequest,
) -> Result<HttpResponse, ApiError> {
    let user: AuthenticatedUserInfo = (&req).try_into()?;
    let data = data.into_inner();

    let reservation = app
        .get_client()
        .reserve_slot()
        .reserve(
            user.user_id(),
            ReserveSlotRequest {
                lot_id: data.parking_lot_id,
                slot_id: data.parking_slot_id,
                start: data.start_time,
                end: data.end_time,
            },
        )
        .await?;

    Ok(HttpResponse::Created().json(reservation))
}

async fn list_reservations(
    app: web::Data<UseCaseAppContainer>,
    req: HttpRequest,
) -> Result<HttpResponse, ApiError> {
    let user: AuthenticatedUserInfo = (&req).try_into()?;
    let reservations = app
        .get_client()
        .reservation_queries()
        .list_for_user(user.user_id())
        .await?;
    Ok(HttpResponse::Ok().json(reservations))
}

async fn get_reservation(
    id: web::Path<ReservationId>,
    app: web::Data<UseCaseAppContainer>,
    req: HttpRequest,
) -> Result<HttpResponse, ApiError> {
    let user: AuthenticatedUserInfo = (&req).try_into()?;
    let reservation = app
        .get_client()
        .reservation_queries()
        .get(user.user_id(), id.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(reservation))
}

async fn cancel_reservation(
    id: web::Path<ReservationId>,
    app: web::Data<UseCaseAppContainer>,
    req: HttpRequest,
) -> Result<HttpResponse, ApiError> {
    let user: AuthenticatedUserInfo = (&req).try_into()?;
    let outcome = app
        .get_client()
        .cancel_reservation()
        .cancel(user.user_id(), id.into_inner())
        .await?;

    Ok(HttpResponse::Ok().json(json!({
        "reservation": outcome.reservation,
        "refundAmount": outcome.refund_amount,
        "refundReason": outcome.refund_description,
    })))
}

async fn complete_payment(
    id: web::Path<ReservationId>,
    data: web::Json<PaymentRequest>,
    app: web::Data<UseCaseAppContainer>,
    req: HttpRequest,
) -> Result<HttpResponse, ApiError> {
    let user: AuthenticatedUserInfo = (&req).try_into()?;
    let outcome = app
        .get_client()
        .pay_reservation()
        .pay(user.user_id(), id.into_inner(), data.payment_method)
        .await?;

    Ok(HttpResponse::Ok().json(json!({
        "reservation": outcome.reservation,
        "loyaltyPointsAwarded": outcome.loyalty_points_awarded,
    })))
}

async fn update_reservation_time(
    id: web::Path<ReservationId>,
    data: web::Json<UpdateTimeRequest>,
    app: web::Data<UseCaseAppContainer>,
    req: HttpRequest,
) -> Result<HttpResponse, ApiError> {
    let user: AuthenticatedUserInfo = (&req).try_into()?;
    let data = data.into_inner();
    let outcome = app
        .get_client()
        .amend_reservation()
        .amend(
            user.user_id(),
            id.into_inner(),
            data.new_start_time,
            data.new_end_time,
        )
        .await?;

    Ok(HttpResponse::Ok().json(json!({
        "reservation": outcome.reservation,
        "refundAmount": outcome.refund_amount,
    })))
}

pub fn init_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/reservations")
            .service(
                web::resource("")
                    .route(web::post().to(create_reservation))
                    .route(web::get().to(list_reservations)),
            )
            .service(web::resource("/{id}").route(web::get().to(get_reservation)))
            .service(web::resource("/{id}/cancel").route(web::put().to(cancel_reservation)))
            .service(web::resource("/{id}/payment").route(web::put().to(complete_payment)))
            .service(
                web::resource("/{id}/update-time").route(web::put().to(update_reservation_time)),
            ),
    );
}
