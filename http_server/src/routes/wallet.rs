use actix_web::{web, HttpRequest, HttpResponse};
use serde::Deserialize;
use serde_json::json;
use use_cases::actor::Actor;

use crate::{
    authentication::AuthenticatedUserInfo, errors::ApiError,
    use_case_app_container::UseCaseAppContainer,
};

#[derive(Deserialize)]
struct AddFundsRequest {
    amount: u64,
}

async fn get_wallet(
    app: web::Data<UseCaseAppContainer>,
    req: HttpRequest,
) -> Result<HttpResponse, ApiError> {
    let user: AuthenticatedUserInfo = (&req).try_into()?;
    let wallet = app
        .get_client()
        .wallet()
        .wallet(user.user_id())
        .await
        .map_err(ApiError::InternalServerError)?;
    Ok(HttpResponse::Ok().json(json!({
        "walletBalance": wallet.balance,
        "loyaltyPoints": wallet.loyalty_points,
    })))
}

async fn add_funds(
    data: web::Json<AddFundsRequest>,
    app: web::Data<UseCaseAppContainer>,
    req: HttpRequest,
) -> Result<HttpResponse, ApiError> {
    let user: AuthenticatedUserInfo = (&req).try_into()?;
    let wallet = app
        .get_client()
        .wallet()
        .add_funds(user.user_id(), data.amount)
        .await?;
    Ok(HttpResponse::Ok().json(json!({
        "walletBalance": wallet.balance,
    })))
}

async fn redeem_points(
    app: web::Data<UseCaseAppContainer>,
    req: HttpRequest,
) -> Result<HttpResponse, ApiError> {
    let user: AuthenticatedUserInfo = (&req).try_into()?;
    let redemption = app
        .get_client()
        .wallet()
        .redeem_points(user.user_id())
        .await?;
    Ok(HttpResponse::Ok().json(json!({
        "pointsRedeemed": redemption.points_redeemed,
        "amountCredited": redemption.amount_credited,
        "walletBalance": redemption.wallet_balance,
    })))
}

async fn list_transactions(
    app: web::Data<UseCaseAppContainer>,
    req: HttpRequest,
) -> Result<HttpResponse, ApiError> {
    let user: AuthenticatedUserInfo = (&req).try_into()?;
    let transactions = app
        .get_client()
        .wallet()
        .transactions(user.user_id())
        .await
        .map_err(ApiError::InternalServerError)?;
    Ok(HttpResponse::Ok().json(transactions))
}

pub fn init_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/wallet")
            .service(web::resource("").route(web::get().to(get_wallet)))
            .service(web::resource("/add").route(web::post().to(add_funds)))
            .service(web::resource("/redeem-points").route(web::post().to(redeem_points)))
            .service(web::resource("/transactions").route(web::get().to(list_transactions))),
    );
}
