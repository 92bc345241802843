use actix_web::{web, HttpRequest, HttpResponse};
use chrono::{DateTime, Utc};
use entities::drivers::{DriverId, DriverName, DriverStatus, LicenseNumber, PhoneNumber};
use entities::geo::GeoPoint;
use entities::parking::{LotId, LotName, SlotId, SlotNumber, SlotStatus, ZoneName};
use entities::stations::{StationId, StationName};
use entities::vehicles::{RegistrationNumber, VehicleId, VehicleStatus, VehicleType};
use serde::Deserialize;
use serde_json::json;

use crate::{
    authentication::AuthenticatedUserInfo, errors::ApiError,
    use_case_app_container::UseCaseAppContainer,
};
use use_cases::inventory::drivers::{DriverPatch, NewDriver};
use use_cases::inventory::lots::{LotPatch, NewLot};
use use_cases::inventory::slots::{NewSlot, NewSlotBatch, NewTimeRestriction, SlotPatch};
use use_cases::inventory::stations::{NewStation, StationPatch};
use use_cases::inventory::vehicles::{NewVehicle, VehiclePatch};

#[derive(Deserialize)]
struct LocationPayload {
    longitude: f64,
    latitude: f64,
}

impl From<LocationPayload> for GeoPoint {
    fn from(value: LocationPayload) -> Self {
        GeoPoint::new(value.longitude, value.latitude)
    }
}

fn invalid_name(err: String) -> ApiError {
    ApiError::Validation(err)
}

// ---- Stations ----

#[derive(Deserialize)]
struct CreateStationPayload {
    name: String,
    location: LocationPayload,
}

#[derive(Deserialize)]
struct UpdateStationPayload {
    name: Option<String>,
    location: Option<LocationPayload>,
}

async fn create_station(
    data: web::Json<CreateStationPayload>,
    app: web::Data<UseCaseAppContainer>,
    req: HttpRequest,
) -> Result<HttpResponse, ApiError> {
    let actor: AuthenticatedUserInfo = (&req).try_into()?;
    let data = data.into_inner();
    let station = app
        .get_client()
        .station_admin()
        .create(
            &actor,
            NewStation {
                name: data.name,
                location: data.location.into(),
            },
        )
        .await?;
    Ok(HttpResponse::Created().json(station))
}

async fn update_station(
    id: web::Path<StationId>,
    data: web::Json<UpdateStationPayload>,
    app: web::Data<UseCaseAppContainer>,
    req: HttpRequest,
) -> Result<HttpResponse, ApiError> {
    let actor: AuthenticatedUserInfo = (&req).try_into()?;
    let data = data.into_inner();
    let name = data
        .name
        .map(StationName::try_from)
        .transpose()
        .map_err(invalid_name)?;
    let station = app
        .get_client()
        .station_admin()
        .update(
            &actor,
            id.into_inner(),
            StationPatch {
                name,
                location: data.location.map(Into::into),
            },
        )
        .await?;
    Ok(HttpResponse::Ok().json(station))
}

async fn delete_station(
    id: web::Path<StationId>,
    app: web::Data<UseCaseAppContainer>,
    req: HttpRequest,
) -> Result<HttpResponse, ApiError> {
    let actor: AuthenticatedUserInfo = (&req).try_into()?;
    app.get_client()
        .station_admin()
        .delete(&actor, id.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(json!({ "message": "Metro station deleted successfully" })))
}

// ---- Parking lots ----

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreateLotPayload {
    name: String,
    location: LocationPayload,
    total_slots: u32,
    metro_station_id: StationId,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct UpdateLotPayload {
    name: Option<String>,
    location: Option<LocationPayload>,
    total_slots: Option<u32>,
    metro_station_id: Option<StationId>,
}

async fn create_lot(
    data: web::Json<CreateLotPayload>,
    app: web::Data<UseCaseAppContainer>,
    req: HttpRequest,
) -> Result<HttpResponse, ApiError> {
    let actor: AuthenticatedUserInfo = (&req).try_into()?;
    let data = data.into_inner();
    let lot = app
        .get_client()
        .lot_admin()
        .create(
            &actor,
            NewLot {
                name: data.name,
                location: data.location.into(),
                total_slots: data.total_slots,
                metro_station_id: data.metro_station_id,
            },
        )
        .await?;
    Ok(HttpResponse::Created().json(lot))
}

async fn update_lot(
    id: web::Path<LotId>,
    data: web::Json<UpdateLotPayload>,
    app: web::Data<UseCaseAppContainer>,
    req: HttpRequest,
) -> Result<HttpResponse, ApiError> {
    let actor: AuthenticatedUserInfo = (&req).try_into()?;
    let data = data.into_inner();
    let name = data
        .name
        .map(LotName::try_from)
        .transpose()
        .map_err(invalid_name)?;
    let lot = app
        .get_client()
        .lot_admin()
        .update(
            &actor,
            id.into_inner(),
            LotPatch {
                name,
                location: data.location.map(Into::into),
                total_slots: data.total_slots,
                metro_station_id: data.metro_station_id,
            },
        )
        .await?;
    Ok(HttpResponse::Ok().json(lot))
}

async fn delete_lot(
    id: web::Path<LotId>,
    app: web::Data<UseCaseAppContainer>,
    req: HttpRequest,
) -> Result<HttpResponse, ApiError> {
    let actor: AuthenticatedUserInfo = (&req).try_into()?;
    app.get_client()
        .lot_admin()
        .delete(&actor, id.into_inner())
        .await?;
    Ok(HttpResponse::Ok()
        .json(json!({ "message": "Parking lot and associated slots deleted successfully" })))
}

// ---- Parking slots ----

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreateSlotPayload {
    lot_id: LotId,
    slot_number: SlotNumber,
    zone: ZoneName,
    status: Option<SlotStatus>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreateSlotBatchPayload {
    lot_id: LotId,
    zone: ZoneName,
    start_number: u32,
    count: u32,
    status: Option<SlotStatus>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct UpdateSlotPayload {
    slot_number: Option<SlotNumber>,
    zone: Option<ZoneName>,
    status: Option<SlotStatus>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct TimeRestrictionPayload {
    start_time: DateTime<Utc>,
    end_time: DateTime<Utc>,
    reason: Option<String>,
    description: Option<String>,
}

async fn create_slot(
    data: web::Json<CreateSlotPayload>,
    app: web::Data<UseCaseAppContainer>,
    req: HttpRequest,
) -> Result<HttpResponse, ApiError> {
    let actor: AuthenticatedUserInfo = (&req).try_into()?;
    let data = data.into_inner();
    let slot = app
        .get_client()
        .slot_admin()
        .create(
            &actor,
            NewSlot {
                lot_id: data.lot_id,
                slot_number: data.slot_number,
                zone: data.zone,
                status: data.status,
            },
        )
        .await?;
    Ok(HttpResponse::Created().json(slot))
}

async fn create_slot_batch(
    data: web::Json<CreateSlotBatchPayload>,
    app: web::Data<UseCaseAppContainer>,
    req: HttpRequest,
) -> Result<HttpResponse, ApiError> {
    let actor: AuthenticatedUserInfo = (&req).try_into()?;
    let data = data.into_inner();
    let slots = app
        .get_client()
        .slot_admin()
        .create_batch(
            &actor,
            NewSlotBatch {
                lot_id: data.lot_id,
                zone: data.zone,
                start_number: data.start_number,
                count: data.count,
                status: data.status,
            },
        )
        .await?;
    Ok(HttpResponse::Created().json(json!({
        "message": format!("{} parking slots created successfully", slots.len()),
        "slots": slots,
    })))
}

async fn update_slot(
    id: web::Path<SlotId>,
    data: web::Json<UpdateSlotPayload>,
    app: web::Data<UseCaseAppContainer>,
    req: HttpRequest,
) -> Result<HttpResponse, ApiError> {
    let actor: AuthenticatedUserInfo = (&req).try_into()?;
    let data = data.into_inner();
    let slot = app
        .get_client()
        .slot_admin()
        .update(
            &actor,
            id.into_inner(),
            SlotPatch {
                slot_number: data.slot_number,
                zone: data.zone,
                status: data.status,
            },
        )
        .await?;
    Ok(HttpResponse::Ok().json(slot))
}

async fn delete_slot(
    id: web::Path<SlotId>,
    app: web::Data<UseCaseAppContainer>,
    req: HttpRequest,
) -> Result<HttpResponse, ApiError> {
    let actor: AuthenticatedUserInfo = (&req).try_into()?;
    app.get_client()
        .slot_admin()
        .delete(&actor, id.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(json!({ "message": "Parking slot deleted successfully" })))
}

async fn add_time_restriction(
    id: web::Path<SlotId>,
    data: web::Json<TimeRestrictionPayload>,
    app: web::Data<UseCaseAppContainer>,
    req: HttpRequest,
) -> Result<HttpResponse, ApiError> {
    let actor: AuthenticatedUserInfo = (&req).try_into()?;
    let data = data.into_inner();
    let slot = app
        .get_client()
        .slot_admin()
        .add_restriction(
            &actor,
            id.into_inner(),
            NewTimeRestriction {
                start: data.start_time,
                end: data.end_time,
                reason: data.reason,
                description: data.description,
            },
        )
        .await?;
    Ok(HttpResponse::Ok().json(slot))
}

async fn remove_time_restriction(
    path: web::Path<(SlotId, usize)>,
    app: web::Data<UseCaseAppContainer>,
    req: HttpRequest,
) -> Result<HttpResponse, ApiError> {
    let actor: AuthenticatedUserInfo = (&req).try_into()?;
    let (id, index) = path.into_inner();
    let slot = app
        .get_client()
        .slot_admin()
        .remove_restriction(&actor, id, index)
        .await?;
    Ok(HttpResponse::Ok().json(slot))
}

// ---- Drivers ----

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreateDriverPayload {
    name: String,
    phone_number: PhoneNumber,
    license_number: LicenseNumber,
    vehicle_id: VehicleId,
    status: Option<DriverStatus>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct UpdateDriverPayload {
    name: Option<String>,
    phone_number: Option<PhoneNumber>,
    license_number: Option<LicenseNumber>,
    vehicle_id: Option<VehicleId>,
    status: Option<DriverStatus>,
}

async fn create_driver(
    data: web::Json<CreateDriverPayload>,
    app: web::Data<UseCaseAppContainer>,
    req: HttpRequest,
) -> Result<HttpResponse, ApiError> {
    let actor: AuthenticatedUserInfo = (&req).try_into()?;
    let data = data.into_inner();
    let driver = app
        .get_client()
        .driver_admin()
        .create(
            &actor,
            NewDriver {
                name: data.name,
                phone_number: data.phone_number,
                license_number: data.license_number,
                vehicle_id: data.vehicle_id,
                status: data.status,
            },
        )
        .await?;
    Ok(HttpResponse::Created().json(driver))
}

async fn list_drivers(
    app: web::Data<UseCaseAppContainer>,
    req: HttpRequest,
) -> Result<HttpResponse, ApiError> {
    let actor: AuthenticatedUserInfo = (&req).try_into()?;
    let drivers = app.get_client().driver_admin().list(&actor).await?;
    Ok(HttpResponse::Ok().json(drivers))
}

async fn get_driver(
    id: web::Path<DriverId>,
    app: web::Data<UseCaseAppContainer>,
    req: HttpRequest,
) -> Result<HttpResponse, ApiError> {
    let actor: AuthenticatedUserInfo = (&req).try_into()?;
    let driver = app
        .get_client()
        .driver_admin()
        .get(&actor, id.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(driver))
}

async fn update_driver(
    id: web::Path<DriverId>,
    data: web::Json<UpdateDriverPayload>,
    app: web::Data<UseCaseAppContainer>,
    req: HttpRequest,
) -> Result<HttpResponse, ApiError> {
    let actor: AuthenticatedUserInfo = (&req).try_into()?;
    let data = data.into_inner();
    let name = data
        .name
        .map(DriverName::try_from)
        .transpose()
        .map_err(invalid_name)?;
    let driver = app
        .get_client()
        .driver_admin()
        .update(
            &actor,
            id.into_inner(),
            DriverPatch {
                name,
                phone_number: data.phone_number,
                license_number: data.license_number,
                vehicle_id: data.vehicle_id,
                status: data.status,
            },
        )
        .await?;
    Ok(HttpResponse::Ok().json(driver))
}

async fn delete_driver(
    id: web::Path<DriverId>,
    app: web::Data<UseCaseAppContainer>,
    req: HttpRequest,
) -> Result<HttpResponse, ApiError> {
    let actor: AuthenticatedUserInfo = (&req).try_into()?;
    app.get_client()
        .driver_admin()
        .delete(&actor, id.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(json!({ "message": "Driver deleted successfully" })))
}

// ---- Vehicles ----

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreateVehiclePayload {
    #[serde(rename = "type")]
    vehicle_type: VehicleType,
    registration_number: RegistrationNumber,
    model: String,
    capacity: Option<u8>,
    status: Option<VehicleStatus>,
    base_station_id: StationId,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct UpdateVehiclePayload {
    #[serde(rename = "type")]
    vehicle_type: Option<VehicleType>,
    registration_number: Option<RegistrationNumber>,
    model: Option<String>,
    capacity: Option<u8>,
    status: Option<VehicleStatus>,
    base_station_id: Option<StationId>,
}

async fn create_vehicle(
    data: web::Json<CreateVehiclePayload>,
    app: web::Data<UseCaseAppContainer>,
    req: HttpRequest,
) -> Result<HttpResponse, ApiError> {
    let actor: AuthenticatedUserInfo = (&req).try_into()?;
    let data = data.into_inner();
    let vehicle = app
        .get_client()
        .vehicle_admin()
        .create(
            &actor,
            NewVehicle {
                vehicle_type: data.vehicle_type,
                registration_number: data.registration_number,
                model: data.model,
                capacity: data.capacity,
                status: data.status,
                base_station_id: data.base_station_id,
            },
        )
        .await?;
    Ok(HttpResponse::Created().json(vehicle))
}

async fn list_vehicles(
    app: web::Data<UseCaseAppContainer>,
    req: HttpRequest,
) -> Result<HttpResponse, ApiError> {
    let actor: AuthenticatedUserInfo = (&req).try_into()?;
    let vehicles = app.get_client().vehicle_admin().list(&actor).await?;
    Ok(HttpResponse::Ok().json(vehicles))
}

async fn get_vehicle(
    id: web::Path<VehicleId>,
    app: web::Data<UseCaseAppContainer>,
    req: HttpRequest,
) -> Result<HttpResponse, ApiError> {
    let actor: AuthenticatedUserInfo = (&req).try_into()?;
    let (vehicle, assigned_driver) = app
        .get_client()
        .vehicle_admin()
        .get(&actor, id.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(json!({
        "vehicle": vehicle,
        "assignedDriver": assigned_driver,
    })))
}

async fn vehicles_for_station(
    station: web::Path<StationId>,
    app: web::Data<UseCaseAppContainer>,
    req: HttpRequest,
) -> Result<HttpResponse, ApiError> {
    let actor: AuthenticatedUserInfo = (&req).try_into()?;
    let vehicles = app
        .get_client()
        .vehicle_admin()
        .for_station(&actor, station.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(vehicles))
}

async fn update_vehicle(
    id: web::Path<VehicleId>,
    data: web::Json<UpdateVehiclePayload>,
    app: web::Data<UseCaseAppContainer>,
    req: HttpRequest,
) -> Result<HttpResponse, ApiError> {
    let actor: AuthenticatedUserInfo = (&req).try_into()?;
    let data = data.into_inner();
    let vehicle = app
        .get_client()
        .vehicle_admin()
        .update(
            &actor,
            id.into_inner(),
            VehiclePatch {
                vehicle_type: data.vehicle_type,
                registration_number: data.registration_number,
                model: data.model,
                capacity: data.capacity,
                status: data.status,
                base_station_id: data.base_station_id,
            },
        )
        .await?;
    Ok(HttpResponse::Ok().json(vehicle))
}

async fn delete_vehicle(
    id: web::Path<VehicleId>,
    app: web::Data<UseCaseAppContainer>,
    req: HttpRequest,
) -> Result<HttpResponse, ApiError> {
    let actor: AuthenticatedUserInfo = (&req).try_into()?;
    app.get_client()
        .vehicle_admin()
        .delete(&actor, id.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(json!({ "message": "Vehicle deleted successfully" })))
}

pub fn init_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/admin")
            .service(
                web::scope("/metro-stations")
                    .service(web::resource("").route(web::post().to(create_station)))
                    .service(
                        web::resource("/{id}")
                            .route(web::put().to(update_station))
                            .route(web::delete().to(delete_station)),
                    ),
            )
            .service(
                web::scope("/parking-lots")
                    .service(web::resource("").route(web::post().to(create_lot)))
                    .service(
                        web::resource("/{id}")
                            .route(web::put().to(update_lot))
                            .route(web::delete().to(delete_lot)),
                    ),
            )
            .service(
                web::scope("/parking-slots")
                    .service(web::resource("").route(web::post().to(create_slot)))
                    .service(web::resource("/batch").route(web::post().to(create_slot_batch)))
                    .service(
                        web::resource("/{id}")
                            .route(web::put().to(update_slot))
                            .route(web::delete().to(delete_slot)),
                    )
                    .service(
                        web::resource("/{id}/restrictions")
                            .route(web::post().to(add_time_restriction)),
                    )
                    .service(
                        web::resource("/{id}/restrictions/{index}")
                            .route(web::delete().to(remove_time_restriction)),
                    ),
            )
            .service(
                web::scope("/drivers")
                    .service(
                        web::resource("")
                            .route(web::post().to(create_driver))
                            .route(web::get().to(list_drivers)),
                    )
                    .service(
                        web::resource("/{id}")
                            .route(web::get().to(get_driver))
                            .route(web::put().to(update_driver))
                            .route(web::delete().to(delete_driver)),
                    ),
            )
            .service(
                web::scope("/vehicles")
                    .service(
                        web::resource("")
                            .route(web::post().to(create_vehicle))
                            .route(web::get().to(list_vehicles)),
                    )
                    .service(
                        web::resource("/by-station/{stationId}")
                            .route(web::get().to(vehicles_for_station)),
                    )
                    .service(
                        web::resource("/{id}")
                            .route(web::get().to(get_vehicle))
                            .route(web::put().to(update_vehicle))
                            .route(web::delete().to(delete_vehicle)),
                    ),
            ),
    );
}
