use actix_web::{
    error,
    http::{header::ContentType, StatusCode},
    HttpResponse,
};
use serde_json::json;
use thiserror::Error;

use use_cases::inventory::drivers::DriverAdminError;
use use_cases::inventory::lots::LotAdminError;
use use_cases::inventory::slots::SlotAdminError;
use use_cases::inventory::stations::StationAdminError;
use use_cases::inventory::vehicles::VehicleAdminError;
use use_cases::parking::amend_reservation::AmendReservationError;
use use_cases::parking::cancel_reservation::CancelReservationError;
use use_cases::parking::check_availability::CheckAvailabilityError;
use use_cases::parking::pay_reservation::PayReservationError;
use use_cases::parking::queries::ReservationQueryError;
use use_cases::parking::reserve_slot::ReserveSlotError;
use use_cases::rides::book_ride::BookRideError;
use use_cases::rides::cancel_ride::CancelRideError;
use use_cases::rides::complete_ride::CompleteRideError;
use use_cases::rides::queries::RideQueryError;
use use_cases::rides::update_ride::UpdateRideError;
use use_cases::rides::vehicle_availability::VehicleAvailabilityError;
use use_cases::wallet::{AddFundsError, RedeemPointsError};

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Validation(String),
    #[error("{0}")]
    Conflict(String),
    #[error("{0}")]
    State(String),
    #[error("{0}")]
    PaymentRequired(String),
    #[error("{0}")]
    Forbidden(String),
    #[error("{0}")]
    Unauthorized(String),
    #[error("Internal server error")]
    InternalServerError(#[from] anyhow::Error),
}

impl error::ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::Conflict(_) | ApiError::State(_) => StatusCode::CONFLICT,
            ApiError::PaymentRequired(_) => StatusCode::PAYMENT_REQUIRED,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::InternalServerError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let err_json = json!({ "error": self.to_string() });
        HttpResponse::build(self.status_code())
            .insert_header(ContentType::json())
            .json(err_json)
    }
}

impl From<CheckAvailabilityError> for ApiError {
    fn from(err: CheckAvailabilityError) -> Self {
        match err {
            CheckAvailabilityError::LotNotFound => ApiError::NotFound(err.to_string()),
            CheckAvailabilityError::InvalidWindow(_) => ApiError::Validation(err.to_string()),
            CheckAvailabilityError::Internal(source) => ApiError::InternalServerError(source),
        }
    }
}

impl From<ReserveSlotError> for ApiError {
    fn from(err: ReserveSlotError) -> Self {
        match err {
            ReserveSlotError::LotNotFound | ReserveSlotError::SlotNotFound => {
                ApiError::NotFound(err.to_string())
            }
            ReserveSlotError::SlotLotMismatch | ReserveSlotError::InvalidWindow(_) => {
                ApiError::Validation(err.to_string())
            }
            ReserveSlotError::SlotUnavailable(_) => ApiError::Conflict(err.to_string()),
            ReserveSlotError::Internal(source) => ApiError::InternalServerError(source),
        }
    }
}

impl From<CancelReservationError> for ApiError {
    fn from(err: CancelReservationError) -> Self {
        match err {
            CancelReservationError::NotFound => ApiError::NotFound(err.to_string()),
            CancelReservationError::NotActive => ApiError::State(err.to_string()),
            CancelReservationError::Internal(source) => ApiError::InternalServerError(source),
        }
    }
}

impl From<AmendReservationError> for ApiError {
    fn from(err: AmendReservationError) -> Self {
        match err {
            AmendReservationError::NotFound => ApiError::NotFound(err.to_string()),
            AmendReservationError::NotActive | AmendReservationError::NotPaid => {
                ApiError::State(err.to_string())
            }
            AmendReservationError::InvalidAmendment(_)
            | AmendReservationError::InvalidWindow(_) => ApiError::Validation(err.to_string()),
            AmendReservationError::Conflict => ApiError::Conflict(err.to_string()),
            AmendReservationError::Internal(source) => ApiError::InternalServerError(source),
        }
    }
}

impl From<PayReservationError> for ApiError {
    fn from(err: PayReservationError) -> Self {
        match err {
            PayReservationError::NotFound => ApiError::NotFound(err.to_string()),
            PayReservationError::NotActive | PayReservationError::AlreadyPaid => {
                ApiError::State(err.to_string())
            }
            PayReservationError::InsufficientBalance | PayReservationError::PaymentDeclined => {
                ApiError::PaymentRequired(err.to_string())
            }
            PayReservationError::Internal(source) => ApiError::InternalServerError(source),
        }
    }
}

impl From<ReservationQueryError> for ApiError {
    fn from(err: ReservationQueryError) -> Self {
        match err {
            ReservationQueryError::NotFound => ApiError::NotFound(err.to_string()),
            ReservationQueryError::Internal(source) => ApiError::InternalServerError(source),
        }
    }
}

impl From<BookRideError> for ApiError {
    fn from(err: BookRideError) -> Self {
        match err {
            BookRideError::MissingScheduledTime
            | BookRideError::InvalidSeatCount { .. }
            | BookRideError::IdenticalStops => ApiError::Validation(err.to_string()),
            BookRideError::NoAvailableVehicle(_) | BookRideError::NoSuitableSharedRide => {
                ApiError::Conflict(err.to_string())
            }
            BookRideError::Internal(source) => ApiError::InternalServerError(source),
        }
    }
}

impl From<VehicleAvailabilityError> for ApiError {
    fn from(err: VehicleAvailabilityError) -> Self {
        match err {
            VehicleAvailabilityError::MissingScheduledTime
            | VehicleAvailabilityError::InvalidSeatCount { .. } => {
                ApiError::Validation(err.to_string())
            }
            VehicleAvailabilityError::Internal(source) => ApiError::InternalServerError(source),
        }
    }
}

impl From<CancelRideError> for ApiError {
    fn from(err: CancelRideError) -> Self {
        match err {
            CancelRideError::NotFound => ApiError::NotFound(err.to_string()),
            CancelRideError::NotOpen => ApiError::State(err.to_string()),
            CancelRideError::Internal(source) => ApiError::InternalServerError(source),
        }
    }
}

impl From<CompleteRideError> for ApiError {
    fn from(err: CompleteRideError) -> Self {
        match err {
            CompleteRideError::NotFound => ApiError::NotFound(err.to_string()),
            CompleteRideError::NotActive | CompleteRideError::AlreadyPaid => {
                ApiError::State(err.to_string())
            }
            CompleteRideError::InsufficientBalance | CompleteRideError::PaymentDeclined => {
                ApiError::PaymentRequired(err.to_string())
            }
            CompleteRideError::Internal(source) => ApiError::InternalServerError(source),
        }
    }
}

impl From<UpdateRideError> for ApiError {
    fn from(err: UpdateRideError) -> Self {
        match err {
            UpdateRideError::NotFound => ApiError::NotFound(err.to_string()),
            UpdateRideError::NotActive => ApiError::State(err.to_string()),
            UpdateRideError::Internal(source) => ApiError::InternalServerError(source),
        }
    }
}

impl From<RideQueryError> for ApiError {
    fn from(err: RideQueryError) -> Self {
        match err {
            RideQueryError::NotFound => ApiError::NotFound(err.to_string()),
            RideQueryError::Internal(source) => ApiError::InternalServerError(source),
        }
    }
}

impl From<AddFundsError> for ApiError {
    fn from(err: AddFundsError) -> Self {
        match err {
            AddFundsError::InvalidAmount => ApiError::Validation(err.to_string()),
            AddFundsError::Internal(source) => ApiError::InternalServerError(source),
        }
    }
}

impl From<RedeemPointsError> for ApiError {
    fn from(err: RedeemPointsError) -> Self {
        match err {
            RedeemPointsError::NoPoints => ApiError::Validation(err.to_string()),
            RedeemPointsError::Internal(source) => ApiError::InternalServerError(source),
        }
    }
}

impl From<StationAdminError> for ApiError {
    fn from(err: StationAdminError) -> Self {
        match err {
            StationAdminError::Forbidden(_) => ApiError::Forbidden(err.to_string()),
            StationAdminError::NotFound => ApiError::NotFound(err.to_string()),
            StationAdminError::HasParkingLots { .. } => ApiError::Conflict(err.to_string()),
            StationAdminError::InvalidName(_) => ApiError::Validation(err.to_string()),
            StationAdminError::Internal(source) => ApiError::InternalServerError(source),
        }
    }
}

impl From<LotAdminError> for ApiError {
    fn from(err: LotAdminError) -> Self {
        match err {
            LotAdminError::Forbidden(_) => ApiError::Forbidden(err.to_string()),
            LotAdminError::NotFound | LotAdminError::StationNotFound => {
                ApiError::NotFound(err.to_string())
            }
            LotAdminError::TotalBelowOccupied { .. }
            | LotAdminError::HasActiveReservations { .. } => ApiError::Conflict(err.to_string()),
            LotAdminError::InvalidName(_) => ApiError::Validation(err.to_string()),
            LotAdminError::Internal(source) => ApiError::InternalServerError(source),
        }
    }
}

impl From<SlotAdminError> for ApiError {
    fn from(err: SlotAdminError) -> Self {
        match err {
            SlotAdminError::Forbidden(_) => ApiError::Forbidden(err.to_string()),
            SlotAdminError::NotFound | SlotAdminError::LotNotFound => {
                ApiError::NotFound(err.to_string())
            }
            SlotAdminError::DuplicateSlotNumber
            | SlotAdminError::HasActiveReservations { .. }
            | SlotAdminError::RestrictionOverlapsReservations { .. } => {
                ApiError::Conflict(err.to_string())
            }
            SlotAdminError::InvalidRestrictionIndex | SlotAdminError::InvalidWindow(_) => {
                ApiError::Validation(err.to_string())
            }
            SlotAdminError::Internal(source) => ApiError::InternalServerError(source),
        }
    }
}

impl From<DriverAdminError> for ApiError {
    fn from(err: DriverAdminError) -> Self {
        match err {
            DriverAdminError::Forbidden(_) => ApiError::Forbidden(err.to_string()),
            DriverAdminError::NotFound | DriverAdminError::VehicleNotFound => {
                ApiError::NotFound(err.to_string())
            }
            DriverAdminError::DuplicateLicense
            | DriverAdminError::VehicleAlreadyAssigned { .. }
            | DriverAdminError::OnActiveRide
            | DriverAdminError::HasOpenRides { .. } => ApiError::Conflict(err.to_string()),
            DriverAdminError::InvalidName(_) => ApiError::Validation(err.to_string()),
            DriverAdminError::Internal(source) => ApiError::InternalServerError(source),
        }
    }
}

impl From<VehicleAdminError> for ApiError {
    fn from(err: VehicleAdminError) -> Self {
        match err {
            VehicleAdminError::Forbidden(_) => ApiError::Forbidden(err.to_string()),
            VehicleAdminError::NotFound | VehicleAdminError::StationNotFound => {
                ApiError::NotFound(err.to_string())
            }
            VehicleAdminError::DuplicateRegistration
            | VehicleAdminError::InUse
            | VehicleAdminError::Assigned { .. }
            | VehicleAdminError::HasOpenRides { .. } => ApiError::Conflict(err.to_string()),
            VehicleAdminError::Internal(source) => ApiError::InternalServerError(source),
        }
    }
}
