//! Pure pricing: parking from contention, ride fares from distance and
//! seat-sharing. No state, no clock, no randomness.

use serde::Deserialize;

#[derive(Clone, Debug, Deserialize)]
pub struct PricingConfig {
    pub base_price_per_hour: u64,
}

impl Default for PricingConfig {
    fn default() -> Self {
        Self {
            base_price_per_hour: 50,
        }
    }
}

/// Markup applied when a lot's live availability drops below the contention
/// thresholds.
pub fn contention_multiplier(availability_percentage: f64) -> f64 {
    if availability_percentage < 10.0 {
        1.25
    } else if availability_percentage < 40.0 {
        1.15
    } else {
        1.0
    }
}

pub fn parking_price(base_price_per_hour: u64, multiplier: f64, duration_hours: f64) -> u64 {
    (base_price_per_hour as f64 * multiplier * duration_hours).round() as u64
}

/// Distance is ceiled to whole kilometers before the rate is applied. A
/// shared booking pays its seat share plus a 25% pooling premium; a private
/// booking pays for the whole vehicle.
pub fn ride_fare(distance_km: f64, vehicle_capacity: u8, seats_booked: u8, is_shared: bool) -> u64 {
    let base_fare = distance_km.ceil() * 2.0 * 10.0 * f64::from(vehicle_capacity);

    if is_shared {
        let share = f64::from(seats_booked) / f64::from(vehicle_capacity);
        (base_fare * share * 1.25).ceil() as u64
    } else {
        base_fare as u64
    }
}

pub fn loyalty_points(amount: u64, percent: u8) -> u64 {
    (amount as f64 * f64::from(percent) / 100.0).round() as u64
}
