use crate::{ClientProfile, GeoLocation, TherapistProfile};

const EARTH_RADIUS_KM: f64 = 6371.0;

/// Great-circle distance between two points in kilometres.
pub fn haversine_km(a: &GeoLocation, b: &GeoLocation) -> f64 {
    let lat1 = a.latitude.to_radians();
    let lat2 = b.latitude.to_radians();
    let d_lat = (b.latitude - a.latitude).to_radians();
    let d_lon = (b.longitude - a.longitude).to_radians();

    let h = (d_lat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (d_lon / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_KM * h.sqrt().min(1.0).asin()
}

fn usable_km(km: f64) -> Option<f64> {
    (km.is_finite() && km >= 0.0).then_some(km)
}

/// Distance between client and therapist.
///
/// The therapist's precomputed `distance_km` wins; otherwise both locations
/// are needed. `None` means the distance is unknown.
pub fn resolve_distance_km(client: &ClientProfile, therapist: &TherapistProfile) -> Option<f64> {
    if let Some(km) = therapist.distance_km.and_then(usable_km) {
        return Some(km);
    }

    match (client.location.as_ref(), therapist.location.as_ref()) {
        (Some(from), Some(to)) => usable_km(haversine_km(from, to)),
        _ => None,
    }
}

/// Exponential decay: 1.0 at 0 km, 0.5 at `half_life_km`, approaching 0 far away.
pub fn distance_decay(km: f64, half_life_km: f64) -> f64 {
    if half_life_km <= 0.0 || !half_life_km.is_finite() {
        return if km <= 0.0 { 1.0 } else { 0.0 };
    }
    0.5_f64.powf(km.max(0.0) / half_life_km).clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn utrecht() -> GeoLocation {
        GeoLocation {
            city: Some("Utrecht".into()),
            latitude: 52.0907,
            longitude: 5.1214,
        }
    }

    fn amsterdam() -> GeoLocation {
        GeoLocation {
            city: Some("Amsterdam".into()),
            latitude: 52.3676,
            longitude: 4.9041,
        }
    }

    #[test]
    fn haversine_matches_known_distance() {
        let km = haversine_km(&utrecht(), &amsterdam());
        assert!((km - 34.5).abs() < 1.5, "got {km}");
        assert_eq!(haversine_km(&utrecht(), &utrecht()), 0.0);
    }

    #[test]
    fn precomputed_distance_wins() {
        let client = ClientProfile {
            location: Some(utrecht()),
            ..ClientProfile::default()
        };
        let therapist = TherapistProfile {
            distance_km: Some(3.0),
            location: Some(amsterdam()),
            ..TherapistProfile::default()
        };

        assert_eq!(resolve_distance_km(&client, &therapist), Some(3.0));
    }

    #[test]
    fn falls_back_to_coordinates_or_unknown() {
        let client = ClientProfile {
            location: Some(utrecht()),
            ..ClientProfile::default()
        };
        let mut therapist = TherapistProfile {
            distance_km: Some(f64::NAN),
            location: Some(amsterdam()),
            ..TherapistProfile::default()
        };

        let km = resolve_distance_km(&client, &therapist).unwrap();
        assert!(km > 30.0);

        therapist.location = None;
        assert_eq!(resolve_distance_km(&client, &therapist), None);
    }

    #[test]
    fn decay_halves_at_half_life() {
        assert_eq!(distance_decay(0.0, 15.0), 1.0);
        assert!((distance_decay(15.0, 15.0) - 0.5).abs() < 1e-12);
        assert!(distance_decay(300.0, 15.0) < 0.001);
        assert!(distance_decay(300.0, 15.0) >= 0.0);
        assert_eq!(distance_decay(-5.0, 15.0), 1.0);
    }
}
